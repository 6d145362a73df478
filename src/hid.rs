/// HID transport: device enumeration, open, and report I/O.
///
/// Discovery filters by usage page 0x01 / usage 0x05 (the gamepad
/// collection — Sony pads expose several HID collections per interface)
/// before VID/PID matching. Reads block for at most one poll period; a
/// timeout is success-with-no-report, not an error.

use std::ffi::CString;

use hidapi::{HidApi, HidDevice};

use crate::controller::{self, DeviceDescriptor, GAMEPAD_USAGE, GAMEPAD_USAGE_PAGE};
use crate::error::{Error, Result};

/// Upper bound on one blocking read; at or below the polling period.
pub const READ_TIMEOUT_MS: i32 = 4;

/// Largest report either direction: the 78-byte Bluetooth frame.
pub const REPORT_BUF_LEN: usize = 78;

/// Report I/O for one open device. The hidapi-backed implementation below
/// is the only production transport; the seam exists so the session state
/// machine can be driven by a scripted device in tests.
pub trait Transport {
    /// Read one input report. Returns 0 when no report arrived within the
    /// timeout. `Err(Disconnected)` when the device is gone, `Err(Io)` on
    /// any other OS failure.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write one output report.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Drain any queued input so stale pre-open reports are never observed.
    fn flush_input(&mut self);
}

/// Enumerate all supported controllers currently attached.
pub fn enumerate(api: &HidApi) -> Vec<DeviceDescriptor> {
    let mut found: Vec<DeviceDescriptor> = Vec::new();
    for dev in api.device_list() {
        if dev.usage_page() != GAMEPAD_USAGE_PAGE || dev.usage() != GAMEPAD_USAGE {
            continue;
        }
        let Some(model) = controller::identify(dev.vendor_id(), dev.product_id()) else {
            continue;
        };
        let path = dev.path().to_string_lossy().to_string();
        if found.iter().any(|d| d.path == path) {
            continue;
        }
        let transport = controller::classify_transport(&path);
        log::debug!("found {model} ({transport}) at {}", &path[..path.len().min(60)]);
        found.push(DeviceDescriptor {
            path,
            vendor_id: dev.vendor_id(),
            product_id: dev.product_id(),
            transport,
            model,
        });
    }
    found
}

/// Open a discovered device for report I/O.
pub fn open(api: &HidApi, descriptor: &DeviceDescriptor) -> Result<HidDeviceTransport> {
    let cpath = CString::new(descriptor.path.as_bytes()).map_err(|_| Error::Open {
        path: descriptor.path.clone(),
        source: hidapi::HidError::HidApiError {
            message: "device path contains an interior NUL".into(),
        },
    })?;
    let device = api.open_path(&cpath).map_err(|source| Error::Open {
        path: descriptor.path.clone(),
        source,
    })?;
    device.set_blocking_mode(false).map_err(|source| Error::Open {
        path: descriptor.path.clone(),
        source,
    })?;
    Ok(HidDeviceTransport { device })
}

/// hidapi-backed transport.
pub struct HidDeviceTransport {
    device: HidDevice,
}

impl Transport for HidDeviceTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.device.read_timeout(buf, READ_TIMEOUT_MS) {
            Ok(n) => Ok(n),
            Err(e) => Err(classify_io_error(e)),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        match self.device.write(buf) {
            Ok(_) => Ok(()),
            Err(e) => Err(classify_io_error(e)),
        }
    }

    fn flush_input(&mut self) {
        let mut scratch = [0u8; REPORT_BUF_LEN];
        let mut drained = 0u32;
        while let Ok(n) = self.device.read_timeout(&mut scratch, 0) {
            if n == 0 {
                break;
            }
            drained += 1;
        }
        if drained > 0 {
            log::trace!("flushed {drained} queued input report(s)");
        }
    }
}

/// Split OS failures into gone-device vs. everything else. Windows reports
/// a surprise-removed HID as ERROR_DEVICE_NOT_CONNECTED (1167).
fn classify_io_error(e: hidapi::HidError) -> Error {
    let message = e.to_string();
    if message.contains("1167") || message.contains("not connected") {
        Error::Disconnected
    } else {
        Error::Io(e)
    }
}
