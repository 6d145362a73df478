/// Driver error kinds and propagation policy.
///
/// Everything except `Io` and `Disconnected` is recovered locally:
/// discovery and open failures are retried on the next tick, bad reports
/// yield no event, and out-of-range encoder parameters are clamped after a
/// warning. `Io`/`Disconnected` are fatal for the owning session, which
/// transitions to `Disconnected` and releases its handle.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// OS-level HID enumeration failed. Recoverable: retry next tick.
    #[error("device enumeration failed: {0}")]
    Discovery(#[source] hidapi::HidError),

    /// A specific device could not be opened. Recoverable: retry next tick.
    #[error("failed to open device at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: hidapi::HidError,
    },

    /// Mid-session read/write failure. Fatal for the session.
    #[error("device I/O failed: {0}")]
    Io(#[from] hidapi::HidError),

    /// The device path vanished or the OS reported the device gone.
    /// Fatal for the session.
    #[error("device disconnected")]
    Disconnected,

    /// Report-ID or length mismatch. Non-fatal: the tick yields no event.
    #[error("bad input report: {0}")]
    BadReport(BadReport),

    /// Out-of-range input to an encoder API. Never propagated to the host:
    /// callers warn and clamp.
    #[error("parameter out of range: {0}")]
    InvalidParameter(&'static str),
}

impl Error {
    /// True for errors that end the owning session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Disconnected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadReport {
    TooShort { expected: usize, got: usize },
    UnexpectedReportId(u8),
}

impl std::fmt::Display for BadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadReport::TooShort { expected, got } => {
                write!(f, "report too short: expected {expected} bytes, got {got}")
            }
            BadReport::UnexpectedReportId(id) => {
                write!(f, "unexpected report ID: 0x{id:02X}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatality() {
        assert!(Error::Disconnected.is_fatal());
        assert!(
            !Error::BadReport(BadReport::UnexpectedReportId(0x42)).is_fatal()
        );
        assert!(!Error::InvalidParameter("start").is_fatal());
    }

    #[test]
    fn bad_report_messages() {
        let e = Error::BadReport(BadReport::TooShort { expected: 64, got: 10 });
        assert!(e.to_string().contains("expected 64"));
        let e = Error::BadReport(BadReport::UnexpectedReportId(0x11));
        assert!(e.to_string().contains("0x11"));
    }
}
