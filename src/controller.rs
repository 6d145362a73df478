/// Controller identification: VID/PID matching, transport classification,
/// per-model capability flags.

/// Supported controller models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceModel {
    DualSense,
    DualSenseEdge,
    DualShock4,
}

/// How the controller is attached to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Usb,
    Bluetooth,
}

/// An enumerated controller. Immutable once built by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Opaque OS device path, used to open the device and as the identity
    /// key for slot assignment.
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub transport: TransportKind,
    pub model: DeviceModel,
}

/// Known VID/PID pairs.
pub const SONY_VID: u16 = 0x054C;
const DUALSENSE_PID: u16 = 0x0CE6;
const DUALSENSE_EDGE_PID: u16 = 0x0DF2;
const DS4_V1_PID: u16 = 0x05C4;
const DS4_V2_PID: u16 = 0x09CC;

/// HID usage page and usage for gamepad collections.
pub const GAMEPAD_USAGE_PAGE: u16 = 0x01; // Generic Desktop
pub const GAMEPAD_USAGE: u16 = 0x05; // Game Pad

/// Bluetooth HID service class GUID that shows up in HID-over-GATT paths.
const BT_HID_SERVICE_UUID: &str = "{00001124-0000-1000-8000-00805f9b34fb}";

/// Identify the controller model from VID/PID. Returns None for unknown
/// devices.
pub fn identify(vid: u16, pid: u16) -> Option<DeviceModel> {
    if vid != SONY_VID {
        return None;
    }
    match pid {
        DUALSENSE_PID => Some(DeviceModel::DualSense),
        DUALSENSE_EDGE_PID => Some(DeviceModel::DualSenseEdge),
        DS4_V1_PID | DS4_V2_PID => Some(DeviceModel::DualShock4),
        _ => None,
    }
}

/// Classify the transport from the OS device path.
///
/// Bluetooth paths on Windows carry the Bluetooth HID service GUID or an
/// enumerator segment ("bth"/"BTHENUM"); everything else is treated as USB,
/// the safer default since USB frames need no CRC suffix.
pub fn classify_transport(path: &str) -> TransportKind {
    let lower = path.to_ascii_lowercase();
    if lower.contains(BT_HID_SERVICE_UUID) || lower.contains("bthenum") || lower.contains("bth") {
        TransportKind::Bluetooth
    } else {
        TransportKind::Usb
    }
}

impl DeviceModel {
    /// Returns true for the DualSense family (standard and Edge).
    pub fn is_dualsense(self) -> bool {
        matches!(self, DeviceModel::DualSense | DeviceModel::DualSenseEdge)
    }

    /// Adaptive trigger haptics are a DualSense-family capability; the
    /// DualShock 4 trigger is a plain analog.
    pub fn has_adaptive_triggers(self) -> bool {
        self.is_dualsense()
    }

    /// Only the DualSense carries the microphone mute LED.
    pub fn has_mic_led(self) -> bool {
        self.is_dualsense()
    }

    /// Only the DualSense carries the five-dot player LED strip; the
    /// DualShock 4 signals the player through the lightbar alone.
    pub fn has_player_leds(self) -> bool {
        self.is_dualsense()
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceModel::DualSense => "DualSense",
            DeviceModel::DualSenseEdge => "DualSense Edge",
            DeviceModel::DualShock4 => "DualShock 4",
        }
    }
}

impl std::fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Usb => f.write_str("USB"),
            TransportKind::Bluetooth => f.write_str("Bluetooth"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_known_controllers() {
        assert_eq!(identify(0x054C, 0x0CE6), Some(DeviceModel::DualSense));
        assert_eq!(identify(0x054C, 0x0DF2), Some(DeviceModel::DualSenseEdge));
        assert_eq!(identify(0x054C, 0x05C4), Some(DeviceModel::DualShock4));
        assert_eq!(identify(0x054C, 0x09CC), Some(DeviceModel::DualShock4));
    }

    #[test]
    fn identify_unknown() {
        assert_eq!(identify(0x054C, 0x0000), None);
        assert_eq!(identify(0x0001, 0x0CE6), None);
    }

    #[test]
    fn classify_usb_path() {
        let path = r"\\?\hid#vid_054c&pid_0ce6&mi_03#8&hash&0&0000#{4d1e55b2-f16f-11cf-88cb-001111000030}";
        assert_eq!(classify_transport(path), TransportKind::Usb);
    }

    #[test]
    fn classify_bt_paths() {
        let uuid = r"\\?\hid#{00001124-0000-1000-8000-00805f9b34fb}_vid&0002054c_pid&0ce6#8&hash&0&0000#{4d1e55b2-f16f-11cf-88cb-001111000030}";
        assert_eq!(classify_transport(uuid), TransportKind::Bluetooth);
        let enumerator = r"\\?\hid#bthenum_dev_vid&0002054c_pid&0ce6#7&hash&0&0000";
        assert_eq!(classify_transport(enumerator), TransportKind::Bluetooth);
    }

    #[test]
    fn capabilities_by_model() {
        assert!(DeviceModel::DualSense.has_adaptive_triggers());
        assert!(DeviceModel::DualSenseEdge.has_adaptive_triggers());
        assert!(!DeviceModel::DualShock4.has_adaptive_triggers());
        assert!(!DeviceModel::DualShock4.has_mic_led());
        assert!(!DeviceModel::DualShock4.has_player_leds());
    }
}
