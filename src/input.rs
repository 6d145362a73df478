/// Input report parsing: raw HID bytes → `InputState`.
///
/// DualSense layout (payload offsets, after transport framing):
///
///   0x00..0x03  sticks LX, LY, RX, RY (center 128, Y grows downward)
///   0x04..0x05  trigger analogs L, R
///   0x07        D-pad hat (low nibble) + face buttons (high nibble)
///   0x08        L1/R1/L2/R2/Create/Options/L3/R3
///   0x09        PS/touchpad/mic + Edge Fn and paddle buttons
///   0x0F..0x14  gyro X/Y/Z, three i16 little-endian
///   0x15..0x1A  accelerometer X/Y/Z
///   0x20..0x23  touch point 1, packed 32-bit word
///   0x24..0x27  touch point 2
///   0x34        battery nibble; 0x35/0x36 carry the charge flags
///
/// Framing: USB payload starts at +1 after report ID 0x01 (0x31 on the
/// extended path); Bluetooth requires the 0x31 0x02 prefix and starts
/// at +2. The DualShock 4 shares the stick block but keeps its buttons at
/// 0x04..0x06 with the trigger analogs behind them at 0x07/0x08, and its
/// Bluetooth payload starts at +3 after report ID 0x11.

use crate::battery::BatteryHistory;
use crate::controller::{DeviceModel, TransportKind};
use crate::error::{BadReport, Error, Result};

pub const INPUT_REPORT_USB: u8 = 0x01;
pub const INPUT_REPORT_EXTENDED: u8 = 0x31;
pub const INPUT_REPORT_BT: u8 = 0x31;
pub const INPUT_REPORT_DS4_BT: u8 = 0x11;

/// Shortest report the decoder accepts.
pub const MIN_REPORT_LEN: usize = 64;

/// D-pad direction decoded from the 4-bit hat field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dpad {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    Center,
}

impl Dpad {
    /// Fold the direction into the four edge bits; diagonals raise both
    /// neighbors.
    fn edge_bits(self) -> u32 {
        match self {
            Dpad::Up => Buttons::DPAD_UP,
            Dpad::UpRight => Buttons::DPAD_UP | Buttons::DPAD_RIGHT,
            Dpad::Right => Buttons::DPAD_RIGHT,
            Dpad::DownRight => Buttons::DPAD_DOWN | Buttons::DPAD_RIGHT,
            Dpad::Down => Buttons::DPAD_DOWN,
            Dpad::DownLeft => Buttons::DPAD_DOWN | Buttons::DPAD_LEFT,
            Dpad::Left => Buttons::DPAD_LEFT,
            Dpad::UpLeft => Buttons::DPAD_UP | Buttons::DPAD_LEFT,
            Dpad::Center => 0,
        }
    }
}

/// All binary inputs in one bitset, D-pad edges included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons(u32);

impl Buttons {
    pub const SQUARE: u32 = 1 << 0;
    pub const CROSS: u32 = 1 << 1;
    pub const CIRCLE: u32 = 1 << 2;
    pub const TRIANGLE: u32 = 1 << 3;
    pub const L1: u32 = 1 << 4;
    pub const R1: u32 = 1 << 5;
    pub const L2: u32 = 1 << 6;
    pub const R2: u32 = 1 << 7;
    pub const CREATE: u32 = 1 << 8;
    pub const OPTIONS: u32 = 1 << 9;
    pub const L3: u32 = 1 << 10;
    pub const R3: u32 = 1 << 11;
    pub const PS: u32 = 1 << 12;
    pub const TOUCHPAD: u32 = 1 << 13;
    pub const MIC: u32 = 1 << 14;
    pub const FN_LEFT: u32 = 1 << 15;
    pub const FN_RIGHT: u32 = 1 << 16;
    pub const PADDLE_LEFT: u32 = 1 << 17;
    pub const PADDLE_RIGHT: u32 = 1 << 18;
    pub const DPAD_UP: u32 = 1 << 19;
    pub const DPAD_DOWN: u32 = 1 << 20;
    pub const DPAD_LEFT: u32 = 1 << 21;
    pub const DPAD_RIGHT: u32 = 1 << 22;

    pub fn contains(self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    pub fn insert(&mut self, mask: u32) {
        self.0 |= mask;
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Stable names for the host-facing button callback, in report order.
pub const BUTTON_NAMES: &[(u32, &str)] = &[
    (Buttons::SQUARE, "square"),
    (Buttons::CROSS, "cross"),
    (Buttons::CIRCLE, "circle"),
    (Buttons::TRIANGLE, "triangle"),
    (Buttons::DPAD_UP, "dpad_up"),
    (Buttons::DPAD_DOWN, "dpad_down"),
    (Buttons::DPAD_LEFT, "dpad_left"),
    (Buttons::DPAD_RIGHT, "dpad_right"),
    (Buttons::L1, "l1"),
    (Buttons::R1, "r1"),
    (Buttons::L2, "l2"),
    (Buttons::R2, "r2"),
    (Buttons::CREATE, "create"),
    (Buttons::OPTIONS, "options"),
    (Buttons::L3, "l3"),
    (Buttons::R3, "r3"),
    (Buttons::PS, "ps"),
    (Buttons::TOUCHPAD, "touchpad"),
    (Buttons::MIC, "mic"),
    (Buttons::FN_LEFT, "fn_left"),
    (Buttons::FN_RIGHT, "fn_right"),
    (Buttons::PADDLE_LEFT, "paddle_left"),
    (Buttons::PADDLE_RIGHT, "paddle_right"),
];

/// One touchpad contact. Coordinates are the pad's native 12-bit range
/// (1920 x 1080-ish active area).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchPoint {
    pub id: u8,
    pub down: bool,
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    /// Unpack `[id:7 | up:1 | x:12 | y:12]` from a little-endian word.
    fn unpack(word: u32) -> Self {
        Self {
            id: (word & 0x7F) as u8,
            down: word & 0x80 == 0,
            x: ((word >> 8) & 0x0FFF) as u16,
            y: ((word >> 20) & 0x0FFF) as u16,
        }
    }

    #[cfg(test)]
    fn pack(self) -> u32 {
        let mut word = (self.id as u32) & 0x7F;
        if !self.down {
            word |= 0x80;
        }
        word |= ((self.x as u32) & 0x0FFF) << 8;
        word |= ((self.y as u32) & 0x0FFF) << 20;
        word
    }
}

/// Latest decoded controller snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    /// Stick axes in [-1, 1]; up and right are positive.
    pub left_stick: (f32, f32),
    pub right_stick: (f32, f32),
    /// Trigger pull in [0, 1].
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub buttons: Buttons,
    pub dpad: Dpad,
    pub touches: [TouchPoint; 2],
    pub gyro: (i16, i16, i16),
    pub accel: (i16, i16, i16),
    /// Smoothed battery percentage 0..=100.
    pub battery: u8,
    pub phone_connected: bool,
    pub charging: bool,
    pub fully_charged: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            left_stick: (0.0, 0.0),
            right_stick: (0.0, 0.0),
            left_trigger: 0.0,
            right_trigger: 0.0,
            buttons: Buttons::default(),
            dpad: Dpad::Center,
            touches: [TouchPoint::default(); 2],
            gyro: (0, 0, 0),
            accel: (0, 0, 0),
            battery: 0,
            phone_connected: false,
            charging: false,
            fully_charged: false,
        }
    }
}

/// Decode one raw input report.
///
/// `battery` accumulates the smoothing window across reports; it belongs to
/// the session and is reset on reconnect. Framing problems yield
/// `BadReport` (non-fatal); unexpected field values never fail.
pub fn decode(
    model: DeviceModel,
    transport: TransportKind,
    data: &[u8],
    battery: &mut BatteryHistory,
) -> Result<InputState> {
    if data.len() < MIN_REPORT_LEN {
        return Err(Error::BadReport(BadReport::TooShort {
            expected: MIN_REPORT_LEN,
            got: data.len(),
        }));
    }
    match model {
        DeviceModel::DualSense | DeviceModel::DualSenseEdge => {
            let payload = frame_dualsense(transport, data)?;
            Ok(decode_dualsense(payload, battery))
        }
        DeviceModel::DualShock4 => {
            let payload = frame_ds4(transport, data)?;
            Ok(decode_ds4(payload))
        }
    }
}

fn frame_dualsense(transport: TransportKind, data: &[u8]) -> Result<&[u8]> {
    match transport {
        TransportKind::Usb => match data[0] {
            INPUT_REPORT_USB | INPUT_REPORT_EXTENDED => Ok(&data[1..]),
            id => Err(Error::BadReport(BadReport::UnexpectedReportId(id))),
        },
        TransportKind::Bluetooth => {
            if data[0] != INPUT_REPORT_BT {
                return Err(Error::BadReport(BadReport::UnexpectedReportId(data[0])));
            }
            if data[1] != 0x02 {
                // Not an extended-mode state frame; discard quietly.
                return Err(Error::BadReport(BadReport::UnexpectedReportId(data[1])));
            }
            Ok(&data[2..])
        }
    }
}

fn frame_ds4(transport: TransportKind, data: &[u8]) -> Result<&[u8]> {
    match transport {
        TransportKind::Usb => match data[0] {
            INPUT_REPORT_USB => Ok(&data[1..]),
            id => Err(Error::BadReport(BadReport::UnexpectedReportId(id))),
        },
        TransportKind::Bluetooth => match data[0] {
            INPUT_REPORT_DS4_BT => Ok(&data[3..]),
            id => Err(Error::BadReport(BadReport::UnexpectedReportId(id))),
        },
    }
}

/// Normalize a stick byte: center 128, full deflection ±1.0.
fn stick_axis(raw: u8) -> f32 {
    (raw.wrapping_sub(128) as i8) as f32 / 128.0
}

fn i16_at(payload: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([payload[offset], payload[offset + 1]])
}

/// Decode the 4-bit hat value.
fn decode_hat(hat: u8) -> Dpad {
    match hat & 0x0F {
        0 => Dpad::Up,
        1 => Dpad::UpRight,
        2 => Dpad::Right,
        3 => Dpad::DownRight,
        4 => Dpad::Down,
        5 => Dpad::DownLeft,
        6 => Dpad::Left,
        7 => Dpad::UpLeft,
        _ => Dpad::Center, // 8+ = released
    }
}

/// Buttons from the shared 3-byte block.
/// `b0` high nibble: square/cross/circle/triangle (hat in the low nibble).
/// `b1`: L1/R1/L2/R2/create/options/L3/R3.
/// `b2`: PS/touchpad/mic, plus Edge Fn and paddle bits (zero elsewhere).
fn decode_buttons(b0: u8, b1: u8, b2: u8) -> (Buttons, Dpad) {
    let mut buttons = Buttons::default();
    let pairs = [
        (b0 & 0x10 != 0, Buttons::SQUARE),
        (b0 & 0x20 != 0, Buttons::CROSS),
        (b0 & 0x40 != 0, Buttons::CIRCLE),
        (b0 & 0x80 != 0, Buttons::TRIANGLE),
        (b1 & 0x01 != 0, Buttons::L1),
        (b1 & 0x02 != 0, Buttons::R1),
        (b1 & 0x04 != 0, Buttons::L2),
        (b1 & 0x08 != 0, Buttons::R2),
        (b1 & 0x10 != 0, Buttons::CREATE),
        (b1 & 0x20 != 0, Buttons::OPTIONS),
        (b1 & 0x40 != 0, Buttons::L3),
        (b1 & 0x80 != 0, Buttons::R3),
        (b2 & 0x01 != 0, Buttons::PS),
        (b2 & 0x02 != 0, Buttons::TOUCHPAD),
        (b2 & 0x04 != 0, Buttons::MIC),
        (b2 & 0x10 != 0, Buttons::FN_LEFT),
        (b2 & 0x20 != 0, Buttons::FN_RIGHT),
        (b2 & 0x40 != 0, Buttons::PADDLE_LEFT),
        (b2 & 0x80 != 0, Buttons::PADDLE_RIGHT),
    ];
    for (pressed, mask) in pairs {
        if pressed {
            buttons.insert(mask);
        }
    }
    let dpad = decode_hat(b0 & 0x0F);
    buttons.insert(dpad.edge_bits());
    (buttons, dpad)
}

fn touch_at(payload: &[u8], offset: usize) -> TouchPoint {
    let word = u32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ]);
    TouchPoint::unpack(word)
}

fn decode_dualsense(payload: &[u8], battery: &mut BatteryHistory) -> InputState {
    let (buttons, dpad) = decode_buttons(payload[0x07], payload[0x08], payload[0x09]);
    InputState {
        left_stick: (stick_axis(payload[0x00]), -stick_axis(payload[0x01])),
        right_stick: (stick_axis(payload[0x02]), -stick_axis(payload[0x03])),
        left_trigger: payload[0x04] as f32 / 255.0,
        right_trigger: payload[0x05] as f32 / 255.0,
        buttons,
        dpad,
        touches: [touch_at(payload, 0x20), touch_at(payload, 0x24)],
        gyro: (
            i16_at(payload, 0x0F),
            i16_at(payload, 0x11),
            i16_at(payload, 0x13),
        ),
        accel: (
            i16_at(payload, 0x15),
            i16_at(payload, 0x17),
            i16_at(payload, 0x19),
        ),
        battery: battery.push_raw(payload[0x34] & 0x0F),
        phone_connected: payload[0x35] & 0x01 != 0,
        charging: payload[0x35] & 0x08 != 0,
        fully_charged: payload[0x36] & 0x20 != 0,
    }
}

/// DualShock 4 keeps its buttons directly behind the sticks and has no
/// touch/IMU/battery fields at these offsets; those stay at their defaults.
fn decode_ds4(payload: &[u8]) -> InputState {
    let (buttons, dpad) = decode_buttons(payload[0x04], payload[0x05], payload[0x06]);
    InputState {
        left_stick: (stick_axis(payload[0x00]), -stick_axis(payload[0x01])),
        right_stick: (stick_axis(payload[0x02]), -stick_axis(payload[0x03])),
        left_trigger: payload[0x07] as f32 / 255.0,
        right_trigger: payload[0x08] as f32 / 255.0,
        buttons,
        dpad,
        ..InputState::default()
    }
}
