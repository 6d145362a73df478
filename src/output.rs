/// Output report building: desired controller state → raw HID bytes.
///
/// DualSense (USB report ID 0x02, payload at +1; Bluetooth report ID 0x31
/// with the 0x02 tag, payload at +2; 78 bytes either way):
///
///   0x00  0xFF               feature enable mask, high byte
///   0x01  feature flags      default 0xF7
///   0x02  right rumble motor
///   0x03  left rumble motor
///   0x04..0x07, 0x09         audio volumes/mode/mic status (USB only)
///   0x08  mic LED mode
///   0x0A..0x13               right trigger effect block
///   0x15..0x1E               left trigger effect block
///   0x26  0x03               player LED enable
///   0x29  player LED pattern, high byte
///   0x2A  player LED brightness
///   0x2B  player LED pattern, low byte
///   0x2C..0x2E               lightbar R, G, B
///   0x30  0x80  0x31  0xFF   vibration-mode control
///   0x4A..0x4D               CRC-32 (Bluetooth only, over bytes 0..74)
///
/// DualShock 4 (USB report ID 0x05, 32 bytes; Bluetooth report ID 0x11,
/// 78 bytes with a trailing CRC-32): rumble and lightbar only.

use crate::controller::{DeviceModel, TransportKind};
use crate::crc32;
use crate::trigger::{self, TriggerEffect, EFFECT_LEN};

pub const OUTPUT_REPORT_USB: u8 = 0x02;
pub const OUTPUT_REPORT_BT: u8 = 0x31;
pub const OUTPUT_REPORT_DS4_USB: u8 = 0x05;
pub const OUTPUT_REPORT_DS4_BT: u8 = 0x11;

/// Full frame buffer size; shorter frames occupy a prefix.
pub const OUTPUT_BUF_LEN: usize = 78;

const DS4_USB_LEN: usize = 32;

/// Byte count covered by the DualSense Bluetooth checksum.
const CRC_SPAN: usize = 74;

/// Microphone LED mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MicLed {
    #[default]
    Off = 0x00,
    On = 0x01,
    Pulse = 0x02,
}

/// Player LED strip state. The low five pattern bits are the dots left to
/// right; bit 5 suppresses the fade-in animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLed {
    pub pattern: u16,
    pub brightness: u8,
}

impl PlayerLed {
    pub const PLAYER_1: u16 = 0x04;
    pub const PLAYER_2: u16 = 0x0A;
    pub const PLAYER_3: u16 = 0x15;
    pub const PLAYER_4: u16 = 0x1B;
    pub const ALL: u16 = 0x1F;
}

impl Default for PlayerLed {
    fn default() -> Self {
        Self { pattern: Self::PLAYER_1, brightness: 0x00 }
    }
}

/// Controller audio routing; sent on the wired path only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    pub mode: u8,
    pub headset_volume: u8,
    pub speaker_volume: u8,
    pub mic_volume: u8,
    pub mic_status: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            mode: 0x05,
            headset_volume: 0x7C,
            speaker_volume: 0x7C,
            mic_volume: 0x7C,
            mic_status: 0x00,
        }
    }
}

/// The next report to send. Mutated by the session setters and consumed
/// (not cleared) by the encoder; writes go out only when the encoded bytes
/// change or the host flushes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesiredOutput {
    /// (left, right) motor intensities.
    pub rumble: (u8, u8),
    /// RGBA; alpha is carried for the host's benefit but not transmitted.
    pub lightbar: (u8, u8, u8, u8),
    pub player_led: PlayerLed,
    pub mic_led: MicLed,
    pub left_trigger: TriggerEffect,
    pub right_trigger: TriggerEffect,
    /// Feature enable mask, low byte.
    pub feature_flags: u8,
    /// 0 = use the default vibration-mode control bytes.
    pub vibration_mode: u8,
    pub audio: AudioConfig,
}

impl Default for DesiredOutput {
    fn default() -> Self {
        Self {
            rumble: (0, 0),
            lightbar: (0, 0, 0, 255),
            player_led: PlayerLed::default(),
            mic_led: MicLed::default(),
            left_trigger: TriggerEffect::Off,
            right_trigger: TriggerEffect::Off,
            feature_flags: 0xF7,
            vibration_mode: 0,
            audio: AudioConfig::default(),
        }
    }
}

/// An encoded output report: a 78-byte buffer of which the first `len`
/// bytes go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFrame {
    buf: [u8; OUTPUT_BUF_LEN],
    len: usize,
}

impl OutputFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Encode the desired output for the given model and transport. Pure and
/// idempotent: equal inputs produce byte-identical frames.
///
/// `reset_triggers` substitutes the transient-clearing trigger blocks; the
/// session uses it for the first frame after open.
pub fn encode(
    model: DeviceModel,
    transport: TransportKind,
    out: &DesiredOutput,
    reset_triggers: bool,
) -> OutputFrame {
    match model {
        DeviceModel::DualSense | DeviceModel::DualSenseEdge => {
            encode_dualsense(transport, out, reset_triggers)
        }
        DeviceModel::DualShock4 => encode_ds4(transport, out),
    }
}

fn encode_dualsense(
    transport: TransportKind,
    out: &DesiredOutput,
    reset_triggers: bool,
) -> OutputFrame {
    let mut buf = [0u8; OUTPUT_BUF_LEN];
    let padding = match transport {
        TransportKind::Usb => {
            buf[0] = OUTPUT_REPORT_USB;
            1
        }
        TransportKind::Bluetooth => {
            buf[0] = OUTPUT_REPORT_BT;
            buf[1] = 0x02;
            2
        }
    };

    let (right_block, left_block) = if reset_triggers {
        (trigger::reset_block(), trigger::reset_block())
    } else {
        (out.right_trigger.encode(), out.left_trigger.encode())
    };

    {
        let payload = &mut buf[padding..];
        payload[0x00] = 0xFF;
        payload[0x01] = out.feature_flags;
        payload[0x02] = out.rumble.1;
        payload[0x03] = out.rumble.0;
        if transport == TransportKind::Usb {
            payload[0x04] = out.audio.headset_volume;
            payload[0x05] = out.audio.speaker_volume;
            payload[0x06] = out.audio.mic_volume;
            payload[0x07] = out.audio.mode;
            payload[0x09] = out.audio.mic_status;
        }
        payload[0x08] = out.mic_led as u8;
        payload[0x0A..0x0A + EFFECT_LEN].copy_from_slice(&right_block);
        payload[0x15..0x15 + EFFECT_LEN].copy_from_slice(&left_block);
        payload[0x26] = 0x03;
        payload[0x29] = (out.player_led.pattern >> 8) as u8;
        payload[0x2A] = out.player_led.brightness;
        payload[0x2B] = (out.player_led.pattern & 0xFF) as u8;
        payload[0x2C] = out.lightbar.0;
        payload[0x2D] = out.lightbar.1;
        payload[0x2E] = out.lightbar.2;
        payload[0x30] = 0x80;
        payload[0x31] = if out.vibration_mode != 0 { out.vibration_mode } else { 0xFF };
    }

    if transport == TransportKind::Bluetooth {
        crc32::stamp(&mut buf, CRC_SPAN);
    }
    OutputFrame { buf, len: OUTPUT_BUF_LEN }
}

fn encode_ds4(transport: TransportKind, out: &DesiredOutput) -> OutputFrame {
    let mut buf = [0u8; OUTPUT_BUF_LEN];
    match transport {
        TransportKind::Usb => {
            buf[0] = OUTPUT_REPORT_DS4_USB;
            buf[1] = 0x07; // rumble + lightbar enable
            buf[4] = out.rumble.1;
            buf[5] = out.rumble.0;
            buf[6] = out.lightbar.0;
            buf[7] = out.lightbar.1;
            buf[8] = out.lightbar.2;
            OutputFrame { buf, len: DS4_USB_LEN }
        }
        TransportKind::Bluetooth => {
            buf[0] = OUTPUT_REPORT_DS4_BT;
            buf[1] = 0x80; // HID output flag
            buf[3] = 0xF7; // rumble + lightbar + flash enable
            buf[6] = out.rumble.1;
            buf[7] = out.rumble.0;
            buf[8] = out.lightbar.0;
            buf[9] = out.lightbar.1;
            buf[10] = out.lightbar.2;
            crc32::stamp(&mut buf, OUTPUT_BUF_LEN - 4);
            OutputFrame { buf, len: OUTPUT_BUF_LEN }
        }
    }
}
