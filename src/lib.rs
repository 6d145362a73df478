//! User-space HID driver for Sony DualSense and DualShock 4 gamepads on
//! Windows.
//!
//! The [`DeviceRegistry`] discovers matching controllers over USB or
//! Bluetooth and assigns each one a [`DeviceSession`] at a stable slot
//! index. The host drives everything from a single cooperative
//! [`DeviceRegistry::tick`]: each live session reads and decodes one input
//! report into an [`InputState`], fires the host's callbacks, and writes
//! its pending [`DesiredOutput`] (rumble, adaptive trigger effects,
//! lightbar, player and microphone LEDs) whenever the encoded report
//! changed. Bluetooth output frames carry the PlayStation CRC-32 suffix.
//!
//! ```no_run
//! use sonypad::{DeviceRegistry, TriggerEffect, Hand};
//!
//! let mut registry = DeviceRegistry::new()?;
//! for _ in 0..250 {
//!     registry.tick();
//!     for (slot, session) in registry.sessions_mut() {
//!         session.set_lightbar(0, 64, 255, 255);
//!         if slot == 0 {
//!             session.set_trigger(
//!                 Hand::Right,
//!                 TriggerEffect::Weapon { start: 2, end: 6, strength: 200 },
//!             );
//!         }
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(4));
//! }
//! # Ok::<(), sonypad::Error>(())
//! ```

pub mod battery;
pub mod controller;
pub mod crc32;
pub mod error;
pub mod hid;
pub mod input;
pub mod output;
pub mod registry;
pub mod session;
pub mod trigger;

pub use controller::{DeviceDescriptor, DeviceModel, TransportKind};
pub use error::{Error, Result};
pub use input::{Buttons, Dpad, InputState, TouchPoint};
pub use output::{AudioConfig, DesiredOutput, MicLed, PlayerLed};
pub use registry::{DeviceRegistry, MAX_SLOTS};
pub use session::{ConnectionState, DeviceSession, Hand, MotionReading, TouchPhase};
pub use trigger::TriggerEffect;
