/// Per-device session: the state machine that owns one controller's handle,
/// its latest input snapshot, and the pending output state.
///
/// ```text
///            open()
/// Unopened ────────▶ Open ──start──▶ Polling
///    ▲                │                 │
///    │              close           error | close
///    │                ▼                 ▼
///    └── discard ── Disconnected ◀──────┘
/// ```
///
/// `Disconnected` is terminal for the life of the session; the registry
/// reaps the session and may build a fresh one at the same slot when the
/// device reappears. All work happens inside `tick()` on the caller's
/// thread: read, decode, callback dispatch, then a coalesced write of the
/// desired output (only when the encoded bytes changed since the last
/// send).

use crate::battery::BatteryHistory;
use crate::controller::{DeviceDescriptor, DeviceModel};
use crate::error::Result;
use crate::hid::{Transport, REPORT_BUF_LEN};
use crate::input::{self, InputState, TouchPoint, BUTTON_NAMES};
use crate::output::{self, AudioConfig, DesiredOutput, MicLed, OutputFrame, PlayerLed};
use crate::trigger::TriggerEffect;

/// Consecutive write failures tolerated before the session gives up on the
/// device.
const WRITE_FAILURE_LIMIT: u8 = 3;

const STANDARD_GRAVITY: f32 = 9.81;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unopened,
    Open,
    Polling,
    Disconnected,
}

/// Which trigger a `set_trigger` call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
}

/// One motion sample delivered to the host. Gravity is the accelerometer
/// direction normalized to 9.81 m/s²; tilt is the componentwise sum of
/// accelerometer and gyro, matching what engines expect from a motion
/// event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionReading {
    pub gyro: [f32; 3],
    pub accel: [f32; 3],
    pub gravity: [f32; 3],
    pub tilt: [f32; 3],
}

type ButtonCallback = Box<dyn FnMut(&str, bool)>;
type AxisCallback = Box<dyn FnMut(&str, f32)>;
type TouchCallback = Box<dyn FnMut(u8, TouchPoint, TouchPhase)>;
type MotionCallback = Box<dyn FnMut(&MotionReading)>;

pub struct DeviceSession {
    descriptor: DeviceDescriptor,
    slot_id: u8,
    state: ConnectionState,
    transport: Option<Box<dyn Transport>>,
    input: InputState,
    output: DesiredOutput,
    battery: BatteryHistory,
    read_buf: [u8; REPORT_BUF_LEN],
    last_sent: Option<OutputFrame>,
    write_failures: u8,
    touch_enabled: bool,
    motion_enabled: bool,
    button_cb: Option<ButtonCallback>,
    axis_cb: Option<AxisCallback>,
    touch_cb: Option<TouchCallback>,
    motion_cb: Option<MotionCallback>,
}

impl DeviceSession {
    pub fn new(descriptor: DeviceDescriptor, slot_id: u8) -> Self {
        Self {
            descriptor,
            slot_id,
            state: ConnectionState::Unopened,
            transport: None,
            input: InputState::default(),
            output: DesiredOutput::default(),
            battery: BatteryHistory::new(),
            read_buf: [0; REPORT_BUF_LEN],
            last_sent: None,
            write_failures: 0,
            touch_enabled: false,
            motion_enabled: false,
            button_cb: None,
            axis_cb: None,
            touch_cb: None,
            motion_cb: None,
        }
    }

    /// Take ownership of an opened transport. Flushes any queued input and
    /// sends the initial frame, which releases both triggers and applies
    /// the default output state. Failure leaves the session `Disconnected`.
    pub fn open(&mut self, mut transport: Box<dyn Transport>) -> Result<()> {
        if self.state != ConnectionState::Unopened {
            log::debug!("slot {}: open() ignored in state {:?}", self.slot_id, self.state);
            return Ok(());
        }
        transport.flush_input();
        let frame = output::encode(
            self.descriptor.model,
            self.descriptor.transport,
            &self.output,
            true,
        );
        match transport.write(frame.as_bytes()) {
            Ok(()) => {
                self.transport = Some(transport);
                self.last_sent = Some(frame);
                self.state = ConnectionState::Open;
                Ok(())
            }
            Err(e) => {
                log::warn!("slot {}: initial write failed: {e}", self.slot_id);
                self.disconnect();
                Err(e)
            }
        }
    }

    /// Begin polling. No-op unless the session is `Open`.
    pub fn start(&mut self) {
        if self.state == ConnectionState::Open {
            self.state = ConnectionState::Polling;
        }
    }

    /// One cooperative step: read and decode at most one report, dispatch
    /// host callbacks, then write the pending output if it changed.
    pub fn tick(&mut self) {
        if self.state != ConnectionState::Polling {
            return;
        }
        if let Err(e) = self.poll_input() {
            if e.is_fatal() {
                log::warn!("slot {}: {e}; disconnecting", self.slot_id);
                self.disconnect();
                return;
            }
            log::debug!("slot {}: discarded report: {e}", self.slot_id);
        }
        self.write_if_changed();
    }

    fn poll_input(&mut self) -> Result<()> {
        let transport = match self.transport.as_mut() {
            Some(t) => t,
            None => return Ok(()),
        };
        let n = transport.read(&mut self.read_buf)?;
        if n == 0 {
            // Timed out: no event this tick.
            return Ok(());
        }
        let snapshot = input::decode(
            self.descriptor.model,
            self.descriptor.transport,
            &self.read_buf[..n],
            &mut self.battery,
        )?;
        let previous = std::mem::replace(&mut self.input, snapshot);
        self.dispatch_events(&previous);
        Ok(())
    }

    /// Fire callbacks for everything that changed between two snapshots,
    /// in report order: buttons, axes, touch, motion.
    fn dispatch_events(&mut self, prev: &InputState) {
        let next = self.input;
        if let Some(cb) = self.button_cb.as_mut() {
            for &(mask, name) in BUTTON_NAMES {
                let was = prev.buttons.contains(mask);
                let is = next.buttons.contains(mask);
                if was != is {
                    cb(name, is);
                }
            }
        }
        if let Some(cb) = self.axis_cb.as_mut() {
            let axes = [
                ("left_stick_x", prev.left_stick.0, next.left_stick.0),
                ("left_stick_y", prev.left_stick.1, next.left_stick.1),
                ("right_stick_x", prev.right_stick.0, next.right_stick.0),
                ("right_stick_y", prev.right_stick.1, next.right_stick.1),
                ("left_trigger", prev.left_trigger, next.left_trigger),
                ("right_trigger", prev.right_trigger, next.right_trigger),
            ];
            for (name, before, after) in axes {
                if before != after {
                    cb(name, after);
                }
            }
        }
        if self.touch_enabled {
            if let Some(cb) = self.touch_cb.as_mut() {
                for (index, (was, now)) in prev.touches.iter().zip(next.touches).enumerate() {
                    let phase = match (was.down, now.down) {
                        (false, true) => Some(TouchPhase::Began),
                        (true, true) if was.x != now.x || was.y != now.y => {
                            Some(TouchPhase::Moved)
                        }
                        (true, false) => Some(TouchPhase::Ended),
                        _ => None,
                    };
                    if let Some(phase) = phase {
                        cb(index as u8, now, phase);
                    }
                }
            }
        }
        if self.motion_enabled {
            if let Some(cb) = self.motion_cb.as_mut() {
                let reading = motion_reading(&next);
                cb(&reading);
            }
        }
    }

    fn write_if_changed(&mut self) {
        let frame = output::encode(
            self.descriptor.model,
            self.descriptor.transport,
            &self.output,
            false,
        );
        if self.last_sent.as_ref() == Some(&frame) {
            return;
        }
        self.write_frame(frame);
    }

    fn write_frame(&mut self, frame: OutputFrame) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        match transport.write(frame.as_bytes()) {
            Ok(()) => {
                self.write_failures = 0;
                self.last_sent = Some(frame);
            }
            Err(e) => {
                self.write_failures += 1;
                if e.is_fatal() || self.write_failures >= WRITE_FAILURE_LIMIT {
                    log::warn!("slot {}: write failed ({e}); disconnecting", self.slot_id);
                    self.disconnect();
                } else {
                    log::debug!(
                        "slot {}: write failed ({}/{WRITE_FAILURE_LIMIT}): {e}",
                        self.slot_id,
                        self.write_failures
                    );
                }
            }
        }
    }

    /// Force a write of the current output state even if unchanged.
    pub fn flush(&mut self) {
        if !matches!(self.state, ConnectionState::Open | ConnectionState::Polling) {
            return;
        }
        let frame = output::encode(
            self.descriptor.model,
            self.descriptor.transport,
            &self.output,
            false,
        );
        self.write_frame(frame);
    }

    /// Tear the session down. Terminal: the registry reaps the session on
    /// its next tick and a reappearing device gets a fresh one.
    pub fn close(&mut self) {
        if self.state != ConnectionState::Disconnected {
            self.disconnect();
        }
    }

    fn disconnect(&mut self) {
        // Dropping the transport closes the OS handle; the reusable
        // buffers are zeroed so nothing leaks into a reopened session.
        self.transport = None;
        self.read_buf = [0; REPORT_BUF_LEN];
        self.last_sent = None;
        self.write_failures = 0;
        self.battery.reset();
        self.state = ConnectionState::Disconnected;
    }

    // Host-facing output setters. All of them only mutate `DesiredOutput`;
    // the encoded report goes out on the next tick (or flush), so a burst
    // of calls within one tick coalesces into a single write.

    pub fn set_rumble(&mut self, left: u8, right: u8) {
        self.output.rumble = (left, right);
    }

    pub fn set_lightbar(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.output.lightbar = (r, g, b, a);
    }

    pub fn set_player_led(&mut self, pattern: u16, brightness: u8) {
        if !self.descriptor.model.has_player_leds() {
            log::debug!("slot {}: {} has no player LEDs", self.slot_id, self.descriptor.model);
            return;
        }
        self.output.player_led = PlayerLed { pattern, brightness };
    }

    pub fn set_mic_led(&mut self, mode: MicLed) {
        if !self.descriptor.model.has_mic_led() {
            log::debug!("slot {}: {} has no mic LED", self.slot_id, self.descriptor.model);
            return;
        }
        self.output.mic_led = mode;
    }

    pub fn set_trigger(&mut self, hand: Hand, effect: TriggerEffect) {
        if !self.descriptor.model.has_adaptive_triggers() {
            log::debug!(
                "slot {}: {} has no adaptive triggers",
                self.slot_id,
                self.descriptor.model
            );
            return;
        }
        if let Err(e) = effect.validate() {
            log::warn!("slot {}: {e}; clamping", self.slot_id);
        }
        match hand {
            Hand::Left => self.output.left_trigger = effect,
            Hand::Right => self.output.right_trigger = effect,
            Hand::Both => {
                self.output.left_trigger = effect;
                self.output.right_trigger = effect;
            }
        }
    }

    pub fn set_feature_flags(&mut self, flags: u8) {
        self.output.feature_flags = flags;
    }

    pub fn set_vibration_mode(&mut self, mode: u8) {
        self.output.vibration_mode = mode;
    }

    pub fn set_audio(&mut self, audio: AudioConfig) {
        self.output.audio = audio;
    }

    pub fn set_touch_enabled(&mut self, enabled: bool) {
        self.touch_enabled = enabled;
    }

    pub fn set_motion_enabled(&mut self, enabled: bool) {
        self.motion_enabled = enabled;
    }

    // Host callbacks, invoked synchronously inside `tick`. The host must
    // not call back into the registry from inside one.

    pub fn on_button(&mut self, cb: impl FnMut(&str, bool) + 'static) {
        self.button_cb = Some(Box::new(cb));
    }

    pub fn on_axis(&mut self, cb: impl FnMut(&str, f32) + 'static) {
        self.axis_cb = Some(Box::new(cb));
    }

    pub fn on_touch(&mut self, cb: impl FnMut(u8, TouchPoint, TouchPhase) + 'static) {
        self.touch_cb = Some(Box::new(cb));
    }

    pub fn on_motion(&mut self, cb: impl FnMut(&MotionReading) + 'static) {
        self.motion_cb = Some(Box::new(cb));
    }

    /// Latest decoded snapshot. After a disconnect this is the last good
    /// state observed.
    pub fn state(&self) -> &InputState {
        &self.input
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn slot_id(&self) -> u8 {
        self.slot_id
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn model(&self) -> DeviceModel {
        self.descriptor.model
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("slot_id", &self.slot_id)
            .field("model", &self.descriptor.model)
            .field("transport", &self.descriptor.transport)
            .field("state", &self.state)
            .finish()
    }
}

fn motion_reading(state: &InputState) -> MotionReading {
    let gyro = [state.gyro.0 as f32, state.gyro.1 as f32, state.gyro.2 as f32];
    let accel = [
        state.accel.0 as f32,
        state.accel.1 as f32,
        state.accel.2 as f32,
    ];
    let magnitude = (accel[0] * accel[0] + accel[1] * accel[1] + accel[2] * accel[2]).sqrt();
    let gravity = if magnitude > 0.0 {
        [
            accel[0] / magnitude * STANDARD_GRAVITY,
            accel[1] / magnitude * STANDARD_GRAVITY,
            accel[2] / magnitude * STANDARD_GRAVITY,
        ]
    } else {
        [0.0; 3]
    };
    let tilt = [gyro[0] + accel[0], gyro[1] + accel[1], gyro[2] + accel[2]];
    MotionReading { gyro, accel, gravity, tilt }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{DeviceModel, TransportKind};
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    enum Step {
        Report(Vec<u8>),
        Silence,
        Fail,
    }

    /// Transport driven by a script of read outcomes; writes are captured
    /// for inspection.
    struct ScriptedTransport {
        steps: RefCell<VecDeque<Step>>,
        writes: Rc<RefCell<Vec<Vec<u8>>>>,
        reads_attempted: Rc<RefCell<u32>>,
        fail_writes: bool,
    }

    impl ScriptedTransport {
        fn new(steps: Vec<Step>) -> (Self, Rc<RefCell<Vec<Vec<u8>>>>, Rc<RefCell<u32>>) {
            let writes = Rc::new(RefCell::new(Vec::new()));
            let reads = Rc::new(RefCell::new(0));
            let t = Self {
                steps: RefCell::new(steps.into()),
                writes: Rc::clone(&writes),
                reads_attempted: Rc::clone(&reads),
                fail_writes: false,
            };
            (t, writes, reads)
        }
    }

    impl Transport for ScriptedTransport {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            *self.reads_attempted.borrow_mut() += 1;
            match self.steps.borrow_mut().pop_front() {
                Some(Step::Report(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(Step::Silence) | None => Ok(0),
                Some(Step::Fail) => Err(Error::Io(hidapi::HidError::HidApiError {
                    message: "scripted failure".into(),
                })),
            }
        }

        fn write(&mut self, buf: &[u8]) -> Result<()> {
            if self.fail_writes {
                return Err(Error::Disconnected);
            }
            self.writes.borrow_mut().push(buf.to_vec());
            Ok(())
        }

        fn flush_input(&mut self) {}
    }

    fn descriptor(model: DeviceModel, transport: TransportKind) -> DeviceDescriptor {
        DeviceDescriptor {
            path: r"\\?\hid#test".into(),
            vendor_id: 0x054C,
            product_id: 0x0CE6,
            transport,
            model,
        }
    }

    fn usb_report(mutate: impl FnOnce(&mut [u8; 64])) -> Vec<u8> {
        let mut data = [0u8; 64];
        data[0] = 0x01;
        data[1] = 128;
        data[2] = 128;
        data[3] = 128;
        data[4] = 128;
        data[8] = 0x08; // hat released
        data[0x21] = 0x80; // touch 1 lifted
        data[0x25] = 0x80; // touch 2 lifted
        mutate(&mut data);
        data.to_vec()
    }

    #[test]
    fn open_sends_trigger_release_frame() {
        let (t, writes, _) = ScriptedTransport::new(vec![]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        session.open(Box::new(t)).unwrap();
        assert_eq!(session.connection_state(), ConnectionState::Open);
        let writes = writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0][0], 0x02);
        assert_eq!(writes[0][1 + 0x0A], crate::trigger::MODE_RESET);
        assert_eq!(writes[0][1 + 0x15], crate::trigger::MODE_RESET);
    }

    #[test]
    fn rumble_reaches_the_wire_on_tick() {
        let (t, writes, _) = ScriptedTransport::new(vec![Step::Silence]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        session.open(Box::new(t)).unwrap();
        session.start();
        session.set_rumble(0x80, 0x40);
        session.tick();
        let writes = writes.borrow();
        let last = writes.last().unwrap();
        assert_eq!(last[0], 0x02);
        assert_eq!(last[3], 0x40); // right
        assert_eq!(last[4], 0x80); // left
    }

    #[test]
    fn unchanged_output_is_not_rewritten() {
        let (t, writes, _) = ScriptedTransport::new(vec![]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick(); // trigger release → steady state
        let settled = writes.borrow().len();
        session.tick();
        session.tick();
        assert_eq!(writes.borrow().len(), settled);
        // Several setter calls within one tick coalesce into one write,
        // carrying only the final values.
        session.set_rumble(10, 10);
        session.set_rumble(20, 20);
        session.tick();
        assert_eq!(writes.borrow().len(), settled + 1);
        let last = writes.borrow().last().unwrap().clone();
        assert_eq!(last[3], 20);
        assert_eq!(last[4], 20);
    }

    #[test]
    fn flush_forces_a_write_without_change() {
        let (t, writes, _) = ScriptedTransport::new(vec![Step::Silence]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick();
        let before = writes.borrow().len();
        session.flush();
        assert_eq!(writes.borrow().len(), before + 1);
    }

    #[test]
    fn read_failure_disconnects_and_stops_polling() {
        let (t, _, reads) = ScriptedTransport::new(vec![Step::Fail]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            3,
        );
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick();
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);
        let attempts = *reads.borrow();
        // A disconnected session must not touch the transport again.
        session.tick();
        session.flush();
        assert_eq!(*reads.borrow(), attempts);
        assert_eq!(session.slot_id(), 3);
    }

    #[test]
    fn button_edges_fire_callbacks() {
        let press = usb_report(|d| d[8] = 0x28); // cross + hat released
        let release = usb_report(|d| d[8] = 0x08);
        let (t, _, _) = ScriptedTransport::new(vec![Step::Report(press), Step::Report(release)]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        let events: Rc<RefCell<Vec<(String, bool)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        session.on_button(move |name, pressed| {
            sink.borrow_mut().push((name.to_string(), pressed));
        });
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick();
        session.tick();
        let events = events.borrow();
        assert_eq!(
            &*events,
            &[("cross".to_string(), true), ("cross".to_string(), false)]
        );
    }

    #[test]
    fn axis_callbacks_report_new_value() {
        let pull = usb_report(|d| d[6] = 255); // right trigger full
        let (t, _, _) = ScriptedTransport::new(vec![Step::Report(pull)]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        let events: Rc<RefCell<Vec<(String, f32)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        session.on_axis(move |name, value| {
            sink.borrow_mut().push((name.to_string(), value));
        });
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick();
        let events = events.borrow();
        assert_eq!(&*events, &[("right_trigger".to_string(), 1.0)]);
    }

    #[test]
    fn touch_callback_fires_on_contact_begin() {
        let idle = usb_report(|_| {});
        // Touch point 1: id 5, down, at (100, 200).
        let word: u32 = 5 | (100 << 8) | (200 << 20);
        let touched = usb_report(|d| d[0x21..0x25].copy_from_slice(&word.to_le_bytes()));
        let (t, _, _) = ScriptedTransport::new(vec![
            Step::Report(idle.clone()),
            Step::Report(touched.clone()),
            Step::Report(touched),
        ]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        let count = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&count);
        session.on_touch(move |index, point, phase| {
            assert_eq!(index, 0);
            assert_eq!(phase, TouchPhase::Began);
            assert_eq!((point.x, point.y), (100, 200));
            *sink.borrow_mut() += 1;
        });
        session.set_touch_enabled(true);
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick(); // idle report: no contact
        assert_eq!(*count.borrow(), 0);
        session.tick(); // contact begins
        assert_eq!(*count.borrow(), 1);
        session.tick(); // unchanged contact: no further event
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn ds4_session_ignores_dualsense_setters() {
        let (t, writes, _) = ScriptedTransport::new(vec![Step::Silence, Step::Silence]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualShock4, TransportKind::Usb),
            0,
        );
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick();
        let settled = writes.borrow().len();
        session.set_trigger(
            Hand::Both,
            TriggerEffect::Weapon { start: 2, end: 6, strength: 100 },
        );
        session.set_mic_led(MicLed::On);
        session.set_player_led(PlayerLed::ALL, 0);
        session.tick();
        // None of those outputs exist on a DS4 frame, so nothing changed.
        assert_eq!(writes.borrow().len(), settled);
    }

    #[test]
    fn disconnect_keeps_last_snapshot() {
        let press = usb_report(|d| d[8] = 0x28);
        let (t, _, _) = ScriptedTransport::new(vec![Step::Report(press), Step::Fail]);
        let mut session = DeviceSession::new(
            descriptor(DeviceModel::DualSense, TransportKind::Usb),
            0,
        );
        session.open(Box::new(t)).unwrap();
        session.start();
        session.tick();
        assert!(session.state().buttons.contains(crate::input::Buttons::CROSS));
        session.tick();
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);
        // The last good snapshot survives the teardown.
        assert!(session.state().buttons.contains(crate::input::Buttons::CROSS));
    }

    #[test]
    fn motion_gravity_is_normalized() {
        let mut state = InputState::default();
        state.accel = (0, 8192, 0);
        state.gyro = (10, 20, 30);
        let reading = motion_reading(&state);
        assert!((reading.gravity[1] - STANDARD_GRAVITY).abs() < 1e-3);
        assert_eq!(reading.gravity[0], 0.0);
        assert_eq!(reading.tilt[0], 10.0);
        assert_eq!(reading.tilt[1], 20.0 + 8192.0);
    }
}
