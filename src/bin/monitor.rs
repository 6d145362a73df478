/// Diagnostic daemon: discovers controllers, logs their input, and gives
/// each slot a recognizable identity (lightbar color + player LED pattern)
/// so multi-pad setups can be told apart at a glance.

use std::thread;
use std::time::Duration;

use sonypad::{ConnectionState, DeviceRegistry, MicLed, PlayerLed};

/// Poll cadence; matches the transport read timeout.
const TICK_INTERVAL: Duration = Duration::from_millis(4);

/// Per-slot lightbar colors and LED patterns, mirroring the console's
/// player assignment: blue, red, green, white.
const SLOT_COLORS: [(u8, u8, u8); 4] = [(0, 0, 255), (255, 0, 0), (0, 255, 0), (255, 255, 255)];
const SLOT_PATTERNS: [u16; 4] = [
    PlayerLed::PLAYER_1,
    PlayerLed::PLAYER_2,
    PlayerLed::PLAYER_3,
    PlayerLed::ALL,
];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("sonypad monitor starting...");

    let mut registry = match DeviceRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            log::error!("failed to initialize HID: {e}");
            std::process::exit(1);
        }
    };

    let mut known = [false; sonypad::MAX_SLOTS];
    let mut battery_logged = [0u8; sonypad::MAX_SLOTS];

    loop {
        registry.tick();

        // Decorate sessions that appeared on this tick.
        for (slot, session) in registry.sessions_mut() {
            let index = slot as usize;
            if known[index] {
                continue;
            }
            known[index] = true;
            log::info!(
                "slot {slot}: {} over {}",
                session.descriptor().model,
                session.descriptor().transport
            );

            let (r, g, b) = SLOT_COLORS[index % SLOT_COLORS.len()];
            session.set_lightbar(r, g, b, 255);
            session.set_player_led(SLOT_PATTERNS[index % SLOT_PATTERNS.len()], 0);
            session.set_mic_led(MicLed::Off);

            session.on_button(move |name, pressed| {
                log::info!("slot {slot}: {name} {}", if pressed { "pressed" } else { "released" });
            });
            session.on_axis(move |name, value| {
                log::debug!("slot {slot}: {name} = {value:+.3}");
            });
        }

        // Track battery and departures.
        for index in 0..sonypad::MAX_SLOTS {
            match registry.get(index as u8) {
                Some(session) if session.connection_state() == ConnectionState::Polling => {
                    let level = session.state().battery;
                    if level != battery_logged[index] && level > 0 {
                        log::info!("slot {index}: battery {level}%");
                        battery_logged[index] = level;
                    }
                }
                Some(_) => {}
                None => {
                    if known[index] {
                        log::info!("slot {index}: controller departed");
                        known[index] = false;
                        battery_logged[index] = 0;
                    }
                }
            }
        }

        thread::sleep(TICK_INTERVAL);
    }
}
