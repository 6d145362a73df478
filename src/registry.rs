/// Slot-indexed device registry: discovers controllers, hands each one a
/// session at the lowest free slot, and drives every live session from a
/// single cooperative `tick()`.
///
/// Slots are sticky: the first device to occupy a slot keeps it until its
/// session is reaped, so a controller that drops and reappears lands back
/// at the same index on a later discovery pass. Reconnection is never an
/// in-session transition — a `Disconnected` session is reaped at the top
/// of the next tick and a matching device gets a fresh session.

use hidapi::HidApi;

use crate::controller::DeviceDescriptor;
use crate::error::{Error, Result};
use crate::hid;
use crate::session::{ConnectionState, DeviceSession};

/// Hard cap on concurrently managed controllers.
pub const MAX_SLOTS: usize = 8;

pub struct DeviceRegistry {
    api: HidApi,
    slots: [Option<DeviceSession>; MAX_SLOTS],
}

impl DeviceRegistry {
    pub fn new() -> Result<Self> {
        let api = HidApi::new().map_err(Error::Discovery)?;
        Ok(Self {
            api,
            slots: Default::default(),
        })
    }

    /// One cooperative step: reap dead sessions, discover new devices,
    /// then tick every live session in slot order.
    pub fn tick(&mut self) {
        self.reap();
        self.discover();
        for session in self.slots.iter_mut().flatten() {
            session.tick();
        }
    }

    /// Free the slots of sessions that reached `Disconnected`.
    fn reap(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(session) = slot {
                if session.connection_state() == ConnectionState::Disconnected {
                    log::info!(
                        "slot {}: reaping disconnected {}",
                        session.slot_id(),
                        session.model()
                    );
                    *slot = None;
                }
            }
        }
    }

    /// Enumerate attached controllers and build sessions for paths nobody
    /// owns yet. Failures here are recoverable: the next tick retries.
    fn discover(&mut self) {
        if let Err(e) = self.api.refresh_devices() {
            log::debug!("device refresh failed: {e}");
            return;
        }
        for descriptor in hid::enumerate(&self.api) {
            if owns_path(&self.slots, &descriptor.path) {
                continue;
            }
            let Some(slot) = lowest_free_slot(&self.slots) else {
                log::warn!("ignoring {}: all {MAX_SLOTS} slots occupied", descriptor.model);
                break;
            };
            match self.attach(descriptor, slot) {
                Ok(()) => {}
                Err(e) => log::warn!("slot {slot}: open failed, retrying next tick: {e}"),
            }
        }
    }

    fn attach(&mut self, descriptor: DeviceDescriptor, slot: usize) -> Result<()> {
        let transport = hid::open(&self.api, &descriptor)?;
        log::info!(
            "slot {slot}: connected {} ({})",
            descriptor.model,
            descriptor.transport
        );
        let mut session = DeviceSession::new(descriptor, slot as u8);
        session.open(Box::new(transport))?;
        session.start();
        self.slots[slot] = Some(session);
        Ok(())
    }

    pub fn get(&self, slot_id: u8) -> Option<&DeviceSession> {
        self.slots.get(slot_id as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, slot_id: u8) -> Option<&mut DeviceSession> {
        self.slots.get_mut(slot_id as usize)?.as_mut()
    }

    /// Live sessions in slot order.
    pub fn sessions(&self) -> impl Iterator<Item = (u8, &DeviceSession)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i as u8, s)))
    }

    pub fn sessions_mut(&mut self) -> impl Iterator<Item = (u8, &mut DeviceSession)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|s| (i as u8, s)))
    }

    /// Tear down and drop one session; its slot frees immediately.
    pub fn remove(&mut self, slot_id: u8) {
        if let Some(slot) = self.slots.get_mut(slot_id as usize) {
            if let Some(session) = slot {
                session.close();
            }
            *slot = None;
        }
    }

    /// Tear down every session.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(session) = slot {
                session.close();
            }
            *slot = None;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn owns_path(slots: &[Option<DeviceSession>], path: &str) -> bool {
    slots
        .iter()
        .flatten()
        .any(|session| session.descriptor().path == path)
}

fn lowest_free_slot(slots: &[Option<DeviceSession>]) -> Option<usize> {
    slots.iter().position(|s| s.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{DeviceModel, TransportKind};

    fn session(path: &str, slot: u8) -> DeviceSession {
        DeviceSession::new(
            DeviceDescriptor {
                path: path.into(),
                vendor_id: 0x054C,
                product_id: 0x0CE6,
                transport: TransportKind::Usb,
                model: DeviceModel::DualSense,
            },
            slot,
        )
    }

    #[test]
    fn lowest_free_slot_fills_gaps_first() {
        let mut slots: [Option<DeviceSession>; MAX_SLOTS] = Default::default();
        assert_eq!(lowest_free_slot(&slots), Some(0));
        slots[0] = Some(session("a", 0));
        slots[1] = Some(session("b", 1));
        assert_eq!(lowest_free_slot(&slots), Some(2));
        slots[1] = None; // device at slot 1 went away
        assert_eq!(lowest_free_slot(&slots), Some(1));
    }

    #[test]
    fn all_slots_occupied_means_no_assignment() {
        let mut slots: [Option<DeviceSession>; MAX_SLOTS] = Default::default();
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = Some(session(&format!("pad-{i}"), i as u8));
        }
        assert_eq!(lowest_free_slot(&slots), None);
    }

    #[test]
    fn path_ownership_is_per_device() {
        let mut slots: [Option<DeviceSession>; MAX_SLOTS] = Default::default();
        slots[4] = Some(session(r"\\?\hid#pad-a", 4));
        assert!(owns_path(&slots, r"\\?\hid#pad-a"));
        assert!(!owns_path(&slots, r"\\?\hid#pad-b"));
    }
}
