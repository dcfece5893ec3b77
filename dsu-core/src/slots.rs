// Slot registry mapping controller slots to producer sessions.

use crate::error::RegistryError;
use crate::model::{MotionSample, SlotSnapshot};
use crate::{MAX_SLOTS, SLOT_CONNECTED_WINDOW_MS, SLOT_STALE_MS};

#[derive(Clone, Debug)]
struct SlotEntry {
    last_update_ms: u64,
    packet_counter: u32,
    last_sample: Option<MotionSample>,
}

#[derive(Debug, Default)]
pub struct SlotRegistry {
    slots: [Option<SlotEntry>; MAX_SLOTS as usize],
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first slot that is vacant or whose occupant has been
    /// silent longer than the reuse threshold. The occupying entry is
    /// replaced wholesale, so a reclaimed slot starts with a fresh counter.
    pub fn assign(&mut self, now_ms: u64) -> Result<u8, RegistryError> {
        for slot in 0..MAX_SLOTS {
            let reusable = match &self.slots[slot as usize] {
                None => true,
                Some(entry) => now_ms.saturating_sub(entry.last_update_ms) > SLOT_STALE_MS,
            };
            if reusable {
                self.slots[slot as usize] = Some(SlotEntry {
                    last_update_ms: now_ms,
                    packet_counter: 0,
                    last_sample: None,
                });
                return Ok(slot);
            }
        }
        Err(RegistryError::CapacityExceeded)
    }

    pub fn release(&mut self, slot: u8) {
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            *entry = None;
        }
    }

    /// Stores the sample, refreshes liveness, and yields the packet counter
    /// to stamp on the next report (the value before incrementing).
    pub fn update(
        &mut self,
        slot: u8,
        sample: MotionSample,
        now_ms: u64,
    ) -> Result<u32, RegistryError> {
        let entry = self
            .slots
            .get_mut(slot as usize)
            .and_then(Option::as_mut)
            .ok_or(RegistryError::SlotVacant(slot))?;
        entry.last_update_ms = now_ms;
        entry.last_sample = Some(sample);
        let counter = entry.packet_counter;
        entry.packet_counter = entry.packet_counter.wrapping_add(1);
        Ok(counter)
    }

    pub fn is_connected(&self, slot: u8, now_ms: u64) -> bool {
        match self.slots.get(slot as usize).and_then(Option::as_ref) {
            Some(entry) => now_ms.saturating_sub(entry.last_update_ms) < SLOT_CONNECTED_WINDOW_MS,
            None => false,
        }
    }

    pub fn last_sample(&self, slot: u8) -> Option<&MotionSample> {
        self.slots
            .get(slot as usize)
            .and_then(Option::as_ref)
            .and_then(|entry| entry.last_sample.as_ref())
    }

    /// Read-only diagnostic view of the occupied slots, ordered by id.
    pub fn snapshot(&self, now_ms: u64) -> Vec<SlotSnapshot> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| {
                entry.as_ref().map(|entry| SlotSnapshot {
                    slot: slot as u8,
                    connected: now_ms.saturating_sub(entry.last_update_ms)
                        < SLOT_CONNECTED_WINDOW_MS,
                    last_update: entry.last_update_ms,
                })
            })
            .collect()
    }
}
