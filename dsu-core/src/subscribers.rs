// Subscriber registry for DSU consumers requesting pad reports.
// Invariants: an entry exists only after a valid registration request;
// stale entries are removed by the sweep, never just flagged.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use crate::{MAX_SLOTS, SUBSCRIBER_TIMEOUT_MS};

pub const FLAG_SLOT_FILTER: u8 = 0x01;
pub const FLAG_MAC_FILTER: u8 = 0x02;

/// Reserved MAC that subscribes a consumer to every slot at once.
pub const BROADCAST_MAC: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x00, 0xFF];

#[derive(Clone, Debug)]
struct Subscriber {
    last_request_ms: u64,
    slots: HashSet<u8>,
}

#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<SocketAddr, Subscriber>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the subscriber on first contact and always refreshes its
    /// request timestamp. The slot-filter and mac-filter rules are
    /// independent; a single request can add slots through both.
    pub fn register_request(
        &mut self,
        endpoint: SocketAddr,
        flags: u8,
        slot: u8,
        mac: [u8; 6],
        now_ms: u64,
    ) {
        let subscriber = self
            .subscribers
            .entry(endpoint)
            .or_insert_with(|| Subscriber {
                last_request_ms: now_ms,
                slots: HashSet::new(),
            });
        subscriber.last_request_ms = now_ms;

        if flags == 0 || (flags & FLAG_SLOT_FILTER != 0 && slot < MAX_SLOTS) {
            subscriber.slots.insert(slot);
        }
        if flags & FLAG_MAC_FILTER != 0 && mac == BROADCAST_MAC {
            subscriber.slots.extend(0..MAX_SLOTS);
        }
    }

    /// Removes subscribers not heard from within twice the timeout limit.
    /// Returns how many were dropped.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|_, subscriber| {
            now_ms.saturating_sub(subscriber.last_request_ms) <= SUBSCRIBER_TIMEOUT_MS * 2
        });
        before - self.subscribers.len()
    }

    /// Endpoints that requested reports recently enough and asked for this
    /// slot.
    pub fn targets_for(&self, slot: u8, now_ms: u64) -> Vec<SocketAddr> {
        self.subscribers
            .iter()
            .filter(|(_, subscriber)| {
                now_ms.saturating_sub(subscriber.last_request_ms) < SUBSCRIBER_TIMEOUT_MS
                    && subscriber.slots.contains(&slot)
            })
            .map(|(endpoint, _)| *endpoint)
            .collect()
    }

    pub fn subscribed_slots(&self, endpoint: &SocketAddr) -> Option<&HashSet<u8>> {
        self.subscribers
            .get(endpoint)
            .map(|subscriber| &subscriber.slots)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(port: u16) -> SocketAddr {
        format!("127.0.0.1:{}", port).parse().unwrap()
    }

    fn slots(registry: &SubscriberRegistry, endpoint: &SocketAddr) -> Vec<u8> {
        let mut ids: Vec<u8> = registry
            .subscribed_slots(endpoint)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn slot_filter_registers_one_slot() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        registry.register_request(consumer, FLAG_SLOT_FILTER, 2, [0; 6], 0);
        assert_eq!(slots(&registry, &consumer), vec![2]);
    }

    #[test]
    fn zero_flags_register_the_target_slot() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        registry.register_request(consumer, 0, 1, [0; 6], 0);
        assert_eq!(slots(&registry, &consumer), vec![1]);
    }

    #[test]
    fn slot_filter_ignores_out_of_range_ids() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        registry.register_request(consumer, FLAG_SLOT_FILTER, MAX_SLOTS, [0; 6], 0);
        assert_eq!(slots(&registry, &consumer), Vec::<u8>::new());
        // The entry itself still exists and is refreshed.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn broadcast_mac_registers_every_slot() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        registry.register_request(consumer, FLAG_MAC_FILTER, 99, BROADCAST_MAC, 0);
        assert_eq!(slots(&registry, &consumer), vec![0, 1, 2, 3]);
    }

    #[test]
    fn mac_filter_requires_the_reserved_mac() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        let mac = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
        registry.register_request(consumer, FLAG_MAC_FILTER, 0, mac, 0);
        assert_eq!(slots(&registry, &consumer), Vec::<u8>::new());
    }

    #[test]
    fn both_rules_apply_within_one_request() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        registry.register_request(
            consumer,
            FLAG_SLOT_FILTER | FLAG_MAC_FILTER,
            1,
            BROADCAST_MAC,
            0,
        );
        assert_eq!(slots(&registry, &consumer), vec![0, 1, 2, 3]);
    }

    #[test]
    fn repeated_requests_accumulate_slots() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        registry.register_request(consumer, FLAG_SLOT_FILTER, 0, [0; 6], 0);
        registry.register_request(consumer, FLAG_SLOT_FILTER, 3, [0; 6], 100);
        assert_eq!(slots(&registry, &consumer), vec![0, 3]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn sweep_removes_only_expired_subscribers() {
        let mut registry = SubscriberRegistry::new();
        let stale = endpoint(26_761);
        let live = endpoint(26_762);
        registry.register_request(stale, 0, 0, [0; 6], 0);
        registry.register_request(live, 0, 0, [0; 6], 2);

        // stale is 10 001 ms old, live is 9 999 ms old.
        assert_eq!(registry.sweep(10_001), 1);
        assert!(registry.subscribed_slots(&stale).is_none());
        assert!(registry.subscribed_slots(&live).is_some());
    }

    #[test]
    fn targets_require_recent_requests() {
        let mut registry = SubscriberRegistry::new();
        let consumer = endpoint(26_761);
        registry.register_request(consumer, FLAG_SLOT_FILTER, 1, [0; 6], 0);

        assert_eq!(
            registry.targets_for(1, SUBSCRIBER_TIMEOUT_MS - 1),
            vec![consumer]
        );
        assert!(registry
            .targets_for(1, SUBSCRIBER_TIMEOUT_MS)
            .is_empty());
        assert!(registry.targets_for(0, 0).is_empty());
    }
}
