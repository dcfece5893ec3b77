// Application state shared by the gateway, dispatch, and HTTP layers.
// Invariants: both registries live behind a single lock, so no two protocol
// handlers ever observe each other mid-mutation.

use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::RwLock;

use dsu_core::slots::SlotRegistry;
use dsu_core::subscribers::SubscriberRegistry;

pub struct Hub {
    pub slots: SlotRegistry,
    pub subscribers: SubscriberRegistry,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            slots: SlotRegistry::new(),
            subscribers: SubscriberRegistry::new(),
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<RwLock<Hub>>,
    pub socket: Arc<UdpSocket>,
    pub server_id: u32,
}
