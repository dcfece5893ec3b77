// Motion submission shared by the session gateway.
// Invariants: one pad-data packet is built per sample and sent unchanged to
// every live subscriber; send failures are logged and never propagated.

use serde::Deserialize;
use tracing::warn;

use dsu_core::error::RegistryError;
use dsu_core::model::{MotionSample, Vec3};
use dsu_core::report::build_pad_data;

use crate::app::AppState;
use crate::utils::now_epoch_ms;

#[derive(Debug, Deserialize)]
pub struct MotionInput {
    pub timestamp_ms: f64,
    pub gyro: Vec3,
    #[serde(default)]
    pub accel: Vec3,
}

pub async fn submit_motion(
    state: &AppState,
    slot: u8,
    input: MotionInput,
) -> Result<(), RegistryError> {
    let now_ms = now_epoch_ms();
    let sample = MotionSample {
        timestamp_us: (input.timestamp_ms * 1_000.0) as u64,
        accel: input.accel,
        gyro: input.gyro,
    };

    let (packet_counter, targets) = {
        let mut hub = state.hub.write().await;
        let counter = hub.slots.update(slot, sample, now_ms)?;
        (counter, hub.subscribers.targets_for(slot, now_ms))
    };

    if targets.is_empty() {
        return Ok(());
    }

    let packet = build_pad_data(state.server_id, slot, packet_counter, &sample);
    for target in targets {
        if let Err(err) = state.socket.send_to(&packet, target).await {
            warn!(?err, %target, slot, "pad data send failed");
        }
    }
    Ok(())
}
