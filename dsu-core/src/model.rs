// Core data models for motion samples and diagnostic snapshots.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    pub timestamp_us: u64,
    pub accel: Vec3,
    pub gyro: Vec3,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SlotSnapshot {
    pub slot: u8,
    pub connected: bool,
    pub last_update: u64,
}
