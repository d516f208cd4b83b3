use crate::vehicle::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known state of one simulated vehicle.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VehicleRuntimeState {
    pub identity: VehicleIdentity,
    pub position: Vector3,
    pub rotation: Quaternion,
    pub motor_speeds: Vec<f32>,
    pub servo_positions: Vec<Vector3>,
    pub servo_rotations: Vec<Quaternion>,
    pub last_update_time: DateTime<Utc>,
}

impl VehicleRuntimeState {
    pub fn new(identity: VehicleIdentity, last_update_time: DateTime<Utc>) -> Self {
        Self {
            identity,
            position: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            motor_speeds: Vec::new(),
            servo_positions: Vec::new(),
            servo_rotations: Vec::new(),
            last_update_time,
        }
    }
}
