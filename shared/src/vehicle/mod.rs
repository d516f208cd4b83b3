pub mod transform;

pub use transform::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle numbers are only unique within a vehicle type, so both bytes form the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct VehicleIdentity {
    pub vehicle_num: u8,
    pub vehicle_type: u8,
}

impl VehicleIdentity {
    pub fn new(vehicle_num: u8, vehicle_type: u8) -> Self {
        Self {
            vehicle_num,
            vehicle_type,
        }
    }
}

impl fmt::Display for VehicleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.vehicle_type, self.vehicle_num)
    }
}

/// One row of the vehicle type table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VehicleTypeConfig {
    pub type_code: u8,
    pub display_name: String,
    pub motor_count: u32,
    pub servo_count: u32,
    /// Opaque handle the host uses to pick the visual actor for this type.
    #[serde(default)]
    pub actor_class: Option<String>,
}

impl VehicleTypeConfig {
    pub fn new(type_code: u8, display_name: &str, motor_count: u32, servo_count: u32) -> Self {
        Self {
            type_code,
            display_name: display_name.to_string(),
            motor_count,
            servo_count,
            actor_class: None,
        }
    }
}
