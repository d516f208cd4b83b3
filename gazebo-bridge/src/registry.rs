use crate::protocol::{ProtocolGeneration, FLOAT_SIZE, HEADER_SIZE};
use log::warn;
use shared::{MessageId, VehicleTypeConfig};
use std::collections::HashMap;

/// Vehicle type table, keyed by the second header byte.
#[derive(Debug, Clone, Default)]
pub struct VehicleTypeRegistry {
    types: HashMap<u8, VehicleTypeConfig>,
}

impl VehicleTypeRegistry {
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = VehicleTypeConfig>,
    {
        let mut registry = Self::default();
        registry.replace_all(rows);
        registry
    }

    /// Swap in a new table, e.g. between sessions. Later duplicates win.
    pub fn replace_all<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = VehicleTypeConfig>,
    {
        self.types.clear();
        for row in rows {
            if let Some(previous) = self.insert(row) {
                warn!(
                    "Vehicle type {} ({}) is defined more than once, using the last row",
                    previous.type_code, previous.display_name
                );
            }
        }
    }

    pub fn insert(&mut self, row: VehicleTypeConfig) -> Option<VehicleTypeConfig> {
        self.types.insert(row.type_code, row)
    }

    pub fn lookup(&self, vehicle_type: u8) -> Option<&VehicleTypeConfig> {
        self.types.get(&vehicle_type)
    }

    pub fn display_name(&self, vehicle_type: u8) -> &str {
        self.lookup(vehicle_type)
            .map(|config| config.display_name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Exact packet length for `message_id` from a vehicle of this type.
    pub fn expected_size(
        config: &VehicleTypeConfig,
        message_id: MessageId,
        generation: ProtocolGeneration,
    ) -> usize {
        match message_id {
            MessageId::Pose => generation.pose_packet_size(),
            MessageId::MotorSpeed => HEADER_SIZE + config.motor_count as usize * FLOAT_SIZE,
            MessageId::Servo => {
                HEADER_SIZE + config.servo_count as usize * generation.pose_block_size()
            }
        }
    }
}
