//! Wire format shared by every message kind:
//!
//! ```text
//! [vehicle_num: u8][vehicle_type: u8][message_id: u8][payload: f32 LE ...]
//! ```
//!
//! Two generations of the payload layout are in use. They differ only in how
//! rotations are carried (three Euler radians or a four component quaternion),
//! which changes the pose size and the per-servo stride.

pub mod bytes;
pub mod classify;
pub mod convert;
pub mod decode;
pub mod encode;

pub use classify::*;
pub use decode::*;
pub use encode::*;

use serde::{Deserialize, Serialize};

pub const HEADER_SIZE: usize = 3;
pub const FLOAT_SIZE: usize = 4;
const POSITION_SIZE: usize = 3 * FLOAT_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolGeneration {
    /// Roll, pitch, yaw in radians. 24 bytes per pose block.
    Euler,
    /// x, y, z, w. 28 bytes per pose block.
    Quaternion,
}

impl Default for ProtocolGeneration {
    fn default() -> Self {
        ProtocolGeneration::Quaternion
    }
}

impl ProtocolGeneration {
    pub fn rotation_floats(self) -> usize {
        match self {
            ProtocolGeneration::Euler => 3,
            ProtocolGeneration::Quaternion => 4,
        }
    }

    /// Position plus rotation. Also the servo stride.
    pub fn pose_block_size(self) -> usize {
        POSITION_SIZE + self.rotation_floats() * FLOAT_SIZE
    }

    pub fn pose_packet_size(self) -> usize {
        HEADER_SIZE + self.pose_block_size()
    }
}
