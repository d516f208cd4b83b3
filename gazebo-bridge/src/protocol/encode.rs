use super::ProtocolGeneration;
use crate::error::EncodeError;
use crate::result::EncodeResult;
use shared::{MessageId, VehicleIdentity};

/// Rotation as the simulator sends it, before any frame conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimRotation {
    /// Roll, pitch, yaw in radians.
    Rpy([f32; 3]),
    /// x, y, z, w.
    Quat([f32; 4]),
}

/// One pose block in simulator frame (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimPose {
    pub position: [f32; 3],
    pub rotation: SimRotation,
}

/// Builds wire packets the way the simulator plugin emits them.
#[derive(Debug, Clone, Copy)]
pub struct PacketEncoder {
    generation: ProtocolGeneration,
}

impl PacketEncoder {
    pub fn new(generation: ProtocolGeneration) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> ProtocolGeneration {
        self.generation
    }

    pub fn pose(&self, identity: VehicleIdentity, pose: &SimPose) -> EncodeResult {
        let mut data = header(identity, MessageId::Pose)?;
        self.write_pose_block(&mut data, pose)?;
        Ok(data)
    }

    /// `speeds` are rad/s, one per motor.
    pub fn motor_speeds(&self, identity: VehicleIdentity, speeds: &[f32]) -> EncodeResult {
        let mut data = header(identity, MessageId::MotorSpeed)?;
        for speed in speeds {
            bincode::serialize_into(&mut data, speed)?;
        }
        Ok(data)
    }

    pub fn servos(&self, identity: VehicleIdentity, servos: &[SimPose]) -> EncodeResult {
        let mut data = header(identity, MessageId::Servo)?;
        for servo in servos {
            self.write_pose_block(&mut data, servo)?;
        }
        Ok(data)
    }

    fn write_pose_block(&self, data: &mut Vec<u8>, pose: &SimPose) -> Result<(), EncodeError> {
        bincode::serialize_into(&mut *data, &pose.position)?;
        match (self.generation, pose.rotation) {
            (ProtocolGeneration::Euler, SimRotation::Rpy(rpy)) => {
                bincode::serialize_into(&mut *data, &rpy)?
            }
            (ProtocolGeneration::Quaternion, SimRotation::Quat(quat)) => {
                bincode::serialize_into(&mut *data, &quat)?
            }
            (expected, _) => return Err(EncodeError::GenerationMismatch { expected }),
        }
        Ok(())
    }
}

fn header(identity: VehicleIdentity, message_id: MessageId) -> Result<Vec<u8>, EncodeError> {
    let data = bincode::serialize(&(
        identity.vehicle_num,
        identity.vehicle_type,
        message_id.as_u8(),
    ))?;
    Ok(data)
}
