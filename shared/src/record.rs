use crate::vehicle::*;
use serde::{Deserialize, Serialize};

/// Third header byte. Closed set; a new message kind is a new variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum MessageId {
    Pose = 1,
    MotorSpeed = 2,
    Servo = 3,
}

impl MessageId {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(MessageId::Pose),
            2 => Some(MessageId::MotorSpeed),
            3 => Some(MessageId::Servo),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PoseRecord {
    pub identity: VehicleIdentity,
    pub position: Vector3,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MotorSpeedRecord {
    pub identity: VehicleIdentity,
    /// One entry per registered motor, in packet order.
    pub motor_speeds_deg_per_sec: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServoRecord {
    pub identity: VehicleIdentity,
    pub servo_positions: Vec<Vector3>,
    pub servo_rotations: Vec<Rotation>,
}

impl PoseRecord {
    pub fn message_id(&self) -> MessageId {
        MessageId::Pose
    }
}

impl MotorSpeedRecord {
    pub fn message_id(&self) -> MessageId {
        MessageId::MotorSpeed
    }
}

impl ServoRecord {
    pub fn message_id(&self) -> MessageId {
        MessageId::Servo
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum TelemetryRecord {
    Pose(PoseRecord),
    MotorSpeed(MotorSpeedRecord),
    Servo(ServoRecord),
}

impl TelemetryRecord {
    pub fn identity(&self) -> VehicleIdentity {
        match self {
            TelemetryRecord::Pose(record) => record.identity,
            TelemetryRecord::MotorSpeed(record) => record.identity,
            TelemetryRecord::Servo(record) => record.identity,
        }
    }

    pub fn message_id(&self) -> MessageId {
        match self {
            TelemetryRecord::Pose(record) => record.message_id(),
            TelemetryRecord::MotorSpeed(record) => record.message_id(),
            TelemetryRecord::Servo(record) => record.message_id(),
        }
    }
}
