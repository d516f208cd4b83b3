use super::bytes::decode_f32_le;
use super::convert::*;
use super::{ProtocolGeneration, FLOAT_SIZE, HEADER_SIZE};
use crate::error::PacketError;
use crate::registry::VehicleTypeRegistry;
use crate::result::PacketResult;
use shared::*;

/// Pose size depends only on `generation`; `config` is taken so every
/// decoder sizes its packet the same way.
pub fn decode_pose(
    bytes: &[u8],
    config: &VehicleTypeConfig,
    generation: ProtocolGeneration,
) -> PacketResult<PoseRecord> {
    let header = super::classify(bytes)?;
    check_message_id(header.message_id, MessageId::Pose)?;
    check_size(
        bytes,
        VehicleTypeRegistry::expected_size(config, MessageId::Pose, generation),
    )?;

    Ok(PoseRecord {
        identity: header.identity(),
        position: read_position(bytes, HEADER_SIZE),
        rotation: read_rotation(bytes, HEADER_SIZE + 3 * FLOAT_SIZE, generation),
    })
}

pub fn decode_motor_speed(
    bytes: &[u8],
    config: &VehicleTypeConfig,
    generation: ProtocolGeneration,
) -> PacketResult<MotorSpeedRecord> {
    let header = super::classify(bytes)?;
    check_message_id(header.message_id, MessageId::MotorSpeed)?;
    check_size(
        bytes,
        VehicleTypeRegistry::expected_size(config, MessageId::MotorSpeed, generation),
    )?;

    let motor_speeds_deg_per_sec = (0..config.motor_count as usize)
        .map(|i| rad_per_sec_to_deg_per_sec(decode_f32_le(bytes, HEADER_SIZE + i * FLOAT_SIZE)))
        .collect();

    Ok(MotorSpeedRecord {
        identity: header.identity(),
        motor_speeds_deg_per_sec,
    })
}

pub fn decode_servo(
    bytes: &[u8],
    config: &VehicleTypeConfig,
    generation: ProtocolGeneration,
) -> PacketResult<ServoRecord> {
    let header = super::classify(bytes)?;
    check_message_id(header.message_id, MessageId::Servo)?;
    check_size(
        bytes,
        VehicleTypeRegistry::expected_size(config, MessageId::Servo, generation),
    )?;

    let servo_count = config.servo_count as usize;
    let stride = generation.pose_block_size();
    let mut servo_positions = Vec::with_capacity(servo_count);
    let mut servo_rotations = Vec::with_capacity(servo_count);
    for index in 0..servo_count {
        let start = HEADER_SIZE + index * stride;
        if start + stride > bytes.len() {
            return Err(PacketError::TruncatedServoBlock {
                index,
                len: bytes.len(),
            });
        }
        servo_positions.push(read_position(bytes, start));
        servo_rotations.push(read_rotation(bytes, start + 3 * FLOAT_SIZE, generation));
    }

    Ok(ServoRecord {
        identity: header.identity(),
        servo_positions,
        servo_rotations,
    })
}

fn check_message_id(actual: u8, expected: MessageId) -> PacketResult<()> {
    if actual == expected.as_u8() {
        Ok(())
    } else {
        Err(PacketError::MessageIdMismatch { expected, actual })
    }
}

fn check_size(bytes: &[u8], expected: usize) -> PacketResult<()> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(PacketError::SizeMismatch {
            expected,
            actual: bytes.len(),
        })
    }
}

fn read_position(bytes: &[u8], offset: usize) -> Vector3 {
    convert_position(
        decode_f32_le(bytes, offset),
        decode_f32_le(bytes, offset + 4),
        decode_f32_le(bytes, offset + 8),
    )
}

fn read_rotation(bytes: &[u8], offset: usize, generation: ProtocolGeneration) -> Rotation {
    let f = |i: usize| decode_f32_le(bytes, offset + i * FLOAT_SIZE);
    match generation {
        ProtocolGeneration::Euler => Rotation::Euler(convert_euler(f(0), f(1), f(2))),
        ProtocolGeneration::Quaternion => {
            Rotation::Quaternion(convert_quaternion(f(0), f(1), f(2), f(3)))
        }
    }
}
