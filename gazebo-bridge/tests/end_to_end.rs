use gazebo_bridge::config::Config;
use gazebo_bridge::protocol::{PacketEncoder, ProtocolGeneration, SimPose, SimRotation};
use gazebo_bridge::udp::RawPacket;
use gazebo_bridge::Bridge;
use shared::{Rotation, TelemetryRecord, VehicleIdentity, VehicleTypeConfig};
use std::sync::{Arc, Mutex};

fn bridge(generation: ProtocolGeneration) -> (Bridge, Arc<Mutex<Vec<TelemetryRecord>>>) {
    let mut config = Config::default();
    config.protocol_generation = generation;
    config.vehicle_types = vec![VehicleTypeConfig::new(0, "Iris", 4, 0)];
    let mut bridge = Bridge::from_config(config);
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = records.clone();
    bridge.subscribe(Box::new(move |record: &TelemetryRecord| {
        sink.lock().unwrap().push(record.clone());
    }));
    (bridge, records)
}

fn raw(bytes: Vec<u8>) -> RawPacket {
    RawPacket::new(bytes, "192.168.0.10:14560".parse().unwrap())
}

#[test]
fn pose_then_motor_speeds_quaternion_generation() {
    let (mut bridge, records) = bridge(ProtocolGeneration::Quaternion);
    let encoder = PacketEncoder::new(ProtocolGeneration::Quaternion);
    let identity = VehicleIdentity::new(0, 0);

    let pose = encoder
        .pose(
            identity,
            &SimPose {
                position: [1.5, 2.0, -0.25],
                rotation: SimRotation::Quat([0.1, 0.2, 0.3, 0.9]),
            },
        )
        .unwrap();
    assert_eq!(pose.len(), 31);
    bridge.on_packet_received(raw(pose));

    let stats = bridge.statistics();
    assert_eq!(stats.valid_pose, 1);
    assert_eq!(stats.invalid_total(), 0);
    assert_eq!(bridge.vehicles().len(), 1);
    let state = bridge.vehicles().get(&identity).unwrap().clone();
    assert!((state.position.x - 150.0).abs() < 1e-4);
    assert!((state.position.y + 200.0).abs() < 1e-4);
    assert!((state.position.z + 25.0).abs() < 1e-4);
    assert!((state.rotation.x - 0.1).abs() < 1e-6);
    assert!((state.rotation.y + 0.2).abs() < 1e-6);
    assert!((state.rotation.z - 0.3).abs() < 1e-6);
    assert!((state.rotation.w + 0.9).abs() < 1e-6);

    let motors = encoder
        .motor_speeds(identity, &[1.0, 2.0, 3.0, 4.0])
        .unwrap();
    assert_eq!(motors.len(), 19);
    bridge.on_packet_received(raw(motors));

    let expected = [57.29578, 114.59156, 171.88734, 229.18312];
    match records.lock().unwrap().last() {
        Some(TelemetryRecord::MotorSpeed(record)) => {
            assert_eq!(record.identity, identity);
            for (speed, expected) in record.motor_speeds_deg_per_sec.iter().zip(expected.iter()) {
                assert!((speed - expected).abs() < 1e-3);
            }
        }
        other => panic!("expected a motor speed record, got {:?}", other),
    }

    assert_eq!(bridge.vehicles().len(), 1);
    let updated = bridge.vehicles().get(&identity).unwrap();
    assert_eq!(updated.position, state.position);
    assert_eq!(updated.motor_speeds.len(), 4);
    assert!((updated.motor_speeds[3] - 229.18312).abs() < 1e-3);
    assert_eq!(bridge.statistics().valid_motor_speed, 1);
}

#[test]
fn euler_generation_and_one_byte_short_motor_packet() {
    let (mut bridge, records) = bridge(ProtocolGeneration::Euler);
    let encoder = PacketEncoder::new(ProtocolGeneration::Euler);
    let identity = VehicleIdentity::new(3, 0);

    let pose = encoder
        .pose(
            identity,
            &SimPose {
                position: [0.0, 0.0, 1.0],
                rotation: SimRotation::Rpy([0.0, 0.0, std::f32::consts::FRAC_PI_2]),
            },
        )
        .unwrap();
    assert_eq!(pose.len(), 27);
    bridge.on_packet_received(raw(pose));

    match records.lock().unwrap().first() {
        Some(TelemetryRecord::Pose(record)) => match record.rotation {
            Rotation::Euler(angles) => {
                assert!((angles.yaw + 90.0).abs() < 1e-4);
                assert_eq!(angles.pitch, 0.0);
            }
            other => panic!("expected euler angles, got {:?}", other),
        },
        other => panic!("expected a pose record, got {:?}", other),
    }

    let mut motors = encoder
        .motor_speeds(identity, &[1.0, 2.0, 3.0, 4.0])
        .unwrap();
    motors.pop();
    bridge.on_packet_received(raw(motors));

    let stats = bridge.statistics();
    assert_eq!(stats.valid_pose, 1);
    assert_eq!(stats.invalid_motor_speed, 1);
    assert!(bridge.vehicles().get(&identity).unwrap().motor_speeds.is_empty());
}

#[test]
fn unknown_vehicle_type_never_reaches_the_table() {
    let (mut bridge, records) = bridge(ProtocolGeneration::Quaternion);
    let encoder = PacketEncoder::new(ProtocolGeneration::Quaternion);
    let pose = encoder
        .pose(
            VehicleIdentity::new(0, 7),
            &SimPose {
                position: [0.0, 0.0, 0.0],
                rotation: SimRotation::Quat([0.0, 0.0, 0.0, 1.0]),
            },
        )
        .unwrap();
    bridge.on_packet_received(raw(pose));

    let stats = bridge.statistics();
    assert_eq!(stats.valid_total(), 0);
    assert_eq!(stats.invalid_total(), 1);
    assert!(records.lock().unwrap().is_empty());
    assert!(bridge.vehicles().is_empty());
}
