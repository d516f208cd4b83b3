use chrono::{DateTime, Utc};
use shared::*;
use std::collections::HashMap;

/// Last known state per vehicle. Last write wins; entries never expire on
/// their own, only `remove`/`remove_all` drop them.
#[derive(Debug, Default)]
pub struct VehicleStateTable {
    vehicles: HashMap<VehicleIdentity, VehicleRuntimeState>,
}

impl VehicleStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the record created a new entry.
    pub fn apply_pose_record(&mut self, record: &PoseRecord) -> bool {
        self.apply_pose_record_at(record, Utc::now())
    }

    pub fn apply_pose_record_at(&mut self, record: &PoseRecord, now: DateTime<Utc>) -> bool {
        let mut created = false;
        let state = self.vehicles.entry(record.identity).or_insert_with(|| {
            created = true;
            VehicleRuntimeState::new(record.identity, now)
        });
        state.position = record.position;
        state.rotation = record.rotation.to_quaternion();
        state.last_update_time = now;
        created
    }

    /// Ignored until a pose has been seen for the vehicle.
    pub fn apply_motor_speed_record(&mut self, record: &MotorSpeedRecord) -> bool {
        if let Some(state) = self.vehicles.get_mut(&record.identity) {
            state.motor_speeds = record.motor_speeds_deg_per_sec.clone();
            true
        } else {
            false
        }
    }

    /// Ignored until a pose has been seen for the vehicle.
    pub fn apply_servo_record(&mut self, record: &ServoRecord) -> bool {
        if let Some(state) = self.vehicles.get_mut(&record.identity) {
            state.servo_positions = record.servo_positions.clone();
            state.servo_rotations = record
                .servo_rotations
                .iter()
                .map(Rotation::to_quaternion)
                .collect();
            true
        } else {
            false
        }
    }

    pub fn apply(&mut self, record: &TelemetryRecord) -> bool {
        match record {
            TelemetryRecord::Pose(record) => {
                self.apply_pose_record(record);
                true
            }
            TelemetryRecord::MotorSpeed(record) => self.apply_motor_speed_record(record),
            TelemetryRecord::Servo(record) => self.apply_servo_record(record),
        }
    }

    pub fn get(&self, identity: &VehicleIdentity) -> Option<&VehicleRuntimeState> {
        self.vehicles.get(identity)
    }

    /// Snapshot of every vehicle, ordered by identity.
    pub fn get_all(&self) -> Vec<VehicleRuntimeState> {
        let mut all: Vec<_> = self.vehicles.values().cloned().collect();
        all.sort_by_key(|state| state.identity);
        all
    }

    pub fn identities(&self) -> Vec<VehicleIdentity> {
        let mut ids: Vec<_> = self.vehicles.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn remove(&mut self, identity: &VehicleIdentity) -> Option<VehicleRuntimeState> {
        self.vehicles.remove(identity)
    }

    pub fn remove_all(&mut self) -> usize {
        let count = self.vehicles.len();
        self.vehicles.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pose(num: u8, vehicle_type: u8, x: f32) -> PoseRecord {
        PoseRecord {
            identity: VehicleIdentity::new(num, vehicle_type),
            position: Vector3::new(x, 0.0, 0.0),
            rotation: Rotation::Quaternion(Quaternion::IDENTITY),
        }
    }

    fn motors(num: u8, vehicle_type: u8) -> MotorSpeedRecord {
        MotorSpeedRecord {
            identity: VehicleIdentity::new(num, vehicle_type),
            motor_speeds_deg_per_sec: vec![10.0, 20.0, 30.0, 40.0],
        }
    }

    #[test]
    fn motor_record_without_pose_is_dropped() {
        let mut table = VehicleStateTable::new();
        assert!(!table.apply_motor_speed_record(&motors(0, 0)));
        assert!(table.is_empty());
    }

    #[test]
    fn servo_record_without_pose_is_dropped() {
        let mut table = VehicleStateTable::new();
        let servo = ServoRecord {
            identity: VehicleIdentity::new(0, 0),
            servo_positions: vec![Vector3::ZERO],
            servo_rotations: vec![Rotation::Quaternion(Quaternion::IDENTITY)],
        };
        assert!(!table.apply_servo_record(&servo));
        assert!(table.is_empty());
    }

    #[test]
    fn servo_record_updates_the_existing_entry() {
        let mut table = VehicleStateTable::new();
        table.apply_pose_record(&pose(0, 0, 1.0));
        let servo = ServoRecord {
            identity: VehicleIdentity::new(0, 0),
            servo_positions: vec![Vector3::new(100.0, -200.0, 300.0)],
            servo_rotations: vec![Rotation::Euler(EulerAngles::new(0.0, 90.0, 0.0))],
        };
        assert!(table.apply_servo_record(&servo));
        assert_eq!(table.len(), 1);
        let state = table.get(&servo.identity).unwrap();
        assert_eq!(state.position.x, 1.0);
        assert_eq!(state.servo_positions, vec![Vector3::new(100.0, -200.0, 300.0)]);
        assert_eq!(state.servo_rotations.len(), 1);
        assert!((state.servo_rotations[0].z - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn pose_then_motor_updates_one_entry() {
        let mut table = VehicleStateTable::new();
        assert!(table.apply_pose_record(&pose(0, 0, 100.0)));
        assert!(table.apply_motor_speed_record(&motors(0, 0)));
        assert_eq!(table.len(), 1);
        let state = table.get(&VehicleIdentity::new(0, 0)).unwrap();
        assert_eq!(state.position.x, 100.0);
        assert_eq!(state.motor_speeds, vec![10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn same_number_different_type_is_a_different_vehicle() {
        let mut table = VehicleStateTable::new();
        table.apply_pose_record(&pose(1, 0, 1.0));
        table.apply_pose_record(&pose(1, 1, 2.0));
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.identities(),
            vec![VehicleIdentity::new(1, 0), VehicleIdentity::new(1, 1)]
        );
    }

    #[test]
    fn last_write_wins() {
        let mut table = VehicleStateTable::new();
        let now = Utc::now();
        assert!(table.apply_pose_record_at(&pose(0, 0, 5.0), now));
        assert!(!table.apply_pose_record_at(&pose(0, 0, 3.0), now - Duration::seconds(10)));
        let state = table.get(&VehicleIdentity::new(0, 0)).unwrap();
        assert_eq!(state.position.x, 3.0);
        assert_eq!(state.last_update_time, now - Duration::seconds(10));
    }

    #[test]
    fn euler_rotations_are_stored_as_quaternions() {
        let mut table = VehicleStateTable::new();
        let mut record = pose(0, 0, 0.0);
        record.rotation = Rotation::Euler(EulerAngles::new(0.0, 90.0, 0.0));
        table.apply_pose_record(&record);
        let rotation = table.get(&record.identity).unwrap().rotation;
        assert!((rotation.z - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn remove_and_remove_all() {
        let mut table = VehicleStateTable::new();
        table.apply_pose_record(&pose(0, 0, 0.0));
        table.apply_pose_record(&pose(1, 0, 0.0));
        table.apply_pose_record(&pose(2, 0, 0.0));
        assert!(table.remove(&VehicleIdentity::new(1, 0)).is_some());
        assert!(table.remove(&VehicleIdentity::new(1, 0)).is_none());
        assert_eq!(table.get_all().len(), 2);
        assert_eq!(table.remove_all(), 2);
        assert!(table.get_all().is_empty());
    }
}
