//! Simulator frame (right-handed, meters, X forward, Y left, Z up) to engine
//! frame (left-handed, centimeters, X forward, Y right, Z up).

use shared::{EulerAngles, Quaternion, Vector3};

pub const METERS_TO_CENTIMETERS: f32 = 100.0;

pub fn convert_position(x: f32, y: f32, z: f32) -> Vector3 {
    Vector3::new(
        x * METERS_TO_CENTIMETERS,
        -y * METERS_TO_CENTIMETERS,
        z * METERS_TO_CENTIMETERS,
    )
}

/// Roll/pitch/yaw radians in, engine rotator degrees out.
/// Pitch and yaw flip sign, roll does not; existing visuals depend on this.
pub fn convert_euler(roll: f32, pitch: f32, yaw: f32) -> EulerAngles {
    EulerAngles {
        pitch: -pitch.to_degrees(),
        yaw: -yaw.to_degrees(),
        roll: roll.to_degrees(),
    }
}

pub fn convert_quaternion(x: f32, y: f32, z: f32, w: f32) -> Quaternion {
    Quaternion::new(x, -y, z, -w)
}

pub fn rad_per_sec_to_deg_per_sec(value: f32) -> f32 {
    value.to_degrees()
}
