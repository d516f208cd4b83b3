use serde::{Deserialize, Serialize};

// Quaternion -> rotator pole threshold used by the host engine.
const SINGULARITY_THRESHOLD: f32 = 0.499_999_5;

/// Position in engine space (centimeters, left-handed, X forward, Y right, Z up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Pitch/Yaw/Roll in degrees, engine rotator convention.
    pub fn to_euler(&self) -> EulerAngles {
        let Self { x, y, z, w } = *self;
        let singularity_test = z * x - w * y;
        let yaw_y = 2.0 * (w * z + x * y);
        let yaw_x = 1.0 - 2.0 * (y * y + z * z);
        let yaw = yaw_y.atan2(yaw_x).to_degrees();

        if singularity_test < -SINGULARITY_THRESHOLD {
            EulerAngles {
                pitch: -90.0,
                yaw,
                roll: normalize_axis(-yaw - 2.0 * x.atan2(w).to_degrees()),
            }
        } else if singularity_test > SINGULARITY_THRESHOLD {
            EulerAngles {
                pitch: 90.0,
                yaw,
                roll: normalize_axis(yaw - 2.0 * x.atan2(w).to_degrees()),
            }
        } else {
            EulerAngles {
                pitch: (2.0 * singularity_test).asin().to_degrees(),
                yaw,
                roll: (-2.0 * (w * x + y * z))
                    .atan2(1.0 - 2.0 * (x * x + y * y))
                    .to_degrees(),
            }
        }
    }
}

/// Engine rotator: degrees, stored in Pitch/Yaw/Roll order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct EulerAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl EulerAngles {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn to_quaternion(&self) -> Quaternion {
        let half = std::f32::consts::PI / 360.0;
        let (sp, cp) = (self.pitch * half).sin_cos();
        let (sy, cy) = (self.yaw * half).sin_cos();
        let (sr, cr) = (self.roll * half).sin_cos();

        Quaternion {
            x: cr * sp * sy - sr * cp * cy,
            y: -cr * sp * cy - sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
            w: cr * cp * cy + sr * sp * sy,
        }
    }
}

/// Decoded rotation, in whichever form the active protocol generation carries.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub enum Rotation {
    Euler(EulerAngles),
    Quaternion(Quaternion),
}

impl Rotation {
    pub fn to_quaternion(&self) -> Quaternion {
        match self {
            Rotation::Euler(euler) => euler.to_quaternion(),
            Rotation::Quaternion(quat) => *quat,
        }
    }

    pub fn to_euler(&self) -> EulerAngles {
        match self {
            Rotation::Euler(euler) => *euler,
            Rotation::Quaternion(quat) => quat.to_euler(),
        }
    }
}

fn normalize_axis(angle: f32) -> f32 {
    let mut angle = angle % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }
    angle
}
