//! Euler angle / quaternion conversion for bone rotations.
//!
//! Angles are applied intrinsically in the order Yaw (about Y), Pitch (about X), Roll (about Z),
//! so the composed rotation is `Ry * Rx * Rz`. nalgebra's `from_euler_angles` uses a different
//! order and is not used here.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Pitch, yaw and roll in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EulerDegrees {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

const GIMBAL_EPSILON: f64 = 1e-9;

pub fn euler_to_quaternion(angles: EulerDegrees) -> UnitQuaternion<f64> {
    let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.yaw.to_radians());
    let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.pitch.to_radians());
    let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.roll.to_radians());
    ry * rx * rz
}

/// Inverse of [`euler_to_quaternion`], with pitch in [-90, 90].
///
/// Rotations whose pitch lies outside that range come back as an equivalent triple, not the
/// original one. At exactly ±90 pitch the roll is folded into yaw.
pub fn quaternion_to_euler(q: &UnitQuaternion<f64>) -> EulerDegrees {
    let m = q.to_rotation_matrix();
    let m = m.matrix();

    let sin_pitch = (-m[(1, 2)]).clamp(-1.0, 1.0);
    let pitch = sin_pitch.asin();

    let (yaw, roll) = if 1.0 - sin_pitch.abs() > GIMBAL_EPSILON {
        (m[(0, 2)].atan2(m[(2, 2)]), m[(1, 0)].atan2(m[(1, 1)]))
    } else {
        ((-m[(2, 0)]).atan2(m[(0, 0)]), 0.0)
    };

    EulerDegrees {
        pitch: pitch.to_degrees(),
        yaw: yaw.to_degrees(),
        roll: roll.to_degrees(),
    }
}

/// `[x, y, z, w]` components, the order VMD stores them in.
pub fn to_xyzw(q: &UnitQuaternion<f64>) -> [f64; 4] {
    let q = q.quaternion();
    [q.i, q.j, q.k, q.w]
}

pub fn from_xyzw(c: [f64; 4]) -> UnitQuaternion<f64> {
    UnitQuaternion::new_normalize(Quaternion::new(c[3], c[0], c[1], c[2]))
}
