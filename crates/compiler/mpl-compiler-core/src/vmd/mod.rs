//! VMD ("Vocaloid Motion Data 0002") bone-motion encoding and decoding.
//!
//! Layout, little-endian throughout:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0      | 30   | signature, NUL padded |
//! | 30     | 20   | model name, Shift_JIS, NUL padded |
//! | 50     | 4    | bone keyframe count |
//! | 54     | 111 each | bone keyframe records |
//! | ...    | 4 each | morph, camera, light, self-shadow and IK counts |

pub mod reader;
pub mod rotation;
pub mod writer;

pub use reader::{BoneKeyframe, VmdMotion};
pub use rotation::{euler_to_quaternion, quaternion_to_euler, EulerDegrees};
pub use writer::{encode, plan_frames, EncodedMotion, LINEAR_INTERPOLATION};

pub const SIGNATURE: &[u8] = b"Vocaloid Motion Data 0002";
pub const SIGNATURE_SIZE: usize = 30;
pub const MODEL_NAME_SIZE: usize = 20;
pub const HEADER_SIZE: usize = SIGNATURE_SIZE + MODEL_NAME_SIZE;

pub const BONE_NAME_SIZE: usize = 15;
pub const INTERPOLATION_SIZE: usize = 64;
/// name + frame + translation + rotation + interpolation
pub const BONE_RECORD_SIZE: usize = BONE_NAME_SIZE + 4 + 3 * 4 + 4 * 4 + INTERPOLATION_SIZE;

/// Sections after the bone section. The compiler writes each with a count of zero.
pub const TRAILING_SECTIONS: [&str; 5] = ["morph", "camera", "light", "self-shadow", "ik"];

const _: () = assert!(BONE_RECORD_SIZE == 111);
