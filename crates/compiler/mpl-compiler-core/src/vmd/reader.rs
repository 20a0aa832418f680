//! VMD bytes back to bone keyframes.

use encoding_rs::SHIFT_JIS;

use super::rotation::{from_xyzw, quaternion_to_euler, EulerDegrees};
use super::{BONE_NAME_SIZE, INTERPOLATION_SIZE, MODEL_NAME_SIZE, SIGNATURE, SIGNATURE_SIZE};
use crate::bones::BoneId;
use crate::error::DecodeError;

/// Fixed record sizes of the sections after the bone section.
const MORPH_RECORD_SIZE: usize = 15 + 4 + 4;
const CAMERA_RECORD_SIZE: usize = 4 + 4 + 3 * 4 + 3 * 4 + 24 + 4 + 1;
const LIGHT_RECORD_SIZE: usize = 4 + 3 * 4 + 3 * 4;
const SELF_SHADOW_RECORD_SIZE: usize = 4 + 1 + 4;
const IK_NAME_SIZE: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct BoneKeyframe {
    pub bone_name: String,
    pub frame: u32,
    pub translation: [f32; 3],
    /// `[x, y, z, w]`
    pub rotation: [f32; 4],
    pub interpolation: [u8; INTERPOLATION_SIZE],
}

impl BoneKeyframe {
    /// The MPL bone this record drives, if the name is one the compiler writes.
    pub fn bone_id(&self) -> Option<BoneId> {
        BoneId::from_player_name(&self.bone_name)
    }

    pub fn euler_degrees(&self) -> EulerDegrees {
        quaternion_to_euler(&from_xyzw(self.rotation.map(f64::from)))
    }
}

/// A decoded motion. Only bone keyframes are kept; other sections are counted and skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VmdMotion {
    pub model_name: String,
    pub bone_keyframes: Vec<BoneKeyframe>,
    pub morph_count: u32,
    pub camera_count: u32,
    pub light_count: u32,
    pub self_shadow_count: u32,
    pub ik_count: u32,
}

impl VmdMotion {
    /// Decode a complete stream.
    ///
    /// Sections after the bone section may be absent entirely (older tools stop early), but a
    /// section that is started must be complete.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);

        let signature = r.take(SIGNATURE_SIZE, "signature")?;
        if !signature.starts_with(SIGNATURE) {
            return Err(DecodeError::BadSignature);
        }
        let model_name = decode_name(r.take(MODEL_NAME_SIZE, "model name")?);

        let count = r.u32("bone keyframe count")?;
        let mut bone_keyframes = Vec::new();
        for _ in 0..count {
            bone_keyframes.push(read_bone_keyframe(&mut r)?);
        }

        let mut motion = VmdMotion {
            model_name,
            bone_keyframes,
            ..Default::default()
        };

        if let Some(n) = r.optional_count("morph count")? {
            motion.morph_count = n;
            r.skip_records(n, MORPH_RECORD_SIZE, "morph keyframes")?;
        }
        if let Some(n) = r.optional_count("camera count")? {
            motion.camera_count = n;
            r.skip_records(n, CAMERA_RECORD_SIZE, "camera keyframes")?;
        }
        if let Some(n) = r.optional_count("light count")? {
            motion.light_count = n;
            r.skip_records(n, LIGHT_RECORD_SIZE, "light keyframes")?;
        }
        if let Some(n) = r.optional_count("self-shadow count")? {
            motion.self_shadow_count = n;
            r.skip_records(n, SELF_SHADOW_RECORD_SIZE, "self-shadow keyframes")?;
        }
        if let Some(n) = r.optional_count("ik count")? {
            motion.ik_count = n;
            for _ in 0..n {
                r.take(4 + 1, "ik keyframe")?;
                let toggles = r.u32("ik toggle count")?;
                r.skip_records(toggles, IK_NAME_SIZE + 1, "ik toggles")?;
            }
        }

        if r.remaining() > 0 {
            return Err(DecodeError::TrailingBytes {
                count: r.remaining(),
            });
        }
        Ok(motion)
    }

    /// Records for one bone, in stream order.
    pub fn keyframes_for(&self, bone: BoneId) -> impl Iterator<Item = &BoneKeyframe> + '_ {
        let name = bone.player_name();
        self.bone_keyframes.iter().filter(move |k| k.bone_name == name)
    }
}

fn read_bone_keyframe(r: &mut ByteReader<'_>) -> Result<BoneKeyframe, DecodeError> {
    let bone_name = decode_name(r.take(BONE_NAME_SIZE, "bone name")?);
    let frame = r.u32("bone frame")?;
    let mut translation = [0f32; 3];
    for v in &mut translation {
        *v = r.f32("bone translation")?;
    }
    let mut rotation = [0f32; 4];
    for v in &mut rotation {
        *v = r.f32("bone rotation")?;
    }
    let mut interpolation = [0u8; INTERPOLATION_SIZE];
    interpolation.copy_from_slice(r.take(INTERPOLATION_SIZE, "bone interpolation")?);
    Ok(BoneKeyframe {
        bone_name,
        frame,
        translation,
        rotation,
        interpolation,
    })
}

/// Shift_JIS up to the first NUL. Bytes after it are padding and ignored.
fn decode_name(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    SHIFT_JIS
        .decode_without_bom_handling(&field[..end])
        .0
        .into_owned()
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize, section: &'static str) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                section,
                offset: self.offset,
            });
        }
        let out = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self, section: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, section)?);
        Ok(out)
    }

    fn u32(&mut self, section: &'static str) -> Result<u32, DecodeError> {
        self.array(section).map(u32::from_le_bytes)
    }

    fn f32(&mut self, section: &'static str) -> Result<f32, DecodeError> {
        self.array(section).map(f32::from_le_bytes)
    }

    /// A section count, or `None` at a clean end of stream.
    fn optional_count(&mut self, section: &'static str) -> Result<Option<u32>, DecodeError> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        self.u32(section).map(Some)
    }

    fn skip_records(&mut self, count: u32, size: usize, section: &'static str) -> Result<(), DecodeError> {
        let total = (count as usize).checked_mul(size).ok_or(DecodeError::Truncated {
            section,
            offset: self.offset,
        })?;
        self.take(total, section).map(|_| ())
    }
}
