//! Global timeline to VMD bytes.

use encoding_rs::SHIFT_JIS;
use log::{debug, trace};

use super::rotation::{euler_to_quaternion, to_xyzw, EulerDegrees};
use super::{
    BONE_NAME_SIZE, BONE_RECORD_SIZE, HEADER_SIZE, INTERPOLATION_SIZE, MODEL_NAME_SIZE, SIGNATURE,
    SIGNATURE_SIZE, TRAILING_SECTIONS,
};
use crate::bones::{AxisKind, BoneId};
use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::resolve::BoneTransform;
use crate::timeline::GlobalTimeline;

/// Linear curves for X, Y, Z and rotation: control points (20, 20) and (107, 107).
///
/// Each 16-byte row is the previous one shifted left by a byte, the way MMD itself writes the
/// block.
pub const LINEAR_INTERPOLATION: [u8; INTERPOLATION_SIZE] = linear_interpolation();

const fn linear_interpolation() -> [u8; INTERPOLATION_SIZE] {
    const ROW: [u8; 16] = [
        20, 20, 20, 20, // x1
        20, 20, 20, 20, // y1
        107, 107, 107, 107, // x2
        107, 107, 107, 107, // y2
    ];
    let mut out = [0u8; INTERPOLATION_SIZE];
    let mut r = 0;
    while r < 4 {
        let mut i = 0;
        while i + r < ROW.len() {
            out[r * ROW.len() + i] = ROW[i + r];
            i += 1;
        }
        r += 1;
    }
    out
}

/// Bytes plus the bookkeeping callers report back to hosts.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedMotion {
    pub bytes: Vec<u8>,
    /// Frame number written for each timeline keyframe, strictly increasing.
    pub frames: Vec<u32>,
    /// Bones with a record at every frame, in BoneId order.
    pub bones: Vec<BoneId>,
    pub record_count: usize,
}

/// Convert timeline seconds to frame numbers at `frame_rate`.
///
/// Frames round to nearest. A frame that rounds onto or before its predecessor is moved to the
/// predecessor plus one, so the result is strictly increasing.
pub fn plan_frames(timeline: &GlobalTimeline<'_>, frame_rate: f64) -> Result<Vec<u32>, CompileError> {
    let mut frames: Vec<u32> = Vec::with_capacity(timeline.len());
    for keyframe in &timeline.keyframes {
        let nominal = (keyframe.time * frame_rate).round();
        if !nominal.is_finite() || nominal > f64::from(u32::MAX) {
            return Err(CompileError::overflow(format!(
                "time {}s is beyond the last representable frame at {frame_rate} fps",
                keyframe.time
            )));
        }
        let mut frame = nominal as u32;
        if let Some(&prev) = frames.last() {
            if frame <= prev {
                frame = prev.checked_add(1).ok_or_else(|| {
                    CompileError::overflow("frame numbers exhausted while resolving collisions")
                })?;
                trace!(
                    "'{}' at {}s collides with frame {prev}; moved to {frame}",
                    keyframe.animation,
                    keyframe.time
                );
            }
        }
        frames.push(frame);
    }
    Ok(frames)
}

/// Encode `text` into a NUL-padded Shift_JIS field of `N` bytes.
pub(crate) fn fixed_field<const N: usize>(text: &str, what: &str) -> Result<[u8; N], CompileError> {
    let (encoded, _, had_errors) = SHIFT_JIS.encode(text);
    if had_errors {
        return Err(CompileError::overflow(format!(
            "{what} '{text}' cannot be represented in Shift_JIS"
        )));
    }
    if encoded.len() > N {
        return Err(CompileError::overflow(format!(
            "{what} '{text}' needs {} bytes; the field holds {N}",
            encoded.len()
        )));
    }
    let mut field = [0u8; N];
    field[..encoded.len()].copy_from_slice(&encoded);
    Ok(field)
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f32s(buf: &mut Vec<u8>, values: impl IntoIterator<Item = f64>) {
    for v in values {
        buf.extend_from_slice(&(v as f32).to_le_bytes());
    }
}

fn put_record(buf: &mut Vec<u8>, name: &[u8; BONE_NAME_SIZE], frame: u32, t: &BoneTransform) {
    let rotation = euler_to_quaternion(EulerDegrees {
        pitch: t.get(AxisKind::Pitch),
        yaw: t.get(AxisKind::Yaw),
        roll: t.get(AxisKind::Roll),
    });
    buf.extend_from_slice(name);
    put_u32(buf, frame);
    put_f32s(buf, t.translation());
    put_f32s(buf, to_xyzw(&rotation));
    buf.extend_from_slice(&LINEAR_INTERPOLATION);
}

/// Serialize the timeline. Nothing is returned unless every record fits the layout.
pub fn encode(timeline: &GlobalTimeline<'_>, config: &CompilerConfig) -> Result<EncodedMotion, CompileError> {
    config.validate()?;
    let frames = plan_frames(timeline, config.frame_rate)?;

    // A bone posed anywhere gets a record at every frame, rest frames included, so the player
    // returns it to rest instead of holding the previous pose.
    let bones: Vec<BoneId> = BoneId::ALL
        .into_iter()
        .filter(|b| timeline.keyframes.iter().any(|k| !k.pose.bone(*b).is_rest()))
        .collect();

    let record_count = bones.len() * frames.len();
    if record_count > config.limits.max_output_records {
        return Err(CompileError::too_large(
            format!("bone records ({} bones x {} frames)", bones.len(), frames.len()),
            config.limits.max_output_records,
        ));
    }
    let declared = u32::try_from(record_count).map_err(|_| {
        CompileError::overflow(format!("{record_count} bone records exceed the u32 count field"))
    })?;

    let signature = {
        let mut field = [0u8; SIGNATURE_SIZE];
        field[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
        field
    };
    let model_name = fixed_field::<MODEL_NAME_SIZE>(&config.model_name, "model name")?;

    let mut buf = Vec::with_capacity(
        HEADER_SIZE + 4 + record_count * BONE_RECORD_SIZE + 4 * TRAILING_SECTIONS.len(),
    );
    buf.extend_from_slice(&signature);
    buf.extend_from_slice(&model_name);
    put_u32(&mut buf, declared);

    for bone in &bones {
        let name = fixed_field::<BONE_NAME_SIZE>(bone.player_name(), "bone name")?;
        for (keyframe, frame) in timeline.keyframes.iter().zip(&frames) {
            put_record(&mut buf, &name, *frame, keyframe.pose.bone(*bone));
        }
        trace!("{bone}: {} records", frames.len());
    }

    for _ in TRAILING_SECTIONS {
        put_u32(&mut buf, 0);
    }

    debug!(
        "encoded {} records for {} bones over {} frames ({} bytes)",
        record_count,
        bones.len(),
        frames.len(),
        buf.len()
    );

    Ok(EncodedMotion {
        bytes: buf,
        frames,
        bones,
        record_count,
    })
}
