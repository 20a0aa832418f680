//! Animation assembly: per-animation sorted keyframe lists and the concatenated global timeline.

use indexmap::IndexMap;
use log::debug;

use crate::ast::{Animation, PlaySequence};
use crate::config::InputLimits;
use crate::error::{CompileError, IdentKind};
use crate::resolve::ResolvedPose;

/// A keyframe resolved to its pose, in animation-local time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedPose<'a> {
    pub time: f64,
    pub pose: &'a ResolvedPose,
}

/// One animation's keyframes, strictly increasing in time.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationTimeline<'a> {
    pub name: &'a str,
    pub keyframes: Vec<TimedPose<'a>>,
}

impl AnimationTimeline<'_> {
    /// Time of the last keyframe, or 0 for an empty animation.
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalKeyframe<'a> {
    /// Seconds from the start of the play sequence.
    pub time: f64,
    pub animation: &'a str,
    pub pose: &'a ResolvedPose,
}

/// The play sequence flattened into one time-ordered keyframe list.
///
/// Times never decrease. Two entries share a time only across an animation boundary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalTimeline<'a> {
    pub keyframes: Vec<GlobalKeyframe<'a>>,
}

impl GlobalTimeline<'_> {
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }
}

/// Sort one animation's keyframes and resolve their pose references.
pub fn assemble_animation<'a>(
    animation: &'a Animation,
    poses: &'a IndexMap<String, ResolvedPose>,
) -> Result<AnimationTimeline<'a>, CompileError> {
    let mut keyframes = animation.keyframes.iter().collect::<Vec<_>>();
    // Stable: keyframes with equal times stay in declaration order.
    keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

    if let Some(pair) = keyframes.windows(2).find(|w| w[0].time == w[1].time) {
        let dup = pair[1];
        return Err(CompileError::DuplicateTimestamp {
            animation: animation.name.clone(),
            time: dup.time,
            line: dup.span.line,
            column: dup.span.column,
        });
    }

    let keyframes = keyframes
        .into_iter()
        .map(|k| {
            poses
                .get(&k.pose)
                .map(|pose| TimedPose { time: k.time, pose })
                .ok_or_else(|| CompileError::unknown(IdentKind::Pose, &k.pose, k.span))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnimationTimeline {
        name: &animation.name,
        keyframes,
    })
}

/// Assemble every animation (referenced or not) and concatenate the play sequence.
///
/// Each animation starts where the previous one's last keyframe ended; an animation whose
/// first keyframe is not at 0 keeps that offset relative to its own start.
pub fn assemble<'a>(
    animations: &'a IndexMap<String, Animation>,
    main: &'a PlaySequence,
    poses: &'a IndexMap<String, ResolvedPose>,
    limits: &InputLimits,
) -> Result<GlobalTimeline<'a>, CompileError> {
    let timelines = animations
        .values()
        .map(|anim| assemble_animation(anim, poses).map(|t| (anim.name.as_str(), t)))
        .collect::<Result<IndexMap<_, _>, _>>()?;

    let mut global = GlobalTimeline::default();
    let mut offset = 0.0;
    for entry in &main.entries {
        let timeline = timelines
            .get(entry.animation.as_str())
            .ok_or_else(|| CompileError::unknown(IdentKind::Animation, &entry.animation, entry.span))?;

        if global.keyframes.len() + timeline.keyframes.len() > limits.max_timeline_keyframes {
            return Err(CompileError::too_large(
                "global timeline keyframes",
                limits.max_timeline_keyframes,
            ));
        }

        global
            .keyframes
            .extend(timeline.keyframes.iter().map(|k| GlobalKeyframe {
                time: offset + k.time,
                animation: timeline.name,
                pose: k.pose,
            }));
        offset += timeline.duration();
    }

    debug!(
        "assembled {} animations into {} timeline keyframes over {}s",
        main.entries.len(),
        global.len(),
        global.duration()
    );
    Ok(global)
}
