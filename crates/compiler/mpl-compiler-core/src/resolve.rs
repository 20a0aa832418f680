//! Pose resolution: validated statements to absolute per-bone transforms.
//!
//! Every pose is resolved independently against the bind pose. Bones a pose does not mention
//! are at rest; nothing is inherited from other poses.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::bones::{AxisKind, BoneId};
use crate::validate::{StatementOp, ValidatedDocument, ValidatedPose};

/// One value per [`AxisKind`]: degrees for rotations, model units for translations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneTransform {
    axes: [f64; AxisKind::COUNT],
}

impl BoneTransform {
    pub const REST: BoneTransform = BoneTransform {
        axes: [0.0; AxisKind::COUNT],
    };

    #[inline]
    pub fn get(&self, axis: AxisKind) -> f64 {
        self.axes[axis.index()]
    }

    #[inline]
    pub fn set(&mut self, axis: AxisKind, value: f64) {
        self.axes[axis.index()] = value;
    }

    pub fn is_rest(&self) -> bool {
        self.axes.iter().all(|v| *v == 0.0)
    }

    /// `[x, y, z]` translation.
    pub fn translation(&self) -> [f64; 3] {
        [
            self.get(AxisKind::TranslateX),
            self.get(AxisKind::TranslateY),
            self.get(AxisKind::TranslateZ),
        ]
    }
}

/// Full transform snapshot for every bone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPose {
    pub name: String,
    bones: [BoneTransform; BoneId::COUNT],
}

impl ResolvedPose {
    /// Every bone at rest.
    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: [BoneTransform::REST; BoneId::COUNT],
        }
    }

    #[inline]
    pub fn bone(&self, bone: BoneId) -> &BoneTransform {
        &self.bones[bone.index()]
    }

    #[inline]
    pub fn bone_mut(&mut self, bone: BoneId) -> &mut BoneTransform {
        &mut self.bones[bone.index()]
    }

    /// Bones that differ from rest, in declaration order.
    pub fn posed_bones(&self) -> impl Iterator<Item = BoneId> + '_ {
        BoneId::ALL
            .into_iter()
            .filter(|b| !self.bone(*b).is_rest())
    }
}

/// Resolve one pose. Statements apply in order: a `reset` zeroes the bone, and statements
/// after it for the same bone apply on top of that zero baseline.
pub fn resolve_pose(pose: &ValidatedPose) -> ResolvedPose {
    let mut resolved = ResolvedPose::rest(&pose.name);
    for stmt in &pose.statements {
        let transform = resolved.bone_mut(stmt.bone);
        match &stmt.op {
            StatementOp::Reset => *transform = BoneTransform::REST,
            StatementOp::Set(axes) => {
                for (axis, update) in axes.iter() {
                    transform.set(axis, update.value());
                }
            }
        }
    }
    resolved
}

/// Resolve every pose of a validated document, keyed by name in declaration order.
pub fn resolve_document(doc: &ValidatedDocument) -> IndexMap<String, ResolvedPose> {
    doc.poses
        .iter()
        .map(|(name, pose)| (name.clone(), resolve_pose(pose)))
        .collect()
}
