//! Semantic validation against the bone constraint table.
//!
//! Unsupported motions are fatal. Magnitudes above a bone's limit are clamped to the limit and
//! reported as [`Diagnostic::RangeClamp`]. Values are otherwise passed through unrounded.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::ast::{Animation, Document, PlaySequence, StatementKind};
use crate::bones::{axis_for, max_magnitude, AxisKind, BoneId, Sign};
use crate::error::{CompileError, Diagnostic, RangeClampWarning};

/// A signed, clamped update for one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisUpdate {
    pub sign: Sign,
    /// Non-negative and within the bone's limit.
    pub magnitude: f64,
}

impl AxisUpdate {
    #[inline]
    pub fn value(&self) -> f64 {
        self.sign.apply(self.magnitude)
    }
}

/// The axes one statement writes, keyed by [`AxisKind`]. At most one update per axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AxisSet {
    slots: [Option<AxisUpdate>; AxisKind::COUNT],
}

impl AxisSet {
    /// Insert an update; returns `false` (leaving the set unchanged) if the axis is already set.
    pub fn insert(&mut self, axis: AxisKind, update: AxisUpdate) -> bool {
        let slot = &mut self.slots[axis.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(update);
        true
    }

    pub fn get(&self, axis: AxisKind) -> Option<AxisUpdate> {
        self.slots[axis.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisKind, AxisUpdate)> + '_ {
        AxisKind::ALL
            .into_iter()
            .filter_map(|axis| self.get(axis).map(|u| (axis, u)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StatementOp {
    Set(AxisSet),
    Reset,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ValidatedStatement {
    pub bone: BoneId,
    pub op: StatementOp,
}

/// A pose whose statements are checked, signed, and clamped. Statement order is preserved.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedPose {
    pub name: String,
    pub statements: Vec<ValidatedStatement>,
}

/// Output of validation: poses are normalized, animations and the play sequence pass through.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedDocument {
    pub poses: IndexMap<String, ValidatedPose>,
    pub animations: IndexMap<String, Animation>,
    pub main: PlaySequence,
    pub warnings: Vec<Diagnostic>,
}

/// Validate every statement of every pose.
pub fn validate(document: Document) -> Result<ValidatedDocument, CompileError> {
    let mut warnings = Vec::new();
    let mut poses = IndexMap::with_capacity(document.poses.len());

    for (name, pose) in document.poses {
        let mut statements = Vec::with_capacity(pose.statements.len());
        for stmt in &pose.statements {
            let op = match &stmt.kind {
                StatementKind::Reset => StatementOp::Reset,
                StatementKind::Actions { clauses } => {
                    let mut axes = AxisSet::default();
                    for clause in clauses {
                        let limit = max_magnitude(stmt.bone, clause.action, clause.direction)
                            .ok_or(CompileError::UnsupportedAction {
                                bone: stmt.bone,
                                action: clause.action,
                                direction: clause.direction,
                                line: clause.span.line,
                                column: clause.span.column,
                            })?;
                        // The parser only produces grammar-valid pairs.
                        let Some((axis, sign)) = axis_for(clause.action, clause.direction) else {
                            return Err(CompileError::syntax(
                                clause.span,
                                format!("'{} {}' is not a motion", clause.action, clause.direction),
                            ));
                        };

                        let magnitude = if clause.magnitude > limit {
                            warn!(
                                "pose '{}': {} {} {} {} clamped to {}",
                                name,
                                stmt.bone,
                                clause.action,
                                clause.direction,
                                clause.magnitude,
                                limit
                            );
                            warnings.push(Diagnostic::RangeClamp(RangeClampWarning {
                                pose: name.clone(),
                                bone: stmt.bone,
                                action: clause.action,
                                direction: clause.direction,
                                requested: clause.magnitude,
                                limit,
                                line: clause.span.line,
                                column: clause.span.column,
                            }));
                            limit
                        } else {
                            clause.magnitude
                        };

                        if !axes.insert(axis, AxisUpdate { sign, magnitude }) {
                            return Err(CompileError::ConflictingAxis {
                                bone: stmt.bone,
                                axis,
                                line: clause.span.line,
                                column: clause.span.column,
                            });
                        }
                    }
                    StatementOp::Set(axes)
                }
            };
            statements.push(ValidatedStatement { bone: stmt.bone, op });
        }
        poses.insert(name.clone(), ValidatedPose { name, statements });
    }

    debug!(
        "validated {} poses, {} animations ({} clamp warnings)",
        poses.len(),
        document.animations.len(),
        warnings.len()
    );

    Ok(ValidatedDocument {
        poses,
        animations: document.animations,
        main: document.main,
        warnings,
    })
}
