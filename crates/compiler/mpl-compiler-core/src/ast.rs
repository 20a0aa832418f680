//! Document AST produced by the parser.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::bones::{Action, BoneId, Direction};

/// Source location: byte range plus 1-based line/column of the start.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// `ACTION DIRECTION NUMBER`. The magnitude is the authored, unsigned value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionClause {
    pub action: Action,
    pub direction: Direction,
    pub magnitude: f64,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementKind {
    Actions { clauses: Vec<ActionClause> },
    Reset,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub bone: BoneId,
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub name: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationKeyframe {
    /// Seconds, local to the animation.
    pub time: f64,
    pub pose: String,
    pub span: Span,
}

/// Keyframes in declaration order; they are sorted by time during assembly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub keyframes: Vec<AnimationKeyframe>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEntry {
    pub animation: String,
    pub span: Span,
}

/// The `main` block: animations to play back to back.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaySequence {
    pub entries: Vec<PlayEntry>,
}

impl PlaySequence {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed MPL document. Maps keep declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub poses: IndexMap<String, Pose>,
    pub animations: IndexMap<String, Animation>,
    pub main: PlaySequence,
}
