//! Error and diagnostic types for the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Span;
use crate::bones::{Action, AxisKind, BoneId, Direction};

/// What kind of name an identifier error refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentKind {
    Bone,
    Pose,
    Animation,
    MainBlock,
}

impl fmt::Display for IdentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentKind::Bone => "bone",
            IdentKind::Pose => "pose",
            IdentKind::Animation => "animation",
            IdentKind::MainBlock => "main block",
        })
    }
}

/// Fatal compile errors. Any of these aborts compilation before a single byte is emitted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CompileError {
    /// Malformed source text
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Reference to a bone, pose or animation that does not exist
    #[error("unknown {kind} '{name}' at line {line}, column {column}")]
    UnknownIdentifier {
        kind: IdentKind,
        name: String,
        line: usize,
        column: usize,
    },

    /// The constraint table has no entry for this motion on this bone
    #[error("bone '{bone}' does not support '{action} {direction}' (line {line}, column {column})")]
    UnsupportedAction {
        bone: BoneId,
        action: Action,
        direction: Direction,
        line: usize,
        column: usize,
    },

    /// One statement drives the same axis twice
    #[error("bone '{bone}' sets {axis} more than once in one statement (line {line}, column {column})")]
    ConflictingAxis {
        bone: BoneId,
        axis: AxisKind,
        line: usize,
        column: usize,
    },

    #[error("duplicate {kind} '{name}' at line {line}, column {column}")]
    DuplicateDefinition {
        kind: IdentKind,
        name: String,
        line: usize,
        column: usize,
    },

    /// Two keyframes of one animation share a timestamp
    #[error("animation '{animation}' has more than one keyframe at {time}s (line {line}, column {column})")]
    DuplicateTimestamp {
        animation: String,
        time: f64,
        line: usize,
        column: usize,
    },

    #[error("input too large: {what} exceeds the limit of {limit}")]
    InputTooLarge { what: String, limit: usize },

    /// The timeline or a name does not fit the binary layout
    #[error("encoding overflow: {reason}")]
    EncodingOverflow { reason: String },

    #[error("invalid compiler config: {reason}")]
    InvalidConfig { reason: String },
}

impl CompileError {
    pub(crate) fn syntax(span: Span, message: impl Into<String>) -> Self {
        Self::Syntax {
            line: span.line,
            column: span.column,
            message: message.into(),
        }
    }

    pub(crate) fn unknown(kind: IdentKind, name: impl Into<String>, span: Span) -> Self {
        Self::UnknownIdentifier {
            kind,
            name: name.into(),
            line: span.line,
            column: span.column,
        }
    }

    pub(crate) fn duplicate(kind: IdentKind, name: impl Into<String>, span: Span) -> Self {
        Self::DuplicateDefinition {
            kind,
            name: name.into(),
            line: span.line,
            column: span.column,
        }
    }

    pub(crate) fn too_large(what: impl Into<String>, limit: usize) -> Self {
        Self::InputTooLarge {
            what: what.into(),
            limit,
        }
    }

    pub(crate) fn overflow(reason: impl Into<String>) -> Self {
        Self::EncodingOverflow {
            reason: reason.into(),
        }
    }

    /// Source location (line, column), when the error points into the document.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Syntax { line, column, .. }
            | Self::UnknownIdentifier { line, column, .. }
            | Self::UnsupportedAction { line, column, .. }
            | Self::ConflictingAxis { line, column, .. }
            | Self::DuplicateDefinition { line, column, .. }
            | Self::DuplicateTimestamp { line, column, .. } => Some((*line, *column)),
            Self::InputTooLarge { .. } | Self::EncodingOverflow { .. } | Self::InvalidConfig { .. } => {
                None
            }
        }
    }

    /// Error category for logging and for hosts that group messages
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::UnknownIdentifier { .. } | Self::DuplicateDefinition { .. } => "name",
            Self::UnsupportedAction { .. } | Self::ConflictingAxis { .. } => "constraint",
            Self::DuplicateTimestamp { .. } => "timeline",
            Self::InputTooLarge { .. } => "limits",
            Self::EncodingOverflow { .. } => "encoding",
            Self::InvalidConfig { .. } => "config",
        }
    }
}

/// A magnitude above the bone's limit was clamped to the limit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeClampWarning {
    pub pose: String,
    pub bone: BoneId,
    pub action: Action,
    pub direction: Direction,
    pub requested: f64,
    pub limit: f64,
    pub line: usize,
    pub column: usize,
}

/// Non-fatal findings returned next to a successful compile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Diagnostic {
    RangeClamp(RangeClampWarning),
}

impl Diagnostic {
    pub fn location(&self) -> (usize, usize) {
        match self {
            Diagnostic::RangeClamp(w) => (w.line, w.column),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RangeClamp(w) => write!(
                f,
                "line {}, column {}: {} {} {} {} in pose '{}' exceeds the limit of {}; clamped",
                w.line, w.column, w.bone, w.action, w.direction, w.requested, w.pose, w.limit
            ),
        }
    }
}

/// Errors from reading a VMD byte stream back.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("not a VMD stream: unexpected signature")]
    BadSignature,

    #[error("stream truncated while reading {section} at byte {offset}")]
    Truncated { section: &'static str, offset: usize },

    #[error("{count} trailing bytes after the last section")]
    TrailingBytes { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let err = CompileError::syntax(Span::new(0, 1, 3, 7), "expected ';' after statement");
        assert_eq!(err.category(), "syntax");
        assert_eq!(err.location(), Some((3, 7)));

        let err = CompileError::overflow("frame too large");
        assert_eq!(err.category(), "encoding");
        assert_eq!(err.location(), None);
    }

    #[test]
    fn display_mentions_location() {
        let err = CompileError::unknown(IdentKind::Pose, "x", Span::new(10, 11, 2, 5));
        assert_eq!(err.to_string(), "unknown pose 'x' at line 2, column 5");
    }

    #[test]
    fn serialization() {
        let err = CompileError::UnsupportedAction {
            bone: BoneId::KneeL,
            action: Action::Bend,
            direction: Direction::Forward,
            line: 1,
            column: 1,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: CompileError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
