//! MPL compiler core (engine-agnostic)
//!
//! Compiles MMD Pose Language documents (named poses, timed animations and a `main` play
//! sequence) into VMD bone-motion streams for MMD-compatible players.
//!
//! Pipeline, each stage public so callers can stop anywhere:
//! [`parse`] → [`validate()`] → [`resolve_document`] → [`assemble`] → [`encode`].
//! [`compile()`] runs all of them; [`CompileCache`] memoizes it per source text.
//!
//! ```
//! use mpl_compiler_core::{compile, CompilerConfig};
//!
//! let src = "@pose raise { arm_l bend forward 90; }
//!            @animation hello { 0: raise; 1: raise; }
//!            main { hello; }";
//! let out = compile(src, &CompilerConfig::default()).unwrap();
//! assert_eq!(out.frame_count, 2);
//! ```

pub mod ast;
pub mod bones;
pub mod cache;
pub mod compile;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolve;
pub mod timeline;
pub mod validate;
pub mod vmd;

pub use ast::{Document, Span};
pub use bones::{
    axis_for, max_magnitude, Action, AxisKind, BoneId, Direction, Sign, CONSTRAINT_TABLE_VERSION,
};
pub use cache::CompileCache;
pub use compile::{compile, Compiled};
pub use config::{CompilerConfig, InputLimits, DEFAULT_FRAME_RATE};
pub use error::{CompileError, DecodeError, Diagnostic, IdentKind, RangeClampWarning};
pub use parser::{parse, parse_with_limits};
pub use resolve::{resolve_document, resolve_pose, BoneTransform, ResolvedPose};
pub use timeline::{assemble, assemble_animation, GlobalKeyframe, GlobalTimeline};
pub use validate::{validate, ValidatedDocument, ValidatedPose};
pub use vmd::{encode, EncodedMotion, VmdMotion};

pub type Result<T> = core::result::Result<T, CompileError>;
