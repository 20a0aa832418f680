//! Source text to VMD bytes in one call.

use log::debug;
use serde::Serialize;

use crate::config::CompilerConfig;
use crate::error::{CompileError, Diagnostic};
use crate::parser::parse_with_limits;
use crate::resolve::resolve_document;
use crate::timeline::assemble;
use crate::validate::validate;
use crate::vmd::encode;

/// Result of a successful compile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Compiled {
    /// Complete VMD stream.
    pub bytes: Vec<u8>,
    /// Non-fatal findings, in source order.
    pub warnings: Vec<Diagnostic>,
    /// Distinct frames written (one per global timeline keyframe).
    pub frame_count: usize,
    /// Bone records written.
    pub record_count: usize,
    /// Global time of the last keyframe.
    pub duration_seconds: f64,
}

/// Run the whole pipeline. Either the full stream is returned or nothing is.
pub fn compile(source: &str, config: &CompilerConfig) -> Result<Compiled, CompileError> {
    config.validate()?;

    let result = parse_with_limits(source, &config.limits)
        .and_then(validate)
        .and_then(|validated| {
            let poses = resolve_document(&validated);
            let timeline = assemble(&validated.animations, &validated.main, &poses, &config.limits)?;
            let encoded = encode(&timeline, config)?;
            Ok(Compiled {
                frame_count: encoded.frames.len(),
                record_count: encoded.record_count,
                duration_seconds: timeline.duration(),
                bytes: encoded.bytes,
                warnings: validated.warnings,
            })
        });

    match &result {
        Ok(out) => debug!(
            "compiled {} source bytes to {} VMD bytes ({} warnings)",
            source.len(),
            out.bytes.len(),
            out.warnings.len()
        ),
        Err(err) => debug!("compile failed [{}]: {}", err.category(), err),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected_first() {
        let err = compile("not even mpl", &CompilerConfig::new(0.0)).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn empty_source_gives_empty_motion() {
        let out = compile("", &CompilerConfig::default()).unwrap();
        assert_eq!(out.frame_count, 0);
        assert_eq!(out.record_count, 0);
        assert_eq!(out.duration_seconds, 0.0);
        assert!(out.warnings.is_empty());
        assert_eq!(out.bytes.len(), crate::vmd::HEADER_SIZE + 4 + 20);
    }

    #[test]
    fn bundle_counts() {
        let src = "@pose up { arm_l bend forward 45; } @pose down { }\n\
                   @animation wave { 0: down; 0.5: up; 1: down; }\n\
                   main { wave; wave; }";
        let out = compile(src, &CompilerConfig::default()).unwrap();
        assert_eq!(out.frame_count, 6);
        assert_eq!(out.record_count, 6);
        assert_eq!(out.duration_seconds, 2.0);
    }
}
