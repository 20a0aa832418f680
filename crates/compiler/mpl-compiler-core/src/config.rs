//! Compiler configuration.

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// Frame rate assumed by MMD players when none is supplied.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

const MB: usize = 1024 * 1024;

/// Caps that keep pathological documents from exhausting memory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    pub max_source_bytes: usize,
    pub max_poses: usize,
    pub max_animations: usize,
    pub max_keyframes_per_animation: usize,
    /// Entries in the `main` block.
    pub max_play_entries: usize,
    /// Keyframes in the concatenated global timeline.
    pub max_timeline_keyframes: usize,
    /// Bone records in the encoded motion (active bones times frames).
    pub max_output_records: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: MB,
            max_poses: 1024,
            max_animations: 256,
            max_keyframes_per_animation: 4096,
            max_play_entries: 1024,
            max_timeline_keyframes: 65536,
            max_output_records: 262_144,
        }
    }
}

/// Configuration for one compiler instance. Any field may be omitted when deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Target frame rate (frames per second) for converting keyframe times.
    pub frame_rate: f64,
    /// Model name written into the VMD header. Blank by default; the player owns model binding.
    pub model_name: String,
    pub limits: InputLimits,
    /// Entries retained by [`crate::CompileCache`].
    pub cache_capacity: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            model_name: String::new(),
            limits: InputLimits::default(),
            cache_capacity: 64,
        }
    }
}

impl CompilerConfig {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            ..Default::default()
        }
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CompileError> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(CompileError::InvalidConfig {
                reason: format!("frame rate must be positive and finite, got {}", self.frame_rate),
            });
        }

        let l = &self.limits;
        if l.max_source_bytes == 0
            || l.max_poses == 0
            || l.max_animations == 0
            || l.max_keyframes_per_animation == 0
            || l.max_play_entries == 0
            || l.max_timeline_keyframes == 0
            || l.max_output_records == 0
        {
            return Err(CompileError::InvalidConfig {
                reason: "input limits must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = CompilerConfig::default();
        assert_eq!(cfg.frame_rate, 30.0);
        assert!(cfg.model_name.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_frame_rate() {
        for fps in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let err = CompilerConfig::new(fps).validate().unwrap_err();
            assert_eq!(err.category(), "config");
        }
    }

    #[test]
    fn rejects_zero_limits() {
        let cfg = CompilerConfig::default().with_limits(InputLimits {
            max_poses: 0,
            ..Default::default()
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn cache_capacity_is_not_a_compile_setting() {
        let cfg = CompilerConfig::default().with_cache_capacity(0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: CompilerConfig =
            serde_json::from_str(r#"{ "frame_rate": 60, "limits": { "max_poses": 8 } }"#).unwrap();
        assert_eq!(cfg.frame_rate, 60.0);
        assert_eq!(cfg.limits.max_poses, 8);
        assert_eq!(cfg.limits.max_animations, 256);
        assert_eq!(cfg.cache_capacity, 64);
        assert_eq!(cfg.limits.max_output_records, 262_144);
    }
}
