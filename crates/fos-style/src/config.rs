//! Engine Configuration

use serde::{Deserialize, Serialize};

use crate::selectors::MAX_ANCESTOR_DEPTH;
use crate::StyleError;

/// Style engine configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of ancestors walked by descendant selectors
    pub max_ancestor_depth: usize,

    /// Blend factor at which non-interpolatable values switch to the
    /// pseudo value
    pub discrete_blend_threshold: f32,

    /// Memoize selector membership between tree mutations
    pub memoize_matches: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: MAX_ANCESTOR_DEPTH,
            discrete_blend_threshold: 0.5,
            memoize_matches: true,
        }
    }
}

impl EngineConfig {
    /// Load from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if self.max_ancestor_depth == 0 {
            return Err(StyleError::InvalidConfig(
                "maxAncestorDepth must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.discrete_blend_threshold) {
            return Err(StyleError::InvalidConfig(format!(
                "discreteBlendThreshold {} outside [0, 1]",
                self.discrete_blend_threshold
            )));
        }
        Ok(())
    }
}
