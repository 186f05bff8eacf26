//! Build settings.

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

/// How the builder picks a split plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Midpoint of the centroid bounds on the longest axis.
    Center,
    /// Mean centroid on the longest axis.
    Average,
    /// Bucketed surface area heuristic over all three axes.
    Sah,
}

/// Hierarchy construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhSettings {
    /// Split plane selection.
    pub strategy: SplitStrategy,
    /// Stop splitting once a node holds this many triangles or fewer.
    pub max_leaf_triangles: usize,
    /// Stop splitting below this depth (unless the leaf count would overflow).
    pub max_depth: usize,
}

impl Default for BvhSettings {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::Center,
            max_leaf_triangles: 10,
            max_depth: 40,
        }
    }
}

impl BvhSettings {
    /// Parse settings from a TOML document; missing keys take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_leaf_triangles == 0 {
            return Err(BuildError::InvalidSettings(
                "max_leaf_triangles must be positive".into(),
            ));
        }
        if self.max_leaf_triangles > u16::MAX as usize {
            return Err(BuildError::InvalidSettings(format!(
                "max_leaf_triangles must not exceed {}",
                u16::MAX
            )));
        }
        if self.max_depth == 0 {
            return Err(BuildError::InvalidSettings(
                "max_depth must be positive".into(),
            ));
        }
        Ok(())
    }
}
