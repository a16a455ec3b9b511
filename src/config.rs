use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compare::{GeometryComparison, VertexDifference};
use crate::congruence::are_congruent_within_tolerance;
use crate::error::CompareError;
use crate::extract::VertexSource;
use crate::types::{GeometryKind, Tolerance};

fn default_symmetric() -> bool { true }

fn default_tolerance_factor() -> f64 { 1.0 }

/// Comparison settings, loadable from JSON.
///
/// ```json
/// { "xy_tolerance": 0.001, "z_tolerance": 0.01, "symmetric": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Planar tolerance.
    pub xy_tolerance: f64,
    /// Elevation tolerance; absent means elevation is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_tolerance: Option<f64>,
    /// Duplicate policy; absent means the default of the base geometry kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_duplicates: Option<bool>,
    #[serde(default = "default_symmetric")]
    pub symmetric: bool,
    /// Multiplier applied to both tolerances by the congruence test.
    #[serde(default = "default_tolerance_factor")]
    pub tolerance_factor: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            xy_tolerance: 0.0,
            z_tolerance: None,
            report_duplicates: None,
            symmetric: default_symmetric(),
            tolerance_factor: default_tolerance_factor(),
        }
    }
}

impl ComparisonConfig {
    pub fn new(xy_tolerance: f64, z_tolerance: Option<f64>) -> Self {
        Self { xy_tolerance, z_tolerance, ..Self::default() }
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ComparisonConfig = serde_json::from_str(json)
            .context("Failed to parse comparison config")?;
        config.tolerance()
            .context("Comparison config has an invalid tolerance")?;
        if !config.tolerance_factor.is_finite() || config.tolerance_factor < 0.0 {
            return Err(CompareError::InvalidToleranceFactor(config.tolerance_factor))
                .context("Comparison config has an invalid tolerance factor")
        }
        Ok(config)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read comparison config: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid comparison config: {}", path.display()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize comparison config")
    }

    /// The validated tolerance. A missing z tolerance disables elevation.
    pub fn tolerance(&self) -> Result<Tolerance, CompareError> {
        Tolerance::new(self.xy_tolerance, self.z_tolerance.unwrap_or(f64::NAN))
    }

    /// Vertex differences of `base` against `compare` with these settings.
    pub fn compare(&self, base: &impl VertexSource, compare: &impl VertexSource)
        -> Result<Vec<VertexDifference>, CompareError>
    {
        let comparison = GeometryComparison::new(base, compare, self.tolerance()?)?;
        let report_duplicates = self.report_duplicates
            .unwrap_or(comparison.base().kind() == GeometryKind::Multipoint);
        Ok(comparison.vertex_differences(self.symmetric, report_duplicates))
    }

    /// Congruence of `a` and `b` with the configured tolerance and factor.
    pub fn congruent(&self, a: &impl VertexSource, b: &impl VertexSource) -> Result<bool, CompareError> {
        are_congruent_within_tolerance(a, b, &self.tolerance()?, self.tolerance_factor)
    }
}
