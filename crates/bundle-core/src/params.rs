//! Generator parameters with the defaults of the interactive tool.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, Result};
use crate::traits::Validate;
use crate::waypoint::Waypoints;

/// Highest spline order the spread interpolator supports.
pub const MAX_SPLINE_ORDER: usize = 5;

/// Distribution of the per-fiber wander direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Components drawn uniformly from `[-1, 1)`.
    Uniform,
    /// Components drawn from the standard normal distribution.
    #[default]
    Normal,
}

impl FromStr for SampleKind {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "normal" => Ok(Self::Normal),
            other => Err(BundleError::Parse(format!("unknown sample kind '{}'", other))),
        }
    }
}

/// Every knob of a bundle generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleParams {
    pub fiber_count: usize,
    pub sample_kind: SampleKind,
    /// Number of full sine periods along each fiber.
    pub sine_cycles: f64,
    pub waypoints: Waypoints,
    pub spline_order: usize,
    /// Extend the spread spline beyond the outermost waypoints instead of
    /// holding the boundary value.
    pub extrapolate: bool,
    /// Upper bound for waypoint spreads.
    pub max_spread: f64,
    /// Arclength spacing of the resampled centerline.
    pub resample_spacing: f64,
    /// Seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for BundleParams {
    fn default() -> Self {
        Self {
            fiber_count: 50,
            sample_kind: SampleKind::Normal,
            sine_cycles: 2.0,
            waypoints: Waypoints::default(),
            spline_order: 3,
            extrapolate: true,
            max_spread: 5.0,
            resample_spacing: 1.0,
            seed: None,
        }
    }
}

impl BundleParams {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Validate for BundleParams {
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_SPLINE_ORDER).contains(&self.spline_order) {
            return Err(BundleError::InvalidInput(format!(
                "spline order must be in 1..={}, got {}",
                MAX_SPLINE_ORDER, self.spline_order
            )));
        }
        if !self.resample_spacing.is_finite() || self.resample_spacing <= 0.0 {
            return Err(BundleError::InvalidInput(format!(
                "resample spacing must be positive, got {}",
                self.resample_spacing
            )));
        }
        if !self.sine_cycles.is_finite() {
            return Err(BundleError::InvalidInput("sine cycles must be finite".into()));
        }
        if !self.max_spread.is_finite() || self.max_spread < 0.0 {
            return Err(BundleError::InvalidInput(format!(
                "max spread must be non-negative, got {}",
                self.max_spread
            )));
        }
        if self.waypoints.is_empty() {
            return Err(BundleError::InvalidInput("at least one waypoint is required".into()));
        }
        for w in self.waypoints.iter() {
            if !(0.0..=100.0).contains(&w.position) {
                return Err(BundleError::InvalidInput(format!(
                    "waypoint position {} outside [0, 100]",
                    w.position
                )));
            }
            // max_spread only bounds interactive edits and presets
            if !w.spread.is_finite() || w.spread < 0.0 {
                return Err(BundleError::InvalidInput(format!(
                    "waypoint spread must be non-negative, got {}",
                    w.spread
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waypoint::Waypoint;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let params = BundleParams::default();
        params.validate().unwrap();
        assert_eq!(params.fiber_count, 50);
        assert_eq!(params.sample_kind, SampleKind::Normal);
        assert_eq!(params.spline_order, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params = BundleParams::from_json_str(
            r#"{"fiber_count": 7, "sample_kind": "uniform", "seed": 42}"#,
        )
        .unwrap();
        assert_eq!(params.fiber_count, 7);
        assert_eq!(params.sample_kind, SampleKind::Uniform);
        assert_eq!(params.seed, Some(42));
        assert!(params.extrapolate);
        assert_eq!(params.waypoints, Waypoints::default());
    }

    #[test]
    fn test_invalid_spline_order() {
        let err = BundleParams::from_json_str(r#"{"spline_order": 0}"#).unwrap_err();
        assert!(matches!(err, BundleError::InvalidInput(_)));
        let params = BundleParams {
            spline_order: 6,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_spread_above_max_accepted() {
        let params = BundleParams {
            waypoints: Waypoints::new(vec![Waypoint::new(10.0, 9.0)]),
            ..Default::default()
        };
        params.validate().unwrap();
    }

    #[test]
    fn test_negative_spread_rejected() {
        let params = BundleParams {
            waypoints: Waypoints::new(vec![Waypoint::new(10.0, -0.5)]),
            ..Default::default()
        };
        assert!(params.validate().is_err());
        let params = BundleParams {
            waypoints: Waypoints::new(vec![Waypoint::new(10.0, f64::NAN)]),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"sine_cycles": 0.5}}"#).unwrap();
        let params = BundleParams::from_path(file.path()).unwrap();
        assert_eq!(params.sine_cycles, 0.5);
    }

    #[test]
    fn test_sample_kind_from_str() {
        assert_eq!("Uniform".parse::<SampleKind>().unwrap(), SampleKind::Uniform);
        assert!("gaussian".parse::<SampleKind>().is_err());
    }
}
