/// Tolerances used when comparing curve geometry and waypoint positions.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distance comparisons (in model units)
    pub linear: f64,
    /// Tolerance on waypoint positions (in percent of arclength)
    pub position: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-9;
    pub const DEFAULT_POSITION: f64 = 1e-6;

    pub fn new(linear: f64, position: f64) -> Self {
        Self { linear, position }
    }

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            position: Self::DEFAULT_POSITION,
        }
    }

    /// Check if a length is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if two waypoint positions coincide
    pub fn position_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.position
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
