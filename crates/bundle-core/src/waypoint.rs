//! Spread waypoints: sparse `(position, spread)` control points along a curve.
//!
//! Positions are percentages of the curve arclength in `[0, 100]`. The set is
//! kept in insertion order; consumers that need it sorted use
//! [`Waypoints::sorted_merged`].

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, Result};
use crate::tolerance::Tolerance;

/// Default position of the single waypoint created by [`Waypoints::reset`].
pub const RESET_POSITION: f64 = 50.0;

const U_SHAPE_POSITIONS: [f64; 6] = [10.0, 20.0, 40.0, 60.0, 80.0, 90.0];
const U_SHAPE_FACTORS: [f64; 6] = [0.7, 0.2, 0.15, 0.15, 0.2, 0.7];

/// One spread control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Percentage along the curve arclength, `0..=100`.
    pub position: f64,
    /// Non-negative wander magnitude at this position.
    pub spread: f64,
}

impl Waypoint {
    pub fn new(position: f64, spread: f64) -> Self {
        Self { position, spread }
    }
}

/// Which waypoints a spread adjustment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpreadModify {
    /// Only the selected waypoint.
    #[default]
    Selected,
    /// Every waypoint, shifted by the same delta.
    All,
}

/// Ordered, mutable set of waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Waypoints(Vec<Waypoint>);

impl Waypoints {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self(waypoints)
    }

    pub fn single(position: f64, spread: f64) -> Self {
        Self(vec![Waypoint::new(position, spread)])
    }

    /// Preset narrowing towards the middle of the curve and widening at both ends.
    pub fn u_shape(max_spread: f64) -> Self {
        Self(
            U_SHAPE_POSITIONS
                .iter()
                .zip(U_SHAPE_FACTORS.iter())
                .map(|(&position, &factor)| Waypoint::new(position, factor * max_spread))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Waypoint] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.0.get(index)
    }

    pub fn positions(&self) -> Vec<f64> {
        self.0.iter().map(|w| w.position).collect()
    }

    pub fn spreads(&self) -> Vec<f64> {
        self.0.iter().map(|w| w.spread).collect()
    }

    pub fn mean_spread(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.iter().map(|w| w.spread).sum::<f64>() / self.0.len() as f64)
    }

    /// Replace the set with a single waypoint at the middle of the curve
    /// carrying the mean spread of the current set.
    pub fn reset(&mut self) {
        let spread = self.mean_spread().unwrap_or(0.0);
        self.0 = vec![Waypoint::new(RESET_POSITION, spread)];
    }

    /// Spread a new waypoint at `position` should start with.
    ///
    /// Before the first waypoint it takes the first spread, at or after the
    /// last it takes the last spread, and in between it takes the mean of the
    /// two neighbouring spreads.
    pub fn spread_for_new_position(&self, position: f64) -> Option<f64> {
        let sorted = self.sorted();
        let first = sorted.first()?;
        let last = sorted.last()?;

        if position < first.position {
            return Some(first.spread);
        }
        if position >= last.position {
            return Some(last.spread);
        }

        let next = sorted.iter().position(|w| w.position > position)?;
        Some((sorted[next - 1].spread + sorted[next].spread) / 2.0)
    }

    /// Append a waypoint at `position`, returning its index.
    pub fn insert(&mut self, position: f64) -> Result<usize> {
        if !(0.0..=100.0).contains(&position) {
            return Err(BundleError::InvalidInput(format!(
                "waypoint position {} outside [0, 100]",
                position
            )));
        }
        let spread = self.spread_for_new_position(position).unwrap_or(0.0);
        self.0.push(Waypoint::new(position, spread));
        Ok(self.0.len() - 1)
    }

    /// Remove the waypoint at `index`. The last remaining waypoint cannot be removed.
    pub fn remove(&mut self, index: usize) -> Result<Waypoint> {
        if index >= self.0.len() {
            return Err(BundleError::InvalidInput(format!(
                "waypoint index {} out of range ({} waypoints)",
                index,
                self.0.len()
            )));
        }
        if self.0.len() == 1 {
            return Err(BundleError::InvalidInput(
                "cannot remove the last waypoint".into(),
            ));
        }
        Ok(self.0.remove(index))
    }

    /// Move the waypoint at `index` to a new position, keeping its spread.
    pub fn set_position(&mut self, index: usize, position: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&position) {
            return Err(BundleError::InvalidInput(format!(
                "waypoint position {} outside [0, 100]",
                position
            )));
        }
        let len = self.0.len();
        let waypoint = self.0.get_mut(index).ok_or_else(|| {
            BundleError::InvalidInput(format!(
                "waypoint index {} out of range ({} waypoints)",
                index, len
            ))
        })?;
        waypoint.position = position;
        Ok(())
    }

    /// Set the spread of the selected waypoint to `value`.
    ///
    /// The difference to the selected waypoint's current spread is applied to
    /// the selection (or to every waypoint with [`SpreadModify::All`]), each
    /// result clamped to `[0, max_spread]`.
    pub fn adjust_spread(
        &mut self,
        index: usize,
        value: f64,
        mode: SpreadModify,
        max_spread: f64,
    ) -> Result<()> {
        let selected = self.0.get(index).ok_or_else(|| {
            BundleError::InvalidInput(format!(
                "waypoint index {} out of range ({} waypoints)",
                index,
                self.0.len()
            ))
        })?;
        let diff = value - selected.spread;

        let targets: Vec<usize> = match mode {
            SpreadModify::Selected => vec![index],
            SpreadModify::All => (0..self.0.len()).collect(),
        };
        for i in targets {
            let w = &mut self.0[i];
            w.spread = if diff > 0.0 {
                (w.spread + diff).min(max_spread)
            } else {
                (w.spread + diff).max(0.0)
            };
        }
        Ok(())
    }

    /// Waypoints sorted by position, with coincident positions merged into
    /// one waypoint carrying the mean of their spreads.
    pub fn sorted_merged(&self, tol: Tolerance) -> Vec<Waypoint> {
        let sorted = self.sorted();
        let mut merged: Vec<(Waypoint, usize)> = Vec::with_capacity(sorted.len());
        for w in sorted {
            match merged.last_mut() {
                Some((last, count)) if tol.position_eq(last.position, w.position) => {
                    last.spread = (last.spread * *count as f64 + w.spread) / (*count + 1) as f64;
                    *count += 1;
                }
                _ => merged.push((w, 1)),
            }
        }
        merged.into_iter().map(|(w, _)| w).collect()
    }

    fn sorted(&self) -> Vec<Waypoint> {
        let mut sorted = self.0.clone();
        sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
        sorted
    }
}

impl Default for Waypoints {
    fn default() -> Self {
        Self::single(RESET_POSITION, 2.0)
    }
}

impl From<Vec<Waypoint>> for Waypoints {
    fn from(waypoints: Vec<Waypoint>) -> Self {
        Self(waypoints)
    }
}
