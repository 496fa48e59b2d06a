//! Core types shared by the fiber bundle crates: errors, tolerances,
//! spread waypoints and generator parameters.

pub mod error;
pub mod params;
pub mod tolerance;
pub mod traits;
pub mod waypoint;

pub use error::{BundleError, Result};
pub use params::{BundleParams, SampleKind};
pub use tolerance::Tolerance;
pub use waypoint::{SpreadModify, Waypoint, Waypoints};
