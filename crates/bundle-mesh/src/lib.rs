//! Fiber bundle polyline mesh, constraint surfaces and clipping filters.

pub mod bundle;
pub mod constraints;
pub mod surface;

pub use bundle::FiberBundle;
pub use constraints::{filter_inside_outside, trim_by_start_end};
pub use surface::{ClosedMesh, HalfSpace, ImplicitSurface, SphereSurface};
