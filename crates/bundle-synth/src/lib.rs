//! Procedural fiber bundle synthesis around a centerline curve.

pub mod generator;
pub mod sampler;

pub use generator::{generate, process, BundleInputs, BundleSink};
pub use sampler::{sample_between, sample_displacement};
