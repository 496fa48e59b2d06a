//! Math primitives for fiber bundle generation, built on `glam` f64 types.

pub mod aabb;
pub mod plane;

pub use glam::{dvec3, DMat3, DMat4, DVec3, DVec4};
pub use aabb::Aabb3;
pub use plane::Plane;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
