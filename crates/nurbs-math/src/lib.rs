pub mod aabb;
pub mod binomial;
pub mod homogeneous;
pub mod point;

pub use glam::{DVec2, DVec3};
pub use aabb::{Aabb, Aabb2, Aabb3};
pub use binomial::binomial;
pub use homogeneous::Homogeneous;
pub use point::ControlPoint;
