//! NURBS core algorithms: knot vectors, basis functions, De Boor evaluation
//! and knot refinement.

pub mod basis;
pub mod cache;
pub(crate) mod control;
pub mod deboor;
pub mod insertion;
pub mod knot;

pub use basis::{basis_function_derivatives, basis_functions};
pub use cache::BasisCache;
pub use knot::KnotVector;
