//! B-spline and NURBS curves and surfaces: evaluation, derivatives, knot
//! insertion and refinement, and sampling.

pub mod curve;
pub mod nurbs;
pub mod sample;
pub mod surface;

pub use curve::{Curve, Curve2, Curve3, CurvePoints};
pub use nurbs::{BasisCache, KnotVector};
pub use sample::{curve_to_polyline, sample_curve, sample_surface};
pub use surface::{Direction, Surface, Surface2, Surface3, SurfacePoints};
