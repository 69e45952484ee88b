//! Tensor-product B-spline and NURBS surfaces.
//!
//! `control_points[i][j]` is the control point at row `i` (u-direction) and
//! column `j` (v-direction). As with curves, weights present means rational.

mod refine;

pub use refine::Direction;

use nurbs_core::error::{NurbsError, Result};
use nurbs_core::traits::{BoundingBox, Validate};
use nurbs_core::Tolerance;
use nurbs_math::{Aabb, ControlPoint, DVec2, DVec3, Homogeneous};
use serde::{Deserialize, Serialize};

use crate::nurbs::cache::BasisCache;
use crate::nurbs::control::{check_points, check_weights};
use crate::nurbs::knot::KnotVector;
use crate::nurbs::{basis, deboor};

/// A tensor-product B-spline surface, rational when it carries weights.
///
/// Deserialization goes through [`Surface::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawSurface<P>",
    bound(deserialize = "P: ControlPoint + Deserialize<'de>")
)]
pub struct Surface<P> {
    knots_u: KnotVector,
    knots_v: KnotVector,
    control_points: Vec<Vec<P>>,
    weights: Option<Vec<Vec<f64>>>,
}

#[derive(Deserialize)]
struct RawSurface<P> {
    knots_u: KnotVector,
    knots_v: KnotVector,
    control_points: Vec<Vec<P>>,
    weights: Option<Vec<Vec<f64>>>,
}

impl<P: ControlPoint> TryFrom<RawSurface<P>> for Surface<P> {
    type Error = NurbsError;

    fn try_from(raw: RawSurface<P>) -> Result<Self> {
        Self::new(
            raw.knots_u.degree(),
            raw.knots_v.degree(),
            raw.knots_u.into_knots(),
            raw.knots_v.into_knots(),
            raw.control_points,
            raw.weights,
        )
    }
}

pub type Surface2 = Surface<DVec2>;
pub type Surface3 = Surface<DVec3>;

fn check_grid<P: ControlPoint>(
    grid: &[Vec<P>],
    weights: Option<&[Vec<f64>]>,
    degree_u: usize,
    degree_v: usize,
) -> Result<()> {
    if grid.len() < degree_u + 1 {
        return Err(NurbsError::InvalidControlData(format!(
            "surface: degree {} in u needs at least {} rows, got {}",
            degree_u,
            degree_u + 1,
            grid.len()
        )));
    }
    let size_v = grid[0].len();
    for (i, row) in grid.iter().enumerate() {
        if row.len() != size_v {
            return Err(NurbsError::InvalidControlData(format!(
                "surface: row {} has {} points, expected {}",
                i,
                row.len(),
                size_v
            )));
        }
        check_points(row, degree_v, "surface row")?;
    }

    if let Some(weights) = weights {
        if weights.len() != grid.len() {
            return Err(NurbsError::InvalidControlData(format!(
                "surface: expected {} weight rows, got {}",
                grid.len(),
                weights.len()
            )));
        }
        for row in weights {
            check_weights(row, size_v, "surface row")?;
        }
    }
    Ok(())
}

impl<P: ControlPoint> Surface<P> {
    /// Build a surface from its degrees, knot vectors and control grid.
    ///
    /// The grid must be rectangular and `weights`, when given, must share its
    /// shape. Failures are reported as for [`crate::Curve::new`].
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        control_points: Vec<Vec<P>>,
        weights: Option<Vec<Vec<f64>>>,
    ) -> Result<Self> {
        check_grid(&control_points, weights.as_deref(), degree_u, degree_v)?;
        let knots_u = KnotVector::new(knots_u, degree_u, control_points.len())?;
        let knots_v = KnotVector::new(knots_v, degree_v, control_points[0].len())?;
        Ok(Self {
            knots_u,
            knots_v,
            control_points,
            weights,
        })
    }

    /// Build a surface from a row-major list of `size_u * size_v` control
    /// points, point `(i, j)` at index `i * size_v + j`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_flat(
        degree_u: usize,
        degree_v: usize,
        size_u: usize,
        size_v: usize,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        control_points: Vec<P>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self> {
        if size_v == 0 || control_points.len() != size_u * size_v {
            return Err(NurbsError::InvalidControlData(format!(
                "surface: {} control points do not form a {} x {} grid",
                control_points.len(),
                size_u,
                size_v
            )));
        }
        let weights = match weights {
            Some(w) if w.len() != control_points.len() => {
                return Err(NurbsError::InvalidControlData(format!(
                    "surface: expected {} weights, got {}",
                    control_points.len(),
                    w.len()
                )))
            }
            Some(w) => Some(w.chunks(size_v).map(<[f64]>::to_vec).collect()),
            None => None,
        };
        let grid = control_points.chunks(size_v).map(<[P]>::to_vec).collect();
        Self::new(degree_u, degree_v, knots_u, knots_v, grid, weights)
    }

    pub(crate) fn from_parts(
        knots_u: KnotVector,
        knots_v: KnotVector,
        control_points: Vec<Vec<P>>,
        weights: Option<Vec<Vec<f64>>>,
    ) -> Self {
        Self {
            knots_u,
            knots_v,
            control_points,
            weights,
        }
    }

    pub fn degree_u(&self) -> usize {
        self.knots_u.degree()
    }

    pub fn degree_v(&self) -> usize {
        self.knots_v.degree()
    }

    pub fn knot_vector_u(&self) -> &KnotVector {
        &self.knots_u
    }

    pub fn knot_vector_v(&self) -> &KnotVector {
        &self.knots_v
    }

    pub fn knots_u(&self) -> &[f64] {
        self.knots_u.knots()
    }

    pub fn knots_v(&self) -> &[f64] {
        self.knots_v.knots()
    }

    pub fn control_points(&self) -> &[Vec<P>] {
        &self.control_points
    }

    pub fn weights(&self) -> Option<&[Vec<f64>]> {
        self.weights.as_deref()
    }

    /// Grid dimensions `(size_u, size_v)`.
    pub fn size(&self) -> (usize, usize) {
        (
            self.control_points.len(),
            self.control_points.first().map_or(0, Vec::len),
        )
    }

    pub fn is_rational(&self) -> bool {
        self.weights.is_some()
    }

    pub fn domain_u(&self) -> (f64, f64) {
        self.knots_u.domain()
    }

    pub fn domain_v(&self) -> (f64, f64) {
        self.knots_v.domain()
    }

    /// Control grid lifted to homogeneous `(w * P, w)` form.
    pub fn weighted_control_points(&self) -> Vec<Vec<Homogeneous<P>>> {
        self.control_points
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, &p)| match &self.weights {
                        Some(w) => Homogeneous::from_cartesian(p, w[i][j]),
                        None => Homogeneous::new(p, 1.0),
                    })
                    .collect()
            })
            .collect()
    }

    fn spans(&self, u: f64, v: f64) -> Result<(usize, usize)> {
        self.knots_u.check_parameter(u)?;
        self.knots_v.check_parameter(v)?;
        Ok((self.knots_u.find_span(u), self.knots_v.find_span(v)))
    }

    /// Evaluate the surface point at `(u, v)`.
    pub fn evaluate(&self, u: f64, v: f64) -> Result<P> {
        let (span_u, span_v) = self.spans(u, v)?;
        let basis_u = basis::basis_functions(span_u, u, self.degree_u(), self.knots_u());
        let basis_v = basis::basis_functions(span_v, v, self.degree_v(), self.knots_v());
        self.combine(span_u, &basis_u, span_v, &basis_v)
    }

    /// Evaluate at `(u, v)`, reusing basis values memoized in `cache`.
    pub fn evaluate_cached(&self, u: f64, v: f64, cache: &mut BasisCache) -> Result<P> {
        let (span_u, span_v) = self.spans(u, v)?;
        let basis_u = cache.basis(&self.knots_u, span_u, u);
        let basis_v = cache.basis(&self.knots_v, span_v, v);
        self.combine(span_u, &basis_u, span_v, &basis_v)
    }

    fn combine(&self, span_u: usize, basis_u: &[f64], span_v: usize, basis_v: &[f64]) -> Result<P> {
        let point = deboor::surface_point(
            span_u,
            self.degree_u(),
            basis_u,
            span_v,
            self.degree_v(),
            basis_v,
            &self.control_points,
            self.weights.as_deref(),
        );
        deboor::project(point, self.is_rational())
    }

    /// Partial derivatives `SKL[k][l] = ∂^{k+l} S / ∂u^k ∂v^l` at `(u, v)` for
    /// `k <= order_u` and `l <= order_v`; `SKL[0][0]` is the surface point.
    pub fn evaluate_derivatives(
        &self,
        u: f64,
        v: f64,
        order_u: usize,
        order_v: usize,
    ) -> Result<Vec<Vec<P>>> {
        let (span_u, span_v) = self.spans(u, v)?;
        let ders_u =
            basis::basis_function_derivatives(span_u, u, self.degree_u(), self.knots_u(), order_u);
        let ders_v =
            basis::basis_function_derivatives(span_v, v, self.degree_v(), self.knots_v(), order_v);
        let homogeneous = deboor::surface_derivatives(
            span_u,
            self.degree_u(),
            &ders_u,
            span_v,
            self.degree_v(),
            &ders_v,
            &self.control_points,
            self.weights.as_deref(),
        );

        if self.is_rational() {
            deboor::rational_surface_derivatives(&homogeneous)
        } else {
            Ok(homogeneous
                .into_iter()
                .map(|row| row.into_iter().map(|h| h.point).collect())
                .collect())
        }
    }

    /// Lazily evaluate each `(u, v)` pair in order.
    pub fn evaluate_list<'a>(&'a self, parameters: &'a [(f64, f64)]) -> SurfacePoints<'a, P> {
        SurfacePoints {
            surface: self,
            parameters: parameters.iter(),
        }
    }

    /// The point with both first partials, `(S, ∂S/∂u, ∂S/∂v)`.
    pub fn tangents(&self, u: f64, v: f64) -> Result<(P, P, P)> {
        let skl = self.evaluate_derivatives(u, v, 1, 1)?;
        Ok((skl[0][0], skl[1][0], skl[0][1]))
    }
}

impl Surface<DVec3> {
    /// Unit normal `∂S/∂u × ∂S/∂v` at `(u, v)`.
    pub fn normal(&self, u: f64, v: f64) -> Result<DVec3> {
        let n = self.normal_unnormalized(u, v)?;
        let len = n.length();
        if Tolerance::default().is_zero(len) {
            return Err(NurbsError::DegenerateNormal { u, v });
        }
        Ok(n / len)
    }

    /// The raw cross product `∂S/∂u × ∂S/∂v`. Its length is the local area
    /// scale of the parametrization and may be zero at a collapsed edge.
    pub fn normal_unnormalized(&self, u: f64, v: f64) -> Result<DVec3> {
        let (_, du, dv) = self.tangents(u, v)?;
        Ok(du.cross(dv))
    }
}

impl<P: ControlPoint> Validate for Surface<P> {
    fn validate(&self) -> Result<()> {
        self.knots_u.validate()?;
        self.knots_v.validate()?;
        check_grid(
            &self.control_points,
            self.weights.as_deref(),
            self.degree_u(),
            self.degree_v(),
        )?;
        let (size_u, size_v) = self.size();
        let expected = (
            self.knots_u.num_control_points(),
            self.knots_v.num_control_points(),
        );
        if expected != (size_u, size_v) {
            return Err(NurbsError::InvalidControlData(format!(
                "surface: knot vectors expect a {} x {} grid, got {} x {}",
                expected.0, expected.1, size_u, size_v
            )));
        }
        Ok(())
    }
}

/// Bounding box of the control grid, which contains the surface.
impl<P: ControlPoint> BoundingBox for Surface<P> {
    type Point = P;

    fn bounding_box(&self) -> (P, P) {
        let aabb = self
            .control_points
            .iter()
            .filter_map(|row| Aabb::from_points(row))
            .reduce(|a, b| a.merge(&b))
            .unwrap_or_else(|| Aabb::new(P::ZERO, P::ZERO));
        (aabb.min, aabb.max)
    }
}

/// Iterator returned by [`Surface::evaluate_list`].
#[derive(Debug, Clone)]
pub struct SurfacePoints<'a, P> {
    surface: &'a Surface<P>,
    parameters: std::slice::Iter<'a, (f64, f64)>,
}

impl<P: ControlPoint> Iterator for SurfacePoints<'_, P> {
    type Item = Result<P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parameters
            .next()
            .map(|&(u, v)| self.surface.evaluate(u, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.parameters.size_hint()
    }
}

impl<P: ControlPoint> ExactSizeIterator for SurfacePoints<'_, P> {}
