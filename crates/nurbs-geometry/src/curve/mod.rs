//! B-spline and NURBS curves.
//!
//! A single [`Curve`] type covers both variants: weights present means the
//! curve is rational. Span lookup and basis computation are shared, only the
//! final projection differs.

mod refine;

use nurbs_core::error::{NurbsError, Result};
use nurbs_core::traits::{BoundingBox, Validate};
use nurbs_core::Tolerance;
use nurbs_math::{Aabb, ControlPoint, DVec2, DVec3, Homogeneous};
use serde::{Deserialize, Serialize};

use crate::nurbs::cache::BasisCache;
use crate::nurbs::control::{check_points, check_weights};
use crate::nurbs::knot::KnotVector;
use crate::nurbs::{basis, deboor};

/// A B-spline curve, rational when it carries weights.
///
/// Deserialization goes through [`Curve::new`], so a decoded curve is always
/// safe to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawCurve<P>",
    bound(deserialize = "P: ControlPoint + Deserialize<'de>")
)]
pub struct Curve<P> {
    knots: KnotVector,
    control_points: Vec<P>,
    weights: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawCurve<P> {
    knots: KnotVector,
    control_points: Vec<P>,
    weights: Option<Vec<f64>>,
}

impl<P: ControlPoint> TryFrom<RawCurve<P>> for Curve<P> {
    type Error = NurbsError;

    fn try_from(raw: RawCurve<P>) -> Result<Self> {
        let degree = raw.knots.degree();
        Self::new(degree, raw.knots.into_knots(), raw.control_points, raw.weights)
    }
}

pub type Curve2 = Curve<DVec2>;
pub type Curve3 = Curve<DVec3>;

impl<P: ControlPoint> Curve<P> {
    /// Build a curve of `degree` from its knots, control points and optional
    /// weights.
    ///
    /// Fails with `InvalidControlData` when there are too few or non-finite
    /// control points or the weights do not match them, and with
    /// `InvalidKnotVector` when the knots are not a clamped vector of length
    /// `control_points.len() + degree + 1`.
    pub fn new(
        degree: usize,
        knots: Vec<f64>,
        control_points: Vec<P>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self> {
        check_points(&control_points, degree, "curve")?;
        if let Some(w) = &weights {
            check_weights(w, control_points.len(), "curve")?;
        }
        let knots = KnotVector::new(knots, degree, control_points.len())?;
        Ok(Self {
            knots,
            control_points,
            weights,
        })
    }

    /// Build a rational curve from homogeneous `(w * P, w)` control points.
    pub fn from_weighted_control_points(
        degree: usize,
        knots: Vec<f64>,
        weighted: &[Homogeneous<P>],
    ) -> Result<Self> {
        let weights: Vec<f64> = weighted.iter().map(|h| h.weight).collect();
        check_weights(&weights, weighted.len(), "curve")?;
        let control_points = weighted.iter().map(|h| h.point / h.weight).collect();
        Self::new(degree, knots, control_points, Some(weights))
    }

    pub(crate) fn from_parts(
        knots: KnotVector,
        control_points: Vec<P>,
        weights: Option<Vec<f64>>,
    ) -> Self {
        Self {
            knots,
            control_points,
            weights,
        }
    }

    pub fn degree(&self) -> usize {
        self.knots.degree()
    }

    pub fn knot_vector(&self) -> &KnotVector {
        &self.knots
    }

    pub fn knots(&self) -> &[f64] {
        self.knots.knots()
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn is_rational(&self) -> bool {
        self.weights.is_some()
    }

    /// Parameter domain `(u_min, u_max)`.
    pub fn domain(&self) -> (f64, f64) {
        self.knots.domain()
    }

    /// Control points lifted to homogeneous `(w * P, w)` form; weight 1 for
    /// non-rational curves.
    pub fn weighted_control_points(&self) -> Vec<Homogeneous<P>> {
        match &self.weights {
            Some(weights) => self
                .control_points
                .iter()
                .zip(weights)
                .map(|(&p, &w)| Homogeneous::from_cartesian(p, w))
                .collect(),
            None => self
                .control_points
                .iter()
                .map(|&p| Homogeneous::new(p, 1.0))
                .collect(),
        }
    }

    /// Evaluate the curve point at parameter `u`.
    pub fn evaluate(&self, u: f64) -> Result<P> {
        self.knots.check_parameter(u)?;
        let span = self.knots.find_span(u);
        let basis = basis::basis_functions(span, u, self.degree(), self.knots());
        self.combine(span, &basis)
    }

    /// Evaluate at `u`, reusing basis values memoized in `cache`.
    pub fn evaluate_cached(&self, u: f64, cache: &mut BasisCache) -> Result<P> {
        self.knots.check_parameter(u)?;
        let span = self.knots.find_span(u);
        let basis = cache.basis(&self.knots, span, u);
        self.combine(span, &basis)
    }

    fn combine(&self, span: usize, basis: &[f64]) -> Result<P> {
        let point = deboor::curve_point(
            span,
            self.degree(),
            basis,
            &self.control_points,
            self.weights.as_deref(),
        );
        deboor::project(point, self.is_rational())
    }

    /// Derivatives `C^(0)..=C^(order)` at `u`; `C^(0)` is the curve point.
    pub fn evaluate_derivatives(&self, u: f64, order: usize) -> Result<Vec<P>> {
        self.knots.check_parameter(u)?;
        let span = self.knots.find_span(u);
        let ders = basis::basis_function_derivatives(span, u, self.degree(), self.knots(), order);
        let homogeneous = deboor::curve_derivatives(
            span,
            self.degree(),
            &ders,
            &self.control_points,
            self.weights.as_deref(),
        );

        if self.is_rational() {
            deboor::rational_curve_derivatives(&homogeneous)
        } else {
            Ok(homogeneous.into_iter().map(|h| h.point).collect())
        }
    }

    /// Lazily evaluate each parameter in order.
    ///
    /// Each item is exactly `self.evaluate(u)`; clone the iterator to run the
    /// sequence again.
    pub fn evaluate_list<'a>(&'a self, parameters: &'a [f64]) -> CurvePoints<'a, P> {
        CurvePoints {
            curve: self,
            parameters: parameters.iter(),
        }
    }

    /// Unit tangent at `u`.
    pub fn tangent(&self, u: f64) -> Result<P> {
        let ders = self.evaluate_derivatives(u, 1)?;
        let d = ders[1];
        let len = d.length();
        if Tolerance::default().is_zero(len) {
            return Err(NurbsError::DegenerateTangent { parameter: u });
        }
        Ok(d / len)
    }
}

impl<P: ControlPoint> Validate for Curve<P> {
    fn validate(&self) -> Result<()> {
        self.knots.validate()?;
        check_points(&self.control_points, self.degree(), "curve")?;
        if self.knots.num_control_points() != self.control_points.len() {
            return Err(NurbsError::InvalidControlData(format!(
                "curve: knot vector expects {} control points, got {}",
                self.knots.num_control_points(),
                self.control_points.len()
            )));
        }
        if let Some(w) = &self.weights {
            check_weights(w, self.control_points.len(), "curve")?;
        }
        Ok(())
    }
}

/// Bounding box of the control polygon, which contains the curve.
impl<P: ControlPoint> BoundingBox for Curve<P> {
    type Point = P;

    fn bounding_box(&self) -> (P, P) {
        let aabb = Aabb::from_points(&self.control_points)
            .unwrap_or_else(|| Aabb::new(P::ZERO, P::ZERO));
        (aabb.min, aabb.max)
    }
}

/// Iterator returned by [`Curve::evaluate_list`].
#[derive(Debug, Clone)]
pub struct CurvePoints<'a, P> {
    curve: &'a Curve<P>,
    parameters: std::slice::Iter<'a, f64>,
}

impl<P: ControlPoint> Iterator for CurvePoints<'_, P> {
    type Item = Result<P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parameters.next().map(|&u| self.curve.evaluate(u))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.parameters.size_hint()
    }
}

impl<P: ControlPoint> ExactSizeIterator for CurvePoints<'_, P> {}
