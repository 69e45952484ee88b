//! Knot insertion and refinement for curves.

use log::debug;
use nurbs_core::error::{NurbsError, Result};
use nurbs_math::{ControlPoint, Homogeneous};

use super::Curve;
use crate::nurbs::insertion::{insert_knots, prepare_insertions, refine_knots};
use crate::nurbs::knot::KnotVector;

impl<P: ControlPoint> Curve<P> {
    /// A copy of this curve with `u` inserted `multiplicity` times.
    ///
    /// The shape is unchanged. Fails with `ParameterOutOfRange` when `u` is
    /// outside the domain and `InvalidMultiplicity` when `multiplicity` is
    /// zero or the knot would repeat more than `degree + 1` times.
    pub fn knot_inserted(&self, u: f64, multiplicity: usize) -> Result<Self> {
        if multiplicity == 0 {
            return Err(NurbsError::InvalidMultiplicity {
                knot: u,
                multiplicity,
                max: self.degree() + 1,
            });
        }
        let values = prepare_insertions(&self.knots, &vec![u; multiplicity])?;

        let (knots, points) = insert_knots(&self.knots, &self.weighted_control_points(), &values);
        Ok(self.rebuilt(knots, points))
    }

    /// Insert `u` `multiplicity` times in place; unchanged on error.
    pub fn insert_knot(&mut self, u: f64, multiplicity: usize) -> Result<()> {
        let before = self.control_points.len();
        *self = self.knot_inserted(u, multiplicity)?;
        debug!(
            "inserted knot {} x{}: {} -> {} control points",
            u,
            multiplicity,
            before,
            self.control_points.len()
        );
        Ok(())
    }

    /// A copy of this curve with all of `new_knots` inserted in one pass.
    ///
    /// `new_knots` must be non-decreasing; an empty slice returns an
    /// unchanged copy.
    pub fn refined(&self, new_knots: &[f64]) -> Result<Self> {
        let values = prepare_insertions(&self.knots, new_knots)?;
        if values.is_empty() {
            return Ok(self.clone());
        }
        let (knots, points) = refine_knots(&self.knots, &self.weighted_control_points(), &values);
        Ok(self.rebuilt(knots, points))
    }

    /// Refine in place; unchanged on error.
    pub fn refine(&mut self, new_knots: &[f64]) -> Result<()> {
        let before = self.control_points.len();
        *self = self.refined(new_knots)?;
        debug!(
            "refined with {} knots: {} -> {} control points",
            new_knots.len(),
            before,
            self.control_points.len()
        );
        Ok(())
    }

    fn rebuilt(&self, knots: KnotVector, points: Vec<Homogeneous<P>>) -> Self {
        if self.is_rational() {
            let weights = points.iter().map(|h| h.weight).collect();
            let control_points = points.iter().map(|h| h.point / h.weight).collect();
            Curve::from_parts(knots, control_points, Some(weights))
        } else {
            Curve::from_parts(knots, points.into_iter().map(|h| h.point).collect(), None)
        }
    }
}
