//! Knot insertion and refinement for surfaces, one parametric direction at a
//! time.

use log::debug;
use nurbs_core::error::{NurbsError, Result};
use nurbs_math::{ControlPoint, Homogeneous};
use serde::{Deserialize, Serialize};

use super::Surface;
use crate::nurbs::insertion::{insert_knots, prepare_insertions, refine_knots};
use crate::nurbs::knot::KnotVector;

/// Parametric direction of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    U,
    V,
}

type Polygon<P> = Vec<Homogeneous<P>>;

impl<P: ControlPoint> Surface<P> {
    fn knots_along(&self, direction: Direction) -> &KnotVector {
        match direction {
            Direction::U => &self.knots_u,
            Direction::V => &self.knots_v,
        }
    }

    /// A copy with `u` inserted `multiplicity` times along `direction`.
    ///
    /// Every control polygon running in that direction gets the same
    /// insertion, so the surface shape is unchanged. Errors are those of
    /// [`crate::Curve::knot_inserted`].
    pub fn knot_inserted(&self, direction: Direction, u: f64, multiplicity: usize) -> Result<Self> {
        let knots = self.knots_along(direction);
        if multiplicity == 0 {
            return Err(NurbsError::InvalidMultiplicity {
                knot: u,
                multiplicity,
                max: knots.degree() + 1,
            });
        }
        let values = prepare_insertions(knots, &vec![u; multiplicity])?;
        Ok(self.transformed(direction, |k, polygon| insert_knots(k, polygon, &values)))
    }

    /// Insert a knot in place; unchanged on error.
    pub fn insert_knot(&mut self, direction: Direction, u: f64, multiplicity: usize) -> Result<()> {
        let before = self.size();
        *self = self.knot_inserted(direction, u, multiplicity)?;
        debug!(
            "inserted knot {} x{} along {:?}: {:?} -> {:?} control grid",
            u,
            multiplicity,
            direction,
            before,
            self.size()
        );
        Ok(())
    }

    /// A copy with all of `new_knots` inserted along `direction` in one pass.
    pub fn refined(&self, direction: Direction, new_knots: &[f64]) -> Result<Self> {
        let values = prepare_insertions(self.knots_along(direction), new_knots)?;
        if values.is_empty() {
            return Ok(self.clone());
        }
        Ok(self.transformed(direction, |k, polygon| refine_knots(k, polygon, &values)))
    }

    /// Refine in place; unchanged on error.
    pub fn refine(&mut self, direction: Direction, new_knots: &[f64]) -> Result<()> {
        let before = self.size();
        *self = self.refined(direction, new_knots)?;
        debug!(
            "refined with {} knots along {:?}: {:?} -> {:?} control grid",
            new_knots.len(),
            direction,
            before,
            self.size()
        );
        Ok(())
    }

    /// Apply `kernel` to every homogeneous polygon running along `direction`.
    fn transformed<F>(&self, direction: Direction, kernel: F) -> Self
    where
        F: Fn(&KnotVector, &[Homogeneous<P>]) -> (KnotVector, Polygon<P>),
    {
        let grid = self.weighted_control_points();
        let old = self.knots_along(direction);
        let mut knots = old.clone();

        let grid: Vec<Polygon<P>> = match direction {
            Direction::V => grid
                .iter()
                .map(|row| {
                    let (k, row) = kernel(old, row);
                    knots = k;
                    row
                })
                .collect(),
            Direction::U => {
                let (_, size_v) = self.size();
                let columns: Vec<Polygon<P>> = (0..size_v)
                    .map(|j| {
                        let column: Polygon<P> = grid.iter().map(|row| row[j]).collect();
                        let (k, column) = kernel(old, &column);
                        knots = k;
                        column
                    })
                    .collect();
                transpose(&columns)
            }
        };

        let (knots_u, knots_v) = match direction {
            Direction::U => (knots, self.knots_v.clone()),
            Direction::V => (self.knots_u.clone(), knots),
        };

        if self.is_rational() {
            let weights = grid
                .iter()
                .map(|row| row.iter().map(|h| h.weight).collect())
                .collect();
            let points = grid
                .iter()
                .map(|row| row.iter().map(|h| h.point / h.weight).collect())
                .collect();
            Surface::from_parts(knots_u, knots_v, points, Some(weights))
        } else {
            let points = grid
                .iter()
                .map(|row| row.iter().map(|h| h.point).collect())
                .collect();
            Surface::from_parts(knots_u, knots_v, points, None)
        }
    }
}

fn transpose<T: Copy>(columns: &[Vec<T>]) -> Vec<Vec<T>> {
    let rows = columns.first().map_or(0, Vec::len);
    (0..rows)
        .map(|i| columns.iter().map(|column| column[i]).collect())
        .collect()
}
