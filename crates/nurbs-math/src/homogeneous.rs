//! Homogeneous (weighted) control points.

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::point::ControlPoint;

/// A control point lifted into homogeneous space as `(w * P, w)`.
///
/// Rational evaluation and knot insertion operate on these so that points and
/// weights are always blended together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homogeneous<P> {
    /// The weighted point `w * P`.
    pub point: P,
    pub weight: f64,
}

impl<P: ControlPoint> Homogeneous<P> {
    pub const ZERO: Self = Self {
        point: P::ZERO,
        weight: 0.0,
    };

    pub fn new(point: P, weight: f64) -> Self {
        Self { point, weight }
    }

    /// Lift a Cartesian point with weight `weight`.
    pub fn from_cartesian(point: P, weight: f64) -> Self {
        Self {
            point: point * weight,
            weight,
        }
    }

    /// Project back to Cartesian space. Returns `None` for a zero weight.
    pub fn to_cartesian(self) -> Option<P> {
        if self.weight == 0.0 {
            None
        } else {
            Some(self.point / self.weight)
        }
    }

    /// Affine blend `(1 - t) * self + t * other`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl<P: ControlPoint> Add for Homogeneous<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            point: self.point + rhs.point,
            weight: self.weight + rhs.weight,
        }
    }
}

impl<P: ControlPoint> AddAssign for Homogeneous<P> {
    fn add_assign(&mut self, rhs: Self) {
        self.point += rhs.point;
        self.weight += rhs.weight;
    }
}

impl<P: ControlPoint> Sub for Homogeneous<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            point: self.point - rhs.point,
            weight: self.weight - rhs.weight,
        }
    }
}

impl<P: ControlPoint> Mul<f64> for Homogeneous<P> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            point: self.point * rhs,
            weight: self.weight * rhs,
        }
    }
}
