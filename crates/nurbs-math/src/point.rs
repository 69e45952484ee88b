//! Control point abstraction over 2D and 3D vectors.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use glam::{DVec2, DVec3};

/// A point (or vector) that curves and surfaces can be built from.
///
/// Evaluation only needs the vector-space operations plus a few component-wise
/// helpers, so both `DVec2` and `DVec3` qualify.
pub trait ControlPoint:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + AddAssign
    + SubAssign
{
    const ZERO: Self;
    const DIM: usize;

    fn length(self) -> f64;

    fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Component-wise minimum.
    fn min_by_component(self, other: Self) -> Self;

    /// Component-wise maximum.
    fn max_by_component(self, other: Self) -> Self;

    /// `true` if every component of `self` is `<=` the matching one of `other`.
    fn all_le(self, other: Self) -> bool;

    fn splat(v: f64) -> Self;

    fn is_finite(self) -> bool;
}

impl ControlPoint for DVec2 {
    const ZERO: Self = DVec2::ZERO;
    const DIM: usize = 2;

    fn length(self) -> f64 {
        DVec2::length(self)
    }

    fn min_by_component(self, other: Self) -> Self {
        self.min(other)
    }

    fn max_by_component(self, other: Self) -> Self {
        self.max(other)
    }

    fn all_le(self, other: Self) -> bool {
        self.cmple(other).all()
    }

    fn splat(v: f64) -> Self {
        DVec2::splat(v)
    }

    fn is_finite(self) -> bool {
        DVec2::is_finite(self)
    }
}

impl ControlPoint for DVec3 {
    const ZERO: Self = DVec3::ZERO;
    const DIM: usize = 3;

    fn length(self) -> f64 {
        DVec3::length(self)
    }

    fn min_by_component(self, other: Self) -> Self {
        self.min(other)
    }

    fn max_by_component(self, other: Self) -> Self {
        self.max(other)
    }

    fn all_le(self, other: Self) -> bool {
        self.cmple(other).all()
    }

    fn splat(v: f64) -> Self {
        DVec3::splat(v)
    }

    fn is_finite(self) -> bool {
        DVec3::is_finite(self)
    }
}
