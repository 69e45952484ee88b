use serde::{Deserialize, Serialize};

use crate::point::ControlPoint;
use crate::{DVec2, DVec3};

/// Axis-Aligned Bounding Box over 2D or 3D points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb<P> {
    pub min: P,
    pub max: P,
}

pub type Aabb2 = Aabb<DVec2>;
pub type Aabb3 = Aabb<DVec3>;

impl<P: ControlPoint> Aabb<P> {
    pub fn new(min: P, max: P) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[P]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut min = first;
        let mut max = first;
        for &p in rest {
            min = min.min_by_component(p);
            max = max.max_by_component(p);
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> P {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> P {
        self.max - self.min
    }

    pub fn contains_point(&self, p: P) -> bool {
        self.min.all_le(p) && p.all_le(self.max)
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min_by_component(other.min),
            max: self.max.max_by_component(other.max),
        }
    }

    pub fn expand(&self, amount: f64) -> Self {
        let offset = P::splat(amount);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }
}
