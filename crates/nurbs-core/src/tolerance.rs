/// Tolerances used when comparing knots and evaluated geometry.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Parametric tolerance for knot comparisons (in parameter units)
    pub parametric: f64,
    /// Linear tolerance for distance comparisons (in model units)
    pub linear: f64,
}

impl Tolerance {
    pub const DEFAULT_PARAMETRIC: f64 = 1e-10;
    pub const DEFAULT_LINEAR: f64 = 1e-7;

    pub fn default_precision() -> Self {
        Self {
            parametric: Self::DEFAULT_PARAMETRIC,
            linear: Self::DEFAULT_LINEAR,
        }
    }

    /// Check if two knot values coincide within parametric tolerance
    pub fn knot_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.parametric
    }

    /// Check if a length is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
