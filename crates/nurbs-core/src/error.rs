use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NurbsError {
    #[error("Invalid knot vector: {0}")]
    InvalidKnotVector(String),

    #[error("Invalid control data: {0}")]
    InvalidControlData(String),

    #[error("Parameter {parameter} outside domain [{min}, {max}]")]
    ParameterOutOfRange { parameter: f64, min: f64, max: f64 },

    #[error("Degenerate weight sum {sum} (must be positive)")]
    DegenerateWeight { sum: f64 },

    #[error("Knot {knot} would reach multiplicity {multiplicity} (max {max})")]
    InvalidMultiplicity {
        knot: f64,
        multiplicity: usize,
        max: usize,
    },

    #[error("Curve tangent undefined at {parameter}")]
    DegenerateTangent { parameter: f64 },

    #[error("Surface normal undefined at ({u}, {v})")]
    DegenerateNormal { u: f64, v: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl NurbsError {
    /// Build a `ParameterOutOfRange` error for `parameter` and domain `(min, max)`.
    pub fn out_of_range(parameter: f64, (min, max): (f64, f64)) -> Self {
        Self::ParameterOutOfRange {
            parameter,
            min,
            max,
        }
    }
}

pub type Result<T> = std::result::Result<T, NurbsError>;
