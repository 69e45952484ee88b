//! Consistency checks for control points and weights.

use nurbs_core::error::{NurbsError, Result};
use nurbs_math::ControlPoint;

/// Check that `points` can carry a basis of `degree` and are all finite.
pub(crate) fn check_points<P: ControlPoint>(points: &[P], degree: usize, what: &str) -> Result<()> {
    if points.len() < degree + 1 {
        return Err(NurbsError::InvalidControlData(format!(
            "{}: degree {} needs at least {} control points, got {}",
            what,
            degree,
            degree + 1,
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(NurbsError::InvalidControlData(format!(
            "{}: control point {} is not finite: {:?}",
            what, i, points[i]
        )));
    }
    Ok(())
}

/// Check that there is one positive, finite weight per control point.
pub(crate) fn check_weights(weights: &[f64], expected: usize, what: &str) -> Result<()> {
    if weights.len() != expected {
        return Err(NurbsError::InvalidControlData(format!(
            "{}: expected {} weights, got {}",
            what,
            expected,
            weights.len()
        )));
    }
    if let Some(i) = weights.iter().position(|&w| !(w.is_finite() && w > 0.0)) {
        return Err(NurbsError::InvalidControlData(format!(
            "{}: weight {} must be positive and finite, got {}",
            what, i, weights[i]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nurbs_math::DVec2;

    #[test]
    fn test_check_points() {
        let pts = vec![DVec2::ZERO, DVec2::X, DVec2::Y];
        assert!(check_points(&pts, 2, "curve").is_ok());
        assert!(matches!(
            check_points(&pts, 3, "curve"),
            Err(NurbsError::InvalidControlData(_))
        ));
        assert!(check_points(&[DVec2::ZERO, DVec2::new(f64::INFINITY, 0.0)], 1, "curve").is_err());
    }

    #[test]
    fn test_check_weights() {
        assert!(check_weights(&[1.0, 0.5, 2.0], 3, "curve").is_ok());
        assert!(check_weights(&[1.0, 0.5], 3, "curve").is_err());
        assert!(check_weights(&[1.0, 0.0, 2.0], 3, "curve").is_err());
        assert!(check_weights(&[1.0, -1.0, 2.0], 3, "curve").is_err());
        assert!(check_weights(&[1.0, f64::NAN, 2.0], 3, "curve").is_err());
    }
}
