//! Knot vector utilities for B-spline/NURBS evaluation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use nurbs_core::error::{NurbsError, Result};
use nurbs_core::traits::Validate;
use nurbs_core::Tolerance;
use serde::{Deserialize, Serialize};

/// Check that `knots` is a clamped knot vector for `num_control_points`
/// control points of the given `degree`.
///
/// The vector must be finite and non-decreasing, its first and last values
/// must each repeat exactly `degree + 1` times, no interior value may repeat
/// more than `degree + 1` times, and `knots.len()` must equal
/// `num_control_points + degree + 1`.
pub fn validate(knots: &[f64], degree: usize, num_control_points: usize) -> Result<()> {
    let expected = num_control_points + degree + 1;
    if knots.len() != expected {
        return Err(NurbsError::InvalidKnotVector(format!(
            "expected {} knots for {} control points of degree {}, got {}",
            expected,
            num_control_points,
            degree,
            knots.len()
        )));
    }

    if let Some(i) = knots.iter().position(|k| !k.is_finite()) {
        return Err(NurbsError::InvalidKnotVector(format!(
            "knot {} is not finite: {}",
            i, knots[i]
        )));
    }

    if let Some(i) = knots.windows(2).position(|w| w[1] < w[0]) {
        return Err(NurbsError::InvalidKnotVector(format!(
            "knots decrease at index {}: {} > {}",
            i + 1,
            knots[i],
            knots[i + 1]
        )));
    }

    let first = knots[0];
    let last = knots[knots.len() - 1];
    if first >= last {
        return Err(NurbsError::InvalidKnotVector(format!(
            "empty parameter domain [{}, {}]",
            first, last
        )));
    }

    let start = knots.iter().take_while(|&&k| k == first).count();
    let end = knots.iter().rev().take_while(|&&k| k == last).count();
    if start != degree + 1 || end != degree + 1 {
        return Err(NurbsError::InvalidKnotVector(format!(
            "not clamped: end multiplicities are {} and {}, expected {}",
            start,
            end,
            degree + 1
        )));
    }

    let mut i = start;
    while i < knots.len() - end {
        let value = knots[i];
        let run = knots[i..].iter().take_while(|&&k| k == value).count();
        if run > degree + 1 {
            return Err(NurbsError::InvalidKnotVector(format!(
                "interior knot {} has multiplicity {}, max is {}",
                value,
                run,
                degree + 1
            )));
        }
        i += run;
    }

    Ok(())
}

/// A validated, clamped knot vector together with its degree.
///
/// Deserialization runs the same checks as [`KnotVector::new`], with the
/// control point count implied by the length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKnotVector")]
pub struct KnotVector {
    knots: Vec<f64>,
    degree: usize,
}

#[derive(Deserialize)]
struct RawKnotVector {
    knots: Vec<f64>,
    degree: usize,
}

impl TryFrom<RawKnotVector> for KnotVector {
    type Error = NurbsError;

    fn try_from(raw: RawKnotVector) -> Result<Self> {
        let count = implied_control_points(&raw.knots, raw.degree)?;
        Self::new(raw.knots, raw.degree, count)
    }
}

fn implied_control_points(knots: &[f64], degree: usize) -> Result<usize> {
    knots.len().checked_sub(degree + 1).ok_or_else(|| {
        NurbsError::InvalidKnotVector(format!(
            "{} knots cannot carry degree {}",
            knots.len(),
            degree
        ))
    })
}

impl KnotVector {
    pub fn new(knots: Vec<f64>, degree: usize, num_control_points: usize) -> Result<Self> {
        validate(&knots, degree, num_control_points)?;
        Ok(Self { knots, degree })
    }

    /// Wrap knots produced by a shape-preserving operation.
    pub(crate) fn from_refined(knots: Vec<f64>, degree: usize) -> Self {
        debug_assert!(
            validate(&knots, degree, knots.len() - degree - 1).is_ok(),
            "refinement produced an invalid knot vector: {:?}",
            knots
        );
        Self { knots, degree }
    }

    /// Clamped knot vector with uniformly spaced interior knots over `[0, 1]`.
    pub fn clamped_uniform(degree: usize, num_control_points: usize) -> Result<Self> {
        if num_control_points < degree + 1 {
            return Err(NurbsError::InvalidKnotVector(format!(
                "degree {} needs at least {} control points, got {}",
                degree,
                degree + 1,
                num_control_points
            )));
        }

        let interior = num_control_points - degree - 1;
        let mut knots = Vec::with_capacity(num_control_points + degree + 1);
        knots.extend(std::iter::repeat(0.0).take(degree + 1));
        knots.extend((1..=interior).map(|i| i as f64 / (interior + 1) as f64));
        knots.extend(std::iter::repeat(1.0).take(degree + 1));

        Self::new(knots, degree, num_control_points)
    }

    pub(crate) fn into_knots(self) -> Vec<f64> {
        self.knots
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Number of control points this knot vector supports (`n + 1`).
    pub fn num_control_points(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    /// Parameter domain `(u_first, u_last)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    pub fn contains(&self, u: f64) -> bool {
        let (min, max) = self.domain();
        u >= min && u <= max
    }

    /// Fail with `ParameterOutOfRange` unless `u` lies in the domain.
    pub fn check_parameter(&self, u: f64) -> Result<()> {
        if self.contains(u) {
            Ok(())
        } else {
            Err(NurbsError::out_of_range(u, self.domain()))
        }
    }

    /// Find the knot span index for parameter `u`.
    ///
    /// Returns the index `i` such that `knots[i] <= u < knots[i+1]`. The upper
    /// domain boundary maps to the last non-degenerate span `n`, which exists
    /// because the last knot repeats exactly `degree + 1` times. Zero-length
    /// spans can never satisfy the loop condition, so the search skips them.
    ///
    /// `u` is expected to lie in the domain; values outside are clamped to
    /// the first or last span.
    pub fn find_span(&self, u: f64) -> usize {
        let knots = &self.knots;
        let degree = self.degree;
        let n = self.num_control_points() - 1;

        // Special case: u at upper boundary
        if u >= knots[n + 1] {
            return n;
        }
        if u <= knots[degree] {
            return degree;
        }

        // Binary search keeping knots[low] <= u < knots[high]
        let mut low = degree;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;

        while u < knots[mid] || u >= knots[mid + 1] {
            if u < knots[mid] {
                high = mid;
            } else {
                low = mid;
            }
            mid = (low + high) / 2;
        }

        mid
    }

    /// Number of knots equal to `u` within parametric tolerance.
    pub fn multiplicity(&self, u: f64) -> usize {
        let tol = Tolerance::default();
        self.knots.iter().filter(|&&k| tol.knot_eq(k, u)).count()
    }

    /// Return the existing knot within parametric tolerance of `u`, or `u`.
    pub fn snap(&self, u: f64) -> f64 {
        let tol = Tolerance::default();
        self.knots
            .iter()
            .copied()
            .find(|&k| tol.knot_eq(k, u))
            .unwrap_or(u)
    }

    /// Distinct breakpoints with their multiplicities, in increasing order.
    pub fn distinct(&self) -> Vec<(f64, usize)> {
        let mut out: Vec<(f64, usize)> = Vec::new();
        for &k in &self.knots {
            match out.last_mut() {
                Some((value, count)) if *value == k => *count += 1,
                _ => out.push((k, 1)),
            }
        }
        out
    }

    /// The same knot vector rescaled to the domain `[0, 1]`.
    pub fn normalized(&self) -> Self {
        let (min, max) = self.domain();
        let scale = max - min;
        let knots = self.knots.iter().map(|&k| (k - min) / scale).collect();
        Self {
            knots,
            degree: self.degree,
        }
    }

    /// Content hash identifying this knot vector, used as a cache key.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.degree.hash(&mut hasher);
        for k in &self.knots {
            k.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// A copy with `u` inserted after span `span`.
    pub(crate) fn with_knot_at(&self, span: usize, u: f64) -> Self {
        let mut knots = Vec::with_capacity(self.knots.len() + 1);
        knots.extend_from_slice(&self.knots[..=span]);
        knots.push(u);
        knots.extend_from_slice(&self.knots[span + 1..]);
        Self {
            knots,
            degree: self.degree,
        }
    }
}

impl Validate for KnotVector {
    fn validate(&self) -> Result<()> {
        let count = implied_control_points(&self.knots, self.degree)?;
        validate(&self.knots, self.degree, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic_five() -> KnotVector {
        KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0], 2, 5).unwrap()
    }

    #[test]
    fn test_find_span_on_uneven_spans() {
        let kv = KnotVector::new(vec![0.0, 0.0, 0.0, 0.3, 0.3, 0.8, 1.0, 1.0, 1.0], 2, 6).unwrap();
        let cases = [(0.0, 2), (0.29, 2), (0.3, 4), (0.55, 4), (0.8, 5), (0.99, 5), (1.0, 5)];
        for (u, span) in cases {
            assert_eq!(kv.find_span(u), span, "u={}", u);
        }
        assert_eq!(quadratic_five().find_span(3.0), 4);
    }

    #[test]
    fn test_find_span_skips_repeated_knots() {
        let kv = KnotVector::new(
            vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0],
            3,
            7,
        )
        .unwrap();
        assert_eq!(kv.find_span(0.25), 3);
        // Repeated knot: half-open spans put 0.5 on the right-hand side.
        assert_eq!(kv.find_span(0.5), 6);
        assert_eq!(kv.find_span(0.75), 6);
        assert_eq!(kv.find_span(1.0), 6);
    }

    #[test]
    fn test_find_span_full_interior_multiplicity() {
        let kv = KnotVector::new(vec![0.0, 0.0, 0.5, 0.5, 1.0, 1.0], 1, 4).unwrap();
        assert_eq!(kv.find_span(0.49), 1);
        assert_eq!(kv.find_span(0.5), 3);
        assert_eq!(kv.find_span(1.0), 3);
    }

    #[test]
    fn test_validate_rejects_bad_vectors() {
        // Wrong length
        assert!(matches!(
            validate(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2, 4),
            Err(NurbsError::InvalidKnotVector(_))
        ));
        // Decreasing
        assert!(validate(&[0.0, 0.0, 0.0, 0.7, 0.3, 1.0, 1.0, 1.0], 2, 5).is_err());
        // Not clamped at the start
        assert!(validate(&[0.0, 0.0, 0.2, 0.5, 1.0, 1.0, 1.0], 2, 4).is_err());
        // End multiplicity too high
        assert!(validate(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2, 4).is_err());
        // Interior multiplicity above degree + 1
        assert!(validate(&[0.0, 0.0, 0.5, 0.5, 0.5, 1.0, 1.0], 1, 5).is_err());
        // Empty domain
        assert!(validate(&[1.0, 1.0, 1.0, 1.0], 1, 2).is_err());
        // Non-finite
        assert!(validate(&[0.0, 0.0, f64::NAN, 1.0, 1.0], 1, 3).is_err());
    }

    #[test]
    fn test_validate_accepts_clamped() {
        validate(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2, 3).unwrap();
        validate(&[-2.0, -2.0, 0.0, 3.5, 3.5], 1, 3).unwrap();
        validate(&[0.0, 1.0], 0, 1).unwrap();
    }

    #[test]
    fn test_clamped_uniform() {
        let kv = KnotVector::clamped_uniform(3, 7).unwrap();
        assert_eq!(
            kv.knots(),
            &[0.0, 0.0, 0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0]
        );
        assert_eq!(kv.num_control_points(), 7);
        assert!(KnotVector::clamped_uniform(3, 3).is_err());
    }

    #[test]
    fn test_domain_and_check_parameter() {
        let kv = quadratic_five();
        assert_eq!(kv.domain(), (0.0, 3.0));
        assert!(kv.check_parameter(3.0).is_ok());
        assert_eq!(
            kv.check_parameter(3.5),
            Err(NurbsError::ParameterOutOfRange {
                parameter: 3.5,
                min: 0.0,
                max: 3.0
            })
        );
        assert!(kv.check_parameter(f64::NAN).is_err());
    }

    #[test]
    fn test_multiplicity_and_distinct() {
        let kv = KnotVector::new(vec![0.0, 0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 1.0], 2, 5).unwrap();
        assert_eq!(kv.multiplicity(0.0), 3);
        assert_eq!(kv.multiplicity(0.5), 2);
        assert_eq!(kv.multiplicity(0.5 + 1e-13), 2);
        assert_eq!(kv.multiplicity(0.25), 0);
        assert_eq!(kv.distinct(), vec![(0.0, 3), (0.5, 2), (1.0, 3)]);
        assert_eq!(kv.snap(0.5 - 1e-12), 0.5);
        assert_eq!(kv.snap(0.3), 0.3);
    }

    #[test]
    fn test_normalized() {
        let kv = quadratic_five().normalized();
        assert_eq!(kv.domain(), (0.0, 1.0));
        assert!((kv.knots()[3] - 1.0 / 3.0).abs() < 1e-15);
        kv.validate().unwrap();
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = quadratic_five();
        let b = quadratic_five();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), a.normalized().fingerprint());
    }

    #[test]
    fn test_deserialization_rejects_bad_vectors() {
        for json in [
            r#"{ "knots": [0.0, 1.0, 0.5], "degree": 1 }"#,
            r#"{ "knots": [0.0, 1.0], "degree": 3 }"#,
            r#"{ "knots": [0.0, 0.0, 0.5, 1.0, 1.0], "degree": 2 }"#,
        ] {
            assert!(serde_json::from_str::<KnotVector>(json).is_err(), "{}", json);
        }

        let good: KnotVector =
            serde_json::from_str(r#"{ "knots": [0.0, 0.0, 1.0, 1.0], "degree": 1 }"#).unwrap();
        assert_eq!(good.find_span(0.5), 1);
        good.validate().unwrap();
    }
}
