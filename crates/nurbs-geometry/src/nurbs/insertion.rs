//! Shape-preserving knot insertion and refinement on homogeneous control
//! points.
//!
//! Kernels here take already-checked input; [`prepare_insertions`] is the
//! gate that enforces domain and multiplicity limits.

use nurbs_core::error::{NurbsError, Result};
use nurbs_core::Tolerance;
use nurbs_math::{ControlPoint, Homogeneous};

use super::basis::ratio;
use super::knot::KnotVector;

/// Check a non-decreasing batch of knots for insertion into `knots` and snap
/// values within parametric tolerance of an existing knot (or of the
/// previous batch value) onto it.
///
/// Fails with `InvalidKnotVector` for an unsorted or non-finite batch,
/// `ParameterOutOfRange` for values outside the domain and
/// `InvalidMultiplicity` when any knot would end up repeated more than
/// `degree + 1` times.
pub fn prepare_insertions(knots: &KnotVector, values: &[f64]) -> Result<Vec<f64>> {
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(NurbsError::InvalidKnotVector(format!(
            "knot to insert at position {} is not finite: {}",
            i, values[i]
        )));
    }
    if let Some(i) = values.windows(2).position(|w| w[1] < w[0]) {
        return Err(NurbsError::InvalidKnotVector(format!(
            "knots to insert must be non-decreasing: {} > {} at position {}",
            values[i],
            values[i + 1],
            i + 1
        )));
    }

    let tol = Tolerance::default();
    let max = knots.degree() + 1;
    let mut prepared: Vec<f64> = Vec::with_capacity(values.len());

    for &value in values {
        knots.check_parameter(value)?;
        let snapped = match prepared.last() {
            Some(&prev) if tol.knot_eq(prev, value) => prev,
            _ => knots.snap(value),
        };
        prepared.push(snapped);
    }

    let mut i = 0;
    while i < prepared.len() {
        let value = prepared[i];
        let added = prepared[i..].iter().take_while(|&&v| v == value).count();
        let multiplicity = knots.multiplicity(value) + added;
        if multiplicity > max {
            return Err(NurbsError::InvalidMultiplicity {
                knot: value,
                multiplicity,
                max,
            });
        }
        i += added;
    }

    Ok(prepared)
}

/// Insert `u` once (Boehm's algorithm).
///
/// With `k` the span of `u`, the new points are
/// `Q_i = (1 - a_i) P_{i-1} + a_i P_i` for `k - p < i <= k`, where
/// `a_i = (u - u_i) / (u_{i+p} - u_i)`; points before and after the window are
/// copied over.
pub fn insert_knot_once<P: ControlPoint>(
    knots: &KnotVector,
    points: &[Homogeneous<P>],
    u: f64,
) -> (KnotVector, Vec<Homogeneous<P>>) {
    let p = knots.degree();
    let k = knots.find_span(u);
    let uk = knots.knots();

    let mut out = Vec::with_capacity(points.len() + 1);
    out.extend_from_slice(&points[..=k - p]);
    for i in (k - p + 1)..=k {
        let alpha = ratio(u - uk[i], uk[i + p] - uk[i]);
        out.push(points[i - 1].lerp(points[i], alpha));
    }
    out.extend_from_slice(&points[k..]);

    (knots.with_knot_at(k, u), out)
}

/// Insert each of `values` in turn with [`insert_knot_once`].
pub fn insert_knots<P: ControlPoint>(
    knots: &KnotVector,
    points: &[Homogeneous<P>],
    values: &[f64],
) -> (KnotVector, Vec<Homogeneous<P>>) {
    let mut knots = knots.clone();
    let mut points = points.to_vec();
    for &u in values {
        let (k, p) = insert_knot_once(&knots, &points, u);
        knots = k;
        points = p;
    }
    (knots, points)
}

/// Insert all of `new_knots` (non-decreasing, non-empty) in one pass
/// (Piegl & Tiller A5.4).
pub fn refine_knots<P: ControlPoint>(
    knots: &KnotVector,
    points: &[Homogeneous<P>],
    new_knots: &[f64],
) -> (KnotVector, Vec<Homogeneous<P>>) {
    let p = knots.degree();
    let uk = knots.knots();
    let x = new_knots;
    let n = points.len() - 1;
    let m = n + p + 1;
    let r = x.len() - 1;

    let a = knots.find_span(x[0]);
    let b = knots.find_span(x[r]) + 1;

    let mut q = vec![Homogeneous::ZERO; n + r + 2];
    let mut ubar = vec![0.0; m + r + 2];

    // Unaffected points and knots on both sides
    q[..=a - p].copy_from_slice(&points[..=a - p]);
    for j in (b - 1)..=n {
        q[j + r + 1] = points[j];
    }
    ubar[..=a].copy_from_slice(&uk[..=a]);
    for j in (b + p)..=m {
        ubar[j + r + 1] = uk[j];
    }

    let mut i = b + p - 1;
    let mut k = b + p + r;

    for j in (0..=r).rev() {
        while x[j] <= uk[i] && i > a {
            q[k - p - 1] = points[i - p - 1];
            ubar[k] = uk[i];
            k -= 1;
            i -= 1;
        }

        q[k - p - 1] = q[k - p];
        for l in 1..=p {
            let ind = k - p + l;
            let alpha = ubar[k + l] - x[j];
            if alpha == 0.0 {
                q[ind - 1] = q[ind];
            } else {
                let alpha = ratio(alpha, ubar[k + l] - uk[i - p + l]);
                q[ind - 1] = q[ind - 1] * alpha + q[ind] * (1.0 - alpha);
            }
        }

        ubar[k] = x[j];
        k -= 1;
    }

    (KnotVector::from_refined(ubar, p), q)
}
