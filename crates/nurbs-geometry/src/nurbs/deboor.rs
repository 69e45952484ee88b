//! De Boor evaluation kernels for B-spline and NURBS curves and surfaces.
//!
//! Every kernel sums in homogeneous space: a non-rational control point is
//! lifted with weight 1, so the weight sum is just the partition of unity
//! and projection is skipped. Rational data is projected afterwards by
//! [`project`] or the rational derivative rules.

use nurbs_core::error::{NurbsError, Result};
use nurbs_math::{binomial, ControlPoint, Homogeneous};

#[inline]
fn lift<P: ControlPoint>(point: P, weight: Option<f64>) -> Homogeneous<P> {
    match weight {
        Some(w) => Homogeneous::from_cartesian(point, w),
        None => Homogeneous::new(point, 1.0),
    }
}

/// Homogeneous curve point `Σ N_i · (w_i P_i, w_i)` over the `degree + 1`
/// control points contributing on `span`.
pub fn curve_point<P: ControlPoint>(
    span: usize,
    degree: usize,
    basis: &[f64],
    control_points: &[P],
    weights: Option<&[f64]>,
) -> Homogeneous<P> {
    let mut point = Homogeneous::ZERO;
    for (i, &n) in basis.iter().enumerate().take(degree + 1) {
        let idx = span - degree + i;
        point += lift(control_points[idx], weights.map(|w| w[idx])) * n;
    }
    point
}

/// Homogeneous curve derivatives, one entry per row of `ders`.
pub fn curve_derivatives<P: ControlPoint>(
    span: usize,
    degree: usize,
    ders: &[Vec<f64>],
    control_points: &[P],
    weights: Option<&[f64]>,
) -> Vec<Homogeneous<P>> {
    ders.iter()
        .map(|row| curve_point(span, degree, row, control_points, weights))
        .collect()
}

/// Homogeneous surface point over the `(degree_u + 1) × (degree_v + 1)`
/// neighbourhood of `(span_u, span_v)`.
#[allow(clippy::too_many_arguments)]
pub fn surface_point<P: ControlPoint>(
    span_u: usize,
    degree_u: usize,
    basis_u: &[f64],
    span_v: usize,
    degree_v: usize,
    basis_v: &[f64],
    control_points: &[Vec<P>],
    weights: Option<&[Vec<f64>]>,
) -> Homogeneous<P> {
    let mut point = Homogeneous::ZERO;
    for (j, &nv) in basis_v.iter().enumerate().take(degree_v + 1) {
        let v_idx = span_v - degree_v + j;
        let mut temp = Homogeneous::ZERO;
        for (i, &nu) in basis_u.iter().enumerate().take(degree_u + 1) {
            let u_idx = span_u - degree_u + i;
            let w = weights.map(|w| w[u_idx][v_idx]);
            temp += lift(control_points[u_idx][v_idx], w) * nu;
        }
        point += temp * nv;
    }
    point
}

/// Homogeneous partial derivatives `A[k][l] = ∂^{k+l} / ∂u^k ∂v^l` for every
/// row `k` of `ders_u` and row `l` of `ders_v`.
#[allow(clippy::too_many_arguments)]
pub fn surface_derivatives<P: ControlPoint>(
    span_u: usize,
    degree_u: usize,
    ders_u: &[Vec<f64>],
    span_v: usize,
    degree_v: usize,
    ders_v: &[Vec<f64>],
    control_points: &[Vec<P>],
    weights: Option<&[Vec<f64>]>,
) -> Vec<Vec<Homogeneous<P>>> {
    ders_u
        .iter()
        .map(|row_u| {
            // Collapse the u direction first, leaving one point per v column.
            let temp: Vec<Homogeneous<P>> = (0..=degree_v)
                .map(|s| {
                    let v_idx = span_v - degree_v + s;
                    let mut acc = Homogeneous::ZERO;
                    for (r, &nu) in row_u.iter().enumerate().take(degree_u + 1) {
                        let u_idx = span_u - degree_u + r;
                        let w = weights.map(|w| w[u_idx][v_idx]);
                        acc += lift(control_points[u_idx][v_idx], w) * nu;
                    }
                    acc
                })
                .collect();

            ders_v
                .iter()
                .map(|row_v| {
                    let mut acc = Homogeneous::ZERO;
                    for (s, &nv) in row_v.iter().enumerate().take(degree_v + 1) {
                        acc += temp[s] * nv;
                    }
                    acc
                })
                .collect()
        })
        .collect()
}

/// Project a homogeneous point back to Cartesian space.
///
/// Non-rational sums are returned as is. Rational sums are divided by their
/// weight, which must be positive.
pub fn project<P: ControlPoint>(point: Homogeneous<P>, rational: bool) -> Result<P> {
    if !rational {
        return Ok(point.point);
    }
    if point.weight <= 0.0 {
        return Err(NurbsError::DegenerateWeight { sum: point.weight });
    }
    Ok(point.point / point.weight)
}

/// Cartesian derivatives of a rational curve from its homogeneous ones:
/// `C^(k) = (A^(k) - Σ_{i=1..k} C(k,i) w^(i) C^(k-i)) / w`.
#[allow(clippy::needless_range_loop)]
pub fn rational_curve_derivatives<P: ControlPoint>(ders: &[Homogeneous<P>]) -> Result<Vec<P>> {
    let w0 = ders[0].weight;
    if w0 <= 0.0 {
        return Err(NurbsError::DegenerateWeight { sum: w0 });
    }

    let mut ck: Vec<P> = Vec::with_capacity(ders.len());
    for k in 0..ders.len() {
        let mut v = ders[k].point;
        for i in 1..=k {
            v -= ck[k - i] * (binomial(k, i) * ders[i].weight);
        }
        ck.push(v / w0);
    }

    Ok(ck)
}

/// Cartesian partial derivatives of a rational surface from its homogeneous
/// ones, including the mixed cross terms:
///
/// `S[k][l] = (A[k][l] - Σ_j C(l,j) w[0][j] S[k][l-j]
///            - Σ_i C(k,i) (w[i][0] S[k-i][l] + Σ_j C(l,j) w[i][j] S[k-i][l-j])) / w[0][0]`
#[allow(clippy::needless_range_loop)]
pub fn rational_surface_derivatives<P: ControlPoint>(
    ders: &[Vec<Homogeneous<P>>],
) -> Result<Vec<Vec<P>>> {
    let w00 = ders[0][0].weight;
    if w00 <= 0.0 {
        return Err(NurbsError::DegenerateWeight { sum: w00 });
    }

    let order_u = ders.len() - 1;
    let order_v = ders[0].len() - 1;
    let mut skl = vec![vec![P::ZERO; order_v + 1]; order_u + 1];

    for k in 0..=order_u {
        for l in 0..=order_v {
            let mut v = ders[k][l].point;

            for j in 1..=l {
                v -= skl[k][l - j] * (binomial(l, j) * ders[0][j].weight);
            }

            for i in 1..=k {
                v -= skl[k - i][l] * (binomial(k, i) * ders[i][0].weight);
                let mut v2 = P::ZERO;
                for j in 1..=l {
                    v2 += skl[k - i][l - j] * (binomial(l, j) * ders[i][j].weight);
                }
                v -= v2 * binomial(k, i);
            }

            skl[k][l] = v / w00;
        }
    }

    Ok(skl)
}
