//! Cox–de Boor basis functions and their derivatives.
//!
//! Both routines fill the triangular table bottom-up, one degree at a time,
//! instead of recursing over the degree. A ratio whose denominator is a
//! zero-length knot interval is taken as zero.

#[inline]
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Compute the non-vanishing basis functions at parameter `u`.
///
/// Returns a vector of `degree + 1` basis function values
/// N_{span-degree,degree}(u) through N_{span,degree}(u).
///
/// # Arguments
/// * `span` - The knot span index (from `KnotVector::find_span`)
/// * `u` - Parameter value
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
pub fn basis_functions(span: usize, u: f64, degree: usize, knots: &[f64]) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = ratio(n[r], right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Compute basis functions and their derivatives up to `order` at `u`.
///
/// Returns `ders[k][j]`, the k-th derivative of N_{span-degree+j,degree}(u),
/// for `k` in `0..=order`. Rows with `k > degree` are all zero.
#[allow(clippy::needless_range_loop)]
pub fn basis_function_derivatives(
    span: usize,
    u: f64,
    degree: usize,
    knots: &[f64],
    order: usize,
) -> Vec<Vec<f64>> {
    let p = degree;

    // Upper triangle holds basis values of every degree, lower triangle
    // holds the knot differences used as denominators.
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;

        for r in 0..j {
            // Lower triangle
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = ratio(ndu[r][j - 1], ndu[j][r]);

            // Upper triangle
            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut ders = vec![vec![0.0; p + 1]; order + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    // Derivatives of order above the degree vanish identically.
    let top = order.min(p);
    let mut a = vec![vec![0.0; p + 1]; 2];

    for r in 0..=p {
        let mut s1 = 0usize;
        let mut s2 = 1usize;
        a[0][0] = 1.0;

        for k in 1..=top {
            let mut d = 0.0;
            let pk = p - k;

            if r >= k {
                let rk = r - k;
                a[s2][0] = ratio(a[s1][0], ndu[pk + 1][rk]);
                d = a[s2][0] * ndu[rk][pk];
            }

            let j1 = if r + 1 >= k { 1 } else { k - r };
            let j2 = if r <= pk + 1 { k - 1 } else { p - r };

            for j in j1..=j2 {
                let rj = r + j - k;
                a[s2][j] = ratio(a[s1][j] - a[s1][j - 1], ndu[pk + 1][rj]);
                d += a[s2][j] * ndu[rj][pk];
            }

            if r <= pk {
                a[s2][k] = ratio(-a[s1][k - 1], ndu[pk + 1][r]);
                d += a[s2][k] * ndu[r][pk];
            }

            ders[k][r] = d;

            // Swap rows
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    // Multiply through by p! / (p - k)!
    let mut factor = p as f64;
    for k in 1..=top {
        for val in &mut ders[k] {
            *val *= factor;
        }
        factor *= (p - k) as f64;
    }

    ders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::knot::KnotVector;
    use approx::assert_abs_diff_eq;

    /// Cubic with a double knot at 0.4 and a short first span.
    fn cubic_double_knot() -> KnotVector {
        KnotVector::new(
            vec![0.0, 0.0, 0.0, 0.0, 0.4, 0.4, 1.0, 1.0, 1.0, 1.0],
            3,
            6,
        )
        .unwrap()
    }

    #[test]
    fn test_cubic_basis_sums_to_one_and_stays_non_negative() {
        let kv = cubic_double_knot();
        for i in 0..=25 {
            let t = i as f64 / 25.0;
            let span = kv.find_span(t);
            let basis = basis_functions(span, t, 3, kv.knots());
            assert_eq!(basis.len(), 4);
            assert_abs_diff_eq!(basis.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(basis.iter().all(|&b| b >= 0.0), "t={} gave {:?}", t, basis);
        }
    }

    #[test]
    fn test_double_knot_switches_off_rightmost_function() {
        let kv = cubic_double_knot();
        let span = kv.find_span(0.4);
        assert_eq!(span, 5);
        let basis = basis_functions(span, 0.4, 3, kv.knots());
        assert_eq!(basis[3], 0.0);
        assert_abs_diff_eq!(basis[..3].iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bernstein_values_and_derivatives() {
        // Clamped single-segment quadratic: the basis is Bernstein.
        let knots = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let u = 0.3;
        let ders = basis_function_derivatives(2, u, 2, &knots, 2);

        let expected = [
            [(1.0 - u) * (1.0 - u), 2.0 * u * (1.0 - u), u * u],
            [-2.0 * (1.0 - u), 2.0 - 4.0 * u, 2.0 * u],
            [2.0, -4.0, 2.0],
        ];
        for k in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(ders[k][j], expected[k][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_zeroth_derivative_row_matches_values() {
        let knots = [0.0, 0.0, 0.0, 0.0, 0.2, 0.45, 0.7, 1.0, 1.0, 1.0, 1.0];
        for &u in &[0.0, 0.1, 0.3, 0.6, 0.99] {
            let kv = KnotVector::new(knots.to_vec(), 3, 7).unwrap();
            let span = kv.find_span(u);
            let values = basis_functions(span, u, 3, &knots);
            let ders = basis_function_derivatives(span, u, 3, &knots, 1);
            for j in 0..=3 {
                assert_abs_diff_eq!(ders[0][j], values[j], epsilon = 1e-14);
            }
            // Derivatives of a partition of unity sum to zero.
            let sum: f64 = ders[1].iter().sum();
            assert_abs_diff_eq!(sum, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_first_derivative_matches_finite_difference() {
        let knots = [0.0, 0.0, 0.0, 0.0, 0.2, 0.45, 0.7, 1.0, 1.0, 1.0, 1.0];
        let u = 0.33;
        let h = 1e-6;
        let span = 4;
        let ders = basis_function_derivatives(span, u, 3, &knots, 2);
        let plus = basis_functions(span, u + h, 3, &knots);
        let minus = basis_functions(span, u - h, 3, &knots);
        for j in 0..=3 {
            let fd = (plus[j] - minus[j]) / (2.0 * h);
            assert_abs_diff_eq!(ders[1][j], fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_orders_above_degree_are_zero() {
        let knots = [0.0, 0.0, 0.5, 1.0, 1.0];
        let ders = basis_function_derivatives(1, 0.25, 1, &knots, 4);
        assert_eq!(ders.len(), 5);
        for row in &ders[2..] {
            assert!(row.iter().all(|&v| v == 0.0));
        }
        assert_abs_diff_eq!(ders[1][0], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ders[1][1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_interval_yields_zero_not_nan() {
        // Span 1 is the zero-length interval [knots[1], knots[2]).
        let knots = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let values = basis_functions(1, 0.0, 2, &knots);
        assert!(values.iter().all(|v| v.is_finite()));
        let ders = basis_function_derivatives(1, 0.0, 2, &knots, 2);
        assert!(ders.iter().flatten().all(|v| v.is_finite()));
    }
}
