use approx::assert_abs_diff_eq;
use nurbs_core::traits::Validate;
use nurbs_core::{NurbsError, SampleConfig};
use nurbs_geometry::{sample_surface, Direction, Surface, Surface3};
use nurbs_math::DVec3;

/// Bicubic-by-quadratic NURBS patch with an interior knot in each direction
/// and uneven weights.
fn saddle() -> Surface3 {
    let knots_u = vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0];
    let knots_v = vec![0.0, 0.0, 0.0, 0.4, 1.0, 1.0, 1.0];
    let mut grid = Vec::new();
    let mut weights = Vec::new();
    for i in 0..5 {
        let mut row = Vec::new();
        let mut row_w = Vec::new();
        for j in 0..4 {
            let x = i as f64;
            let y = j as f64 * 1.5;
            let z = (x - 2.0) * (y - 2.25) * 0.3 + if (i + j) % 2 == 0 { 0.4 } else { 0.0 };
            row.push(DVec3::new(x, y, z));
            row_w.push(1.0 + 0.3 * ((i * 3 + j) % 4) as f64);
        }
        grid.push(row);
        weights.push(row_w);
    }
    Surface::new(3, 2, knots_u, knots_v, grid, Some(weights)).unwrap()
}

fn eval(s: &Surface3, u: f64, v: f64) -> DVec3 {
    s.evaluate(u, v).unwrap()
}

#[test_log::test]
fn test_corner_interpolation() {
    let s = saddle();
    let cps = s.control_points();
    assert_abs_diff_eq!(eval(&s, 0.0, 0.0), cps[0][0], epsilon = 1e-12);
    assert_abs_diff_eq!(eval(&s, 1.0, 0.0), cps[4][0], epsilon = 1e-12);
    assert_abs_diff_eq!(eval(&s, 0.0, 1.0), cps[0][3], epsilon = 1e-12);
    assert_abs_diff_eq!(eval(&s, 1.0, 1.0), cps[4][3], epsilon = 1e-12);
}

#[test_log::test]
fn test_constant_grid_reproduces_constant() {
    // Partition of unity in both directions, with and without weights.
    let s = saddle();
    let c = DVec3::new(1.5, -2.0, 0.25);
    let grid = vec![vec![c; 4]; 5];
    for weights in [None, s.weights().map(<[_]>::to_vec)] {
        let flat = Surface::new(
            3,
            2,
            s.knots_u().to_vec(),
            s.knots_v().to_vec(),
            grid.clone(),
            weights,
        )
        .unwrap();
        for &(u, v) in &[(0.0, 0.0), (0.3, 0.9), (0.5, 0.4), (0.77, 0.12), (1.0, 1.0)] {
            assert_abs_diff_eq!(eval(&flat, u, v), c, epsilon = 1e-12);
        }
    }
}

#[test_log::test]
fn test_rational_partials_match_finite_differences() {
    let s = saddle();
    let h1 = 1e-5;
    let h2 = 1e-4;
    let close = |a: DVec3, b: DVec3, rel: f64| {
        let tol = rel * a.length().max(1.0);
        assert!((a - b).length() < tol, "{:?} vs {:?} (tol {})", a, b, tol);
    };

    for &(u, v) in &[(0.2, 0.2), (0.35, 0.7), (0.8, 0.55), (0.65, 0.15)] {
        let skl = s.evaluate_derivatives(u, v, 2, 2).unwrap();
        assert_eq!(skl.len(), 3);
        assert!(skl.iter().all(|row| row.len() == 3));
        assert_eq!(skl[0][0], eval(&s, u, v));

        let su = (eval(&s, u + h1, v) - eval(&s, u - h1, v)) / (2.0 * h1);
        let sv = (eval(&s, u, v + h1) - eval(&s, u, v - h1)) / (2.0 * h1);
        close(skl[1][0], su, 1e-6);
        close(skl[0][1], sv, 1e-6);

        let h = h2;
        let suu = (eval(&s, u + h, v) - eval(&s, u, v) * 2.0 + eval(&s, u - h, v)) / (h * h);
        let suv = (eval(&s, u + h, v + h) - eval(&s, u + h, v - h) - eval(&s, u - h, v + h)
            + eval(&s, u - h, v - h))
            / (4.0 * h * h);
        close(skl[2][0], suu, 1e-4);
        // The mixed partial depends on the rational cross terms.
        close(skl[1][1], suv, 1e-4);

        // S_uuv by differencing the analytic S_uv along u.
        let ahead = s.evaluate_derivatives(u + h, v, 1, 1).unwrap()[1][1];
        let behind = s.evaluate_derivatives(u - h, v, 1, 1).unwrap()[1][1];
        close(skl[2][1], (ahead - behind) / (2.0 * h), 1e-4);
    }
}

#[test_log::test]
fn test_normal_is_unit_and_orthogonal() {
    let s = saddle();
    for &(u, v) in &[(0.1, 0.1), (0.5, 0.5), (0.9, 0.3)] {
        let (_, du, dv) = s.tangents(u, v).unwrap();
        let n = s.normal(u, v).unwrap();
        assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(n.dot(du), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(n.dot(dv), 0.0, epsilon = 1e-9);
    }
}

#[test_log::test]
fn test_refine_both_directions_preserves_shape() {
    let original = saddle();
    let mut s = original.clone();
    s.refine(Direction::U, &[0.25, 0.5, 0.75]).unwrap();
    s.insert_knot(Direction::V, 0.7, 2).unwrap();
    s.validate().unwrap();
    assert_eq!(s.size(), (8, 6));

    for i in 0..=12 {
        for j in 0..=12 {
            let (u, v) = (i as f64 / 12.0, j as f64 / 12.0);
            assert_abs_diff_eq!(eval(&s, u, v), eval(&original, u, v), epsilon = 1e-9);
        }
    }
}

#[test_log::test]
fn test_out_of_range_and_bad_insertions() {
    let mut s = saddle();
    let before = s.clone();
    assert!(matches!(
        s.evaluate(0.5, -0.01),
        Err(NurbsError::ParameterOutOfRange { .. })
    ));
    assert!(matches!(
        s.insert_knot(Direction::U, 0.0, 1),
        Err(NurbsError::InvalidMultiplicity { .. })
    ));
    assert!(matches!(
        s.refine(Direction::V, &[0.4, 0.4, 0.4]),
        Err(NurbsError::InvalidMultiplicity { multiplicity: 4, max: 3, .. })
    ));
    assert_eq!(s, before);
}

#[test_log::test]
fn test_from_flat_matches_grid() {
    let s = saddle();
    let flat: Vec<DVec3> = s.control_points().iter().flatten().copied().collect();
    let weights: Vec<f64> = s.weights().unwrap().iter().flatten().copied().collect();
    let rebuilt = Surface::from_flat(
        3,
        2,
        5,
        4,
        s.knots_u().to_vec(),
        s.knots_v().to_vec(),
        flat,
        Some(weights),
    )
    .unwrap();
    assert_eq!(rebuilt, s);
}

#[test_log::test]
fn test_sampling_from_json_config() {
    let config: SampleConfig = serde_json::from_str(r#"{ "delta": 0.1 }"#).unwrap();
    let s = saddle();
    let grid = sample_surface(&s, &config).unwrap();
    assert_eq!(grid.len(), 11);
    assert_abs_diff_eq!(grid[10][10], eval(&s, 1.0, 1.0), epsilon = 1e-12);
    assert_abs_diff_eq!(grid[5][3], eval(&s, 0.5, 0.3), epsilon = 1e-12);
}
