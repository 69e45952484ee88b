//! Sampling curves and surfaces into discrete points.

use log::debug;
use nurbs_core::error::Result;
use nurbs_core::traits::Validate;
use nurbs_core::SampleConfig;
use nurbs_math::ControlPoint;

use crate::curve::Curve;
use crate::nurbs::cache::BasisCache;
use crate::surface::Surface;

/// `steps + 1` evenly spaced parameters over `[min, max]`, both ends exact.
fn parameters((min, max): (f64, f64), steps: usize) -> Vec<f64> {
    (0..=steps)
        .map(|i| {
            if i == steps {
                max
            } else {
                min + (max - min) * i as f64 / steps as f64
            }
        })
        .collect()
}

/// Evaluate `curve` at evenly spaced parameters no more than `delta` of the
/// domain apart, endpoints included.
pub fn sample_curve<P: ControlPoint>(curve: &Curve<P>, config: &SampleConfig) -> Result<Vec<P>> {
    config.validate()?;
    let params = parameters(curve.domain(), config.steps());
    curve.evaluate_list(&params).collect()
}

/// Evaluate `surface` on an even `(u, v)` grid; `result[i][j]` is the point at
/// the `i`-th u and `j`-th v parameter.
pub fn sample_surface<P: ControlPoint>(
    surface: &Surface<P>,
    config: &SampleConfig,
) -> Result<Vec<Vec<P>>> {
    config.validate()?;
    let us = parameters(surface.domain_u(), config.steps());
    let vs = parameters(surface.domain_v(), config.steps());

    // Each u basis is reused across a whole row, each v basis across all rows.
    let mut cache = BasisCache::new();
    let grid = us
        .iter()
        .map(|&u| {
            vs.iter()
                .map(|&v| surface.evaluate_cached(u, v, &mut cache))
                .collect::<Result<Vec<P>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "sampled surface on a {} x {} grid ({} basis cache hits)",
        us.len(),
        vs.len(),
        cache.hits()
    );
    Ok(grid)
}

/// Convert a curve to a polyline using adaptive subdivision.
///
/// Each non-empty knot span is subdivided recursively while the midpoint
/// deviates from its chord by more than `config.chord_tolerance`, up to
/// `config.max_depth` levels.
pub fn curve_to_polyline<P: ControlPoint>(
    curve: &Curve<P>,
    config: &SampleConfig,
) -> Result<Vec<P>> {
    config.validate()?;
    let breaks: Vec<f64> = curve
        .knot_vector()
        .distinct()
        .into_iter()
        .map(|(knot, _)| knot)
        .collect();

    let mut points = vec![curve.evaluate(breaks[0])?];
    for pair in breaks.windows(2) {
        let p0 = curve.evaluate(pair[0])?;
        let p1 = curve.evaluate(pair[1])?;
        subdivide_curve(curve, (pair[0], p0), (pair[1], p1), config, &mut points, 0)?;
    }
    Ok(points)
}

fn subdivide_curve<P: ControlPoint>(
    curve: &Curve<P>,
    (t0, p0): (f64, P),
    (t1, p1): (f64, P),
    config: &SampleConfig,
    points: &mut Vec<P>,
    depth: u32,
) -> Result<()> {
    if depth >= config.max_depth {
        points.push(p1);
        return Ok(());
    }

    let t_mid = (t0 + t1) * 0.5;
    let p_mid = curve.evaluate(t_mid)?;

    // Chord midpoint
    let chord_mid = (p0 + p1) * 0.5;
    let deviation = (p_mid - chord_mid).length();

    if deviation > config.chord_tolerance {
        subdivide_curve(curve, (t0, p0), (t_mid, p_mid), config, points, depth + 1)?;
        subdivide_curve(curve, (t_mid, p_mid), (t1, p1), config, points, depth + 1)
    } else {
        points.push(p1);
        Ok(())
    }
}
