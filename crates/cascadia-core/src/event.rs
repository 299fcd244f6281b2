//! Stochastic event generation: epicenter sampling along a fault line and
//! magnitude sampling from a bounded normal distribution.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::Normal;

use crate::config::{EpicenterDistribution, MagnitudeDistribution};
use crate::error::SimError;
use crate::panel::Cell;

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, SimError> {
    Normal::new(mean, std_dev).map_err(|_| SimError::InvalidSpread(std_dev))
}

/// Sample an epicenter cell along the configured fault line.
///
/// The fault endpoints are given in ratio coordinates and converted to grid
/// coordinates first. The draw is `start + t_along * d + t_perp * p` where
/// `d` is the fault direction, `p` its unit perpendicular,
/// `t_along ~ Normal(0.5, sqrt(cov_along))` clipped to [0, 1] and
/// `t_perp ~ Normal(0, sqrt(cov_perp))` unclipped. The result is rounded to
/// the nearest cell and clamped into the grid.
pub fn sample_epicenter(
    dist: &EpicenterDistribution,
    width: usize,
    height: usize,
    rng: &mut StdRng,
) -> Result<Cell, SimError> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidGridSize { width, height });
    }

    let (sx, sy) = (
        dist.fault.start.x * width as f64,
        dist.fault.start.y * height as f64,
    );
    let (ex, ey) = (
        dist.fault.end.x * width as f64,
        dist.fault.end.y * height as f64,
    );

    let (dx, dy) = (ex - sx, ey - sy);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return Err(SimError::DegenerateFaultLine);
    }
    // Unit perpendicular to the fault direction.
    let (px, py) = (-dy / len, dx / len);

    for cov in [dist.covariance_along, dist.covariance_perpendicular] {
        if !cov.is_finite() || cov < 0.0 {
            return Err(SimError::InvalidSpread(cov));
        }
    }

    let t_along: f64 = rng
        .sample(normal(0.5, dist.covariance_along.sqrt())?)
        .clamp(0.0, 1.0);
    let t_perp: f64 = rng.sample(normal(0.0, dist.covariance_perpendicular.sqrt())?);

    let x = sx + t_along * dx + t_perp * px;
    let y = sy + t_along * dy + t_perp * py;

    Ok(Cell {
        x: (x.round().max(0.0) as usize).min(width - 1),
        y: (y.round().max(0.0) as usize).min(height - 1),
    })
}

/// Sample a magnitude: one normal draw, clipped (not resampled) into
/// `[min, max]`.
pub fn sample_magnitude(dist: &MagnitudeDistribution, rng: &mut StdRng) -> Result<f64, SimError> {
    if dist.min > dist.max {
        return Err(SimError::InvalidMagnitudeRange {
            min: dist.min,
            max: dist.max,
        });
    }
    if !dist.std.is_finite() || dist.std < 0.0 {
        return Err(SimError::InvalidSpread(dist.std));
    }
    let draw: f64 = rng.sample(normal(dist.mean, dist.std)?);
    Ok(draw.clamp(dist.min, dist.max))
}
