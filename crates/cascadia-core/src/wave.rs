//! Damped leapfrog 2D wave solver.
//!
//! One generic engine drives both hazards: seismic shaking (density map =
//! ground weakness, amplitude = magnitude) and tsunami inundation (density
//! map = permeability, amplitude = magnitude times a fixed multiplier).
//! Energy leaves the grid through a multiplicative damping mask near the
//! borders, not through a fixed boundary value.
//!
//! The solver does not enforce the CFL bound `c*dt/dx <= 1/sqrt(2)`; an
//! unstable configuration diverges instead of erroring. Callers check the
//! returned envelope for finiteness.

use serde::{Deserialize, Serialize};

#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::error::SimError;
use crate::field::ScalarField;
use crate::panel::Cell;

/// Physical and numerical parameters of one solver instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    /// Spatial step.
    pub dx: f64,
    /// Time step.
    pub dt: f64,
    /// Stiffness; per-cell wave speed is `sqrt(mu / density)`.
    pub mu: f64,
    /// Width of the absorbing border band, in cells.
    pub damping_width: usize,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            dx: 1.0,
            dt: 0.1,
            mu: 1.0,
            damping_width: 3,
        }
    }
}

impl WaveParams {
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [("dx", self.dx), ("dt", self.dt), ("mu", self.mu)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidSolverParam { name, value });
            }
        }
        Ok(())
    }
}

/// Multiplicative damping mask over the padded shape. Within `width` cells
/// of a border, the cell at distance `i` carries factor `(1 - i/width)^2`;
/// factors from intersecting borders multiply.
fn build_damping_mask(pw: usize, ph: usize, width: usize) -> Vec<f64> {
    let mut mask = vec![1.0; pw * ph];
    for i in 0..width {
        let factor = (1.0 - i as f64 / width as f64).powi(2);
        if i < ph {
            for x in 0..pw {
                mask[i * pw + x] *= factor;
                mask[(ph - 1 - i) * pw + x] *= factor;
            }
        }
        if i < pw {
            for y in 0..ph {
                mask[y * pw + i] *= factor;
                mask[y * pw + (pw - 1 - i)] *= factor;
            }
        }
    }
    mask
}

/// Leapfrog integrator state. Arrays are padded by a one-cell halo per
/// side; the halo never carries energy and is excluded from the stencil.
pub struct WaveSolver {
    width: usize,
    height: usize,
    /// Padded dimensions (`width + 2`, `height + 2`).
    pw: usize,
    ph: usize,
    dt2: f64,
    inv_dx2: f64,
    /// Per padded cell `c^2 = mu / density`, edge-replicated into the halo.
    c2: Vec<f64>,
    damping: Vec<f64>,
    u_prev: Vec<f64>,
    u_curr: Vec<f64>,
    u_next: Vec<f64>,
    u_max: Vec<f64>,
    max_c: f64,
    dx: f64,
    dt: f64,
}

impl WaveSolver {
    /// Build a solver with a single-point initial condition:
    /// `u_curr[epicenter] = amplitude`, everything else zero.
    ///
    /// Errors if the epicenter lies outside the density map or any density
    /// cell is non-positive (a wave speed would be undefined).
    pub fn new(
        epicenter: Cell,
        amplitude: f64,
        density: &ScalarField,
        params: WaveParams,
    ) -> Result<Self, SimError> {
        params.validate()?;
        let (width, height) = (density.width, density.height);
        if width == 0 || height == 0 {
            return Err(SimError::InvalidGridSize { width, height });
        }
        if epicenter.x >= width || epicenter.y >= height {
            return Err(SimError::OutOfBoundsPlacement {
                x: epicenter.x,
                y: epicenter.y,
                width,
                height,
            });
        }

        let (pw, ph) = (width + 2, height + 2);
        let mut c2 = vec![0.0; pw * ph];
        let mut min_rho = f64::INFINITY;
        for py in 0..ph {
            // Edge-replicate the density into the halo.
            let sy = py.saturating_sub(1).min(height - 1);
            for px in 0..pw {
                let sx = px.saturating_sub(1).min(width - 1);
                let rho = density.get(sx, sy);
                if !rho.is_finite() || rho <= 0.0 {
                    return Err(SimError::NonPositiveDensity {
                        x: sx,
                        y: sy,
                        value: rho,
                    });
                }
                c2[py * pw + px] = params.mu / rho;
                min_rho = min_rho.min(rho);
            }
        }

        let mut u_curr = vec![0.0; pw * ph];
        u_curr[(epicenter.y + 1) * pw + (epicenter.x + 1)] = amplitude;

        Ok(Self {
            width,
            height,
            pw,
            ph,
            dt2: params.dt * params.dt,
            inv_dx2: 1.0 / (params.dx * params.dx),
            c2,
            damping: build_damping_mask(pw, ph, params.damping_width),
            u_prev: vec![0.0; pw * ph],
            u_curr,
            u_next: vec![0.0; pw * ph],
            u_max: vec![0.0; pw * ph],
            max_c: (params.mu / min_rho).sqrt(),
            dx: params.dx,
            dt: params.dt,
        })
    }

    /// Worst-case Courant number `max(c) * dt / dx`. Values above
    /// `1/sqrt(2)` diverge for the 2D 5-point scheme. Diagnostic only;
    /// nothing is enforced.
    pub fn cfl_number(&self) -> f64 {
        self.max_c * self.dt / self.dx
    }

    /// Advance one time step: interior 5-point Laplacian, leapfrog update,
    /// damping multiply, max-hold envelope, buffer rotation.
    pub fn step(&mut self) {
        let (width, height, pw) = (self.width, self.height, self.pw);
        let (dt2, inv_dx2) = (self.dt2, self.inv_dx2);
        let u_curr = &self.u_curr;
        let u_prev = &self.u_prev;
        let c2 = &self.c2;
        let damping = &self.damping;

        let update_row = |y: usize, next_row: &mut [f64], max_row: &mut [f64]| {
            if y == 0 || y > height {
                return; // halo rows never carry energy
            }
            for x in 1..=width {
                let i = y * pw + x;
                let lap = (u_curr[i - pw] + u_curr[i + pw] + u_curr[i - 1] + u_curr[i + 1]
                    - 4.0 * u_curr[i])
                    * inv_dx2;
                let v = (2.0 * u_curr[i] - u_prev[i] + c2[i] * dt2 * lap) * damping[i];
                next_row[x] = v;
                max_row[x] = max_row[x].max(v.abs());
            }
        };

        // Each cell depends only on the previous time step, so rows within
        // one step are independent; the buffer rotation below is the
        // barrier between steps.
        #[cfg(feature = "threading")]
        self.u_next
            .par_chunks_mut(pw)
            .zip(self.u_max.par_chunks_mut(pw))
            .enumerate()
            .for_each(|(y, (next_row, max_row))| update_row(y, next_row, max_row));

        #[cfg(not(feature = "threading"))]
        for (y, (next_row, max_row)) in self
            .u_next
            .chunks_mut(pw)
            .zip(self.u_max.chunks_mut(pw))
            .enumerate()
        {
            update_row(y, next_row, max_row);
        }

        std::mem::swap(&mut self.u_prev, &mut self.u_curr);
        std::mem::swap(&mut self.u_curr, &mut self.u_next);
    }

    /// Run exactly `steps` steps and return the halo-stripped interior of
    /// the peak-amplitude envelope.
    pub fn run(&mut self, steps: usize) -> ScalarField {
        for _ in 0..steps {
            self.step();
        }
        let mut out = ScalarField::zeros(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x, y, self.u_max[(y + 1) * self.pw + (x + 1)]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform_density(width: usize, height: usize, rho: f64) -> ScalarField {
        ScalarField::filled(width, height, rho)
    }

    fn stable_params() -> WaveParams {
        // c = 1, dt/dx = 0.1 -> Courant number 0.1, well under 1/sqrt(2).
        WaveParams {
            dx: 1.0,
            dt: 0.1,
            mu: 1.0,
            damping_width: 3,
        }
    }

    #[test]
    fn zero_steps_leave_envelope_zero() {
        let density = uniform_density(9, 9, 1.0);
        let mut solver =
            WaveSolver::new(Cell::new(4, 4), 7.0, &density, stable_params()).unwrap();
        let envelope = solver.run(0);
        assert!(envelope.data.iter().all(|&v| v == 0.0));
        assert_eq!((envelope.width, envelope.height), (9, 9));
    }

    #[test]
    fn energy_spreads_from_the_epicenter() {
        let density = uniform_density(11, 11, 1.0);
        let mut solver =
            WaveSolver::new(Cell::new(5, 5), 5.0, &density, stable_params()).unwrap();
        let envelope = solver.run(10);
        assert!(envelope.get(5, 5) > 0.0);
        // After one step the 4-neighbours have picked up c^2 dt^2 * A / dx^2.
        assert!(envelope.get(6, 5) > 0.0);
        assert!(envelope.get(5, 6) > 0.0);
        // Uniform medium, centered source: the envelope is 4-fold symmetric.
        assert_relative_eq!(envelope.get(6, 5), envelope.get(4, 5), max_relative = 1e-12);
        assert_relative_eq!(envelope.get(5, 6), envelope.get(5, 4), max_relative = 1e-12);
    }

    #[test]
    fn stable_configuration_stays_bounded() {
        let density = uniform_density(16, 16, 1.0);
        let params = WaveParams {
            dx: 1.0,
            dt: 0.5, // Courant number 0.5: stable
            mu: 1.0,
            damping_width: 3,
        };
        let mut solver = WaveSolver::new(Cell::new(8, 8), 5.0, &density, params).unwrap();
        assert!(solver.cfl_number() <= 1.0 / 2.0_f64.sqrt());
        let envelope = solver.run(300);
        assert!(envelope.all_finite());
        assert!(
            envelope.max_value() <= 50.0,
            "stable run blew up: {}",
            envelope.max_value()
        );
    }

    #[test]
    fn cfl_violation_diverges() {
        let density = uniform_density(16, 16, 0.5);
        let params = WaveParams {
            dx: 1.0,
            dt: 0.5,
            mu: 100.0, // c = sqrt(200): Courant number ~7
            damping_width: 3,
        };
        let mut solver = WaveSolver::new(Cell::new(8, 8), 5.0, &density, params).unwrap();
        assert!(solver.cfl_number() > 1.0 / 2.0_f64.sqrt());
        let envelope = solver.run(80);
        assert!(
            !envelope.all_finite() || envelope.max_value() > 1e9,
            "expected divergence, max = {}",
            envelope.max_value()
        );
    }

    #[test]
    fn damping_mask_profile_and_corner_product() {
        // Padded 12x10, band width 3: distance 0 keeps factor 1,
        // distance 1 -> (2/3)^2, distance 2 -> (1/3)^2, distance >= 3 -> 1.
        let mask = build_damping_mask(12, 10, 3);
        let at = |x: usize, y: usize| mask[y * 12 + x];
        assert_relative_eq!(at(0, 5), 1.0, max_relative = 1e-12);
        assert_relative_eq!(at(1, 5), (2.0 / 3.0_f64).powi(2), max_relative = 1e-12);
        assert_relative_eq!(at(2, 5), (1.0 / 3.0_f64).powi(2), max_relative = 1e-12);
        assert_relative_eq!(at(3, 5), 1.0, max_relative = 1e-12);
        assert_relative_eq!(at(6, 0), 1.0, max_relative = 1e-12);
        assert_relative_eq!(at(6, 2), (1.0 / 3.0_f64).powi(2), max_relative = 1e-12);
        // Corner: both border factors multiply.
        assert_relative_eq!(at(1, 1), (2.0 / 3.0_f64).powi(4), max_relative = 1e-12);
        // Dead center untouched.
        assert_relative_eq!(at(6, 5), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn variable_density_slows_the_wave() {
        // Dense (slow) right half: the envelope reaches further left than
        // right after the same number of steps.
        let mut density = uniform_density(21, 9, 0.5);
        for y in 0..9 {
            for x in 11..21 {
                density.set(x, y, 8.0);
            }
        }
        let mut solver =
            WaveSolver::new(Cell::new(10, 4), 5.0, &density, stable_params()).unwrap();
        let envelope = solver.run(40);
        assert!(envelope.get(4, 4) > envelope.get(16, 4));
    }

    #[test]
    fn non_positive_density_is_an_error() {
        let mut density = uniform_density(5, 5, 1.0);
        density.set(3, 2, 0.0);
        assert!(matches!(
            WaveSolver::new(Cell::new(2, 2), 1.0, &density, stable_params()),
            Err(SimError::NonPositiveDensity { x: 3, y: 2, .. })
        ));
    }

    #[test]
    fn epicenter_outside_grid_is_an_error() {
        let density = uniform_density(5, 5, 1.0);
        assert!(matches!(
            WaveSolver::new(Cell::new(5, 0), 1.0, &density, stable_params()),
            Err(SimError::OutOfBoundsPlacement { .. })
        ));
    }

    #[test]
    fn invalid_params_are_an_error() {
        let density = uniform_density(5, 5, 1.0);
        let params = WaveParams {
            dt: 0.0,
            ..WaveParams::default()
        };
        assert!(matches!(
            WaveSolver::new(Cell::new(2, 2), 1.0, &density, params),
            Err(SimError::InvalidSolverParam { name: "dt", .. })
        ));
    }
}
