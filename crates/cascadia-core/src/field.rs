use serde::{Deserialize, Serialize};

/// A 2D scalar field stored row-major (`y * width + x`), f64 throughout.
/// Shared by the terrain maps (weakness, permeability) and the hazard
/// envelopes (shaking, waving) produced by the wave solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Row-major values.
    pub data: Vec<f64>,
    pub width: usize,
    pub height: usize,
}

impl ScalarField {
    /// Create a new field filled with the given value.
    pub fn filled(width: usize, height: usize, fill: f64) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
        }
    }

    /// Create a zero-valued field.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, val: f64) {
        self.data[y * self.width + x] = val;
    }

    /// True if the field has the given dimensions.
    pub fn has_shape(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min_value(&self) -> f64 {
        self.data.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    /// True when every value is finite. A false result after a solver run
    /// means the configuration violated the CFL stability bound.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}
