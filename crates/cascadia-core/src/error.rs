use thiserror::Error;

/// Fatal configuration or wiring errors. Any of these aborts the stage
/// before (or instead of) a partial simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidGridSize { width: usize, height: usize },

    #[error("fault line endpoints coincide; the epicenter direction is undefined")]
    DegenerateFaultLine,

    #[error("magnitude range is inverted: min {min} > max {max}")]
    InvalidMagnitudeRange { min: f64, max: f64 },

    #[error("standard deviation / covariance must be non-negative and finite, got {0}")]
    InvalidSpread(f64),

    #[error("solver parameter {name} must be positive, got {value}")]
    InvalidSolverParam { name: &'static str, value: f64 },

    #[error("field shape {got_width}x{got_height} does not match the {width}x{height} grid")]
    ShapeMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },

    #[error("density map must be strictly positive, found {value} at ({x}, {y})")]
    NonPositiveDensity { x: usize, y: usize, value: f64 },

    #[error("placement at ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBoundsPlacement {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("building type {0} is not in the catalog")]
    UnknownBuildingType(i32),

    #[error("{stage} field contains non-finite values; the configuration violates the CFL bound (c*dt/dx <= 1/sqrt(2))")]
    NonFiniteField { stage: &'static str },
}
