//! Scenario configuration: the structured values the surrounding stage
//! layer hands the engine. The core never parses files itself; binaries
//! deserialize a `ScenarioConfig` from JSON and pass it in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::panel::{Cell, TerrainType};
use crate::wave::WaveParams;

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

/// A point in ratio coordinates, each axis in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioPoint {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle in ratio coordinates.
/// Parsed into structure at load time; never evaluated as an expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// One terrain region. Later specs in the list override earlier ones on
/// overlapping cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub terrain_type: TerrainType,
    pub rect: RatioRect,
    /// Ground weakness in (0, 1]; doubles as the seismic density map.
    pub weakness: f64,
    /// Tsunami spread factor; doubles as the tsunami density map.
    #[serde(default = "default_permeability")]
    pub permeability: f64,
    /// Descriptive tag only; carried for round-tripping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disaster_risk: Option<String>,
}

fn default_permeability() -> f64 {
    0.5
}

/// Fault line endpoints in ratio coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultLine {
    pub start: RatioPoint,
    pub end: RatioPoint,
}

/// Where earthquakes start: a fault line plus the spread of epicenters
/// along and across it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicenterDistribution {
    pub fault: FaultLine,
    #[serde(default = "default_cov_along")]
    pub covariance_along: f64,
    #[serde(default = "default_cov_perp")]
    pub covariance_perpendicular: f64,
}

fn default_cov_along() -> f64 {
    1.0
}

fn default_cov_perp() -> f64 {
    0.1
}

/// Bounded magnitude distribution. Draws are clipped, not resampled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

impl Default for MagnitudeDistribution {
    fn default() -> Self {
        Self {
            min: 6.0,
            max: 9.0,
            mean: 7.5,
            std: 0.8,
        }
    }
}

/// Catalog entry for one building type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCatalogEntry {
    pub name: String,
    /// Initial building strength in [0, 1].
    pub base_strength: f64,
    pub score: i64,
}

/// A building placed on the grid before the stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    pub building_type: i32,
    pub cell: Cell,
}

/// A protective item placed on the grid (e.g. a seawall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub item_id: i32,
    pub cell: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Rain,
    Sunny,
}

/// Wave solver configuration for one hazard run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(flatten)]
    pub params: WaveParams,
    pub steps: usize,
}

impl SolverConfig {
    pub fn seismic_default() -> Self {
        Self {
            params: WaveParams::default(),
            steps: 100,
        }
    }

    pub fn tsunami_default() -> Self {
        Self {
            params: WaveParams::default(),
            steps: 200,
        }
    }
}

/// Damage coefficients scaling building resistance per hazard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageConfig {
    pub shaking_coefficient: f64,
    pub waving_coefficient: f64,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            shaking_coefficient: 10.0,
            waving_coefficient: 10.0,
        }
    }
}

/// Landslide cascade tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandslideConfig {
    /// Euclidean damage radius in cells.
    pub damage_radius: f64,
    /// Minimum peak shaking that triggers a slide without rain.
    pub shaking_threshold: f64,
    /// Building types that neither trigger nor suffer slides
    /// (slope reinforcement works).
    #[serde(default)]
    pub protected_building_ids: Vec<i32>,
}

impl Default for LandslideConfig {
    fn default() -> Self {
        Self {
            damage_radius: 2.0,
            shaking_threshold: 5.0,
            protected_building_ids: Vec::new(),
        }
    }
}

/// Everything one stage run consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub grid: GridSize,
    #[serde(default)]
    pub terrain: Vec<TerrainSpec>,
    pub epicenter: EpicenterDistribution,
    #[serde(default)]
    pub magnitude: MagnitudeDistribution,
    /// Building catalog: id -> entry.
    #[serde(default)]
    pub buildings: BTreeMap<i32, BuildingCatalogEntry>,
    #[serde(default)]
    pub placements: Vec<BuildingPlacement>,
    #[serde(default)]
    pub items: Vec<ItemPlacement>,
    /// Omitted weather falls back to a coin flip on the stage RNG.
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default = "SolverConfig::seismic_default")]
    pub seismic: SolverConfig,
    #[serde(default = "SolverConfig::tsunami_default")]
    pub tsunami: SolverConfig,
    #[serde(default)]
    pub damage: DamageConfig,
    #[serde(default)]
    pub landslide: LandslideConfig,
}

impl ScenarioConfig {
    /// Validate the whole configuration before any stage runs. All
    /// violations are fatal to stage startup; there is no partial
    /// simulation.
    pub fn validate(&self) -> Result<(), SimError> {
        let GridSize { width, height } = self.grid;
        if width == 0 || height == 0 {
            return Err(SimError::InvalidGridSize { width, height });
        }

        let fault = &self.epicenter.fault;
        if fault.start == fault.end {
            return Err(SimError::DegenerateFaultLine);
        }
        for cov in [
            self.epicenter.covariance_along,
            self.epicenter.covariance_perpendicular,
        ] {
            if !cov.is_finite() || cov < 0.0 {
                return Err(SimError::InvalidSpread(cov));
            }
        }

        let mag = &self.magnitude;
        if mag.min > mag.max {
            return Err(SimError::InvalidMagnitudeRange {
                min: mag.min,
                max: mag.max,
            });
        }
        if !mag.std.is_finite() || mag.std < 0.0 {
            return Err(SimError::InvalidSpread(mag.std));
        }

        for solver in [&self.seismic, &self.tsunami] {
            solver.params.validate()?;
        }

        for p in &self.placements {
            if p.cell.x >= width || p.cell.y >= height {
                return Err(SimError::OutOfBoundsPlacement {
                    x: p.cell.x,
                    y: p.cell.y,
                    width,
                    height,
                });
            }
            if !self.buildings.contains_key(&p.building_type) {
                return Err(SimError::UnknownBuildingType(p.building_type));
            }
        }
        for item in &self.items {
            if item.cell.x >= width || item.cell.y >= height {
                return Err(SimError::OutOfBoundsPlacement {
                    x: item.cell.x,
                    y: item.cell.y,
                    width,
                    height,
                });
            }
        }

        Ok(())
    }
}
