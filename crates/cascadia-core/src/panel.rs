//! The shared mutable cell store: one `Panel` per grid cell, mutated in
//! place by every hazard stage.

use serde::{Deserialize, Serialize};

/// `building_type` / `item_id` sentinel for an empty slot.
pub const NO_BUILDING: i32 = -1;
pub const NO_ITEM: i32 = -1;
/// `building_strength` sentinel for a collapsed building. Collapse is
/// terminal within a stage: once set, the strength never changes again.
pub const COLLAPSED: f64 = -1.0;

/// Terrain classification of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Sea,
    River,
    Plain,
    Reclaimed,
    Delta,
    Plateau,
    Mountain,
    Unknown,
}

/// A grid coordinate. Used instead of bare tuples so the axis order can
/// never be transposed silently at an API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One grid cell's combined terrain/building/hazard state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub terrain_type: TerrainType,
    /// Ground strength in [0, 1].
    pub ground_strength: f64,
    /// Catalog id, or `NO_BUILDING`.
    pub building_type: i32,
    /// [0, 1] while standing, `COLLAPSED` once collapsed.
    pub building_strength: f64,
    /// Running peak seismic intensity (max-hold).
    pub shaking: f64,
    /// Running peak wave height (max-hold).
    pub waving: f64,
    /// Protective item id, or `NO_ITEM`.
    pub item_id: i32,
}

impl Panel {
    /// A bare panel: no building, no item, no accumulated hazard.
    pub fn bare(terrain_type: TerrainType, ground_strength: f64) -> Self {
        Self {
            terrain_type,
            ground_strength,
            building_type: NO_BUILDING,
            building_strength: 0.0,
            shaking: 0.0,
            waving: 0.0,
            item_id: NO_ITEM,
        }
    }

    #[inline]
    pub fn has_building(&self) -> bool {
        self.building_type >= 0
    }

    #[inline]
    pub fn has_item(&self) -> bool {
        self.item_id >= 0
    }

    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.building_strength < 0.0
    }

    #[inline]
    pub fn collapse(&mut self) {
        self.building_strength = COLLAPSED;
    }
}

/// The panel store: a flat row-major array of `Panel` records indexed by
/// `y * width + x`, addressed through `(x, y)` accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelGrid {
    panels: Vec<Panel>,
    width: usize,
    height: usize,
}

impl PanelGrid {
    /// Create a grid of bare panels with unknown terrain and a neutral
    /// ground strength of 0.5.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            panels: vec![Panel::bare(TerrainType::Unknown, 0.5); width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &Panel {
        &self.panels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut Panel {
        &mut self.panels[y * self.width + x]
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Row-major view of all panels.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Iterate panels together with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &Panel)> {
        let width = self.width;
        self.panels
            .iter()
            .enumerate()
            .map(move |(i, p)| (Cell::new(i % width, i / width), p))
    }
}
