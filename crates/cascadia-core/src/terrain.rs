//! Rasterizes ratio-based terrain rectangles into per-cell scalar maps
//! (ground weakness, permeability) and terrain type tags.

use crate::config::{RatioRect, TerrainSpec};
use crate::field::ScalarField;
use crate::panel::{PanelGrid, TerrainType};

/// Item id that marks a seawall.
pub const SEAWALL_ITEM_ID: i32 = 2;
/// Permeability forced onto seawall cells before the tsunami run.
pub const SEAWALL_PERMEABILITY: f64 = 0.1;
/// Ground strength of cells no terrain spec covers.
pub const DEFAULT_GROUND_STRENGTH: f64 = 0.5;
/// Permeability of cells no terrain spec covers (uniform medium).
pub const DEFAULT_PERMEABILITY: f64 = 0.5;

/// Ratio rect -> half-open cell bounds: floor(start), ceil(end), clamped.
fn cell_bounds(rect: &RatioRect, width: usize, height: usize) -> (usize, usize, usize, usize) {
    let x0 = (rect.x0 * width as f64).floor().max(0.0) as usize;
    let x1 = ((rect.x1 * width as f64).ceil().max(0.0) as usize).min(width);
    let y0 = (rect.y0 * height as f64).floor().max(0.0) as usize;
    let y1 = ((rect.y1 * height as f64).ceil().max(0.0) as usize).min(height);
    (x0, x1, y0, y1)
}

fn fill_rect(field: &mut ScalarField, rect: &RatioRect, value: f64) {
    let (x0, x1, y0, y1) = cell_bounds(rect, field.width, field.height);
    for y in y0..y1 {
        for x in x0..x1 {
            field.set(x, y, value);
        }
    }
}

/// Ground weakness map; specs applied in list order, last write wins.
pub fn rasterize_weakness(specs: &[TerrainSpec], width: usize, height: usize) -> ScalarField {
    let mut field = ScalarField::filled(width, height, DEFAULT_GROUND_STRENGTH);
    for spec in specs {
        fill_rect(&mut field, &spec.rect, spec.weakness);
    }
    field
}

/// Tsunami permeability/spread map; same geometry as the weakness map.
pub fn rasterize_permeability(specs: &[TerrainSpec], width: usize, height: usize) -> ScalarField {
    let mut field = ScalarField::filled(width, height, DEFAULT_PERMEABILITY);
    for spec in specs {
        fill_rect(&mut field, &spec.rect, spec.permeability);
    }
    field
}

/// Terrain type tags, default `Unknown`.
pub fn rasterize_terrain_types(
    specs: &[TerrainSpec],
    width: usize,
    height: usize,
) -> Vec<TerrainType> {
    let mut types = vec![TerrainType::Unknown; width * height];
    for spec in specs {
        let (x0, x1, y0, y1) = cell_bounds(&spec.rect, width, height);
        for y in y0..y1 {
            for x in x0..x1 {
                types[y * width + x] = spec.terrain_type;
            }
        }
    }
    types
}

/// Force seawall cells to a fixed low permeability. Called after
/// rasterization and before the tsunami run; the grid and the map must
/// share dimensions.
pub fn apply_item_modifiers(permeability: &mut ScalarField, grid: &PanelGrid) {
    debug_assert!(permeability.has_shape(grid.width(), grid.height()));
    for (cell, panel) in grid.iter() {
        if panel.item_id == SEAWALL_ITEM_ID {
            permeability.set(cell.x, cell.y, SEAWALL_PERMEABILITY);
        }
    }
}
