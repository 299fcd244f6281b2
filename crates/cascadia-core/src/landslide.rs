//! Cellular landslide cascade: mountain cells shaken past a threshold (or
//! soaked by rain) slide, destroying buildings within a Euclidean radius.

use crate::config::{LandslideConfig, Weather};
use crate::error::SimError;
use crate::field::ScalarField;
use crate::panel::{Cell, PanelGrid, TerrainType};

/// Detect every landslide source cell.
///
/// A cell is a source iff its terrain is mountain, it holds no protected
/// building and no protective item, and either it is raining or its peak
/// shaking reached the threshold.
fn detect_sources(
    grid: &PanelGrid,
    shaking: &ScalarField,
    cfg: &LandslideConfig,
    weather: Weather,
) -> Vec<Cell> {
    let raining = weather == Weather::Rain;
    grid.iter()
        .filter(|(cell, panel)| {
            panel.terrain_type == TerrainType::Mountain
                && !cfg.protected_building_ids.contains(&panel.building_type)
                && !panel.has_item()
                && (raining || shaking.get(cell.x, cell.y) >= cfg.shaking_threshold)
        })
        .map(|(cell, _)| cell)
        .collect()
}

/// Run the cascade and return the number of buildings destroyed.
///
/// The outcome is independent of source and target iteration order:
/// collapse is idempotent and the count sums distinct collapse events.
pub fn run_cascade(
    grid: &mut PanelGrid,
    shaking: &ScalarField,
    cfg: &LandslideConfig,
    weather: Weather,
) -> Result<usize, SimError> {
    if !shaking.has_shape(grid.width(), grid.height()) {
        return Err(SimError::ShapeMismatch {
            width: grid.width(),
            height: grid.height(),
            got_width: shaking.width,
            got_height: shaking.height,
        });
    }

    let sources = detect_sources(grid, shaking, cfg, weather);

    let radius = cfg.damage_radius.max(0.0);
    let radius_sq = radius * radius;
    let reach = radius.ceil() as isize;
    let (width, height) = (grid.width() as isize, grid.height() as isize);

    let mut affected = 0;
    for src in sources {
        let (sx, sy) = (src.x as isize, src.y as isize);
        for ty in (sy - reach).max(0)..=(sy + reach).min(height - 1) {
            for tx in (sx - reach).max(0)..=(sx + reach).min(width - 1) {
                if tx == sx && ty == sy {
                    continue; // the source cell itself is spared
                }
                let (ddx, ddy) = ((tx - sx) as f64, (ty - sy) as f64);
                if ddx * ddx + ddy * ddy > radius_sq {
                    continue;
                }
                let panel = grid.get_mut(tx as usize, ty as usize);
                if panel.has_building()
                    && !panel.is_collapsed()
                    && !cfg.protected_building_ids.contains(&panel.building_type)
                {
                    panel.collapse();
                    affected += 1;
                }
            }
        }
    }
    Ok(affected)
}
