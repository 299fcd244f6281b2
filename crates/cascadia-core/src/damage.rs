//! Applies a hazard intensity field to the panel store, collapsing
//! buildings whose resistance is exceeded.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::field::ScalarField;
use crate::panel::PanelGrid;

/// Which panel attribute records the hazard field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Shaking,
    Waving,
}

/// Sweep the whole grid once: record the per-cell intensity into the
/// panel's `shaking`/`waving` attribute (max-hold), then resolve collapse.
///
/// A building collapses when `intensity > building_strength *
/// ground_strength * coefficient`. Already-collapsed buildings are never
/// re-evaluated, so a negative strength can never feed the resistance
/// computation. Returns the number of collapses this sweep caused.
pub fn apply_hazard(
    grid: &mut PanelGrid,
    field: &ScalarField,
    kind: HazardKind,
    coefficient: f64,
) -> Result<usize, SimError> {
    if !field.has_shape(grid.width(), grid.height()) {
        return Err(SimError::ShapeMismatch {
            width: grid.width(),
            height: grid.height(),
            got_width: field.width,
            got_height: field.height,
        });
    }

    let mut collapsed = 0;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let intensity = field.get(x, y);
            let panel = grid.get_mut(x, y);
            match kind {
                HazardKind::Shaking => panel.shaking = panel.shaking.max(intensity),
                HazardKind::Waving => panel.waving = panel.waving.max(intensity),
            }
            if !panel.has_building() || panel.is_collapsed() {
                continue;
            }
            let resistance = panel.building_strength * panel.ground_strength * coefficient;
            if intensity > resistance {
                panel.collapse();
                collapsed += 1;
            }
        }
    }
    Ok(collapsed)
}
