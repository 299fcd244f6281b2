//! Reduces the final panel store into collapse/survive counts and a
//! weighted total score.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::BuildingCatalogEntry;
use crate::error::SimError;
use crate::panel::PanelGrid;

/// Collapse/survive counts for one building type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub collapsed: u32,
    pub survived: u32,
}

/// The stage's damage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub collapse_count: u32,
    pub survive_count: u32,
    pub total_score: i64,
    /// Per building type breakdown; keys are catalog ids.
    pub per_type: BTreeMap<i32, TypeCounts>,
}

/// Aggregate the whole grid.
///
/// A surviving building contributes its full base score, a collapsed one
/// half of it. The sum is then scaled by `1 + ln(1 + safe_count) / 5` and
/// floored.
pub fn aggregate(
    grid: &PanelGrid,
    catalog: &BTreeMap<i32, BuildingCatalogEntry>,
) -> Result<ScoreReport, SimError> {
    let mut raw = 0.0_f64;
    let mut survive_count = 0_u32;
    let mut collapse_count = 0_u32;
    let mut per_type: BTreeMap<i32, TypeCounts> = BTreeMap::new();

    for panel in grid.panels() {
        if !panel.has_building() {
            continue;
        }
        let entry = catalog
            .get(&panel.building_type)
            .ok_or(SimError::UnknownBuildingType(panel.building_type))?;
        let counts = per_type.entry(panel.building_type).or_default();
        if panel.is_collapsed() {
            raw += entry.score as f64 / 2.0;
            collapse_count += 1;
            counts.collapsed += 1;
        } else {
            raw += entry.score as f64;
            survive_count += 1;
            counts.survived += 1;
        }
    }

    let bonus = 1.0 + (1.0 + survive_count as f64).ln() / 5.0;
    Ok(ScoreReport {
        collapse_count,
        survive_count,
        total_score: (raw * bonus).floor() as i64,
        per_type,
    })
}
