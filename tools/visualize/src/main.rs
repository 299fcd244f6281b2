//! Diagnostic visualizer — runs a demo scenario and writes PNG debug
//! images of the hazard envelopes and the final panel state to data/debug/.
//! Not part of the main pipeline; no tests, no clippy target.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use cascadia_core::config::{
    BuildingCatalogEntry, BuildingPlacement, EpicenterDistribution, FaultLine, GridSize,
    MagnitudeDistribution, RatioPoint, RatioRect, ScenarioConfig, TerrainSpec, Weather,
};
use cascadia_core::field::ScalarField;
use cascadia_core::panel::{Cell, TerrainType};
use cascadia_core::pipeline::run_stage;

const W: usize = 100;
const H: usize = 100;

// ── Colour helpers ────────────────────────────────────────────────────────────

/// Terrain type → distinct RGB colour.
fn terrain_color(t: TerrainType) -> [u8; 3] {
    match t {
        TerrainType::Sea => [0, 160, 255],
        TerrainType::River => [70, 130, 180],
        TerrainType::Plain => [0, 128, 0],
        TerrainType::Reclaimed => [200, 100, 0],
        TerrainType::Delta => [0, 255, 255],
        TerrainType::Plateau => [255, 255, 0],
        TerrainType::Mountain => [128, 128, 128],
        TerrainType::Unknown => [40, 40, 40],
    }
}

/// Intensity → heatmap against a white background: 0 = white, max = full hue.
fn heat(v: f64, max: f64, hue: [f64; 3]) -> [u8; 3] {
    let t = if max > 0.0 { (v / max).clamp(0.0, 1.0) } else { 0.0 };
    let mix = |h: f64| (255.0 * (1.0 - t) + h * t) as u8;
    [mix(hue[0]), mix(hue[1]), mix(hue[2])]
}

fn save_heatmap(field: &ScalarField, hue: [f64; 3], path: &Path) {
    let max = field.max_value();
    let mut img = image::RgbImage::new(field.width as u32, field.height as u32);
    for y in 0..field.height {
        for x in 0..field.width {
            let [r, g, b] = heat(field.get(x, y), max, hue);
            img.put_pixel(x as u32, y as u32, image::Rgb([r, g, b]));
        }
    }
    img.save(path).expect("failed to save heatmap");
    println!("Wrote {}", path.display());
}

// ── Demo scenario ─────────────────────────────────────────────────────────────

fn demo_scenario() -> ScenarioConfig {
    let rect = |x0: f64, y0: f64, x1: f64, y1: f64| RatioRect { x0, y0, x1, y1 };
    let spec = |t, r, weakness, permeability| TerrainSpec {
        terrain_type: t,
        rect: r,
        weakness,
        permeability,
        disaster_risk: None,
    };

    let mut buildings = BTreeMap::new();
    buildings.insert(
        0,
        BuildingCatalogEntry {
            name: "house".into(),
            base_strength: 0.5,
            score: 100,
        },
    );
    buildings.insert(
        1,
        BuildingCatalogEntry {
            name: "school".into(),
            base_strength: 0.7,
            score: 300,
        },
    );

    let mut placements = Vec::new();
    for i in 0..12 {
        placements.push(BuildingPlacement {
            building_type: (i % 2) as i32,
            cell: Cell::new(20 + (i % 6) * 10, 45 + (i / 6) * 8),
        });
    }

    ScenarioConfig {
        grid: GridSize {
            width: W,
            height: H,
        },
        terrain: vec![
            spec(TerrainType::Sea, rect(0.0, 0.0, 1.0, 0.3), 0.9, 0.9),
            spec(TerrainType::Plain, rect(0.0, 0.3, 1.0, 0.7), 0.7, 0.5),
            spec(TerrainType::Reclaimed, rect(0.0, 0.3, 0.3, 0.5), 0.85, 0.7),
            spec(TerrainType::Mountain, rect(0.0, 0.7, 1.0, 1.0), 0.4, 0.3),
        ],
        epicenter: EpicenterDistribution {
            fault: FaultLine {
                start: RatioPoint { x: 0.1, y: 0.15 },
                end: RatioPoint { x: 0.9, y: 0.2 },
            },
            covariance_along: 0.05,
            covariance_perpendicular: 0.002,
        },
        magnitude: MagnitudeDistribution::default(),
        buildings,
        placements,
        items: Vec::new(),
        weather: Some(Weather::Sunny),
        seismic: cascadia_core::config::SolverConfig::seismic_default(),
        tsunami: cascadia_core::config::SolverConfig::tsunami_default(),
        damage: Default::default(),
        landslide: Default::default(),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let config = demo_scenario();

    println!("Running stage ({W}x{H})…");
    let outcome = run_stage(&config, 42).expect("stage run failed");
    println!(
        "epicenter ({}, {}), magnitude {:.2}, score {}",
        outcome.epicenter.x, outcome.epicenter.y, outcome.magnitude, outcome.report.total_score
    );

    let out_dir = Path::new("data/debug");
    fs::create_dir_all(out_dir).expect("cannot create data/debug/");

    // ── 1 & 2. Hazard envelopes ──────────────────────────────────────────────
    save_heatmap(
        &outcome.shaking_map,
        [220.0, 30.0, 30.0],
        &out_dir.join("shaking_map.png"),
    );
    save_heatmap(
        &outcome.waving_map,
        [30.0, 60.0, 220.0],
        &out_dir.join("waving_map.png"),
    );

    // ── 3. Final panel state ─────────────────────────────────────────────────
    // Terrain colours, with buildings overdrawn: white = standing,
    // red = collapsed.
    {
        let mut img = image::RgbImage::new(W as u32, H as u32);
        for (cell, panel) in outcome.grid.iter() {
            let px = if panel.has_building() {
                if panel.is_collapsed() {
                    image::Rgb([255u8, 0, 0])
                } else {
                    image::Rgb([255u8, 255, 255])
                }
            } else {
                let [r, g, b] = terrain_color(panel.terrain_type);
                image::Rgb([r, g, b])
            };
            img.put_pixel(cell.x as u32, cell.y as u32, px);
        }
        let path = out_dir.join("panel_state.png");
        img.save(&path).expect("failed to save panel_state.png");
        println!("Wrote {}", path.display());
    }

    println!("Done.");
}
