//! Score renderer — draws a parsed Score into an SVG [`Scene`].
//!
//! The renderer computes its own layout from the musical content (pitch,
//! duration, time signature). Every note and rest ends up as a `<g>` the
//! effect pipeline can address; everything else (staves, clefs, barlines,
//! lyrics) is plain decoration.

mod constants;
mod layout;
mod notes;
mod staff;
mod svg_builder;

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::scene::Scene;
use crate::svg::SvgDocument;

pub use constants::DEFAULT_PAGE_WIDTH;
use constants::*;
use layout::*;
use notes::{render_staff_notes, StaffContext};
use staff::*;
use svg_builder::SvgBuilder;

/// Options for [`render_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// SVG width in user units; non-positive values fall back to the default.
    pub page_width: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { page_width: DEFAULT_PAGE_WIDTH }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render a parsed Score into a fresh scene.
pub fn render_score(score: &Score, options: &RenderOptions) -> Scene {
    let page_width = if options.page_width > 0.0 { options.page_width } else { DEFAULT_PAGE_WIDTH };
    let layout = compute_layout(score, page_width);

    let mut scene = Scene::new(SvgDocument::new(page_width, layout.total_height));
    let root = scene.doc.root();

    let (decor, music) = {
        let mut svg = SvgBuilder::new(&mut scene.doc);
        svg.rect(root, 0.0, 0.0, page_width, layout.total_height, "white");
        let header = svg.group(root, "header");
        render_header(&mut svg, header, score, page_width);
        (svg.group(root, "staves"), svg.group(root, "notes"))
    };

    // Running attributes of every part after each measure
    let mut states: Vec<PartState> = score
        .parts
        .iter()
        .map(|p| PartState::new(p.staff_count()))
        .collect();
    let measure_count = score.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0);
    let mut states_at: Vec<Vec<PartState>> = Vec::with_capacity(measure_count);
    for m in 0..measure_count {
        for (pidx, part) in score.parts.iter().enumerate() {
            if let Some(measure) = part.measures.get(m) {
                states[pidx].update(measure);
            }
        }
        states_at.push(states.clone());
    }

    for system in &layout.systems {
        let Some(first) = system.measures.first() else { continue };
        let opening = &states_at[first.measure_idx];
        let top = system.y;
        let bottom = layout.staves.last().map_or(top + STAFF_HEIGHT, |s| top + s.y_offset + STAFF_HEIGHT);

        {
            let mut svg = SvgBuilder::new(&mut scene.doc);
            for slot in &layout.staves {
                let staff_y = top + slot.y_offset;
                let state = &opening[slot.part_idx];
                render_staff_lines(&mut svg, decor, PAGE_MARGIN_LEFT, system.x_end, staff_y);
                if let Some(clef) = state.clefs.get(slot.staff) {
                    render_clef(&mut svg, decor, PAGE_MARGIN_LEFT, staff_y, clef);
                }
                if system.first {
                    render_time_signature(&mut svg, decor, PAGE_MARGIN_LEFT + CLEF_SPACE, staff_y, &state.time);
                }
            }
            render_barline(&mut svg, decor, PAGE_MARGIN_LEFT, top, bottom);
            for ml in &system.measures {
                render_barline(&mut svg, decor, ml.x + ml.width, top, bottom);
            }
        }

        for ml in &system.measures {
            for slot in &layout.staves {
                let part = &score.parts[slot.part_idx];
                let Some(measure) = part.measures.get(ml.measure_idx) else { continue };
                let state = &states_at[ml.measure_idx][slot.part_idx];
                let default_clef = Clef::default();
                let ctx = StaffContext {
                    part_idx: slot.part_idx,
                    measure_idx: ml.measure_idx,
                    staff: slot.staff,
                    staff_y: top + slot.y_offset,
                    clef: state.clefs.get(slot.staff).unwrap_or(&default_clef),
                    divisions: state.divisions,
                    measure_quarters: state.time.quarters(),
                };
                render_staff_notes(&mut scene, music, measure, ml, &ctx);
            }
        }
    }

    log::debug!(
        "rendered {} systems, {} note groups",
        layout.systems.len(),
        scene.note_groups().len()
    );
    scene
}
