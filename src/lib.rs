//! scorefx — renders MusicXML/MXL scores and MIDI note sequences as SVG and
//! applies per-note visual effects (blur, erosion, drop shadow, waves,
//! recolor, opacity, rotation) through shared SVG filter chains.
//!
//! # Example
//! ```no_run
//! use scorefx::{render_file, Effect};
//!
//! let mut scene = render_file("path/to/score.mxl").unwrap();
//! scene.init_scope("mutations").unwrap();
//! let targets = scene.group_ids();
//! scene.apply(&Effect::Blur(2.0), "mutations", &targets).unwrap();
//! println!("{}", scene.to_svg_string());
//! ```

pub mod config;
pub mod effects;
pub mod error;
pub mod model;
pub mod mxl;
pub mod parser;
pub mod pianoroll;
pub mod renderer;
pub mod scene;
pub mod sequence;
pub mod svg;
pub mod viewer;

use std::path::Path;

pub use config::{Mode, MutationKind, Settings};
pub use effects::{Effect, EffectKind};
pub use error::{Error, Result};
pub use model::*;
pub use mxl::{load_file, load_source};
pub use parser::parse_musicxml;
pub use pianoroll::{render_sequence, PianoRoll, PianoRollConfig};
pub use renderer::{render_score, RenderOptions};
pub use scene::{GroupId, NoteGroup, NoteKind, Phase, Scene, StaffEntry};
pub use sequence::NoteSequence;
pub use svg::{NodeId, SvgDocument};
pub use viewer::Viewer;

/// Load a score (`.mxl` or plain MusicXML) and render it with default options.
pub fn render_file<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let score = load_file(path)?;
    Ok(render_score(&score, &RenderOptions::default()))
}

/// Render score bytes; `name` decides whether they are an MXL archive.
pub fn render_bytes(name: &str, data: &[u8], options: &RenderOptions) -> Result<Scene> {
    let score = load_source(name, data)?;
    Ok(render_score(&score, options))
}

/// Convert a parsed score to a JSON string.
pub fn score_to_json(score: &Score) -> Result<String> {
    Ok(serde_json::to_string_pretty(score)?)
}
