//! Piano-roll drawing: one rectangle per note of a [`NoteSequence`], colored
//! by pitch class and faded by velocity, with a thin separator at bar
//! starts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scene::{NoteGroup, NoteKind, Scene};
use crate::sequence::NoteSequence;
use crate::svg::{fmt_num, NodeId, SvgDocument};

/// One color per pitch class, C first.
pub const PITCH_CLASS_COLORS: [&str; 12] = [
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c",
    "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
];

const OPACITY_BASELINE: f64 = 0.2;
const DEFAULT_VELOCITY: u8 = 127;
/// Pitch padding added on both sides when no range is configured.
const PITCH_PADDING: i32 = 2;
/// Shortest bar drawn, in quarters: one 1/64 beat, the grid `time_to_quarters`
/// rounds to.
const MIN_BAR_QUARTERS: f64 = 1.0 / 16.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PianoRollConfig {
    pub note_height: f64,
    /// Gap subtracted from every note's width
    pub note_spacing: f64,
    /// Pixels per second
    pub pixels_per_time_step: f64,
    pub note_rgb: String,
    pub active_note_rgb: String,
    pub min_pitch: Option<u8>,
    pub max_pitch: Option<u8>,
}

impl Default for PianoRollConfig {
    fn default() -> Self {
        Self {
            note_height: 6.0,
            note_spacing: 1.0,
            pixels_per_time_step: 30.0,
            note_rgb: "8, 41, 64".to_string(),
            active_note_rgb: "240, 84, 119".to_string(),
            min_pitch: None,
            max_pitch: None,
        }
    }
}

/// What [`PianoRoll::draw`] put on the surface.
#[derive(Debug, Clone)]
pub struct PianoRoll {
    width: f64,
    height: f64,
    min_pitch: i32,
    max_pitch: i32,
    notes: Vec<NodeId>,
    bars: Vec<NodeId>,
}

impl PianoRoll {
    /// Draw `seq` onto `surface`, which must be an `<svg>` element. The
    /// surface is emptied first. A sequence without length still draws, onto
    /// a zero-width surface.
    pub fn draw(
        seq: &NoteSequence,
        config: &PianoRollConfig,
        doc: &mut SvgDocument,
        surface: NodeId,
    ) -> Result<PianoRoll> {
        if doc.tag(surface) != "svg" {
            return Err(Error::InvalidSurface(doc.tag(surface).to_string()));
        }

        if seq.total_time <= 0.0 {
            log::warn!("drawing a sequence with no length ({} notes)", seq.notes.len());
        }

        let (min_pitch, max_pitch) = pitch_bounds(seq, config);
        let width = seq.total_time * config.pixels_per_time_step;
        let height = (max_pitch - min_pitch) as f64 * config.note_height;

        doc.clear_children(surface);
        doc.resize(surface, width, height);
        doc.set_style_property(surface, "width", format!("{}px", fmt_num(width)));
        doc.set_style_property(surface, "height", format!("{}px", fmt_num(height)));

        let mut roll = PianoRoll { width, height, min_pitch, max_pitch, notes: Vec::new(), bars: Vec::new() };

        for (i, note) in seq.notes.iter().enumerate() {
            let duration = note.end_time - note.start_time;
            let x = note.start_time * config.pixels_per_time_step;
            let w = config.pixels_per_time_step * duration - config.note_spacing;
            let y = height - (note.pitch as i32 - min_pitch) as f64 * config.note_height;

            let rect = doc.create_element(surface, "rect");
            doc.set_attribute(rect, "class", "note");
            doc.set_attribute(rect, "fill", note_fill(note.pitch, note.velocity));
            doc.set_attribute(rect, "x", fmt_num(round(x)));
            doc.set_attribute(rect, "y", fmt_num(round(y)));
            doc.set_attribute(rect, "width", fmt_num(round(w)));
            doc.set_attribute(rect, "height", fmt_num(round(config.note_height)));
            doc.set_attribute(rect, "data-index", i.to_string());
            doc.set_attribute(rect, "data-instrument", note.instrument.to_string());
            doc.set_attribute(rect, "data-program", note.program.to_string());
            doc.set_attribute(rect, "data-is-drum", note.is_drum.to_string());
            doc.set_attribute(rect, "data-pitch", note.pitch.to_string());
            doc.set_style_property(
                rect,
                "--midi-velocity",
                note.velocity.unwrap_or(DEFAULT_VELOCITY).to_string(),
            );
            roll.notes.push(rect);
        }

        for quarters in bar_starts(seq) {
            let x = seq.quarters_to_time(quarters) * config.pixels_per_time_step;
            let bar = doc.create_element(surface, "rect");
            doc.set_attribute(bar, "fill", "black");
            doc.set_attribute(bar, "x", fmt_num(x));
            doc.set_attribute(bar, "y", "0");
            doc.set_attribute(bar, "width", "1");
            doc.set_attribute(bar, "height", fmt_num(height));
            roll.bars.push(bar);
        }

        log::debug!(
            "piano roll: {} notes, {} bars, pitch {}..{}",
            roll.notes.len(),
            roll.bars.len(),
            min_pitch,
            max_pitch
        );
        Ok(roll)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Pitch drawn at the bottom edge, after padding.
    pub fn min_pitch(&self) -> i32 {
        self.min_pitch
    }

    pub fn max_pitch(&self) -> i32 {
        self.max_pitch
    }

    /// Note rectangles in sequence order.
    pub fn notes(&self) -> &[NodeId] {
        &self.notes
    }

    pub fn bars(&self) -> &[NodeId] {
        &self.bars
    }
}

/// Draw `seq` into a fresh document and register every note rectangle as a
/// note group (`pr-{index}`).
pub fn render_sequence(seq: &NoteSequence, config: &PianoRollConfig) -> Result<Scene> {
    let mut doc = SvgDocument::new(0.0, 0.0);
    let root = doc.root();
    let roll = PianoRoll::draw(seq, config, &mut doc, root)?;

    let mut scene = Scene::new(doc);
    for (i, (&rect, note)) in roll.notes().iter().zip(&seq.notes).enumerate() {
        let id = format!("pr-{i}");
        scene.doc.set_attribute(rect, "id", id.as_str());
        scene.add_group(
            NoteGroup::new(id, rect, NoteKind::Pitched { stem: None }).with_pitch(Some(note.pitch)),
        );
    }
    Ok(scene)
}

fn pitch_bounds(seq: &NoteSequence, config: &PianoRollConfig) -> (i32, i32) {
    let range = seq.pitch_range();
    let min = match config.min_pitch {
        Some(p) => p as i32,
        None => range.map_or(0, |(lo, _)| lo as i32) - PITCH_PADDING,
    };
    let max = match config.max_pitch {
        Some(p) => p as i32,
        None => range.map_or(0, |(_, hi)| hi as i32) + PITCH_PADDING,
    };
    (min, max)
}

/// Fill color for a note: its pitch class color, more opaque when louder.
pub fn note_fill(pitch: u8, velocity: Option<u8>) -> String {
    let opacity = match velocity {
        Some(v) if v > 0 => v as f64 / 100.0 + OPACITY_BASELINE,
        _ => 1.0,
    };
    let color = PITCH_CLASS_COLORS[pitch as usize % 12];
    format!("rgba({}, {})", hex_to_rgb(color), fmt_num(opacity))
}

/// `"#rrggbb"` to `"r, g, b"`. Anything unparsable becomes black.
fn hex_to_rgb(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    format!("{}, {}, {}", channel(0), channel(2), channel(4))
}

/// Round half up, as screen coordinates are rounded in browsers.
fn round(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Quarter positions of every whole bar from the start up to the last note
/// onset, following time-signature changes.
fn bar_starts(seq: &NoteSequence) -> Vec<f64> {
    let Some(last) = seq
        .notes
        .iter()
        .map(|n| seq.time_to_quarters(n.start_time))
        .reduce(f64::max)
    else {
        return Vec::new();
    };

    let mut segments: Vec<(f64, f64)> = seq
        .time_signatures
        .iter()
        .map(|ts| {
            let bar = ts.numerator.max(1) as f64 * 4.0 / ts.denominator.max(1) as f64;
            (seq.time_to_quarters(ts.time), bar.max(MIN_BAR_QUARTERS))
        })
        .collect();
    if segments.first().map_or(true, |&(q, _)| q > 0.0) {
        segments.insert(0, (0.0, 4.0));
    }

    let mut bars = Vec::new();
    for (i, &(start, bar_len)) in segments.iter().enumerate() {
        let end = segments.get(i + 1).map_or(f64::INFINITY, |&(next, _)| next);
        let mut q = start;
        while q < end && q <= last + 1e-9 {
            bars.push(q);
            q += bar_len;
        }
    }
    bars
}
