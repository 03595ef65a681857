//! Staff, clef, time signature, header and barline rendering.

use crate::model::*;
use crate::svg::NodeId;

use super::constants::*;
use super::svg_builder::SvgBuilder;

pub(super) fn render_header(svg: &mut SvgBuilder, parent: NodeId, score: &Score, page_width: f64) {
    if let Some(ref title) = score.title {
        let t = svg.text(parent, (page_width / 2.0, PAGE_MARGIN_TOP + 22.0), title, 22.0, HEADER_COLOR, "middle");
        svg.doc.set_attribute(t, "font-weight", "bold");
        svg.doc.set_attribute(t, "class", "title");
    }
    if let Some(ref composer) = score.composer {
        let t = svg.text(
            parent,
            (page_width - PAGE_MARGIN_RIGHT, PAGE_MARGIN_TOP + 55.0),
            composer,
            11.0,
            HEADER_COLOR,
            "end",
        );
        svg.doc.set_attribute(t, "class", "composer");
    }
}

pub(super) fn render_staff_lines(svg: &mut SvgBuilder, parent: NodeId, x1: f64, x2: f64, staff_y: f64) {
    for i in 0..5 {
        let y = staff_y + i as f64 * STAFF_LINE_SPACING;
        svg.line(parent, (x1, y), (x2, y), STAFF_COLOR, STAFF_LINE_WIDTH);
    }
}

/// Clefs are drawn with the SMuFL-compatible Unicode musical symbols.
pub(super) fn render_clef(svg: &mut SvgBuilder, parent: NodeId, x: f64, staff_y: f64, clef: &Clef) {
    let (glyph, y, size) = match clef.sign.as_str() {
        "F" => ("\u{1D122}", staff_y + 30.0, 36.0),
        "C" => ("\u{1D121}", staff_y + 35.0, 38.0),
        _ => ("\u{1D11E}", staff_y + 36.0, 44.0),
    };
    let t = svg.text(parent, (x + 10.0, y), glyph, size, NOTE_COLOR, "middle");
    svg.doc.set_attribute(t, "class", "clef");
}

pub(super) fn render_time_signature(svg: &mut SvgBuilder, parent: NodeId, x: f64, staff_y: f64, time: &TimeSignature) {
    let cx = x + TIME_SIG_SPACE / 2.0;
    for (value, y) in [(time.beats, staff_y + 18.0), (time.beat_type, staff_y + 38.0)] {
        let t = svg.text(parent, (cx, y), &value.to_string(), 20.0, NOTE_COLOR, "middle");
        svg.doc.set_attribute(t, "font-weight", "bold");
        svg.doc.set_attribute(t, "class", "time-signature");
    }
}

pub(super) fn render_barline(svg: &mut SvgBuilder, parent: NodeId, x: f64, top_y: f64, bottom_y: f64) {
    svg.line(parent, (x, top_y), (x, bottom_y), BARLINE_COLOR, BARLINE_WIDTH);
}

pub(super) fn render_ledger_lines(svg: &mut SvgBuilder, parent: NodeId, x: f64, note_y: f64, staff_y: f64) {
    let top = staff_y;
    let bottom = staff_y + STAFF_HEIGHT;
    let (x1, x2) = (x - NOTEHEAD_RX - LEDGER_LINE_EXTEND, x + NOTEHEAD_RX + LEDGER_LINE_EXTEND);

    if note_y < top {
        let mut y = top - STAFF_LINE_SPACING;
        while y >= note_y - 1.0 {
            svg.line(parent, (x1, y), (x2, y), STAFF_COLOR, LEDGER_LINE_WIDTH);
            y -= STAFF_LINE_SPACING;
        }
    }

    if note_y > bottom {
        let mut y = bottom + STAFF_LINE_SPACING;
        while y <= note_y + 1.0 {
            svg.line(parent, (x1, y), (x2, y), STAFF_COLOR, LEDGER_LINE_WIDTH);
            y += STAFF_LINE_SPACING;
        }
    }
}

/// Vertical offset of a pitch from the top staff line.
pub(super) fn pitch_to_staff_y(pitch: &Pitch, clef: &Clef) -> f64 {
    let step_index = match pitch.step.as_str() {
        "C" => 0, "D" => 1, "E" => 2, "F" => 3,
        "G" => 4, "A" => 5, "B" => 6, _ => 0,
    };
    let note_position = pitch.octave * 7 + step_index;

    let ref_position = match clef.sign.as_str() {
        "F" => 3 * 7 + 3, // F3
        "C" => 4 * 7,     // C4
        _ => 4 * 7 + 4,   // G4
    };
    let ref_y = (5 - clef.line) as f64 * STAFF_LINE_SPACING;

    let staff_steps = note_position - ref_position;
    ref_y - staff_steps as f64 * (STAFF_LINE_SPACING / 2.0)
}
