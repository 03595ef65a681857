//! Note and rest rendering. Every note or rest becomes one `<g>` registered
//! with the scene as a [`NoteGroup`]; ledger lines and lyrics are drawn
//! beside the group so effects leave them alone.

use crate::model::*;
use crate::scene::{GroupId, NoteGroup, NoteKind, Scene, StaffEntry, VoiceEntry};
use crate::svg::{fmt_num, NodeId};

use super::constants::*;
use super::layout::{note_onsets, onset_x, MeasureLayout};
use super::staff::{pitch_to_staff_y, render_ledger_lines};
use super::svg_builder::{box_path, dot_path, SvgBuilder};

/// Where one staff of one measure is drawn.
pub(super) struct StaffContext<'a> {
    pub(super) part_idx: usize,
    pub(super) measure_idx: usize,
    pub(super) staff: usize,
    pub(super) staff_y: f64,
    pub(super) clef: &'a Clef,
    pub(super) divisions: i32,
    pub(super) measure_quarters: f64,
}

/// Draw the notes of `measure` that sit on `ctx.staff` and register them
/// as groups and time slices.
pub(super) fn render_staff_notes(
    scene: &mut Scene,
    parent: NodeId,
    measure: &Measure,
    ml: &MeasureLayout,
    ctx: &StaffContext,
) {
    let onsets = note_onsets(&measure.notes, ctx.divisions);
    let mut entries: Vec<StaffEntry> = Vec::new();

    for (i, note) in measure.notes.iter().enumerate() {
        if note.staff.unwrap_or(1).max(1) as usize != ctx.staff {
            continue;
        }
        let Some(onset) = onsets[i] else { continue };

        let x = if note.rest && (note.measure_rest || note.note_type.is_none()) {
            ml.x + ml.width / 2.0
        } else {
            onset_x(ml, onset, ctx.measure_quarters)
        };

        let id = format!("n{}-{}-{}", ctx.part_idx, ctx.measure_idx, i);
        let group = if note.rest {
            render_rest(scene, parent, id, note, x, ctx)
        } else {
            match note.pitch {
                Some(ref pitch) => render_note(scene, parent, id, note, pitch, x, ctx),
                None => continue,
            }
        };

        if !note.lyrics.is_empty() {
            render_lyrics(scene, parent, note, x, ctx.staff_y);
        }

        add_to_entry(&mut entries, ctx, onset, note.voice.unwrap_or(1), group);
    }

    for entry in entries {
        scene.add_staff_entry(entry);
    }
}

fn add_to_entry(entries: &mut Vec<StaffEntry>, ctx: &StaffContext, beat: f64, voice: i32, group: GroupId) {
    let idx = match entries.iter().position(|e| (e.beat - beat).abs() < 0.001) {
        Some(idx) => idx,
        None => {
            entries.push(StaffEntry {
                part: ctx.part_idx,
                staff: ctx.staff,
                measure: ctx.measure_idx,
                beat,
                voice_entries: Vec::new(),
            });
            entries.len() - 1
        }
    };
    let entry = &mut entries[idx];
    match entry.voice_entries.iter_mut().find(|v| v.voice == voice) {
        Some(v) => v.groups.push(group),
        None => entry.voice_entries.push(VoiceEntry { voice, groups: vec![group] }),
    }
}

fn is_filled_note(note_type: Option<&str>) -> bool {
    !matches!(note_type, Some("whole") | Some("half"))
}

fn flag_count(note_type: Option<&str>) -> usize {
    match note_type {
        Some("eighth") => 1,
        Some("16th") => 2,
        Some("32nd") => 3,
        Some("64th") => 4,
        _ => 0,
    }
}

fn set_data(scene: &mut Scene, node: NodeId, note: &Note, ctx: &StaffContext) {
    let doc = &mut scene.doc;
    doc.set_attribute(node, "data-part", ctx.part_idx.to_string());
    doc.set_attribute(node, "data-measure", ctx.measure_idx.to_string());
    doc.set_attribute(node, "data-staff", ctx.staff.to_string());
    doc.set_attribute(node, "data-voice", note.voice.unwrap_or(1).to_string());
    let markers: Vec<&str> = note.markers().collect();
    if !markers.is_empty() {
        doc.set_attribute(node, "data-markers", markers.join(" "));
    }
}

fn render_note(
    scene: &mut Scene,
    parent: NodeId,
    id: String,
    note: &Note,
    pitch: &Pitch,
    x: f64,
    ctx: &StaffContext,
) -> GroupId {
    let y = ctx.staff_y + pitch_to_staff_y(pitch, ctx.clef);
    let midi = u8::try_from(pitch.to_midi().clamp(0, 127)).ok();
    let note_type = note.note_type.as_deref();

    let mut svg = SvgBuilder::new(&mut scene.doc);
    render_ledger_lines(&mut svg, parent, x, y, ctx.staff_y);

    let g = svg.group(parent, "note");
    svg.doc.set_attribute(g, "id", id.as_str());
    svg.notehead(g, x, y, is_filled_note(note_type));

    if note.dot {
        let p = svg.path(g, &dot_path(x + NOTEHEAD_RX + 4.0, y - 1.5, 1.8), NOTE_COLOR, "none", 0.0);
        svg.doc.set_attribute(p, "class", "dot");
    }

    let mut stem = None;
    if !note.chord && note_type != Some("whole") {
        let stem_up = match note.stem.as_deref() {
            Some("up") => true,
            Some("down") => false,
            _ => y >= ctx.staff_y + STAFF_HEIGHT / 2.0,
        };
        let flags = flag_count(note_type);
        let len = STEM_LENGTH + flags.saturating_sub(1) as f64 * 5.0;
        let (sx, end_y) = if stem_up {
            (x + NOTEHEAD_RX - 1.0, y - len)
        } else {
            (x - NOTEHEAD_RX + 1.0, y + len)
        };

        let stem_g = svg.group(g, "stem");
        let d = format!("M{},{} L{},{}", fmt_num(sx), fmt_num(y), fmt_num(sx), fmt_num(end_y));
        svg.path(stem_g, &d, "none", NOTE_COLOR, STEM_WIDTH);
        for k in 0..flags {
            let fy = if stem_up { end_y + k as f64 * 6.0 } else { end_y - k as f64 * 6.0 };
            let dir = if stem_up { 1.0 } else { -1.0 };
            let d = format!(
                "M{},{} Q{},{} {},{}",
                fmt_num(sx), fmt_num(fy),
                fmt_num(sx + 9.0), fmt_num(fy + dir * 8.0),
                fmt_num(sx + 5.0), fmt_num(fy + dir * 16.0),
            );
            let f = svg.path(stem_g, &d, "none", NOTE_COLOR, NOTE_STROKE_WIDTH);
            svg.doc.set_attribute(f, "class", "flag");
        }
        stem = Some(stem_g);
    }

    set_data(scene, g, note, ctx);
    if let Some(m) = midi {
        scene.doc.set_attribute(g, "data-pitch", m.to_string());
    }

    let markers = note.markers().map(str::to_string).collect();
    scene.add_group(
        NoteGroup::new(id, g, NoteKind::Pitched { stem })
            .with_pitch(midi)
            .with_markers(markers),
    )
}

fn render_rest(scene: &mut Scene, parent: NodeId, id: String, note: &Note, x: f64, ctx: &StaffContext) -> GroupId {
    let top = ctx.staff_y;
    let mut svg = SvgBuilder::new(&mut scene.doc);
    let g = svg.group(parent, "rest");
    svg.doc.set_attribute(g, "id", id.as_str());

    let d = match note.note_type.as_deref() {
        _ if note.measure_rest => box_path(x - 7.0, top + 10.0, 14.0, 5.0),
        Some("half") => box_path(x - 7.0, top + 15.0, 14.0, 5.0),
        Some("quarter") => format!(
            "M{},{} l5,6 l-4,5 l5,7 l-6,-3 l2,7 l-6,-8 l4,-5 Z",
            fmt_num(x - 2.0), fmt_num(top + 8.0)
        ),
        Some("eighth") | Some("16th") | Some("32nd") | Some("64th") => format!(
            "M{},{} q3,2 7,-2 l-5,15 M{},{} a2,2 0 1,0 0.1,0",
            fmt_num(x - 4.0), fmt_num(top + 15.0),
            fmt_num(x - 2.0), fmt_num(top + 14.0)
        ),
        _ => box_path(x - 7.0, top + 10.0, 14.0, 5.0),
    };
    svg.path(g, &d, REST_COLOR, REST_COLOR, NOTE_STROKE_WIDTH);

    set_data(scene, g, note, ctx);
    let markers = note.markers().map(str::to_string).collect();
    scene.add_group(NoteGroup::new(id, g, NoteKind::Rest).with_markers(markers))
}

fn render_lyrics(scene: &mut Scene, parent: NodeId, note: &Note, x: f64, staff_y: f64) {
    let mut svg = SvgBuilder::new(&mut scene.doc);
    for lyric in &note.lyrics {
        let y = staff_y + STAFF_HEIGHT + LYRIC_OFFSET_Y + (lyric.number.max(1) - 1) as f64 * 14.0;
        let t = svg.text(parent, (x, y), &lyric.text, 11.0, LYRIC_COLOR, "middle");
        svg.doc.set_attribute(t, "class", "lyric");
    }
}
