//! Layout computation — determines how measures are grouped into systems
//! and where each note onset sits horizontally.

use std::collections::HashMap;

use crate::model::*;
use super::constants::*;

// ═══════════════════════════════════════════════════════════════════════
// Layout structures
// ═══════════════════════════════════════════════════════════════════════

pub(super) struct ScoreLayout {
    pub(super) systems: Vec<SystemLayout>,
    /// One entry per (part, staff) in top-to-bottom order
    pub(super) staves: Vec<StaffSlot>,
    pub(super) total_height: f64,
}

/// Vertical position of one staff relative to its system's top.
pub(super) struct StaffSlot {
    pub(super) part_idx: usize,
    /// 1-based staff number within the part
    pub(super) staff: usize,
    pub(super) y_offset: f64,
}

pub(super) struct SystemLayout {
    pub(super) y: f64,
    pub(super) x_end: f64,
    pub(super) measures: Vec<MeasureLayout>,
    /// Whether this system opens the score (time signature shown)
    pub(super) first: bool,
}

pub(super) struct MeasureLayout {
    pub(super) measure_idx: usize,
    pub(super) x: f64,
    pub(super) width: f64,
}

/// Running per-part attributes while walking measures in order.
#[derive(Clone)]
pub(super) struct PartState {
    pub(super) divisions: i32,
    pub(super) time: TimeSignature,
    /// Index 0 unused, 1..=num_staves
    pub(super) clefs: Vec<Clef>,
}

impl PartState {
    pub(super) fn new(num_staves: usize) -> Self {
        let clefs = (0..=num_staves)
            .map(|n| {
                if n >= 2 {
                    // lower staves of a grand staff default to bass clef
                    Clef { number: n as i32, sign: "F".into(), line: 4 }
                } else {
                    Clef::default()
                }
            })
            .collect();
        Self { divisions: 1, time: TimeSignature::default(), clefs }
    }

    pub(super) fn update(&mut self, measure: &Measure) {
        if let Some(ref attrs) = measure.attributes {
            if let Some(d) = attrs.divisions {
                self.divisions = d.max(1);
            }
            if let Some(t) = attrs.time {
                self.time = t;
            }
            for clef in &attrs.clefs {
                let idx = clef.number.max(1) as usize;
                if idx < self.clefs.len() {
                    self.clefs[idx] = clef.clone();
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Onset timing
// ═══════════════════════════════════════════════════════════════════════

/// Onset of each note within its measure, in quarter notes. Time is tracked
/// per (staff, voice); chord members share their principal's onset. Grace
/// notes get `None`.
pub(super) fn note_onsets(notes: &[Note], divisions: i32) -> Vec<Option<f64>> {
    let mut voice_pos: HashMap<(i32, i32), f64> = HashMap::new();
    let mut voice_last: HashMap<(i32, i32), f64> = HashMap::new();
    let div = divisions.max(1) as f64;

    notes
        .iter()
        .map(|note| {
            if note.grace {
                return None;
            }
            let key = (note.staff.unwrap_or(1), note.voice.unwrap_or(1));
            if note.chord {
                return Some(voice_last.get(&key).copied().unwrap_or(0.0));
            }
            let pos = voice_pos.entry(key).or_insert(0.0);
            let onset = *pos;
            *pos += note.duration.max(0) as f64 / div;
            voice_last.insert(key, onset);
            Some(onset)
        })
        .collect()
}

fn distinct_onsets(score: &Score, states: &[PartState], measure_idx: usize) -> usize {
    let mut beats: Vec<f64> = Vec::new();
    for (pidx, part) in score.parts.iter().enumerate() {
        let Some(measure) = part.measures.get(measure_idx) else { continue };
        for bt in note_onsets(&measure.notes, states[pidx].divisions).into_iter().flatten() {
            if !beats.iter().any(|&b| (b - bt).abs() < 0.001) {
                beats.push(bt);
            }
        }
    }
    beats.len().max(1)
}

/// X position of an onset inside a measure box.
pub(super) fn onset_x(ml: &MeasureLayout, onset: f64, measure_quarters: f64) -> f64 {
    let usable = (ml.width - 2.0 * MEASURE_PADDING).max(0.0);
    let frac = if measure_quarters > 0.0 {
        (onset / measure_quarters).clamp(0.0, 0.999)
    } else {
        0.0
    };
    ml.x + MEASURE_PADDING + frac * usable
}

// ═══════════════════════════════════════════════════════════════════════
// Main layout computation
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn compute_layout(score: &Score, page_width: f64) -> ScoreLayout {
    // Vertical slots for every staff of every part
    let mut staves = Vec::new();
    let mut y = 0.0;
    for (pidx, part) in score.parts.iter().enumerate() {
        if pidx > 0 {
            y += PART_GAP;
        }
        for staff in 1..=part.staff_count() {
            if staff > 1 {
                y += GRAND_STAFF_GAP;
            }
            staves.push(StaffSlot { part_idx: pidx, staff, y_offset: y });
            y += STAFF_HEIGHT;
        }
    }
    let system_height = y;

    // Natural width of every measure
    let measure_count = score.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0);
    let mut states: Vec<PartState> = score
        .parts
        .iter()
        .map(|p| PartState::new(p.staff_count()))
        .collect();
    let mut natural = Vec::with_capacity(measure_count);
    for m in 0..measure_count {
        for (pidx, part) in score.parts.iter().enumerate() {
            if let Some(measure) = part.measures.get(m) {
                states[pidx].update(measure);
            }
        }
        let w = 2.0 * MEASURE_PADDING + distinct_onsets(score, &states, m) as f64 * PER_ONSET_WIDTH;
        natural.push(w.max(MIN_MEASURE_WIDTH));
    }

    // Greedy packing into systems
    let content_right = page_width - PAGE_MARGIN_RIGHT;
    let mut runs: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut used = 0.0;
    for (m, &w) in natural.iter().enumerate() {
        let prefix = if runs.is_empty() { CLEF_SPACE + TIME_SIG_SPACE } else { CLEF_SPACE };
        let available = content_right - PAGE_MARGIN_LEFT - prefix;
        if !current.is_empty() && used + w > available {
            runs.push(std::mem::take(&mut current));
            used = 0.0;
        }
        current.push(m);
        used += w;
    }
    if !current.is_empty() {
        runs.push(current);
    }

    // Stretch each run to the full width; a short final line keeps its
    // natural spacing.
    let mut systems = Vec::with_capacity(runs.len());
    let mut sys_y = FIRST_SYSTEM_TOP;
    let run_count = runs.len();
    for (i, run) in runs.into_iter().enumerate() {
        let first = i == 0;
        let prefix = if first { CLEF_SPACE + TIME_SIG_SPACE } else { CLEF_SPACE };
        let x_start = PAGE_MARGIN_LEFT + prefix;
        let available = content_right - x_start;
        let total: f64 = run.iter().map(|&m| natural[m]).sum();
        let last = i + 1 == run_count;
        let scale = if total > 0.0 && !(last && total < available * 0.6) {
            (available / total).max(1.0)
        } else {
            1.0
        };

        let mut x = x_start;
        let mut measures = Vec::with_capacity(run.len());
        for m in run {
            let width = natural[m] * scale;
            measures.push(MeasureLayout { measure_idx: m, x, width });
            x += width;
        }
        systems.push(SystemLayout { y: sys_y, x_end: x, measures, first });
        sys_y += system_height + SYSTEM_SPACING;
    }

    let total_height = if systems.is_empty() {
        FIRST_SYSTEM_TOP + PAGE_MARGIN_BOTTOM
    } else {
        sys_y - SYSTEM_SPACING + PAGE_MARGIN_BOTTOM + LYRIC_OFFSET_Y
    };

    ScoreLayout { systems, staves, total_height }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(duration: i32, chord: bool) -> Note {
        Note { duration, chord, voice: Some(1), ..Default::default() }
    }

    #[test]
    fn chord_members_share_onset() {
        let notes = vec![note(2, false), note(2, true), note(1, false)];
        let onsets = note_onsets(&notes, 2);
        assert_eq!(onsets, vec![Some(0.0), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn voices_track_time_independently() {
        let mut v2 = note(4, false);
        v2.voice = Some(2);
        let notes = vec![note(2, false), note(2, false), v2];
        assert_eq!(note_onsets(&notes, 2), vec![Some(0.0), Some(1.0), Some(0.0)]);
    }

    #[test]
    fn long_scores_wrap_into_systems() {
        let mut part = Part { id: "P1".into(), ..Default::default() };
        for n in 0..40 {
            let notes = (0..4).map(|_| note(1, false)).collect();
            part.measures.push(Measure { number: n + 1, notes, ..Default::default() });
        }
        let score = Score { parts: vec![part], ..Default::default() };
        let layout = compute_layout(&score, 820.0);
        assert!(layout.systems.len() > 1);
        for sys in &layout.systems {
            assert!(sys.x_end <= 820.0 - PAGE_MARGIN_RIGHT + 0.001);
        }
        let placed: usize = layout.systems.iter().map(|s| s.measures.len()).sum();
        assert_eq!(placed, 40);
    }
}
