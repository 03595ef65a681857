//! Note sequences: the flat, time-in-seconds note list the piano roll draws.
//!
//! A sequence comes either from a Standard MIDI File (via `midly`) or from a
//! parsed [`Score`].

use std::collections::HashMap;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Measure, Score, TimeSignature};

/// Tempo assumed until the first tempo event.
pub const DEFAULT_QPM: f64 = 120.0;
const DEFAULT_US_PER_QUARTER: f64 = 500_000.0;
const DRUM_CHANNEL: u8 = 9;
/// Largest time-signature denominator power accepted from a file (1/64).
const MAX_DENOMINATOR_POW: u8 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceNote {
    pub pitch: u8,
    /// Seconds
    pub start_time: f64,
    pub end_time: f64,
    /// None when the source carries no dynamics
    pub velocity: Option<u8>,
    pub instrument: u32,
    pub program: u8,
    pub is_drum: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    pub time: f64,
    /// Quarter notes per minute
    pub qpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSignatureEvent {
    pub time: f64,
    pub numerator: u32,
    pub denominator: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteSequence {
    pub notes: Vec<SequenceNote>,
    pub tempos: Vec<Tempo>,
    pub time_signatures: Vec<TimeSignatureEvent>,
    pub total_time: f64,
}

impl NoteSequence {
    /// Highest and lowest pitch, or `None` for an empty sequence.
    pub fn pitch_range(&self) -> Option<(u8, u8)> {
        let min = self.notes.iter().map(|n| n.pitch).min()?;
        let max = self.notes.iter().map(|n| n.pitch).max()?;
        Some((min, max))
    }

    /// Tempo of the sequence start.
    pub fn initial_qpm(&self) -> f64 {
        self.tempos.first().map_or(DEFAULT_QPM, |t| t.qpm)
    }

    /// Seconds to quarter notes at the initial tempo, rounded to 1/16.
    pub fn time_to_quarters(&self, time: f64) -> f64 {
        let q = time * self.initial_qpm() / 60.0;
        (q * 16.0).round() / 16.0
    }

    /// Quarter notes to seconds, following every tempo change.
    pub fn quarters_to_time(&self, quarters: f64) -> f64 {
        let mut segments: Vec<(f64, f64)> = self
            .tempos
            .iter()
            .map(|t| (self.time_to_quarters(t.time), t.qpm))
            .filter(|&(_, qpm)| qpm > 0.0)
            .collect();
        if segments.first().map_or(true, |&(q, _)| q > 0.0) {
            segments.insert(0, (0.0, self.initial_qpm()));
        }
        quarters_to_seconds(&segments, quarters)
    }

    /// Parse a Standard MIDI File.
    pub fn from_midi(data: &[u8]) -> Result<NoteSequence> {
        from_midi(data)
    }

    /// Flatten a parsed score: one instrument per part, onsets from note
    /// durations, tempo from `<sound tempo>` marks in the first part.
    pub fn from_score(score: &Score) -> NoteSequence {
        from_score(score)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MIDI files
// ═══════════════════════════════════════════════════════════════════════

/// Parse a Standard MIDI File. All tracks are merged on a shared tempo map;
/// channel 10 is percussion and a note-on with velocity 0 ends the note.
pub fn from_midi(data: &[u8]) -> Result<NoteSequence> {
    let smf = Smf::parse(data).map_err(|e| Error::Midi(e.to_string()))?;
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(t) => t.as_int().max(1) as f64,
        Timing::Timecode(..) => {
            return Err(Error::Midi("timecode-based timing is not supported".to_string()))
        }
    };

    // Merge tracks on absolute ticks; the sort is stable so track order
    // breaks ties.
    let mut events = Vec::new();
    for (track_nr, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        for event in track.iter() {
            tick += event.delta.as_int() as u64;
            events.push((tick, track_nr, event.kind));
        }
    }
    events.sort_by_key(|&(tick, _, _)| tick);

    let mut seq = NoteSequence::default();
    let mut us_per_quarter = DEFAULT_US_PER_QUARTER;
    let mut last_tick = 0u64;
    let mut seconds = 0.0;
    let mut programs = [0u8; 16];
    let mut active: HashMap<(usize, u8, u8), Vec<(f64, u8, u8)>> = HashMap::new();

    for (tick, track_nr, kind) in events {
        seconds += (tick - last_tick) as f64 * us_per_quarter / ticks_per_beat / 1e6;
        last_tick = tick;

        match kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                let (on, key, vel) = match message {
                    MidiMessage::NoteOn { key, vel } => (vel.as_int() > 0, key.as_int(), vel.as_int()),
                    MidiMessage::NoteOff { key, vel } => (false, key.as_int(), vel.as_int()),
                    MidiMessage::ProgramChange { program } => {
                        programs[channel as usize] = program.as_int();
                        continue;
                    }
                    _ => continue,
                };
                let slot = active.entry((track_nr, channel, key)).or_default();
                if on {
                    slot.push((seconds, vel, programs[channel as usize]));
                } else if !slot.is_empty() {
                    let (start, vel, program) = slot.remove(0);
                    seq.notes.push(SequenceNote {
                        pitch: key,
                        start_time: start,
                        end_time: seconds,
                        velocity: Some(vel),
                        instrument: track_nr as u32,
                        program,
                        is_drum: channel == DRUM_CHANNEL,
                    });
                }
            }
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => {
                us_per_quarter = t.as_int().max(1) as f64;
                seq.tempos.push(Tempo { time: seconds, qpm: 60e6 / us_per_quarter });
            }
            TrackEventKind::Meta(MetaMessage::TimeSignature(num, denom_pow, _, _)) => {
                if denom_pow > MAX_DENOMINATOR_POW {
                    log::warn!("time signature denominator 2^{} clamped to 2^{}", denom_pow, MAX_DENOMINATOR_POW);
                }
                seq.time_signatures.push(TimeSignatureEvent {
                    time: seconds,
                    numerator: num.max(1) as u32,
                    denominator: 1u32 << denom_pow.min(MAX_DENOMINATOR_POW),
                });
            }
            _ => {}
        }
    }

    let dangling = active.values().map(Vec::len).sum::<usize>();
    if dangling > 0 {
        log::warn!("{} notes were never released; dropping them", dangling);
    }

    seq.notes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time).then(a.pitch.cmp(&b.pitch)));
    seq.total_time = seq.notes.iter().map(|n| n.end_time).fold(0.0, f64::max);
    log::debug!("parsed MIDI file: {} notes, {} tempo events", seq.notes.len(), seq.tempos.len());
    Ok(seq)
}

// ═══════════════════════════════════════════════════════════════════════
// Scores
// ═══════════════════════════════════════════════════════════════════════

/// Tempo changes in quarter-note positions, always starting at 0.
fn quarter_tempo_map(score: &Score, measure_starts: &[f64]) -> Vec<(f64, f64)> {
    let mut map = vec![(0.0, DEFAULT_QPM)];
    if let Some(part) = score.parts.first() {
        for (m, measure) in part.measures.iter().enumerate() {
            let Some(qpm) = measure.tempo.filter(|t| *t > 0.0) else { continue };
            let at = measure_starts.get(m).copied().unwrap_or(0.0);
            let last = map.len() - 1;
            if (map[last].0 - at).abs() < 1e-9 {
                map[last].1 = qpm;
            } else {
                map.push((at, qpm));
            }
        }
    }
    map
}

/// Integrate `quarters` over a tempo map of `(start quarter, qpm)` pairs.
fn quarters_to_seconds(map: &[(f64, f64)], quarters: f64) -> f64 {
    let mut time = 0.0;
    for (i, &(start, qpm)) in map.iter().enumerate() {
        if start >= quarters {
            break;
        }
        let end = map.get(i + 1).map_or(quarters, |&(next, _)| next.min(quarters));
        time += (end - start) * 60.0 / qpm;
    }
    time
}

pub fn from_score(score: &Score) -> NoteSequence {
    let mut seq = NoteSequence::default();

    // Measure starts and time signatures follow the first part.
    let mut measure_starts = Vec::new();
    let mut time_sigs: Vec<(f64, u32, u32)> = Vec::new();
    if let Some(part) = score.parts.first() {
        let mut divisions = 1;
        let mut time = TimeSignature::default();
        let mut pos = 0.0;
        for measure in &part.measures {
            if let Some(ref attrs) = measure.attributes {
                if let Some(d) = attrs.divisions {
                    divisions = d.max(1);
                }
                if let Some(t) = attrs.time {
                    time = t;
                    time_sigs.push((pos, t.beats.max(1) as u32, t.beat_type.max(1) as u32));
                }
            }
            measure_starts.push(pos);
            pos += measure_length(measure, divisions, time.quarters());
        }
    }

    let tempo_map = quarter_tempo_map(score, &measure_starts);
    seq.tempos = tempo_map
        .iter()
        .map(|&(q, qpm)| Tempo { time: quarters_to_seconds(&tempo_map, q), qpm })
        .collect();
    seq.time_signatures = time_sigs
        .into_iter()
        .map(|(q, numerator, denominator)| TimeSignatureEvent {
            time: quarters_to_seconds(&tempo_map, q),
            numerator,
            denominator,
        })
        .collect();

    for (pidx, part) in score.parts.iter().enumerate() {
        let program = part.midi_program.map_or(0, |p| (p - 1).clamp(0, 127) as u8);
        let mut divisions = 1;
        for (m, measure) in part.measures.iter().enumerate() {
            if let Some(d) = measure.attributes.as_ref().and_then(|a| a.divisions) {
                divisions = d.max(1);
            }
            let start = measure_starts.get(m).copied().unwrap_or(0.0);
            let div = divisions as f64;
            let mut voice_pos: HashMap<(i32, i32), f64> = HashMap::new();
            let mut last_onset = 0.0;
            for note in &measure.notes {
                if note.grace {
                    continue;
                }
                let key = (note.staff.unwrap_or(1), note.voice.unwrap_or(1));
                let length = note.duration.max(0) as f64 / div;
                let onset = if note.chord {
                    last_onset
                } else {
                    let pos = voice_pos.entry(key).or_insert(0.0);
                    let onset = *pos;
                    *pos += length;
                    last_onset = onset;
                    onset
                };
                let Some(ref pitch) = note.pitch else { continue };
                if note.rest {
                    continue;
                }
                let begin = start + onset;
                seq.notes.push(SequenceNote {
                    pitch: pitch.to_midi().clamp(0, 127) as u8,
                    start_time: quarters_to_seconds(&tempo_map, begin),
                    end_time: quarters_to_seconds(&tempo_map, begin + length),
                    velocity: None,
                    instrument: pidx as u32,
                    program,
                    is_drum: false,
                });
            }
        }
    }

    seq.notes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time).then(a.pitch.cmp(&b.pitch)));
    seq.total_time = seq.notes.iter().map(|n| n.end_time).fold(0.0, f64::max);
    seq
}

/// Length of a measure in quarters: the longest voice, or the bar length
/// for an empty measure.
fn measure_length(measure: &Measure, divisions: i32, bar_quarters: f64) -> f64 {
    let div = divisions.max(1) as f64;
    let mut voice_pos: HashMap<(i32, i32), f64> = HashMap::new();
    for note in &measure.notes {
        if note.grace || note.chord {
            continue;
        }
        let key = (note.staff.unwrap_or(1), note.voice.unwrap_or(1));
        *voice_pos.entry(key).or_insert(0.0) += note.duration.max(0) as f64 / div;
    }
    if measure.notes.is_empty() {
        bar_quarters
    } else {
        voice_pos.values().copied().fold(0.0, f64::max)
    }
}
