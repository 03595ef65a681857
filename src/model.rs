//! Data model for a parsed MusicXML score.
//!
//! Only what the renderer and the effect pipeline consume is kept: layout
//! of parts and measures, pitch and duration of notes, and the lyrics the
//! processing service uses to tag mutated notes.

use serde::{Deserialize, Serialize};

/// A complete musical score parsed from MusicXML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece
    pub title: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Musical parts (instruments)
    pub parts: Vec<Part>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Piano")
    pub name: String,
    /// MIDI program number
    pub midi_program: Option<i32>,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measure {
    pub number: i32,
    /// Attributes (key, time, clef), only present when they change
    pub attributes: Option<Attributes>,
    /// Notes and rests in document order
    pub notes: Vec<Note>,
    /// Tempo from a `<sound tempo>` in this measure, in quarter notes per minute
    pub tempo: Option<f64>,
}

/// Musical attributes that may change at the start of a measure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Divisions per quarter note
    pub divisions: Option<i32>,
    pub key: Option<Key>,
    pub time: Option<TimeSignature>,
    /// One clef per staff, tagged with its staff number
    pub clefs: Vec<Clef>,
    /// Number of staves in this part (e.g. 2 for piano)
    pub staves: Option<i32>,
}

/// Key signature. Not drawn; carried for the JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: i32,
    pub beat_type: i32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats: 4, beat_type: 4 }
    }
}

impl TimeSignature {
    /// Length of one bar in quarter notes.
    pub fn quarters(&self) -> f64 {
        self.beats.max(1) as f64 * 4.0 / self.beat_type.max(1) as f64
    }
}

/// Clef definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clef {
    /// Staff number this clef belongs to (1-based)
    pub number: i32,
    /// "G", "F" or "C"
    pub sign: String,
    /// Staff line the clef sits on
    pub line: i32,
}

impl Default for Clef {
    fn default() -> Self {
        Self { number: 1, sign: "G".to_string(), line: 2 }
    }
}

/// A single note or rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    /// Pitch (None for rests)
    pub pitch: Option<Pitch>,
    /// Duration in divisions
    pub duration: i32,
    pub voice: Option<i32>,
    /// "whole", "half", "quarter", "eighth", "16th", ...
    pub note_type: Option<String>,
    /// "up" or "down"
    pub stem: Option<String>,
    pub rest: bool,
    /// Whole-measure rest (`<rest measure="yes">`)
    pub measure_rest: bool,
    /// Shares its onset with the previous note
    pub chord: bool,
    pub grace: bool,
    pub dot: bool,
    /// Staff number (1-based)
    pub staff: Option<i32>,
    pub lyrics: Vec<Lyric>,
}

impl Note {
    /// Lyric texts, which double as mutation markers.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.lyrics.iter().map(|l| l.text.as_str())
    }
}

/// Pitch of a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pitch {
    /// A–G
    pub step: String,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Chromatic alteration in semitones
    pub alter: Option<f64>,
}

/// A lyric syllable attached to a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lyric {
    pub number: i32,
    pub text: String,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of measures in the first part.
    pub fn measure_count(&self) -> usize {
        self.parts.first().map_or(0, |p| p.measures.len())
    }

    /// Number of notes and rests across all parts.
    pub fn note_count(&self) -> usize {
        self.parts
            .iter()
            .flat_map(|p| p.measures.iter())
            .map(|m| m.notes.len())
            .sum()
    }
}

impl Part {
    /// Number of staves used by the part.
    pub fn staff_count(&self) -> usize {
        let mut max_staff = 1usize;
        for measure in &self.measures {
            if let Some(ref attrs) = measure.attributes {
                if let Some(s) = attrs.staves {
                    max_staff = max_staff.max(s.max(1) as usize);
                }
                for clef in &attrs.clefs {
                    max_staff = max_staff.max(clef.number.max(1) as usize);
                }
            }
            for note in &measure.notes {
                if let Some(s) = note.staff {
                    max_staff = max_staff.max(s.max(1) as usize);
                }
            }
        }
        max_staff
    }
}

impl Pitch {
    /// Convert pitch to MIDI note number. Middle C (C4) = 60.
    pub fn to_midi(&self) -> i32 {
        let step_semitone = match self.step.as_str() {
            "C" => 0,
            "D" => 2,
            "E" => 4,
            "F" => 5,
            "G" => 7,
            "A" => 9,
            "B" => 11,
            _ => 0,
        };
        let alter = self.alter.unwrap_or(0.0).round() as i32;
        (self.octave + 1) * 12 + step_semitone + alter
    }
}
