//! MusicXML parser — converts MusicXML XML into the Score data model.

use roxmltree::{Document, Node};

use crate::error::{Error, Result};
use crate::model::*;

/// Values read from the document are clamped to what a score can hold.
const MAX_STAVES: i32 = 16;
const MAX_ALTER: f64 = 2.0;

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| Error::Parse(format!("XML parse error: {e}")))?;
    let root = doc.root_element();

    if root.tag_name().name() != "score-partwise" {
        return Err(Error::Parse(format!(
            "unsupported root element '{}', only 'score-partwise' is supported",
            root.tag_name().name()
        )));
    }

    let mut score = Score::new();
    score.version = root.attribute("version").map(String::from);

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "work" => parse_work(&child, &mut score),
            "identification" => parse_identification(&child, &mut score),
            "credit" => parse_credit(&child, &mut score),
            "part-list" => parse_part_list(&child, &mut score),
            "part" => parse_part(&child, &mut score),
            _ => {}
        }
    }

    if score.parts.is_empty() {
        return Err(Error::Parse("score has no parts".to_string()));
    }

    log::debug!(
        "parsed score {:?}: {} parts, {} notes",
        score.title,
        score.parts.len(),
        score.note_count()
    );
    Ok(score)
}

// ─── Header ──────────────────────────────────────────────────────────

fn parse_work(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        // <credit type="title"> takes priority
        if child.tag_name().name() == "work-title" && score.title.is_none() {
            score.title = text_of(&child);
        }
    }
}

fn parse_identification(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "creator"
            && child.attribute("type") == Some("composer")
            && score.composer.is_none()
        {
            score.composer = text_of(&child);
        }
    }
}

fn parse_credit(node: &Node, score: &mut Score) {
    let mut credit_type = String::new();
    let mut credit_text = String::new();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "credit-type" => credit_type = text_of(&child).unwrap_or_default(),
            "credit-words" => {
                if let Some(text) = text_of(&child) {
                    if !credit_text.is_empty() {
                        credit_text.push('\n');
                    }
                    credit_text.push_str(&text);
                }
            }
            _ => {}
        }
    }

    if credit_text.is_empty() {
        return;
    }
    match credit_type.as_str() {
        "title" => score.title = Some(credit_text),
        "composer" => score.composer = Some(credit_text),
        _ => {}
    }
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() != "score-part" {
            continue;
        }
        let mut part = Part {
            id: child.attribute("id").unwrap_or("").to_string(),
            ..Default::default()
        };

        for sp_child in child.children().filter(|n| n.is_element()) {
            match sp_child.tag_name().name() {
                "part-name" => part.name = text_of(&sp_child).unwrap_or_default(),
                "midi-instrument" => {
                    for midi in sp_child.children().filter(|n| n.is_element()) {
                        if midi.tag_name().name() == "midi-program" {
                            part.midi_program = parse_i32(&midi);
                        }
                    }
                }
                _ => {}
            }
        }

        score.parts.push(part);
    }
}

// ─── Part (measures) ─────────────────────────────────────────────────

fn parse_part(node: &Node, score: &mut Score) {
    let part_id = node.attribute("id").unwrap_or("");

    // Parts missing from the part-list are ignored
    let part = match score.parts.iter_mut().find(|p| p.id == part_id) {
        Some(p) => p,
        None => return,
    };

    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "measure" {
            part.measures.push(parse_measure(&child));
        }
    }
}

fn parse_measure(node: &Node) -> Measure {
    let mut measure = Measure {
        number: node
            .attribute("number")
            .and_then(|n| n.parse::<i32>().ok())
            .unwrap_or(0),
        ..Default::default()
    };

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => measure.attributes = Some(parse_attributes(&child)),
            "note" => measure.notes.push(parse_note(&child)),
            "sound" => {
                if let Some(t) = parse_tempo(&child) {
                    measure.tempo = Some(t);
                }
            }
            "direction" => {
                for sound in child.children().filter(|n| n.has_tag_name("sound")) {
                    if let Some(t) = parse_tempo(&sound) {
                        measure.tempo = Some(t);
                    }
                }
            }
            _ => {}
        }
    }

    measure
}

fn parse_tempo(node: &Node) -> Option<f64> {
    node.attribute("tempo")
        .and_then(|t| t.trim().parse::<f64>().ok())
        .filter(|t| *t > 0.0)
}

// ─── Attributes ──────────────────────────────────────────────────────

fn parse_attributes(node: &Node) -> Attributes {
    let mut attrs = Attributes::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "divisions" => attrs.divisions = parse_i32(&child),
            "key" => {
                let fifths = child
                    .children()
                    .find(|n| n.has_tag_name("fifths"))
                    .and_then(|n| parse_i32(&n))
                    .unwrap_or(0);
                attrs.key = Some(Key { fifths });
            }
            "time" => attrs.time = Some(parse_time(&child)),
            "staves" => attrs.staves = parse_i32(&child).map(|s| s.clamp(1, MAX_STAVES)),
            "clef" => attrs.clefs.push(parse_clef(&child)),
            _ => {}
        }
    }

    attrs
}

fn parse_time(node: &Node) -> TimeSignature {
    let mut ts = TimeSignature::default();
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "beats" => ts.beats = parse_i32(&child).unwrap_or(4),
            "beat-type" => ts.beat_type = parse_i32(&child).unwrap_or(4),
            _ => {}
        }
    }
    ts
}

fn parse_clef(node: &Node) -> Clef {
    let mut clef = Clef {
        number: node
            .attribute("number")
            .and_then(|n| n.parse::<i32>().ok())
            .map_or(1, |n| n.clamp(1, MAX_STAVES)),
        ..Default::default()
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "sign" => clef.sign = text_of(&child).unwrap_or_else(|| "G".to_string()),
            "line" => clef.line = parse_i32(&child).map_or(2, |l| l.clamp(1, 5)),
            _ => {}
        }
    }
    clef
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node) -> Note {
    let mut note = Note::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pitch" => note.pitch = Some(parse_pitch(&child)),
            "duration" => note.duration = parse_i32(&child).unwrap_or(0),
            "voice" => note.voice = parse_i32(&child),
            "staff" => note.staff = parse_i32(&child).map(|s| s.clamp(1, MAX_STAVES)),
            "type" => note.note_type = text_of(&child),
            "stem" => note.stem = text_of(&child),
            "rest" => {
                note.rest = true;
                note.measure_rest = child.attribute("measure") == Some("yes");
            }
            "grace" => note.grace = true,
            "chord" => note.chord = true,
            "dot" => note.dot = true,
            "lyric" => {
                let number = child
                    .attribute("number")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(1);
                let text = child
                    .children()
                    .find(|n| n.has_tag_name("text"))
                    .and_then(|n| text_of(&n));
                if let Some(text) = text {
                    note.lyrics.push(Lyric { number, text });
                }
            }
            _ => {}
        }
    }

    note
}

fn parse_pitch(node: &Node) -> Pitch {
    let mut pitch = Pitch {
        step: "C".to_string(),
        octave: 4,
        alter: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => pitch.step = text_of(&child).unwrap_or_else(|| "C".to_string()),
            "octave" => pitch.octave = parse_i32(&child).map_or(4, |o| o.clamp(0, 9)),
            "alter" => {
                pitch.alter = parse_f64(&child)
                    .filter(|a| a.is_finite())
                    .map(|a| a.clamp(-MAX_ALTER, MAX_ALTER))
            }
            _ => {}
        }
    }
    pitch
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn text_of(node: &Node) -> Option<String> {
    node.text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn parse_i32(node: &Node) -> Option<i32> {
    node.text()?.trim().parse().ok()
}

fn parse_f64(node: &Node) -> Option<f64> {
    node.text()?.trim().parse().ok()
}
