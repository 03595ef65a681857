//! Piano-roll drawing from hand-built sequences and MIDI bytes.

mod common;

use pretty_assertions::assert_eq;
use scorefx::sequence::{SequenceNote, Tempo, TimeSignatureEvent};
use scorefx::{
    render_sequence, Effect, Error, NoteSequence, PianoRoll, PianoRollConfig, SvgDocument, Viewer,
};

use common::{init_logger, DUET};

fn note(pitch: u8, start: f64, end: f64, velocity: Option<u8>) -> SequenceNote {
    SequenceNote {
        pitch,
        start_time: start,
        end_time: end,
        velocity,
        instrument: 1,
        program: 40,
        is_drum: false,
    }
}

fn sequence() -> NoteSequence {
    NoteSequence {
        notes: vec![note(60, 0.0, 0.5, Some(80)), note(64, 0.5, 1.0, None), note(67, 1.0, 2.0, Some(0))],
        tempos: vec![Tempo { time: 0.0, qpm: 120.0 }],
        time_signatures: vec![TimeSignatureEvent { time: 0.0, numerator: 2, denominator: 4 }],
        total_time: 2.0,
    }
}

#[test]
fn draws_one_rect_per_note_with_geometry() {
    init_logger();
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let roll = PianoRoll::draw(&sequence(), &PianoRollConfig::default(), &mut doc, root).unwrap();

    // pitch 58..69 after padding, 6px per semitone, 30px per second
    assert_eq!((roll.min_pitch(), roll.max_pitch()), (58, 69));
    assert_eq!(roll.width(), 60.0);
    assert_eq!(roll.height(), 66.0);
    assert_eq!(doc.attribute(root, "width"), Some("60"));
    assert_eq!(doc.style_property(root, "height"), Some("66px"));

    assert_eq!(roll.notes().len(), 3);
    let first = roll.notes()[0];
    let attrs: Vec<(&str, &str)> = doc.attributes(first).collect();
    assert_eq!(
        attrs,
        vec![
            ("class", "note"),
            ("fill", "rgba(166, 206, 227, 1)"),
            ("x", "0"),
            ("y", "54"),
            ("width", "14"),
            ("height", "6"),
            ("data-index", "0"),
            ("data-instrument", "1"),
            ("data-program", "40"),
            ("data-is-drum", "false"),
            ("data-pitch", "60"),
        ]
    );
    assert_eq!(doc.style_property(first, "--midi-velocity"), Some("80"));
}

#[test]
fn missing_velocity_is_full_opacity_and_127() {
    init_logger();
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let roll = PianoRoll::draw(&sequence(), &PianoRollConfig::default(), &mut doc, root).unwrap();

    let second = roll.notes()[1];
    assert_eq!(doc.attribute(second, "fill"), Some("rgba(251, 154, 153, 1)"));
    assert_eq!(doc.style_property(second, "--midi-velocity"), Some("127"));

    // velocity 0 is also drawn fully opaque, but keeps its own value
    let third = roll.notes()[2];
    assert_eq!(doc.attribute(third, "fill"), Some("rgba(255, 127, 0, 1)"));
    assert_eq!(doc.style_property(third, "--midi-velocity"), Some("0"));
}

#[test]
fn bar_separators_sit_on_whole_bars() {
    init_logger();
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let roll = PianoRoll::draw(&sequence(), &PianoRollConfig::default(), &mut doc, root).unwrap();

    // 2/4 at 120 qpm: a bar per second, last onset at quarter 2
    let xs: Vec<&str> = roll.bars().iter().map(|&b| doc.attribute(b, "x").unwrap()).collect();
    assert_eq!(xs, vec!["0", "30"]);
    for &bar in roll.bars() {
        assert_eq!(doc.attribute(bar, "fill"), Some("black"));
        assert_eq!(doc.attribute(bar, "width"), Some("1"));
        assert_eq!(doc.attribute(bar, "height"), Some("66"));
    }
}

#[test]
fn surface_must_be_svg() {
    init_logger();
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let g = doc.create_element(root, "g");
    let err = PianoRoll::draw(&sequence(), &PianoRollConfig::default(), &mut doc, g).unwrap_err();
    assert!(matches!(err, Error::InvalidSurface(ref tag) if tag == "g"));
    assert!(doc.children(g).is_empty());
}

#[test]
fn redraw_clears_the_surface() {
    init_logger();
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let config = PianoRollConfig::default();
    PianoRoll::draw(&sequence(), &config, &mut doc, root).unwrap();
    let roll = PianoRoll::draw(&sequence(), &config, &mut doc, root).unwrap();
    assert_eq!(doc.children(root).len(), roll.notes().len() + roll.bars().len());
}

#[test]
fn rendered_sequence_accepts_effects() {
    init_logger();
    let mut scene = render_sequence(&sequence(), &PianoRollConfig::default()).unwrap();
    assert_eq!(scene.note_groups().len(), 3);

    let loud = scene.groups_with_data("pitch", "67");
    assert_eq!(loud.len(), 1);
    scene.init_scope("roll").unwrap();
    scene.apply(&Effect::Waves(6.0), "roll", &loud).unwrap();

    let node = scene.group(loud[0]).unwrap().node();
    assert_eq!(scene.document().attribute(node, "filter"), Some("url(#roll-filter)"));
    assert_eq!(scene.document().attribute(node, "id"), Some("pr-2"));
}

#[test]
fn midi_file_through_the_viewer() {
    init_logger();
    let track: Vec<u8> = vec![
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // 120 qpm
        0x00, 0x90, 72, 64,
        0x81, 0x40, 0x80, 72, 0, // 192 ticks later
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut bytes = b"MThd".to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&track);

    let mut viewer = Viewer::default();
    let scene = viewer.show_midi_bytes(&bytes).unwrap();
    assert_eq!(scene.note_groups().len(), 1);
    let node = scene.note_groups()[0].node();
    let doc = scene.document();
    assert_eq!(doc.attribute(node, "width"), Some("29"));
    assert_eq!(doc.style_property(node, "--midi-velocity"), Some("64"));
}

#[test]
fn score_converts_to_a_sequence() {
    init_logger();
    let score = scorefx::load_source("duet.musicxml", DUET.as_bytes()).unwrap();
    let seq = NoteSequence::from_score(&score);
    // the rest is skipped, the chord contributes two notes
    assert_eq!(seq.notes.len(), 7);
    assert_eq!(seq.total_time, 4.0);
    assert!(seq.notes.iter().all(|n| n.velocity.is_none()));
}

#[test]
fn one_octave_without_dynamics_is_fully_opaque() {
    init_logger();
    let seq = NoteSequence {
        notes: (0..12).map(|p| note(p, p as f64 * 0.5, p as f64 * 0.5 + 0.5, None)).collect(),
        total_time: 6.0,
        ..Default::default()
    };
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let roll = PianoRoll::draw(&seq, &PianoRollConfig::default(), &mut doc, root).unwrap();

    assert_eq!((roll.min_pitch(), roll.max_pitch()), (-2, 13));
    assert_eq!(roll.height(), 90.0);
    assert_eq!(doc.attribute(roll.notes()[0], "y"), Some("78"));
    for &rect in roll.notes() {
        let fill = doc.attribute(rect, "fill").unwrap();
        assert!(fill.ends_with(", 1)"), "{fill} is not opaque");
        assert_eq!(doc.style_property(rect, "--midi-velocity"), Some("127"));
    }
}

#[test]
fn empty_sequence_draws_an_empty_roll() {
    init_logger();
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let roll = PianoRoll::draw(&NoteSequence::default(), &PianoRollConfig::default(), &mut doc, root).unwrap();
    assert_eq!(roll.width(), 0.0);
    assert!(roll.notes().is_empty());
    assert!(roll.bars().is_empty());
    assert!(doc.children(root).is_empty());
}

#[test]
fn tiny_time_signature_keeps_bar_count_bounded() {
    init_logger();
    let seq = NoteSequence {
        notes: vec![note(60, 60.0, 60.5, Some(90))],
        tempos: vec![Tempo { time: 0.0, qpm: 120.0 }],
        time_signatures: vec![TimeSignatureEvent { time: 0.0, numerator: 1, denominator: 65536 }],
        total_time: 60.5,
    };
    let mut doc = SvgDocument::new(10.0, 10.0);
    let root = doc.root();
    let roll = PianoRoll::draw(&seq, &PianoRollConfig::default(), &mut doc, root).unwrap();
    // one bar per 1/64 note up to quarter 120
    assert_eq!(roll.bars().len(), 1921);
}
