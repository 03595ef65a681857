//! Fixtures shared by the integration tests. Everything is built in memory.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One part, two 4/4 measures: C4 quarter (marked "i"), quarter rest,
/// E4+G4 chord, D4 quarter marked "d"; then a half note, a dotted quarter
/// and an eighth.
pub const DUET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="4.0">
  <work><work-title>Mutation Study</work-title></work>
  <identification><creator type="composer">Test Suite</creator></identification>
  <part-list>
    <score-part id="P1"><part-name>Piano</part-name></score-part>
  </part-list>
  <part id="P1">
    <measure number="1">
      <attributes><divisions>2</divisions>
        <time><beats>4</beats><beat-type>4</beat-type></time>
        <clef><sign>G</sign><line>2</line></clef></attributes>
      <sound tempo="120"/>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>2</duration>
        <voice>1</voice><type>quarter</type>
        <lyric number="1"><text>i</text></lyric></note>
      <note><rest/><duration>2</duration><voice>1</voice><type>quarter</type></note>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>2</duration>
        <voice>1</voice><type>quarter</type></note>
      <note><chord/><pitch><step>G</step><octave>4</octave></pitch><duration>2</duration>
        <voice>1</voice><type>quarter</type></note>
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>2</duration>
        <voice>1</voice><type>quarter</type>
        <lyric number="1"><text>d</text></lyric></note>
    </measure>
    <measure number="2">
      <note><pitch><step>A</step><octave>4</octave></pitch><duration>4</duration>
        <voice>1</voice><type>half</type></note>
      <note><pitch><step>B</step><octave>4</octave></pitch><duration>3</duration>
        <voice>1</voice><type>quarter</type><dot/></note>
      <note><pitch><step>C</step><octave>5</octave></pitch><duration>1</duration>
        <voice>1</voice><type>eighth</type></note>
    </measure>
  </part>
</score-partwise>
"#;

/// Zip the given entries with no compression.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container><rootfiles><rootfile full-path="score.xml"/></rootfiles></container>
"#;

pub fn duet_scene() -> scorefx::Scene {
    scorefx::render_bytes("duet.musicxml", DUET.as_bytes(), &scorefx::RenderOptions::default())
        .unwrap()
}
