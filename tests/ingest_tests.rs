//! Score ingestion: plain MusicXML, MXL containers and the text checks in
//! between.

mod common;

use pretty_assertions::assert_eq;
use scorefx::{load_source, mxl, render_bytes, score_to_json, Error, RenderOptions};

use common::{init_logger, zip_archive, CONTAINER_XML, DUET};

#[test]
fn plain_musicxml_loads() {
    init_logger();
    let score = load_source("duet.musicxml", DUET.as_bytes()).unwrap();
    assert_eq!(score.title.as_deref(), Some("Mutation Study"));
    assert_eq!(score.composer.as_deref(), Some("Test Suite"));
    assert_eq!(score.measure_count(), 2);
    assert_eq!(score.note_count(), 8);
}

#[test]
fn single_payload_archive_loads() {
    init_logger();
    let data = zip_archive(&[("META-INF/container.xml", CONTAINER_XML), ("score.xml", DUET)]);
    let score = load_source("duet.mxl", &data).unwrap();
    assert_eq!(score.parts[0].name, "Piano");
    assert_eq!(score.note_count(), 8);
}

#[test]
fn upper_case_extension_is_still_an_archive() {
    init_logger();
    let data = zip_archive(&[("score.xml", DUET)]);
    assert!(load_source("DUET.MXL", &data).is_ok());
}

#[test]
fn two_payload_archive_is_rejected() {
    init_logger();
    let data = zip_archive(&[
        ("META-INF/container.xml", CONTAINER_XML),
        ("score.xml", DUET),
        ("parts/other.xml", DUET),
    ]);
    assert!(matches!(load_source("two.mxl", &data), Err(Error::InvalidArchive(_))));
}

#[test]
fn archive_without_payload_is_rejected() {
    init_logger();
    let data = zip_archive(&[("META-INF/container.xml", CONTAINER_XML), ("cover.png", "png")]);
    assert!(matches!(mxl::extract_payload(&data), Err(Error::InvalidArchive(_))));
}

#[test]
fn bom_and_leading_whitespace_are_tolerated() {
    init_logger();
    let padded = format!("\u{feff}\n\n  {DUET}");
    assert!(load_source("padded.musicxml", padded.as_bytes()).is_ok());
}

#[test]
fn missing_declaration_is_not_xml() {
    init_logger();
    let body = DUET.split_once("?>").unwrap().1;
    assert!(matches!(load_source("bare.musicxml", body.as_bytes()), Err(Error::NotXml)));
}

#[test]
fn declaration_must_open_the_document() {
    init_logger();
    let late = format!("<!-- c -->{DUET}");
    assert!(matches!(load_source("late.xml", late.as_bytes()), Err(Error::NotXml)));
}

#[test]
fn timewise_root_is_a_parse_error() {
    init_logger();
    let xml = r#"<?xml version="1.0"?><score-timewise version="4.0"><part-list/></score-timewise>"#;
    assert!(matches!(load_source("tw.musicxml", xml.as_bytes()), Err(Error::Parse(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    init_logger();
    let err = scorefx::load_file("/definitely/not/here.mxl").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn rendered_archive_matches_rendered_text() {
    init_logger();
    let data = zip_archive(&[("score.xml", DUET)]);
    let options = RenderOptions::default();
    let from_zip = render_bytes("duet.mxl", &data, &options).unwrap();
    let from_text = render_bytes("duet.musicxml", DUET.as_bytes(), &options).unwrap();
    assert_eq!(from_zip.to_svg_string(), from_text.to_svg_string());
}

#[test]
fn score_serializes_to_json() {
    init_logger();
    let score = load_source("duet.musicxml", DUET.as_bytes()).unwrap();
    let json = score_to_json(&score).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "Mutation Study");
    assert_eq!(value["parts"][0]["measures"][0]["notes"][0]["lyrics"][0]["text"], "i");
}
