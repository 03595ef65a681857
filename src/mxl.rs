//! Score source ingestion: turns a named byte source into a [`Score`].
//!
//! An .mxl file is a ZIP archive containing:
//!   - META-INF/container.xml  — the archive manifest
//!   - <rootfile>.xml          — the actual MusicXML content
//!   - (optional) other files  — images, sounds, etc.
//!
//! Exactly one MusicXML payload besides the manifest is accepted.

use std::io::{Cursor, Read};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::Score;
use crate::parser;

const CONTAINER_PATH: &str = "META-INF/container.xml";
const BOM: char = '\u{feff}';

/// Load a score from raw bytes. `name` is the file name the bytes came
/// from; a `.mxl` suffix marks a compressed container.
pub fn load_source(name: &str, data: &[u8]) -> Result<Score> {
    let text = if is_compressed(name) {
        extract_payload(data)?
    } else {
        String::from_utf8_lossy(data).into_owned()
    };
    let xml = normalize_text(&text)?;
    parser::parse_musicxml(xml)
}

/// Load a score from disk, detecting the container from the extension.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Score> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::info!("loading score {} ({} bytes)", path.display(), data.len());
    load_source(&name, &data)
}

fn is_compressed(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".mxl")
}

/// Pull the single MusicXML payload out of an .mxl archive.
pub fn extract_payload(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::InvalidArchive(format!("failed to open archive: {e}")))?;

    let candidates: Vec<String> = archive
        .file_names()
        .filter(|name| name.ends_with(".xml") && *name != CONTAINER_PATH)
        .map(String::from)
        .collect();

    let name = match candidates.as_slice() {
        [only] => only.clone(),
        [] => return Err(Error::InvalidArchive("no MusicXML payload found".to_string())),
        many => {
            return Err(Error::InvalidArchive(format!(
                "expected one MusicXML payload, found {}: {:?}",
                many.len(),
                many
            )))
        }
    };

    let mut entry = archive
        .by_name(&name)
        .map_err(|e| Error::InvalidArchive(format!("cannot open '{name}': {e}")))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| Error::InvalidArchive(format!("cannot read '{name}': {e}")))?;

    log::debug!("extracted '{}' ({} bytes) from archive", name, bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Strip a byte-order mark, trim only when the text starts with
/// whitespace, and require an XML declaration at the start.
pub fn normalize_text(text: &str) -> Result<&str> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let text = if text.starts_with(char::is_whitespace) {
        text.trim()
    } else {
        text
    };
    // the first character is sometimes a stray NUL, so look a little further
    let head: String = text.chars().take(6).collect();
    if head.contains("<?xml") {
        Ok(text.trim_start_matches('\0'))
    } else {
        Err(Error::NotXml)
    }
}
