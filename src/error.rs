//! Error type shared by ingestion, rendering and the effect pipeline.

use thiserror::Error;

/// Everything that can go wrong in scorefx.
#[derive(Debug, Error)]
pub enum Error {
    /// A compressed score did not contain exactly one MusicXML payload.
    #[error("invalid MXL archive: {0}")]
    InvalidArchive(String),

    /// The decoded payload does not start with an XML declaration.
    #[error("document does not begin with an XML declaration")]
    NotXml,

    /// The XML is not a usable score-partwise document.
    #[error("score parse error: {0}")]
    Parse(String),

    /// A piano roll was asked to draw into something other than an `<svg>`.
    #[error("drawing surface must be an <svg> element, got <{0}>")]
    InvalidSurface(String),

    /// A filter-backed effect referenced a scope that was never initialized.
    #[error("filter scope '{0}' not found")]
    NotFound(String),

    /// `init_scope` was called twice for the same scope id.
    #[error("filter scope '{0}' already initialized")]
    AlreadyInitialized(String),

    #[error("unknown effect '{0}'")]
    UnknownEffect(String),

    #[error("MIDI error: {0}")]
    Midi(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
