//! Runtime configuration: service mode, base URL, mutation marker codes and
//! the JSON-loadable [`Settings`] bundle.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::Result;
use crate::pianoroll::PianoRollConfig;
use crate::renderer::RenderOptions;

/// Base URL of the processing service when running locally.
pub const DEV_API_URL: &str = "http://localhost:8000";

/// Environment variable consulted by [`Mode::from_env`].
pub const MODE_ENV_VAR: &str = "SCOREFX_MODE";

/// Build/runtime mode, which decides the service base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    /// Read the mode from `SCOREFX_MODE` ("production"/"prod", anything else
    /// is development).
    pub fn from_env() -> Self {
        match std::env::var(MODE_ENV_VAR) {
            Ok(v) if matches!(v.trim().to_ascii_lowercase().as_str(), "production" | "prod") => {
                Mode::Production
            }
            _ => Mode::Development,
        }
    }

    /// Production builds talk to the service on the same origin.
    pub fn api_url(&self) -> &'static str {
        match self {
            Mode::Development => DEV_API_URL,
            Mode::Production => "",
        }
    }
}

/// Kinds of mutation the processing service applies to a score. Mutated
/// notes carry the kind's short code as a lyric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum MutationKind {
    Insertion,
    Deletion,
    Transposition,
    Translocation,
    Inversion,
    Cure,
}

impl MutationKind {
    pub fn code(&self) -> &'static str {
        match self {
            MutationKind::Insertion => "i",
            MutationKind::Deletion => "d",
            MutationKind::Transposition => "t",
            MutationKind::Translocation => "tl",
            MutationKind::Inversion => "iv",
            MutationKind::Cure => "c",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "i" => Some(MutationKind::Insertion),
            "d" => Some(MutationKind::Deletion),
            "t" => Some(MutationKind::Transposition),
            "tl" => Some(MutationKind::Translocation),
            "iv" => Some(MutationKind::Inversion),
            "c" => Some(MutationKind::Cure),
            _ => None,
        }
    }
}

/// Everything a viewer needs, loadable from JSON. Missing fields default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    /// Overrides the mode's base URL when set.
    pub api_url: Option<String>,
    pub render: RenderOptions,
    pub piano_roll: PianoRollConfig,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or_else(|| self.mode.api_url())
    }
}
