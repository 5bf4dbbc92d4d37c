use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use glyph_cache::Aborted;
use glyph_model::ModelErr;

/// Why a glyph request didn't produce an image.
#[derive(Debug, Clone, PartialEq)]
pub enum FontErr {
    /// The network rejected the request or failed evaluating it.
    Model(ModelErr),
    /// The computation never finished.
    Aborted(String),
}

impl Display for FontErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontErr::Model(e) => write!(f, "{e}"),
            FontErr::Aborted(reason) => write!(f, "glyph computation aborted: {reason}"),
        }
    }
}

impl Error for FontErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FontErr::Model(e) => Some(e),
            FontErr::Aborted(_) => None,
        }
    }
}

impl From<ModelErr> for FontErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}

impl From<Aborted> for FontErr {
    fn from(value: Aborted) -> Self {
        Self::Aborted(value.reason().to_string())
    }
}

/// Errors raised while reading the explorer configuration.
#[derive(Debug)]
pub enum ConfigErr {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(e) => write!(f, "invalid config: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}
