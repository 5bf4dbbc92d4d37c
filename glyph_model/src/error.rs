use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used across the glyph model crate.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// Errors raised while validating parameters or evaluating the network.
///
/// Per-request variants (`InvalidCharacter`, `EmptyCharacter`, `EmbeddingLength`,
/// `ComputeFailure`) only concern the caller that triggered them, the rest are
/// configuration errors that should stop the process before serving requests.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelErr {
    InvalidCharacter(char),
    EmptyCharacter,
    ModelNotLoaded,
    ModelAlreadyLoaded,
    ShapeMismatch {
        what: String,
        got: usize,
        expected: usize,
    },
    MissingParameter(String),
    EmbeddingLength {
        got: usize,
        expected: usize,
    },
    ComputeFailure(String),
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelErr::InvalidCharacter(c) => {
                format!("The character {c:?} is not one of the supported glyphs")
            }
            ModelErr::EmptyCharacter => "The requested character is empty".to_string(),
            ModelErr::ModelNotLoaded => {
                "Inference was requested before the model parameters were loaded".to_string()
            }
            ModelErr::ModelAlreadyLoaded => "The model parameters were already loaded".to_string(),
            ModelErr::ShapeMismatch {
                what,
                got,
                expected,
            } => format!("There's a shape mismatch in {what}, got {got} and expected {expected}"),
            ModelErr::MissingParameter(name) => {
                format!("The checkpoint is missing the variable {name}")
            }
            ModelErr::EmbeddingLength { got, expected } => {
                format!("The embedding has {got} values but the model expects {expected}")
            }
            ModelErr::ComputeFailure(detail) => format!("Inference failed: {detail}"),
        };

        write!(f, "{s}")
    }
}

impl Error for ModelErr {}

/// Errors raised while reading a checkpoint from disk.
#[derive(Debug)]
pub enum LoadErr {
    Io(io::Error),
    Format(String),
    UnsupportedTensor { name: String, detail: String },
    Model(ModelErr),
}

impl Display for LoadErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadErr::Io(e) => write!(f, "io error: {e}"),
            LoadErr::Format(detail) => write!(f, "invalid checkpoint: {detail}"),
            LoadErr::UnsupportedTensor { name, detail } => {
                write!(f, "unsupported tensor {name}: {detail}")
            }
            LoadErr::Model(e) => write!(f, "invalid parameters: {e}"),
        }
    }
}

impl Error for LoadErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadErr::Io(e) => Some(e),
            LoadErr::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ModelErr> for LoadErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}
