use std::{
    error::Error,
    fmt::{self, Display},
};

/// A computation ended without producing a result, either because it panicked
/// or because the stream running it went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aborted(String);

impl Aborted {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

impl Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "computation aborted: {}", self.0)
    }
}

impl Error for Aborted {}
