use std::time::{Duration, Instant};

/// What happens to a result once every waiter received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    /// Forget the result right after delivering it.
    #[default]
    Evict,
    /// Serve the result to new requests for the given time.
    For(Duration),
}

impl Retention {
    /// Whether completed results should be stored at all.
    pub fn keeps(&self) -> bool {
        match self {
            Retention::Evict => false,
            Retention::For(ttl) => !ttl.is_zero(),
        }
    }

    /// Whether a result completed at `at` can still be served.
    pub fn is_fresh(&self, at: Instant) -> bool {
        match self {
            Retention::Evict => false,
            Retention::For(ttl) => at.elapsed() < *ttl,
        }
    }
}
