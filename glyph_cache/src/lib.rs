mod cache;
mod error;
mod retention;
mod stream;

pub use cache::{Outcome, RequestCache, Submission, Ticket};
pub use error::Aborted;
pub use retention::Retention;
pub use stream::ComputeStream;
