//! Renders glyphs from a latent font style, deduplicating identical requests.

pub mod config;
pub mod embedding;
pub mod error;
pub mod key;
pub mod model;
pub mod request;

pub use config::FontConfig;
pub use embedding::{Embedding, LATENT_RANGE};
pub use error::{ConfigErr, FontErr};
pub use key::RequestKey;
pub use model::{FontModel, GlyphCache};
pub use request::{InferenceRequest, ResultSink, RgbaImage};
