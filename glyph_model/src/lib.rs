pub mod arch;
pub mod charset;
pub mod engine;
pub mod error;
pub mod grid;
pub mod params;
pub mod scope;

pub use charset::{CharId, CharIndex, NUM_CHARS};
pub use engine::InferenceEngine;
pub use error::{LoadErr, ModelErr, Result};
pub use grid::IntensityGrid;
pub use params::{Dense, ParameterStore, Tensor};
pub use scope::{MemoryTracker, TensorScope};

/// Amount of hidden layers stacked before the output layer.
pub const NUM_LAYERS: usize = 4;

/// Side of the square glyph image the network produces.
pub const IMAGE_SIZE: usize = 64;

/// Width of the latent embedding the trained checkpoint expects.
pub const LATENT_DIM: usize = 40;
