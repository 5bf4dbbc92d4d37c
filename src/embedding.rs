use std::ops::Deref;

use glyph_model::LATENT_DIM;
use rand::Rng;

/// Default half-width of the interval random styles are sampled from.
pub const LATENT_RANGE: f32 = 0.4;

/// A point in the latent style space of the glyph network.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Samples every coordinate uniformly in `[-range, range]`.
    ///
    /// # Arguments
    /// * `rng` - The source of randomness.
    /// * `range` - The half-width of the interval, its sign is ignored.
    ///
    /// # Returns
    /// A new `LATENT_DIM` wide embedding.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, range: f32) -> Self {
        let range = range.abs();
        let values = (0..LATENT_DIM)
            .map(|_| rng.random_range(-range..=range))
            .collect();

        Self(values)
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl Deref for Embedding {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
