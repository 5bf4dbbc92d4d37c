use std::sync::{Arc, OnceLock};

use log::{debug, info};
use ndarray::ArrayView1;

use crate::{
    CharIndex, IntensityGrid, MemoryTracker, ModelErr, NUM_CHARS, ParameterStore, Result,
    TensorScope,
    arch::{Activation, ops},
    grid::MAX_INTENSITY,
};

/// Evaluates the glyph network for an (embedding, character) pair.
///
/// The engine starts empty and accepts its parameters exactly once through
/// `load`; until then every inference fails with `ModelNotLoaded`. Once loaded
/// the parameters are shared read-only, so `infer` can be called concurrently.
pub struct InferenceEngine {
    index: CharIndex,
    params: OnceLock<Arc<ParameterStore>>,
    tracker: Arc<MemoryTracker>,
}

impl InferenceEngine {
    /// Creates a new `InferenceEngine` without parameters.
    pub fn new() -> Self {
        Self {
            index: CharIndex::new(),
            params: OnceLock::new(),
            tracker: Arc::new(MemoryTracker::new()),
        }
    }

    /// Creates a new `InferenceEngine` that is ready to infer.
    pub fn with_params(params: Arc<ParameterStore>) -> Self {
        let engine = Self::new();
        // Can't fail, the lock is brand new.
        let _ = engine.params.set(params);
        engine
    }

    /// Installs the model parameters.
    ///
    /// # Arguments
    /// * `params` - The validated parameter store.
    ///
    /// # Returns
    /// `ModelAlreadyLoaded` if parameters were already installed.
    pub fn load(&self, params: Arc<ParameterStore>) -> Result<()> {
        let nparams = params.len();
        self.params
            .set(params)
            .map_err(|_| ModelErr::ModelAlreadyLoaded)?;

        info!(params = nparams; "model loaded");
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.params.get().is_some()
    }

    pub fn char_index(&self) -> &CharIndex {
        &self.index
    }

    /// The tracker observing the tensors allocated by this engine.
    pub fn tracker(&self) -> Arc<MemoryTracker> {
        Arc::clone(&self.tracker)
    }

    /// Renders the glyph of the first character of `s`.
    ///
    /// # Returns
    /// The glyph or `EmptyCharacter` if `s` is empty, otherwise the same errors as `infer`.
    pub fn infer_str(&self, embedding: &[f32], s: &str) -> Result<IntensityGrid> {
        let c = s.chars().next().ok_or(ModelErr::EmptyCharacter)?;
        self.infer(embedding, c)
    }

    /// Renders the glyph of `c` in the style described by `embedding`.
    ///
    /// Higher network activations produce darker pixels: the sigmoid output `s`
    /// becomes `255 - 255 * s`.
    ///
    /// # Arguments
    /// * `embedding` - The latent style vector.
    /// * `c` - The glyph to render.
    ///
    /// # Returns
    /// The glyph, or `InvalidCharacter`, `ModelNotLoaded`, `EmbeddingLength` or
    /// `ComputeFailure` if the evaluation couldn't be completed.
    pub fn infer(&self, embedding: &[f32], c: char) -> Result<IntensityGrid> {
        let char_id = self.index.id_of(c)?;
        let params = self.params.get().ok_or(ModelErr::ModelNotLoaded)?;

        let expected = params.latent_dim();
        if embedding.len() != expected {
            return Err(ModelErr::EmbeddingLength {
                got: embedding.len(),
                expected,
            });
        }

        debug!("evaluating network for {c:?}");

        let mut scope = TensorScope::new(&self.tracker);
        let one_hot = ops::one_hot(&mut scope, char_id, NUM_CHARS);
        let mut last = ops::concat(&mut scope, ArrayView1::from(embedding), one_hot)?;

        for layer in params.layers() {
            last = ops::dense(&mut scope, last, layer, Activation::Relu)?;
        }

        let raw = ops::dense(
            &mut scope,
            last,
            params.output_parameters(),
            Activation::Sigmoid,
        )?;
        let intensity = ops::invert_scale(&mut scope, raw, MAX_INTENSITY);

        IntensityGrid::from_flat(scope.get(intensity))
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}
