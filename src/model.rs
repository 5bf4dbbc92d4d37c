use std::sync::Arc;

use glyph_cache::{ComputeStream, RequestCache};
use glyph_model::{
    CharIndex, InferenceEngine, IntensityGrid, MemoryTracker, ModelErr, ParameterStore,
};
use log::debug;

use crate::{FontConfig, FontErr, InferenceRequest, RequestKey, ResultSink};

/// The cache glyph requests go through.
pub type GlyphCache = RequestCache<RequestKey, IntensityGrid, FontErr>;

/// Serves glyph requests, computing each distinct request at most once at a time.
pub struct FontModel {
    engine: Arc<InferenceEngine>,
    cache: GlyphCache,
}

impl FontModel {
    /// Creates a new `FontModel` without parameters.
    ///
    /// # Arguments
    /// * `config` - Provides the retention policy of the cache.
    ///
    /// # Panics
    /// If called outside of a tokio runtime, the compute stream is spawned on it.
    pub fn new(config: &FontConfig) -> Self {
        let cache = RequestCache::new(ComputeStream::spawn(), config.retention());

        Self {
            engine: Arc::new(InferenceEngine::new()),
            cache,
        }
    }

    /// Installs the trained parameters, only the first call succeeds.
    pub fn load(&self, store: ParameterStore) -> Result<(), FontErr> {
        self.engine.load(Arc::new(store))?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.is_loaded()
    }

    pub fn char_index(&self) -> &CharIndex {
        self.engine.char_index()
    }

    pub fn tracker(&self) -> Arc<MemoryTracker> {
        self.engine.tracker()
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    /// Renders the glyph of `character` in the style given by `embedding`.
    ///
    /// Requests with the same id, embedding and character share one
    /// computation while it runs. An invalid character is rejected before
    /// reaching the cache.
    ///
    /// # Arguments
    /// * `id` - Caller chosen id, part of the request identity.
    /// * `embedding` - The latent style vector.
    /// * `character` - A string whose first character is the requested glyph.
    /// * `priority` - Higher values are computed earlier.
    ///
    /// # Returns
    /// The glyph, shared with every other caller of the same request.
    pub async fn get(
        &self,
        id: u64,
        embedding: &[f32],
        character: &str,
        priority: i32,
    ) -> Result<Arc<IntensityGrid>, FontErr> {
        let c = character.chars().next().ok_or(ModelErr::EmptyCharacter)?;
        self.char_index().id_of(c)?;

        let key = RequestKey::new(id, embedding, c);
        let engine = Arc::clone(&self.engine);
        let embedding = embedding.to_vec();

        let ticket = self.cache.fetch(key, priority, move || {
            engine.infer(&embedding, c).map_err(FontErr::from)
        });
        debug!("glyph request {id} for {c:?} {:?}", ticket.submission());

        ticket.await
    }

    /// Serves `request` and writes the glyph to its sink.
    ///
    /// # Returns
    /// The sink once it received the glyph.
    pub async fn render<S: ResultSink>(
        &self,
        request: InferenceRequest<S>,
    ) -> Result<S, FontErr> {
        let InferenceRequest {
            id,
            embedding,
            character,
            priority,
            mut sink,
        } = request;

        let grid = self.get(id, &embedding, &character, priority).await?;
        sink.write(&grid);
        Ok(sink)
    }
}
