//! Call-scoped ownership of intermediate tensors.
//!
//! Every tensor produced while evaluating the network lives inside a `TensorScope`
//! and is released when the scope is dropped, which happens on every exit path of
//! the call that created it. A `MemoryTracker` observes how many tensors are alive.

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{Array1, ArrayView1};

/// Counts the tensors currently owned by any `TensorScope`.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    live_tensors: AtomicUsize,
    live_bytes: AtomicUsize,
    allocated: AtomicUsize,
}

impl MemoryTracker {
    /// Creates a new `MemoryTracker`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount of tensors alive right now.
    pub fn live_tensors(&self) -> usize {
        self.live_tensors.load(Ordering::Acquire)
    }

    /// Amount of bytes held by the tensors alive right now.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Acquire)
    }

    /// Amount of tensors ever allocated through a scope observed by this tracker.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    fn acquire(&self, bytes: usize) {
        self.live_tensors.fetch_add(1, Ordering::AcqRel);
        self.live_bytes.fetch_add(bytes, Ordering::AcqRel);
        self.allocated.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self, tensors: usize, bytes: usize) {
        self.live_tensors.fetch_sub(tensors, Ordering::AcqRel);
        self.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Handle to a tensor owned by a `TensorScope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorId(usize);

/// An arena holding every tensor of a single forward pass.
pub struct TensorScope<'t> {
    tracker: &'t MemoryTracker,
    tensors: Vec<Array1<f32>>,
    bytes: usize,
}

impl<'t> TensorScope<'t> {
    /// Opens a new scope reporting to `tracker`.
    pub fn new(tracker: &'t MemoryTracker) -> Self {
        Self {
            tracker,
            tensors: Vec::new(),
            bytes: 0,
        }
    }

    /// Moves `tensor` into the scope.
    ///
    /// # Returns
    /// A handle to read the tensor back while the scope is alive.
    pub fn track(&mut self, tensor: Array1<f32>) -> TensorId {
        let bytes = tensor.len() * size_of::<f32>();
        self.tracker.acquire(bytes);
        self.bytes += bytes;
        self.tensors.push(tensor);
        TensorId(self.tensors.len() - 1)
    }

    /// Reads a tensor owned by this scope.
    ///
    /// # Panics
    /// If `id` was issued by another scope.
    pub fn get(&self, id: TensorId) -> ArrayView1<'_, f32> {
        self.tensors[id.0].view()
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

impl Drop for TensorScope<'_> {
    fn drop(&mut self) {
        self.tracker.release(self.tensors.len(), self.bytes);
        self.tensors.clear();
    }
}
