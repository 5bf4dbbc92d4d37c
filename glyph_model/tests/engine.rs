use std::{sync::Arc, thread};

use glyph_model::{
    CharIndex, Dense, IMAGE_SIZE, InferenceEngine, LATENT_DIM, ModelErr, NUM_CHARS, NUM_LAYERS,
    ParameterStore,
};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};

const HIDDEN: usize = 16;

/// Seeded random parameters, small enough to keep most units away from saturation.
fn random_store(seed: u64) -> Arc<ParameterStore> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dense = |input: usize, output: usize| {
        let weights = Array2::from_shape_simple_fn((input, output), || rng.random_range(-0.5..0.5));
        let biases = Array1::from_shape_simple_fn(output, || rng.random_range(0.0..0.1));
        Dense::new(weights, biases).unwrap()
    };

    let mut stack = vec![dense(LATENT_DIM + NUM_CHARS, HIDDEN)];
    for _ in 1..NUM_LAYERS {
        stack.push(dense(HIDDEN, HIDDEN));
    }
    let output = dense(HIDDEN, IMAGE_SIZE * IMAGE_SIZE);

    Arc::new(ParameterStore::new(stack, output).unwrap())
}

#[test]
fn every_glyph_renders_a_valid_grid() {
    let engine = InferenceEngine::with_params(random_store(1));
    let embedding = [0.1; LATENT_DIM];

    for (c, _) in CharIndex::new().iter() {
        let grid = engine.infer(&embedding, c).unwrap();

        assert_eq!(grid.view().dim(), (IMAGE_SIZE, IMAGE_SIZE));
        assert!(
            grid.view().iter().all(|v| (0.0..=255.0).contains(v)),
            "glyph {c} left the intensity range"
        );
    }
}

#[test]
fn inference_is_deterministic() {
    let store = random_store(2);
    let embedding: Vec<f32> = (0..LATENT_DIM).map(|i| (i as f32 - 20.) / 50.).collect();

    let first = InferenceEngine::with_params(Arc::clone(&store));
    let second = InferenceEngine::with_params(store);

    let a = first.infer(&embedding, 'g').unwrap();
    assert_eq!(a, first.infer(&embedding, 'g').unwrap());
    assert_eq!(a, second.infer(&embedding, 'g').unwrap());
}

#[test]
fn case_changes_the_glyph() {
    let engine = InferenceEngine::with_params(random_store(3));
    let embedding = [0.; LATENT_DIM];

    let upper = engine.infer(&embedding, 'A').unwrap();
    let lower = engine.infer(&embedding, 'a').unwrap();

    assert_ne!(upper, lower);
}

#[test]
fn embedding_changes_the_glyph() {
    let engine = InferenceEngine::with_params(random_store(4));

    let plain = engine.infer(&[0.; LATENT_DIM], 'k').unwrap();
    let styled = engine.infer(&[0.4; LATENT_DIM], 'k').unwrap();

    assert_ne!(plain, styled);
}

#[test]
fn tensors_do_not_outlive_the_call() {
    let engine = InferenceEngine::with_params(random_store(5));
    let tracker = engine.tracker();

    let live = tracker.live_tensors();
    let allocated = tracker.allocated();
    engine.infer(&[0.; LATENT_DIM], 'Z').unwrap();

    // one-hot, input, hidden layers, sigmoid output and intensities
    assert_eq!(tracker.allocated() - allocated, 2 + NUM_LAYERS + 2);
    assert_eq!(tracker.live_tensors(), live);
    assert_eq!(tracker.live_bytes(), 0);
}

#[test]
fn tensors_are_released_on_failure() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut dense = |input: usize, output: usize, poisoned: bool| {
        let weights = Array2::from_shape_simple_fn((input, output), || {
            if poisoned { f32::NAN } else { rng.random_range(-0.5..0.5) }
        });
        Dense::new(weights, Array1::zeros(output)).unwrap()
    };

    let mut stack = vec![dense(LATENT_DIM + NUM_CHARS, HIDDEN, false)];
    for _ in 1..NUM_LAYERS {
        stack.push(dense(HIDDEN, HIDDEN, false));
    }
    let output = dense(HIDDEN, IMAGE_SIZE * IMAGE_SIZE, true);
    let store = ParameterStore::new(stack, output).unwrap();

    let engine = InferenceEngine::with_params(Arc::new(store));
    let tracker = engine.tracker();

    let err = engine.infer(&[0.; LATENT_DIM], 'Q').unwrap_err();

    assert!(matches!(err, ModelErr::ComputeFailure(_)));
    assert!(tracker.allocated() > 0);
    assert_eq!(tracker.live_tensors(), 0);
    assert_eq!(tracker.live_bytes(), 0);
}

#[test]
fn concurrent_inferences_share_parameters() {
    const THREADS: usize = 8;

    let engine = InferenceEngine::with_params(random_store(7));
    let expected = engine.infer(&[0.2; LATENT_DIM], '7').unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| engine.infer(&[0.2; LATENT_DIM], '7').unwrap()))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });

    assert_eq!(engine.tracker().live_tensors(), 0);
}
