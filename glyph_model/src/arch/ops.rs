//! Tensor operations of the forward pass. Every result is owned by the given `TensorScope`.

use ndarray::{Array1, ArrayView1, Axis, concatenate};

use super::Activation;
use crate::{
    CharId, Dense, ModelErr, Result,
    scope::{TensorId, TensorScope},
};

/// Builds a vector of length `n` with a single 1 at `id`.
pub fn one_hot(scope: &mut TensorScope<'_>, id: CharId, n: usize) -> TensorId {
    let mut v = Array1::zeros(n);
    v[id.index()] = 1.;
    scope.track(v)
}

/// Concatenates a caller-owned vector in front of a scoped one.
pub fn concat(
    scope: &mut TensorScope<'_>,
    head: ArrayView1<'_, f32>,
    tail: TensorId,
) -> Result<TensorId> {
    let joined = concatenate(Axis(0), &[head, scope.get(tail)])
        .map_err(|e| ModelErr::ComputeFailure(e.to_string()))?;

    Ok(scope.track(joined))
}

/// Applies a fully connected layer: `act(x · W + b)`.
///
/// # Returns
/// The activations or a `ShapeMismatch` if `x` doesn't match the layer's input width.
pub fn dense(
    scope: &mut TensorScope<'_>,
    x: TensorId,
    layer: &Dense,
    act: Activation,
) -> Result<TensorId> {
    let x = scope.get(x);
    if x.len() != layer.input_width() {
        return Err(ModelErr::ShapeMismatch {
            what: "layer input".to_string(),
            got: x.len(),
            expected: layer.input_width(),
        });
    }

    let mut z = x.dot(layer.weights()) + layer.biases();
    z.mapv_inplace(|z| act.f(z));
    Ok(scope.track(z))
}

/// Maps values in `[0, 1]` to `[0, scale]` reversed, so 1 becomes 0 and 0 becomes `scale`.
pub fn invert_scale(scope: &mut TensorScope<'_>, x: TensorId, scale: f32) -> TensorId {
    let y = scope.get(x).mapv(|v| scale - scale * v);
    scope.track(y)
}
