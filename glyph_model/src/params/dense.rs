use ndarray::{Array1, Array2};

use crate::{ModelErr, Result};

/// The weights and biases of a fully connected layer.
///
/// Weights are laid out as `(input width, output width)`, so a row vector
/// input is multiplied on the left: `x · W + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    weights: Array2<f32>,
    biases: Array1<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `weights` - A `(input, output)` weight matrix.
    /// * `biases` - A bias vector of length `output`.
    ///
    /// # Returns
    /// A new `Dense` or a `ShapeMismatch` if the bias length doesn't match the output width.
    pub fn new(weights: Array2<f32>, biases: Array1<f32>) -> Result<Self> {
        if biases.len() != weights.ncols() {
            return Err(ModelErr::ShapeMismatch {
                what: "bias length".to_string(),
                got: biases.len(),
                expected: weights.ncols(),
            });
        }

        Ok(Self { weights, biases })
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn biases(&self) -> &Array1<f32> {
        &self.biases
    }

    pub fn input_width(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_width(&self) -> usize {
        self.weights.ncols()
    }
}
