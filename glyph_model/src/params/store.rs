use std::collections::HashMap;

use log::info;

use super::{Dense, Tensor};
use crate::{IMAGE_SIZE, LATENT_DIM, ModelErr, NUM_CHARS, NUM_LAYERS, Result};

/// The trained parameters of the glyph network.
///
/// Built once by a loader and shared read-only by every inference afterwards,
/// there is no way to mutate the layers once the store is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    stack: Vec<Dense>,
    output: Dense,
}

impl ParameterStore {
    /// Creates a new `ParameterStore` and checks that its layers chain.
    ///
    /// # Arguments
    /// * `stack` - The hidden layers, in evaluation order.
    /// * `output` - The final layer producing the flat image.
    ///
    /// # Returns
    /// A new `ParameterStore` or a `ShapeMismatch` describing the first
    /// dimension that doesn't line up.
    pub fn new(stack: Vec<Dense>, output: Dense) -> Result<Self> {
        if stack.len() != NUM_LAYERS {
            return Err(ModelErr::ShapeMismatch {
                what: "stack depth".to_string(),
                got: stack.len(),
                expected: NUM_LAYERS,
            });
        }

        let mut width = LATENT_DIM + NUM_CHARS;
        for (i, layer) in stack.iter().chain([&output]).enumerate() {
            if layer.input_width() != width {
                return Err(ModelErr::ShapeMismatch {
                    what: format!("input width of layer {i}"),
                    got: layer.input_width(),
                    expected: width,
                });
            }

            width = layer.output_width();
        }

        if width != IMAGE_SIZE * IMAGE_SIZE {
            return Err(ModelErr::ShapeMismatch {
                what: "output width".to_string(),
                got: width,
                expected: IMAGE_SIZE * IMAGE_SIZE,
            });
        }

        Ok(Self { stack, output })
    }

    /// Builds the store from checkpoint variables.
    ///
    /// Hidden layer `i` is read from `Stack/fully_connected_{i + 1}/weights` and
    /// `Stack/fully_connected_{i + 1}/biases`, the output layer from
    /// `fully_connected/weights` and `fully_connected/biases`. Extra variables are ignored.
    ///
    /// # Arguments
    /// * `vars` - The checkpoint variables by name.
    ///
    /// # Returns
    /// A new `ParameterStore`, `MissingParameter` if a variable is absent or
    /// `ShapeMismatch` if the layers don't chain.
    pub fn from_variables(mut vars: HashMap<String, Tensor>) -> Result<Self> {
        let mut take_layer = |prefix: &str| -> Result<Dense> {
            let w_name = format!("{prefix}/weights");
            let b_name = format!("{prefix}/biases");

            let weights = vars
                .remove(&w_name)
                .ok_or_else(|| ModelErr::MissingParameter(w_name.clone()))?
                .into_matrix(&w_name)?;
            let biases = vars
                .remove(&b_name)
                .ok_or_else(|| ModelErr::MissingParameter(b_name.clone()))?
                .into_vector(&b_name)?;

            Dense::new(weights, biases)
        };

        let stack = (1..=NUM_LAYERS)
            .map(|i| take_layer(&format!("Stack/fully_connected_{i}")))
            .collect::<Result<Vec<_>>>()?;
        let output = take_layer("fully_connected")?;

        let store = Self::new(stack, output)?;
        info!(params = store.len(); "parameter store ready");
        Ok(store)
    }

    /// Returns the parameters of the `i`-th hidden layer.
    pub fn layer_parameters(&self, i: usize) -> Option<&Dense> {
        self.stack.get(i)
    }

    /// Returns the parameters of the output layer.
    pub fn output_parameters(&self) -> &Dense {
        &self.output
    }

    /// Iterates the hidden layers in evaluation order.
    pub fn layers(&self) -> impl Iterator<Item = &Dense> {
        self.stack.iter()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Width of the embedding expected in front of the one-hot vector.
    pub fn latent_dim(&self) -> usize {
        self.stack[0].input_width() - NUM_CHARS
    }

    /// Returns the size of the store.
    ///
    /// # Returns
    /// The amount of scalar parameters across every layer.
    pub fn len(&self) -> usize {
        self.stack
            .iter()
            .chain([&self.output])
            .map(|l| l.weights().len() + l.biases().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2};

    use super::*;

    const HIDDEN: usize = 8;

    fn dense(input: usize, output: usize) -> Dense {
        Dense::new(Array2::zeros((input, output)), Array1::zeros(output)).unwrap()
    }

    fn stack() -> Vec<Dense> {
        vec![
            dense(LATENT_DIM + NUM_CHARS, HIDDEN),
            dense(HIDDEN, HIDDEN),
            dense(HIDDEN, HIDDEN),
            dense(HIDDEN, HIDDEN),
        ]
    }

    fn variables() -> HashMap<String, Tensor> {
        let mut vars = HashMap::new();
        let mut insert = |name: String, shape: Vec<usize>| {
            let len = shape.iter().product();
            vars.insert(name, Tensor::new(shape, vec![0.; len]).unwrap());
        };

        let widths = [LATENT_DIM + NUM_CHARS, HIDDEN, HIDDEN, HIDDEN, HIDDEN];
        for i in 0..NUM_LAYERS {
            let prefix = format!("Stack/fully_connected_{}", i + 1);
            insert(format!("{prefix}/weights"), vec![widths[i], widths[i + 1]]);
            insert(format!("{prefix}/biases"), vec![widths[i + 1]]);
        }

        insert(
            "fully_connected/weights".to_string(),
            vec![HIDDEN, IMAGE_SIZE * IMAGE_SIZE],
        );
        insert(
            "fully_connected/biases".to_string(),
            vec![IMAGE_SIZE * IMAGE_SIZE],
        );

        vars
    }

    #[test]
    fn chained_layers_are_accepted() {
        let store = ParameterStore::new(stack(), dense(HIDDEN, IMAGE_SIZE * IMAGE_SIZE)).unwrap();

        assert_eq!(store.depth(), NUM_LAYERS);
        assert_eq!(store.latent_dim(), LATENT_DIM);
        assert!(store.layer_parameters(NUM_LAYERS).is_none());
        assert_eq!(store.output_parameters().output_width(), 4096);
    }

    #[test]
    fn broken_chain_is_rejected() {
        let mut layers = stack();
        layers[2] = dense(HIDDEN + 1, HIDDEN);

        let err = ParameterStore::new(layers, dense(HIDDEN, 4096)).unwrap_err();
        assert_eq!(
            err,
            ModelErr::ShapeMismatch {
                what: "input width of layer 2".to_string(),
                got: HIDDEN + 1,
                expected: HIDDEN,
            }
        );
    }

    #[test]
    fn output_must_cover_the_image() {
        let err = ParameterStore::new(stack(), dense(HIDDEN, 100)).unwrap_err();
        assert!(matches!(err, ModelErr::ShapeMismatch { got: 100, .. }));
    }

    #[test]
    fn output_layer_must_chain_with_stack() {
        let err = ParameterStore::new(stack(), dense(HIDDEN * 2, 4096)).unwrap_err();
        assert!(matches!(
            err,
            ModelErr::ShapeMismatch { got, expected: HIDDEN, .. } if got == HIDDEN * 2
        ));
    }

    #[test]
    fn depth_is_checked() {
        let mut layers = stack();
        layers.pop();

        let err = ParameterStore::new(layers, dense(HIDDEN, 4096)).unwrap_err();
        assert!(matches!(err, ModelErr::ShapeMismatch { got: 3, expected: 4, .. }));
    }

    #[test]
    fn mismatched_bias_is_rejected() {
        let err = Dense::new(Array2::zeros((3, 4)), Array1::zeros(3)).unwrap_err();
        assert!(matches!(err, ModelErr::ShapeMismatch { got: 3, expected: 4, .. }));
    }

    #[test]
    fn from_variables_reads_checkpoint_names() {
        let store = ParameterStore::from_variables(variables()).unwrap();

        assert_eq!(store.depth(), NUM_LAYERS);
        assert_eq!(store.layer_parameters(0).unwrap().input_width(), 102);
    }

    #[test]
    fn from_variables_reports_missing_names() {
        let mut vars = variables();
        vars.remove("Stack/fully_connected_3/biases");

        let err = ParameterStore::from_variables(vars).unwrap_err();
        assert_eq!(
            err,
            ModelErr::MissingParameter("Stack/fully_connected_3/biases".to_string())
        );
    }

    #[test]
    fn len_counts_every_scalar() {
        let store = ParameterStore::from_variables(variables()).unwrap();
        let expected = (102 * HIDDEN + HIDDEN) + 3 * (HIDDEN * HIDDEN + HIDDEN) + (HIDDEN * 4096 + 4096);

        assert_eq!(store.len(), expected);
    }
}
