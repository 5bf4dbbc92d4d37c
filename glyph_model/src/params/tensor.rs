use ndarray::{Array1, Array2};

use crate::{ModelErr, Result};

/// A raw checkpoint variable: a flat row-major buffer and its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new `Tensor`.
    ///
    /// # Arguments
    /// * `shape` - The dimensions of the tensor.
    /// * `data` - The values in row-major order.
    ///
    /// # Returns
    /// A new `Tensor` or a `ShapeMismatch` if `data` doesn't fill `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected = shape.iter().product();
        if data.len() != expected {
            return Err(ModelErr::ShapeMismatch {
                what: format!("tensor data for shape {shape:?}"),
                got: data.len(),
                expected,
            });
        }

        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Interprets this tensor as a matrix, a `(1, n)` matrix is not accepted.
    pub(super) fn into_matrix(self, name: &str) -> Result<Array2<f32>> {
        let [rows, cols] = self.shape[..] else {
            return Err(ModelErr::ShapeMismatch {
                what: format!("rank of {name}"),
                got: self.shape.len(),
                expected: 2,
            });
        };

        let got = self.data.len();
        Array2::from_shape_vec((rows, cols), self.data).map_err(|_| ModelErr::ShapeMismatch {
            what: format!("data of {name}"),
            got,
            expected: rows * cols,
        })
    }

    /// Interprets this tensor as a vector, `(n,)` and `(1, n)` shapes are accepted.
    pub(super) fn into_vector(self, name: &str) -> Result<Array1<f32>> {
        match self.shape[..] {
            [_] | [1, _] => Ok(Array1::from_vec(self.data)),
            _ => Err(ModelErr::ShapeMismatch {
                what: format!("rank of {name}"),
                got: self.shape.len(),
                expected: 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_must_fill_shape() {
        assert!(Tensor::new(vec![2, 3], vec![0.; 6]).is_ok());
        assert!(matches!(
            Tensor::new(vec![2, 3], vec![0.; 5]),
            Err(ModelErr::ShapeMismatch {
                got: 5,
                expected: 6,
                ..
            })
        ));
    }

    #[test]
    fn matrix_is_row_major() {
        let t = Tensor::new(vec![2, 3], vec![1., 2., 3., 4., 5., 6.]).unwrap();
        let m = t.into_matrix("w").unwrap();

        assert_eq!(m[[0, 2]], 3.);
        assert_eq!(m[[1, 0]], 4.);
    }

    #[test]
    fn biases_accept_row_vectors() {
        let flat = Tensor::new(vec![3], vec![1., 2., 3.]).unwrap();
        let row = Tensor::new(vec![1, 3], vec![1., 2., 3.]).unwrap();
        let matrix = Tensor::new(vec![3, 1], vec![1., 2., 3.]).unwrap();

        assert_eq!(flat.into_vector("b").unwrap().len(), 3);
        assert_eq!(row.into_vector("b").unwrap().len(), 3);
        assert!(matrix.into_vector("b").is_err());
    }

    #[test]
    fn short_matrix_data_is_a_shape_mismatch() {
        let t = Tensor {
            shape: vec![2, 3],
            data: vec![0.; 5],
        };

        let err = t.into_matrix("w").unwrap_err();
        assert!(matches!(
            err,
            ModelErr::ShapeMismatch {
                got: 5,
                expected: 6,
                ..
            }
        ));
    }
}
