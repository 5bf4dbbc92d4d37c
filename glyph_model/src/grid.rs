use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{IMAGE_SIZE, ModelErr, Result};

/// Brightest value a pixel can take.
pub const MAX_INTENSITY: f32 = 255.;

/// A single channel `IMAGE_SIZE × IMAGE_SIZE` glyph image with values in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    pixels: Array2<f32>,
}

impl IntensityGrid {
    /// Reshapes the flat network output into a grid, row by row.
    ///
    /// # Arguments
    /// * `flat` - `IMAGE_SIZE²` intensities in row-major order.
    ///
    /// # Returns
    /// The grid, a `ShapeMismatch` if `flat` has the wrong length or a
    /// `ComputeFailure` if any value isn't a finite intensity.
    pub fn from_flat(flat: ArrayView1<'_, f32>) -> Result<Self> {
        let expected = IMAGE_SIZE * IMAGE_SIZE;
        if flat.len() != expected {
            return Err(ModelErr::ShapeMismatch {
                what: "flat image".to_string(),
                got: flat.len(),
                expected,
            });
        }

        if let Some(bad) = flat
            .iter()
            .find(|v| !(0. ..=MAX_INTENSITY).contains(*v))
        {
            return Err(ModelErr::ComputeFailure(format!(
                "intensity {bad} is outside [0, {MAX_INTENSITY}]"
            )));
        }

        let pixels = Array2::from_shape_vec((IMAGE_SIZE, IMAGE_SIZE), flat.to_vec())
            .map_err(|e| ModelErr::ComputeFailure(e.to_string()))?;

        Ok(Self { pixels })
    }

    /// Intensity at `(row, col)`, `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.pixels.get((row, col)).copied()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.pixels.view()
    }

    /// Side of the grid in pixels.
    pub fn size(&self) -> usize {
        self.pixels.nrows()
    }

    /// Expands every intensity into an opaque gray RGBA pixel, row by row.
    ///
    /// # Returns
    /// `4 × size²` bytes where R, G and B repeat the intensity and A is 255.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&v| {
                let v = v.round().clamp(0., MAX_INTENSITY) as u8;
                [v, v, v, u8::MAX]
            })
            .collect()
    }
}
