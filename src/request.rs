use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use glyph_model::IntensityGrid;

/// Consumes rendered glyphs.
///
/// Implementations expand every intensity into an opaque gray pixel
/// (R = G = B = intensity, A = 255), which is what `IntensityGrid::to_rgba`
/// produces.
pub trait ResultSink {
    fn write(&mut self, grid: &IntensityGrid);
}

impl<T: ResultSink + ?Sized> ResultSink for &mut T {
    fn write(&mut self, grid: &IntensityGrid) {
        (**self).write(grid);
    }
}

/// A glyph to render and where to put it.
#[derive(Debug, Clone)]
pub struct InferenceRequest<S> {
    pub id: u64,
    pub embedding: Vec<f32>,
    pub character: String,
    pub priority: i32,
    pub sink: S,
}

impl<S> InferenceRequest<S> {
    /// Creates a new `InferenceRequest` with the default priority of `0`.
    pub fn new<C: Into<String>>(id: u64, embedding: Vec<f32>, character: C, sink: S) -> Self {
        Self {
            id,
            embedding,
            character: character.into(),
            priority: 0,
            sink,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// An in-memory RGBA surface, empty until a glyph is written to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RgbaImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbaImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw RGBA bytes, row by row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, row: usize, col: usize) -> Option<[u8; 4]> {
        if row >= self.height || col >= self.width {
            return None;
        }

        let start = (row * self.width + col) * 4;
        let mut pixel = [0; 4];
        pixel.copy_from_slice(&self.pixels[start..start + 4]);
        Some(pixel)
    }

    /// Encodes the image as a PAM (`P7`, `RGB_ALPHA`) file.
    pub fn write_pam<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(
            writer,
            "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
            self.width, self.height
        )?;
        writer.write_all(&self.pixels)?;
        writer.flush()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_pam(BufWriter::new(file))
    }
}

impl ResultSink for RgbaImage {
    fn write(&mut self, grid: &IntensityGrid) {
        self.width = grid.size();
        self.height = grid.size();
        self.pixels = grid.to_rgba();
    }
}
