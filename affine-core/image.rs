use crate::error::{AffineError, AffineResult};

/// Row-major single-channel float image, origin top-left
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

/// Canonical normalized patch, `patch_size × patch_size`
pub type CanonicalPatch = Image;

impl Image {
    /// Zero-filled image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap an existing row-major buffer, validating its length
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> AffineResult<Self> {
        if width == 0 || height == 0 {
            return Err(AffineError::InvalidImageSize { width, height });
        }
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(AffineError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Convert an 8-bit grayscale buffer
    pub fn from_u8(width: usize, height: usize, pixels: &[u8]) -> AffineResult<Self> {
        Self::from_vec(width, height, pixels.iter().map(|&p| p as f32).collect())
    }

    /// Build an image by evaluating `f(col, row)` at every pixel
    pub fn from_fn<F: FnMut(usize, usize) -> f32>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(col, row));
            }
        }
        Self { width, height, data }
    }

    #[cfg(feature = "image")]
    pub fn from_luma8(img: &image::GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self {
            width: w as usize,
            height: h as usize,
            data: img.as_raw().iter().map(|&p| p as f32).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Pixel at `(row, col)`; panics when out of bounds
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.view().get(row, col)
    }
}

/// Borrowed row-major float image
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    width: usize,
    height: usize,
    data: &'a [f32],
}

impl<'a> ImageView<'a> {
    pub fn new(data: &'a [f32], width: usize, height: usize) -> AffineResult<Self> {
        if width == 0 || height == 0 {
            return Err(AffineError::InvalidImageSize { width, height });
        }
        if data.len() != width * height {
            return Err(AffineError::InvalidImageData {
                expected_len: width * height,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// View over a buffer whose length is known to match.
    ///
    /// Panics if `data.len() != width * height`.
    pub fn from_slice(data: &'a [f32], width: usize, height: usize) -> Self {
        assert_eq!(data.len(), width * height, "buffer does not match {}x{} view", width, height);
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Pixel at `(row, col)`; panics when out of bounds
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.height && col < self.width {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    pub fn to_image(&self) -> Image {
        Image {
            width: self.width,
            height: self.height,
            data: self.data.to_vec(),
        }
    }
}
