use image::{ImageBuffer, Luma};
use imageproc::filter::gaussian_blur_f32;

/// In-place smoothing of a row-major buffer
pub trait Blur {
    fn blur_in_place(&mut self, buf: &mut [f32], width: usize, height: usize, sigma: f32);
}

/// Gaussian blur backed by `imageproc`, padded by continuity.
///
/// The staging buffer is kept between calls.
#[derive(Debug, Clone, Default)]
pub struct GaussianBlur {
    staging: Vec<f32>,
}

impl GaussianBlur {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Blur for GaussianBlur {
    fn blur_in_place(&mut self, buf: &mut [f32], width: usize, height: usize, sigma: f32) {
        assert_eq!(buf.len(), width * height, "blur buffer does not match {}x{}", width, height);
        // imageproc rejects non-positive sigmas
        if !(sigma > 0.0) || width == 0 || height == 0 {
            return;
        }

        let mut staging = std::mem::take(&mut self.staging);
        staging.clear();
        staging.extend_from_slice(buf);
        let Some(src) = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(width as u32, height as u32, staging) else {
            return;
        };

        let blurred = gaussian_blur_f32(&src, sigma);
        buf.copy_from_slice(blurred.as_raw());
        self.staging = src.into_raw();
    }
}
