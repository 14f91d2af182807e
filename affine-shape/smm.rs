use affine_core::interpolation::warp;
use affine_core::{Affine2, ImageView, SecondMomentMatrix};
use log::trace;

use crate::gradient::compute_gradient;

/// Per-converger scratch: warped window and its gradient fields.
///
/// Sized once from the window side and reused for every iteration of every
/// candidate the owning converger processes.
#[derive(Debug, Clone)]
pub struct SmmWorkspace {
    window: usize,
    img: Vec<f32>,
    fx: Vec<f32>,
    fy: Vec<f32>,
}

impl SmmWorkspace {
    pub fn new(window: usize) -> Self {
        let n = window * window;
        Self {
            window,
            img: vec![0.0; n],
            fx: vec![0.0; n],
            fy: vec![0.0; n],
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Last warped window, row-major
    pub fn warped(&self) -> &[f32] {
        &self.img
    }

    /// Warp `level` around `(lx, ly)` with `frame` and measure the
    /// mask-weighted second moment matrix of the result.
    ///
    /// Samples falling outside the level read as zero; the window is not
    /// rejected for touching the border.
    pub fn estimate(
        &mut self,
        level: ImageView<'_>,
        lx: f32,
        ly: f32,
        frame: &Affine2,
        mask: &[f32],
    ) -> SecondMomentMatrix {
        let n = self.window;
        debug_assert_eq!(mask.len(), n * n);

        if warp(level, lx, ly, frame, &mut self.img, n, n) {
            trace!("SMM window at ({:.1}, {:.1}) touches the level border", lx, ly);
        }
        compute_gradient(&self.img, n, n, &mut self.fx, &mut self.fy);

        let (mut a, mut b, mut c) = (0.0f32, 0.0f32, 0.0f32);
        for ((&gx, &gy), &w) in self.fx.iter().zip(self.fy.iter()).zip(mask.iter()) {
            a += gx * gx * w;
            b += gx * gy * w;
            c += gy * gy * w;
        }
        let pixels = (n * n) as f32;
        SecondMomentMatrix::new(a / pixels, b / pixels, c / pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::gaussian_mask;
    use crate::test_images::{blob, ridge};
    use affine_core::Image;

    #[test]
    fn test_flat_image_has_zero_smm() {
        let img = Image::from_fn(64, 64, |_, _| 42.0);
        let mut ws = SmmWorkspace::new(19);
        let smm = ws.estimate(img.view(), 32.0, 32.0, &Affine2::IDENTITY, &gaussian_mask(19));
        assert_eq!(smm, SecondMomentMatrix::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_blob_smm_is_isotropic() {
        let img = blob(101, 5.0);
        let mut ws = SmmWorkspace::new(19);
        let smm = ws.estimate(img.view(), 50.0, 50.0, &Affine2::diagonal(2.5, 2.5), &gaussian_mask(19));
        assert!(smm.a > 0.0);
        assert!((smm.a - smm.c).abs() <= 1e-4 * smm.a);
        assert!(smm.b.abs() <= 1e-4 * smm.a);
    }

    #[test]
    fn test_ridge_smm_is_elongated() {
        let img = ridge(101, 3.0, 40.0);
        let mut ws = SmmWorkspace::new(19);
        let smm = ws.estimate(img.view(), 50.0, 50.0, &Affine2::diagonal(2.5, 2.5), &gaussian_mask(19));
        assert!(smm.is_positive_definite());
        assert!(smm.a > 36.0 * smm.c);
    }

    #[test]
    fn test_warped_window_is_centered() {
        let img = blob(101, 5.0);
        let mut ws = SmmWorkspace::new(5);
        ws.estimate(img.view(), 50.0, 50.0, &Affine2::IDENTITY, &gaussian_mask(5));
        assert_eq!(ws.warped()[12], img.at(50, 50));
    }
}
