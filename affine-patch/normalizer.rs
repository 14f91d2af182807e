use affine_core::interpolation::{support_touches_border, warp};
use affine_core::{almost_eq, AffineParams, AffineResult, Affine2, CanonicalPatch, Image, ImageView, R_GRAVITY_THETA};
use log::debug;

use crate::blur::{Blur, GaussianBlur};
use crate::strategy::{PatchGeometry, SamplingStrategy};
use crate::types::{PatchOutcome, RejectStage};

/// Allowed deviation of the frame determinant from one
pub const DET_TOLERANCE: f32 = 0.01;

/// Extracts canonical patches from affine frames.
///
/// The scratch buffer for the smoothed strategy only grows and is reused
/// across calls, so each worker thread needs its own normalizer.
#[derive(Debug, Clone)]
pub struct PatchNormalizer<B: Blur = GaussianBlur> {
    params: AffineParams,
    scratch: Vec<f32>,
    blur: B,
}

impl PatchNormalizer<GaussianBlur> {
    pub fn new(params: AffineParams) -> AffineResult<Self> {
        Self::with_blur(params, GaussianBlur::new())
    }
}

impl<B: Blur> PatchNormalizer<B> {
    /// Creates a normalizer with a custom blur primitive
    pub fn with_blur(params: AffineParams, blur: B) -> AffineResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            scratch: Vec::new(),
            blur,
        })
    }

    pub fn params(&self) -> &AffineParams {
        &self.params
    }

    pub fn blur(&self) -> &B {
        &self.blur
    }

    /// Current scratch size in samples
    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    /// Release the scratch buffer
    pub fn reset_scratch(&mut self) {
        self.scratch = Vec::new();
    }

    pub fn geometry(&self, s: f32) -> Option<PatchGeometry> {
        PatchGeometry::new(s, self.params.mr_size, self.params.patch_size)
    }

    /// Sample the canonical `patch_size × patch_size` patch of the keypoint at
    /// `(x, y)` with scale `s` and shape `affine` from `image`.
    ///
    /// `orientation` is taken relative to gravity; any offset is rotated into
    /// the frame first.
    ///
    /// # Panics
    ///
    /// If the (rotated) frame's determinant is not within [`DET_TOLERANCE`] of
    /// one, or if the final resampling touches the border after the support
    /// region was validated. Both indicate a caller bug.
    pub fn normalize(
        &mut self,
        image: ImageView<'_>,
        x: f32,
        y: f32,
        s: f32,
        affine: Affine2,
        orientation: f32,
    ) -> PatchOutcome {
        let mut frame = affine;
        if !almost_eq(orientation, R_GRAVITY_THETA) {
            frame = frame.rotated(orientation - R_GRAVITY_THETA);
        }

        let det = frame.det();
        assert!(
            (det - 1.0).abs() < DET_TOLERANCE,
            "affine frame must have unit determinant, got {}",
            det
        );

        let Some(geometry) = self.geometry(s) else {
            debug!("Support of ({:.1}, {:.1}) s={} is too large to sample", x, y, s);
            return PatchOutcome::BoundaryRejected(RejectStage::Support);
        };
        let side = self.params.patch_size;
        let scale = geometry.image_to_patch_scale;

        if support_touches_border(image, x, y, &frame.scaled(scale), side, side) {
            debug!("Support of ({:.1}, {:.1}) s={:.2} leaves the image", x, y, s);
            return PatchOutcome::BoundaryRejected(RejectStage::Support);
        }

        let mut patch = Image::new(side, side);
        let touched = match geometry.strategy() {
            SamplingStrategy::Smoothed => {
                match self.sample_smoothed(image, x, y, &frame, &geometry, &mut patch) {
                    Some(touched) => touched,
                    None => {
                        debug!("Intermediate patch of ({:.1}, {:.1}) s={:.2} leaves the image", x, y, s);
                        return PatchOutcome::BoundaryRejected(RejectStage::Intermediate);
                    }
                }
            }
            SamplingStrategy::Direct => Self::sample_direct(image, x, y, &frame, scale, &mut patch),
        };
        assert!(!touched, "canonical resampling left a validated support region");

        PatchOutcome::Normalized(patch)
    }

    /// Extract at native resolution with a one-pixel margin, blur, resample.
    ///
    /// Returns `None` when the extraction touches the border, otherwise
    /// whether the final resampling did.
    fn sample_smoothed(
        &mut self,
        image: ImageView<'_>,
        x: f32,
        y: f32,
        frame: &Affine2,
        geometry: &PatchGeometry,
        patch: &mut CanonicalPatch,
    ) -> Option<bool> {
        let size = geometry.patch_image_size + 2;
        let n = size * size;
        if self.scratch.len() < n {
            self.scratch.resize(n, 0.0);
        }
        let smoothed = &mut self.scratch[..n];

        if warp(image, x, y, frame, smoothed, size, size) {
            return None;
        }
        self.blur.blur_in_place(smoothed, size, size, geometry.blur_sigma());

        let center = (size >> 1) as f32;
        let scale = geometry.image_to_patch_scale;
        let side = patch.width();
        Some(warp(
            ImageView::from_slice(smoothed, size, size),
            center,
            center,
            &Affine2::diagonal(scale, scale),
            patch.as_mut_slice(),
            side,
            side,
        ))
    }

    fn sample_direct(
        image: ImageView<'_>,
        x: f32,
        y: f32,
        frame: &Affine2,
        scale: f32,
        patch: &mut CanonicalPatch,
    ) -> bool {
        let side = patch.width();
        warp(image, x, y, &frame.scaled(scale), patch.as_mut_slice(), side, side)
    }
}
