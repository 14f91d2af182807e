/// Resampling ratios above this alias without prefiltering
pub const ANTI_ALIAS_THRESHOLD: f32 = 0.4;

/// Prefilter sigma per unit of downsampling
pub const BLUR_SIGMA_FACTOR: f32 = 1.5;

/// How the support region is brought onto the canonical grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Extract at native resolution, blur, then resample isotropically
    Smoothed,
    /// Interpolate straight into the canonical grid
    Direct,
}

impl SamplingStrategy {
    pub fn select(image_to_patch_scale: f32) -> Self {
        if image_to_patch_scale > ANTI_ALIAS_THRESHOLD {
            SamplingStrategy::Smoothed
        } else {
            SamplingStrategy::Direct
        }
    }
}

/// Size of the native support region of a keypoint and its ratio to the
/// canonical patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchGeometry {
    /// Half-extent of the support region in image pixels
    pub mr_scale: f32,
    /// Odd side of the support region in image pixels
    pub patch_image_size: usize,
    /// Image pixels per canonical patch pixel
    pub image_to_patch_scale: f32,
}

impl PatchGeometry {
    /// Returns `None` when the support side is not representable
    pub fn new(s: f32, mr_size: f32, patch_size: usize) -> Option<Self> {
        let mr_scale = (s * mr_size).ceil().max(0.0);
        if !mr_scale.is_finite() {
            return None;
        }
        let patch_image_size = (mr_scale as usize).checked_mul(2)?.checked_add(1)?;
        Some(Self {
            mr_scale,
            patch_image_size,
            image_to_patch_scale: patch_image_size as f32 / patch_size as f32,
        })
    }

    pub fn strategy(&self) -> SamplingStrategy {
        SamplingStrategy::select(self.image_to_patch_scale)
    }

    pub fn blur_sigma(&self) -> f32 {
        BLUR_SIGMA_FACTOR * self.image_to_patch_scale
    }
}
