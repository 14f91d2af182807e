//! Canonical patch extraction from an affine frame and a gravity-relative
//! orientation.

pub mod blur;
pub mod normalizer;
pub mod strategy;
pub mod types;

pub use blur::{Blur, GaussianBlur};
pub use normalizer::{PatchNormalizer, DET_TOLERANCE};
pub use strategy::{PatchGeometry, SamplingStrategy, ANTI_ALIAS_THRESHOLD, BLUR_SIGMA_FACTOR};
pub use types::{PatchOutcome, RejectStage};
