pub mod builder;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image;
pub mod interpolation;

pub use builder::AffineParamsBuilder;
pub use config::AffineParams;
pub use error::{AffineError, AffineResult};
pub use geometry::{almost_eq, Affine2, EigenPair, SecondMomentMatrix, GRAVITY_THETA, R_GRAVITY_THETA};
pub use image::{CanonicalPatch, Image, ImageView};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of detector response a candidate was proposed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResponseKind {
    HessianDark,
    HessianBright,
    HessianSaddle,
}

impl ResponseKind {
    /// Stable small-integer tag used by downstream consumers
    pub fn tag(self) -> u8 {
        match self {
            ResponseKind::HessianDark => 0,
            ResponseKind::HessianBright => 1,
            ResponseKind::HessianSaddle => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ResponseKind::HessianDark),
            1 => Some(ResponseKind::HessianBright),
            2 => Some(ResponseKind::HessianSaddle),
            _ => None,
        }
    }
}

/// Keypoint proposed by an upstream detector, in full-resolution coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeypointCandidate {
    pub x: f32,
    pub y: f32,
    pub s: f32,
    /// Downsampling factor of the pyramid level the candidate was found on
    pub pixel_distance: f32,
    pub kind: ResponseKind,
    pub response: f32,
}

impl KeypointCandidate {
    pub fn new(x: f32, y: f32, s: f32, pixel_distance: f32, kind: ResponseKind, response: f32) -> Self {
        Self { x, y, s, pixel_distance, kind, response }
    }

    /// Position on the candidate's own pyramid level
    pub fn level_position(&self) -> (f32, f32) {
        (self.x / self.pixel_distance, self.y / self.pixel_distance)
    }

    /// Warp scale that maps the canonical SMM window onto the level image
    pub fn warp_ratio(&self, initial_sigma: f32) -> f32 {
        self.s / (initial_sigma * self.pixel_distance)
    }
}
