//! Iterative affine shape estimation from the second moment matrix.
//!
//! [`ShapeConverger`] warps the neighbourhood of a keypoint candidate with the
//! current shape estimate, measures the second moment matrix of the warped
//! window and folds its inverse square root back into the estimate until the
//! window looks isotropic.

pub mod callback;
pub mod converger;
pub mod gradient;
pub mod mask;
pub mod smm;
pub mod types;

pub use callback::{Chain, NoopCallback, ShapeCallback, ShapeCallbackExt};
pub use converger::{ShapeConverger, MAX_ANISOTROPY};
pub use gradient::compute_gradient;
pub use mask::gaussian_mask;
pub use smm::SmmWorkspace;
pub use types::{AffineShapeEvent, DivergenceReason, ShapeOutcome};
