use affine_core::{Affine2, ImageView, ResponseKind};

/// Result of running shape convergence on one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeOutcome {
    Converged {
        /// Accumulated shape matrix `U`
        shape: Affine2,
        /// Number of iterations run, including the converging one
        iterations_used: usize,
    },
    NotConverged(DivergenceReason),
}

impl ShapeOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, ShapeOutcome::Converged { .. })
    }

    pub fn shape(&self) -> Option<Affine2> {
        match self {
            ShapeOutcome::Converged { shape, .. } => Some(*shape),
            ShapeOutcome::NotConverged(_) => None,
        }
    }
}

/// Why a candidate was dropped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DivergenceReason {
    IterationsExhausted,
    /// SMM or shape matrix without a usable real positive spectrum
    Degenerate { iteration: usize },
    /// Eigenvalue ratio of the shape matrix left the plausible range
    Anisotropic { iteration: usize, anisotropy: f32 },
}

/// Everything a consumer needs to normalize (or queue) a converged candidate
#[derive(Debug, Clone, Copy)]
pub struct AffineShapeEvent<'a> {
    /// Pyramid level image the shape was estimated on
    pub level: ImageView<'a>,
    pub x: f32,
    pub y: f32,
    pub s: f32,
    pub pixel_distance: f32,
    pub shape: Affine2,
    pub kind: ResponseKind,
    pub response: f32,
    /// Zero-based index of the converging iteration
    pub iteration: usize,
}
