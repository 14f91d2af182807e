use std::sync::Arc;

use affine_core::{AffineError, AffineParams, AffineResult, Affine2, ImageView, KeypointCandidate};
use log::{debug, trace};

use crate::callback::ShapeCallback;
use crate::mask::gaussian_mask;
use crate::smm::SmmWorkspace;
use crate::types::{AffineShapeEvent, DivergenceReason, ShapeOutcome};

/// Shapes more eccentric than this are not plausible ellipses
pub const MAX_ANISOTROPY: f32 = 6.0;

/// Fixed-point solver for the affine shape of keypoint candidates.
///
/// Owns its warp/gradient workspace; the weighting mask is read-only and can
/// be shared between converters running on different threads.
#[derive(Debug, Clone)]
pub struct ShapeConverger {
    params: AffineParams,
    mask: Arc<[f32]>,
    workspace: SmmWorkspace,
}

impl ShapeConverger {
    /// Creates a converger with its own mask
    pub fn new(params: AffineParams) -> AffineResult<Self> {
        params.validate()?;
        let mask: Arc<[f32]> = gaussian_mask(params.smm_window_size).into();
        Self::with_mask(params, mask)
    }

    /// Creates a converger reusing an existing mask
    pub fn with_mask(params: AffineParams, mask: Arc<[f32]>) -> AffineResult<Self> {
        params.validate()?;
        let window = params.smm_window_size;
        if mask.len() != window * window {
            return Err(AffineError::InvalidWindowSize(window));
        }
        Ok(Self {
            params,
            mask,
            workspace: SmmWorkspace::new(window),
        })
    }

    pub fn params(&self) -> &AffineParams {
        &self.params
    }

    /// Shared weighting mask
    pub fn mask(&self) -> &Arc<[f32]> {
        &self.mask
    }

    /// Iterate the shape of `candidate` on its pyramid `level`.
    ///
    /// Starts from identity. Each round left-multiplies the inverse square
    /// root of the measured SMM into the shape. Succeeds once two consecutive
    /// corrections are within `convergence_threshold` of isotropy (the round
    /// before the first counts as isotropic), after reporting the shape to
    /// `callback` exactly once.
    pub fn try_converge<C: ShapeCallback + ?Sized>(
        &mut self,
        candidate: &KeypointCandidate,
        level: ImageView<'_>,
        callback: &mut C,
    ) -> ShapeOutcome {
        let (lx, ly) = candidate.level_position();
        let ratio = candidate.warp_ratio(self.params.initial_sigma);
        let threshold = self.params.convergence_threshold;

        let mut shape = Affine2::IDENTITY;
        // an isotropic first reading converges immediately
        let mut ratio_prev = 0.0f32;

        for iteration in 0..self.params.max_iterations {
            let smm = self.workspace.estimate(level, lx, ly, &shape.scaled(ratio), &self.mask);

            let Some((correction, correction_eigen)) = smm.inv_sqrt() else {
                debug!("Degenerate SMM {:?} at ({:.1}, {:.1}), iteration {}", smm, candidate.x, candidate.y, iteration);
                return ShapeOutcome::NotConverged(DivergenceReason::Degenerate { iteration });
            };
            let ratio_act = correction_eigen.eigen_ratio();

            shape = correction * shape;

            let Some(eigen) = shape.eigenvalues() else {
                debug!("Shape {:?} lost its real spectrum at ({:.1}, {:.1})", shape, candidate.x, candidate.y);
                return ShapeOutcome::NotConverged(DivergenceReason::Degenerate { iteration });
            };

            let anisotropy = eigen.anisotropy();
            if anisotropy > MAX_ANISOTROPY {
                debug!(
                    "Anisotropy {:.2} exceeds {} at ({:.1}, {:.1}), iteration {}",
                    anisotropy, MAX_ANISOTROPY, candidate.x, candidate.y, iteration
                );
                return ShapeOutcome::NotConverged(DivergenceReason::Anisotropic { iteration, anisotropy });
            }

            trace!("iteration {}: eigen ratio {:.4} (previous {:.4})", iteration, ratio_act, ratio_prev);

            if ratio_act < threshold && ratio_prev < threshold {
                callback.on_affine_shape_found(&AffineShapeEvent {
                    level,
                    x: candidate.x,
                    y: candidate.y,
                    s: candidate.s,
                    pixel_distance: candidate.pixel_distance,
                    shape,
                    kind: candidate.kind,
                    response: candidate.response,
                    iteration,
                });
                return ShapeOutcome::Converged {
                    shape,
                    iterations_used: iteration + 1,
                };
            }
            ratio_prev = ratio_act;
        }

        debug!(
            "No convergence within {} iterations at ({:.1}, {:.1})",
            self.params.max_iterations, candidate.x, candidate.y
        );
        ShapeOutcome::NotConverged(DivergenceReason::IterationsExhausted)
    }
}
