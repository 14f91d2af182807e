use affine_core::CanonicalPatch;

/// Result of normalizing one keypoint
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    Normalized(CanonicalPatch),
    BoundaryRejected(RejectStage),
}

impl PatchOutcome {
    pub fn is_normalized(&self) -> bool {
        matches!(self, PatchOutcome::Normalized(_))
    }

    pub fn into_patch(self) -> Option<CanonicalPatch> {
        match self {
            PatchOutcome::Normalized(patch) => Some(patch),
            PatchOutcome::BoundaryRejected(_) => None,
        }
    }
}

/// Where the support region was found to leave the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectStage {
    /// Full-resolution support check
    Support,
    /// Enlarged extraction ahead of the anti-aliasing blur
    Intermediate,
}
