use affine_core::{
    AffineError, AffineParams, Affine2, CanonicalPatch, ImageView, KeypointCandidate, ResponseKind, R_GRAVITY_THETA,
};
use affine_patch::{Blur, GaussianBlur, PatchNormalizer, PatchOutcome};
use affine_shape::{AffineShapeEvent, ShapeCallback, ShapeCallbackExt, ShapeConverger};
use log::{debug, trace};
use rayon::prelude::*;

pub use affine_core::{self, AffineParams as Config, Image as AffineImage, KeypointCandidate as Candidate};
pub use affine_patch::{self, RejectStage};
pub use affine_shape::{self, ShapeOutcome};

#[derive(Debug)]
pub enum RegionError {
    Params(AffineError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionError::Params(e) => write!(f, "Parameter error: {}", e),
            RegionError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for RegionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegionError::Params(e) => Some(e),
            RegionError::ThreadPool(e) => Some(e),
        }
    }
}

impl From<AffineError> for RegionError {
    fn from(err: AffineError) -> Self {
        RegionError::Params(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for RegionError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        RegionError::ThreadPool(err)
    }
}

pub type RegionResult<T> = Result<T, RegionError>;

/// Dominant orientation of a normalized region, relative to gravity
pub trait OrientationEstimator {
    fn estimate(&self, image: ImageView<'_>, x: f32, y: f32, s: f32, frame: &Affine2) -> f32;
}

/// Assumes every region is upright
#[derive(Debug, Clone, Copy, Default)]
pub struct GravityOrientation;

impl OrientationEstimator for GravityOrientation {
    fn estimate(&self, _image: ImageView<'_>, _x: f32, _y: f32, _s: f32, _frame: &Affine2) -> f32 {
        R_GRAVITY_THETA
    }
}

/// A converged and normalized keypoint
#[derive(Debug, Clone, PartialEq)]
pub struct AffineRegion {
    pub x: f32,
    pub y: f32,
    pub s: f32,
    /// Unit-determinant frame with its first axis pointing up
    pub shape: Affine2,
    pub orientation: f32,
    pub kind: ResponseKind,
    pub response: f32,
    pub iterations_used: usize,
    pub patch: CanonicalPatch,
}

/// Shape callback that normalizes every converged candidate against the
/// full-resolution image.
pub struct NormalizingCallback<'a, B: Blur, O: OrientationEstimator + ?Sized> {
    image: ImageView<'a>,
    normalizer: &'a mut PatchNormalizer<B>,
    orientation: &'a O,
    regions: Vec<AffineRegion>,
    rejected: usize,
}

impl<'a, B: Blur, O: OrientationEstimator + ?Sized> NormalizingCallback<'a, B, O> {
    pub fn new(image: ImageView<'a>, normalizer: &'a mut PatchNormalizer<B>, orientation: &'a O) -> Self {
        Self {
            image,
            normalizer,
            orientation,
            regions: Vec::new(),
            rejected: 0,
        }
    }

    pub fn regions(&self) -> &[AffineRegion] {
        &self.regions
    }

    /// Converged shapes whose support left the image
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn into_regions(self) -> Vec<AffineRegion> {
        self.regions
    }
}

impl<B: Blur, O: OrientationEstimator + ?Sized> ShapeCallback for NormalizingCallback<'_, B, O> {
    fn on_affine_shape_found(&mut self, event: &AffineShapeEvent<'_>) {
        let frame = event.shape.rectified_up_is_up();
        let orientation = self.orientation.estimate(self.image, event.x, event.y, event.s, &frame);

        match self.normalizer.normalize(self.image, event.x, event.y, event.s, frame, orientation) {
            PatchOutcome::Normalized(patch) => self.regions.push(AffineRegion {
                x: event.x,
                y: event.y,
                s: event.s,
                shape: frame,
                orientation,
                kind: event.kind,
                response: event.response,
                iterations_used: event.iteration + 1,
                patch,
            }),
            PatchOutcome::BoundaryRejected(stage) => {
                trace!("Dropping ({:.1}, {:.1}) s={:.2}: {:?} rejected", event.x, event.y, event.s, stage);
                self.rejected += 1;
            }
        }
    }
}

/// High-level extractor that turns keypoint candidates into canonical affine
/// regions.
///
/// `image` is the full-resolution image patches are sampled from; `level` is
/// the pyramid level the candidates were detected on.
pub struct AffineRegionExtractor<O = GravityOrientation> {
    params: AffineParams,
    converger: ShapeConverger,
    normalizer: PatchNormalizer<GaussianBlur>,
    orientation: O,
    pool: rayon::ThreadPool,
}

impl AffineRegionExtractor<GravityOrientation> {
    /// Create an extractor that keeps every region upright
    pub fn new(params: AffineParams) -> RegionResult<Self> {
        Self::with_orientation(params, GravityOrientation)
    }
}

impl<O: OrientationEstimator> AffineRegionExtractor<O> {
    pub fn with_orientation(params: AffineParams, orientation: O) -> RegionResult<Self> {
        params.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.n_threads)
            .build()?;
        let converger = ShapeConverger::new(params.clone())?;
        let normalizer = PatchNormalizer::new(params.clone())?;

        debug!("Affine region extractor ready: {}", params.summary());

        Ok(Self {
            params,
            converger,
            normalizer,
            orientation,
            pool,
        })
    }

    pub fn params(&self) -> &AffineParams {
        &self.params
    }

    pub fn orientation(&self) -> &O {
        &self.orientation
    }

    /// Converge and normalize candidates on the calling thread
    pub fn extract(
        &mut self,
        image: ImageView<'_>,
        level: ImageView<'_>,
        candidates: &[KeypointCandidate],
    ) -> Vec<AffineRegion> {
        let mut sink = NormalizingCallback::new(image, &mut self.normalizer, &self.orientation);
        let mut converged = 0;
        for candidate in candidates {
            if self.converger.try_converge(candidate, level, &mut sink).is_converged() {
                converged += 1;
            }
        }

        debug!(
            "Extracted {} regions from {} candidates ({} converged, {} rejected at the border)",
            sink.regions().len(),
            candidates.len(),
            converged,
            sink.rejected()
        );
        sink.into_regions()
    }

    /// Like [`extract`](Self::extract), also forwarding each converged shape
    /// to `observer` after it has been normalized.
    ///
    /// The observer is returned alongside the regions.
    pub fn extract_with<C: ShapeCallback>(
        &mut self,
        image: ImageView<'_>,
        level: ImageView<'_>,
        candidates: &[KeypointCandidate],
        observer: C,
    ) -> (Vec<AffineRegion>, C) {
        let mut chain = NormalizingCallback::new(image, &mut self.normalizer, &self.orientation).and_then(observer);
        for candidate in candidates {
            self.converger.try_converge(candidate, level, &mut chain);
        }

        let (sink, observer) = chain.into_inner();
        debug!(
            "Extracted {} regions from {} candidates ({} rejected at the border)",
            sink.regions().len(),
            candidates.len(),
            sink.rejected()
        );
        (sink.into_regions(), observer)
    }

    /// Converge and normalize candidates on the extractor's thread pool.
    ///
    /// Each worker owns a converger and normalizer; the weighting mask is
    /// shared. Regions come back in candidate order.
    pub fn extract_par(
        &self,
        image: ImageView<'_>,
        level: ImageView<'_>,
        candidates: &[KeypointCandidate],
    ) -> Vec<AffineRegion>
    where
        O: Sync,
    {
        let orientation = &self.orientation;
        let regions: Vec<AffineRegion> = self.pool.install(|| {
            candidates
                .par_iter()
                .map_init(
                    || (self.converger.clone(), self.normalizer.clone()),
                    |(converger, normalizer), candidate| {
                        let mut sink = NormalizingCallback::new(image, normalizer, orientation);
                        converger.try_converge(candidate, level, &mut sink);
                        sink.into_regions().pop()
                    },
                )
                .flatten()
                .collect()
        });

        debug!(
            "Extracted {} regions from {} candidates on {} threads",
            regions.len(),
            candidates.len(),
            self.pool.current_num_threads()
        );
        regions
    }
}
