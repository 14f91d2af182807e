use crate::config::AffineParams;
use crate::error::AffineResult;

/// Fluent builder for [`AffineParams`]
#[derive(Debug, Clone)]
pub struct AffineParamsBuilder {
    params: AffineParams,
}

impl AffineParamsBuilder {
    pub fn new() -> Self {
        Self::from_params(AffineParams::default())
    }

    /// Start from an existing configuration
    pub fn from_params(params: AffineParams) -> Self {
        Self { params }
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.params.max_iterations = n;
        self
    }

    pub fn convergence_threshold(mut self, threshold: f32) -> Self {
        self.params.convergence_threshold = threshold;
        self
    }

    /// Set the SMM window side (must be odd)
    pub fn smm_window_size(mut self, size: usize) -> Self {
        self.params.smm_window_size = size;
        self
    }

    pub fn initial_sigma(mut self, sigma: f32) -> Self {
        self.params.initial_sigma = sigma;
        self
    }

    pub fn mr_size(mut self, mr_size: f32) -> Self {
        self.params.mr_size = mr_size;
        self
    }

    /// Set the canonical patch side (must be odd)
    pub fn patch_size(mut self, size: usize) -> Self {
        self.params.patch_size = size;
        self
    }

    pub fn threads(mut self, n_threads: usize) -> Self {
        self.params.n_threads = n_threads;
        self
    }

    pub fn preset_fast(mut self) -> Self {
        let n_threads = self.params.n_threads;
        self.params = AffineParams { n_threads, ..AffineParams::fast_preset() };
        self
    }

    pub fn preset_precise(mut self) -> Self {
        let n_threads = self.params.n_threads;
        self.params = AffineParams { n_threads, ..AffineParams::precise_preset() };
        self
    }

    /// Validate and return the parameters
    pub fn build(self) -> AffineResult<AffineParams> {
        self.params.validate()?;
        Ok(self.params)
    }

    pub fn summary(&self) -> String {
        self.params.summary()
    }
}

impl Default for AffineParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
