use crate::builder::AffineParamsBuilder;
use crate::error::{AffineError, AffineResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters shared by shape convergence and patch normalization
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AffineParams {
    /// Upper bound on fixed-point iterations per candidate
    pub max_iterations: usize,
    /// Eigen ratio below which an iteration counts as converged
    pub convergence_threshold: f32,
    /// Side of the warped SMM window (odd)
    pub smm_window_size: usize,
    /// Sigma of the pyramid level's base blur
    pub initial_sigma: f32,
    /// Measurement region half-size multiplier
    pub mr_size: f32,
    /// Side of the canonical output patch (odd)
    pub patch_size: usize,
    /// Worker threads for batch extraction
    pub n_threads: usize,
}

impl Default for AffineParams {
    fn default() -> Self {
        Self {
            max_iterations: 16,
            convergence_threshold: 0.05,
            smm_window_size: 19,
            initial_sigma: 1.6,
            mr_size: 3.0 * 3.0f32.sqrt(),
            patch_size: 41,
            n_threads: num_cpus::get().max(1),
        }
    }
}

impl AffineParams {
    /// Fewer iterations and a looser threshold for throughput
    pub fn fast_preset() -> Self {
        Self {
            max_iterations: 8,
            convergence_threshold: 0.1,
            smm_window_size: 15,
            ..Self::default()
        }
    }

    /// Tighter convergence and a larger window for shape accuracy
    pub fn precise_preset() -> Self {
        Self {
            max_iterations: 32,
            convergence_threshold: 0.02,
            smm_window_size: 25,
            ..Self::default()
        }
    }

    pub fn builder() -> AffineParamsBuilder {
        AffineParamsBuilder::from_params(Self::default())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> AffineResult<()> {
        if self.max_iterations == 0 {
            return Err(AffineError::InvalidIterations(self.max_iterations));
        }
        if !(self.convergence_threshold > 0.0 && self.convergence_threshold < 1.0) {
            return Err(AffineError::InvalidThreshold(self.convergence_threshold));
        }
        if self.smm_window_size < 3 || self.smm_window_size % 2 == 0 {
            return Err(AffineError::InvalidWindowSize(self.smm_window_size));
        }
        if !(self.initial_sigma.is_finite() && self.initial_sigma > 0.0) {
            return Err(AffineError::InvalidSigma(self.initial_sigma));
        }
        if !(self.mr_size.is_finite() && self.mr_size > 0.0) {
            return Err(AffineError::InvalidMrSize(self.mr_size));
        }
        if self.patch_size < 3 || self.patch_size % 2 == 0 {
            return Err(AffineError::InvalidPatchSize(self.patch_size));
        }
        if self.n_threads == 0 {
            return Err(AffineError::InvalidThreadCount(self.n_threads));
        }
        Ok(())
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "AffineParams: iterations={}, threshold={}, window={}, sigma0={}, mr_size={:.3}, patch={}, threads={}",
            self.max_iterations, self.convergence_threshold, self.smm_window_size,
            self.initial_sigma, self.mr_size, self.patch_size, self.n_threads
        )
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> AffineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AffineError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> AffineResult<Self> {
        let params: Self = serde_json::from_str(json).map_err(|e| AffineError::Serialization(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> AffineResult<String> {
        toml::to_string_pretty(self).map_err(|e| AffineError::Serialization(e.to_string()))
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> AffineResult<Self> {
        let params: Self = toml::from_str(toml_str).map_err(|e| AffineError::Serialization(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = AffineParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.smm_window_size, 19);
        assert_eq!(params.patch_size, 41);
        assert!((params.mr_size - 5.196152).abs() < 1e-5);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(AffineParams::fast_preset().validate().is_ok());
        assert!(AffineParams::precise_preset().validate().is_ok());
    }

    #[test]
    fn test_even_window_rejected() {
        let params = AffineParams { smm_window_size: 18, ..AffineParams::default() };
        assert_eq!(params.validate(), Err(AffineError::InvalidWindowSize(18)));
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let base = AffineParams::default();
        assert!(matches!(
            AffineParams { max_iterations: 0, ..base.clone() }.validate(),
            Err(AffineError::InvalidIterations(0))
        ));
        assert!(matches!(
            AffineParams { convergence_threshold: 1.5, ..base.clone() }.validate(),
            Err(AffineError::InvalidThreshold(_))
        ));
        assert!(matches!(
            AffineParams { initial_sigma: f32::NAN, ..base.clone() }.validate(),
            Err(AffineError::InvalidSigma(_))
        ));
        assert!(matches!(
            AffineParams { patch_size: 40, ..base.clone() }.validate(),
            Err(AffineError::InvalidPatchSize(40))
        ));
        assert!(matches!(
            AffineParams { n_threads: 0, ..base }.validate(),
            Err(AffineError::InvalidThreadCount(0))
        ));
    }

    #[test]
    fn test_summary_mentions_window() {
        assert!(AffineParams::default().summary().contains("window=19"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_and_toml_conversion() {
        let params = AffineParams::precise_preset();
        let json = params.to_json().unwrap();
        assert_eq!(AffineParams::from_json(&json).unwrap(), params);
        let toml_str = params.to_toml().unwrap();
        assert_eq!(AffineParams::from_toml(&toml_str).unwrap(), params);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_validates() {
        let mut params = AffineParams::default();
        params.patch_size = 8;
        let json = serde_json::to_string(&params).unwrap();
        assert!(matches!(AffineParams::from_json(&json), Err(AffineError::InvalidPatchSize(8))));
    }
}
