#[derive(Debug, Clone, PartialEq)]
pub enum AffineError {
    InvalidImageSize { width: usize, height: usize },
    InvalidImageData { expected_len: usize, actual_len: usize },
    InvalidWindowSize(usize),
    InvalidPatchSize(usize),
    InvalidIterations(usize),
    InvalidThreshold(f32),
    InvalidSigma(f32),
    InvalidMrSize(f32),
    InvalidThreadCount(usize),
    #[cfg(feature = "serde")]
    Serialization(String),
}

impl std::fmt::Display for AffineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AffineError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            AffineError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            AffineError::InvalidWindowSize(size) => {
                write!(f, "Invalid SMM window size: {} (must be odd and >= 3)", size)
            }
            AffineError::InvalidPatchSize(size) => {
                write!(f, "Invalid patch size: {} (must be odd and >= 3)", size)
            }
            AffineError::InvalidIterations(n) => {
                write!(f, "Invalid iteration budget: {} (must be > 0)", n)
            }
            AffineError::InvalidThreshold(t) => {
                write!(f, "Invalid convergence threshold: {} (must be in (0, 1))", t)
            }
            AffineError::InvalidSigma(s) => {
                write!(f, "Invalid initial sigma: {} (must be finite and > 0)", s)
            }
            AffineError::InvalidMrSize(m) => {
                write!(f, "Invalid measurement region size: {} (must be finite and > 0)", m)
            }
            AffineError::InvalidThreadCount(n) => {
                write!(f, "Invalid thread count: {} (must be > 0)", n)
            }
            #[cfg(feature = "serde")]
            AffineError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AffineError {}

pub type AffineResult<T> = Result<T, AffineError>;
