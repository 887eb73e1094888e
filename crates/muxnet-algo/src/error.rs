use thiserror::Error;

/// Parameter violations, rejected before any computation starts.
#[derive(Debug, Error)]
pub enum AlgoError {
    #[error("minimum clique size must be >= 2, got {0}")]
    CliqueSizeTooSmall(usize),

    #[error("layer span must be between 1 and {layers}, got {m}")]
    LayerSpanOutOfRange { m: usize, layers: usize },

    #[error("histogram bin count must be positive")]
    EmptyBinning,
}
