use thiserror::Error;

use muxnet_graph::StoreError;

/// Configuration and runtime failures of the growth simulator.
/// Configuration errors are rejected by [`crate::GrowthEngine::new`]
/// before any step runs.
#[derive(Debug, Error)]
pub enum GrowthError {
    #[error("layer {layer}: action probabilities sum to {total}, must not exceed 1")]
    ProbabilityOutOfRange { layer: String, total: f64 },

    #[error("layer {layer}: negative action probability")]
    NegativeProbability { layer: String },

    #[error("layer {layer}: external action configured without dependencies")]
    MissingDependency { layer: String },

    #[error("layer {layer}: dependency {dependency} is not a configured layer")]
    UnknownDependency { layer: String, dependency: String },

    #[error("layer {layer}: dependency {dependency} must have positive weight")]
    BadDependencyWeight { layer: String, dependency: String },

    #[error("layer {layer}: {reason}")]
    InvalidModel { layer: String, reason: String },

    #[error("layer {layer}: invalid sampling weights: {reason}")]
    BadWeights { layer: String, reason: String },

    #[error("duplicate layer in growth config: {0}")]
    DuplicateLayerName(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
