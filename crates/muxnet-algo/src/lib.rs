//! Multilayer network analytics for muxnet.
//!
//! All algorithms are read-only computations over a
//! [`muxnet_graph::MultilayerStore`] snapshot and may run concurrently
//! without coordination:
//!
//! - **Measures**: degree, neighborhood, exclusive neighborhood,
//!   relevance, exclusive relevance, degree deviation
//! - **Layer comparison**: set-overlap coefficients, degree-histogram
//!   divergences, degree correlations
//! - **Distances**: Pareto-optimal multilayer path-length vectors
//! - **Communities**: generalized modularity optimization and
//!   multilayer clique percolation
//! - **Summaries**: per-layer and flattened descriptive statistics

pub mod cliques;
pub mod community;
pub mod comparison;
pub mod distance;
pub mod error;
pub mod measures;
pub mod summary;

mod unionfind;

pub use cliques::{clique_percolation, Clique, CliqueCommunity, CliqueResult};
pub use community::{
    generalized_modularity, ModularityConfig, ModularityResult, VertexAssignment,
};
pub use comparison::{
    correlation_matrix, distribution_matrix, overlap_matrix, ComparisonMatrix,
    CorrelationMethod, DistributionMethod, LayerProperty, OverlapMethod,
};
pub use distance::{pareto_distances, MultiDistance};
pub use error::AlgoError;
pub use measures::{
    actor_measures, degree, degree_deviation, neighbor_set, neighborhood, relevance,
    xneighborhood, xrelevance, ActorMeasureRow,
};
pub use summary::{layer_summaries, LayerSummary, FLATTENED_NAME};
