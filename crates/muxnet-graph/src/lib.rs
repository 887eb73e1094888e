//! # muxnet-graph
//!
//! Multilayer graph store for muxnet.
//!
//! Provides the core data model and in-memory indexes for multiplex
//! network analysis:
//! - [`model::ActorId`] / [`model::LayerId`] — interned identities
//! - [`store::MultilayerStore`] — actors, layers, vertices, edges,
//!   typed attributes, alignment, and the flattened projection
//! - [`adjacency::LayerAdjacency`] — per-layer bidirectional adjacency
//! - [`attributes::AttrRegistry`] — declared-type attribute schema

pub mod adjacency;
pub mod attributes;
pub mod error;
pub mod model;
pub mod store;

pub use adjacency::LayerAdjacency;
pub use attributes::AttrRegistry;
pub use error::StoreError;
pub use model::{
    ActorId, AttrScope, AttrType, AttrValue, Direction, EdgeDirectionality, EdgeRef, Flattened,
    LayerId,
};
pub use store::MultilayerStore;
