use thiserror::Error;

use crate::model::{AttrScope, AttrType};

/// Schema violations rejected at the store boundary. Queries never
/// produce these; only mutations and attribute writes do.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown actor: {0}")]
    UnknownActor(String),

    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    #[error("duplicate actor: {0}")]
    DuplicateActor(String),

    #[error("duplicate layer: {0}")]
    DuplicateLayer(String),

    #[error("vertex already present: actor {actor} on layer {layer}")]
    DuplicateVertex { actor: String, layer: String },

    #[error("no such vertex: actor {actor} on layer {layer}")]
    UnknownVertex { actor: String, layer: String },

    #[error("edge already present: ({from}, {to}) on layer {layer}")]
    DuplicateEdge { from: String, to: String, layer: String },

    #[error("no such edge: ({from}, {to}) on layer {layer}")]
    UnknownEdge { from: String, to: String, layer: String },

    #[error("self-edge rejected: {actor} on layer {layer}")]
    SelfEdge { actor: String, layer: String },

    #[error("attribute not declared: {name} at scope {scope}")]
    UnknownAttribute { scope: AttrScope, name: String },

    #[error("attribute already declared: {name} at scope {scope}")]
    DuplicateAttribute { scope: AttrScope, name: String },

    #[error("attribute {name}: expected {expected}, got {got}")]
    AttrTypeMismatch { name: String, expected: AttrType, got: AttrType },
}
