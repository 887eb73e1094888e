use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────

/// Dense handle for an actor. Assigned by the store at insertion time;
/// stable for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Dense handle for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "l{}", self.0)
    }
}

// ─────────────────────────────────────────────
// Directionality
// ─────────────────────────────────────────────

/// Whether a layer's edges are ordered pairs or unordered pairs.
/// Fixed at layer creation; a layer never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirectionality {
    Directed,
    Undirected,
}

impl EdgeDirectionality {
    #[inline]
    pub fn is_directed(self) -> bool {
        matches!(self, Self::Directed)
    }
}

impl std::fmt::Display for EdgeDirectionality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directed => write!(f, "DIRECTED"),
            Self::Undirected => write!(f, "UNDIRECTED"),
        }
    }
}

/// Which incident edges to count on a directed layer.
/// On undirected layers all three modes coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    Both,
}

// ─────────────────────────────────────────────
// Attributes
// ─────────────────────────────────────────────

/// Declared value type for an attribute name at one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Numeric,
    Text,
    Categorical,
}

impl std::fmt::Display for AttrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrType::Numeric => write!(f, "numeric"),
            AttrType::Text => write!(f, "text"),
            AttrType::Categorical => write!(f, "categorical"),
        }
    }
}

/// An attribute value. Its variant must match the declared [`AttrType`]
/// of the attribute it is written to; the store rejects mismatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Numeric(f64),
    Text(String),
    Categorical(String),
}

impl AttrValue {
    /// The type this value satisfies.
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::Numeric(_) => AttrType::Numeric,
            AttrValue::Text(_) => AttrType::Text,
            AttrValue::Categorical(_) => AttrType::Categorical,
        }
    }

    /// Numeric payload, if this is a numeric value.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            AttrValue::Numeric(x) => Some(*x),
            _ => None,
        }
    }

    /// String payload for text and categorical values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) | AttrValue::Categorical(s) => Some(s),
            AttrValue::Numeric(_) => None,
        }
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Numeric(x) => write!(f, "{x}"),
            AttrValue::Text(s) | AttrValue::Categorical(s) => write!(f, "{s}"),
        }
    }
}

/// Scope an attribute is attached at. Vertex and edge attributes are
/// layer-specific: the same name may carry different types on different
/// layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrScope {
    Actor,
    Vertex(LayerId),
    Edge(LayerId),
}

impl std::fmt::Display for AttrScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrScope::Actor => write!(f, "actor"),
            AttrScope::Vertex(l) => write!(f, "vertex@{l}"),
            AttrScope::Edge(l) => write!(f, "edge@{l}"),
        }
    }
}

// ─────────────────────────────────────────────
// Edge reference
// ─────────────────────────────────────────────

/// A resolved edge: two co-layer vertices. For undirected layers the
/// endpoints are normalized so `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeRef {
    pub from: ActorId,
    pub to: ActorId,
    pub layer: LayerId,
}

// ─────────────────────────────────────────────
// Flattened projection
// ─────────────────────────────────────────────

/// The single-layer projection of the whole network: vertex set is the
/// union of all vertices (by actor), edge set the union of all edges.
/// Undirected unless every source layer is directed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flattened {
    pub directionality: EdgeDirectionality,
    /// Actors with a vertex on at least one layer, ascending.
    pub actors: Vec<ActorId>,
    /// Distinct edges after projection, ascending. Normalized to
    /// `(min, max)` when the projection is undirected.
    pub edges: Vec<(ActorId, ActorId)>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
