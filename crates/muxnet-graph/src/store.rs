use std::collections::HashMap;

use crate::adjacency::LayerAdjacency;
use crate::attributes::AttrRegistry;
use crate::error::StoreError;
use crate::model::{
    ActorId, AttrScope, AttrType, AttrValue, Direction, EdgeDirectionality, EdgeRef, Flattened,
    LayerId,
};

// ─────────────────────────────────────────────
// Internal records
// ─────────────────────────────────────────────

#[derive(Debug)]
struct ActorRecord {
    name: String,
    attrs: HashMap<String, AttrValue>,
}

#[derive(Debug)]
struct LayerState {
    name: String,
    directionality: EdgeDirectionality,
    /// actor → vertex attribute values
    vertices: HashMap<ActorId, HashMap<String, AttrValue>>,
    /// normalized endpoint pair → edge attribute values
    edges: HashMap<(ActorId, ActorId), HashMap<String, AttrValue>>,
    adjacency: LayerAdjacency,
}

impl LayerState {
    /// Canonical edge key. Undirected layers store unordered pairs as
    /// `(min, max)`; directed layers keep the `(source, target)` order.
    fn edge_key(&self, from: ActorId, to: ActorId) -> (ActorId, ActorId) {
        match self.directionality {
            EdgeDirectionality::Directed => (from, to),
            EdgeDirectionality::Undirected => {
                if from <= to {
                    (from, to)
                } else {
                    (to, from)
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// MultilayerStore
// ─────────────────────────────────────────────

/// The multilayer graph store.
///
/// Holds actors (global identities), layers (relation types with fixed
/// directionality), vertices (actor-in-layer pairings), edges (co-layer
/// vertex pairs), and typed attributes at three scopes.
///
/// Mutations validate every reference and fail with a distinguishable
/// [`StoreError`]; queries never mutate. Analytical consumers take
/// `&MultilayerStore` and may run concurrently over a stable snapshot.
#[derive(Debug, Default)]
pub struct MultilayerStore {
    actors: Vec<ActorRecord>,
    actor_index: HashMap<String, ActorId>,
    layers: Vec<LayerState>,
    layer_index: HashMap<String, LayerId>,
    registry: AttrRegistry,
}

impl MultilayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Label helpers for error reporting ──────────────

    fn actor_label(&self, id: ActorId) -> String {
        self.actor_name(id).map(str::to_owned).unwrap_or_else(|| id.to_string())
    }

    fn layer_label(&self, id: LayerId) -> String {
        self.layer_name(id).map(str::to_owned).unwrap_or_else(|| id.to_string())
    }

    fn layer_state(&self, id: LayerId) -> Option<&LayerState> {
        self.layers.get(id.0 as usize)
    }

    fn layer_state_mut(&mut self, id: LayerId) -> Result<&mut LayerState, StoreError> {
        let label = self.layer_label(id);
        self.layers
            .get_mut(id.0 as usize)
            .ok_or(StoreError::UnknownLayer(label))
    }

    fn require_layer(&self, id: LayerId) -> Result<&LayerState, StoreError> {
        self.layer_state(id)
            .ok_or_else(|| StoreError::UnknownLayer(self.layer_label(id)))
    }

    fn require_actor(&self, id: ActorId) -> Result<&ActorRecord, StoreError> {
        self.actors
            .get(id.0 as usize)
            .ok_or_else(|| StoreError::UnknownActor(self.actor_label(id)))
    }

    // ── Layers ─────────────────────────────────────────

    /// Create a layer. Directionality is fixed for its lifetime.
    pub fn add_layer(
        &mut self,
        name: &str,
        directionality: EdgeDirectionality,
    ) -> Result<LayerId, StoreError> {
        if self.layer_index.contains_key(name) {
            return Err(StoreError::DuplicateLayer(name.to_owned()));
        }
        let id = LayerId(self.layers.len() as u32);
        self.layers.push(LayerState {
            name: name.to_owned(),
            directionality,
            vertices: HashMap::new(),
            edges: HashMap::new(),
            adjacency: LayerAdjacency::new(),
        });
        self.layer_index.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn layer_id(&self, name: &str) -> Option<LayerId> {
        self.layer_index.get(name).copied()
    }

    pub fn layer_name(&self, id: LayerId) -> Option<&str> {
        self.layer_state(id).map(|l| l.name.as_str())
    }

    pub fn directionality(&self, id: LayerId) -> Option<EdgeDirectionality> {
        self.layer_state(id).map(|l| l.directionality)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// All layer ids, in creation order.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        (0..self.layers.len() as u32).map(LayerId).collect()
    }

    // ── Actors ─────────────────────────────────────────

    /// Register a new actor. Fails on duplicate names.
    pub fn add_actor(&mut self, name: &str) -> Result<ActorId, StoreError> {
        if self.actor_index.contains_key(name) {
            return Err(StoreError::DuplicateActor(name.to_owned()));
        }
        let id = ActorId(self.actors.len() as u32);
        self.actors.push(ActorRecord { name: name.to_owned(), attrs: HashMap::new() });
        self.actor_index.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Get-or-create by name.
    pub fn ensure_actor(&mut self, name: &str) -> ActorId {
        match self.actor_index.get(name) {
            Some(&id) => id,
            None => {
                let id = ActorId(self.actors.len() as u32);
                self.actors.push(ActorRecord { name: name.to_owned(), attrs: HashMap::new() });
                self.actor_index.insert(name.to_owned(), id);
                id
            }
        }
    }

    pub fn actor_id(&self, name: &str) -> Option<ActorId> {
        self.actor_index.get(name).copied()
    }

    pub fn actor_name(&self, id: ActorId) -> Option<&str> {
        self.actors.get(id.0 as usize).map(|a| a.name.as_str())
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// All actor ids, in creation order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        (0..self.actors.len() as u32).map(ActorId).collect()
    }

    // ── Vertices ───────────────────────────────────────

    /// Add the vertex (actor, layer). Both must already exist.
    pub fn add_vertex(&mut self, actor: ActorId, layer: LayerId) -> Result<(), StoreError> {
        self.require_actor(actor)?;
        self.require_layer(layer)?;
        let actor_label = self.actor_label(actor);
        let layer_label = self.layer_label(layer);
        let state = self.layer_state_mut(layer)?;
        if state.vertices.contains_key(&actor) {
            return Err(StoreError::DuplicateVertex { actor: actor_label, layer: layer_label });
        }
        state.vertices.insert(actor, HashMap::new());
        Ok(())
    }

    /// Remove a vertex and every edge incident to it on that layer.
    pub fn remove_vertex(&mut self, actor: ActorId, layer: LayerId) -> Result<(), StoreError> {
        let actor_label = self.actor_label(actor);
        let layer_label = self.layer_label(layer);
        let state = self.layer_state_mut(layer)?;
        if state.vertices.remove(&actor).is_none() {
            return Err(StoreError::UnknownVertex { actor: actor_label, layer: layer_label });
        }
        state.edges.retain(|&(a, b), _| a != actor && b != actor);
        state.adjacency.remove_actor(actor);
        Ok(())
    }

    pub fn contains_vertex(&self, actor: ActorId, layer: LayerId) -> bool {
        self.layer_state(layer)
            .map(|l| l.vertices.contains_key(&actor))
            .unwrap_or(false)
    }

    /// Number of vertices on a layer.
    pub fn order(&self, layer: LayerId) -> usize {
        self.layer_state(layer).map(|l| l.vertices.len()).unwrap_or(0)
    }

    // ── Edges ──────────────────────────────────────────

    /// Add an edge between two existing vertices of the same layer.
    /// Multi-edges and self-edges are rejected.
    pub fn add_edge(&mut self, from: ActorId, to: ActorId, layer: LayerId) -> Result<(), StoreError> {
        let from_label = self.actor_label(from);
        let to_label = self.actor_label(to);
        let layer_label = self.layer_label(layer);

        if from == to {
            return Err(StoreError::SelfEdge { actor: from_label, layer: layer_label });
        }
        let state = self.layer_state_mut(layer)?;
        for (v, label) in [(from, &from_label), (to, &to_label)] {
            if !state.vertices.contains_key(&v) {
                return Err(StoreError::UnknownVertex {
                    actor: label.clone(),
                    layer: layer_label,
                });
            }
        }
        let key = state.edge_key(from, to);
        if state.edges.contains_key(&key) {
            return Err(StoreError::DuplicateEdge {
                from: from_label,
                to: to_label,
                layer: layer_label,
            });
        }
        state.edges.insert(key, HashMap::new());
        match state.directionality {
            EdgeDirectionality::Directed => state.adjacency.add_link(from, to),
            EdgeDirectionality::Undirected => {
                state.adjacency.add_link(from, to);
                state.adjacency.add_link(to, from);
            }
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, from: ActorId, to: ActorId, layer: LayerId) -> Result<(), StoreError> {
        let from_label = self.actor_label(from);
        let to_label = self.actor_label(to);
        let layer_label = self.layer_label(layer);
        let state = self.layer_state_mut(layer)?;
        let key = state.edge_key(from, to);
        if state.edges.remove(&key).is_none() {
            return Err(StoreError::UnknownEdge {
                from: from_label,
                to: to_label,
                layer: layer_label,
            });
        }
        match state.directionality {
            EdgeDirectionality::Directed => state.adjacency.remove_link(from, to),
            EdgeDirectionality::Undirected => {
                state.adjacency.remove_link(key.0, key.1);
                state.adjacency.remove_link(key.1, key.0);
            }
        }
        Ok(())
    }

    pub fn contains_edge(&self, from: ActorId, to: ActorId, layer: LayerId) -> bool {
        self.layer_state(layer)
            .map(|l| l.edges.contains_key(&l.edge_key(from, to)))
            .unwrap_or(false)
    }

    /// Number of edges on a layer.
    pub fn size(&self, layer: LayerId) -> usize {
        self.layer_state(layer).map(|l| l.edges.len()).unwrap_or(0)
    }

    // ── Neighborhood queries ───────────────────────────

    /// Actors adjacent to `actor` on one layer. An actor absent from the
    /// layer simply has no neighbors there. On undirected layers every
    /// direction mode returns the same set.
    pub fn neighbors(&self, actor: ActorId, layer: LayerId, direction: Direction) -> Vec<ActorId> {
        match self.layer_state(layer) {
            Some(state) => match state.directionality {
                EdgeDirectionality::Undirected => state.adjacency.neighbors(actor, Direction::Out),
                EdgeDirectionality::Directed => state.adjacency.neighbors(actor, direction),
            },
            None => Vec::new(),
        }
    }

    /// Count of distinct edges incident to `actor` on one layer.
    /// On directed layers `Both` sums in- and out-degree; absence from
    /// the layer yields 0, never an error.
    pub fn degree_in_layer(&self, actor: ActorId, layer: LayerId, direction: Direction) -> usize {
        match self.layer_state(layer) {
            Some(state) => match state.directionality {
                EdgeDirectionality::Undirected => state.adjacency.degree(actor, Direction::Out),
                EdgeDirectionality::Directed => state.adjacency.degree(actor, direction),
            },
            None => 0,
        }
    }

    // ── Enumeration ────────────────────────────────────

    /// Actors with a vertex on at least one of the given layers, ascending.
    pub fn actors_in(&self, layers: &[LayerId]) -> Vec<ActorId> {
        let mut out: Vec<ActorId> = Vec::new();
        for &l in layers {
            if let Some(state) = self.layer_state(l) {
                out.extend(state.vertices.keys().copied());
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Enumerate vertices, optionally restricted to layer and actor sets.
    /// Sorted by (actor, layer).
    pub fn vertices(
        &self,
        layers: Option<&[LayerId]>,
        actors: Option<&[ActorId]>,
    ) -> Vec<(ActorId, LayerId)> {
        let layer_ids: Vec<LayerId> = match layers {
            Some(ls) => ls.to_vec(),
            None => self.layer_ids(),
        };
        let mut out = Vec::new();
        for l in layer_ids {
            if let Some(state) = self.layer_state(l) {
                for &a in state.vertices.keys() {
                    if actors.map(|f| f.contains(&a)).unwrap_or(true) {
                        out.push((a, l));
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Enumerate edges, optionally restricted to a layer set.
    /// Sorted by (layer, from, to).
    pub fn edges(&self, layers: Option<&[LayerId]>) -> Vec<EdgeRef> {
        let layer_ids: Vec<LayerId> = match layers {
            Some(ls) => ls.to_vec(),
            None => self.layer_ids(),
        };
        let mut out = Vec::new();
        for l in layer_ids {
            if let Some(state) = self.layer_state(l) {
                for &(from, to) in state.edges.keys() {
                    out.push(EdgeRef { from, to, layer: l });
                }
            }
        }
        out.sort_unstable_by_key(|e| (e.layer, e.from, e.to));
        out
    }

    // ── Attributes ─────────────────────────────────────

    /// Declare an attribute at a scope. Vertex/edge scopes require the
    /// owning layer to exist.
    pub fn declare_attribute(
        &mut self,
        scope: AttrScope,
        name: &str,
        ty: AttrType,
    ) -> Result<(), StoreError> {
        if let AttrScope::Vertex(l) | AttrScope::Edge(l) = scope {
            self.require_layer(l)?;
        }
        self.registry.declare(scope, name, ty)
    }

    /// Declared attributes at a scope, sorted by name.
    pub fn declared_attributes(&self, scope: AttrScope) -> Vec<(String, AttrType)> {
        self.registry.declared(scope)
    }

    pub fn set_actor_attr(
        &mut self,
        actor: ActorId,
        name: &str,
        value: AttrValue,
    ) -> Result<(), StoreError> {
        self.require_actor(actor)?;
        self.registry.check(AttrScope::Actor, name, &value)?;
        self.actors[actor.0 as usize].attrs.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn get_actor_attr(&self, actor: ActorId, name: &str) -> Option<&AttrValue> {
        self.actors.get(actor.0 as usize).and_then(|a| a.attrs.get(name))
    }

    pub fn set_vertex_attr(
        &mut self,
        actor: ActorId,
        layer: LayerId,
        name: &str,
        value: AttrValue,
    ) -> Result<(), StoreError> {
        self.registry.check(AttrScope::Vertex(layer), name, &value)?;
        let actor_label = self.actor_label(actor);
        let layer_label = self.layer_label(layer);
        let state = self.layer_state_mut(layer)?;
        let attrs = state.vertices.get_mut(&actor).ok_or(StoreError::UnknownVertex {
            actor: actor_label,
            layer: layer_label,
        })?;
        attrs.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn get_vertex_attr(&self, actor: ActorId, layer: LayerId, name: &str) -> Option<&AttrValue> {
        self.layer_state(layer)
            .and_then(|l| l.vertices.get(&actor))
            .and_then(|attrs| attrs.get(name))
    }

    pub fn set_edge_attr(
        &mut self,
        from: ActorId,
        to: ActorId,
        layer: LayerId,
        name: &str,
        value: AttrValue,
    ) -> Result<(), StoreError> {
        self.registry.check(AttrScope::Edge(layer), name, &value)?;
        let from_label = self.actor_label(from);
        let to_label = self.actor_label(to);
        let layer_label = self.layer_label(layer);
        let state = self.layer_state_mut(layer)?;
        let key = state.edge_key(from, to);
        let attrs = state.edges.get_mut(&key).ok_or(StoreError::UnknownEdge {
            from: from_label,
            to: to_label,
            layer: layer_label,
        })?;
        attrs.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn get_edge_attr(
        &self,
        from: ActorId,
        to: ActorId,
        layer: LayerId,
        name: &str,
    ) -> Option<&AttrValue> {
        self.layer_state(layer)
            .and_then(|l| l.edges.get(&l.edge_key(from, to)))
            .and_then(|attrs| attrs.get(name))
    }

    // ── Alignment ──────────────────────────────────────

    /// Insert the missing vertices so each of the given actors is present
    /// on each of the given layers. Inserted vertices carry no edges.
    /// Returns the number of vertices added.
    pub fn align(&mut self, actors: &[ActorId], layers: &[LayerId]) -> Result<usize, StoreError> {
        for &a in actors {
            self.require_actor(a)?;
        }
        for &l in layers {
            self.require_layer(l)?;
        }
        let mut added = 0;
        for &l in layers {
            let state = self.layer_state_mut(l)?;
            for &a in actors {
                if !state.vertices.contains_key(&a) {
                    state.vertices.insert(a, HashMap::new());
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    // ── Flattening ─────────────────────────────────────

    /// Project all layers into one derived layer: union of vertices (by
    /// actor) and union of edges. The projection is undirected unless
    /// every source layer is directed; an empty store flattens to an
    /// empty undirected projection.
    pub fn flatten(&self) -> Flattened {
        let directionality = if !self.layers.is_empty()
            && self.layers.iter().all(|l| l.directionality.is_directed())
        {
            EdgeDirectionality::Directed
        } else {
            EdgeDirectionality::Undirected
        };

        let actors = self.actors_in(&self.layer_ids());

        let mut edges: Vec<(ActorId, ActorId)> = Vec::new();
        for state in &self.layers {
            for &(from, to) in state.edges.keys() {
                let pair = match directionality {
                    EdgeDirectionality::Directed => (from, to),
                    EdgeDirectionality::Undirected => {
                        if from <= to {
                            (from, to)
                        } else {
                            (to, from)
                        }
                    }
                };
                edges.push(pair);
            }
        }
        edges.sort_unstable();
        edges.dedup();

        Flattened { directionality, actors, edges }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
