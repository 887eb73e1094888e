use dashmap::DashMap;

use crate::model::{ActorId, Direction};

// ─────────────────────────────────────────────
// LayerAdjacency
// ─────────────────────────────────────────────

/// In-memory bidirectional adjacency index for one layer.
///
/// Backed by `DashMap` — concurrent reads are safe while the store is
/// in its analysis phase (single writer, many readers).
///
/// For undirected layers each edge is registered in both directions, so
/// `outgoing` and `incoming` carry identical neighbor lists and all
/// [`Direction`] modes coincide.
#[derive(Debug, Default)]
pub struct LayerAdjacency {
    /// actor → neighbors reachable via out-edges
    outgoing: DashMap<ActorId, Vec<ActorId>>,
    /// actor → neighbors with an edge pointing here
    incoming: DashMap<ActorId, Vec<ActorId>>,
}

impl LayerAdjacency {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutations ──────────────────────────────────────

    /// Register a directed link `from → to`.
    pub fn add_link(&self, from: ActorId, to: ActorId) {
        self.outgoing.entry(from).or_default().push(to);
        self.incoming.entry(to).or_default().push(from);
    }

    /// Remove the directed link `from → to` (first occurrence).
    pub fn remove_link(&self, from: ActorId, to: ActorId) {
        if let Some(mut out) = self.outgoing.get_mut(&from) {
            if let Some(pos) = out.iter().position(|&n| n == to) {
                out.remove(pos);
            }
        }
        if let Some(mut inc) = self.incoming.get_mut(&to) {
            if let Some(pos) = inc.iter().position(|&n| n == from) {
                inc.remove(pos);
            }
        }
    }

    /// Remove every link touching `actor` (called on vertex removal).
    pub fn remove_actor(&self, actor: ActorId) {
        if let Some((_, out)) = self.outgoing.remove(&actor) {
            for n in &out {
                if let Some(mut inc) = self.incoming.get_mut(n) {
                    inc.retain(|&x| x != actor);
                }
            }
        }
        if let Some((_, inc)) = self.incoming.remove(&actor) {
            for n in &inc {
                if let Some(mut out) = self.outgoing.get_mut(n) {
                    out.retain(|&x| x != actor);
                }
            }
        }
    }

    // ── Queries ────────────────────────────────────────

    /// Neighbors in the requested direction. `Both` deduplicates actors
    /// reachable in either direction.
    pub fn neighbors(&self, actor: ActorId, direction: Direction) -> Vec<ActorId> {
        match direction {
            Direction::Out => self.neighbors_out(actor),
            Direction::In => self.neighbors_in(actor),
            Direction::Both => {
                let mut result = self.neighbors_out(actor);
                for n in self.neighbors_in(actor) {
                    if !result.contains(&n) {
                        result.push(n);
                    }
                }
                result
            }
        }
    }

    pub fn neighbors_out(&self, actor: ActorId) -> Vec<ActorId> {
        self.outgoing.get(&actor).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn neighbors_in(&self, actor: ActorId) -> Vec<ActorId> {
        self.incoming.get(&actor).map(|v| v.clone()).unwrap_or_default()
    }

    /// Count of incident links in the requested direction.
    /// `Both` sums in- and out-degree without deduplication.
    pub fn degree(&self, actor: ActorId, direction: Direction) -> usize {
        match direction {
            Direction::Out => self.outgoing.get(&actor).map(|v| v.len()).unwrap_or(0),
            Direction::In => self.incoming.get(&actor).map(|v| v.len()).unwrap_or(0),
            Direction::Both => {
                self.degree(actor, Direction::Out) + self.degree(actor, Direction::In)
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_query_directed_link() {
        let adj = LayerAdjacency::new();
        adj.add_link(ActorId(0), ActorId(1));

        assert_eq!(adj.neighbors(ActorId(0), Direction::Out), vec![ActorId(1)]);
        assert_eq!(adj.neighbors(ActorId(1), Direction::In), vec![ActorId(0)]);
        assert!(adj.neighbors(ActorId(1), Direction::Out).is_empty());
    }

    #[test]
    fn both_mode_deduplicates_reciprocal_links() {
        let adj = LayerAdjacency::new();
        adj.add_link(ActorId(0), ActorId(1));
        adj.add_link(ActorId(1), ActorId(0));

        let both = adj.neighbors(ActorId(0), Direction::Both);
        assert_eq!(both, vec![ActorId(1)]);
        // degree, by contrast, sums incidences
        assert_eq!(adj.degree(ActorId(0), Direction::Both), 2);
    }

    #[test]
    fn remove_link_cleans_both_directions() {
        let adj = LayerAdjacency::new();
        adj.add_link(ActorId(0), ActorId(1));
        adj.remove_link(ActorId(0), ActorId(1));

        assert!(adj.neighbors(ActorId(0), Direction::Out).is_empty());
        assert!(adj.neighbors(ActorId(1), Direction::In).is_empty());
    }

    #[test]
    fn remove_actor_cleans_all_connections() {
        let adj = LayerAdjacency::new();
        adj.add_link(ActorId(0), ActorId(1));
        adj.add_link(ActorId(2), ActorId(0));
        adj.remove_actor(ActorId(0));

        assert_eq!(adj.degree(ActorId(0), Direction::Both), 0);
        assert!(adj.neighbors(ActorId(1), Direction::In).is_empty());
        assert!(adj.neighbors(ActorId(2), Direction::Out).is_empty());
    }

    #[test]
    fn concurrent_reads_do_not_panic() {
        use std::sync::Arc;
        use std::thread;

        let adj = Arc::new(LayerAdjacency::new());
        for i in 1..=8 {
            adj.add_link(ActorId(0), ActorId(i));
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let adj = Arc::clone(&adj);
                thread::spawn(move || adj.neighbors(ActorId(0), Direction::Out).len())
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), 8);
        }
    }
}
