//! Multilayer distances: Pareto-optimal per-layer path-length vectors.
//!
//! A path may cross layers at shared actors; its length is a vector with
//! one edge count per layer. A vector is kept only if no other path's
//! vector dominates it component-wise.

use std::collections::{HashMap, VecDeque};

use muxnet_graph::{ActorId, Direction, LayerId, MultilayerStore};

// ─────────────────────────────────────────────
// MultiDistance
// ─────────────────────────────────────────────

/// A Pareto-optimal path-length vector. Components follow the store's
/// layer order ([`MultilayerStore::layer_ids`]); a layer never traversed
/// contributes 0.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MultiDistance {
    pub lengths: Vec<u32>,
}

impl MultiDistance {
    /// Total number of edges, over all layers.
    pub fn total(&self) -> u32 {
        self.lengths.iter().sum()
    }

    /// True when `self` is at most `other` in every component and
    /// strictly smaller in at least one.
    pub fn dominates(&self, other: &Self) -> bool {
        let mut strict = false;
        for (a, b) in self.lengths.iter().zip(other.lengths.iter()) {
            if a > b {
                return false;
            }
            if a < b {
                strict = true;
            }
        }
        strict
    }
}

// ─────────────────────────────────────────────
// Pareto search
// ─────────────────────────────────────────────

/// All Pareto-optimal length vectors between two actors.
///
/// Label-correcting multi-criteria BFS: every actor keeps a frontier of
/// non-dominated vectors; a relaxation that is dominated by (or equal
/// to) an existing label is discarded, and labels it dominates are
/// evicted. Components only grow along a walk, so revisits with larger
/// vectors prune themselves and the search terminates on finite graphs.
///
/// An empty result means no path exists; `from == to` yields the single
/// zero vector.
pub fn pareto_distances(
    store: &MultilayerStore,
    from: ActorId,
    to: ActorId,
) -> Vec<MultiDistance> {
    let layers: Vec<LayerId> = store.layer_ids();
    let dims = layers.len();

    let mut fronts: HashMap<ActorId, Vec<Vec<u32>>> = HashMap::new();
    let mut queue: VecDeque<(ActorId, Vec<u32>)> = VecDeque::new();

    let origin = vec![0u32; dims];
    fronts.insert(from, vec![origin.clone()]);
    queue.push_back((from, origin));

    while let Some((actor, label)) = queue.pop_front() {
        // Stale label: evicted from the frontier since it was enqueued.
        if !fronts.get(&actor).map(|f| f.contains(&label)).unwrap_or(false) {
            continue;
        }

        for (idx, &layer) in layers.iter().enumerate() {
            for neighbor in store.neighbors(actor, layer, Direction::Out) {
                let mut candidate = label.clone();
                candidate[idx] += 1;
                if insert_label(fronts.entry(neighbor).or_default(), &candidate) {
                    queue.push_back((neighbor, candidate));
                }
            }
        }
    }

    let mut result: Vec<Vec<u32>> = fronts.remove(&to).unwrap_or_default();
    result.sort_unstable();
    result.into_iter().map(|lengths| MultiDistance { lengths }).collect()
}

/// Insert `candidate` into a frontier unless an existing label dominates
/// or equals it; evicts labels the candidate dominates. Returns whether
/// the candidate was kept.
fn insert_label(front: &mut Vec<Vec<u32>>, candidate: &[u32]) -> bool {
    for existing in front.iter() {
        if existing.iter().zip(candidate.iter()).all(|(e, c)| e <= c) {
            return false; // dominated or duplicate
        }
    }
    front.retain(|existing| !candidate.iter().zip(existing.iter()).all(|(c, e)| c <= e));
    front.push(candidate.to_vec());
    true
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
