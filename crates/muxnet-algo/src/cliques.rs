//! Community detection: multilayer clique percolation.
//!
//! Finds all maximal cliques of at least `k` actors whose pairwise edges
//! exist on at least `m` layers simultaneously, then merges cliques
//! sharing at least `k − 1` actors into percolation communities.
//!
//! Unlike modularity optimization, membership is overlapping and
//! non-exhaustive: a vertex may belong to several communities or none.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use tracing::debug;

use muxnet_graph::{ActorId, LayerId, MultilayerStore};

use crate::error::AlgoError;
use crate::unionfind::UnionFind;

// ─────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────

/// A maximal multilayer clique: every pair of `actors` is adjacent on
/// every layer in `layers`, and no actor can be added without shrinking
/// the layer set. Both lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clique {
    pub actors: Vec<ActorId>,
    pub layers: Vec<LayerId>,
}

/// One percolation community: the union of (actor, layer) memberships of
/// a connected group of cliques.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliqueCommunity {
    pub id: u64,
    /// Sorted, deduplicated (actor, layer) members.
    pub members: Vec<(ActorId, LayerId)>,
}

pub struct CliqueResult {
    pub cliques: Vec<Clique>,
    pub communities: Vec<CliqueCommunity>,
    pub duration_ms: u64,
}

// ─────────────────────────────────────────────
// Entry point
// ─────────────────────────────────────────────

/// Clique percolation with minimum clique size `k` and minimum shared
/// layer count `m`. Parameters are validated before any computation:
/// `k >= 2` and `1 <= m <= layer count`.
pub fn clique_percolation(
    store: &MultilayerStore,
    k: usize,
    m: usize,
) -> Result<CliqueResult, AlgoError> {
    if k < 2 {
        return Err(AlgoError::CliqueSizeTooSmall(k));
    }
    let layer_count = store.layer_count();
    if m < 1 || m > layer_count {
        return Err(AlgoError::LayerSpanOutOfRange { m, layers: layer_count });
    }

    let start = Instant::now();
    let cliques = maximal_cliques(store, k, m);
    debug!(cliques = cliques.len(), k, m, "clique enumeration complete");
    let communities = percolate(&cliques, k);

    Ok(CliqueResult {
        cliques,
        communities,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

// ─────────────────────────────────────────────
// Clique enumeration
// ─────────────────────────────────────────────

/// Layers on which each unordered actor pair is adjacent. Edge
/// orientation on directed layers is ignored.
fn pair_support(store: &MultilayerStore) -> HashMap<(ActorId, ActorId), Vec<LayerId>> {
    let mut support: HashMap<(ActorId, ActorId), Vec<LayerId>> = HashMap::new();
    for e in store.edges(None) {
        let key = if e.from <= e.to { (e.from, e.to) } else { (e.to, e.from) };
        let layers = support.entry(key).or_default();
        if !layers.contains(&e.layer) {
            layers.push(e.layer);
        }
    }
    for layers in support.values_mut() {
        layers.sort_unstable();
    }
    support
}

fn pair_layers<'a>(
    support: &'a HashMap<(ActorId, ActorId), Vec<LayerId>>,
    a: ActorId,
    b: ActorId,
) -> &'a [LayerId] {
    let key = if a <= b { (a, b) } else { (b, a) };
    support.get(&key).map(Vec::as_slice).unwrap_or(&[])
}

fn intersect(a: &[LayerId], b: &[LayerId]) -> Vec<LayerId> {
    // both inputs sorted
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Bron–Kerbosch adapted to layer supports: a candidate carries the
/// layer set on which it is adjacent to every clique member, and
/// branches are cut once that set drops below `m`. A clique is emitted
/// when no candidate or excluded actor can extend it on its full layer
/// set.
fn maximal_cliques(store: &MultilayerStore, k: usize, m: usize) -> Vec<Clique> {
    let support = pair_support(store);
    let all_layers = store.layer_ids();
    let mut actors: Vec<ActorId> = store.actors_in(&all_layers);
    actors.sort_unstable();

    let candidates: Vec<(ActorId, Vec<LayerId>)> = actors
        .iter()
        .map(|&a| (a, all_layers.clone()))
        .collect();

    let mut out = Vec::new();
    let mut r = Vec::new();
    expand(&mut r, &all_layers, candidates, Vec::new(), k, m, &support, &mut out);
    out.sort_by(|a, b| a.actors.cmp(&b.actors).then_with(|| a.layers.cmp(&b.layers)));
    out
}

#[allow(clippy::too_many_arguments)]
fn expand(
    r: &mut Vec<ActorId>,
    l: &[LayerId],
    mut p: Vec<(ActorId, Vec<LayerId>)>,
    mut x: Vec<(ActorId, Vec<LayerId>)>,
    k: usize,
    m: usize,
    support: &HashMap<(ActorId, ActorId), Vec<LayerId>>,
    out: &mut Vec<Clique>,
) {
    if r.len() >= k {
        // maximal iff nothing extends the clique on its full layer set
        let extendable = p
            .iter()
            .chain(x.iter())
            .any(|(_, lv)| lv.len() == l.len());
        if !extendable {
            out.push(Clique { actors: r.clone(), layers: l.to_vec() });
        }
    }

    while let Some((v, lv)) = p.first().cloned() {
        p.remove(0);

        // candidates and exclusions compatible with v, re-supported
        let filter = |entries: &[(ActorId, Vec<LayerId>)]| -> Vec<(ActorId, Vec<LayerId>)> {
            entries
                .iter()
                .filter(|(w, _)| *w != v)
                .filter_map(|(w, lw)| {
                    let shared = intersect(&intersect(lw, pair_layers(support, v, *w)), &lv);
                    (shared.len() >= m).then(|| (*w, shared))
                })
                .collect()
        };
        let new_p = filter(&p);
        let new_x = filter(&x);

        r.push(v);
        expand(r, &lv, new_p, new_x, k, m, support, out);
        r.pop();

        x.push((v, lv));
    }
}

// ─────────────────────────────────────────────
// Percolation
// ─────────────────────────────────────────────

/// Merge cliques sharing at least `k − 1` actors into communities.
fn percolate(cliques: &[Clique], k: usize) -> Vec<CliqueCommunity> {
    let n = cliques.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in i + 1..n {
            if shared_actors(&cliques[i].actors, &cliques[j].actors) >= k - 1 {
                uf.union(i, j);
            }
        }
    }

    // group cliques by root, ids assigned in first-seen order
    let mut groups: HashMap<usize, u64> = HashMap::new();
    let mut members: Vec<BTreeSet<(ActorId, LayerId)>> = Vec::new();
    for (i, clique) in cliques.iter().enumerate() {
        let root = uf.find(i);
        let next = members.len() as u64;
        let id = *groups.entry(root).or_insert(next);
        if id as usize == members.len() {
            members.push(BTreeSet::new());
        }
        for &a in &clique.actors {
            for &l in &clique.layers {
                members[id as usize].insert((a, l));
            }
        }
    }

    members
        .into_iter()
        .enumerate()
        .map(|(id, set)| CliqueCommunity { id: id as u64, members: set.into_iter().collect() })
        .collect()
}

fn shared_actors(a: &[ActorId], b: &[ActorId]) -> usize {
    // both sorted
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use muxnet_graph::EdgeDirectionality;

    fn add_clique(store: &mut MultilayerStore, names: &[&str], layer: LayerId) {
        let ids: Vec<ActorId> = names.iter().map(|n| store.ensure_actor(n)).collect();
        for &a in &ids {
            if !store.contains_vertex(a, layer) {
                store.add_vertex(a, layer).unwrap();
            }
        }
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if !store.contains_edge(a, b, layer) {
                    store.add_edge(a, b, layer).unwrap();
                }
            }
        }
    }

    #[test]
    fn parameters_validated_before_any_work() {
        let mut store = MultilayerStore::new();
        store.add_layer("l", EdgeDirectionality::Undirected).unwrap();

        assert!(matches!(
            clique_percolation(&store, 1, 1),
            Err(AlgoError::CliqueSizeTooSmall(1))
        ));
        assert!(matches!(
            clique_percolation(&store, 2, 0),
            Err(AlgoError::LayerSpanOutOfRange { m: 0, .. })
        ));
        assert!(matches!(
            clique_percolation(&store, 2, 2),
            Err(AlgoError::LayerSpanOutOfRange { m: 2, .. })
        ));
    }

    #[test]
    fn single_layer_triangle_is_one_clique() {
        let mut store = MultilayerStore::new();
        let l = store.add_layer("l", EdgeDirectionality::Undirected).unwrap();
        add_clique(&mut store, &["a", "b", "c"], l);

        let result = clique_percolation(&store, 3, 1).unwrap();
        assert_eq!(result.cliques.len(), 1);
        assert_eq!(result.cliques[0].actors.len(), 3);
        assert_eq!(result.cliques[0].layers, vec![l]);
        assert_eq!(result.communities.len(), 1);
        assert_eq!(result.communities[0].members.len(), 3);
    }

    #[test]
    fn k2_m1_degenerates_to_edges() {
        // two disjoint edges on one layer: each is its own base clique,
        // with no inter-layer requirement
        let mut store = MultilayerStore::new();
        let l = store.add_layer("l", EdgeDirectionality::Undirected).unwrap();
        add_clique(&mut store, &["a", "b"], l);
        add_clique(&mut store, &["c", "d"], l);

        let result = clique_percolation(&store, 2, 1).unwrap();
        assert_eq!(result.cliques.len(), 2);
        assert_eq!(result.communities.len(), 2);
    }

    #[test]
    fn layer_span_filters_cliques() {
        let mut store = MultilayerStore::new();
        let l0 = store.add_layer("l0", EdgeDirectionality::Undirected).unwrap();
        let l1 = store.add_layer("l1", EdgeDirectionality::Undirected).unwrap();
        // triangle on both layers; an extra edge only on l0
        add_clique(&mut store, &["a", "b", "c"], l0);
        add_clique(&mut store, &["a", "b", "c"], l1);
        add_clique(&mut store, &["c", "d"], l0);

        let result = clique_percolation(&store, 3, 2).unwrap();
        assert_eq!(result.cliques.len(), 1);
        assert_eq!(result.cliques[0].layers, vec![l0, l1]);

        // with m = 1 the c–d edge is still below the size threshold
        let relaxed = clique_percolation(&store, 3, 1).unwrap();
        assert_eq!(relaxed.cliques.len(), 1);
    }

    #[test]
    fn overlapping_cliques_merge_into_one_community() {
        // triangles a,b,c and b,c,d share two actors (k−1 = 2)
        let mut store = MultilayerStore::new();
        let l = store.add_layer("l", EdgeDirectionality::Undirected).unwrap();
        add_clique(&mut store, &["a", "b", "c"], l);
        add_clique(&mut store, &["b", "c", "d"], l);

        let result = clique_percolation(&store, 3, 1).unwrap();
        assert_eq!(result.cliques.len(), 2);
        assert_eq!(result.communities.len(), 1);
        assert_eq!(result.communities[0].members.len(), 4);
    }

    #[test]
    fn disjoint_cliques_stay_separate_and_vertices_may_be_uncovered() {
        let mut store = MultilayerStore::new();
        let l = store.add_layer("l", EdgeDirectionality::Undirected).unwrap();
        add_clique(&mut store, &["a", "b", "c"], l);
        add_clique(&mut store, &["x", "y", "z"], l);
        // a lone edge below the clique size threshold
        add_clique(&mut store, &["p", "q"], l);

        let result = clique_percolation(&store, 3, 1).unwrap();
        assert_eq!(result.communities.len(), 2);
        let p = store.actor_id("p").unwrap();
        for community in &result.communities {
            assert!(!community.members.iter().any(|&(a, _)| a == p));
        }
    }

    #[test]
    fn an_actor_may_belong_to_several_communities() {
        // b sits in two triangles that share only one actor (< k−1),
        // so the communities stay distinct but overlap at b
        let mut store = MultilayerStore::new();
        let l = store.add_layer("l", EdgeDirectionality::Undirected).unwrap();
        add_clique(&mut store, &["a", "c", "b"], l);
        add_clique(&mut store, &["x", "y", "b"], l);

        let result = clique_percolation(&store, 3, 1).unwrap();
        assert_eq!(result.communities.len(), 2);
        let b = store.actor_id("b").unwrap();
        for community in &result.communities {
            assert!(community.members.iter().any(|&(a, _)| a == b));
        }
    }

    #[test]
    fn maximality_no_clique_contained_in_another_with_same_layers() {
        let mut store = MultilayerStore::new();
        let l = store.add_layer("l", EdgeDirectionality::Undirected).unwrap();
        add_clique(&mut store, &["a", "b", "c", "d"], l);

        // k = 2: the 4-clique must be reported once, not its sub-cliques
        let result = clique_percolation(&store, 2, 1).unwrap();
        assert_eq!(result.cliques.len(), 1);
        assert_eq!(result.cliques[0].actors.len(), 4);
    }
}
