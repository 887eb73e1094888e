//! Layer summary tables: order, size, components, density, clustering,
//! average path length, diameter — one row per layer plus one for the
//! flattened network.

use std::collections::{HashMap, HashSet, VecDeque};

use muxnet_graph::{ActorId, EdgeDirectionality, LayerId, MultilayerStore};

use crate::unionfind::UnionFind;

/// Name used for the flattened-projection row.
pub const FLATTENED_NAME: &str = "_flat_";

/// One row of the layer summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub layer: String,
    pub directed: bool,
    /// Vertex count.
    pub order: usize,
    /// Edge count.
    pub size: usize,
    /// Weakly connected components.
    pub components: usize,
    pub density: f64,
    /// Global clustering coefficient (transitivity).
    pub clustering: f64,
    /// Mean shortest-path length over ordered connected pairs; 0 when no
    /// pair is connected.
    pub avg_path_length: f64,
    /// Longest shortest path; 0 when no pair is connected.
    pub diameter: usize,
}

/// Summary rows for every layer, in layer order, followed by the
/// flattened projection under [`FLATTENED_NAME`].
pub fn layer_summaries(store: &MultilayerStore) -> Vec<LayerSummary> {
    let mut rows: Vec<LayerSummary> = store
        .layer_ids()
        .into_iter()
        .map(|l| summarize_layer(store, l))
        .collect();
    rows.push(summarize_flattened(store));
    rows
}

fn summarize_layer(store: &MultilayerStore, layer: LayerId) -> LayerSummary {
    let directed = store
        .directionality(layer)
        .map(EdgeDirectionality::is_directed)
        .unwrap_or(false);
    let actors = store.actors_in(&[layer]);
    let edges: Vec<(ActorId, ActorId)> = store
        .edges(Some(&[layer]))
        .into_iter()
        .map(|e| (e.from, e.to))
        .collect();

    summarize_graph(
        store.layer_name(layer).unwrap_or_default().to_owned(),
        directed,
        &actors,
        &edges,
    )
}

fn summarize_flattened(store: &MultilayerStore) -> LayerSummary {
    let flat = store.flatten();
    summarize_graph(
        FLATTENED_NAME.to_owned(),
        flat.directionality.is_directed(),
        &flat.actors,
        &flat.edges,
    )
}

/// Shared summary computation over a vertex and edge list. `actors`
/// lists every vertex of the graph (sorted), isolated ones included.
fn summarize_graph(
    name: String,
    directed: bool,
    actors: &[ActorId],
    edges: &[(ActorId, ActorId)],
) -> LayerSummary {
    let index: HashMap<ActorId, usize> =
        actors.iter().enumerate().map(|(i, &a)| (a, i)).collect();
    let n = actors.len();

    // out-adjacency respecting orientation, plus an undirected view
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut und: Vec<HashSet<usize>> = vec![HashSet::new(); n];
    for &(a, b) in edges {
        let (i, j) = (index[&a], index[&b]);
        out[i].push(j);
        if !directed {
            out[j].push(i);
        }
        und[i].insert(j);
        und[j].insert(i);
    }

    let order = n;
    let size = edges.len();

    let density = if order < 2 {
        0.0
    } else {
        let pairs = (order * (order - 1)) as f64;
        if directed {
            size as f64 / pairs
        } else {
            2.0 * size as f64 / pairs
        }
    };

    // weakly connected components; isolated vertices are singletons
    let mut uf = UnionFind::new(n);
    for &(a, b) in edges {
        uf.union(index[&a], index[&b]);
    }
    let components = uf.count();

    // transitivity: 3 × triangles / connected triples
    let mut triangles = 0usize;
    for u in 0..n {
        for &v in &und[u] {
            if v <= u {
                continue;
            }
            for &w in &und[u] {
                if w > v && und[v].contains(&w) {
                    triangles += 1;
                }
            }
        }
    }
    let triads: usize = und.iter().map(|s| s.len() * s.len().saturating_sub(1) / 2).sum();
    let clustering = if triads == 0 { 0.0 } else { 3.0 * triangles as f64 / triads as f64 };

    // distances over the orientation-respecting adjacency
    let mut total_dist = 0usize;
    let mut connected_pairs = 0usize;
    let mut diameter = 0usize;
    for s in 0..n {
        let mut dist = vec![usize::MAX; n];
        dist[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            for &w in &out[v] {
                if dist[w] == usize::MAX {
                    dist[w] = dist[v] + 1;
                    total_dist += dist[w];
                    connected_pairs += 1;
                    diameter = diameter.max(dist[w]);
                    queue.push_back(w);
                }
            }
        }
    }
    let avg_path_length = if connected_pairs == 0 {
        0.0
    } else {
        total_dist as f64 / connected_pairs as f64
    };

    LayerSummary {
        layer: name,
        directed,
        order,
        size,
        components,
        density,
        clustering,
        avg_path_length,
        diameter,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_plus_tail() -> MultilayerStore {
        // work: a–b, b–c, a–c, c–d; play: a–b
        let mut store = MultilayerStore::new();
        let work = store.add_layer("work", EdgeDirectionality::Undirected).unwrap();
        let play = store.add_layer("play", EdgeDirectionality::Undirected).unwrap();
        let ids: Vec<ActorId> =
            ["a", "b", "c", "d"].iter().map(|n| store.ensure_actor(n)).collect();
        for &a in &ids {
            store.add_vertex(a, work).unwrap();
        }
        store.add_vertex(ids[0], play).unwrap();
        store.add_vertex(ids[1], play).unwrap();
        store.add_edge(ids[0], ids[1], work).unwrap();
        store.add_edge(ids[1], ids[2], work).unwrap();
        store.add_edge(ids[0], ids[2], work).unwrap();
        store.add_edge(ids[2], ids[3], work).unwrap();
        store.add_edge(ids[0], ids[1], play).unwrap();
        store
    }

    #[test]
    fn rows_cover_all_layers_plus_flattened() {
        let store = triangle_plus_tail();
        let rows = layer_summaries(&store);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].layer, "work");
        assert_eq!(rows[1].layer, "play");
        assert_eq!(rows[2].layer, FLATTENED_NAME);
    }

    #[test]
    fn order_size_density() {
        let store = triangle_plus_tail();
        let rows = layer_summaries(&store);
        let work = &rows[0];
        assert_eq!(work.order, 4);
        assert_eq!(work.size, 4);
        // undirected: 2·4 / (4·3)
        assert!((work.density - 2.0 / 3.0).abs() < 1e-12);

        let play = &rows[1];
        assert_eq!(play.order, 2);
        assert_eq!(play.size, 1);
        assert!((play.density - 1.0).abs() < 1e-12);
    }

    #[test]
    fn component_count_includes_isolated_vertices() {
        let mut store = triangle_plus_tail();
        let work = store.layer_id("work").unwrap();
        let e = store.ensure_actor("e");
        store.add_vertex(e, work).unwrap();

        let rows = layer_summaries(&store);
        assert_eq!(rows[0].order, 5);
        assert_eq!(rows[0].components, 2);
    }

    #[test]
    fn clustering_of_triangle_with_tail() {
        let store = triangle_plus_tail();
        let rows = layer_summaries(&store);
        // triangle abc; triads: a:1, b:1, c:3 → 5; transitivity = 3/5
        assert!((rows[0].clustering - 0.6).abs() < 1e-12);
        // play has no triangles
        assert_eq!(rows[1].clustering, 0.0);
    }

    #[test]
    fn path_length_and_diameter() {
        let store = triangle_plus_tail();
        let rows = layer_summaries(&store);
        let work = &rows[0];
        // distances: ab=1 ac=1 ad=2 bc=1 bd=2 cd=1 (each counted twice)
        assert_eq!(work.diameter, 2);
        assert!((work.avg_path_length - 16.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn flattened_row_merges_layers() {
        let store = triangle_plus_tail();
        let rows = layer_summaries(&store);
        let flat = &rows[2];
        assert!(!flat.directed);
        assert_eq!(flat.order, 4);
        // a–b is shared between layers and deduplicated
        assert_eq!(flat.size, 4);
    }

    #[test]
    fn directed_layer_distances_respect_orientation() {
        let mut store = MultilayerStore::new();
        let l = store.add_layer("chain", EdgeDirectionality::Directed).unwrap();
        let ids: Vec<ActorId> = ["a", "b", "c"].iter().map(|n| store.ensure_actor(n)).collect();
        for &a in &ids {
            store.add_vertex(a, l).unwrap();
        }
        store.add_edge(ids[0], ids[1], l).unwrap();
        store.add_edge(ids[1], ids[2], l).unwrap();

        let rows = layer_summaries(&store);
        let chain = &rows[0];
        assert!(chain.directed);
        // reachable ordered pairs: a→b(1), a→c(2), b→c(1)
        assert_eq!(chain.diameter, 2);
        assert!((chain.avg_path_length - 4.0 / 3.0).abs() < 1e-12);
        // one weak component
        assert_eq!(chain.components, 1);
    }

    #[test]
    fn empty_layer_has_neutral_values() {
        let mut store = MultilayerStore::new();
        store.add_layer("void", EdgeDirectionality::Undirected).unwrap();
        let rows = layer_summaries(&store);
        let void = &rows[0];
        assert_eq!(void.order, 0);
        assert_eq!(void.size, 0);
        assert_eq!(void.components, 0);
        assert_eq!(void.density, 0.0);
        assert_eq!(void.avg_path_length, 0.0);
        assert_eq!(void.diameter, 0);
    }
}
