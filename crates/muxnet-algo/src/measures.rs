//! Actor measures over layer subsets: degree, neighborhood, exclusive
//! neighborhood, relevance, exclusive relevance, degree deviation.
//!
//! All measures treat an actor absent from a layer as having degree 0
//! and no neighbors there — degenerate inputs are neutral values, never
//! errors.

use std::collections::HashSet;

use muxnet_graph::{ActorId, Direction, LayerId, MultilayerStore};

// ─────────────────────────────────────────────
// Core measures
// ─────────────────────────────────────────────

/// Count of distinct incident edges summed over the selected layers.
///
/// On directed layers `Direction::Both` (the default convention across
/// the crate, including the flattened projection) sums in- and
/// out-degree. Unlike [`neighborhood`], degree does not deduplicate
/// neighbors shared between layers.
pub fn degree(
    store: &MultilayerStore,
    actor: ActorId,
    layers: &[LayerId],
    direction: Direction,
) -> usize {
    layers
        .iter()
        .map(|&l| store.degree_in_layer(actor, l, direction))
        .sum()
}

/// The distinct actors adjacent to `actor` via any edge on the selected
/// layers.
pub fn neighbor_set(
    store: &MultilayerStore,
    actor: ActorId,
    layers: &[LayerId],
    direction: Direction,
) -> HashSet<ActorId> {
    let mut out = HashSet::new();
    for &l in layers {
        out.extend(store.neighbors(actor, l, direction));
    }
    out
}

/// Count of distinct adjacent actors on the selected layers.
///
/// Coincides with [`degree`] on a single layer; diverges once layers are
/// combined, since degree sums per-layer incidences while neighborhood
/// deduplicates actors.
pub fn neighborhood(
    store: &MultilayerStore,
    actor: ActorId,
    layers: &[LayerId],
    direction: Direction,
) -> usize {
    neighbor_set(store, actor, layers, direction).len()
}

/// Count of neighbors reachable on the selected layers that are not
/// reachable via any edge on the remaining layers — connectivity that
/// depends uniquely on the selected layers.
pub fn xneighborhood(
    store: &MultilayerStore,
    actor: ActorId,
    layers: &[LayerId],
    direction: Direction,
) -> usize {
    let rest: Vec<LayerId> = store
        .layer_ids()
        .into_iter()
        .filter(|l| !layers.contains(l))
        .collect();
    let selected = neighbor_set(store, actor, layers, direction);
    let outside = neighbor_set(store, actor, &rest, direction);
    selected.difference(&outside).count()
}

/// Fraction of the actor's whole-network neighborhood covered by the
/// selected layers. 0 when the actor has no neighbors anywhere.
pub fn relevance(
    store: &MultilayerStore,
    actor: ActorId,
    layers: &[LayerId],
    direction: Direction,
) -> f64 {
    let all = store.layer_ids();
    let denom = neighborhood(store, actor, &all, direction);
    if denom == 0 {
        return 0.0;
    }
    neighborhood(store, actor, layers, direction) as f64 / denom as f64
}

/// [`relevance`] with the exclusive neighborhood in the numerator.
pub fn xrelevance(
    store: &MultilayerStore,
    actor: ActorId,
    layers: &[LayerId],
    direction: Direction,
) -> f64 {
    let all = store.layer_ids();
    let denom = neighborhood(store, actor, &all, direction);
    if denom == 0 {
        return 0.0;
    }
    xneighborhood(store, actor, layers, direction) as f64 / denom as f64
}

/// Population standard deviation of the actor's per-layer degrees over
/// the selected layers — how unevenly its connectivity is spread.
pub fn degree_deviation(
    store: &MultilayerStore,
    actor: ActorId,
    layers: &[LayerId],
    direction: Direction,
) -> f64 {
    if layers.is_empty() {
        return 0.0;
    }
    let degrees: Vec<f64> = layers
        .iter()
        .map(|&l| store.degree_in_layer(actor, l, direction) as f64)
        .collect();
    let n = degrees.len() as f64;
    let mean = degrees.iter().sum::<f64>() / n;
    let var = degrees.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
    var.sqrt()
}

// ─────────────────────────────────────────────
// Measure table
// ─────────────────────────────────────────────

/// One row of the per-actor measure table.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorMeasureRow {
    pub actor: String,
    pub degree: usize,
    pub neighborhood: usize,
    pub xneighborhood: usize,
    pub relevance: f64,
    pub xrelevance: f64,
    pub degree_deviation: f64,
}

/// Per-actor measures with respect to a layer subset, one row per actor
/// of the store, sorted by degree descending then name.
pub fn actor_measures(
    store: &MultilayerStore,
    layers: &[LayerId],
    direction: Direction,
) -> Vec<ActorMeasureRow> {
    let mut rows: Vec<ActorMeasureRow> = store
        .actor_ids()
        .into_iter()
        .map(|a| ActorMeasureRow {
            actor: store.actor_name(a).unwrap_or_default().to_owned(),
            degree: degree(store, a, layers, direction),
            neighborhood: neighborhood(store, a, layers, direction),
            xneighborhood: xneighborhood(store, a, layers, direction),
            relevance: relevance(store, a, layers, direction),
            xrelevance: xrelevance(store, a, layers, direction),
            degree_deviation: degree_deviation(store, a, layers, direction),
        })
        .collect();
    rows.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.actor.cmp(&b.actor)));
    rows
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use muxnet_graph::EdgeDirectionality;

    /// research: Luca–Matteo, Davide–Matteo; friendship: Luca–Matteo.
    fn example() -> (MultilayerStore, [ActorId; 3], [LayerId; 2]) {
        let mut store = MultilayerStore::new();
        let research = store.add_layer("research", EdgeDirectionality::Undirected).unwrap();
        let friendship = store.add_layer("friendship", EdgeDirectionality::Undirected).unwrap();
        let luca = store.ensure_actor("Luca");
        let matteo = store.ensure_actor("Matteo");
        let davide = store.ensure_actor("Davide");
        for a in [luca, matteo, davide] {
            store.add_vertex(a, research).unwrap();
        }
        for a in [luca, matteo] {
            store.add_vertex(a, friendship).unwrap();
        }
        store.add_edge(luca, matteo, research).unwrap();
        store.add_edge(davide, matteo, research).unwrap();
        store.add_edge(luca, matteo, friendship).unwrap();
        (store, [luca, matteo, davide], [research, friendship])
    }

    #[test]
    fn degree_equals_neighborhood_on_single_layers() {
        let (store, actors, layers) = example();
        for a in actors {
            for l in layers {
                assert_eq!(
                    degree(&store, a, &[l], Direction::Both),
                    neighborhood(&store, a, &[l], Direction::Both),
                );
            }
        }
    }

    #[test]
    fn degree_sums_but_neighborhood_deduplicates() {
        let (store, [luca, matteo, _], layers) = example();
        // Matteo: 2 edges on research + 1 on friendship
        assert_eq!(degree(&store, matteo, &layers, Direction::Both), 3);
        // but Luca is a neighbor on both layers, so only 2 distinct actors
        assert_eq!(neighborhood(&store, matteo, &layers, Direction::Both), 2);

        assert_eq!(degree(&store, luca, &layers, Direction::Both), 2);
        assert_eq!(neighborhood(&store, luca, &layers, Direction::Both), 1);
    }

    #[test]
    fn neighborhood_inequalities_hold() {
        let (store, actors, layers) = example();
        let all = store.layer_ids();
        for a in actors {
            for l in layers {
                let xn = xneighborhood(&store, a, &[l], Direction::Both);
                let n = neighborhood(&store, a, &[l], Direction::Both);
                let n_all = neighborhood(&store, a, &all, Direction::Both);
                assert!(xn <= n);
                assert!(n <= n_all);
            }
        }
    }

    #[test]
    fn exclusive_neighborhood_ignores_shared_neighbors() {
        let (store, [_, matteo, _], [research, friendship]) = example();
        // Davide is reachable only via research; Luca also via friendship
        assert_eq!(xneighborhood(&store, matteo, &[research], Direction::Both), 1);
        assert_eq!(xneighborhood(&store, matteo, &[friendship], Direction::Both), 0);
    }

    #[test]
    fn relevance_is_a_fraction_of_the_full_neighborhood() {
        let (store, [luca, matteo, davide], [research, friendship]) = example();
        let all = store.layer_ids();

        assert!((relevance(&store, matteo, &[research], Direction::Both) - 1.0).abs() < 1e-12);
        assert!((relevance(&store, matteo, &[friendship], Direction::Both) - 0.5).abs() < 1e-12);
        for a in [luca, matteo, davide] {
            let r = relevance(&store, a, &all, Direction::Both);
            assert!((r - 1.0).abs() < 1e-12, "full-layer relevance must be 1, got {r}");
        }
    }

    #[test]
    fn relevance_of_isolated_actor_is_zero() {
        let mut store = MultilayerStore::new();
        let l = store.add_layer("solo", EdgeDirectionality::Undirected).unwrap();
        let a = store.ensure_actor("loner");
        store.add_vertex(a, l).unwrap();

        // 0/0 is defined as 0, not an error
        assert_eq!(relevance(&store, a, &[l], Direction::Both), 0.0);
        assert_eq!(xrelevance(&store, a, &[l], Direction::Both), 0.0);
    }

    #[test]
    fn degree_deviation_measures_spread() {
        let (store, [luca, _, davide], layers) = example();
        // Luca: degree 1 on each layer → deviation 0
        assert!(degree_deviation(&store, luca, &layers, Direction::Both).abs() < 1e-12);
        // Davide: degrees 1 and 0 → mean 0.5, deviation 0.5
        let dev = degree_deviation(&store, davide, &layers, Direction::Both);
        assert!((dev - 0.5).abs() < 1e-12, "expected 0.5, got {dev}");
    }

    #[test]
    fn directed_degree_modes() {
        let mut store = MultilayerStore::new();
        let l = store.add_layer("cites", EdgeDirectionality::Directed).unwrap();
        let a = store.ensure_actor("a");
        let b = store.ensure_actor("b");
        store.add_vertex(a, l).unwrap();
        store.add_vertex(b, l).unwrap();
        store.add_edge(a, b, l).unwrap();

        assert_eq!(degree(&store, a, &[l], Direction::Out), 1);
        assert_eq!(degree(&store, a, &[l], Direction::In), 0);
        assert_eq!(degree(&store, a, &[l], Direction::Both), 1);
    }

    #[test]
    fn measure_table_is_sorted_by_degree() {
        let (store, _, layers) = example();
        let rows = actor_measures(&store, &layers, Direction::Both);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].actor, "Matteo");
        assert!(rows[0].degree >= rows[1].degree);
        assert!(rows[1].degree >= rows[2].degree);
    }
}
