//! Pairwise layer comparison: set-overlap coefficients, degree-histogram
//! divergences, and degree correlations.

use std::collections::{HashMap, HashSet};

use muxnet_graph::{ActorId, Direction, LayerId, MultilayerStore};

use crate::error::AlgoError;

// ─────────────────────────────────────────────
// Method selectors
// ─────────────────────────────────────────────

/// Which per-layer property set an overlap method compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerProperty {
    Actors,
    Edges,
    Triangles,
}

/// Set-overlap coefficients. All range over [0, 1] and are symmetric,
/// except `Coverage` (directional: fraction of the row layer's set
/// contained in the column layer's) and `Hamann` (range [-1, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapMethod {
    Jaccard,
    Coverage,
    SimpleMatching,
    RussellRao,
    Kulczynski2,
    Hamann,
}

/// Degree-histogram dissimilarities. Range [0, ∞); only the symmetrized
/// reductions (`Jeffrey`, `JensenShannon`) are symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionMethod {
    KullbackLeibler,
    Jeffrey,
    JensenShannon,
}

/// Degree-sequence correlations over actors present in both layers.
/// Range [-1, 1], symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

// ─────────────────────────────────────────────
// Result matrix
// ─────────────────────────────────────────────

/// A layer × layer comparison matrix. `values[i][j]` compares
/// `layers[i]` (row) against `layers[j]` (column).
#[derive(Debug, Clone)]
pub struct ComparisonMatrix {
    pub layers: Vec<LayerId>,
    pub values: Vec<Vec<f64>>,
    /// Declared value range of the method that produced this matrix.
    pub range: (f64, f64),
    pub symmetric: bool,
}

impl ComparisonMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

// ─────────────────────────────────────────────
// Property sets
// ─────────────────────────────────────────────

/// Elements are encoded as actor triples: `[a, 0, 0]` for actors,
/// `[a, b, 0]` for (unordered) edges, `[a, b, c]` for triangles.
type Element = [u32; 3];

fn undirected_neighbor_sets(
    store: &MultilayerStore,
    layer: LayerId,
) -> HashMap<ActorId, HashSet<ActorId>> {
    let mut sets: HashMap<ActorId, HashSet<ActorId>> = HashMap::new();
    for e in store.edges(Some(&[layer])) {
        sets.entry(e.from).or_default().insert(e.to);
        sets.entry(e.to).or_default().insert(e.from);
    }
    sets
}

/// The property set of one layer. Edges are normalized to unordered
/// pairs and triangles ignore edge orientation, so directed and
/// undirected layers compare on a common footing.
fn layer_property(store: &MultilayerStore, layer: LayerId, property: LayerProperty) -> HashSet<Element> {
    match property {
        LayerProperty::Actors => store
            .actors_in(&[layer])
            .into_iter()
            .map(|a| [a.0, 0, 0])
            .collect(),
        LayerProperty::Edges => store
            .edges(Some(&[layer]))
            .into_iter()
            .map(|e| {
                let (a, b) = if e.from <= e.to { (e.from, e.to) } else { (e.to, e.from) };
                [a.0, b.0, 0]
            })
            .collect(),
        LayerProperty::Triangles => {
            let sets = undirected_neighbor_sets(store, layer);
            let mut actors: Vec<ActorId> = sets.keys().copied().collect();
            actors.sort_unstable();
            let mut out = HashSet::new();
            for (i, &u) in actors.iter().enumerate() {
                for &v in &actors[i + 1..] {
                    if !sets[&u].contains(&v) {
                        continue;
                    }
                    for &w in actors.iter().skip(i + 1) {
                        if w > v && sets[&u].contains(&w) && sets[&v].contains(&w) {
                            out.insert([u.0, v.0, w.0]);
                        }
                    }
                }
            }
            out
        }
    }
}

// ─────────────────────────────────────────────
// Overlap family
// ─────────────────────────────────────────────

/// Compare every layer pair via a set-overlap coefficient over the given
/// property.
///
/// The agreement-counting methods (SimpleMatching, RussellRao, Hamann)
/// measure against the universe of the property across all layers of the
/// store.
pub fn overlap_matrix(
    store: &MultilayerStore,
    property: LayerProperty,
    method: OverlapMethod,
) -> ComparisonMatrix {
    let layers = store.layer_ids();
    let sets: Vec<HashSet<Element>> = layers
        .iter()
        .map(|&l| layer_property(store, l, property))
        .collect();
    let universe: usize = {
        let mut u: HashSet<Element> = HashSet::new();
        for s in &sets {
            u.extend(s.iter().copied());
        }
        u.len()
    };

    let n = layers.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            values[i][j] = overlap_value(&sets[i], &sets[j], universe, method);
        }
    }

    let (range, symmetric) = match method {
        OverlapMethod::Hamann => ((-1.0, 1.0), true),
        OverlapMethod::Coverage => ((0.0, 1.0), false),
        _ => ((0.0, 1.0), true),
    };
    ComparisonMatrix { layers, values, range, symmetric }
}

fn overlap_value(
    a: &HashSet<Element>,
    b: &HashSet<Element>,
    universe: usize,
    method: OverlapMethod,
) -> f64 {
    let inter = a.intersection(b).count() as f64;
    let only_a = a.len() as f64 - inter;
    let only_b = b.len() as f64 - inter;
    let union = a.len() as f64 + b.len() as f64 - inter;
    let u = universe as f64;
    let outside = u - union;

    match method {
        OverlapMethod::Jaccard => {
            if union == 0.0 {
                1.0
            } else {
                inter / union
            }
        }
        OverlapMethod::Coverage => {
            if a.is_empty() {
                1.0
            } else {
                inter / a.len() as f64
            }
        }
        OverlapMethod::SimpleMatching => {
            if u == 0.0 {
                1.0
            } else {
                (inter + outside) / u
            }
        }
        OverlapMethod::RussellRao => {
            if u == 0.0 {
                0.0
            } else {
                inter / u
            }
        }
        OverlapMethod::Kulczynski2 => {
            let term = |size: usize| if size == 0 { 1.0 } else { inter / size as f64 };
            (term(a.len()) + term(b.len())) / 2.0
        }
        OverlapMethod::Hamann => {
            if u == 0.0 {
                1.0
            } else {
                ((inter + outside) - (only_a + only_b)) / u
            }
        }
    }
}

// ─────────────────────────────────────────────
// Distribution family
// ─────────────────────────────────────────────

/// Compare every layer pair via a divergence between their degree
/// histograms. Each pair shares one binning over `[0, max degree]` of
/// the two layers; add-one smoothing keeps the divergences finite.
pub fn distribution_matrix(
    store: &MultilayerStore,
    method: DistributionMethod,
    bins: usize,
) -> Result<ComparisonMatrix, AlgoError> {
    if bins == 0 {
        return Err(AlgoError::EmptyBinning);
    }
    let layers = store.layer_ids();
    let degrees: Vec<Vec<usize>> = layers
        .iter()
        .map(|&l| {
            store
                .actors_in(&[l])
                .into_iter()
                .map(|a| store.degree_in_layer(a, l, Direction::Both))
                .collect()
        })
        .collect();

    let n = layers.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            let max_degree = degrees[i]
                .iter()
                .chain(degrees[j].iter())
                .copied()
                .max()
                .unwrap_or(0);
            let p = degree_histogram(&degrees[i], max_degree, bins);
            let q = degree_histogram(&degrees[j], max_degree, bins);
            values[i][j] = match method {
                DistributionMethod::KullbackLeibler => kl_divergence(&p, &q),
                DistributionMethod::Jeffrey => kl_divergence(&p, &q) + kl_divergence(&q, &p),
                DistributionMethod::JensenShannon => {
                    let m: Vec<f64> =
                        p.iter().zip(q.iter()).map(|(x, y)| (x + y) / 2.0).collect();
                    0.5 * kl_divergence(&p, &m) + 0.5 * kl_divergence(&q, &m)
                }
            };
        }
    }

    let symmetric = !matches!(method, DistributionMethod::KullbackLeibler);
    Ok(ComparisonMatrix { layers, values, range: (0.0, f64::INFINITY), symmetric })
}

/// Smoothed probability histogram of a degree sequence over `bins`
/// equal-width bins spanning `[0, max_degree]`.
fn degree_histogram(degrees: &[usize], max_degree: usize, bins: usize) -> Vec<f64> {
    let mut counts = vec![0usize; bins];
    for &d in degrees {
        let idx = d * bins / (max_degree + 1);
        counts[idx.min(bins - 1)] += 1;
    }
    let total = degrees.len() + bins;
    counts
        .into_iter()
        .map(|c| (c + 1) as f64 / total as f64)
        .collect()
}

fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q.iter())
        .map(|(&pi, &qi)| pi * (pi / qi).ln())
        .sum()
}

// ─────────────────────────────────────────────
// Correlation family
// ─────────────────────────────────────────────

/// Compare every layer pair via the correlation of their degree
/// sequences over the actors present in both layers. Pairs with fewer
/// than two common actors, or with a constant degree sequence on either
/// side, get 0.
pub fn correlation_matrix(
    store: &MultilayerStore,
    method: CorrelationMethod,
) -> ComparisonMatrix {
    let layers = store.layer_ids();
    let n = layers.len();
    let mut values = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..n {
            let common: Vec<ActorId> = {
                let a: HashSet<ActorId> = store.actors_in(&[layers[i]]).into_iter().collect();
                let mut c: Vec<ActorId> = store
                    .actors_in(&[layers[j]])
                    .into_iter()
                    .filter(|x| a.contains(x))
                    .collect();
                c.sort_unstable();
                c
            };
            let x: Vec<f64> = common
                .iter()
                .map(|&a| store.degree_in_layer(a, layers[i], Direction::Both) as f64)
                .collect();
            let y: Vec<f64> = common
                .iter()
                .map(|&a| store.degree_in_layer(a, layers[j], Direction::Both) as f64)
                .collect();
            values[i][j] = match method {
                CorrelationMethod::Pearson => pearson(&x, &y),
                CorrelationMethod::Spearman => pearson(&midranks(&x), &midranks(&y)),
            };
        }
    }

    ComparisonMatrix { layers, values, range: (-1.0, 1.0), symmetric: true }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    if x.len() < 2 {
        return 0.0;
    }
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        cov += (xi - mx) * (yi - my);
        vx += (xi - mx) * (xi - mx);
        vy += (yi - my) * (yi - my);
    }
    if vx == 0.0 || vy == 0.0 {
        return 0.0;
    }
    cov / (vx.sqrt() * vy.sqrt())
}

/// Ranks with ties resolved as the average rank of the tied run.
fn midranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // ranks are 1-based; a run [i, j] shares the average rank
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
