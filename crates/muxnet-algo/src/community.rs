//! Community detection: generalized (multislice) modularity optimization.
//!
//! Every (actor, layer) vertex is assigned to exactly one group. The
//! objective extends single-layer modularity with an inter-layer
//! coupling term: each actor's copies across layers are linked with
//! weight `omega`, biasing same-actor vertices toward one group.
//!
//! The optimizer is a bottom-up merge/refine heuristic: greedy local
//! moves until no gain, then aggregation of groups into super-vertices,
//! repeated on the aggregated graph. The result is a local optimum;
//! vertex visit order is the only source of nondeterminism and is
//! controlled by `ModularityConfig::seed`.

use std::collections::HashMap;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use muxnet_graph::{ActorId, LayerId, MultilayerStore};

// ─────────────────────────────────────────────
// Config / result
// ─────────────────────────────────────────────

pub struct ModularityConfig {
    /// Resolution of the intra-layer null model.
    pub gamma: f64,
    /// Inter-layer coupling weight between same-actor vertices.
    pub omega: f64,
    /// Maximum number of aggregation levels.
    pub max_levels: usize,
    /// Maximum local-move sweeps per level.
    pub max_sweeps: usize,
    /// Seed for the vertex visit order. Equal seeds give equal
    /// partitions; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for ModularityConfig {
    fn default() -> Self {
        Self { gamma: 1.0, omega: 1.0, max_levels: 20, max_sweeps: 50, seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAssignment {
    pub actor: ActorId,
    pub layer: LayerId,
    pub community: u64,
}

pub struct ModularityResult {
    /// One entry per vertex, sorted by (actor, layer).
    pub partition: Vec<VertexAssignment>,
    pub modularity: f64,
    pub community_count: usize,
    pub levels: usize,
    pub duration_ms: u64,
}

// ─────────────────────────────────────────────
// Multislice graph
// ─────────────────────────────────────────────

/// Aggregatable multislice graph. Intra-layer weights are stored
/// symmetrically per ordered pair; aggregation turns intra-group weight
/// into self-loops, so per-layer totals stay invariant across levels.
struct SliceGraph {
    layer_count: usize,
    /// node → (neighbor, layer) → weight
    intra: Vec<HashMap<(usize, usize), f64>>,
    /// node → node → coupling weight (self-coupling after aggregation)
    coupling: Vec<HashMap<usize, f64>>,
    /// node → per-layer strength
    strength: Vec<Vec<f64>>,
    /// per-layer total strength (2m_s)
    two_m: Vec<f64>,
}

impl SliceGraph {
    fn node_count(&self) -> usize {
        self.intra.len()
    }

    fn from_store(store: &MultilayerStore, omega: f64) -> (Self, Vec<(ActorId, LayerId)>) {
        let vertices = store.vertices(None, None);
        let index: HashMap<(ActorId, LayerId), usize> =
            vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let n = vertices.len();
        let layer_count = store.layer_count();

        let mut intra: Vec<HashMap<(usize, usize), f64>> = vec![HashMap::new(); n];
        for e in store.edges(None) {
            let s = e.layer.0 as usize;
            let u = index[&(e.from, e.layer)];
            let v = index[&(e.to, e.layer)];
            // symmetrized: direction is ignored by the null model
            *intra[u].entry((v, s)).or_default() += 1.0;
            *intra[v].entry((u, s)).or_default() += 1.0;
        }

        let mut coupling: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
        if omega > 0.0 {
            let mut by_actor: HashMap<ActorId, Vec<usize>> = HashMap::new();
            for (i, &(a, _)) in vertices.iter().enumerate() {
                by_actor.entry(a).or_default().push(i);
            }
            for copies in by_actor.values() {
                for (i, &u) in copies.iter().enumerate() {
                    for &v in &copies[i + 1..] {
                        *coupling[u].entry(v).or_default() += omega;
                        *coupling[v].entry(u).or_default() += omega;
                    }
                }
            }
        }

        let mut graph = SliceGraph {
            layer_count,
            intra,
            coupling,
            strength: Vec::new(),
            two_m: Vec::new(),
        };
        graph.recompute_strengths();
        (graph, vertices)
    }

    fn recompute_strengths(&mut self) {
        let n = self.node_count();
        self.strength = vec![vec![0.0; self.layer_count]; n];
        self.two_m = vec![0.0; self.layer_count];
        for i in 0..n {
            for (&(_, s), &w) in &self.intra[i] {
                self.strength[i][s] += w;
                self.two_m[s] += w;
            }
        }
    }

    /// Collapse groups into super-vertices. Returns the aggregated graph
    /// and the map old node → new node.
    fn aggregate(&self, comm: &[usize]) -> (SliceGraph, Vec<usize>) {
        // renumber groups contiguously, ascending by old group id
        let mut groups: Vec<usize> = comm.to_vec();
        groups.sort_unstable();
        groups.dedup();
        let renum: HashMap<usize, usize> =
            groups.iter().enumerate().map(|(new, &old)| (old, new)).collect();
        let node_map: Vec<usize> = comm.iter().map(|c| renum[c]).collect();
        let n = groups.len();

        let mut intra: Vec<HashMap<(usize, usize), f64>> = vec![HashMap::new(); n];
        let mut coupling: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
        for i in 0..self.node_count() {
            let ci = node_map[i];
            for (&(j, s), &w) in &self.intra[i] {
                *intra[ci].entry((node_map[j], s)).or_default() += w;
            }
            for (&j, &w) in &self.coupling[i] {
                *coupling[ci].entry(node_map[j]).or_default() += w;
            }
        }

        let mut graph = SliceGraph {
            layer_count: self.layer_count,
            intra,
            coupling,
            strength: Vec::new(),
            two_m: Vec::new(),
        };
        graph.recompute_strengths();
        (graph, node_map)
    }

    /// Multislice modularity of a partition of this graph.
    fn modularity(&self, comm: &[usize], gamma: f64) -> f64 {
        let coupling_total: f64 = self.coupling.iter().flat_map(|m| m.values()).sum();
        let two_mu: f64 = self.two_m.iter().sum::<f64>() + coupling_total;
        if two_mu == 0.0 {
            return 0.0;
        }

        let group_count = comm.iter().copied().max().map(|c| c + 1).unwrap_or(0);
        let mut group_strength = vec![vec![0.0; self.layer_count]; group_count];
        for (i, &c) in comm.iter().enumerate() {
            for s in 0..self.layer_count {
                group_strength[c][s] += self.strength[i][s];
            }
        }

        let mut q = 0.0;
        for i in 0..self.node_count() {
            for (&(j, _), &w) in &self.intra[i] {
                if comm[i] == comm[j] {
                    q += w;
                }
            }
            for (&j, &w) in &self.coupling[i] {
                if comm[i] == comm[j] {
                    q += w;
                }
            }
        }
        for s in 0..self.layer_count {
            if self.two_m[s] == 0.0 {
                continue;
            }
            for gs in &group_strength {
                q -= gamma * gs[s] * gs[s] / self.two_m[s];
            }
        }
        q / two_mu
    }
}

// ─────────────────────────────────────────────
// Local moves
// ─────────────────────────────────────────────

/// One level of greedy local moves. Returns the group per node and
/// whether any move happened.
fn local_moves(
    graph: &SliceGraph,
    gamma: f64,
    max_sweeps: usize,
    rng: &mut dyn rand::RngCore,
) -> (Vec<usize>, bool) {
    let n = graph.node_count();
    let mut comm: Vec<usize> = (0..n).collect();
    let mut group_strength: Vec<Vec<f64>> = graph.strength.clone();
    let mut improved = false;

    let mut order: Vec<usize> = (0..n).collect();
    for _ in 0..max_sweeps {
        order.shuffle(rng);
        let mut moved = false;

        for &i in &order {
            let current = comm[i];
            for s in 0..graph.layer_count {
                group_strength[current][s] -= graph.strength[i][s];
            }

            // weights from i toward each neighboring group
            let mut w_intra: HashMap<usize, Vec<f64>> = HashMap::new();
            for (&(j, s), &w) in &graph.intra[i] {
                if j != i {
                    w_intra.entry(comm[j]).or_insert_with(|| vec![0.0; graph.layer_count])[s] += w;
                }
            }
            let mut w_cpl: HashMap<usize, f64> = HashMap::new();
            for (&j, &w) in &graph.coupling[i] {
                if j != i {
                    *w_cpl.entry(comm[j]).or_default() += w;
                }
            }

            // candidate groups, ascending for deterministic tie-breaking
            let mut candidates: Vec<usize> =
                w_intra.keys().chain(w_cpl.keys()).copied().collect();
            candidates.push(current);
            candidates.sort_unstable();
            candidates.dedup();

            let gain_of = |c: usize| -> f64 {
                let mut gain = *w_cpl.get(&c).unwrap_or(&0.0);
                let zero = vec![0.0; graph.layer_count];
                let wi = w_intra.get(&c).unwrap_or(&zero);
                for s in 0..graph.layer_count {
                    if graph.two_m[s] == 0.0 {
                        continue;
                    }
                    gain += wi[s]
                        - gamma * graph.strength[i][s] * group_strength[c][s] / graph.two_m[s];
                }
                gain
            };

            let mut best = current;
            let mut best_gain = gain_of(current);
            for &c in &candidates {
                if c == current {
                    continue;
                }
                let g = gain_of(c);
                if g > best_gain + 1e-12 {
                    best_gain = g;
                    best = c;
                }
            }

            comm[i] = best;
            for s in 0..graph.layer_count {
                group_strength[best][s] += graph.strength[i][s];
            }
            if best != current {
                moved = true;
                improved = true;
            }
        }

        if !moved {
            break;
        }
    }

    (comm, improved)
}

// ─────────────────────────────────────────────
// Entry point
// ─────────────────────────────────────────────

/// Generalized modularity optimization over the full multilayer
/// structure. See the module docs for the objective and determinism
/// guarantees.
pub fn generalized_modularity(
    store: &MultilayerStore,
    config: &ModularityConfig,
) -> ModularityResult {
    let start = Instant::now();
    let (mut graph, vertices) = SliceGraph::from_store(store, config.omega);
    let n = vertices.len();
    if n == 0 {
        return ModularityResult {
            partition: vec![],
            modularity: 0.0,
            community_count: 0,
            levels: 0,
            duration_ms: 0,
        };
    }

    let mut rng: Box<dyn rand::RngCore> = match config.seed {
        Some(s) => Box::new(rand::rngs::StdRng::seed_from_u64(s)),
        None => Box::new(rand::thread_rng()),
    };

    // node_of[v]: the aggregated node currently holding original vertex v
    let mut node_of: Vec<usize> = (0..n).collect();
    let mut levels = 0;

    for _ in 0..config.max_levels {
        let (comm, improved) = local_moves(&graph, config.gamma, config.max_sweeps, &mut *rng);
        let (aggregated, node_map) = graph.aggregate(&comm);
        levels += 1;
        debug!(
            level = levels,
            groups = aggregated.node_count(),
            "modularity level complete"
        );

        for slot in node_of.iter_mut() {
            *slot = node_map[*slot];
        }
        let done = !improved || aggregated.node_count() == graph.node_count();
        graph = aggregated;
        if done {
            break;
        }
    }

    let identity: Vec<usize> = (0..graph.node_count()).collect();
    let modularity = graph.modularity(&identity, config.gamma);

    let partition: Vec<VertexAssignment> = vertices
        .iter()
        .zip(node_of.iter())
        .map(|(&(actor, layer), &c)| VertexAssignment { actor, layer, community: c as u64 })
        .collect();

    ModularityResult {
        partition,
        modularity,
        community_count: graph.node_count(),
        levels,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
