//! The growth engine: builds a synthetic multilayer network step by
//! step, combining per-layer internal models with cross-layer edge
//! importation.
//!
//! ## Step protocol
//!
//! At each of `steps` iterations, every layer independently:
//! 1. **Draw** — internal / external / no action, via a seeded weighted
//!    draw over `(p_internal, p_external, 1 − p_internal − p_external)`.
//! 2. **Internal** — grow one edge (and vertex, model permitting) per
//!    the layer's [`InternalModel`].
//! 3. **External** — copy one uniformly drawn edge from a dependency
//!    layer (chosen by declared weight), importing absent endpoints as
//!    vertices first.
//!
//! Every draw is recorded in the run report, so equal seeds produce
//! identical action traces. The step loop is inherently sequential:
//! external actions may copy edges added by earlier steps on other
//! layers.

use std::collections::HashSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use tracing::info;

use muxnet_graph::{ActorId, EdgeDirectionality, LayerId, MultilayerStore};

use crate::error::GrowthError;
use crate::models::InternalModel;

// ─────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────

/// Growth settings for one layer.
#[derive(Debug, Clone)]
pub struct LayerGrowth {
    pub name: String,
    pub directionality: EdgeDirectionality,
    pub model: InternalModel,
    /// Probability of acting internally at each step.
    pub p_internal: f64,
    /// Probability of importing an edge from a dependency layer.
    pub p_external: f64,
    /// Weighted dependency layers for external actions.
    pub dependencies: Vec<(String, f64)>,
}

#[derive(Debug, Clone)]
pub struct GrowthConfig {
    /// Size of the actor pool the models draw from.
    pub actors: usize,
    /// Number of iteration steps.
    pub steps: usize,
    /// RNG seed; `None` draws from the thread RNG.
    pub seed: Option<u64>,
    pub layers: Vec<LayerGrowth>,
}

// ─────────────────────────────────────────────
// Report
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Internal,
    External,
    NoAction,
}

/// One recorded draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRecord {
    pub step: usize,
    pub layer: LayerId,
    pub action: ActionKind,
}

/// Outcome of a growth run.
#[derive(Debug, Clone, Default)]
pub struct GrowthReport {
    /// Every draw, in (step, layer) order.
    pub actions: Vec<ActionRecord>,
    pub vertices_added: usize,
    pub edges_added: usize,
}

// ─────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────

/// Validated growth simulator. Construction checks the configuration;
/// [`GrowthEngine::run`] then builds a fresh store.
pub struct GrowthEngine {
    config: GrowthConfig,
    /// Per layer: dependency targets as indexes into `config.layers`,
    /// with their weights.
    dependency_index: Vec<Vec<(usize, f64)>>,
}

impl GrowthEngine {
    pub fn new(config: GrowthConfig) -> Result<Self, GrowthError> {
        let mut seen = HashSet::new();
        for layer in &config.layers {
            if !seen.insert(layer.name.clone()) {
                return Err(GrowthError::DuplicateLayerName(layer.name.clone()));
            }
        }

        let mut dependency_index = Vec::with_capacity(config.layers.len());
        for layer in &config.layers {
            if !layer.p_internal.is_finite()
                || !layer.p_external.is_finite()
                || layer.p_internal < 0.0
                || layer.p_external < 0.0
            {
                return Err(GrowthError::NegativeProbability { layer: layer.name.clone() });
            }
            let total = layer.p_internal + layer.p_external;
            if total > 1.0 {
                return Err(GrowthError::ProbabilityOutOfRange {
                    layer: layer.name.clone(),
                    total,
                });
            }
            if layer.p_external > 0.0 && layer.dependencies.is_empty() {
                return Err(GrowthError::MissingDependency { layer: layer.name.clone() });
            }
            layer.model.validate().map_err(|reason| GrowthError::InvalidModel {
                layer: layer.name.clone(),
                reason,
            })?;

            let mut deps = Vec::with_capacity(layer.dependencies.len());
            for (dep_name, weight) in &layer.dependencies {
                let idx = config
                    .layers
                    .iter()
                    .position(|l| &l.name == dep_name)
                    .ok_or_else(|| GrowthError::UnknownDependency {
                        layer: layer.name.clone(),
                        dependency: dep_name.clone(),
                    })?;
                if *weight <= 0.0 {
                    return Err(GrowthError::BadDependencyWeight {
                        layer: layer.name.clone(),
                        dependency: dep_name.clone(),
                    });
                }
                deps.push((idx, *weight));
            }
            dependency_index.push(deps);
        }

        Ok(Self { config, dependency_index })
    }

    /// Run the simulation, returning the grown store and the action
    /// trace.
    pub fn run(&self) -> Result<(MultilayerStore, GrowthReport), GrowthError> {
        let mut store = MultilayerStore::new();
        let layer_ids: Vec<LayerId> = self
            .config
            .layers
            .iter()
            .map(|l| store.add_layer(&l.name, l.directionality))
            .collect::<Result<_, _>>()?;
        let pool: Vec<ActorId> =
            (0..self.config.actors).map(|i| store.ensure_actor(&format!("a{i}"))).collect();

        let mut rng: Box<dyn rand::RngCore> = match self.config.seed {
            Some(s) => Box::new(rand::rngs::StdRng::seed_from_u64(s)),
            None => Box::new(rand::thread_rng()),
        };

        // one immutable action sampler per layer
        let mut samplers: Vec<WeightedIndex<f64>> = Vec::with_capacity(self.config.layers.len());
        for l in &self.config.layers {
            let none = (1.0 - l.p_internal - l.p_external).max(0.0);
            let sampler = WeightedIndex::new([l.p_internal, l.p_external, none]).map_err(|e| {
                GrowthError::BadWeights { layer: l.name.clone(), reason: e.to_string() }
            })?;
            samplers.push(sampler);
        }

        let mut report = GrowthReport::default();

        for step in 0..self.config.steps {
            for (li, &layer) in layer_ids.iter().enumerate() {
                let action = match samplers[li].sample(&mut rng) {
                    0 => ActionKind::Internal,
                    1 => ActionKind::External,
                    _ => ActionKind::NoAction,
                };
                report.actions.push(ActionRecord { step, layer, action });

                match action {
                    ActionKind::Internal => self.act_internal(
                        &mut store,
                        layer,
                        &self.config.layers[li].model,
                        &pool,
                        &mut rng,
                        &mut report,
                    )?,
                    ActionKind::External => self.act_external(
                        &mut store,
                        layer,
                        &layer_ids,
                        &self.dependency_index[li],
                        &mut rng,
                        &mut report,
                    )?,
                    ActionKind::NoAction => {}
                }
            }
        }

        info!(
            steps = self.config.steps,
            vertices = report.vertices_added,
            edges = report.edges_added,
            "growth run complete"
        );
        Ok((store, report))
    }

    fn act_internal(
        &self,
        store: &mut MultilayerStore,
        layer: LayerId,
        model: &InternalModel,
        pool: &[ActorId],
        rng: &mut dyn rand::RngCore,
        report: &mut GrowthReport,
    ) -> Result<(), GrowthError> {
        match model {
            InternalModel::PreferentialAttachment { m0, m } => {
                let absent: Vec<ActorId> = pool
                    .iter()
                    .copied()
                    .filter(|&a| !store.contains_vertex(a, layer))
                    .collect();
                let Some(&joiner) = absent.get(rng.gen_range(0..absent.len().max(1))) else {
                    return Ok(()); // pool exhausted: the draw stands, nothing to add
                };

                let existing = store.actors_in(&[layer]);
                store.add_vertex(joiner, layer)?;
                report.vertices_added += 1;

                if existing.len() < *m0 {
                    // bootstrap phase: connect to every existing vertex
                    for &other in &existing {
                        store.add_edge(joiner, other, layer)?;
                        report.edges_added += 1;
                    }
                } else {
                    let targets = preferential_targets(store, layer, &existing, *m, rng)?;
                    for other in targets {
                        store.add_edge(joiner, other, layer)?;
                        report.edges_added += 1;
                    }
                }
            }
            InternalModel::UniformAttachment => {
                if pool.len() < 2 {
                    return Ok(());
                }
                let i = rng.gen_range(0..pool.len());
                let mut j = rng.gen_range(0..pool.len() - 1);
                if j >= i {
                    j += 1;
                }
                let (a, b) = (pool[i], pool[j]);
                for v in [a, b] {
                    if !store.contains_vertex(v, layer) {
                        store.add_vertex(v, layer)?;
                        report.vertices_added += 1;
                    }
                }
                if !store.contains_edge(a, b, layer) {
                    store.add_edge(a, b, layer)?;
                    report.edges_added += 1;
                }
            }
        }
        Ok(())
    }

    fn act_external(
        &self,
        store: &mut MultilayerStore,
        layer: LayerId,
        layer_ids: &[LayerId],
        dependencies: &[(usize, f64)],
        rng: &mut dyn rand::RngCore,
        report: &mut GrowthReport,
    ) -> Result<(), GrowthError> {
        let weights: Vec<f64> = dependencies.iter().map(|&(_, w)| w).collect();
        let sampler = WeightedIndex::new(&weights).map_err(|e| GrowthError::BadWeights {
            layer: store.layer_name(layer).unwrap_or_default().to_owned(),
            reason: e.to_string(),
        })?;
        let source = layer_ids[dependencies[sampler.sample(rng)].0];

        let edges = store.edges(Some(&[source]));
        if edges.is_empty() {
            return Ok(()); // degenerate: nothing to import yet
        }
        let edge = edges[rng.gen_range(0..edges.len())];

        for v in [edge.from, edge.to] {
            if !store.contains_vertex(v, layer) {
                store.add_vertex(v, layer)?;
                report.vertices_added += 1;
            }
        }
        if !store.contains_edge(edge.from, edge.to, layer) {
            store.add_edge(edge.from, edge.to, layer)?;
            report.edges_added += 1;
        }
        Ok(())
    }
}

/// Draw up to `m` distinct attachment targets, each proportionally to
/// its current degree; falls back to uniform while the layer has no
/// edges yet.
fn preferential_targets(
    store: &MultilayerStore,
    layer: LayerId,
    existing: &[ActorId],
    m: usize,
    rng: &mut dyn rand::RngCore,
) -> Result<Vec<ActorId>, GrowthError> {
    let mut candidates: Vec<(ActorId, f64)> = existing
        .iter()
        .map(|&a| {
            (a, store.degree_in_layer(a, layer, muxnet_graph::Direction::Both) as f64)
        })
        .collect();
    let mut targets = Vec::new();

    while targets.len() < m && !candidates.is_empty() {
        let all_zero = candidates.iter().all(|&(_, w)| w == 0.0);
        let idx = if all_zero {
            rng.gen_range(0..candidates.len())
        } else {
            let weights: Vec<f64> = candidates.iter().map(|&(_, w)| w).collect();
            WeightedIndex::new(&weights)
                .map_err(|e| GrowthError::BadWeights {
                    layer: store.layer_name(layer).unwrap_or_default().to_owned(),
                    reason: e.to_string(),
                })?
                .sample(rng)
        };
        targets.push(candidates.swap_remove(idx).0);
    }
    Ok(targets)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pa_layer(name: &str, p_internal: f64) -> LayerGrowth {
        LayerGrowth {
            name: name.to_owned(),
            directionality: EdgeDirectionality::Undirected,
            model: InternalModel::PreferentialAttachment { m0: 2, m: 1 },
            p_internal,
            p_external: 0.0,
            dependencies: vec![],
        }
    }

    #[test]
    fn probabilities_above_one_rejected() {
        let mut layer = pa_layer("l", 0.8);
        layer.p_external = 0.4;
        layer.dependencies = vec![("l".to_owned(), 1.0)];
        let err = GrowthEngine::new(GrowthConfig {
            actors: 10,
            steps: 5,
            seed: Some(1),
            layers: vec![layer],
        })
        .err()
        .expect("must reject");
        assert!(matches!(err, GrowthError::ProbabilityOutOfRange { .. }));
    }

    #[test]
    fn external_without_dependencies_rejected() {
        let mut layer = pa_layer("l", 0.5);
        layer.p_external = 0.5;
        let err = GrowthEngine::new(GrowthConfig {
            actors: 10,
            steps: 5,
            seed: Some(1),
            layers: vec![layer],
        })
        .err()
        .expect("must reject");
        assert!(matches!(err, GrowthError::MissingDependency { .. }));
    }

    #[test]
    fn unknown_dependency_rejected() {
        let mut layer = pa_layer("l", 0.5);
        layer.p_external = 0.5;
        layer.dependencies = vec![("ghost".to_owned(), 1.0)];
        let err = GrowthEngine::new(GrowthConfig {
            actors: 10,
            steps: 5,
            seed: Some(1),
            layers: vec![layer],
        })
        .err()
        .expect("must reject");
        assert!(matches!(err, GrowthError::UnknownDependency { .. }));
    }

    #[test]
    fn bad_model_parameters_rejected() {
        let mut layer = pa_layer("l", 1.0);
        layer.model = InternalModel::PreferentialAttachment { m0: 0, m: 1 };
        let err = GrowthEngine::new(GrowthConfig {
            actors: 10,
            steps: 5,
            seed: Some(1),
            layers: vec![layer],
        })
        .err()
        .expect("must reject");
        assert!(matches!(err, GrowthError::InvalidModel { .. }));
    }

    #[test]
    fn preferential_attachment_grows_one_vertex_per_step() {
        let engine = GrowthEngine::new(GrowthConfig {
            actors: 20,
            steps: 10,
            seed: Some(7),
            layers: vec![pa_layer("l", 1.0)],
        })
        .unwrap();
        let (store, report) = engine.run().unwrap();
        let l = store.layer_id("l").unwrap();

        // every step draws Internal (p = 1) and one vertex joins
        assert_eq!(store.order(l), 10);
        assert!(report.actions.iter().all(|a| a.action == ActionKind::Internal));
        // bootstrap: vertex 1 adds 0 edges, vertex 2 adds 1; then m = 1 each
        assert_eq!(report.edges_added, 9);
        assert_eq!(store.size(l), 9);
    }

    #[test]
    fn external_actions_copy_edges_from_the_dependency() {
        let target = LayerGrowth {
            name: "copy".to_owned(),
            directionality: EdgeDirectionality::Undirected,
            model: InternalModel::UniformAttachment,
            p_internal: 0.0,
            p_external: 1.0,
            dependencies: vec![("source".to_owned(), 1.0)],
        };
        let engine = GrowthEngine::new(GrowthConfig {
            actors: 10,
            steps: 30,
            seed: Some(11),
            layers: vec![pa_layer("source", 1.0), target],
        })
        .unwrap();
        let (store, _) = engine.run().unwrap();

        let source = store.layer_id("source").unwrap();
        let copy = store.layer_id("copy").unwrap();
        assert!(store.size(copy) > 0, "external actions should import edges");
        for e in store.edges(Some(&[copy])) {
            assert!(
                store.contains_edge(e.from, e.to, source),
                "imported edge missing from the dependency layer"
            );
        }
    }

    #[test]
    fn equal_seeds_produce_identical_traces_and_stores() {
        let config = GrowthConfig {
            actors: 15,
            steps: 25,
            seed: Some(99),
            layers: vec![
                pa_layer("a", 0.6),
                LayerGrowth {
                    name: "b".to_owned(),
                    directionality: EdgeDirectionality::Undirected,
                    model: InternalModel::UniformAttachment,
                    p_internal: 0.3,
                    p_external: 0.5,
                    dependencies: vec![("a".to_owned(), 1.0)],
                },
            ],
        };
        let (s1, r1) = GrowthEngine::new(config.clone()).unwrap().run().unwrap();
        let (s2, r2) = GrowthEngine::new(config).unwrap().run().unwrap();

        assert_eq!(r1.actions, r2.actions);
        assert_eq!(r1.edges_added, r2.edges_added);
        assert_eq!(s1.edges(None), s2.edges(None));
        assert_eq!(s1.vertices(None, None), s2.vertices(None, None));
    }

    #[test]
    fn no_action_probability_fills_the_remainder() {
        let engine = GrowthEngine::new(GrowthConfig {
            actors: 5,
            steps: 200,
            seed: Some(5),
            layers: vec![pa_layer("l", 0.0)],
        })
        .unwrap();
        let (store, report) = engine.run().unwrap();
        let l = store.layer_id("l").unwrap();

        assert_eq!(store.order(l), 0);
        assert!(report.actions.iter().all(|a| a.action == ActionKind::NoAction));
    }
}
