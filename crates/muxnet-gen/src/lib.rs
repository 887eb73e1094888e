//! # muxnet-gen
//!
//! Stochastic growth simulator for multilayer networks.
//!
//! A [`GrowthEngine`] builds a synthetic [`muxnet_graph::MultilayerStore`]
//! step by step: each layer combines an internal generative model
//! (preferential or uniform attachment) with cross-layer edge
//! importation from declared dependency layers. Runs are seedable and
//! return a full action trace.

pub mod error;
pub mod evolve;
pub mod models;

pub use error::GrowthError;
pub use evolve::{
    ActionKind, ActionRecord, GrowthConfig, GrowthEngine, GrowthReport, LayerGrowth,
};
pub use models::InternalModel;
