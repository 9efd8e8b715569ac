//! PMI Scoring
//!
//! Adapters that put toolkit classifiers, clusterers, and PMML models behind
//! one scoring contract for the host pipeline.
//!
//! A host loads a model, wraps it in a [`WrappedModel`], and builds a
//! [`ScoringModel`] with [`ScoringModel::create`]. The factory picks the
//! classifier or clusterer variant from the model's capability tag; models
//! with neither capability are rejected.

mod classifier;
mod clusterer;
pub mod log_adapter;
pub mod model;
pub mod scorer;

pub use log_adapter::LogAdapter;
pub use model::{Capability, Classifier, Clusterer, ModelResult, PmmlModel, WrappedModel};
pub use scorer::ScoringModel;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::model::{Capability, Classifier, Clusterer, ModelResult, PmmlModel, WrappedModel};
    pub use crate::scorer::ScoringModel;
    pub use pmi_core::prelude::*;
}
