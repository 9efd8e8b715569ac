//! Traits implemented by wrapped toolkit models
//!
//! The scoring layer does not know how a model was trained or serialized. It
//! only sees one of two capability traits: [`Classifier`] (supervised
//! prediction of a single target) or [`Clusterer`] (grouping into clusters).
//! Optional abilities such as incremental updates, batch prediction, and PMML
//! logging are advertised through default methods.

use crate::log_adapter::LogAdapter;
use pmi_core::{Instance, Instances};

/// Errors raised by wrapped models are opaque to this layer
pub type ModelResult<T> = anyhow::Result<T>;

/// Hook exposed by PMML-backed models, which require a log to be attached
pub trait PmmlModel {
    /// Attach the log adapter the model writes to
    fn set_log(&mut self, log: LogAdapter);
}

/// A supervised model predicting a single target
pub trait Classifier: Send {
    /// Concrete type name, used in error messages
    fn type_name(&self) -> &str;

    /// Predict the class index (nominal target) or value (numeric target)
    fn classify_instance(&self, instance: &Instance) -> ModelResult<f64>;

    /// Class probability distribution; a single entry for numeric targets
    fn distribution_for_instance(&self, instance: &Instance) -> ModelResult<Vec<f64>>;

    /// Whether the model can be trained one instance at a time
    fn is_updateable(&self) -> bool {
        false
    }

    /// Apply one incremental training step
    fn update_classifier(&mut self, _instance: &Instance) -> ModelResult<()> {
        anyhow::bail!("{} does not support incremental updates", self.type_name())
    }

    /// Whether the model can score a whole batch at once
    fn is_batch_predictor(&self) -> bool {
        false
    }

    /// Distributions for every row in the batch
    fn distributions_for_instances(&self, _instances: &Instances) -> ModelResult<Vec<Vec<f64>>> {
        anyhow::bail!("{} does not support batch prediction", self.type_name())
    }

    /// PMML logging hook, if this is a PMML model
    fn as_pmml(&mut self) -> Option<&mut dyn PmmlModel> {
        None
    }
}

/// An unsupervised model assigning instances to clusters
pub trait Clusterer: Send {
    /// Concrete type name, used in error messages
    fn type_name(&self) -> &str;

    /// Index of the cluster the instance belongs to
    fn cluster_instance(&self, instance: &Instance) -> ModelResult<usize>;

    /// Cluster membership distribution
    fn distribution_for_instance(&self, instance: &Instance) -> ModelResult<Vec<f64>>;

    /// Number of clusters the model produces
    fn number_of_clusters(&self) -> ModelResult<usize>;

    /// Whether the model can be trained one instance at a time
    fn is_updateable(&self) -> bool {
        false
    }

    /// Apply one incremental training step
    fn update_clusterer(&mut self, _instance: &Instance) -> ModelResult<()> {
        anyhow::bail!("{} does not support incremental updates", self.type_name())
    }

    /// Whether the model can score a whole batch at once
    fn is_batch_predictor(&self) -> bool {
        false
    }

    /// Membership distributions for every row in the batch
    fn distributions_for_instances(&self, _instances: &Instances) -> ModelResult<Vec<Vec<f64>>> {
        anyhow::bail!("{} does not support batch prediction", self.type_name())
    }

    /// PMML logging hook, if this is a PMML model
    fn as_pmml(&mut self) -> Option<&mut dyn PmmlModel> {
        None
    }
}

/// Capability tag of a wrapped model, decided once when the scorer is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Supervised prediction (classifier or regressor)
    Supervised,
    /// Grouping (clusterer)
    Grouping,
    /// Neither capability
    Unsupported,
}

/// A model handed over by the host after deserialization
pub enum WrappedModel {
    /// Supervised model
    Classifier(Box<dyn Classifier>),

    /// Clusterer
    Clusterer(Box<dyn Clusterer>),

    /// Anything else the host managed to load
    Other { type_name: String },
}

impl WrappedModel {
    /// Wrap a classifier
    pub fn classifier(model: impl Classifier + 'static) -> Self {
        Self::Classifier(Box::new(model))
    }

    /// Wrap a clusterer
    pub fn clusterer(model: impl Clusterer + 'static) -> Self {
        Self::Clusterer(Box::new(model))
    }

    /// Capability tag of the model
    pub fn capability(&self) -> Capability {
        match self {
            Self::Classifier(_) => Capability::Supervised,
            Self::Clusterer(_) => Capability::Grouping,
            Self::Other { .. } => Capability::Unsupported,
        }
    }

    /// Concrete type name of the model
    pub fn type_name(&self) -> &str {
        match self {
            Self::Classifier(c) => c.type_name(),
            Self::Clusterer(c) => c.type_name(),
            Self::Other { type_name } => type_name,
        }
    }
}

impl std::fmt::Debug for WrappedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedModel")
            .field("capability", &self.capability())
            .field("type_name", &self.type_name())
            .finish()
    }
}
