//! Uniform scoring contract over wrapped models

use crate::classifier::ClassifierScorer;
use crate::clusterer::ClustererScorer;
use crate::log_adapter::LogAdapter;
use crate::model::{Capability, Classifier, Clusterer, PmmlModel, WrappedModel};
use pmi_core::{Error, Header, Instance, Instances, LogSink, Result};
use std::sync::Arc;
use tracing::debug;

/// Concrete scoring behaviour, picked from the capability tag
enum Variant {
    Classifier(ClassifierScorer),
    Clusterer(ClustererScorer),
}

/// Scoring adapter created once per model load and used for one scoring run.
///
/// The lifecycle is linear: `create` → optional `set_header`/`set_log` →
/// any number of scoring calls → `done`. Scoring calls after `done` fail with
/// [`Error::ScorerFinished`].
pub struct ScoringModel {
    variant: Variant,
    capability: Capability,
    incremental: bool,
    batch_capable: bool,
    header: Option<Arc<Header>>,
    log: Option<LogAdapter>,
    finished: bool,
}

impl ScoringModel {
    /// Build the adapter matching the model's capability
    pub fn create(model: WrappedModel) -> Result<Self> {
        let capability = model.capability();
        let variant = match (capability, model) {
            (Capability::Supervised, WrappedModel::Classifier(c)) => {
                Variant::Classifier(ClassifierScorer::new(c))
            }
            (Capability::Grouping, WrappedModel::Clusterer(c)) => {
                Variant::Clusterer(ClustererScorer::new(c))
            }
            (_, other) => {
                return Err(Error::UnsupportedModelType(other.type_name().to_string()));
            }
        };

        let (incremental, batch_capable) = match &variant {
            Variant::Classifier(s) => (s.is_incremental(), s.is_batch_capable()),
            Variant::Clusterer(s) => (s.is_incremental(), s.is_batch_capable()),
        };

        let scorer = Self {
            variant,
            capability,
            incremental,
            batch_capable,
            header: None,
            log: None,
            finished: false,
        };
        debug!(
            model = scorer.model_type(),
            capability = ?capability,
            incremental,
            batch_capable,
            "Created scoring model"
        );
        Ok(scorer)
    }

    /// Capability tag decided at construction
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Concrete type name of the wrapped model
    pub fn model_type(&self) -> &str {
        match &self.variant {
            Variant::Classifier(s) => s.type_name(),
            Variant::Clusterer(s) => s.type_name(),
        }
    }

    /// True for supervised (classifier-backed) adapters
    pub fn is_supervised(&self) -> bool {
        self.capability == Capability::Supervised
    }

    /// True if the wrapped model can be updated one instance at a time
    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    /// True if the wrapped model can score whole batches
    pub fn is_batch_capable(&self) -> bool {
        self.batch_capable
    }

    /// Attach the training-time schema; not validated
    pub fn set_header(&mut self, header: Arc<Header>) {
        self.header = Some(header);
    }

    /// The training-time schema, if one was attached
    pub fn header(&self) -> Option<&Arc<Header>> {
        self.header.as_ref()
    }

    /// Pass the host's log on to the model. Only PMML models take a log.
    pub fn set_log(&mut self, sink: Arc<dyn LogSink>) -> Result<()> {
        self.ensure_active()?;
        let adapter = LogAdapter::new(sink);
        if let Some(pmml) = self.pmml() {
            pmml.set_log(adapter.clone());
            if let Some(previous) = self.log.replace(adapter) {
                previous.close();
            }
        }
        Ok(())
    }

    /// Whether a log adapter is attached to the wrapped model
    pub fn has_log(&self) -> bool {
        self.log.is_some()
    }

    /// Single prediction: class index/value, or cluster index
    pub fn classify(&self, instance: &Instance) -> Result<f64> {
        self.ensure_active()?;
        match &self.variant {
            Variant::Classifier(s) => s.classify(instance),
            Variant::Clusterer(s) => s.classify(instance),
        }
    }

    /// Distribution over classes or clusters
    pub fn distribution(&self, instance: &Instance) -> Result<Vec<f64>> {
        self.ensure_active()?;
        match &self.variant {
            Variant::Classifier(s) => s.distribution(instance, self.num_classes()),
            Variant::Clusterer(s) => s.distribution(instance),
        }
    }

    /// Batch predictions; fails fast unless [`is_batch_capable`](Self::is_batch_capable)
    pub fn batch_classify(&self, instances: &Instances) -> Result<Vec<f64>> {
        self.ensure_batch()?;
        match &self.variant {
            Variant::Classifier(s) => s.batch_classify(instances, self.num_classes()),
            Variant::Clusterer(s) => s.batch_classify(instances),
        }
    }

    /// Batch distributions; fails fast unless [`is_batch_capable`](Self::is_batch_capable)
    pub fn batch_distribution(&self, instances: &Instances) -> Result<Vec<Vec<f64>>> {
        self.ensure_batch()?;
        match &self.variant {
            Variant::Classifier(s) => s.batch_distribution(instances, self.num_classes()),
            Variant::Clusterer(s) => s.batch_distribution(instances),
        }
    }

    /// Apply one incremental training step
    pub fn update(&mut self, instance: &Instance) -> Result<bool> {
        self.ensure_active()?;
        if !self.incremental {
            return Err(Error::NotIncremental(self.model_type().to_string()));
        }
        match &mut self.variant {
            Variant::Classifier(s) => s.update(instance),
            Variant::Clusterer(s) => s.update(instance),
        }
    }

    /// End the scoring run and release the model's log adapter
    pub fn done(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Some(log) = self.log.take() {
            log.close();
        }
        debug!(model = self.model_type(), "Scoring run finished");
    }

    /// Whether `done` has been called
    pub fn is_done(&self) -> bool {
        self.finished
    }

    /// The wrapped classifier, if this is the classifier variant
    pub fn classifier(&self) -> Option<&dyn Classifier> {
        match &self.variant {
            Variant::Classifier(s) => Some(s.inner()),
            Variant::Clusterer(_) => None,
        }
    }

    /// The wrapped clusterer, if this is the clusterer variant
    pub fn clusterer(&self) -> Option<&dyn Clusterer> {
        match &self.variant {
            Variant::Clusterer(s) => Some(s.inner()),
            Variant::Classifier(_) => None,
        }
    }

    /// Give the wrapped model back to the caller
    pub fn into_model(self) -> WrappedModel {
        match self.variant {
            Variant::Classifier(s) => WrappedModel::Classifier(s.into_inner()),
            Variant::Clusterer(s) => WrappedModel::Clusterer(s.into_inner()),
        }
    }

    fn pmml(&mut self) -> Option<&mut dyn PmmlModel> {
        match &mut self.variant {
            Variant::Classifier(s) => s.pmml(),
            Variant::Clusterer(s) => s.pmml(),
        }
    }

    fn num_classes(&self) -> Option<usize> {
        self.header.as_ref().and_then(|h| h.num_classes())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.finished {
            return Err(Error::ScorerFinished(self.model_type().to_string()));
        }
        Ok(())
    }

    fn ensure_batch(&self) -> Result<()> {
        self.ensure_active()?;
        if !self.batch_capable {
            return Err(Error::NotBatchCapable(self.model_type().to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ScoringModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringModel")
            .field("model", &self.model_type())
            .field("capability", &self.capability)
            .field("incremental", &self.incremental)
            .field("batch_capable", &self.batch_capable)
            .field("finished", &self.finished)
            .finish()
    }
}

/// Wrap a failure from the underlying model as a scoring error
pub(crate) fn model_error(type_name: &str, err: anyhow::Error) -> Error {
    Error::scoring(format!("{}: {:#}", type_name, err))
}
