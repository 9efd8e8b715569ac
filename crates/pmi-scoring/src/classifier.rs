//! Scoring variant for supervised models

use crate::model::{Classifier, PmmlModel};
use crate::scorer::model_error;
use pmi_core::{AttributeType, Error, Instance, Instances, Result};

/// Scores rows with a wrapped [`Classifier`]
pub(crate) struct ClassifierScorer {
    model: Box<dyn Classifier>,
}

impl ClassifierScorer {
    pub(crate) fn new(model: Box<dyn Classifier>) -> Self {
        Self { model }
    }

    pub(crate) fn type_name(&self) -> &str {
        self.model.type_name()
    }

    pub(crate) fn is_incremental(&self) -> bool {
        self.model.is_updateable()
    }

    pub(crate) fn is_batch_capable(&self) -> bool {
        self.model.is_batch_predictor()
    }

    pub(crate) fn classify(&self, instance: &Instance) -> Result<f64> {
        self.model
            .classify_instance(instance)
            .map_err(|e| model_error(self.type_name(), e))
    }

    /// `classes` is the class count of the attached header, when there is one
    pub(crate) fn distribution(
        &self,
        instance: &Instance,
        classes: Option<usize>,
    ) -> Result<Vec<f64>> {
        let dist = self
            .model
            .distribution_for_instance(instance)
            .map_err(|e| model_error(self.type_name(), e))?;
        self.check_width(&dist, classes)?;
        Ok(dist)
    }

    pub(crate) fn batch_distribution(
        &self,
        instances: &Instances,
        classes: Option<usize>,
    ) -> Result<Vec<Vec<f64>>> {
        let dists = self
            .model
            .distributions_for_instances(instances)
            .map_err(|e| model_error(self.type_name(), e))?;

        if dists.len() != instances.len() {
            return Err(Error::scoring(format!(
                "{} returned {} distributions for {} instances",
                self.type_name(),
                dists.len(),
                instances.len()
            )));
        }
        for dist in &dists {
            self.check_width(dist, classes)?;
        }
        Ok(dists)
    }

    /// Predictions are derived from the batch distributions: the most probable
    /// label for a nominal target, the single predicted value otherwise.
    pub(crate) fn batch_classify(
        &self,
        instances: &Instances,
        classes: Option<usize>,
    ) -> Result<Vec<f64>> {
        let nominal = match instances.header.class_attribute() {
            Some(attr) => matches!(attr.kind, AttributeType::Nominal { .. }),
            None => false,
        };

        Ok(self
            .batch_distribution(instances, classes)?
            .iter()
            .map(|dist| {
                if nominal || dist.len() > 1 {
                    predicted_label(dist)
                } else {
                    dist.first().copied().unwrap_or(Instance::MISSING)
                }
            })
            .collect())
    }

    pub(crate) fn update(&mut self, instance: &Instance) -> Result<bool> {
        self.model
            .update_classifier(instance)
            .map_err(|e| model_error(self.type_name(), e))?;
        Ok(true)
    }

    fn check_width(&self, dist: &[f64], classes: Option<usize>) -> Result<()> {
        match classes {
            Some(expected) if dist.len() != expected => Err(Error::scoring(format!(
                "{} returned a distribution of width {}, expected {} classes",
                self.type_name(),
                dist.len(),
                expected
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn pmml(&mut self) -> Option<&mut dyn PmmlModel> {
        self.model.as_pmml()
    }

    pub(crate) fn inner(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub(crate) fn into_inner(self) -> Box<dyn Classifier> {
        self.model
    }
}

/// Index of the largest probability; missing when the distribution is all zero
pub(crate) fn predicted_label(dist: &[f64]) -> f64 {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in dist.iter().enumerate() {
        if p > 0.0 && best.map_or(true, |(_, b)| p > b) {
            best = Some((i, p));
        }
    }
    best.map_or(Instance::MISSING, |(i, _)| i as f64)
}
