//! Scoring variant for clusterers

use crate::classifier::predicted_label;
use crate::model::{Clusterer, PmmlModel};
use crate::scorer::model_error;
use pmi_core::{Error, Instance, Instances, Result};

/// Scores rows with a wrapped [`Clusterer`]
pub(crate) struct ClustererScorer {
    model: Box<dyn Clusterer>,
}

impl ClustererScorer {
    pub(crate) fn new(model: Box<dyn Clusterer>) -> Self {
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
            .cluster_instance(instance)
            .map(|cluster| cluster as f64)
            .map_err(|e| model_error(self.type_name(), e))
    }

    pub(crate) fn distribution(&self, instance: &Instance) -> Result<Vec<f64>> {
        let dist = self
            .model
            .distribution_for_instance(instance)
            .map_err(|e| model_error(self.type_name(), e))?;
        self.check_width(&dist)?;
        Ok(dist)
    }

    pub(crate) fn batch_distribution(&self, instances: &Instances) -> Result<Vec<Vec<f64>>> {
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
            self.check_width(dist)?;
        }
        Ok(dists)
    }

    pub(crate) fn batch_classify(&self, instances: &Instances) -> Result<Vec<f64>> {
        Ok(self
            .batch_distribution(instances)?
            .iter()
            .map(|dist| predicted_label(dist))
            .collect())
    }

    pub(crate) fn update(&mut self, instance: &Instance) -> Result<bool> {
        self.model
            .update_clusterer(instance)
            .map_err(|e| model_error(self.type_name(), e))?;
        Ok(true)
    }

    pub(crate) fn pmml(&mut self) -> Option<&mut dyn PmmlModel> {
        self.model.as_pmml()
    }

    pub(crate) fn inner(&self) -> &dyn Clusterer {
        self.model.as_ref()
    }

    pub(crate) fn into_inner(self) -> Box<dyn Clusterer> {
        self.model
    }

    // Membership distributions always have one entry per cluster
    fn check_width(&self, dist: &[f64]) -> Result<()> {
        let clusters = self
            .model
            .number_of_clusters()
            .map_err(|e| model_error(self.type_name(), e))?;
        if dist.len() != clusters {
            return Err(Error::scoring(format!(
                "{} returned a distribution of width {} for {} clusters",
                self.type_name(),
                dist.len(),
                clusters
            )));
        }
        Ok(())
    }
}
