//! File-backed models
//!
//! A model file is a JSON document holding one or more named, already-trained
//! linear models. The service picks one by name at startup.

use crate::classifier::{Classifier, Label};
use crate::error::{Error, Result};
use crate::vector::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

fn default_threshold() -> f64 {
    0.5
}

/// A linear model with a logistic link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    /// Column order the weights were trained against
    pub columns: Vec<String>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    /// Probability at or above which the positive label is returned
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LinearModel {
    pub fn new(columns: Vec<String>, weights: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            columns,
            weights,
            intercept,
            threshold: default_threshold(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.len() != self.weights.len() {
            return Err(Error::InvalidModel(format!(
                "{} columns but {} weights",
                self.columns.len(),
                self.weights.len()
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidModel(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        if self.weights.iter().any(|w| !w.is_finite()) || !self.intercept.is_finite() {
            return Err(Error::InvalidModel("non-finite parameter".to_string()));
        }
        Ok(())
    }

    /// Probability of the positive label
    pub fn probability(&self, features: &FeatureVector) -> Result<f64> {
        let score = features
            .dot(&self.weights)
            .ok_or(Error::InvalidDimension {
                expected: self.weights.len(),
                actual: features.dim(),
            })?
            + self.intercept;
        Ok(1.0 / (1.0 + (-score).exp()))
    }
}

impl Classifier for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<Label> {
        if self.probability(features)? >= self.threshold {
            Ok(Label::Positive)
        } else {
            Ok(Label::Negative)
        }
    }

    fn trained_columns(&self) -> Option<&[String]> {
        Some(&self.columns)
    }
}

/// Named models loaded from a single model file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRegistry {
    pub models: HashMap<String, LinearModel>,
}

impl ModelRegistry {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let registry: ModelRegistry = serde_json::from_slice(&bytes)?;

        for (name, model) in &registry.models {
            model
                .validate()
                .map_err(|e| Error::InvalidModel(format!("{}: {}", name, e)))?;
        }

        info!(
            "Loaded {} model(s) from {}",
            registry.models.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, model: LinearModel) {
        self.models.insert(name.into(), model);
    }

    /// Sorted model names
    pub fn names(&self) -> Vec<&String> {
        let mut names: Vec<_> = self.models.keys().collect();
        names.sort();
        names
    }

    /// Remove and return the named model
    pub fn take(&mut self, name: &str) -> Result<LinearModel> {
        self.models
            .remove(name)
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))
    }
}
