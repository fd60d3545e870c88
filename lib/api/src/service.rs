//! Request pipeline: raw fields → typed input → aligned vector → label

use loanx_core::{Classifier, Decision, Label};
use loanx_schema::{
    CoercionWarning, EncodeError, ExplainedFeatures, FeatureEncoder, FeatureSchema,
    FieldNormalizer, RawInput,
};
use std::sync::Arc;
use tracing::{error, info};

/// Shown when the server runs without a classifier
pub const MODEL_MISSING_MESSAGE: &str = "Error: Model failed to load in memory.";

/// Outcome of a successful prediction
#[derive(Debug, Clone)]
pub struct Prediction {
    pub label: Label,
    pub explained: ExplainedFeatures,
    pub warnings: Vec<CoercionWarning>,
}

impl Prediction {
    pub fn decision(&self) -> Decision {
        Decision::from_label(self.label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Classifier failed: {0}")]
    Model(#[from] loanx_core::Error),
}

impl PredictError {
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::Encode(e) => e.kind(),
            PredictError::Model(e) => e.kind(),
        }
    }

    /// Generic message for end users; names only the error kind
    pub fn user_message(&self) -> String {
        format!(
            "Prediction System Error: An unexpected error occurred. Details: {}",
            self.kind()
        )
    }
}

/// Normalizer, encoder and classifier bound to one schema
#[derive(Clone)]
pub struct Predictor {
    normalizer: FieldNormalizer,
    encoder: FeatureEncoder,
    classifier: Arc<dyn Classifier>,
}

impl Predictor {
    pub fn new(schema: Arc<FeatureSchema>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            normalizer: FieldNormalizer::new(schema.clone()),
            encoder: FeatureEncoder::new(schema),
            classifier,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.encoder.schema()
    }

    pub fn predict<R: RawInput + ?Sized>(&self, raw: &R) -> Result<Prediction, PredictError> {
        let normalized = self.normalizer.normalize(raw);
        let explained = self.encoder.explain(&normalized.input).map_err(|e| {
            error!("Encoding failed: {}", e);
            e
        })?;
        let label = self.classifier.predict(&explained.vector).map_err(|e| {
            error!("Classifier failed: {}", e);
            e
        })?;

        info!(
            label = label.as_u8(),
            warnings = normalized.warnings.len(),
            "Prediction complete"
        );

        Ok(Prediction {
            label,
            explained,
            warnings: normalized.warnings,
        })
    }
}

/// Shared state for the HTTP layer
pub struct AppState {
    pub schema: Arc<FeatureSchema>,
    pub predictor: Option<Predictor>,
}

impl AppState {
    pub fn new(schema: Arc<FeatureSchema>, classifier: Option<Arc<dyn Classifier>>) -> Self {
        let predictor = classifier.map(|c| Predictor::new(schema.clone(), c));
        Self { schema, predictor }
    }

    pub fn model_loaded(&self) -> bool {
        self.predictor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanx_core::{FeatureVector, Result as CoreResult};
    use loanx_schema::loan_schema;
    use std::collections::HashMap;

    /// Approves when Credit_History is set
    struct CreditHistory;

    impl Classifier for CreditHistory {
        fn predict(&self, features: &FeatureVector) -> CoreResult<Label> {
            match features.get(4) {
                Some(v) if v >= 1.0 => Ok(Label::Positive),
                _ => Ok(Label::Negative),
            }
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn predict(&self, features: &FeatureVector) -> CoreResult<Label> {
            Err(loanx_core::Error::InvalidDimension {
                expected: 3,
                actual: features.dim(),
            })
        }
    }

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_predict_decision() {
        let predictor = Predictor::new(Arc::new(loan_schema()), Arc::new(CreditHistory));

        let approved = predictor.predict(&raw(&[("Credit_History", "1")])).unwrap();
        assert_eq!(approved.decision(), Decision::Approved);

        let rejected = predictor.predict(&raw(&[("Credit_History", "0")])).unwrap();
        assert_eq!(rejected.decision(), Decision::Rejected);
        assert_eq!(rejected.explained.value("Credit_History"), Some(0.0));
    }

    #[test]
    fn test_predict_carries_warnings() {
        let predictor = Predictor::new(Arc::new(loan_schema()), Arc::new(CreditHistory));
        let prediction = predictor.predict(&raw(&[("LoanAmount", "lots")])).unwrap();

        assert_eq!(prediction.warnings.len(), 1);
        assert_eq!(prediction.warnings[0].field, "LoanAmount");
        assert_eq!(prediction.explained.value("LoanAmount"), Some(146.4));
    }

    #[test]
    fn test_classifier_failure_is_generic() {
        let predictor = Predictor::new(Arc::new(loan_schema()), Arc::new(Broken));
        let err = predictor.predict(&raw(&[])).unwrap_err();

        assert_eq!(err.kind(), "InvalidDimension");
        assert_eq!(
            err.user_message(),
            "Prediction System Error: An unexpected error occurred. Details: InvalidDimension"
        );
    }

    #[test]
    fn test_app_state_without_model() {
        let state = AppState::new(Arc::new(loan_schema()), None);
        assert!(!state.model_loaded());
    }
}
