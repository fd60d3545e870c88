//! Explainability for encoded features
//!
//! Output structures that pair each vector position with its column name,
//! so callers can see exactly what the classifier was given.

use crate::normalizer::CoercionWarning;
use loanx_core::{Decision, FeatureVector, Label};
use serde::Serialize;

/// A single named column of an encoded vector
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnValue {
    pub column: String,
    pub value: f64,
}

/// Encoded vector with its column names and the columns that were dropped
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExplainedFeatures {
    /// Positional vector handed to the classifier
    #[serde(skip)]
    pub vector: FeatureVector,
    /// Same values as `vector`, in schema order, with names
    pub features: Vec<ColumnValue>,
    /// Columns the input produced but the schema does not list
    pub dropped: Vec<String>,
}

impl ExplainedFeatures {
    pub fn new(vector: FeatureVector, features: Vec<ColumnValue>, dropped: Vec<String>) -> Self {
        Self {
            vector,
            features,
            dropped,
        }
    }

    /// Value of a named column
    pub fn value(&self, column: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.value)
    }

    /// Columns with a non-zero value
    pub fn active_columns(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|c| c.value != 0.0)
            .map(|c| c.column.as_str())
            .collect()
    }
}

/// Response structure for the JSON prediction endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    /// Formatted decision message
    pub prediction: String,
    pub label: u8,
    pub features: Vec<ColumnValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,
    pub warnings: Vec<CoercionWarning>,
}

impl PredictionResponse {
    pub fn new(label: Label, explained: ExplainedFeatures, warnings: Vec<CoercionWarning>) -> Self {
        Self {
            prediction: Decision::from_label(label).message().to_string(),
            label: label.as_u8(),
            features: explained.features,
            dropped: explained.dropped,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    fn create_test_explained() -> ExplainedFeatures {
        ExplainedFeatures::new(
            FeatureVector::new(vec![5400.0, 0.0, 1.0]),
            vec![
                ColumnValue { column: "income".to_string(), value: 5400.0 },
                ColumnValue { column: "area_Semiurban".to_string(), value: 0.0 },
                ColumnValue { column: "area_Urban".to_string(), value: 1.0 },
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_value_lookup() {
        let explained = create_test_explained();
        assert_eq!(explained.value("area_Urban"), Some(1.0));
        assert_eq!(explained.value("absent"), None);
        assert_eq!(explained.active_columns(), vec!["income", "area_Urban"]);
    }

    #[test]
    fn test_response_serialization() {
        let warnings = vec![CoercionWarning {
            field: "income".to_string(),
            raw: "abc".to_string(),
            kind: FieldKind::Numeric,
        }];
        let response = PredictionResponse::new(Label::Positive, create_test_explained(), warnings);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["prediction"], "✅ Loan Approved!");
        assert_eq!(json["label"], 1);
        assert_eq!(json["features"][2]["column"], "area_Urban");
        assert_eq!(json["warnings"][0]["kind"], "numeric");
        assert!(json.get("dropped").is_none());
    }
}
