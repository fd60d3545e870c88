//! Feature encoding and alignment
//!
//! Converts a [`TypedInput`] into the positional [`FeatureVector`] the
//! classifier expects:
//!
//! 1. Numeric fields map to a column of the same name
//! 2. Categorical fields emit `<field>_<value>` = 1, unless the value is the
//!    field's reference category
//! 3. The sparse result is projected onto the schema columns, with zero for
//!    every column not produced and silent drop of every column not expected
//!
//! Step 3 is what keeps the vector aligned no matter which categories a
//! request carries. A wrong column list does not fail here, it predicts wrong.

use crate::explain::{ColumnValue, ExplainedFeatures};
use crate::normalizer::TypedInput;
use crate::schema::{indicator_column, FeatureSchema, FieldKind};
use ahash::AHashMap;
use loanx_core::FeatureVector;
use std::sync::Arc;
use tracing::debug;

/// Schema-driven one-hot encoder with column alignment
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: Arc<FeatureSchema>,
    column_index: AHashMap<String, usize>,
}

impl FeatureEncoder {
    /// Create a new encoder for the given schema
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        let column_index = schema
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            schema,
            column_index,
        }
    }

    /// Get a reference to the schema
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Output vector dimension
    pub fn vector_dim(&self) -> usize {
        self.schema.columns.len()
    }

    /// Encode a typed input into a vector aligned with the schema columns
    pub fn encode(&self, input: &TypedInput) -> Result<FeatureVector, EncodeError> {
        let sparse = self.expand(input)?;
        let (vector, _) = self.project(&sparse);
        Ok(vector)
    }

    /// Encode and keep the column names and any dropped indicator columns
    pub fn explain(&self, input: &TypedInput) -> Result<ExplainedFeatures, EncodeError> {
        let sparse = self.expand(input)?;
        let (vector, dropped) = self.project(&sparse);

        let features = self
            .schema
            .columns
            .iter()
            .zip(vector.as_slice())
            .map(|(column, value)| ColumnValue {
                column: column.clone(),
                value: *value,
            })
            .collect();

        Ok(ExplainedFeatures::new(vector, features, dropped))
    }

    /// Steps 1 and 2: the sparse column set produced by the input alone
    fn expand(&self, input: &TypedInput) -> Result<AHashMap<String, f64>, EncodeError> {
        let mut sparse = AHashMap::with_capacity(self.schema.fields.len());

        for field in &self.schema.fields {
            let value = input
                .get(&field.name)
                .ok_or_else(|| EncodeError::MissingField(field.name.clone()))?;

            let mismatch = || EncodeError::KindMismatch {
                field: field.name.clone(),
                expected: field.kind,
            };

            match field.kind {
                FieldKind::Numeric => {
                    let n = value.as_number().ok_or_else(mismatch)?;
                    sparse.insert(field.name.clone(), n);
                }
                FieldKind::Categorical => {
                    let category = value.as_category().ok_or_else(mismatch)?;
                    if field.reference.as_deref() != Some(category) {
                        sparse.insert(indicator_column(&field.name, category), 1.0);
                    }
                }
            }
        }

        Ok(sparse)
    }

    /// Steps 3 and 4: reindex onto the schema columns with zero fill
    fn project(&self, sparse: &AHashMap<String, f64>) -> (FeatureVector, Vec<String>) {
        let mut vector = FeatureVector::zeros(self.vector_dim());
        let mut dropped = Vec::new();

        for (column, value) in sparse {
            match self.column_index.get(column) {
                Some(&i) => vector.as_mut_slice()[i] = *value,
                None => dropped.push(column.clone()),
            }
        }

        if !dropped.is_empty() {
            dropped.sort();
            debug!(?dropped, "Dropping columns not in schema");
        }

        (vector, dropped)
    }
}

/// Typed input that violates its own invariant
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("Field '{0}' missing from typed input")]
    MissingField(String),

    #[error("Field '{field}' does not hold a {expected} value")]
    KindMismatch { field: String, expected: FieldKind },
}

impl EncodeError {
    /// Short, stable name of the error kind, safe to show to end users
    pub fn kind(&self) -> &'static str {
        match self {
            EncodeError::MissingField(_) => "MissingField",
            EncodeError::KindMismatch { .. } => "KindMismatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::FieldNormalizer;
    use crate::schema::{FieldSpec, FieldValue};
    use std::collections::HashMap;

    fn create_test_schema() -> Arc<FeatureSchema> {
        Arc::new(FeatureSchema::new(
            vec![
                FieldSpec::numeric("income", 5000.0),
                FieldSpec::categorical("area", "Semiurban", "Rural"),
                FieldSpec::categorical("gender", "Male", "Female"),
            ],
            vec![
                "income".to_string(),
                "gender_Male".to_string(),
                "area_Semiurban".to_string(),
                "area_Urban".to_string(),
            ],
        ))
    }

    fn typed(income: f64, area: &str, gender: &str) -> TypedInput {
        let mut input = TypedInput::new();
        input.insert("income", FieldValue::Number(income));
        input.insert("area", FieldValue::Category(area.to_string()));
        input.insert("gender", FieldValue::Category(gender.to_string()));
        input
    }

    #[test]
    fn test_encoder_creation() {
        let encoder = FeatureEncoder::new(create_test_schema());
        assert_eq!(encoder.vector_dim(), 4);
    }

    #[test]
    fn test_encode_follows_schema_order() {
        let encoder = FeatureEncoder::new(create_test_schema());
        let v = encoder.encode(&typed(5400.0, "Urban", "Male")).unwrap();
        assert_eq!(v.as_slice(), &[5400.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_reference_category_zeroes_indicators() {
        let encoder = FeatureEncoder::new(create_test_schema());
        let v = encoder.encode(&typed(1.0, "Rural", "Female")).unwrap();
        assert_eq!(v.as_slice(), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_dropped() {
        let encoder = FeatureEncoder::new(create_test_schema());
        let explained = encoder.explain(&typed(1.0, "Lunar", "Male")).unwrap();

        assert_eq!(explained.vector.as_slice(), &[1.0, 1.0, 0.0, 0.0]);
        assert_eq!(explained.dropped, vec!["area_Lunar".to_string()]);
    }

    #[test]
    fn test_explain_names_columns() {
        let encoder = FeatureEncoder::new(create_test_schema());
        let explained = encoder.explain(&typed(2.0, "Semiurban", "Male")).unwrap();

        let names: Vec<_> = explained.features.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["income", "gender_Male", "area_Semiurban", "area_Urban"]);
        assert_eq!(explained.value("area_Semiurban"), Some(1.0));
        assert!(explained.dropped.is_empty());
    }

    #[test]
    fn test_same_input_same_vector() {
        let encoder = FeatureEncoder::new(create_test_schema());
        let input = typed(7.5, "Urban", "Female");
        assert_eq!(encoder.encode(&input).unwrap(), encoder.encode(&input).unwrap());
    }

    #[test]
    fn test_missing_field_is_error() {
        let encoder = FeatureEncoder::new(create_test_schema());
        let mut input = TypedInput::new();
        input.insert("income", FieldValue::Number(1.0));

        let err = encoder.encode(&input).unwrap_err();
        assert_eq!(err, EncodeError::MissingField("area".to_string()));
        assert_eq!(err.kind(), "MissingField");
    }

    #[test]
    fn test_kind_mismatch_is_error() {
        let encoder = FeatureEncoder::new(create_test_schema());
        let mut input = typed(1.0, "Urban", "Male");
        input.insert("income", FieldValue::Category("lots".to_string()));

        assert_eq!(
            encoder.encode(&input).unwrap_err(),
            EncodeError::KindMismatch {
                field: "income".to_string(),
                expected: FieldKind::Numeric,
            }
        );
    }

    #[test]
    fn test_normalize_then_encode_defaults() {
        let schema = create_test_schema();
        let normalizer = FieldNormalizer::new(schema.clone());
        let encoder = FeatureEncoder::new(schema);

        let raw: HashMap<String, String> = HashMap::new();
        let v = encoder.encode(&normalizer.normalize(&raw).input).unwrap();
        assert_eq!(v.as_slice(), &[5000.0, 1.0, 1.0, 0.0]);
    }
}
