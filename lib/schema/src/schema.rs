//! Feature schema definitions
//!
//! Defines the closed set of input fields (kind, default, reference category)
//! and the ordered list of columns the classifier was trained on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Feature schema for input normalization and column alignment
///
/// `fields` describes what a request may carry; `columns` is the exact,
/// ordered list of model inputs. Both are fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSchema {
    /// Schema version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Input fields in declaration order
    pub fields: Vec<FieldSpec>,

    /// Output columns in the order the classifier consumes them
    pub columns: Vec<String>,
}

fn default_version() -> u32 {
    1
}

impl FeatureSchema {
    pub fn new(fields: Vec<FieldSpec>, columns: Vec<String>) -> Self {
        Self {
            version: 1,
            fields,
            columns,
        }
    }

    /// Load a schema from a JSON file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let bytes = std::fs::read(path)?;
        let schema: FeatureSchema =
            serde_json::from_slice(&bytes).map_err(|e| SchemaError::Parse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check that the fields and columns describe a consistent encoding
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::EmptyFields);
        }
        if self.columns.is_empty() {
            return Err(SchemaError::EmptyColumns);
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if field.default.kind() != field.kind {
                return Err(SchemaError::DefaultKindMismatch {
                    field: field.name.clone(),
                    expected: field.kind,
                });
            }
            for target in field.value_aliases.values() {
                if field.kind != FieldKind::Categorical || target.is_empty() {
                    return Err(SchemaError::InvalidAlias(field.name.clone()));
                }
            }
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }

        for field in self.categorical_fields() {
            let reference = match field.reference.as_deref() {
                Some(r) if !r.is_empty() => r,
                _ => return Err(SchemaError::MissingReference(field.name.clone())),
            };
            let column = indicator_column(&field.name, reference);
            if seen.contains(column.as_str()) {
                return Err(SchemaError::ReferenceColumnPresent {
                    field: field.name.clone(),
                    column,
                });
            }
        }

        for field in self.numeric_fields() {
            if let Some(owner) = self.categorical_owner(&field.name) {
                return Err(SchemaError::ColumnCollision {
                    numeric: field.name.clone(),
                    categorical: owner.name.clone(),
                });
            }
        }

        for column in &self.columns {
            if !self.is_producible(column) {
                return Err(SchemaError::OrphanColumn(column.clone()));
            }
        }

        Ok(())
    }

    /// Whether some field can ever emit a value for this column
    fn is_producible(&self, column: &str) -> bool {
        self.numeric_fields().any(|field| field.name == column)
            || self.categorical_owner(column).is_some()
    }

    /// Categorical field whose indicator columns include this name
    fn categorical_owner(&self, column: &str) -> Option<&FieldSpec> {
        self.categorical_fields().find(|field| {
            column
                .strip_prefix(field.name.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|value| !value.is_empty())
        })
    }

    /// Get a field spec by name
    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Numeric)
    }

    pub fn categorical_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Categorical)
    }

    /// Number of output columns
    pub fn dim(&self) -> usize {
        self.columns.len()
    }
}

/// Name of the indicator column for a categorical value
pub fn indicator_column(field: &str, value: &str) -> String {
    format!("{}_{}", field, value)
}

/// Configuration for a single input field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Used when the raw value is missing, blank, or fails coercion
    pub default: FieldValue,

    /// Category that produces no indicator column (categorical only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Alternative raw keys, tried in order when `name` is absent
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Raw codes mapped onto canonical categories (categorical only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value_aliases: BTreeMap<String, String>,
}

impl FieldSpec {
    /// Create a numeric field
    pub fn numeric(name: impl Into<String>, default: f64) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Numeric,
            default: FieldValue::Number(default),
            reference: None,
            aliases: Vec::new(),
            value_aliases: BTreeMap::new(),
        }
    }

    /// Create a categorical field
    ///
    /// `reference` is the category dropped by one-hot encoding at training
    /// time; it must match what the classifier was actually trained with.
    pub fn categorical(
        name: impl Into<String>,
        default: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Categorical,
            default: FieldValue::Category(default.into()),
            reference: Some(reference.into()),
            aliases: Vec::new(),
            value_aliases: BTreeMap::new(),
        }
    }

    pub fn with_alias(mut self, key: impl Into<String>) -> Self {
        self.aliases.push(key.into());
        self
    }

    pub fn with_value_alias(mut self, raw: impl Into<String>, category: impl Into<String>) -> Self {
        self.value_aliases.insert(raw.into(), category.into());
        self
    }

    /// Raw keys to look up, canonical name first
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Field kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Floating-point value carried into a column of the same name
    Numeric,
    /// String value expanded into `<field>_<value>` indicator columns
    Categorical,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Numeric => f.write_str("numeric"),
            FieldKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// A typed field value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Number(_) => FieldKind::Numeric,
            FieldValue::Category(_) => FieldKind::Categorical,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FieldValue::Category(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

/// Errors that can occur during schema validation
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema must declare at least one field")]
    EmptyFields,

    #[error("Schema must declare at least one column")]
    EmptyColumns,

    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("Column '{0}' is listed more than once")]
    DuplicateColumn(String),

    #[error("Default for field '{field}' is not {expected}")]
    DefaultKindMismatch { field: String, expected: FieldKind },

    #[error("Categorical field '{0}' has no reference category")]
    MissingReference(String),

    #[error("Column '{column}' encodes the reference category of field '{field}'")]
    ReferenceColumnPresent { field: String, column: String },

    #[error("Numeric field '{numeric}' collides with an indicator column of '{categorical}'")]
    ColumnCollision { numeric: String, categorical: String },

    #[error("Column '{0}' cannot be produced by any field")]
    OrphanColumn(String),

    #[error("Field '{0}' has invalid value aliases")]
    InvalidAlias(String),

    #[error("Failed to parse schema: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
