//! Field normalization
//!
//! Turns a loosely-typed request (field name to raw string) into a
//! [`TypedInput`] holding exactly one value of the declared kind for every
//! field in the schema. Missing, blank and malformed values fall back to the
//! field default; malformed ones also produce a [`CoercionWarning`].

use crate::schema::{FeatureSchema, FieldKind, FieldSpec, FieldValue};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use tracing::warn;

/// Source of raw, untyped field values
pub trait RawInput {
    fn raw(&self, key: &str) -> Option<&str>;
}

impl<K, V, S> RawInput for HashMap<K, V, S>
where
    K: Borrow<str> + Eq + Hash,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn raw(&self, key: &str) -> Option<&str> {
        self.get(key).map(AsRef::as_ref)
    }
}

impl<K, V> RawInput for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn raw(&self, key: &str) -> Option<&str> {
        self.get(key).map(AsRef::as_ref)
    }
}

/// One typed value per declared field
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct TypedInput {
    values: BTreeMap<String, FieldValue>,
}

impl TypedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A raw value rejected during coercion
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoercionWarning {
    pub field: String,
    pub raw: String,
    pub kind: FieldKind,
}

impl std::fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not convert input '{}': '{}' to {}, using default",
            self.field, self.raw, self.kind
        )
    }
}

/// Result of normalizing one request
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub input: TypedInput,
    pub warnings: Vec<CoercionWarning>,
}

/// Resolves raw request fields to typed values using the schema defaults
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    schema: Arc<FeatureSchema>,
}

impl FieldNormalizer {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Normalize a raw request. Never fails.
    pub fn normalize<R: RawInput + ?Sized>(&self, raw: &R) -> Normalized {
        let mut input = TypedInput::new();
        let mut warnings = Vec::new();

        for field in &self.schema.fields {
            let value = match lookup(raw, field) {
                None => field.default.clone(),
                Some(text) => match coerce(field, text) {
                    Some(value) => value,
                    None => {
                        warn!(
                            field = %field.name,
                            raw = %text,
                            kind = %field.kind,
                            "Could not convert input, using default"
                        );
                        warnings.push(CoercionWarning {
                            field: field.name.clone(),
                            raw: text.to_string(),
                            kind: field.kind,
                        });
                        field.default.clone()
                    }
                },
            };
            input.insert(field.name.clone(), value);
        }

        Normalized { input, warnings }
    }
}

/// First non-blank raw value under the field's keys, untouched
fn lookup<'a, R: RawInput + ?Sized>(raw: &'a R, field: &FieldSpec) -> Option<&'a str> {
    field
        .keys()
        .filter_map(|key| raw.raw(key))
        .find(|value| !value.trim().is_empty())
}

fn coerce(field: &FieldSpec, text: &str) -> Option<FieldValue> {
    match field.kind {
        FieldKind::Categorical => {
            let category = field
                .value_aliases
                .get(text)
                .map(String::as_str)
                .unwrap_or(text);
            Some(FieldValue::Category(category.to_string()))
        }
        // Surrounding whitespace is only tolerated for numbers
        FieldKind::Numeric => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FieldValue::Number),
    }
}
