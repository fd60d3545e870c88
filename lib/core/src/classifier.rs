//! The classifier contract
//!
//! A classifier is an opaque, read-only capability: given a feature vector in
//! the column order it was trained on, return a label from a closed set.

use crate::error::{Error, Result};
use crate::vector::FeatureVector;
use serde::{Deserialize, Serialize};

/// Binary class label produced by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "i64")]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(Error::UnsupportedLabel(other)),
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

/// Loan decision derived from a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Label 1 approves; anything else rejects
    pub fn from_label(label: Label) -> Self {
        match label {
            Label::Positive => Decision::Approved,
            Label::Negative => Decision::Rejected,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Decision::Approved => "✅ Loan Approved!",
            Decision::Rejected => "❌ Loan Rejected.",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A trained model that maps a positional feature vector to a label.
///
/// Implementations must be reentrant: `predict` takes `&self` and the same
/// instance is shared across concurrent requests.
pub trait Classifier: Send + Sync {
    /// Predict the label for a single feature vector
    fn predict(&self, features: &FeatureVector) -> Result<Label>;

    /// Column order the model was trained on, if the model knows it
    fn trained_columns(&self) -> Option<&[String]> {
        None
    }

    /// Check a schema's column order against the trained column order.
    ///
    /// Models that do not record their columns are accepted as-is.
    fn check_columns(&self, columns: &[String]) -> Result<()> {
        let Some(trained) = self.trained_columns() else {
            return Ok(());
        };

        if trained.len() != columns.len() {
            return Err(Error::InvalidDimension {
                expected: trained.len(),
                actual: columns.len(),
            });
        }

        for (index, (expected, actual)) in trained.iter().zip(columns).enumerate() {
            if expected != actual {
                return Err(Error::SchemaMismatch {
                    index,
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }

        Ok(())
    }
}
