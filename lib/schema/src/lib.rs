//! # LoanX Schema
//!
//! Input normalization and feature alignment for a pre-trained classifier.
//!
//! ## Overview
//!
//! A request arrives as a loose mapping of field names to strings. Any key may
//! be missing, blank or malformed. The classifier, on the other hand, wants a
//! positional vector in exactly the column order it was trained on. This crate
//! bridges the two:
//!
//! 1. [`FieldNormalizer`] resolves every declared field to a typed value,
//!    falling back to the field default and recording a warning on bad input
//! 2. [`FeatureEncoder`] one-hot encodes categorical fields (dropping the
//!    reference category) and reindexes onto the schema columns with zero fill
//!
//! ## Schema Definition
//!
//! ```rust
//! use loanx_schema::{FeatureSchema, FieldSpec};
//!
//! let schema = FeatureSchema::new(
//!     vec![
//!         FieldSpec::numeric("income", 5000.0),
//!         // default "Semiurban", reference (no column) "Rural"
//!         FieldSpec::categorical("area", "Semiurban", "Rural"),
//!     ],
//!     vec![
//!         "income".to_string(),
//!         "area_Semiurban".to_string(),
//!         "area_Urban".to_string(),
//!     ],
//! );
//! schema.validate().unwrap();
//! ```
//!
//! ## Encoding Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Raw input  │────>│ Normalizer  │────>│   Encoder   │────>│ Classifier  │
//! │ (strings)   │     │ (typed)     │     │ (aligned)   │     │ (label)     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```

pub mod schema;
pub mod normalizer;
pub mod encoder;
pub mod explain;
pub mod loan;

// Re-export main types
pub use schema::{
    FeatureSchema,
    FieldSpec,
    FieldKind,
    FieldValue,
    SchemaError,
    indicator_column,
};
pub use normalizer::{FieldNormalizer, TypedInput, CoercionWarning, Normalized, RawInput};
pub use encoder::{FeatureEncoder, EncodeError};
pub use explain::{ColumnValue, ExplainedFeatures, PredictionResponse};
pub use loan::{loan_schema, LOAN_COLUMNS};
