//! # LoanX
//!
//! Loan approval decisions from loosely-typed applicant input.
//!
//! LoanX takes a request of field names to raw strings, normalizes it against
//! a fixed schema, one-hot encodes the categorical fields and aligns the
//! result with the exact column order a trained classifier expects.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! loanx --model models/loan_models.json --model-name RandomForest --http-port 5000
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use loanx::prelude::*;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let schema = Arc::new(loan_schema());
//! let normalizer = FieldNormalizer::new(schema.clone());
//! let encoder = FeatureEncoder::new(schema);
//!
//! let raw = HashMap::from([
//!     ("Credit_History", "1"),
//!     ("Property_Area", "Urban"),
//!     ("ApplicantIncome", "5400"),
//! ]);
//! let typed = normalizer.normalize(&raw).input;
//! let vector = encoder.encode(&typed).unwrap();
//! assert_eq!(vector.dim(), LOAN_COLUMNS.len());
//! ```
//!
//! ## Crate Structure
//!
//! - `loanx-core` - Feature vectors, labels, the classifier contract, model files
//! - `loanx-schema` - Field schema, normalizer, encoder, explanations
//! - `loanx-api` - REST API and HTML form

// Re-export core types
pub use loanx_core::{
    Classifier, Decision, Label,
    FeatureVector,
    LinearModel, ModelRegistry,
    Error, Result,
};

// Re-export schema
pub use loanx_schema::{
    FeatureSchema, FieldSpec, FieldKind, FieldValue, SchemaError,
    FieldNormalizer, TypedInput, CoercionWarning, Normalized, RawInput,
    FeatureEncoder, EncodeError, ExplainedFeatures,
    loan_schema, LOAN_COLUMNS,
};

// Re-export API
pub use loanx_api::{AppState, Predictor, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Classifier, Decision, Label,
        FeatureVector,
        LinearModel, ModelRegistry,
        FeatureSchema, FieldSpec, FieldKind, FieldValue,
        FieldNormalizer, TypedInput, FeatureEncoder,
        loan_schema, LOAN_COLUMNS,
        AppState, Predictor, RestApi,
    };
}
