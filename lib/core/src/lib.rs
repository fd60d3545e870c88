//! # LoanX Core
//!
//! Core library for the LoanX decision service.
//!
//! This crate provides the types shared by the encoding engine and the HTTP
//! shell:
//!
//! - [`FeatureVector`] - Ordered, positional model input
//! - [`Classifier`] - Contract for a trained model: vector in, [`Label`] out
//! - [`Decision`] - User-facing outcome derived from a label
//! - [`ModelRegistry`] / [`LinearModel`] - File-backed trained models
//!
//! ## Example
//!
//! ```rust
//! use loanx_core::{Classifier, Decision, FeatureVector, LinearModel};
//!
//! let model = LinearModel::new(
//!     vec!["Credit_History".to_string()],
//!     vec![3.0],
//!     -1.0,
//! ).unwrap();
//!
//! let label = model.predict(&FeatureVector::new(vec![1.0])).unwrap();
//! assert_eq!(Decision::from_label(label), Decision::Approved);
//! ```

pub mod classifier;
pub mod error;
pub mod model;
pub mod vector;

pub use classifier::{Classifier, Decision, Label};
pub use error::{Error, Result};
pub use model::{LinearModel, ModelRegistry};
pub use vector::FeatureVector;
