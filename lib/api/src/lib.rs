//! # LoanX API
//!
//! HTTP shell around the encoding engine. The classifier is handed in once at
//! startup through [`AppState`] and shared read-only by every worker.

pub mod rest;
pub mod service;

pub use rest::RestApi;
pub use service::{AppState, PredictError, Prediction, Predictor, MODEL_MISSING_MESSAGE};
