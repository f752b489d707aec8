//! # HeartCheck
//!
//! Heart-disease risk screening from an eleven-question clinical form.
//!
//! This crate provides:
//! - Typed patient answers and the fixed 18-column feature transform
//! - Cached loading of a pretrained classifier and its standardization scaler
//! - Scaling and prediction with probability invariant checks
//! - A terminal UI for entering answers and reading the result
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (patient answers, feature vector, prediction)
//! - `ports`: Trait definitions for the classifier and scaler
//! - `adapters`: Concrete implementations (scikit-learn JSON exports, loader)
//! - `application`: The assessment use case
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use adapters::{ArtifactError, ArtifactLoader, ModelContext};
pub use application::AssessmentService;
pub use config::AppConfig;
pub use domain::{Assessment, FeatureVector, PatientInput, PredictionResult, RiskLabel};

/// Result type for HeartCheck operations
pub type Result<T> = std::result::Result<T, HeartCheckError>;

/// Main error type for HeartCheck
#[derive(Debug, thiserror::Error)]
pub enum HeartCheckError {
    #[error("Failed to load model artifacts: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Invalid answer: {0}")]
    Mapping(#[from] domain::MappingError),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Model error: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
