//! Ports layer: Trait definitions for the model artifacts.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the prediction pipeline and the concrete artifact formats.

mod classifier;
mod scaler;

pub use classifier::{check_width, Classifier, ModelError};
pub use scaler::FeatureScaler;
