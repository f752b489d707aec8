//! Adapters layer: concrete implementations of ports.
//!
//! - `sklearn`: JSON exports of fitted scikit-learn estimators
//! - `loader`: cached artifact loading and integrity checks
//! - `sanitize`: clinical value and secret filtering for logs

pub mod loader;
pub mod sanitize;
pub mod sklearn;

pub use loader::{ArtifactError, ArtifactLoader, IntegrityPolicy, ModelContext};
