//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Health data input form
//! - Glossary of health terms
//! - Prediction result with clinical recommendation

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
