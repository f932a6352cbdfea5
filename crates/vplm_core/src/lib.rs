//! # vplm_core - pyVPLM session persistence
//!
//! This library stores and restores the complete working state of the pyVPLM
//! dimensional analysis / regression workbench in a single text file.
//!
//! ## Features
//! - Typed session model (`SessionState`) instead of a positional tuple
//! - Text format of 18 `---` sections, `+++` groups and `|||` records; files
//!   written with `ArrayLayout::Legacy` stay readable by the Python tool, the
//!   default `ArrayLayout::Shaped` writes `shape R C` DOE headers it cannot read
//! - Non-clobbering file allocation (`name(1).txt`, `name(1)(1).txt`, ...)
//! - Regression model export as a standalone Python function

pub mod config;
pub mod doe;
pub mod error;
pub mod export;
pub mod parameter;
pub mod pi;
pub mod regression;
pub mod result;
pub mod save;
pub mod session;

pub use config::{ArrayLayout, SaveConfig};
pub use doe::{DoeBundle, DoeConstraints, DoeKind, DoeParams, DoeScale};
pub use error::{ModelError, Result};
pub use export::{export_model_function, ModelExport};
pub use parameter::{Bounds, Parameter, ParameterRecord, ParameterSet, Role};
pub use pi::{AutoCandidateRow, PiListTriple, PiSetTriple, Tab2State};
pub use regression::{
    ErrorCurves, ErrorMetrics, ModelCollection, RegressionModel, RegressionTabState, SeriesPair,
};
pub use result::{DependencyState, ImportedResult};
pub use save::{SaveError, SessionStore};
pub use session::SessionState;
