//! Dementia-stage triage for brain MRI scans.
//!
//! An [`AppContext`] owns the configuration and the classifier, which is
//! loaded once. Each [`Upload`] is either caught by the filename shortcut
//! or preprocessed into a `(1, 224, 224, 3)` tensor and classified into one
//! of four [`ClassLabel`]s.

pub mod classifier;
pub mod config;
pub mod error;
pub mod exercise;
pub mod labels;
pub mod lifecycle;
pub mod override_rule;
pub mod preprocess;
pub mod report;

pub use classifier::{Classify, Prediction, load_classifier, predict};
pub use config::{AppConfig, ClassifierConfig, DEFAULT_CONFIG_FILE, OutputKind};
pub use error::{ConfigError, InferenceError, ModelLoadError, RequestError};
pub use labels::ClassLabel;
pub use lifecycle::{AppContext, Diagnosis, RequestState, Source, Upload};
pub use report::{ScanOptions, ScanRow, collect_images, export_csv, triage};
