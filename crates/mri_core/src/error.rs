use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a usable classifier. Disables inference for the
/// lifetime of the `AppContext` that recorded it.
#[derive(Debug, Clone, Error)]
pub enum ModelLoadError {
    #[error("model file is missing: {}", .path.display())]
    Missing { path: PathBuf },
    #[error("could not load model {}: {msg}", .path.display())]
    Runtime { path: PathBuf, msg: String },
    #[error("no inference backend compiled in (enable the `ort` feature)")]
    BackendDisabled,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("classifier failed: {0}")]
    Runtime(String),
    #[error("classifier returned {got} scores, expected {expected}")]
    OutputShape { expected: usize, got: usize },
}

/// Per-request failure as seen by the presentation layer.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Please upload an MRI scan image")]
    NoUpload,
    #[error("Model not loaded - cannot make predictions")]
    ModelUnavailable(#[source] ModelLoadError),
    #[error("Error during prediction: {0}")]
    Inference(#[from] InferenceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
