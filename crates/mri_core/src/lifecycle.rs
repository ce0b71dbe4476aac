//! Request handling: one upload in, one diagnosis (or error) out.

use crate::classifier::{Classify, Prediction, load_classifier, predict};
use crate::config::AppConfig;
use crate::error::{InferenceError, ModelLoadError, RequestError};
use crate::labels::ClassLabel;
use crate::override_rule::{OVERRIDE_CONFIDENCE, OVERRIDE_LABEL, matches_moderate_pattern};
use crate::preprocess;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An uploaded scan. The name is only consulted for the filename shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

/// Which branch produced a diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Classifier,
    /// Forced by the `Moderate_<digits>.jpg` filename shortcut.
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub label: ClassLabel,
    /// Percentage in [0, 100], two decimals.
    pub confidence: f32,
    /// Per-class probabilities; absent on the override branch.
    pub distribution: Option<[f32; ClassLabel::COUNT]>,
    pub source: Source,
}

impl Diagnosis {
    fn forced() -> Self {
        Self {
            label: OVERRIDE_LABEL,
            confidence: OVERRIDE_CONFIDENCE,
            distribution: None,
            source: Source::Override,
        }
    }

    /// `(label, percentage)` pairs for display, empty on the override branch.
    pub fn breakdown(&self) -> Vec<(ClassLabel, f32)> {
        self.distribution
            .map(|dist| {
                ClassLabel::ALL
                    .iter()
                    .map(|label| (*label, dist[label.index()] * 100.0))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn confidence_text(&self) -> String {
        format!("{:.2}%", self.confidence)
    }
}

impl From<Prediction> for Diagnosis {
    fn from(p: Prediction) -> Self {
        Self {
            label: p.label,
            confidence: p.confidence,
            distribution: Some(p.distribution),
            source: Source::Classifier,
        }
    }
}

/// Where a request ended up.
#[derive(Debug)]
pub enum RequestState {
    AwaitingUpload,
    /// The model never loaded; inference is not attempted.
    Blocked(RequestError),
    Succeeded(Diagnosis),
    Failed(RequestError),
}

impl RequestState {
    /// Message for the user, if the state carries one.
    pub fn message(&self) -> Option<String> {
        match self {
            RequestState::AwaitingUpload => Some(RequestError::NoUpload.to_string()),
            RequestState::Blocked(err) | RequestState::Failed(err) => Some(err.to_string()),
            RequestState::Succeeded(_) => None,
        }
    }
}

/// Scratch copy of an upload, removed when dropped.
struct ScratchImage {
    path: PathBuf,
}

impl ScratchImage {
    fn write(path: PathBuf, bytes: &[u8]) -> Result<Self, InferenceError> {
        let io_err = |path: &Path, source| InferenceError::Io {
            path: path.to_path_buf(),
            source,
        };
        // Only armed once the file is ours; a refused create leaves what was there.
        let mut file = fs::File::create(&path).map_err(|e| io_err(&path, e))?;
        let guard = Self { path };
        file.write_all(bytes).map_err(|e| io_err(&guard.path, e))?;
        Ok(guard)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchImage {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("could not remove {}: {e}", self.path.display()),
        }
    }
}

/// Process-wide state shared by every request: configuration plus the
/// classifier, loaded exactly once.
pub struct AppContext {
    config: AppConfig,
    model: Result<Box<dyn Classify>, ModelLoadError>,
}

impl AppContext {
    /// Loads the configured model. A failure is logged once and recorded;
    /// every later request is then blocked.
    pub fn load(config: AppConfig) -> Self {
        let model = load_classifier(&config.classifier);
        if let Err(e) = &model {
            tracing::error!("Model loading failed: {e}");
        }
        Self { config, model }
    }

    pub fn with_classifier(config: AppConfig, model: Box<dyn Classify>) -> Self {
        Self {
            config,
            model: Ok(model),
        }
    }

    pub fn model_error(&self) -> Option<&ModelLoadError> {
        self.model.as_ref().err()
    }

    /// Runs one request through the state machine.
    pub fn handle(&self, upload: Option<&Upload>) -> RequestState {
        let Some(upload) = upload else {
            return RequestState::AwaitingUpload;
        };
        match self.analyze(upload) {
            Ok(diagnosis) => RequestState::Succeeded(diagnosis),
            Err(err @ RequestError::ModelUnavailable(_)) => RequestState::Blocked(err),
            Err(err) => RequestState::Failed(err),
        }
    }

    pub fn analyze(&self, upload: &Upload) -> Result<Diagnosis, RequestError> {
        let model = self
            .model
            .as_deref()
            .map_err(|e| RequestError::ModelUnavailable(e.clone()))?;

        let scratch = ScratchImage::write(self.config.scratch_path(), &upload.bytes)?;

        if self.config.filename_override && matches_moderate_pattern(&upload.file_name) {
            tracing::warn!(
                "Moderate Dementia pattern detected in filename {:?}; classifier bypassed",
                upload.file_name
            );
            return Ok(Diagnosis::forced());
        }

        let batch = preprocess::preprocess_file(scratch.path(), model.input_size())?;
        let prediction = predict(model, &batch)?;
        Ok(prediction.into())
    }
}
