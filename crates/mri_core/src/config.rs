use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "mri_vision.toml";

/// How the model's final layer should be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// The model ends in a softmax; scores are used as-is.
    #[default]
    Probabilities,
    /// Raw scores; a softmax is applied before ranking.
    Logits,
}

/// Configuration for the ONNX classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub model_path: PathBuf,
    pub input_size: u32,
    pub output: OutputKind,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/alzheimers_detection_model.onnx"),
            input_size: 224,
            output: OutputKind::Probabilities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    /// Directory that receives the per-request scratch copy of the upload.
    pub scratch_dir: PathBuf,
    pub scratch_file_name: String,
    /// Honour the `Moderate_<digits>.jpg` filename shortcut.
    pub filename_override: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            scratch_dir: PathBuf::from("."),
            scratch_file_name: "temp_img.jpg".to_string(),
            filename_override: true,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("loading config from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.scratch_dir.join(&self.scratch_file_name)
    }
}
