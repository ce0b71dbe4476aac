use crate::config::{ClassifierConfig, OutputKind};
use crate::error::{InferenceError, ModelLoadError};
use crate::labels::ClassLabel;
use crate::preprocess::INPUT_SIZE;
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// A model that scores a single-image `(1, H, W, 3)` batch.
pub trait Classify {
    /// One probability per class, in `ClassLabel` index order.
    fn probabilities(&self, batch: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    /// Square input edge the model expects.
    fn input_size(&self) -> u32 {
        INPUT_SIZE
    }
}

/// Outcome of running the classifier on one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: ClassLabel,
    /// Highest probability as a percentage, rounded to two decimals.
    pub confidence: f32,
    pub distribution: [f32; ClassLabel::COUNT],
}

/// Runs `model` and ranks its output.
pub fn predict(model: &dyn Classify, batch: &Array4<f32>) -> Result<Prediction, InferenceError> {
    let probs = model.probabilities(batch)?;
    let distribution: [f32; ClassLabel::COUNT] =
        probs.as_slice().try_into().map_err(|_| InferenceError::OutputShape {
            expected: ClassLabel::COUNT,
            got: probs.len(),
        })?;
    if let Some(bad) = distribution.iter().find(|p| !p.is_finite()) {
        return Err(InferenceError::Runtime(format!(
            "classifier returned a non-finite score ({bad})"
        )));
    }
    let (best_idx, best_prob) = argmax(&distribution);
    let label = ClassLabel::from_index(best_idx).ok_or(InferenceError::OutputShape {
        expected: ClassLabel::COUNT,
        got: probs.len(),
    })?;
    tracing::debug!("prediction {label} p={best_prob:.4} distribution={distribution:?}");
    Ok(Prediction {
        label,
        confidence: to_percent(best_prob),
        distribution,
    })
}

/// Index and value of the first maximum.
fn argmax(values: &[f32; ClassLabel::COUNT]) -> (usize, f32) {
    let mut best = (0, values[0]);
    for (idx, &v) in values.iter().enumerate().skip(1) {
        if v > best.1 {
            best = (idx, v);
        }
    }
    best
}

pub fn to_percent(prob: f32) -> f32 {
    (prob * 10_000.0).round() / 100.0
}

pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|x| x / sum).collect()
}

/// Load the configured classifier. Called once per `AppContext`.
pub fn load_classifier(cfg: &ClassifierConfig) -> Result<Box<dyn Classify>, ModelLoadError> {
    if !cfg.model_path.exists() {
        return Err(ModelLoadError::Missing {
            path: cfg.model_path.clone(),
        });
    }
    #[cfg(feature = "ort")]
    {
        let model = onnx::OnnxClassifier::new(cfg)?;
        tracing::info!("loaded classifier from {}", cfg.model_path.display());
        Ok(Box::new(model))
    }
    #[cfg(not(feature = "ort"))]
    {
        Err(ModelLoadError::BackendDisabled)
    }
}

#[cfg(feature = "ort")]
mod onnx {
    use super::*;
    use ndarray::CowArray;
    use once_cell::sync::OnceCell;
    use ort::{
        GraphOptimizationLevel, SessionBuilder, environment::Environment, session::Session,
        tensor::OrtOwnedTensor, value::Value,
    };
    use std::sync::Arc;

    static ORT_ENV: OnceCell<Arc<Environment>> = OnceCell::new();

    fn environment() -> ort::OrtResult<Arc<Environment>> {
        ORT_ENV
            .get_or_try_init(|| {
                Environment::builder()
                    .with_name("mri-vision")
                    .build()
                    .map(|env| env.into_arc())
            })
            .cloned()
    }

    /// Classifier backed by ONNX Runtime.
    pub struct OnnxClassifier {
        session: Session,
        input_size: u32,
        output: OutputKind,
    }

    impl OnnxClassifier {
        pub fn new(cfg: &ClassifierConfig) -> Result<Self, ModelLoadError> {
            let runtime_err = |e: ort::OrtError| ModelLoadError::Runtime {
                path: cfg.model_path.clone(),
                msg: e.to_string(),
            };
            let env = environment().map_err(runtime_err)?;
            let session = SessionBuilder::new(&env)
                .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level1))
                .and_then(|b| b.with_model_from_file(&cfg.model_path))
                .map_err(runtime_err)?;
            Ok(Self {
                session,
                input_size: cfg.input_size,
                output: cfg.output,
            })
        }
    }

    impl Classify for OnnxClassifier {
        fn probabilities(&self, batch: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            let runtime_err = |e: ort::OrtError| InferenceError::Runtime(e.to_string());
            let cow = CowArray::from(batch.view().into_dyn());
            let input = Value::from_array(self.session.allocator(), &cow).map_err(runtime_err)?;
            let outputs: Vec<Value> = self.session.run(vec![input]).map_err(runtime_err)?;
            let first = outputs
                .first()
                .ok_or_else(|| InferenceError::Runtime("model returned no output".into()))?;
            let tensor: OrtOwnedTensor<f32, _> = first.try_extract().map_err(runtime_err)?;
            let scores: Vec<f32> = tensor.view().iter().cloned().collect();
            Ok(match self.output {
                OutputKind::Probabilities => scores,
                OutputKind::Logits => softmax(&scores),
            })
        }

        fn input_size(&self) -> u32 {
            self.input_size
        }
    }
}
