use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::io;
use crate::normalizer::{FEATURE_LEN, FeatureVector};

/// Integer label of a trained gesture class, also the subscription key.
pub type GestureId = u32;

/// Per-hand, per-frame prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub class_id: GestureId,
    /// Probability of `class_id`, in [0, 1].
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(class_id: GestureId, confidence: f32) -> Self {
        Self {
            class_id,
            confidence,
        }
    }
}

/// A gesture model: one feature vector in, one prediction out.
///
/// Calls for different hands of the same frame run concurrently, so
/// implementations must not rely on call ordering.
pub trait Classifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult, ClassifierError>;
}

impl<F> Classifier for F
where
    F: Fn(&FeatureVector) -> Result<ClassificationResult, ClassifierError> + Send + Sync,
{
    fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult, ClassifierError> {
        self(features)
    }
}

/// Owned slot holding the active classifier.
///
/// Installing a model wakes everyone blocked in [`ClassifierHandle::wait_ready`].
/// A swap never interrupts running predictions: callers hold their own `Arc` of
/// the model they started with, and the next call picks up the new one.
#[derive(Default)]
pub struct ClassifierHandle {
    slot: Mutex<Option<Arc<dyn Classifier>>>,
    ready: Condvar,
}

impl ClassifierHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            slot: Mutex::new(Some(classifier)),
            ready: Condvar::new(),
        }
    }

    /// Installs or hot-swaps the model.
    pub fn install(&self, classifier: Arc<dyn Classifier>) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let swapped = slot.replace(classifier).is_some();
        self.ready.notify_all();
        if swapped {
            log::info!("classifier model swapped");
        } else {
            log::info!("classifier model ready");
        }
    }

    /// Snapshot of the active model.
    pub fn current(&self) -> Option<Arc<dyn Classifier>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    /// Blocks until a model is installed or `timeout` elapses.
    pub fn wait_ready(&self, timeout: Duration) -> Option<Arc<dyn Classifier>> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let (slot, _) = self
            .ready
            .wait_timeout_while(slot, timeout, |slot| slot.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.clone()
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult, ClassifierError> {
        self.current()
            .ok_or(ClassifierError::NotReady)?
            .classify(features)
    }
}

// ── Dense network ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    #[default]
    Linear,
    Softmax,
}

/// One fully connected layer as stored on disk. `weights` is row-major,
/// one row per output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayerConfig {
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpModelConfig {
    pub layers: Vec<DenseLayerConfig>,
}

struct DenseLayer {
    weights: na::DMatrix<f32>,
    biases: na::DVector<f32>,
    activation: Activation,
}

/// Feed-forward gesture classifier over the 42-scalar feature vector.
///
/// The predicted class is the arg-max of the last layer and the confidence is
/// its softmax probability.
pub struct MlpClassifier {
    layers: Vec<DenseLayer>,
}

impl MlpClassifier {
    pub fn from_config(config: &MlpModelConfig) -> Result<MlpClassifier, ClassifierError> {
        if config.layers.is_empty() {
            return Err(ClassifierError::InvalidModel("model has no layers".to_string()));
        }
        let mut layers = Vec::with_capacity(config.layers.len());
        let mut expected_cols = FEATURE_LEN;
        for (idx, layer) in config.layers.iter().enumerate() {
            let rows = layer.weights.len();
            if rows == 0 {
                return Err(ClassifierError::InvalidModel(format!("layer {} has no units", idx)));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != expected_cols) {
                return Err(ClassifierError::InvalidModel(format!(
                    "layer {} expects {} inputs, found a row of {}",
                    idx,
                    expected_cols,
                    row.len()
                )));
            }
            if layer.biases.len() != rows {
                return Err(ClassifierError::InvalidModel(format!(
                    "layer {} has {} units but {} biases",
                    idx,
                    rows,
                    layer.biases.len()
                )));
            }
            layers.push(DenseLayer {
                weights: na::DMatrix::from_fn(rows, expected_cols, |r, c| layer.weights[r][c]),
                biases: na::DVector::from_column_slice(&layer.biases),
                activation: layer.activation,
            });
            expected_cols = rows;
        }
        Ok(MlpClassifier { layers })
    }

    pub fn from_json_file(path: &Path) -> Result<MlpClassifier, ClassifierError> {
        let config: MlpModelConfig = io::object_from_json::<_, ClassifierError>(path)?;
        Self::from_config(&config)
    }

    pub fn input_len(&self) -> usize {
        self.layers.first().map_or(0, |l| l.weights.ncols())
    }

    pub fn num_classes(&self) -> usize {
        self.layers.last().map_or(0, |l| l.weights.nrows())
    }

    /// Class probabilities for a raw input.
    pub fn probabilities(&self, input: &[f32]) -> Result<na::DVector<f32>, ClassifierError> {
        if input.len() != self.input_len() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.input_len(),
                got: input.len(),
            });
        }
        let mut x = na::DVector::from_column_slice(input);
        let mut last = Activation::Linear;
        for layer in &self.layers {
            x = &layer.weights * &x + &layer.biases;
            match layer.activation {
                Activation::Relu => x.iter_mut().for_each(|v| *v = v.max(0.0)),
                Activation::Linear => {}
                Activation::Softmax => softmax(&mut x),
            }
            last = layer.activation;
        }
        if last != Activation::Softmax {
            softmax(&mut x);
        }
        Ok(x)
    }
}

impl Classifier for MlpClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult, ClassifierError> {
        let probs = self.probabilities(features.as_slice())?;
        let (class_idx, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });
        if !confidence.is_finite() {
            return Err(ClassifierError::Inference(
                "model produced non-finite output".to_string(),
            ));
        }
        Ok(ClassificationResult::new(class_idx as GestureId, confidence))
    }
}

fn softmax(x: &mut na::DVector<f32>) {
    let max = x.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    x.iter_mut().for_each(|v| *v = (*v - max).exp());
    let sum: f32 = x.iter().sum();
    if sum > 0.0 {
        x.iter_mut().for_each(|v| *v /= sum);
    }
}
