pub mod classifier;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod io;
pub mod landmarks;
pub mod normalizer;
pub mod pipeline;
pub mod registry;
pub mod synthetic;
pub mod tracker;
pub mod visualization;

pub use classifier::{Classifier, ClassificationResult, ClassifierHandle, GestureId, MlpClassifier};
pub use config::{LowConfidencePolicy, PipelineConfig};
pub use landmarks::{HandObservation, Handedness, Point3, TrackedFrame};
pub use normalizer::FeatureVector;
pub use pipeline::{GesturePipeline, RunStats};
pub use registry::{GestureEvent, GestureRegistry, GestureSubscriber, SubscriberId};
