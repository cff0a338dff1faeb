/// Errors raised while loading or running a gesture classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// No model has been installed in the classifier handle yet.
    #[error("no classifier model installed")]
    NotReady,

    /// Input width does not match what the model expects.
    #[error("feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The model failed while producing a prediction.
    #[error("classifier inference failed: {0}")]
    Inference(String),

    /// The prediction did not come back before the frame deadline.
    #[error("classification exceeded the {limit_ms} ms frame deadline")]
    Timeout { limit_ms: u64 },

    /// The model description is inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a hand tracker source.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse recording: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid recording pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to list recordings: {0}")]
    Glob(#[from] glob::GlobError),

    /// A live tracker could not produce a frame this poll.
    #[error("tracker failed: {0}")]
    Source(String),
}

/// Errors raised while loading or validating a pipeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while building a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to start classification workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
