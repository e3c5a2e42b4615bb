//! Blood-panel classifier.
//!
//! The web layer only sees the [`Classifier`] trait: a batch of positionally
//! labelled feature rows goes in, one integer label per row comes out, in
//! row order. The production implementation evaluates the JSON export of a
//! gradient-boosted oblivious-tree ensemble.

mod frame;
mod oblivious;
mod mock;

pub use frame::FeatureFrame;
pub use oblivious::ObliviousTreeModel;
pub use mock::MockClassifier;

pub type Result<T> = std::result::Result<T, ClassifierError>;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Unsupported model: {0}")]
    Unsupported(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Feature '{0}' is not present in the model input")]
    MissingFeature(String),
}

impl From<std::io::Error> for ClassifierError {
    fn from(e: std::io::Error) -> Self {
        ClassifierError::ModelLoad(e.to_string())
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(e: serde_json::Error) -> Self {
        ClassifierError::ModelLoad(e.to_string())
    }
}

/// A trained binary (or multi-class) classifier.
///
/// Implementations are shared read-only across requests.
pub trait Classifier: Send + Sync {
    /// Predict one label per row of `frame`, in row order.
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<i64>>;

    /// Number of input features the model consumes.
    fn feature_count(&self) -> usize;
}
