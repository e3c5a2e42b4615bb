// ── Mock Implementation for Testing ────────────────────────────────────────

use std::sync::Mutex;

use hemoscan_common::schema::FEATURE_COUNT;

use crate::{Classifier, ClassifierError, FeatureFrame, Result};

/// Classifier with scripted output, recording every frame it is given.
///
/// Labels are handed out in order and cycle when the batch is longer than
/// the script. An empty script fails every call.
pub struct MockClassifier {
    labels: Vec<i64>,
    seen: Mutex<Vec<FeatureFrame>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_labels(mut self, labels: &[i64]) -> Self {
        self.labels = labels.to_vec();
        self
    }

    /// Frames passed to `predict`, oldest first.
    pub fn seen(&self) -> Vec<FeatureFrame> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for MockClassifier {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<i64>> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(frame.clone());
        }
        if self.labels.is_empty() {
            return Err(ClassifierError::Inference("mock classifier has no labels".into()));
        }
        Ok(self.labels.iter().copied().cycle().take(frame.len()).collect())
    }

    fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemoscan_common::BloodPanel;

    #[test]
    fn test_mock_cycles_and_records() {
        let mock = MockClassifier::new().with_labels(&[0, 1]);
        let panels = vec![BloodPanel::from_features([0.0; FEATURE_COUNT]); 3];
        let frame = FeatureFrame::from_panels(&panels);
        assert_eq!(mock.predict(&frame).unwrap(), vec![0, 1, 0]);
        assert_eq!(mock.seen().len(), 1);
        assert_eq!(mock.seen()[0].len(), 3);
    }

    #[test]
    fn test_mock_without_labels_fails() {
        let mock = MockClassifier::default();
        let frame = FeatureFrame::from_panels(&[]);
        assert!(mock.predict(&frame).is_err());
    }
}
