use hemoscan_common::schema::{positional_labels, FEATURE_COUNT};
use hemoscan_common::BloodPanel;

/// Model input batch. Columns carry the labels the model was trained
/// against (`"0"` … `"21"`), not the spreadsheet headers.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub rows: Vec<[f64; FEATURE_COUNT]>,
}

impl FeatureFrame {
    pub fn from_panels(panels: &[BloodPanel]) -> Self {
        Self {
            columns: positional_labels(),
            rows: panels.iter().map(BloodPanel::to_features).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_panels_uses_positional_labels() {
        let mut features = [1.0; FEATURE_COUNT];
        features[21] = 0.5;
        let frame = FeatureFrame::from_panels(&[BloodPanel::from_features(features)]);
        assert_eq!(frame.columns.len(), FEATURE_COUNT);
        assert_eq!(frame.column_index("21"), Some(21));
        assert_eq!(frame.column_index("BA%"), None);
        assert_eq!(frame.rows[0][21], 0.5);
        assert_eq!(frame.len(), 1);
    }
}
