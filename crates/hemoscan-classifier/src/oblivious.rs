//! Evaluator for the JSON export of an oblivious-tree ensemble
//! (`model.save_model("model.json", format="json")`).
//!
//! Only numeric ("float") features are supported. Each tree applies one
//! split per depth level; bit `d` of the leaf index is the outcome of split
//! `d`. The raw score is `bias + scale * sum(leaf values)`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info};

use crate::{Classifier, ClassifierError, FeatureFrame, Result};

// ── Export format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ModelJson {
    #[serde(default)]
    model_info: serde_json::Value,
    #[serde(default)]
    features_info: FeaturesInfoJson,
    oblivious_trees: Vec<TreeJson>,
    scale_and_bias: Option<(f64, Vec<f64>)>,
}

#[derive(Debug, Default, Deserialize)]
struct FeaturesInfoJson {
    #[serde(default)]
    float_features: Vec<FloatFeatureJson>,
    #[serde(default)]
    categorical_features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FloatFeatureJson {
    feature_index: usize,
    #[serde(default)]
    feature_id: Option<String>,
    #[serde(default)]
    nan_value_treatment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeJson {
    leaf_values: Vec<f64>,
    #[serde(default)]
    splits: Vec<SplitJson>,
}

#[derive(Debug, Deserialize)]
struct SplitJson {
    float_feature_index: Option<usize>,
    border: Option<f64>,
    split_type: Option<String>,
}

// ── Evaluated model ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct FeatureSpec {
    /// Column label the model was trained against; the feature index when unnamed.
    id: String,
    nan_as_true: bool,
}

#[derive(Debug, Clone)]
struct Split {
    feature: usize,
    border: f64,
}

#[derive(Debug, Clone)]
struct Tree {
    splits: Vec<Split>,
    leaf_values: Vec<f64>,
}

/// Gradient-boosted oblivious trees, read-only after load.
#[derive(Debug, Clone)]
pub struct ObliviousTreeModel {
    /// Features read by at least one split; `Split::feature` indexes this.
    features: Vec<FeatureSpec>,
    input_width: usize,
    trees: Vec<Tree>,
    dimension: usize,
    scale: f64,
    bias: Vec<f64>,
    class_labels: Option<Vec<i64>>,
}

impl ObliviousTreeModel {
    /// Load the model from a JSON export on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let start = Instant::now();
        let path = path.as_ref();
        info!("Loading classifier: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let model = Self::from_json(&content)?;

        info!(
            trees = model.trees.len(),
            features = model.input_width,
            "Classifier loaded in {:?}",
            start.elapsed()
        );
        Ok(model)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: ModelJson = serde_json::from_str(content)?;

        if !raw.features_info.categorical_features.is_empty() {
            return Err(ClassifierError::Unsupported(format!(
                "{} categorical features",
                raw.features_info.categorical_features.len()
            )));
        }

        let declared: HashMap<usize, FloatFeatureJson> = raw
            .features_info
            .float_features
            .into_iter()
            .map(|f| (f.feature_index, f))
            .collect();
        let input_width = declared
            .keys()
            .map(|i| i + 1)
            .max()
            .unwrap_or(0);

        // Only features some split reads are bound to the input.
        let mut features: Vec<FeatureSpec> = Vec::new();
        let mut compact: HashMap<usize, usize> = HashMap::new();

        let mut trees = Vec::with_capacity(raw.oblivious_trees.len());
        let mut dimension: Option<usize> = None;
        for (t, tree) in raw.oblivious_trees.into_iter().enumerate() {
            let splits = tree
                .splits
                .into_iter()
                .map(|s| {
                    if let Some(kind) = s.split_type.as_deref() {
                        if kind != "FloatFeature" {
                            return Err(ClassifierError::Unsupported(format!(
                                "split type {} in tree {}",
                                kind, t
                            )));
                        }
                    }
                    match (s.float_feature_index, s.border) {
                        (Some(index), Some(border)) => {
                            let feature = *compact.entry(index).or_insert_with(|| {
                                let spec = declared.get(&index);
                                features.push(FeatureSpec {
                                    id: spec
                                        .and_then(|f| f.feature_id.clone())
                                        .filter(|id| !id.is_empty())
                                        .unwrap_or_else(|| index.to_string()),
                                    nan_as_true: spec
                                        .and_then(|f| f.nan_value_treatment.as_deref())
                                        == Some("AsTrue"),
                                });
                                features.len() - 1
                            });
                            Ok(Split { feature, border })
                        }
                        _ => Err(ClassifierError::ModelLoad(format!(
                            "tree {}: split without feature index or border",
                            t
                        ))),
                    }
                })
                .collect::<Result<Vec<_>>>()?;

            if splits.len() >= usize::BITS as usize {
                return Err(ClassifierError::Unsupported(format!("tree {} is too deep", t)));
            }
            let leaves = 1usize << splits.len();
            if tree.leaf_values.is_empty() || tree.leaf_values.len() % leaves != 0 {
                return Err(ClassifierError::ModelLoad(format!(
                    "tree {}: {} leaf values for depth {}",
                    t,
                    tree.leaf_values.len(),
                    splits.len()
                )));
            }
            let dim = tree.leaf_values.len() / leaves;
            match dimension {
                None => dimension = Some(dim),
                Some(d) if d != dim => {
                    return Err(ClassifierError::ModelLoad(format!(
                        "tree {}: output dimension {} differs from {}",
                        t, dim, d
                    )))
                }
                Some(_) => {}
            }

            trees.push(Tree { splits, leaf_values: tree.leaf_values });
        }

        let dimension = dimension.unwrap_or(1);
        let (scale, mut bias) = raw.scale_and_bias.unwrap_or((1.0, Vec::new()));
        if bias.is_empty() {
            bias = vec![0.0; dimension];
        } else if bias.len() != dimension {
            return Err(ClassifierError::ModelLoad(format!(
                "bias has {} values, model output has {}",
                bias.len(),
                dimension
            )));
        }

        let class_labels = class_labels(&raw.model_info);
        debug!(dimension, ?class_labels, "Parsed oblivious tree export");

        let input_width = input_width.max(
            features
                .iter()
                .filter_map(|f| f.id.parse::<usize>().ok())
                .map(|i| i + 1)
                .max()
                .unwrap_or(0),
        );

        Ok(Self { features, input_width, trees, dimension, scale, bias, class_labels })
    }

    /// Map each model feature to a frame column, by trained label when known.
    fn bind(&self, frame: &FeatureFrame) -> Result<Vec<usize>> {
        self.features
            .iter()
            .map(|spec| {
                frame
                    .column_index(&spec.id)
                    .ok_or_else(|| ClassifierError::MissingFeature(spec.id.clone()))
            })
            .collect()
    }

    /// Raw scores (one per output dimension) for a single row.
    fn raw_scores(&self, row: &[f64], columns: &[usize]) -> Vec<f64> {
        let dim = self.dimension;
        let mut acc = vec![0.0; dim];
        for tree in &self.trees {
            let mut index = 0usize;
            for (depth, split) in tree.splits.iter().enumerate() {
                let value = row[columns[split.feature]];
                let bit = if value.is_nan() {
                    self.features[split.feature].nan_as_true
                } else {
                    value > split.border
                };
                if bit {
                    index |= 1 << depth;
                }
            }
            let leaf = &tree.leaf_values[index * dim..(index + 1) * dim];
            for (a, v) in acc.iter_mut().zip(leaf) {
                *a += v;
            }
        }
        acc.iter()
            .zip(&self.bias)
            .map(|(a, b)| a * self.scale + b)
            .collect()
    }

    fn label_for(&self, scores: &[f64]) -> i64 {
        let class = if self.dimension == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            scores
                .iter()
                .enumerate()
                .fold((0usize, f64::NEG_INFINITY), |best, (i, &s)| {
                    if s > best.1 { (i, s) } else { best }
                })
                .0
        };
        self.class_labels
            .as_ref()
            .and_then(|labels| labels.get(class).copied())
            .unwrap_or(class as i64)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Integer class labels recorded by the trainer, if the export has them.
fn class_labels(model_info: &serde_json::Value) -> Option<Vec<i64>> {
    let labels = model_info
        .get("class_params")?
        .get("class_to_label")?
        .as_array()?;
    labels
        .iter()
        .map(|v| v.as_f64().map(|f| f as i64))
        .collect()
}

impl Classifier for ObliviousTreeModel {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<i64>> {
        let columns = self.bind(frame)?;
        let labels: Vec<i64> = frame
            .rows
            .iter()
            .map(|row| self.label_for(&self.raw_scores(row, &columns)))
            .collect();
        debug!(rows = labels.len(), "Oblivious tree inference done");
        Ok(labels)
    }

    fn feature_count(&self) -> usize {
        self.input_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemoscan_common::schema::FEATURE_COUNT;
    use hemoscan_common::BloodPanel;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    // WBC is feature "1", HGB is feature "8".
    const MODEL: &str = r#"{
        "model_info": {"class_params": {"class_to_label": [0, 1]}},
        "features_info": {"float_features": [
            {"feature_index": 1, "flat_feature_index": 1, "feature_id": "1",
             "borders": [10.0], "nan_value_treatment": "AsIs"},
            {"feature_index": 8, "flat_feature_index": 8, "feature_id": "8",
             "borders": [100.0], "nan_value_treatment": "AsTrue"}
        ]},
        "oblivious_trees": [
            {"leaf_values": [-1.0, 2.0],
             "splits": [{"float_feature_index": 1, "border": 10.0, "split_type": "FloatFeature"}]},
            {"leaf_values": [-0.5, 0.1, 0.2, 0.3],
             "splits": [
                {"float_feature_index": 1, "border": 10.0, "split_type": "FloatFeature"},
                {"float_feature_index": 8, "border": 100.0, "split_type": "FloatFeature"}
             ]}
        ],
        "scale_and_bias": [1.0, [0.0]]
    }"#;

    fn panel(wbc: f64, hgb: f64) -> BloodPanel {
        let mut f = [0.0; FEATURE_COUNT];
        f[1] = wbc;
        f[8] = hgb;
        BloodPanel::from_features(f)
    }

    #[test]
    fn test_predict_binary() {
        let model = ObliviousTreeModel::from_json(MODEL).unwrap();
        assert_eq!(model.tree_count(), 2);
        assert_eq!(model.feature_count(), 9);

        let frame = FeatureFrame::from_panels(&[
            panel(5.0, 130.0),  // -1.0 + 0.2 = -0.8
            panel(50.0, 90.0),  //  2.0 + 0.1 =  2.1
            panel(50.0, 130.0), //  2.0 + 0.3 =  2.3
            panel(5.0, 90.0),   // -1.0 - 0.5 = -1.5
        ]);
        assert_eq!(model.predict(&frame).unwrap(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_nan_treatment() {
        let model = ObliviousTreeModel::from_json(MODEL).unwrap();
        // WBC NaN goes left (AsIs), HGB NaN goes right (AsTrue).
        let frame = FeatureFrame::from_panels(&[panel(f64::NAN, f64::NAN)]);
        let columns = model.bind(&frame).unwrap();
        let scores = model.raw_scores(&frame.rows[0], &columns);
        assert!((scores[0] - (-0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_bias_and_scale() {
        let json = MODEL.replace("[1.0, [0.0]]", "[2.0, [1.7]]");
        let model = ObliviousTreeModel::from_json(&json).unwrap();
        let frame = FeatureFrame::from_panels(&[panel(5.0, 130.0)]);
        // 2.0 * -0.8 + 1.7 = 0.1
        assert_eq!(model.predict(&frame).unwrap(), vec![1]);
    }

    #[test]
    fn test_binds_by_trained_label() {
        let model = ObliviousTreeModel::from_json(MODEL).unwrap();
        let mut frame = FeatureFrame::from_panels(&[panel(50.0, 90.0)]);
        // Spreadsheet headers instead of positional labels.
        frame.columns = hemoscan_common::EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let err = model.predict(&frame).unwrap_err();
        assert!(matches!(err, ClassifierError::MissingFeature(ref f) if f == "1"));
    }

    #[test]
    fn test_multiclass_argmax() {
        let json = r#"{
            "oblivious_trees": [
                {"leaf_values": [0.1, 0.9, 0.0,  0.8, 0.1, 0.0],
                 "splits": [{"float_feature_index": 1, "border": 10.0}]}
            ]
        }"#;
        let model = ObliviousTreeModel::from_json(json).unwrap();
        let frame = FeatureFrame::from_panels(&[panel(5.0, 0.0), panel(20.0, 0.0)]);
        assert_eq!(model.predict(&frame).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_rejects_categorical_features() {
        let json = r#"{"features_info": {"categorical_features": [{"feature_index": 0}]},
                       "oblivious_trees": []}"#;
        assert!(matches!(
            ObliviousTreeModel::from_json(json),
            Err(ClassifierError::Unsupported(_))
        ));
    }

    #[test]
    fn test_rejects_bad_leaf_count() {
        let json = r#"{"oblivious_trees": [
            {"leaf_values": [1.0, 2.0, 3.0],
             "splits": [{"float_feature_index": 0, "border": 1.0}]}
        ]}"#;
        assert!(matches!(
            ObliviousTreeModel::from_json(json),
            Err(ClassifierError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL.as_bytes()).unwrap();
        let model = ObliviousTreeModel::load(file.path()).unwrap();
        assert_eq!(model.tree_count(), 2);

        let missing = ObliviousTreeModel::load("/nonexistent/model.json");
        assert!(matches!(missing, Err(ClassifierError::ModelLoad(_))));
    }
}
