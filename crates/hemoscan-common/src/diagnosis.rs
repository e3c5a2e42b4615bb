//! Interpretation of classifier labels.

use serde::Serialize;
use crate::error::{HemoscanError, Result};
use crate::table::CellValue;

/// Shown when the classifier flags a panel (label 1).
pub const CAUTIONARY_RECOMMENDATION: &str =
    "Результаты могут иметь отклонения от нормы, пожалуйста, обратитесь к врачу.";

/// Shown for every other label.
pub const REASSURING_RECOMMENDATION: &str =
    "Скорее всего, ваши результаты находятся в пределах нормы, но для уточнения обратитесь к врачу.";

/// Known classifier labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Diagnosis {
    Healthy,
    Leukemia,
}

impl Diagnosis {
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(Diagnosis::Healthy),
            1 => Some(Diagnosis::Leukemia),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Diagnosis::Healthy => "Здоров",
            Diagnosis::Leukemia => "Лейкоз",
        }
    }
}

/// Label 1 is the only positive; anything else, known or not, reads as normal.
pub fn recommendation_for(label: i64) -> &'static str {
    if label == 1 {
        CAUTIONARY_RECOMMENDATION
    } else {
        REASSURING_RECOMMENDATION
    }
}

/// One line of the results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    #[serde(rename = "ID истории болезни")] // same header as the upload
    pub id: CellValue,
    #[serde(rename = "Рекомендация")]
    pub recommendation: String,
}

impl ResultRecord {
    pub fn new(id: CellValue, label: i64) -> Self {
        Self {
            id,
            recommendation: recommendation_for(label).to_string(),
        }
    }

    /// Pair identifiers with labels by row position.
    pub fn zip(ids: Vec<CellValue>, labels: &[i64]) -> Result<Vec<ResultRecord>> {
        if ids.len() != labels.len() {
            return Err(HemoscanError::LengthMismatch {
                identifiers: ids.len(),
                labels: labels.len(),
            });
        }
        Ok(ids
            .into_iter()
            .zip(labels.iter())
            .map(|(id, &label)| ResultRecord::new(id, label))
            .collect())
    }
}
