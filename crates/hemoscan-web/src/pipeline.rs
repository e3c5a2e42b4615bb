//! Upload → recommendations.
//!
//! Stages run strictly in order and each one can end the request:
//! parse → schema check → identifier check → projection → inference → mapping.
//! Schema and identifier failures are client errors; everything else,
//! including a file with a header and no data, is a processing error.
//! Nothing partial is ever returned.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use hemoscan_classifier::{Classifier, FeatureFrame};
use hemoscan_common::schema::missing_columns;
use hemoscan_common::{
    BloodPanel, CellValue, Diagnosis, HemoscanError, ResultRecord, Table, IDENTIFIER_COLUMN,
};

use crate::error::PredictError;
use crate::spreadsheet::parse_upload;

/// Run the whole pipeline on one uploaded file.
pub fn run(
    file_name: Option<&str>,
    bytes: &[u8],
    classifier: &dyn Classifier,
) -> Result<Vec<ResultRecord>, PredictError> {
    let table = parse_upload(file_name, bytes)?;
    predict_table(&table, classifier)
}

/// Everything after parsing.
pub fn predict_table(
    table: &Table,
    classifier: &dyn Classifier,
) -> Result<Vec<ResultRecord>, PredictError> {
    validate_schema(table)?;
    let ids = identifiers(table)?;

    let panels = BloodPanel::project(table)?;
    if panels.is_empty() {
        return Err(HemoscanError::NoDataRows.into());
    }
    let frame = FeatureFrame::from_panels(&panels);
    debug!(rows = frame.len(), "Projected model input");

    let labels = classifier.predict(&frame)?;
    log_summary(&labels);

    Ok(ResultRecord::zip(ids, &labels)?)
}

/// Every schema column must be present; all absent ones are reported at once.
pub fn validate_schema(table: &Table) -> Result<(), PredictError> {
    let missing = missing_columns(&table.columns);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PredictError::SchemaValidation { missing })
    }
}

/// Identifier values in row order.
pub fn identifiers(table: &Table) -> Result<Vec<CellValue>, PredictError> {
    table
        .column(IDENTIFIER_COLUMN)
        .ok_or(PredictError::MissingIdentifierColumn)
}

fn log_summary(labels: &[i64]) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut unknown = 0usize;
    for &label in labels {
        match Diagnosis::from_label(label) {
            Some(d) => *counts.entry(d.name()).or_default() += 1,
            None => unknown += 1,
        }
    }
    if unknown > 0 {
        warn!(unknown, "Classifier returned labels outside the known diagnoses; treated as normal");
    }
    info!(rows = labels.len(), ?counts, "Prediction complete");
}
