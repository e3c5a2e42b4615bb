//! Request-level failures and their HTTP rendering.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use hemoscan_classifier::ClassifierError;
use hemoscan_common::schema::format_column_list;
use hemoscan_common::{HemoscanError, IDENTIFIER_COLUMN};

use crate::render::Templates;
use crate::spreadsheet::SpreadsheetError;

#[derive(Debug, Error)]
pub enum PredictError {
    /// The request carries no `file` part.
    #[error("No file provided")]
    MissingFile,

    /// The multipart body itself could not be read (e.g. over the size limit).
    #[error("{message}")]
    InvalidUpload { status: StatusCode, message: String },

    #[error("Missing columns: {}", format_column_list(.missing))]
    SchemaValidation { missing: Vec<String> },

    #[error("Column '{}' not found", IDENTIFIER_COLUMN)]
    MissingIdentifierColumn,

    /// Anything that goes wrong after validation: parsing, conversion, inference.
    #[error("Error processing file: {0}")]
    Processing(String),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::MissingFile
            | PredictError::SchemaValidation { .. }
            | PredictError::MissingIdentifierColumn => StatusCode::BAD_REQUEST,
            PredictError::InvalidUpload { status, .. } => *status,
            PredictError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors become `{"error": ...}` JSON; server errors render the error page.
    pub fn into_response_with(self, templates: &Templates) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_client_error() {
            warn!(status = status.as_u16(), "Rejected upload: {}", message);
            return (status, Json(json!({ "error": message }))).into_response();
        }

        error!("{}", message);
        match templates.error_page(&message) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!("Failed to render error page: {}", e);
                (status, message).into_response()
            }
        }
    }
}

impl From<SpreadsheetError> for PredictError {
    fn from(e: SpreadsheetError) -> Self {
        PredictError::Processing(e.to_string())
    }
}

impl From<HemoscanError> for PredictError {
    fn from(e: HemoscanError) -> Self {
        PredictError::Processing(e.to_string())
    }
}

impl From<ClassifierError> for PredictError {
    fn from(e: ClassifierError) -> Self {
        PredictError::Processing(e.to_string())
    }
}

impl From<minijinja::Error> for PredictError {
    fn from(e: minijinja::Error) -> Self {
        PredictError::Processing(e.to_string())
    }
}

impl From<tokio::task::JoinError> for PredictError {
    fn from(e: tokio::task::JoinError) -> Self {
        PredictError::Processing(e.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for PredictError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        PredictError::InvalidUpload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages() {
        assert_eq!(PredictError::MissingFile.to_string(), "No file provided");
        assert_eq!(
            PredictError::SchemaValidation { missing: vec!["WBC".into(), "BA%".into()] }.to_string(),
            "Missing columns: ['WBC', 'BA%']"
        );
        assert_eq!(
            PredictError::MissingIdentifierColumn.to_string(),
            "Column 'ID истории болезни' not found"
        );
        assert_eq!(
            PredictError::Processing("boom".into()).to_string(),
            "Error processing file: boom"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PredictError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PredictError::SchemaValidation { missing: vec![] }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PredictError::MissingIdentifierColumn.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PredictError::from(HemoscanError::ColumnNotFound("WBC".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
