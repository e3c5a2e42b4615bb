//! POST /predict: spreadsheet upload → per-case recommendations.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

use hemoscan_common::ResultRecord;

use crate::error::PredictError;
use crate::pipeline;
use crate::state::SharedState;

/// Multipart field carrying the spreadsheet.
pub const FILE_FIELD: &str = "file";

struct Upload {
    file_name: Option<String>,
    bytes: Bytes,
}

pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);

    async move {
        let outcome = match handle(&state, multipart).await {
            Ok(records) => state.templates.results_page(&records).map_err(PredictError::from),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(html) => Html(html).into_response(),
            Err(e) => e.into_response_with(&state.templates),
        }
    }
    .instrument(span)
    .await
}

async fn handle(
    state: &SharedState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<ResultRecord>, PredictError> {
    let upload = read_upload(multipart).await?;
    info!(
        file = upload.file_name.as_deref().unwrap_or(""),
        bytes = upload.bytes.len(),
        "Received upload"
    );

    // Parsing and inference are CPU-bound; keep them off the async workers.
    let classifier = state.classifier.clone();
    let span = Span::current();
    let records = tokio::task::spawn_blocking(move || {
        span.in_scope(|| {
            pipeline::run(upload.file_name.as_deref(), &upload.bytes, classifier.as_ref())
        })
    })
    .await??;

    Ok(records)
}

/// First file part named `file`. Other parts, and a plain form value that
/// happens to be named `file`, are skipped.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, PredictError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Not a multipart request: {}", rejection);
        PredictError::MissingFile
    })?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!("Skipping `{}` form value without a filename", FILE_FIELD);
            continue;
        };
        let bytes = field.bytes().await?;
        return Ok(Upload { file_name: Some(file_name), bytes });
    }
    Err(PredictError::MissingFile)
}
