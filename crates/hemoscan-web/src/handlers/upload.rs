//! Upload form.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::error::PredictError;
use crate::state::SharedState;

pub async fn upload_page(State(state): State<SharedState>) -> Response {
    match state.templates.upload_page() {
        Ok(html) => Html(html).into_response(),
        Err(e) => PredictError::from(e).into_response_with(&state.templates),
    }
}
