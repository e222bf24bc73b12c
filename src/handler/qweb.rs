//! QWeb template load handler
//!
//! Concatenates the application's template files and hands them to the
//! client as `{"result": "<xml>"}`.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;
use crate::templates::TemplateError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use thiserror::Error;

/// Template files loaded by `/loadqweb`, relative to the resource root
pub const QWEB_TEMPLATE_FILES: [&str; 2] = [
    "static/app/app.xml",
    "static/components/header/header.xml",
];

#[derive(Serialize)]
struct LoadQwebResult {
    result: String,
}

#[derive(Error, Debug)]
enum LoadQwebError {
    #[error(transparent)]
    Templates(#[from] TemplateError),

    #[error("Template load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

pub async fn load_qweb(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match render(state).await {
        Ok(body) => http::build_json_response(body, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to load QWeb templates: {e}"));
            http::build_500_response()
        }
    }
}

async fn render(state: &AppState) -> Result<String, LoadQwebError> {
    let store = Arc::clone(&state.templates);
    let concatenation =
        tokio::task::spawn_blocking(move || store.load(&QWEB_TEMPLATE_FILES)).await??;

    if state.cached_access_log.load(Ordering::Relaxed) {
        logger::log_templates_loaded(state.templates.template_count(), &concatenation.checksum);
    }

    let result = concatenation.into_text()?;
    Ok(serde_json::to_string(&LoadQwebResult { result })?)
}
