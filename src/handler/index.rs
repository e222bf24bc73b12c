//! Index page handler

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::sync::Arc;
use tokio::fs;

/// Serve the index page verbatim, read from disk on every request
pub async fn serve_index(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let path = state.config.resources.index_path();
    match fs::read(&path).await {
        Ok(html) => http::build_html_response(Bytes::from(html), ctx.is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read index page '{}': {e}",
                path.display()
            ));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::router::tests::{body_bytes, ctx, fixture_state, INDEX_HTML};
    use hyper::Method;

    #[tokio::test]
    async fn test_index_is_served_verbatim() {
        let (_dir, state) = fixture_state();
        let resp = serve_index(&ctx(&Method::GET, "/"), &state).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
        assert_eq!(body_bytes(resp).await, INDEX_HTML.as_bytes());
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (_dir, state) = fixture_state();
        let resp = serve_index(&ctx(&Method::HEAD, "/"), &state).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["Content-Length"],
            INDEX_HTML.len().to_string().as_str()
        );
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_is_500() {
        let (dir, state) = fixture_state();
        std::fs::remove_file(dir.path().join("templates/index.html")).unwrap();

        let resp = serve_index(&ctx(&Method::GET, "/"), &state).await;
        assert_eq!(resp.status(), 500);
    }
}
