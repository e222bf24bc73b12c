//! Static file serving module
//!
//! Serves files below the configured static directory with `ETag` validation.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

/// Serve the static asset addressed by `ctx.path`
pub async fn serve_static(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let resources = &state.config.resources;
    let relative = strip_mount_prefix(ctx.path, &resources.static_prefix);

    match load_from_directory(&resources.static_path(), relative).await {
        Some((content, content_type)) => {
            let etag = cache::generate_etag(&content);
            if cache::check_etag_match(ctx.if_none_match, &etag) {
                return http::build_304_response(&etag);
            }
            http::build_cached_response(Bytes::from(content), content_type, &etag, ctx.is_head)
        }
        None => http::build_404_response(),
    }
}

/// Path below the mount point, without leading slashes
fn strip_mount_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix.trim_end_matches('/'))
        .unwrap_or(path)
        .trim_start_matches('/')
}

/// Load `relative` from `static_dir`, refusing anything that resolves outside it
pub async fn load_from_directory(
    static_dir: &Path,
    relative: &str,
) -> Option<(Vec<u8>, &'static str)> {
    if relative.is_empty() {
        return None;
    }

    let static_dir_canonical = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                static_dir.display()
            ));
            return None;
        }
    };

    // File not found is common (404), no need to log at warning level
    let file_path = fs::canonicalize(static_dir.join(relative)).await.ok()?;
    if !file_path.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            file_path.display()
        ));
        return None;
    }
    if !fs::metadata(&file_path).await.ok()?.is_file() {
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    Some((content, mime::content_type_for(&file_path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::router::tests::{body_bytes, ctx, fixture_state, write_fixture};
    use hyper::Method;

    #[test]
    fn test_strip_mount_prefix() {
        assert_eq!(strip_mount_prefix("/static/app/app.js", "/static"), "app/app.js");
        assert_eq!(strip_mount_prefix("/static/app/app.js", "/static/"), "app/app.js");
        assert_eq!(strip_mount_prefix("/static", "/static"), "");
    }

    #[tokio::test]
    async fn test_serve_asset() {
        let (_dir, state) = fixture_state();
        let resp = serve_static(&ctx(&Method::GET, "/static/app/app.js"), &state).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "application/javascript");
        assert!(resp.headers().contains_key("ETag"));
        assert_eq!(body_bytes(resp).await, "whenReady(setup);\n".as_bytes());
    }

    #[tokio::test]
    async fn test_matching_etag_is_304() {
        let (_dir, state) = fixture_state();
        let first = serve_static(&ctx(&Method::GET, "/static/app/app.js"), &state).await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let method = Method::GET;
        let mut request = ctx(&method, "/static/app/app.js");
        request.if_none_match = Some(&etag);
        let resp = serve_static(&request, &state).await;
        assert_eq!(resp.status(), 304);
    }

    #[tokio::test]
    async fn test_missing_asset_and_directory_are_404() {
        let (_dir, state) = fixture_state();
        let resp = serve_static(&ctx(&Method::GET, "/static/app/missing.css"), &state).await;
        assert_eq!(resp.status(), 404);

        let resp = serve_static(&ctx(&Method::GET, "/static/app"), &state).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let (dir, state) = fixture_state();
        write_fixture(dir.path(), "secret.txt", "do not serve");

        let resp = serve_static(&ctx(&Method::GET, "/static/../secret.txt"), &state).await;
        assert_eq!(resp.status(), 404);
    }
}
