//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body size validation, route table
//! lookup, dispatch and access logging.

use crate::config::AppState;
use crate::handler::{index, qweb, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Endpoint, RouteMatch};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Request information the endpoint handlers need
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();

    let access_log = state.cached_access_log.load(Ordering::Relaxed);
    if access_log {
        logger::log_request(method, uri, req.version());
    }
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let mut response = match check_body_size(&req, state.config.http.max_body_size) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                method,
                path: uri.path(),
                is_head: *method == Method::HEAD,
                if_none_match: req
                    .headers()
                    .get("if-none-match")
                    .and_then(|v| v.to_str().ok()),
            };
            route_request(&ctx, &state).await
        }
    };

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = http_version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.referer = header_string(&req, REFERER);
        entry.user_agent = header_string(&req, USER_AGENT);
        entry.request_time = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Look the request up in the route table and run its endpoint
pub async fn route_request(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match state.routes.lookup(ctx.method, ctx.path) {
        RouteMatch::Matched(endpoint) => dispatch_endpoint(ctx, endpoint, state).await,
        RouteMatch::MethodNotAllowed(methods) if *ctx.method == Method::OPTIONS => {
            http::build_options_response(&methods.allow_header(), state.config.http.enable_cors)
        }
        RouteMatch::MethodNotAllowed(methods) => {
            logger::log_warning(&format!("Method not allowed: {} {}", ctx.method, ctx.path));
            http::build_405_response(&methods.allow_header())
        }
        RouteMatch::NotFound => http::build_404_response(),
    }
}

async fn dispatch_endpoint(
    ctx: &RequestContext<'_>,
    endpoint: Endpoint,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    match endpoint {
        Endpoint::Index => index::serve_index(ctx, state).await,
        Endpoint::LoadQweb => qweb::load_qweb(ctx, state).await,
        Endpoint::Static => static_files::serve_static(ctx, state).await,
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

const fn http_version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
