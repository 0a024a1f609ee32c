//! Route groups and their handlers.
//!
//! Handlers only read files that ingestion already wrote; they never see the
//! catalog.

use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, info, warn};

use crate::layout::SiteLayout;
use crate::logging::ACCESS_TARGET;

use super::files::{Rejection, resolve_within};
use super::form::parse_form;

pub const NOT_FOUND_BODY: &str =
    r#"<html><body><h1>404: Page not found</h1><a href="/">Return to root</a></body></html>"#;

const HTML: &str = "text/html";
const BINARY: &str = "application/octet-stream";

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub layout: Arc<SiteLayout>,
}

/// The three path-prefix scoped handler sets. Named in the access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    Root,
    Resource,
    Music,
}

impl RouteGroup {
    pub fn name(self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Resource => "Resource",
            Self::Music => "Music",
        }
    }
}

/// Creates the router with all route groups.
///
/// The Resource and Music groups are mounted at the names of the directories
/// they serve, so links written from disk paths resolve.
pub fn create_router(layout: Arc<SiteLayout>) -> Router {
    let root = Router::new()
        .route("/", get(home).post(submit_form))
        .route("/favicon.ico", get(favicon))
        .route(&layout.index_href(), get(library_index))
        .route("/refresh", get(refresh))
        .route("/transfer", get(transfer))
        .method_not_allowed_fallback(not_found)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(RouteGroup::Root, access_log));

    let resources = Router::new()
        .route(
            &format!("{}/{{*path}}", layout.resource_mount()),
            get(resource),
        )
        .method_not_allowed_fallback(not_found)
        .layer(middleware::from_fn_with_state(
            RouteGroup::Resource,
            access_log,
        ));

    let music = Router::new()
        .route(&format!("{}/{{*path}}", layout.pages_mount()), get(music_page))
        .method_not_allowed_fallback(not_found)
        .layer(middleware::from_fn_with_state(RouteGroup::Music, access_log));

    root.merge(resources)
        .merge(music)
        .with_state(AppState { layout })
}

/// Emits one access log event per request, tagged with the route group.
async fn access_log(State(group): State<RouteGroup>, request: Request, next: Next) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let uri = logged_uri(&request.uri().to_string());

    info!(
        target: ACCESS_TARGET,
        remote = %remote,
        method = %request.method(),
        uri = %uri,
        handler = group.name(),
        "request"
    );

    next.run(request).await
}

/// Form-style decoding for the log line: `+` is a space, then `%XX` escapes.
pub(super) fn logged_uri(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Root group
// ─────────────────────────────────────────────────────────────────────────────

async fn home(State(state): State<AppState>) -> Response {
    let layout = &state.layout;
    serve_file(&layout.resolve(&layout.home_page), HTML).await
}

/// Form submissions are parsed and then ignored; the reply is always the
/// home page.
async fn submit_form(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match parse_form(content_type, body).await {
        Ok(fields) => debug!(fields = fields.len(), "form submission parsed"),
        Err(e) => debug!("ignoring form submission: {e}"),
    }

    let layout = &state.layout;
    serve_file(&layout.resolve(&layout.home_page), HTML).await
}

async fn favicon(State(state): State<AppState>) -> Response {
    let layout = &state.layout;
    serve_file(&layout.resolve(&layout.favicon), BINARY).await
}

async fn library_index(State(state): State<AppState>) -> Response {
    let layout = &state.layout;
    serve_file(&layout.resolve(&layout.index_page), HTML).await
}

async fn refresh() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, BINARY)], "false").into_response()
}

async fn transfer(State(state): State<AppState>) -> Response {
    let layout = &state.layout;
    serve_file(&layout.resolve(&layout.transfer_file), BINARY).await
}

async fn not_found() -> Response {
    not_found_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource and Music groups
// ─────────────────────────────────────────────────────────────────────────────

async fn resource(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let root = state.layout.resolve(&state.layout.resource_dir);
    serve_confined(&root, &path).await
}

async fn music_page(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let root = state.layout.resolve(&state.layout.pages_dir);
    serve_confined(&root, &path).await
}

async fn serve_confined(root: &FsPath, requested: &str) -> Response {
    match resolve_within(root, requested).await {
        Ok(file) => serve_file(&file, BINARY).await,
        Err(Rejection::NotFound) => not_found_response(),
        Err(Rejection::Escapes) => {
            warn!(root = %root.display(), path = requested, "refusing path outside served root");
            not_found_response()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn serve_file(path: &FsPath, content_type: &'static str) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(e) => {
            debug!(file = %path.display(), "cannot serve file: {e}");
            not_found_response()
        }
    }
}

fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, HTML)],
        NOT_FOUND_BODY,
    )
        .into_response()
}
