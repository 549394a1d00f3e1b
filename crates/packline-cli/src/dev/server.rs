//! Development server with live reload via Server-Sent Events.
//!
//! Serves the build output directory, injects the reload client into HTML
//! responses, and pushes rebuild notifications to connected browsers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response, Sse},
    routing::get,
    Router,
};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::compression::CompressionLayer;

use crate::dev::state::SharedState;
use crate::error::{CliError, Result};

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");
const SCRIPT_TAG: &str = r#"<script src="/__packline_reload__.js"></script>"#;

/// Resolved server settings, after CLI flags override the config.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    pub compress: bool,
    pub hot: bool,
    /// Build output directory served as the site root.
    pub root: PathBuf,
    /// Extra directory consulted when a file is not in the output.
    pub static_dir: Option<PathBuf>,
}

#[derive(Clone)]
struct ServeCtx {
    options: Arc<ServerOptions>,
    state: SharedState,
}

/// Development server.
pub struct DevServer {
    options: Arc<ServerOptions>,
    state: SharedState,
}

impl DevServer {
    pub fn new(options: ServerOptions, state: SharedState) -> Self {
        Self {
            options: Arc::new(options),
            state,
        }
    }

    /// Bind and serve until the task is dropped. Returns the bound
    /// address through `on_bound` before entering the accept loop, which
    /// matters when port 0 asks the OS to pick one.
    pub async fn start(self, on_bound: impl FnOnce(std::net::SocketAddr)) -> Result<()> {
        let addr = format!("{}:{}", self.options.host, self.options.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| CliError::Server(format!("failed to bind to {addr}: {e}")))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| CliError::Server(format!("failed to read bound address: {e}")))?;
        on_bound(local_addr);

        let app = self.build_router();
        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::Server(format!("server error: {e}")))?;
        Ok(())
    }

    fn build_router(self) -> Router {
        let compress = self.options.compress;
        let ctx = ServeCtx {
            options: self.options,
            state: self.state,
        };

        let router = Router::new()
            .route("/__packline_events__", get(handle_sse))
            .route("/__packline_reload__.js", get(handle_reload_script))
            .route("/favicon.ico", get(handle_favicon))
            .fallback(handle_request)
            .with_state(ctx);

        if compress {
            router.layer(CompressionLayer::new())
        } else {
            router
        }
    }
}

/// SSE endpoint for reload events.
async fn handle_sse(
    State(ctx): State<ServeCtx>,
) -> Sse<impl tokio_stream::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>>
{
    use axum::response::sse::Event;

    let rx = ctx.state.register_client();
    tracing::debug!(clients = ctx.state.client_count(), "reload client connected");

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}

async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

async fn handle_favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Serve files from the output directory, with static_dir as a fallback.
async fn handle_request(State(ctx): State<ServeCtx>, uri: Uri) -> Response {
    let status = ctx.state.status();
    if let Some(error) = status.error() {
        return html_response(error_page(error));
    }

    let rel = uri.path().trim_start_matches('/');

    let mut candidates = Vec::new();
    if rel.is_empty() {
        candidates.push(ctx.options.root.join("index.html"));
    } else {
        candidates.push(ctx.options.root.join(rel));
        candidates.push(ctx.options.root.join(rel).join("index.html"));
    }
    if let Some(static_dir) = &ctx.options.static_dir {
        if rel.is_empty() {
            candidates.push(static_dir.join("index.html"));
        } else {
            candidates.push(static_dir.join(rel));
        }
    }

    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }
        match tokio::fs::read(&candidate).await {
            Ok(content) => return file_response(&candidate, content, ctx.options.hot),
            Err(e) => {
                tracing::warn!(file = %candidate.display(), error = %e, "failed to read file");
            }
        }
    }

    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        format!("File not found: {}", uri.path()),
    )
        .into_response()
}

fn file_response(path: &std::path::Path, content: Vec<u8>, hot: bool) -> Response {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let content_type = crate::emit::content_type_for(ext);

    let body = if hot && content_type == "text/html" {
        inject_reload_script(&content)
    } else {
        content
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn html_response(html: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(html))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Add the reload client before the closing body tag, or append when the
/// document has no body tag.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + SCRIPT_TAG.len() + 8);
        result.push_str(&html[..pos]);
        result.push_str("\n  ");
        result.push_str(SCRIPT_TAG);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    let mut result = html.into_owned();
    result.push('\n');
    result.push_str(SCRIPT_TAG);
    result.into_bytes()
}

/// Full-page error shown while the latest build is broken. The reload
/// client stays connected, so fixing the file swaps the page back.
fn error_page(error: &str) -> String {
    let escaped = error
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Build failed</title>\n<style>\n\
         body {{ background: #1e1e1e; color: #f44747; font-family: monospace; padding: 2rem; }}\n\
         pre {{ white-space: pre-wrap; color: #d4d4d4; }}\n\
         </style></head>\n<body>\n<h1>Build failed</h1>\n<pre>{escaped}</pre>\n  {SCRIPT_TAG}\n</body>\n</html>\n"
    )
}
