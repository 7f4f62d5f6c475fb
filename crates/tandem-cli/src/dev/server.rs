//! Development server with live reload via Server-Sent Events.
//!
//! Serves the output directory, the published manifest, and an SSE endpoint
//! for push-based reload notifications. Pure view layer: it never triggers
//! builds itself, it only reflects what the scheduler has published.

use crate::dev::SharedState;
use crate::error::{CliError, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response, Sse},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::Component;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Development server.
pub struct DevServer {
    /// Bound socket address
    addr: SocketAddr,
    /// Shared application state
    state: SharedState,
}

impl DevServer {
    /// Create a development server on `port`, or the next free port above it.
    ///
    /// # Errors
    ///
    /// Returns an error if no port in `port..=port + 10` can be bound.
    pub fn new(port: u16, state: SharedState) -> Result<Self> {
        let addr = Self::find_available_port(port)?;
        Ok(Self { addr, state })
    }

    /// The URL clients should open.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Start serving. Runs until the task is dropped or the listener fails.
    pub async fn start(self) -> Result<()> {
        let addr = self.addr;
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Build the axum router with all routes.
    fn build_router(self) -> Router {
        Router::new()
            // SSE endpoint for reload events
            .route("/__tandem_events__", get(handle_sse))
            // Reload client script
            .route("/__tandem_reload__.js", get(handle_reload_script))
            // The published manifest, always the latest snapshot
            .route("/manifest.json", get(handle_manifest))
            // Favicon handler to prevent 404s
            .route("/favicon.ico", get(handle_favicon))
            // All other routes serve the output directory
            .fallback(handle_request)
            .layer(CompressionLayer::new())
            .layer(
                // CORS: allow all origins for dev
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self.state)
    }

    /// Try the requested port, then the next 10 above it.
    fn find_available_port(requested_port: u16) -> Result<SocketAddr> {
        use std::net::TcpListener;

        let addr = SocketAddr::from(([127, 0, 0, 1], requested_port));
        if TcpListener::bind(addr).is_ok() {
            return Ok(addr);
        }

        for offset in 1..=10 {
            let port = requested_port.saturating_add(offset);
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            if TcpListener::bind(addr).is_ok() {
                crate::ui::warning(&format!(
                    "Port {} is busy, using port {} instead",
                    requested_port, port
                ));
                return Ok(addr);
            }
        }

        Err(CliError::Server(format!(
            "No available port found in range {}..={}",
            requested_port,
            requested_port.saturating_add(10)
        )))
    }
}

/// Handle SSE connections for reload events.
async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<
    impl tokio_stream::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>,
> {
    use axum::response::sse::Event;

    let (id, rx) = state.register_client();
    tracing::debug!(client = id, "SSE client connected");

    state
        .broadcast(&crate::dev::DevEvent::ClientConnected { id })
        .await;

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}

/// Serve the reload client script.
async fn handle_reload_script() -> impl IntoResponse {
    const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/javascript")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(RELOAD_SCRIPT))
        .unwrap()
}

/// Serve the current manifest snapshot.
async fn handle_manifest(State(state): State<SharedState>) -> Response {
    match state.manifest_json() {
        Ok(json) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Body::from(json))
            .unwrap(),
        Err(e) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(e.to_string()))
            .unwrap(),
    }
}

/// Handle favicon requests with 204 No Content.
async fn handle_favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Serve files from the output directory, with reload injection for HTML
/// and an error page while the last build is broken.
async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let path = uri.path();

    // A broken build shows the error, not a stale page
    if let Some(error) = state.get_status().error() {
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Body::from(error_page(error)))
            .unwrap();
    }

    let rel = std::path::Path::new(path.trim_start_matches('/'));
    // `..` segments must never escape the output directory
    if rel.components().any(|c| matches!(c, Component::ParentDir)) {
        return not_found(path);
    }
    let file_path = if rel.as_os_str().is_empty() {
        state.out_dir().join("static").join("index.html")
    } else {
        state.out_dir().join(rel)
    };

    if file_path.is_file() {
        match tokio::fs::read(&file_path).await {
            Ok(content) => {
                let content_type = determine_content_type(&file_path.to_string_lossy());
                let body = if content_type.starts_with("text/html") {
                    inject_reload_script(&content)
                } else {
                    content
                };
                return Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, content_type)
                    .header(header::CACHE_CONTROL, "no-cache")
                    .body(Body::from(body))
                    .unwrap();
            }
            Err(e) => {
                crate::ui::warning(&format!(
                    "Failed to read file {}: {}",
                    file_path.display(),
                    e
                ));
            }
        }
    }

    not_found(path)
}

fn not_found(path: &str) -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(format!("File not found: {}", path)))
        .unwrap()
}

/// Add the reload client script before the closing </body> tag, or append
/// it when there is none.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);
    let script_tag = r#"<script src="/__tandem_reload__.js"></script>"#;

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 10);
        result.push_str(&html[..pos]);
        result.push_str("\n  ");
        result.push_str(script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    let mut result = html.to_string();
    result.push('\n');
    result.push_str(script_tag);
    result.into_bytes()
}

/// Minimal error page shown while the last rebuild is failing. Keeps the
/// reload client attached so a fixing save refreshes automatically.
fn error_page(error: &str) -> String {
    let escaped = error
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Build failed</title>\n\
         <style>body{{background:#1e1e1e;color:#ddd;font-family:monospace;padding:2rem}}\
         h1{{color:#ff5f56}}pre{{white-space:pre-wrap;background:#2a2a2a;padding:1rem;\
         border-radius:4px}}</style></head>\n\
         <body><h1>Build failed</h1><pre>{}</pre>\n\
         <script src=\"/__tandem_reload__.js\"></script>\n</body>\n</html>\n",
        escaped
    )
}

/// Determine content type from file extension.
fn determine_content_type(path: &str) -> &'static str {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "wasm" => "application/wasm",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}
