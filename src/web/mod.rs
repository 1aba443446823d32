//! Embedded compliance dashboard.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) serving:
//! - the single-page dashboard + floating assistant panel
//! - JSON API: stored results, emissions, health, report download
//! - proxies to the remote validator (validate / chat / recommendations) so
//!   the frontend never makes a cross-origin call
//!
//! Launched via `attest dash` (default: `http://127.0.0.1:9610`).

pub mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::api::ApiClient;
use crate::store::ValidationStore;

/// Everything the handlers need, owned by the server for its lifetime.
/// Handlers receive it by reference — no free-floating module state.
pub struct ServerContext {
    pub client: ApiClient,
    pub store: ValidationStore,
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread and handles requests sequentially (sufficient
/// for a local single-user dashboard). Per-request errors become JSON 500s
/// without taking the server down.
pub fn serve(addr: &str, open_browser: bool, ctx: ServerContext) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("attest dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open_browser {
        let _ = launch_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let result = dispatch(&ctx, &method, &url, body.as_deref());

        match result {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                let resp = Response::from_data(body.into_bytes())
                    .with_header(content_type_json())
                    .with_status_code(StatusCode(500));
                let _ = request.respond(resp);
            }
        }

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    ctx: &ServerContext,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API — stored data (legacy unprefixed paths kept for older panels)
        (&Method::Get, "/api/results") | (&Method::Get, "/results") => api::get_results(ctx),
        (&Method::Get, "/api/emissions") | (&Method::Get, "/emissions") => {
            api::get_emissions(ctx)
        }
        (&Method::Post, "/api/validation/store") => {
            api::post_store(ctx, body.unwrap_or("{}"))
        }

        // API — remote proxies
        (&Method::Post, "/api/validate") => api::post_validate(ctx, body.unwrap_or("{}")),
        (&Method::Post, "/api/chat") => api::post_chat(ctx, body.unwrap_or("{}")),
        (&Method::Post, "/api/recommendations") => {
            api::post_recommend(ctx, body.unwrap_or("{}"))
        }

        // API — misc
        (&Method::Get, "/api/health") => api::get_health(ctx),
        (&Method::Get, "/report/download") => api::get_report(ctx),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend with the shared rule tables and
/// demo dataset baked in.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    let html = frontend::render();
    Response::from_data(html.into_bytes())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
pub(crate) fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn launch_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
