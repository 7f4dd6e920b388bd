//! The fixed-order request pipeline: CORS, logger,
//! workspace route overlay, import-map injection, transform middleware,
//! static file server, and the `/__livereload` WebSocket endpoint.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::reload;
use crate::state::ServerState;
use crate::transform;

pub type HandlerOutput = Result<Response<UnsyncBoxBody<Bytes, Infallible>>, anyhow::Error>;

pub async fn dispatch(req: Request<Incoming>, state: Arc<ServerState>) -> HandlerOutput {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = route(req, &state).await;
    apply_cors(&mut response);

    if !state.options.quiet {
        let status = response.as_ref().map(|r| r.status().as_u16()).unwrap_or(500);
        tracing::info!(%method, %path, status, elapsed_ms = start.elapsed().as_millis() as u64, "request");
    }
    response
}

async fn route(req: Request<Incoming>, state: &Arc<ServerState>) -> HandlerOutput {
    if req.method() == Method::OPTIONS {
        return Ok(empty_response(StatusCode::NO_CONTENT));
    }

    let raw_path = req.uri().path().to_string();

    if raw_path == "/__livereload" {
        return reload::handle_upgrade(req, state.broadcaster.clone());
    }

    if raw_path.ends_with("/custom-elements.json") || raw_path == format!("/{}", state.manifest_path) {
        return serve_manifest(state);
    }

    let resolved_path = resolve_demo_overlay(state, &raw_path);
    let rel = resolved_path.trim_start_matches('/').to_string();

    if let Some(kind) = transform::classify(&rel, &state.options) {
        return serve_transformed(state, kind, &rel).await;
    }

    serve_static(state, &rel, &resolved_path).await
}

/// Step 3 of the pipeline: rewrites a request for a demo's canonical URL
/// to the source HTML file it was discovered from, so the rest of the
/// pipeline (import-map injection, static serving) operates on a real
/// on-disk path.
fn resolve_demo_overlay(state: &Arc<ServerState>, path: &str) -> String {
    let index = state.demo_index.load();
    match index.get(path) {
        Some(source) => format!("/{source}"),
        None => path.to_string(),
    }
}

fn serve_manifest(state: &Arc<ServerState>) -> HandlerOutput {
    let package = state.manifest.load();
    let body = package.to_json_string().unwrap_or_else(|_| "{}".to_string());
    Ok(json_response(StatusCode::OK, body))
}

async fn serve_transformed(state: &Arc<ServerState>, kind: transform::Kind, rel: &str) -> HandlerOutput {
    match transform::run(kind, &state.root(), rel, &state.options.target, &state.transform_cache).await {
        Ok(compiled) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, HeaderValue::from_static(compiled.mime))
            .body(boxed(compiled.code.into_bytes()))?),
        Err(err) => Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))
            .body(boxed(err.to_string().into_bytes()))?),
    }
}

/// HTML responses are read directly off disk so the import map can be
/// spliced into the markup (step 4); every other static asset is served
/// through `tower_http::services::ServeDir`, rooted at the project root.
async fn serve_static(state: &Arc<ServerState>, rel: &str, request_path: &str) -> HandlerOutput {
    if request_path.ends_with(".html") || request_path.ends_with('/') {
        let abs = state.root().join(rel.trim_end_matches('/'));
        let abs = if abs.is_dir() { abs.join("index.html") } else { abs };
        let Ok(bytes) = tokio::fs::read(&abs).await else {
            return Ok(empty_response(StatusCode::NOT_FOUND));
        };
        let html = String::from_utf8_lossy(&bytes).into_owned();
        let injected = inject_import_map(&html, &state.import_map.load());
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"))
            .body(boxed(injected.into_bytes()))?);
    }

    let service = ServeDir::new(state.root());
    let req = Request::builder().method(Method::GET).uri(format!("/{rel}")).body(Empty::<Bytes>::new())?;
    let response = service
        .oneshot(req)
        .await
        .map_err(|e| anyhow::anyhow!("static file service error: {e}"))?;
    let (parts, body) = response.into_parts();
    let bytes = body
        .collect()
        .await
        .map_err(|e| anyhow::anyhow!("reading static file body: {e}"))?
        .to_bytes();
    Ok(Response::from_parts(parts, boxed(bytes.to_vec())))
}

/// Step 4: inserts `<script type="importmap">` into `<head>` before the
/// first `<script>` tag.
fn inject_import_map(html: &str, import_map: &crate::import_map::ImportMap) -> String {
    let tag = import_map.to_script_tag();
    match html.find("<script") {
        Some(index) => format!("{}{}{}", &html[..index], tag, &html[index..]),
        None => match html.find("</head>") {
            Some(index) => format!("{}{}{}", &html[..index], tag, &html[index..]),
            None => html.to_string(),
        },
    }
}

fn apply_cors(response: &mut HandlerOutput) {
    if let Ok(response) = response {
        let headers = response.headers_mut();
        headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
        headers.insert("access-control-allow-methods", HeaderValue::from_static("GET, POST, OPTIONS"));
    }
}

fn json_response(status: StatusCode, body: String) -> Response<UnsyncBoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(boxed(body.into_bytes()))
        .expect("building a response from a static status and headers never fails")
}

fn empty_response(status: StatusCode) -> Response<UnsyncBoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .body(boxed(Vec::new()))
        .expect("building a response from a static status never fails")
}

fn boxed(bytes: Vec<u8>) -> UnsyncBoxBody<Bytes, Infallible> {
    Full::new(Bytes::from(bytes)).map_err(|never: Infallible| match never {}).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_importmap_before_first_script_tag() {
        let html = "<html><head><title>x</title><script type=\"module\" src=\"a.js\"></script></head></html>";
        let map = crate::import_map::ImportMap::default();
        let out = inject_import_map(html, &map);
        let importmap_pos = out.find("importmap").unwrap();
        let script_pos = out.find("src=\"a.js\"").unwrap();
        assert!(importmap_pos < script_pos);
    }

    #[test]
    fn falls_back_to_head_close_when_no_script_tag() {
        let html = "<html><head></head><body></body></html>";
        let map = crate::import_map::ImportMap::default();
        let out = inject_import_map(html, &map);
        assert!(out.find("importmap").unwrap() < out.find("</head>").unwrap());
    }

}
