//! HTTP routes for the web server.

use axum::{
    body::Body,
    extract::{
        multipart::Field, ConnectInfo, DefaultBodyLimit, Multipart, Path, Request, State,
    },
    http::{header, HeaderMap, StatusCode, Uri},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::assets::{content_type, StaticAssets};
use super::devices::DeviceTracker;
use super::error::AppResult;
use super::templates::{FileView, IndexView, TemplateEngine};
use crate::qr;
use crate::storage::{StorageError, UploadDir};

/// Cap on the whole request body, which bounds the size of a single upload.
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// Shared application state.
pub struct AppState {
    pub upload_dir: UploadDir,
    /// URL other devices use to reach the server, encoded into the QR code.
    pub server_url: String,
    pub devices: DeviceTracker,
    pub template_engine: TemplateEngine,
}

/// Build the router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload_handler))
        .route("/download/*filename", get(download_handler))
        .route("/assets/*path", get(assets_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_device))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Record the caller's address before any route runs.
async fn track_device(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(ConnectInfo(addr)) = connect_info {
        let ip = addr.ip().to_canonical();
        if state.devices.record(ip).await {
            info!(%ip, "New device connected");
        }
    }
    next.run(request).await
}

/// Handler for the home page.
async fn index_handler(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let files = state.upload_dir.list_files().unwrap_or_else(|e| {
        error!(error = %e, "Failed to list upload directory");
        Vec::new()
    });

    let view = IndexView {
        server_url: state.server_url.clone(),
        qr_data: qr::encode_png_base64(&state.server_url)?,
        files: files.iter().map(FileView::from).collect(),
        devices: state
            .devices
            .snapshot()
            .await
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    Ok(Html(state.template_engine.render_index(&view)?))
}

/// Handler for multipart uploads.
///
/// A request without a usable `file` field is sent back where it came from.
async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let client_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Ok(redirect_back(&headers)),
        };

        let (name, path) = state.upload_dir.upload_path(&client_name)?;
        let written = write_field(field, &path).await?;
        info!(file = %name, bytes = written, "Stored upload");

        return Ok(found("/"));
    }

    Ok(redirect_back(&headers))
}

/// Stream a multipart field to disk, replacing any existing file.
async fn write_field(mut field: Field<'_>, path: &std::path::Path) -> AppResult<u64> {
    let mut file = File::create(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;
    let mut total = 0u64;

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        total += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| StorageError::io(path, e))?;
    Ok(total)
}

/// Handler for file downloads.
async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let path = state.upload_dir.existing_file(&filename)?;
    let file = File::open(&path)
        .await
        .map_err(|e| StorageError::io(&path, e))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| StorageError::io(&path, e))?
        .len();

    let name = std::path::Path::new(&filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.clone());
    info!(file = %name, bytes = len, "Serving download");

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&name)),
            (header::CONTENT_DISPOSITION, content_disposition(&name)),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        body,
    )
        .into_response())
}

/// Handler for static assets.
async fn assets_handler(Path(path): Path<String>) -> Response {
    match StaticAssets::get(&path) {
        Some(file) => (
            [(header::CONTENT_TYPE, content_type(&path))],
            file.data.into_owned(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Build an attachment `Content-Disposition` value.
///
/// Non-ASCII names are carried in `filename*`; the plain `filename` gets an
/// ASCII-only fallback so the header value stays valid.
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}

/// A `302 Found` redirect.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Redirect to the path of the `Referer`, or to the home page.
///
/// Only a local path from the referer is kept, so the redirect never
/// leaves this server.
fn redirect_back(headers: &HeaderMap) -> Response {
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|p| is_local_path(p))
        .unwrap_or_else(|| "/".to_string());
    found(&target)
}

/// Whether `path` is a path on this server rather than a scheme-relative
/// URL such as `//host/x` or `/\\host/x`.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}
