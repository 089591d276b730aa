//! Request path → file response

use std::path::{Path, PathBuf};

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode};
use percent_encoding::percent_decode_str;

pub(super) const NOT_FOUND_BODY: &str = "404: File Not Found";

/// Why a request could not be answered with a file. Never leaves this
/// module except as a 404.
#[derive(Debug, thiserror::Error)]
pub(super) enum AssetReadError {
    #[error("path is not valid UTF-8 after decoding")]
    BadPath,

    #[error("{} is outside the served root", .0.display())]
    OutsideRoot(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Build the response for one request path.
pub(super) async fn respond(root: &Path, request_path: &str) -> Response<Full<Bytes>> {
    match read_asset(root, request_path).await {
        Ok((path, data)) => {
            tracing::debug!("request {} -> 200 ({} bytes)", request_path, data.len());
            response(StatusCode::OK, content_type_for(&path), data)
        }
        Err(e) => {
            tracing::debug!("request {} -> 404 ({})", request_path, e);
            response(
                StatusCode::NOT_FOUND,
                "text/plain; charset=utf-8",
                NOT_FOUND_BODY,
            )
        }
    }
}

/// Resolve `request_path` under `root` and read it.
///
/// `root` must already be canonical. The target is canonicalized too, so
/// `..` segments and symlinks that lead out of `root` are refused.
pub(super) async fn read_asset(
    root: &Path,
    request_path: &str,
) -> Result<(PathBuf, Vec<u8>), AssetReadError> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| AssetReadError::BadPath)?;
    let relative = decoded.trim_start_matches('/');

    let resolved = tokio::fs::canonicalize(root.join(relative)).await?;
    if !resolved.starts_with(root) {
        return Err(AssetReadError::OutsideRoot(resolved));
    }

    let data = tokio::fs::read(&resolved).await?;
    Ok((resolved, data))
}

/// MIME type for a served file, from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "wasm" => "application/wasm",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

fn response(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
