//! File manager endpoints.
//!
//! Every handler runs its store call on the blocking pool; the store itself is synchronous.

use crate::{auth::Tenant, error::ApiError, extract::JsonBody, AppState};
use api_shared::{
    DirQuery, ErrorRes, ListFilesRes, MkdirReq, MkdirRes, OkRes, RenameReq, TransferReq,
    UploadRes,
};
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use panel_core::panel_files::{DownloadTarget, FilesError, FilesResult, TenantFiles};
use panel_core::UploadPayload;
use tokio_util::io::ReaderStream;

const OCTET_STREAM: &str = "application/octet-stream";

/// Runs `op` against the tenant's files on the blocking pool.
async fn with_files<T, F>(state: &AppState, tenant: Tenant, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&TenantFiles) -> FilesResult<T> + Send + 'static,
    T: Send + 'static,
{
    let files = state.storage.files(tenant.0);
    Ok(tokio::task::spawn_blocking(move || op(&files)).await??)
}

/// Wildcard captures may carry leading or trailing slashes.
fn trim_slashes(path: &str) -> String {
    path.trim_matches('/').to_owned()
}

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Tenant root listing", body = ListFilesRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// List the tenant root.
#[axum::debug_handler]
pub(crate) async fn list_root(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<ListFilesRes>, ApiError> {
    let listing = with_files(&state, tenant, |files| files.list("")).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    get,
    path = "/api/files/{path}",
    params(("path" = String, Path, description = "Directory relative to the tenant root")),
    responses(
        (status = 200, description = "Directory listing", body = ListFilesRes),
        (status = 400, description = "Path escapes the tenant root or is a file", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// List a directory, creating it if it does not exist yet.
#[axum::debug_handler]
pub(crate) async fn list(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<String>,
) -> Result<Json<ListFilesRes>, ApiError> {
    let rel = trim_slashes(&path);
    let listing = with_files(&state, tenant, move |files| files.list(&rel)).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    post,
    path = "/api/files/upload",
    params(("dir" = Option<String>, Query, description = "Target directory; the root when absent")),
    responses(
        (status = 201, description = "File stored", body = UploadRes),
        (status = 400, description = "No file part, bad name or bad directory", body = ErrorRes),
        (status = 413, description = "Upload exceeds the configured limit"),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Store the multipart field `file` in `dir` under its client-supplied name.
///
/// An existing file with the same name is overwritten.
#[axum::debug_handler]
pub(crate) async fn upload(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<DirQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or(FilesError::UnsupportedPayload)?;
        let bytes = field.bytes().await?;

        let dir = query.dir;
        let saved = with_files(&state, tenant, move |files| {
            files.save_upload(&dir, &file_name, UploadPayload::Memory(bytes.to_vec()))
        })
        .await?;
        return Ok((
            StatusCode::CREATED,
            Json(UploadRes {
                filename: saved.to_string(),
            }),
        ));
    }
    Err(ApiError::BadRequest("No file uploaded"))
}

#[utoipa::path(
    post,
    path = "/api/files/mkdir",
    params(("dir" = Option<String>, Query, description = "Parent directory; the root when absent")),
    request_body = MkdirReq,
    responses(
        (status = 201, description = "Folder exists", body = MkdirRes),
        (status = 400, description = "Missing or invalid name", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Create a folder; creating one that already exists succeeds.
#[axum::debug_handler]
pub(crate) async fn mkdir(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<DirQuery>,
    JsonBody(req): JsonBody<MkdirReq>,
) -> Result<(StatusCode, Json<MkdirRes>), ApiError> {
    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Folder name is required"));
    }
    let name = with_files(&state, tenant, move |files| {
        files.make_directory(&query.dir, &req.name)
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(MkdirRes {
            name: name.to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/files/rename",
    request_body = RenameReq,
    responses(
        (status = 200, description = "Renamed", body = OkRes),
        (status = 400, description = "Missing fields or invalid name", body = ErrorRes),
        (status = 404, description = "Source does not exist", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn rename(
    State(state): State<AppState>,
    tenant: Tenant,
    JsonBody(req): JsonBody<RenameReq>,
) -> Result<Json<OkRes>, ApiError> {
    if req.path.is_empty() || req.new_name.is_empty() {
        return Err(ApiError::BadRequest("path and newName are required"));
    }
    with_files(&state, tenant, move |files| {
        files.rename(&req.path, &req.new_name)
    })
    .await?;
    Ok(Json(OkRes::ok()))
}

#[utoipa::path(
    post,
    path = "/api/files/move",
    request_body = TransferReq,
    responses(
        (status = 200, description = "Moved", body = OkRes),
        (status = 400, description = "Missing source or invalid destination", body = ErrorRes),
        (status = 404, description = "Source does not exist", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Move an entry into `toDir`, creating the directory when needed.
#[axum::debug_handler]
pub(crate) async fn move_entry(
    State(state): State<AppState>,
    tenant: Tenant,
    JsonBody(req): JsonBody<TransferReq>,
) -> Result<Json<OkRes>, ApiError> {
    if req.from.is_empty() {
        return Err(ApiError::BadRequest("from is required"));
    }
    with_files(&state, tenant, move |files| {
        files.move_entry(&req.from, &req.to_dir)
    })
    .await?;
    Ok(Json(OkRes::ok()))
}

#[utoipa::path(
    post,
    path = "/api/files/copy",
    request_body = TransferReq,
    responses(
        (status = 200, description = "Copied", body = OkRes),
        (status = 400, description = "Missing source or invalid destination", body = ErrorRes),
        (status = 404, description = "Source does not exist", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Copy an entry (recursively for folders) into `toDir`.
#[axum::debug_handler]
pub(crate) async fn copy_entry(
    State(state): State<AppState>,
    tenant: Tenant,
    JsonBody(req): JsonBody<TransferReq>,
) -> Result<Json<OkRes>, ApiError> {
    if req.from.is_empty() {
        return Err(ApiError::BadRequest("from is required"));
    }
    with_files(&state, tenant, move |files| {
        files.copy_entry(&req.from, &req.to_dir)
    })
    .await?;
    Ok(Json(OkRes::ok()))
}

#[utoipa::path(
    get,
    path = "/api/files/download/{path}",
    params(("path" = String, Path, description = "File relative to the tenant root")),
    responses(
        (status = 200, description = "File content as an attachment"),
        (status = 400, description = "Path is a directory or escapes the tenant root", body = ErrorRes),
        (status = 404, description = "File does not exist", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Stream a file to the client as an attachment.
#[axum::debug_handler]
pub(crate) async fn download(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let rel = trim_slashes(&path);
    let (target, mime) = with_files(&state, tenant, move |files| {
        let target = files.open_for_download(&rel)?;
        let mime = sniff_mime(&target);
        Ok((target, mime))
    })
    .await?;

    let file = tokio::fs::File::open(&target.path)
        .await
        .map_err(FilesError::from)?;
    let disposition = content_disposition(&target.file_name)?;

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(mime)),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/files/{path}",
    params(("path" = String, Path, description = "Entry relative to the tenant root")),
    responses(
        (status = 204, description = "Entry no longer exists"),
        (status = 400, description = "Path missing or escapes the tenant root", body = ErrorRes),
        (status = 401, description = "Missing or invalid token", body = ErrorRes)
    )
)]
/// Delete a file or folder recursively. Deleting something already gone succeeds.
#[axum::debug_handler]
pub(crate) async fn remove(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<String>,
) -> Result<StatusCode, ApiError> {
    let rel = trim_slashes(&path);
    with_files(&state, tenant, move |files| files.remove(&rel)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/files/` names no entry; the tenant root itself is never deleted.
#[axum::debug_handler]
pub(crate) async fn remove_root(
    State(_state): State<AppState>,
    _tenant: Tenant,
) -> Result<StatusCode, ApiError> {
    Err(FilesError::PathRequired.into())
}

fn sniff_mime(target: &DownloadTarget) -> &'static str {
    match infer::get_from_path(&target.path) {
        Ok(Some(kind)) => kind.mime_type(),
        Ok(None) => OCTET_STREAM,
        Err(e) => {
            tracing::debug!("could not sniff {}: {}", target.file_name, e);
            OCTET_STREAM
        }
    }
}

fn content_disposition(file_name: &str) -> Result<HeaderValue, ApiError> {
    let safe: String = file_name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();
    HeaderValue::from_bytes(format!("attachment; filename=\"{}\"", safe).as_bytes()).map_err(|e| {
        tracing::error!("invalid content disposition for {:?}: {}", file_name, e);
        ApiError::Internal
    })
}
