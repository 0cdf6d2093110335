//! HTTP handlers for the termo API

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use placeholder_engine::{extract_from_template, seed_values, FieldValues};
use shared_types::{ExportRecord, ResolvedDocument, VersionEntry};
use termo_core::{assemble, assemble_resolved, clean_signer_text, filename, render_pdf};

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Cookie set by a successful admin login
pub const ADMIN_COOKIE: &str = "adm_ok";

/// Admin sessions last eight hours
const ADMIN_COOKIE_MAX_AGE: u64 = 8 * 60 * 60;

const EXPORT_ID_HEADER: HeaderName = HeaderName::from_static("x-export-id");

/// Run store access or rendering off the async workers.
///
/// The JSON store does blocking file I/O and may wait on another
/// process's lock on the data directory.
async fn blocking<T, F>(state: &Arc<AppState>, task: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || task(&state))
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Current template and the version it matches
pub async fn get_template(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let (template, current_id) =
        blocking(&state, |state| Ok(state.versions.current_with_active()?)).await?;
    Ok(Json(TemplateResponse {
        template,
        current_id,
    }))
}

/// Save the editor's template as current and as a new version
pub async fn put_template(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TemplatePayload>,
) -> Result<Json<EntryResponse>, ApiError> {
    let template = payload.into_template();
    let entry = blocking(&state, move |state| Ok(state.versions.save(template)?)).await?;
    Ok(Json(EntryResponse { ok: true, entry }))
}

pub async fn get_placeholders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlaceholdersResponse>, ApiError> {
    let template = blocking(&state, |state| Ok(state.versions.current()?)).await?;
    let placeholders = extract_from_template(&template);
    let values = seed_values(&placeholders, &FieldValues::new());
    Ok(Json(PlaceholdersResponse {
        placeholders,
        values,
    }))
}

pub async fn list_versions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VersionsResponse>, ApiError> {
    let (current_id, versions) = blocking(&state, |state| {
        Ok((state.versions.active_id()?, state.versions.list()?))
    })
    .await?;
    Ok(Json(VersionsResponse {
        current_id,
        versions,
    }))
}

pub async fn get_version(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VersionEntry>, ApiError> {
    let entry = blocking(&state, move |state| Ok(state.versions.get(&id)?)).await?;
    Ok(Json(entry))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VersionEntry>>, ApiError> {
    let history = blocking(&state, |state| Ok(state.versions.history()?)).await?;
    Ok(Json(history))
}

/// Make an older version current again; the revert is itself a new version
pub async fn revert_version(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = blocking(&state, move |state| Ok(state.versions.revert(&req.id)?)).await?;
    Ok(Json(EntryResponse { ok: true, entry }))
}

/// Delete a version. The active version cannot be deleted.
pub async fn delete_version(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    blocking(&state, move |state| {
        state.versions.get(&req.id)?;

        if state.versions.active_id()?.as_deref() == Some(req.id.as_str()) {
            return Err(ApiError::Conflict(format!(
                "Version {} is the current template",
                req.id
            )));
        }

        Ok(state.versions.delete(&req.id)?)
    })
    .await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Resolve the current template without producing a document
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValuesRequest>,
) -> Result<Response, ApiError> {
    let template = blocking(&state, |state| Ok(state.versions.current()?)).await?;
    let signer1 = clean_signer_text(&template.signer1);
    let signer2 = clean_signer_text(&template.signer2);
    let resolver = &state.resolver;
    let values = &req.values;

    let mut unresolved: Vec<&str> = Vec::new();
    for text in [
        template.title.as_str(),
        template.body.as_str(),
        signer1.as_str(),
        signer2.as_str(),
    ] {
        for key in resolver.unresolved_keys(text, values) {
            if !unresolved.contains(&key) {
                unresolved.push(key);
            }
        }
    }

    let response = PreviewResponse {
        title: resolver.segments(&template.title, values),
        body: resolver.segments(&template.body, values),
        signer1: resolver.segments(&signer1, values),
        signer2: resolver.segments(&signer2, values),
        filename: filename(&resolver.resolve(&template.title, values)),
        unresolved,
    };
    Ok(Json(&response).into_response())
}

/// Resolve the current template, log the export and return the PDF
pub async fn render(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValuesRequest>,
) -> Result<Response, ApiError> {
    let (record, filename, bytes) = blocking(&state, move |state| {
        let template = state.versions.current()?;
        let document = assemble(&template, &req.values, &state.resolver, &state.setup);
        let record = state.exports.record(document.record.clone())?;
        let bytes = render_pdf(&document.page, &state.setup)?;
        Ok((record, document.filename, bytes))
    })
    .await?;

    tracing::info!(
        export_id = %record.id,
        filename = %filename,
        bytes = bytes.len(),
        "Rendered document"
    );
    Ok(pdf_response(bytes, &filename, Some(&record.id)))
}

/// Export log, newest first
pub async fn list_downloads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExportRecord>>, ApiError> {
    require_admin(&state, &headers)?;
    let exports = blocking(&state, |state| Ok(state.exports.list()?)).await?;
    Ok(Json(exports))
}

/// Log a document that was resolved and rendered by the client
pub async fn record_download(
    State(state): State<Arc<AppState>>,
    Json(document): Json<ResolvedDocument>,
) -> Result<Json<ExportResponse>, ApiError> {
    let entry = blocking(&state, move |state| Ok(state.exports.record(document)?)).await?;
    Ok(Json(ExportResponse { ok: true, entry }))
}

/// Render a logged export again from its resolved fields
pub async fn download_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    require_admin(&state, &headers)?;

    let (filename, bytes) = blocking(&state, move |state| {
        let record = state.exports.get(&id)?;
        if let Err(reason) = record.verify() {
            tracing::warn!(id = %record.id, "Export record failed verification: {}", reason);
        }

        let document = assemble_resolved(&record.document, &state.setup);
        let bytes = render_pdf(&document.page, &state.setup)?;
        Ok((document.filename, bytes))
    })
    .await?;

    Ok(pdf_response(bytes, &filename, None))
}

pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    match state.admin_code.as_deref() {
        Some(code) if !code.is_empty() && code == req.code => {
            tracing::info!("Admin login");
            let cookie = format!(
                "{}=1; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
                ADMIN_COOKIE, ADMIN_COOKIE_MAX_AGE
            );
            Ok((
                [(header::SET_COOKIE, cookie)],
                Json(AuthResponse { auth: true }),
            )
                .into_response())
        }
        _ => {
            tracing::warn!("Rejected admin login");
            Err(ApiError::Unauthorized)
        }
    }
}

pub async fn admin_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<AuthResponse> {
    Json(AuthResponse {
        auth: is_admin(&state, &headers),
    })
}

pub async fn admin_logout() -> Response {
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        ADMIN_COOKIE
    );
    (
        [(header::SET_COOKIE, cookie)],
        Json(OkResponse { ok: true }),
    )
        .into_response()
}

/// Whether the request carries the admin cookie.
///
/// Admin access is off entirely when no admin code is configured.
pub fn is_admin(state: &AppState, headers: &HeaderMap) -> bool {
    if state.admin_code.as_deref().map_or(true, str::is_empty) {
        return false;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name.trim() == ADMIN_COOKIE && value.trim() == "1")
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if is_admin(state, headers) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn pdf_response(bytes: Vec<u8>, filename: &str, export_id: Option<&str>) -> Response {
    let disposition = content_disposition(filename);
    match export_id {
        Some(id) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
                (EXPORT_ID_HEADER, id.to_string()),
            ],
            bytes,
        )
            .into_response(),
        None => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            bytes,
        )
            .into_response(),
    }
}

/// `attachment` disposition with an ASCII fallback name and the UTF-8 name
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|ch| {
            if ch.is_ascii_graphic() && ch != '"' && ch != '\\' {
                ch
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
