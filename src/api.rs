//! Upload and lookup handlers shared by every endpoint profile.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::asset::AudioAsset;
use crate::constants::{FILE_FIELD, LANGUAGE_FIELD, MISSING_FIELDS_MESSAGE, UPLOAD_SUCCESS_MESSAGE};
use crate::error::ApiError;
use crate::profile::EndpointProfile;
use crate::serve::AppState;
use crate::storage::LocalStorage;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub document_id: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub url: String,
}

/// A file already written to the upload directory for the current request
struct StoredFile {
    file_name: String,
    original_name: String,
}

#[derive(Default)]
struct UploadForm {
    file: Option<StoredFile>,
    language: Option<String>,
}

/// POST handler: store the `audioFile` part on disk and record it under `language`
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<Arc<EndpointProfile>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    state.storage.ensure_dir().await.map_err(|e| {
        ApiError::internal(format!(
            "Failed to create upload directory '{}': {}",
            state.storage.dir().display(),
            e
        ))
    })?;

    let multipart = multipart?;
    let mut form = UploadForm::default();
    if let Err(e) = read_upload_form(&state.storage, multipart, &mut form).await {
        discard_file(&state.storage, form.file.take()).await;
        return Err(e);
    }

    let (file, language) = match (form.file, form.language.filter(|l| !l.is_empty())) {
        (Some(file), Some(language)) => (file, language),
        (file, _) => {
            discard_file(&state.storage, file).await;
            return Err(ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()));
        }
    };

    let asset = AudioAsset::new(
        profile.normalize_language(&language),
        state.storage.url_for(&file.file_name),
        file.file_name,
        Some(file.original_name),
    );

    if let Err(e) = state.store.insert(profile.collection, &asset).await {
        spawn_orphan_cleanup(state.storage.clone(), asset.file_name.clone());
        return Err(ApiError::internal(format!(
            "Failed to insert into '{}': {}",
            profile.collection, e
        )));
    }

    info!(
        "[{}] stored {} for language '{}' (document {})",
        profile.route, asset.file_name, asset.language, asset.id
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            document_id: asset.id,
            url: asset.url,
        }),
    ))
}

/// Walk the multipart fields, streaming the first file part to disk and
/// keeping the first language value. `form.file` is set before the body is
/// streamed so the caller can remove a partially written file on error.
async fn read_upload_form(
    storage: &LocalStorage,
    mut multipart: Multipart,
    form: &mut UploadForm,
) -> Result<(), ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD && form.file.is_none() {
            // A part without a filename is a plain value, not a file
            let original_name = match field.file_name() {
                Some(file_name) if !file_name.is_empty() => file_name.to_string(),
                _ => continue,
            };

            let (file_name, mut file) = storage
                .create_unique(&original_name, Utc::now().timestamp_millis())
                .await?;
            form.file = Some(StoredFile {
                file_name,
                original_name,
            });

            while let Some(chunk) = field.chunk().await? {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
        } else if name == LANGUAGE_FIELD && form.language.is_none() {
            form.language = Some(field.text().await?);
        } else {
            debug!("Ignoring multipart field '{}'", name);
        }
    }

    Ok(())
}

async fn discard_file(storage: &LocalStorage, file: Option<StoredFile>) {
    if let Some(file) = file {
        if let Err(e) = storage.remove(&file.file_name).await {
            warn!("Failed to remove rejected upload '{}': {}", file.file_name, e);
        }
    }
}

/// Remove a file whose record could not be inserted, without delaying the response
fn spawn_orphan_cleanup(storage: LocalStorage, file_name: String) {
    tokio::spawn(async move {
        if let Err(e) = storage.remove(&file_name).await {
            warn!("Failed to clean up '{}' after database error: {}", file_name, e);
        }
    });
}

/// GET handler: resolve the profile's language parameter to a stored URL
pub async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<Arc<EndpointProfile>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<LookupResponse>, ApiError> {
    let mut values = params
        .iter()
        .filter(|(name, _)| name == profile.lookup_param)
        .map(|(_, value)| value.as_str());

    // Exactly one non-empty value; a repeated parameter is rejected
    let language = match (values.next(), values.next()) {
        (Some(value), None) if !value.is_empty() => value,
        _ => return Err(ApiError::BadRequest(profile.missing_param_message())),
    };

    info!("[{}] lookup for language: {}", profile.route, language);

    let asset = state
        .store
        .find_first(profile.collection, language, profile.match_policy)
        .await
        .map_err(|e| {
            ApiError::internal(format!("Failed to query '{}': {}", profile.collection, e))
        })?;

    match asset {
        Some(asset) => {
            debug!("[{}] found {} ({})", profile.route, asset.url, asset.id);
            Ok(Json(LookupResponse { url: asset.url }))
        }
        None => {
            info!("[{}] no audio file for language: {}", profile.route, language);
            Err(ApiError::NotFound)
        }
    }
}

/// Fallback for methods other than GET and POST on a profile route
pub async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET, POST")],
        format!("Method {} Not Allowed", method),
    )
        .into_response()
}
