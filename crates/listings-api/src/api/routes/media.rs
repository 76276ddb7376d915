//! Media route handlers

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::types::{MediaResponse, MessageResponse, UploadResponse},
    error::{Error, Result},
    listings::ListingCategory,
    media::UploadRequest,
    server::AppState,
};

/// Upload photos and videos, optionally attaching them to a listing
///
/// Multipart fields: `mediaFiles` (repeated), `mediaData` (JSON array of
/// per-file metadata keyed by file name) and `propertyId`.
#[utoipa::path(
    post,
    path = "/api/v1/media/{category}/upload",
    params(("category" = String, Path, description = "Listing category slug")),
    responses(
        (status = 200, description = "Files stored", body = UploadResponse),
        (status = 400, description = "No files or unsupported file type", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
        (status = 502, description = "Object store failure", body = crate::error::ErrorResponse),
    ),
    tag = "media",
)]
pub async fn upload_media(
    State(state): State<AppState>,
    Path(category): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let category: ListingCategory = category.parse()?;
    let request =
        UploadRequest::from_multipart(multipart, state.config.media.max_file_size).await?;

    let outcome = state.media.upload(category, request).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: format!(
            "Successfully uploaded {} media files",
            outcome.media_items.len()
        ),
        data: outcome,
    }))
}

/// Media section of a listing
#[utoipa::path(
    get,
    path = "/api/v1/media/{category}/{property_id}",
    params(
        ("category" = String, Path, description = "Listing category slug"),
        ("property_id" = String, Path, description = "Property ID"),
    ),
    responses(
        (status = 200, description = "Media section", body = MediaResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
    ),
    tag = "media",
)]
pub async fn get_media(
    State(state): State<AppState>,
    Path((category, property_id)): Path<(String, String)>,
) -> Result<Json<MediaResponse>> {
    let category: ListingCategory = category.parse()?;
    let media = state.media.media(category, &property_id).await?;

    Ok(Json(MediaResponse {
        success: true,
        data: media,
    }))
}

/// Remove a media item from a listing
#[utoipa::path(
    delete,
    path = "/api/v1/media/{category}/{property_id}/{media_id}",
    params(
        ("category" = String, Path, description = "Listing category slug"),
        ("property_id" = String, Path, description = "Property ID"),
        ("media_id" = String, Path, description = "Media item ID"),
    ),
    responses(
        (status = 200, description = "Media item removed", body = MessageResponse),
        (status = 404, description = "Listing or media item not found", body = crate::error::ErrorResponse),
    ),
    tag = "media",
)]
pub async fn delete_media(
    State(state): State<AppState>,
    Path((category, property_id, media_id)): Path<(String, String, String)>,
) -> Result<Json<MessageResponse>> {
    let category: ListingCategory = category.parse()?;
    state
        .media
        .remove(category, &property_id, &media_id)
        .await?;

    Ok(Json(MessageResponse::new("Media item deleted successfully")))
}

/// Serve a stored object from a non-S3 backend
pub async fn serve_media_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let object = state
        .media
        .storage()
        .get(&key)
        .await?
        .ok_or_else(|| Error::not_found(format!("media file {key}")))?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        Body::from(object.data),
    )
        .into_response())
}
