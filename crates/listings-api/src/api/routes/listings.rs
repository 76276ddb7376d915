//! Listing route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    api::types::{
        ListingListResponse, ListingQuery, ListingResponse, MessageResponse,
        UpdateListingRequest,
    },
    error::{Error, Result},
    listings::ListingCategory,
    server::AppState,
};

/// Create a listing under the next property ID of its category
#[utoipa::path(
    post,
    path = "/api/v1/listings/{category}",
    params(("category" = String, Path, description = "Listing category slug")),
    responses(
        (status = 201, description = "Listing created", body = ListingResponse),
        (status = 400, description = "Invalid listing", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown category", body = crate::error::ErrorResponse),
        (status = 409, description = "Property ID kept colliding", body = crate::error::ErrorResponse),
    ),
    tag = "listings",
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ListingResponse>)> {
    let category: ListingCategory = category.parse()?;
    let record = state.listings.create(category, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ListingResponse::new(
            &record,
            Some(format!("{} listing created successfully", category.label())),
        )),
    ))
}

/// List listings of a category, newest first
#[utoipa::path(
    get,
    path = "/api/v1/listings/{category}",
    params(
        ("category" = String, Path, description = "Listing category slug"),
        ListingQuery,
    ),
    responses(
        (status = 200, description = "Page of listings", body = ListingListResponse),
        (status = 404, description = "Unknown category", body = crate::error::ErrorResponse),
    ),
    tag = "listings",
)]
pub async fn list_listings(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingListResponse>> {
    let category: ListingCategory = category.parse()?;
    let page = state
        .listings
        .list(category, &query.filter(), &query.page_request())
        .await?;

    Ok(Json(page.into()))
}

/// Get a listing by property ID
#[utoipa::path(
    get,
    path = "/api/v1/listings/{category}/{property_id}",
    params(
        ("category" = String, Path, description = "Listing category slug"),
        ("property_id" = String, Path, description = "Property ID"),
    ),
    responses(
        (status = 200, description = "Listing", body = ListingResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
    ),
    tag = "listings",
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path((category, property_id)): Path<(String, String)>,
) -> Result<Json<ListingResponse>> {
    let category: ListingCategory = category.parse()?;
    let record = state.listings.get(category, &property_id).await?;

    Ok(Json(ListingResponse::new(&record, None)))
}

/// Merge fields into a listing
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{category}/{property_id}",
    params(
        ("category" = String, Path, description = "Listing category slug"),
        ("property_id" = String, Path, description = "Property ID"),
    ),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Listing updated", body = ListingResponse),
        (status = 400, description = "Missing or invalid data", body = crate::error::ErrorResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
    ),
    tag = "listings",
)]
pub async fn update_listing(
    State(state): State<AppState>,
    Path((category, property_id)): Path<(String, String)>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ListingResponse>> {
    let category: ListingCategory = category.parse()?;
    let data = request
        .data
        .ok_or_else(|| Error::invalid("update data is required"))?;

    let record = state.listings.update(category, &property_id, data).await?;

    Ok(Json(ListingResponse::new(
        &record,
        Some(format!("{} listing updated successfully", category.label())),
    )))
}

/// Delete a listing; its property ID is retired
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{category}/{property_id}",
    params(
        ("category" = String, Path, description = "Listing category slug"),
        ("property_id" = String, Path, description = "Property ID"),
    ),
    responses(
        (status = 200, description = "Listing deleted", body = MessageResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
    ),
    tag = "listings",
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    Path((category, property_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let category: ListingCategory = category.parse()?;
    state.listings.delete(category, &property_id).await?;

    Ok(Json(MessageResponse::new(format!(
        "{} listing deleted successfully",
        category.label()
    ))))
}
