//! HTTP API of the listings service

pub mod middleware;
pub mod routes;
pub mod types;

use crate::server::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    let upload_limit = state.config.media.request_body_limit();

    Router::new()
        // Listings
        .route(
            "/listings/:category",
            post(routes::listings::create_listing).get(routes::listings::list_listings),
        )
        .route(
            "/listings/:category/:property_id",
            get(routes::listings::get_listing)
                .patch(routes::listings::update_listing)
                .delete(routes::listings::delete_listing),
        )
        // Media
        .route(
            "/media/:category/upload",
            post(routes::media::upload_media).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/media/:category/:property_id", get(routes::media::get_media))
        .route(
            "/media/:category/:property_id/:media_id",
            axum::routing::delete(routes::media::delete_media),
        )
        // Blogs
        .route("/blogs", post(routes::blogs::create_blog))
        .route(
            "/blogs/statistics/:user_id",
            get(routes::blogs::blog_statistics),
        )
        .route("/blogs/:blog_id", get(routes::blogs::get_blog))
        .route("/blogs/:blog_id/like", post(routes::blogs::like_blog))
        .route("/blogs/:blog_id/comments", post(routes::blogs::comment_blog))
        // Health
        .route("/health", get(routes::health::health_check))
}

/// Create OpenAPI documentation routes
pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::listings::create_listing,
        routes::listings::list_listings,
        routes::listings::get_listing,
        routes::listings::update_listing,
        routes::listings::delete_listing,
        routes::media::upload_media,
        routes::media::get_media,
        routes::media::delete_media,
        routes::blogs::create_blog,
        routes::blogs::get_blog,
        routes::blogs::like_blog,
        routes::blogs::comment_blog,
        routes::blogs::blog_statistics,
        routes::health::health_check,
    ),
    components(schemas(
        types::PaginationInfo,
        types::UpdateListingRequest,
        types::ListingResponse,
        types::ListingListResponse,
        types::MessageResponse,
        types::MediaResponse,
        types::UploadResponse,
        types::BlogResponse,
        types::BlogStatisticsResponse,
        types::HealthCheckResponse,
        crate::listings::ListingCategory,
        crate::media::MediaItem,
        crate::media::MediaKind,
        crate::media::MediaMetadata,
        crate::media::UploadOutcome,
        crate::blogs::Blog,
        crate::blogs::BlogComment,
        crate::blogs::BlogStatus,
        crate::blogs::BlogStatistics,
        crate::blogs::NewBlog,
        crate::blogs::NewComment,
        crate::error::ErrorResponse,
        crate::error::ErrorDetails,
    )),
    tags(
        (name = "listings", description = "Commercial and residential listings"),
        (name = "media", description = "Listing photos and videos"),
        (name = "blogs", description = "Blog posts and author statistics"),
        (name = "health", description = "Health and monitoring"),
    ),
    info(
        title = "Estate Listings API",
        version = "1.0.0",
        description = "Property listings with sequential property IDs, media uploads and blogs",
        license(
            name = "MIT",
        ),
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development"),
    ),
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON
async fn openapi_json() -> impl axum::response::IntoResponse {
    axum::Json(ApiDoc::openapi())
}
