//! Blog route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::types::{BlogResponse, BlogStatisticsResponse},
    blogs::{NewBlog, NewComment},
    error::{Error, Result},
    server::AppState,
};

fn parse_blog_id(blog_id: &str) -> Result<Uuid> {
    Uuid::parse_str(blog_id).map_err(|_| Error::not_found(format!("blog {blog_id}")))
}

/// Create a blog post
#[utoipa::path(
    post,
    path = "/api/v1/blogs",
    request_body = NewBlog,
    responses(
        (status = 201, description = "Blog created", body = BlogResponse),
        (status = 400, description = "Missing author or title", body = crate::error::ErrorResponse),
    ),
    tag = "blogs",
)]
pub async fn create_blog(
    State(state): State<AppState>,
    Json(new_blog): Json<NewBlog>,
) -> Result<(StatusCode, Json<BlogResponse>)> {
    let blog = state.blogs.create(new_blog).await?;
    Ok((
        StatusCode::CREATED,
        Json(BlogResponse {
            success: true,
            data: blog,
        }),
    ))
}

/// Read a blog post, counting one view
#[utoipa::path(
    get,
    path = "/api/v1/blogs/{blog_id}",
    params(("blog_id" = String, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog post", body = BlogResponse),
        (status = 404, description = "Blog not found", body = crate::error::ErrorResponse),
    ),
    tag = "blogs",
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Json<BlogResponse>> {
    let blog = state.blogs.view(parse_blog_id(&blog_id)?).await?;
    Ok(Json(BlogResponse {
        success: true,
        data: blog,
    }))
}

/// Like a blog post
#[utoipa::path(
    post,
    path = "/api/v1/blogs/{blog_id}/like",
    params(("blog_id" = String, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Like counted", body = BlogResponse),
        (status = 404, description = "Blog not found", body = crate::error::ErrorResponse),
    ),
    tag = "blogs",
)]
pub async fn like_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Json<BlogResponse>> {
    let blog = state.blogs.like(parse_blog_id(&blog_id)?).await?;
    Ok(Json(BlogResponse {
        success: true,
        data: blog,
    }))
}

/// Comment on a blog post
#[utoipa::path(
    post,
    path = "/api/v1/blogs/{blog_id}/comments",
    params(("blog_id" = String, Path, description = "Blog ID")),
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment added", body = BlogResponse),
        (status = 400, description = "Empty comment", body = crate::error::ErrorResponse),
        (status = 404, description = "Blog not found", body = crate::error::ErrorResponse),
    ),
    tag = "blogs",
)]
pub async fn comment_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
    Json(comment): Json<NewComment>,
) -> Result<(StatusCode, Json<BlogResponse>)> {
    let blog = state
        .blogs
        .comment(parse_blog_id(&blog_id)?, comment)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(BlogResponse {
            success: true,
            data: blog,
        }),
    ))
}

/// Refresh and return an author's blog statistics
#[utoipa::path(
    get,
    path = "/api/v1/blogs/statistics/{user_id}",
    params(("user_id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Statistics", body = BlogStatisticsResponse),
        (status = 404, description = "Author has no posts or statistics", body = crate::error::ErrorResponse),
    ),
    tag = "blogs",
)]
pub async fn blog_statistics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BlogStatisticsResponse>> {
    let stats = state.blogs.statistics(&user_id).await?;
    Ok(Json(BlogStatisticsResponse {
        success: true,
        data: stats,
    }))
}
