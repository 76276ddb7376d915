//! Blog post and statistics records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
        }
    }
}

impl fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BlogStatus::Draft),
            "published" => Ok(BlogStatus::Published),
            other => Err(format!("unknown blog status {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogComment {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Uuid,
    pub author: String,
    pub title: String,
    pub content: String,
    pub status: BlogStatus,
    pub views: i64,
    pub likes: i64,
    pub comments: Vec<BlogComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    pub author: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: BlogStatus,
}

impl NewBlog {
    pub fn into_blog(self, now: DateTime<Utc>) -> Result<Blog> {
        if self.author.trim().is_empty() {
            return Err(Error::invalid("author is required"));
        }
        if self.title.trim().is_empty() {
            return Err(Error::invalid("title is required"));
        }

        Ok(Blog {
            id: Uuid::new_v4(),
            author: self.author,
            title: self.title,
            content: self.content,
            status: self.status,
            views: 0,
            likes: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of a comment request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewComment {
    pub author: String,
    pub content: String,
}

impl NewComment {
    pub fn into_comment(self, now: DateTime<Utc>) -> Result<BlogComment> {
        if self.content.trim().is_empty() {
            return Err(Error::invalid("comment content is required"));
        }

        Ok(BlogComment {
            id: Uuid::new_v4(),
            author: self.author,
            content: self.content,
            created_at: now,
        })
    }
}

/// Per-author aggregate figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogStatistics {
    pub user_id: String,
    pub total_blogs: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub views_this_month: i64,
    pub likes_this_month: i64,
    pub comments_this_month: i64,
    pub previous_views: i64,
    pub previous_likes: i64,
    pub previous_comments: i64,
    pub growth_rate_views: f64,
    pub growth_rate_likes: f64,
    pub growth_rate_comments: f64,
    pub published_blogs: i64,
    pub drafts: i64,
    pub updated_at: DateTime<Utc>,
}

impl BlogStatistics {
    /// Zeroed statistics for an author seen for the first time
    pub fn empty(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            total_blogs: 0,
            total_views: 0,
            total_likes: 0,
            total_comments: 0,
            views_this_month: 0,
            likes_this_month: 0,
            comments_this_month: 0,
            previous_views: 0,
            previous_likes: 0,
            previous_comments: 0,
            growth_rate_views: 0.0,
            growth_rate_likes: 0.0,
            growth_rate_comments: 0.0,
            published_blogs: 0,
            drafts: 0,
            updated_at: now,
        }
    }
}
