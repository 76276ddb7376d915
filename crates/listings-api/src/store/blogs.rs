//! SQLite store for blog posts and per-author statistics

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::PersistenceError;
use common::persistence::{Migrate, SqlitePool};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use crate::blogs::model::{Blog, BlogComment, BlogStatistics};
use crate::listings::document::format_timestamp;

/// Blog persistence operations
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn insert(&self, blog: &Blog) -> Result<(), PersistenceError>;

    async fn get(&self, id: Uuid) -> Result<Option<Blog>, PersistenceError>;

    /// Add one view; returns the updated post
    async fn increment_views(&self, id: Uuid) -> Result<Option<Blog>, PersistenceError>;

    /// Add one like; returns the updated post
    async fn increment_likes(&self, id: Uuid) -> Result<Option<Blog>, PersistenceError>;

    /// Append a comment; returns the updated post
    async fn add_comment(
        &self,
        id: Uuid,
        comment: &BlogComment,
    ) -> Result<Option<Blog>, PersistenceError>;

    async fn list_by_author(&self, author: &str) -> Result<Vec<Blog>, PersistenceError>;

    async fn get_statistics(
        &self,
        user_id: &str,
    ) -> Result<Option<BlogStatistics>, PersistenceError>;

    /// Insert or replace an author's statistics
    async fn save_statistics(&self, stats: &BlogStatistics) -> Result<(), PersistenceError>;
}

#[derive(Clone)]
pub struct SqliteBlogStore {
    pool: SqlitePool,
}

const BLOG_COLUMNS: &str =
    "id, author, title, content, status, views, likes, comments, created_at, updated_at";

const STATISTICS_COLUMNS: &str = "user_id, total_blogs, total_views, total_likes, total_comments, \
     views_this_month, likes_this_month, comments_this_month, \
     previous_views, previous_likes, previous_comments, \
     growth_rate_views, growth_rate_likes, growth_rate_comments, \
     published_blogs, drafts, updated_at";

impl SqliteBlogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn blog_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Blog, PersistenceError> {
        let id: String = row.get("id");
        let status: String = row.get("status");
        let comments: String = row.get("comments");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Blog {
            id: Uuid::parse_str(&id).map_err(|e| deserialization("blog id", e))?,
            author: row.get("author"),
            title: row.get("title"),
            content: row.get("content"),
            status: status
                .parse()
                .map_err(|e| deserialization("blog status", e))?,
            views: row.get("views"),
            likes: row.get("likes"),
            comments: serde_json::from_str(&comments)
                .map_err(|e| deserialization("blog comments", e))?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    fn statistics_from_row(
        row: &sqlx::sqlite::SqliteRow,
    ) -> Result<BlogStatistics, PersistenceError> {
        let updated_at: String = row.get("updated_at");

        Ok(BlogStatistics {
            user_id: row.get("user_id"),
            total_blogs: row.get("total_blogs"),
            total_views: row.get("total_views"),
            total_likes: row.get("total_likes"),
            total_comments: row.get("total_comments"),
            views_this_month: row.get("views_this_month"),
            likes_this_month: row.get("likes_this_month"),
            comments_this_month: row.get("comments_this_month"),
            previous_views: row.get("previous_views"),
            previous_likes: row.get("previous_likes"),
            previous_comments: row.get("previous_comments"),
            growth_rate_views: row.get("growth_rate_views"),
            growth_rate_likes: row.get("growth_rate_likes"),
            growth_rate_comments: row.get("growth_rate_comments"),
            published_blogs: row.get("published_blogs"),
            drafts: row.get("drafts"),
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    /// Run a single-row counter update and read the post back
    async fn bump(&self, id: Uuid, column: &str) -> Result<Option<Blog>, PersistenceError> {
        let query = format!("UPDATE blogs SET {column} = {column} + 1 WHERE id = ?");
        let result = sqlx::query(&query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::from_sqlx(query.clone(), e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }
}

fn deserialization(what: &str, err: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::DeserializationFailed {
        details: format!("{what}: {err}"),
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| deserialization("timestamp", e))
}

#[async_trait]
impl Migrate for SqliteBlogStore {
    async fn run_migrations(&self) -> Result<(), PersistenceError> {
        info!("Running blog store migrations");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id TEXT PRIMARY KEY NOT NULL CHECK(length(id) = 36),
                author TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('draft', 'published')),
                views INTEGER NOT NULL DEFAULT 0,
                likes INTEGER NOT NULL DEFAULT 0,
                comments TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_blogs_author ON blogs(author, created_at)",
            r#"
            CREATE TABLE IF NOT EXISTS blog_statistics (
                user_id TEXT PRIMARY KEY NOT NULL,
                total_blogs INTEGER NOT NULL DEFAULT 0,
                total_views INTEGER NOT NULL DEFAULT 0,
                total_likes INTEGER NOT NULL DEFAULT 0,
                total_comments INTEGER NOT NULL DEFAULT 0,
                views_this_month INTEGER NOT NULL DEFAULT 0,
                likes_this_month INTEGER NOT NULL DEFAULT 0,
                comments_this_month INTEGER NOT NULL DEFAULT 0,
                previous_views INTEGER NOT NULL DEFAULT 0,
                previous_likes INTEGER NOT NULL DEFAULT 0,
                previous_comments INTEGER NOT NULL DEFAULT 0,
                growth_rate_views REAL NOT NULL DEFAULT 0,
                growth_rate_likes REAL NOT NULL DEFAULT 0,
                growth_rate_comments REAL NOT NULL DEFAULT 0,
                published_blogs INTEGER NOT NULL DEFAULT 0,
                drafts INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| PersistenceError::MigrationFailed {
                    details: format!("blog schema: {e}"),
                })?;
        }

        info!("Blog store migrations completed");
        Ok(())
    }
}

#[async_trait]
impl BlogRepository for SqliteBlogStore {
    async fn insert(&self, blog: &Blog) -> Result<(), PersistenceError> {
        let comments = serde_json::to_string(&blog.comments).map_err(|e| {
            PersistenceError::SerializationFailed {
                details: format!("blog comments: {e}"),
            }
        })?;

        sqlx::query(&format!(
            "INSERT INTO blogs ({BLOG_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(blog.id.to_string())
        .bind(blog.author.as_str())
        .bind(blog.title.as_str())
        .bind(blog.content.as_str())
        .bind(blog.status.as_str())
        .bind(blog.views)
        .bind(blog.likes)
        .bind(comments)
        .bind(format_timestamp(blog.created_at))
        .bind(format_timestamp(blog.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("insert blog", e))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Blog>, PersistenceError> {
        let row = sqlx::query(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PersistenceError::from_sqlx("get blog", e))?;

        row.as_ref().map(Self::blog_from_row).transpose()
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Blog>, PersistenceError> {
        self.bump(id, "views").await
    }

    async fn increment_likes(&self, id: Uuid) -> Result<Option<Blog>, PersistenceError> {
        self.bump(id, "likes").await
    }

    async fn add_comment(
        &self,
        id: Uuid,
        comment: &BlogComment,
    ) -> Result<Option<Blog>, PersistenceError> {
        let comment = serde_json::to_string(comment).map_err(|e| {
            PersistenceError::SerializationFailed {
                details: format!("blog comment: {e}"),
            }
        })?;

        // Appended in SQL so concurrent comments are not lost
        let result = sqlx::query(
            "UPDATE blogs SET comments = json_insert(comments, '$[#]', json(?)), updated_at = ? \
             WHERE id = ?",
        )
        .bind(comment)
        .bind(format_timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("add blog comment", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    async fn list_by_author(&self, author: &str) -> Result<Vec<Blog>, PersistenceError> {
        let rows = sqlx::query(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE author = ? ORDER BY created_at DESC"
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("list blogs by author", e))?;

        rows.iter().map(Self::blog_from_row).collect()
    }

    async fn get_statistics(
        &self,
        user_id: &str,
    ) -> Result<Option<BlogStatistics>, PersistenceError> {
        let row = sqlx::query(&format!(
            "SELECT {STATISTICS_COLUMNS} FROM blog_statistics WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("get blog statistics", e))?;

        row.as_ref().map(Self::statistics_from_row).transpose()
    }

    async fn save_statistics(&self, stats: &BlogStatistics) -> Result<(), PersistenceError> {
        sqlx::query(&format!(
            "INSERT OR REPLACE INTO blog_statistics ({STATISTICS_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(stats.user_id.as_str())
        .bind(stats.total_blogs)
        .bind(stats.total_views)
        .bind(stats.total_likes)
        .bind(stats.total_comments)
        .bind(stats.views_this_month)
        .bind(stats.likes_this_month)
        .bind(stats.comments_this_month)
        .bind(stats.previous_views)
        .bind(stats.previous_likes)
        .bind(stats.previous_comments)
        .bind(stats.growth_rate_views)
        .bind(stats.growth_rate_likes)
        .bind(stats.growth_rate_comments)
        .bind(stats.published_blogs)
        .bind(stats.drafts)
        .bind(format_timestamp(stats.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::from_sqlx("save blog statistics", e))?;

        Ok(())
    }
}
