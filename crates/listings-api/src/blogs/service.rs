//! Blog operations on top of the blog store

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{Blog, BlogStatistics, NewBlog, NewComment};
use super::statistics::recompute;
use crate::error::{Error, Result};
use crate::store::BlogRepository;

#[derive(Clone)]
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, new_blog: NewBlog) -> Result<Blog> {
        let blog = new_blog.into_blog(Utc::now())?;
        self.repo.insert(&blog).await?;

        info!(blog_id = %blog.id, author = %blog.author, "Blog created");
        Ok(blog)
    }

    /// Fetch a post, counting one view
    pub async fn view(&self, id: Uuid) -> Result<Blog> {
        self.repo
            .increment_views(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("blog {id}")))
    }

    pub async fn like(&self, id: Uuid) -> Result<Blog> {
        self.repo
            .increment_likes(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("blog {id}")))
    }

    pub async fn comment(&self, id: Uuid, comment: NewComment) -> Result<Blog> {
        let comment = comment.into_comment(Utc::now())?;
        self.repo
            .add_comment(id, &comment)
            .await?
            .ok_or_else(|| Error::not_found(format!("blog {id}")))
    }

    /// Refresh and return an author's statistics
    ///
    /// Authors with neither posts nor stored statistics are unknown.
    pub async fn statistics(&self, user_id: &str) -> Result<BlogStatistics> {
        let blogs = self.repo.list_by_author(user_id).await?;
        let stored = self.repo.get_statistics(user_id).await?;

        if blogs.is_empty() && stored.is_none() {
            return Err(Error::not_found(format!("statistics for {user_id}")));
        }

        let stats = recompute(user_id, &blogs, stored.as_ref(), Utc::now());
        self.repo.save_statistics(&stats).await?;

        debug!(
            user_id = %user_id,
            total_blogs = stats.total_blogs,
            growth_rate_views = stats.growth_rate_views,
            "Blog statistics refreshed"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blogs::model::BlogStatus;
    use crate::store::SqliteBlogStore;
    use common::config::DatabaseConfig;
    use common::persistence::{establish_sqlite_pool, Migrate};

    async fn service() -> BlogService {
        let pool = establish_sqlite_pool(&DatabaseConfig::in_memory())
            .await
            .unwrap();
        let store = SqliteBlogStore::new(pool);
        store.run_migrations().await.unwrap();
        BlogService::new(Arc::new(store))
    }

    fn new_blog(author: &str, status: BlogStatus) -> NewBlog {
        NewBlog {
            author: author.to_string(),
            title: "Market update".to_string(),
            content: String::new(),
            status,
        }
    }

    #[tokio::test]
    async fn test_unknown_author_has_no_statistics() {
        let service = service().await;
        assert!(matches!(
            service.statistics("ghost").await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_statistics_refresh_is_persisted() {
        let service = service().await;
        let published = service
            .create(new_blog("u1", BlogStatus::Published))
            .await
            .unwrap();
        service.create(new_blog("u1", BlogStatus::Draft)).await.unwrap();

        service.view(published.id).await.unwrap();
        service.view(published.id).await.unwrap();
        service.like(published.id).await.unwrap();
        service
            .comment(
                published.id,
                NewComment {
                    author: "reader".to_string(),
                    content: "Helpful".to_string(),
                },
            )
            .await
            .unwrap();

        let first = service.statistics("u1").await.unwrap();
        assert_eq!(first.total_blogs, 2);
        assert_eq!(first.published_blogs, 1);
        assert_eq!(first.drafts, 1);
        assert_eq!(first.total_views, 2);
        assert_eq!(first.total_likes, 1);
        assert_eq!(first.total_comments, 1);
        assert_eq!(first.comments_this_month, 1);
        assert_eq!(first.growth_rate_views, 100.0);
        assert_eq!(first.previous_views, 2);

        // Same figures again: no growth against the rolled-over values
        let second = service.statistics("u1").await.unwrap();
        assert_eq!(second.growth_rate_views, 0.0);
        assert_eq!(second.growth_rate_likes, 0.0);
    }

    #[tokio::test]
    async fn test_missing_blog_is_not_found() {
        let service = service().await;
        assert!(matches!(
            service.like(Uuid::new_v4()).await,
            Err(Error::NotFound { .. })
        ));
    }
}
