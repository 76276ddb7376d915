//! Per-author blog statistics

use chrono::{DateTime, Months, Utc};

use super::model::{Blog, BlogStatistics, BlogStatus};

/// Percentage change from `previous` to `current`
///
/// With no previous activity, any current activity counts as 100% growth.
pub fn growth(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current == 0 { 0.0 } else { 100.0 };
    }
    (current - previous) as f64 / previous as f64 * 100.0
}

/// Start of the "this month" window: one calendar month before `now`
pub fn month_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(1)).unwrap_or(now)
}

/// Recompute an author's statistics from their posts
///
/// Growth compares this month's figures with the stored `previous*` values,
/// which then roll over to this month's figures.
pub fn recompute(
    user_id: &str,
    blogs: &[Blog],
    stored: Option<&BlogStatistics>,
    now: DateTime<Utc>,
) -> BlogStatistics {
    let since = month_window_start(now);
    let recent = || blogs.iter().filter(move |b| b.created_at >= since);

    let views_this_month: i64 = recent().map(|b| b.views).sum();
    let likes_this_month: i64 = recent().map(|b| b.likes).sum();
    let comments_this_month = recent().map(|b| b.comments.len() as i64).sum::<i64>();

    let (previous_views, previous_likes, previous_comments) = stored
        .map(|s| (s.previous_views, s.previous_likes, s.previous_comments))
        .unwrap_or_default();

    let count_status =
        |status: BlogStatus| blogs.iter().filter(|b| b.status == status).count() as i64;

    BlogStatistics {
        user_id: user_id.to_string(),
        total_blogs: blogs.len() as i64,
        total_views: blogs.iter().map(|b| b.views).sum(),
        total_likes: blogs.iter().map(|b| b.likes).sum(),
        total_comments: blogs.iter().map(|b| b.comments.len() as i64).sum(),
        views_this_month,
        likes_this_month,
        comments_this_month,
        previous_views: views_this_month,
        previous_likes: likes_this_month,
        previous_comments: comments_this_month,
        growth_rate_views: growth(views_this_month, previous_views),
        growth_rate_likes: growth(likes_this_month, previous_likes),
        growth_rate_comments: growth(comments_this_month, previous_comments),
        published_blogs: count_status(BlogStatus::Published),
        drafts: count_status(BlogStatus::Draft),
        updated_at: now,
    }
}
