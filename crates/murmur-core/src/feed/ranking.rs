//! Engagement and recency scoring.

use chrono::{DateTime, Utc};

use crate::domain::{Post, RankedPost};

pub const LIKES_WEIGHT: f64 = 1.5;
pub const COMMENTS_WEIGHT: f64 = 2.0;
pub const AGE_WEIGHT: f64 = 1.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Hours elapsed between `created_at` and `now`, at millisecond precision.
pub fn age_in_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Relevance of a post at `now`. Higher ranks first.
pub fn score(post: &Post, now: DateTime<Utc>) -> f64 {
    LIKES_WEIGHT * post.likes_count as f64 + COMMENTS_WEIGHT * post.comments_count as f64
        - AGE_WEIGHT * age_in_hours(post.created_at, now)
}

/// Score every post of a page and sort by descending score.
///
/// The sort is stable: equal scores keep the order the page arrived in.
pub fn rank_page(page: Vec<Post>, now: DateTime<Utc>) -> Vec<RankedPost> {
    let mut ranked: Vec<RankedPost> = page
        .into_iter()
        .map(|post| {
            let score = score(&post, now);
            tracing::trace!(
                post_id = %post.id,
                score,
                likes = post.likes_count,
                comments = post.comments_count,
                "Scored post"
            );
            RankedPost { post, score }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
