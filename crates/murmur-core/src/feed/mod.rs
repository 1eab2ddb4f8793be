//! Ranked feed pagination.
//!
//! A [`FeedPaginator`] walks the post collection newest-first in fixed-size
//! pages. Each page is scored by engagement and recency and re-sorted before
//! it is appended to the session, while the cursor keeps following the raw
//! store order so pages never overlap or leave gaps.

mod clock;
mod cursor;
mod paginator;
mod ranking;

pub use clock::{Clock, FixedClock, SystemClock};
pub use cursor::{FeedCursor, feed_order};
pub use paginator::{
    DEFAULT_PAGE_SIZE, FeedConfig, FeedPaginator, FeedSnapshot, FeedState, FetchOutcome,
    SkipReason,
};
pub use ranking::{AGE_WEIGHT, COMMENTS_WEIGHT, LIKES_WEIGHT, age_in_hours, rank_page, score};
