//! Feed session: cursor pagination plus per-page ranking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::domain::RankedPost;
use crate::error::FeedError;
use crate::ports::FeedSource;

use super::clock::{Clock, SystemClock};
use super::cursor::FeedCursor;
use super::ranking::rank_page;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Paginator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    /// Raw documents requested per store round trip.
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedConfig {
    pub fn new(page_size: usize) -> Result<Self, FeedError> {
        if page_size == 0 {
            return Err(FeedError::InvalidConfig(
                "page_size must be positive".to_string(),
            ));
        }
        Ok(Self { page_size })
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedState {
    Idle,
    Fetching,
    /// An empty page came back. Terminal.
    Exhausted,
}

/// Why a fetch request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyFetching,
    Exhausted,
    Unmounted,
    NotVisible,
}

/// Result of a fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// A ranked page of `count` posts was appended.
    Appended { count: usize },
    /// The store had nothing left; the session is now exhausted.
    Exhausted,
    /// The session was unmounted while the query was in flight.
    Discarded,
    Skipped { reason: SkipReason },
}

/// Read-only view of a session for the consuming view.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub posts: Vec<RankedPost>,
    pub loading: bool,
    pub has_more: bool,
}

#[derive(Debug)]
struct Session {
    posts: Vec<RankedPost>,
    cursor: Option<FeedCursor>,
    has_more: bool,
}

/// Clears the fetching flag on every exit path, including cancellation.
struct FetchGuard<'a>(&'a AtomicBool);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One mounted feed view's pagination session.
///
/// Fetches are serialized by an in-flight flag: a call made while another
/// is pending returns [`FetchOutcome::Skipped`] instead of queueing. State
/// is only committed after the store answers, so a failed fetch changes
/// nothing and can be retried. No timeout is applied to store calls.
pub struct FeedPaginator<S: FeedSource + ?Sized> {
    source: Arc<S>,
    clock: Arc<dyn Clock>,
    config: FeedConfig,
    session: Mutex<Session>,
    fetching: AtomicBool,
    mounted: AtomicBool,
}

impl<S: FeedSource + ?Sized> FeedPaginator<S> {
    pub fn new(source: Arc<S>, config: FeedConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Arc<S>, config: FeedConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            config,
            session: Mutex::new(Session {
                posts: Vec::new(),
                cursor: None,
                has_more: true,
            }),
            fetching: AtomicBool::new(false),
            mounted: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> FeedConfig {
        self.config
    }

    /// Fetch, rank and append the next page.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome, FeedError> {
        if !self.is_mounted() {
            return Ok(skipped(SkipReason::Unmounted));
        }

        if self
            .fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(skipped(SkipReason::AlreadyFetching));
        }
        let _guard = FetchGuard(&self.fetching);

        let cursor = {
            let session = self.lock_session();
            if !session.has_more {
                return Ok(skipped(SkipReason::Exhausted));
            }
            session.cursor
        };

        tracing::debug!(
            page_size = self.config.page_size,
            has_cursor = cursor.is_some(),
            "Fetching next feed page"
        );

        let mut page = match self
            .source
            .fetch_page(cursor.as_ref(), self.config.page_size)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(error = %e, "Feed page query failed");
                return Err(FeedError::Query(e));
            }
        };

        if !self.is_mounted() {
            tracing::debug!("Feed session unmounted mid-fetch, discarding page");
            return Ok(FetchOutcome::Discarded);
        }

        page.truncate(self.config.page_size);

        let mut session = self.lock_session();

        let Some(last) = page.last() else {
            session.has_more = false;
            tracing::debug!(loaded = session.posts.len(), "Feed exhausted");
            return Ok(FetchOutcome::Exhausted);
        };

        // The cursor follows the raw store order, not the ranked order.
        let next_cursor = FeedCursor::from(last);
        let ranked = rank_page(page, self.clock.now());
        let count = ranked.len();

        session.posts.extend(ranked);
        session.cursor = Some(next_cursor);

        tracing::debug!(count, loaded = session.posts.len(), "Feed page appended");
        Ok(FetchOutcome::Appended { count })
    }

    /// Edge trigger for an infinite-scroll sentinel.
    ///
    /// Fetches only when the sentinel is visible, more pages may exist and
    /// nothing is in flight.
    pub async fn request_load_more_when_visible(
        &self,
        sentinel_visible: bool,
    ) -> Result<FetchOutcome, FeedError> {
        if !sentinel_visible {
            return Ok(skipped(SkipReason::NotVisible));
        }
        if self.is_loading() {
            return Ok(skipped(SkipReason::AlreadyFetching));
        }
        if !self.has_more() {
            return Ok(skipped(SkipReason::Exhausted));
        }
        self.fetch_next_page().await
    }

    /// Tear the session down. In-flight fetches complete but commit nothing.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn is_loading(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    pub fn has_more(&self) -> bool {
        self.lock_session().has_more
    }

    pub fn state(&self) -> FeedState {
        if self.is_loading() {
            FeedState::Fetching
        } else if !self.has_more() {
            FeedState::Exhausted
        } else {
            FeedState::Idle
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let session = self.lock_session();
        FeedSnapshot {
            posts: session.posts.clone(),
            loading: self.is_loading(),
            has_more: session.has_more,
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn skipped(reason: SkipReason) -> FetchOutcome {
    FetchOutcome::Skipped { reason }
}
