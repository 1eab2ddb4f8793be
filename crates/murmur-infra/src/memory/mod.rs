//! In-memory stores - used when no database is configured.
//!
//! Data is lost on process restart.

mod comments;
mod posts;
mod users;

pub use comments::InMemoryCommentStore;
pub use posts::InMemoryPostStore;
pub use users::InMemoryUserStore;
