//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod events;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use events::{EventBus, EventBusError, EventHandler, Subscription};
pub use repository::{
    BaseRepository, CommentRepository, FeedSource, PostRepository, UserRepository,
};
