//! Domain entities - the core business objects.

mod comment;
mod document;
mod event;
mod post;
mod user;

pub use comment::{Comment, CommentAuthor};
pub use document::PostDocument;
pub use event::PostEvent;
pub use post::{MAX_POST_LENGTH, Post, RankedPost, validate_content};
pub use user::{ProviderIdentity, UserProfile, derive_username};
