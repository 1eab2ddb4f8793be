//! Application services built on the ports.

mod post_actions;
mod profiles;

pub use post_actions::PostActions;
pub use profiles::{ProfileService, ProfileView};
