//! # Murmur Core
//!
//! The domain layer of Murmur, a short-form post feed.
//! This crate contains the ranked feed paginator, the post-action and
//! profile services, and the ports that infrastructure must implement.
//! It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;
pub mod services;

pub use error::{DomainError, FeedError, RepoError};
