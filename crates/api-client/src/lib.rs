//! Request orchestration client for the tikwm video-metadata API
//!
//! This crate fetches posts, user feeds and user profiles from tikwm while
//! keeping two operational concerns out of the caller's way.
//!
//! # Features
//!
//! - **Endpoint failover**: every call walks an ordered list of candidate
//!   endpoints and returns the first success
//! - **Call throttling**: calls of one client start at least a fixed interval
//!   apart, however many tasks issue them concurrently
//! - **Envelope decoding**: upstream `{code, msg, data}` responses become
//!   typed values or typed errors
//! - **Lazy feed pagination**: a user's feed as one pull-based sequence, with
//!   optional per-item HD enrichment
//!
//! # Example
//!
//! ```rust,no_run
//! use tikwm_api_client::{ClientConfig, TikwmClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TikwmClient::with_config(ClientConfig::from_env()?)?;
//!
//!     let post = client.posts().fetch("7002172928477367557", true).await?;
//!     println!("{}: {:?}", post.id(), post.content_urls(true));
//!
//!     let profile = client.users().profile("gioscottii").await?;
//!     println!("{} followers", profile.stats.follower_count);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod pagination;
pub mod transport;

pub use client::TikwmClient;
pub use config::ClientConfig;
pub use endpoints::{FeedPage, Post, UserProfile};
pub use error::{ApiError, ApiResult};
pub use pagination::FeedPaginator;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::TikwmClient;
    pub use crate::config::ClientConfig;
    pub use crate::endpoints::{FeedPage, Post, PostsApi, UserProfile, UsersApi};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::pagination::FeedPaginator;
}
