//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for a set of upstream operations.
//!
//! ## Mapping to the tikwm API
//!
//! | Module | Upstream path | Description |
//! |--------|---------------|-------------|
//! | `posts` | `` (root) | Single post by URL or video id |
//! | `users` | `user/posts`, `user/info` | Feed pages, paginated feeds, profiles |

pub mod posts;
pub mod users;

pub use posts::{Post, PostsApi};
pub use users::{FeedPage, UserProfile, UsersApi};

use serde::{Deserialize, Deserializer};

/// Decode an explicit JSON `null` as the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
