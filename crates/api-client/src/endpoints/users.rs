//! User endpoints
//!
//! Maps to two tikwm operations:
//! - `user/posts`: one page of a user's feed
//! - `user/info`: profile and aggregate stats

use crate::client::TikwmClient;
use crate::endpoints::null_as_default;
use crate::endpoints::posts::Post;
use crate::error::ApiResult;
use crate::pagination::FeedPaginator;
use crate::transport::Query;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Upstream path of the feed page operation
pub const FEED_PATH: &str = "user/posts";

/// Upstream path of the profile operation
pub const PROFILE_PATH: &str = "user/info";

/// Users API interface
#[derive(Clone)]
pub struct UsersApi {
    client: TikwmClient,
}

impl UsersApi {
    /// Create a new users API interface
    pub(crate) fn new(client: TikwmClient) -> Self {
        Self { client }
    }

    /// Fetch one page of a user's feed
    ///
    /// `user` is either a handle or a numeric user id; numeric values are
    /// sent as `user_id`, anything else as `unique_id`. `cursor` is passed
    /// through untouched.
    pub async fn feed_page(&self, user: &str, count: u32, cursor: &str) -> ApiResult<FeedPage> {
        self.client.request(FEED_PATH, &feed_query(user, count, cursor)).await
    }

    /// Fetch a user's profile
    pub async fn profile(&self, unique_id: &str) -> ApiResult<UserProfile> {
        let query = Query::from([("unique_id", unique_id.to_string())]);
        self.client.request(PROFILE_PATH, &query).await
    }

    /// Walk a user's whole feed lazily
    ///
    /// Nothing is fetched until the first item is pulled. With `hd` set
    /// every item is re-fetched through the post operation to resolve its
    /// HD play URL.
    #[must_use]
    pub fn feed(&self, user: &str, hd: bool) -> FeedPaginator {
        FeedPaginator::new(self.client.clone(), user, hd)
    }
}

pub(crate) fn feed_query(user: &str, count: u32, cursor: &str) -> Query {
    let id_key = if user.parse::<i64>().is_ok() {
        "user_id"
    } else {
        "unique_id"
    };

    Query::from([
        (id_key, user.to_string()),
        ("count", count.to_string()),
        ("cursor", cursor.to_string()),
    ])
}

// ============================================================================
// Response Types
// ============================================================================

/// One page of a user's feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedPage {
    /// Posts in feed order
    #[serde(deserialize_with = "null_as_default")]
    pub videos: Vec<Post>,
    /// Opaque continuation token for the next page
    #[serde(deserialize_with = "cursor_token")]
    pub cursor: String,
    /// Whether another page follows
    #[serde(rename = "hasMore", deserialize_with = "null_as_default")]
    pub has_more: bool,
}

/// Accept the cursor as a string or a bare number, keeping it opaque
fn cursor_token<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Token>::deserialize(deserializer)? {
        Some(Token::Text(text)) => text,
        Some(Token::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

/// User profile with aggregate stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Account attributes
    #[serde(deserialize_with = "null_as_default")]
    pub user: UserInfo,
    /// Aggregate counters
    #[serde(deserialize_with = "null_as_default")]
    pub stats: UserStats,
}

/// User attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInfo {
    /// Numeric user id
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Handle
    #[serde(deserialize_with = "null_as_default")]
    pub unique_id: String,
    /// Display name
    #[serde(deserialize_with = "null_as_default")]
    pub nickname: String,
    /// Small avatar URL
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_thumb: String,
    /// Medium avatar URL
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_medium: String,
    /// Large avatar URL
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_larger: String,
    /// Bio
    #[serde(deserialize_with = "null_as_default")]
    pub signature: String,
    /// Whether the account is verified
    #[serde(deserialize_with = "null_as_default")]
    pub verified: bool,
    /// Secure user id
    #[serde(deserialize_with = "null_as_default")]
    pub sec_uid: String,
    /// Whether the account is secret
    #[serde(deserialize_with = "null_as_default")]
    pub secret: bool,
    /// Whether the account falls under FTC rules
    #[serde(deserialize_with = "null_as_default")]
    pub ftc: bool,
    /// Relation to the requesting account
    #[serde(deserialize_with = "null_as_default")]
    pub relation: i64,
    /// Whether liked posts are public
    #[serde(deserialize_with = "null_as_default")]
    pub open_favorite: bool,
    /// Comment permission, shape varies
    pub comment_setting: Value,
    /// Duet permission, shape varies
    pub duet_setting: Value,
    /// Stitch permission, shape varies
    pub stitch_setting: Value,
    /// Whether the account is private
    #[serde(deserialize_with = "null_as_default")]
    pub private_account: bool,
    /// Whether the account is a virtual ad account
    #[serde(rename = "isADVirtual", deserialize_with = "null_as_default")]
    pub is_ad_virtual: bool,
    /// Whether the account holder is under 18
    #[serde(deserialize_with = "null_as_default")]
    pub is_under_age18: bool,
    /// Linked Instagram id
    #[serde(rename = "ins_id", deserialize_with = "null_as_default")]
    pub ins_id: String,
    /// Linked Twitter id
    #[serde(rename = "twitter_id", deserialize_with = "null_as_default")]
    pub twitter_id: String,
    /// Linked YouTube channel title
    #[serde(rename = "youtube_channel_title", deserialize_with = "null_as_default")]
    pub youtube_channel_title: String,
    /// Linked YouTube channel id
    #[serde(rename = "youtube_channel_id", deserialize_with = "null_as_default")]
    pub youtube_channel_id: String,
}

/// Aggregate counters of a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserStats {
    /// Accounts followed
    #[serde(deserialize_with = "null_as_default")]
    pub following_count: i64,
    /// Followers
    #[serde(deserialize_with = "null_as_default")]
    pub follower_count: i64,
    /// Likes received
    #[serde(deserialize_with = "null_as_default")]
    pub heart_count: i64,
    /// Posts published
    #[serde(deserialize_with = "null_as_default")]
    pub video_count: i64,
    /// Likes given
    #[serde(deserialize_with = "null_as_default")]
    pub digg_count: i64,
    /// Likes received, legacy field
    #[serde(deserialize_with = "null_as_default")]
    pub heart: i64,
}
