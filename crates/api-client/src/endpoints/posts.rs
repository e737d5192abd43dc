//! Post endpoints
//!
//! Maps to the root tikwm operation, which resolves a video URL or a bare
//! video id to its metadata and download links.

use crate::client::TikwmClient;
use crate::endpoints::null_as_default;
use crate::error::ApiResult;
use crate::transport::Query;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream path of the post operation
pub const POST_PATH: &str = "";

/// Posts API interface
#[derive(Clone)]
pub struct PostsApi {
    client: TikwmClient,
}

impl PostsApi {
    /// Create a new posts API interface
    pub(crate) fn new(client: TikwmClient) -> Self {
        Self { client }
    }

    /// Fetch a single post
    ///
    /// `url_or_id` is either a full video URL or a numeric video id. With
    /// `hd` set the upstream also resolves the HD play URL.
    pub async fn fetch(&self, url_or_id: &str, hd: bool) -> ApiResult<Post> {
        self.client.request(POST_PATH, &post_query(url_or_id, hd)).await
    }
}

pub(crate) fn post_query(url_or_id: &str, hd: bool) -> Query {
    let mut query = Query::from([("url", url_or_id.to_string())]);
    if hd {
        query.insert("hd", "1".to_string());
    }
    query
}

// ============================================================================
// Response Types
// ============================================================================

/// A video or photo album
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    /// Post id
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Video id, used when `id` is empty
    #[serde(deserialize_with = "null_as_default")]
    pub video_id: String,
    /// Region code of the author
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    /// Caption
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Cover image URL
    #[serde(deserialize_with = "null_as_default")]
    pub cover: String,
    /// Uncropped cover image URL
    #[serde(deserialize_with = "null_as_default")]
    pub origin_cover: String,
    /// Video length in seconds
    #[serde(deserialize_with = "null_as_default")]
    pub duration: f64,
    /// Play URL without watermark
    #[serde(deserialize_with = "null_as_default")]
    pub play: String,
    /// Play URL with watermark
    #[serde(deserialize_with = "null_as_default")]
    pub wmplay: String,
    /// HD play URL; only filled by an HD post fetch
    #[serde(deserialize_with = "null_as_default")]
    pub hdplay: String,
    /// Size of `play` in bytes
    #[serde(deserialize_with = "null_as_default")]
    pub size: i64,
    /// Size of `wmplay` in bytes
    #[serde(deserialize_with = "null_as_default")]
    pub wm_size: i64,
    /// Size of `hdplay` in bytes
    #[serde(deserialize_with = "null_as_default")]
    pub hd_size: i64,
    /// Soundtrack URL
    #[serde(deserialize_with = "null_as_default")]
    pub music: String,
    /// Soundtrack details
    #[serde(deserialize_with = "null_as_default")]
    pub music_info: MusicInfo,
    /// View count
    #[serde(deserialize_with = "null_as_default")]
    pub play_count: i64,
    /// Like count
    #[serde(deserialize_with = "null_as_default")]
    pub digg_count: i64,
    /// Comment count
    #[serde(deserialize_with = "null_as_default")]
    pub comment_count: i64,
    /// Share count
    #[serde(deserialize_with = "null_as_default")]
    pub share_count: i64,
    /// Download count
    #[serde(deserialize_with = "null_as_default")]
    pub download_count: i64,
    /// Favorite count
    #[serde(deserialize_with = "null_as_default")]
    pub collect_count: i64,
    /// Upload time, unix seconds
    #[serde(deserialize_with = "null_as_default")]
    pub create_time: i64,
    /// Shape varies between posts, kept raw
    pub anchors: Value,
    /// Anchor metadata as sent
    #[serde(deserialize_with = "null_as_default")]
    pub anchors_extras: String,
    /// Whether the post is an ad
    #[serde(deserialize_with = "null_as_default")]
    pub is_ad: bool,
    /// Advertising flags
    #[serde(deserialize_with = "null_as_default")]
    pub commerce_info: CommerceInfo,
    /// Commercial metadata as sent
    #[serde(deserialize_with = "null_as_default")]
    pub commercial_video_info: String,
    /// Post author
    #[serde(deserialize_with = "null_as_default")]
    pub author: Author,
    /// Photo URLs; non-empty only for albums
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

impl Post {
    /// Post identifier, falling back to the video id
    #[must_use]
    pub fn id(&self) -> &str {
        if self.id.is_empty() {
            &self.video_id
        } else {
            &self.id
        }
    }

    /// Whether the post is a photo album
    #[must_use]
    pub fn is_album(&self) -> bool {
        !self.images.is_empty()
    }

    /// Whether the post is a video
    #[must_use]
    pub fn is_video(&self) -> bool {
        !self.is_album()
    }

    /// Downloadable media URLs
    ///
    /// Albums yield every image. Videos yield a single URL: the HD one when
    /// `hd` is set and known, else the plain one, else the watermarked one.
    #[must_use]
    pub fn content_urls(&self, hd: bool) -> Vec<String> {
        if self.is_album() {
            return self.images.clone();
        }

        let url = if hd && !self.hdplay.is_empty() {
            &self.hdplay
        } else if !self.play.is_empty() {
            &self.play
        } else {
            &self.wmplay
        };
        vec![url.clone()]
    }
}

/// Soundtrack of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicInfo {
    /// Track id
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Track title
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Track audio URL
    #[serde(deserialize_with = "null_as_default")]
    pub play: String,
    /// Track cover URL
    #[serde(deserialize_with = "null_as_default")]
    pub cover: String,
    /// Track author
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    /// Whether the track is the author's original sound
    #[serde(deserialize_with = "null_as_default")]
    pub original: bool,
    /// Track length
    pub duration: Option<MusicDuration>,
    /// Album name
    #[serde(deserialize_with = "null_as_default")]
    pub album: String,
}

/// Track length, sent either as seconds or as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MusicDuration {
    /// Numeric seconds
    Seconds(f64),
    /// Text as sent by the upstream
    Text(String),
}

impl MusicDuration {
    /// Length in seconds, when it can be read as a number
    #[must_use]
    pub fn as_secs(&self) -> Option<f64> {
        match self {
            Self::Seconds(secs) => Some(*secs),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Advertising flags of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommerceInfo {
    /// Whether the post may be promoted
    #[serde(deserialize_with = "null_as_default")]
    pub adv_promotable: bool,
    /// Whether the author was invited to ad auctions
    #[serde(deserialize_with = "null_as_default")]
    pub auction_ad_invited: bool,
    /// Branded content kind
    #[serde(deserialize_with = "null_as_default")]
    pub branded_content_type: i64,
    /// Whether comment word filters apply
    #[serde(deserialize_with = "null_as_default")]
    pub with_comment_filter_words: bool,
}

/// Author summary embedded in a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    /// Numeric user id
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Handle
    #[serde(deserialize_with = "null_as_default")]
    pub unique_id: String,
    /// Display name
    #[serde(deserialize_with = "null_as_default")]
    pub nickname: String,
    /// Avatar URL
    #[serde(deserialize_with = "null_as_default")]
    pub avatar: String,
}
