//! Lazy walk over a user's feed
//!
//! [`FeedPaginator`] stitches successive `user/posts` pages into one
//! pull-based sequence:
//! - a page is fetched only when the consumer asks for an item past the
//!   current one
//! - `hasMore == false` is the only end-of-feed signal
//! - a page error is yielded once and ends the sequence
//! - an enrichment error is yielded in place of that item and the walk goes on
//!
//! Dropping the paginator, or a pending [`FeedPaginator::next`] future, stops
//! the walk; no further upstream calls are made.
//!
//! # Example
//!
//! ```rust,no_run
//! use tikwm_api_client::TikwmClient;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TikwmClient::new()?;
//! let mut feed = client.users().feed("gioscottii", true);
//!
//! while let Some(post) = feed.next().await {
//!     let post = post?;
//!     println!("{} {:?}", post.id(), post.content_urls(true));
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::TikwmClient;
use crate::endpoints::Post;
use crate::error::ApiResult;
use futures_util::stream::{self, Stream};
use std::collections::VecDeque;
use tracing::debug;

/// Cursor of the first feed page
pub const INITIAL_CURSOR: &str = "0";

#[derive(Debug)]
enum State {
    Fetching(String),
    Draining {
        items: VecDeque<Post>,
        next_cursor: Option<String>,
    },
    Done,
}

/// Pull-based sequence of every post in a user's feed
#[derive(Debug)]
pub struct FeedPaginator {
    client: TikwmClient,
    user: String,
    hd: bool,
    page_size: u32,
    pages_fetched: usize,
    state: State,
}

impl FeedPaginator {
    pub(crate) fn new(client: TikwmClient, user: &str, hd: bool) -> Self {
        let page_size = client.config().feed_page_size;
        Self {
            client,
            user: user.to_string(),
            hd,
            page_size,
            pages_fetched: 0,
            state: State::Fetching(INITIAL_CURSOR.to_string()),
        }
    }

    /// Builder-style method to override the configured page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Number of feed pages requested so far
    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Whether the sequence has ended
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// Pull the next post
    ///
    /// Returns `None` once the feed is exhausted or after a page error has
    /// been yielded.
    pub async fn next(&mut self) -> Option<ApiResult<Post>> {
        loop {
            // Left as `Done` while a page is in flight: a cancelled fetch ends the walk.
            match std::mem::replace(&mut self.state, State::Done) {
                State::Done => return None,
                State::Fetching(cursor) => {
                    self.pages_fetched += 1;
                    let page = match self
                        .client
                        .users()
                        .feed_page(&self.user, self.page_size, &cursor)
                        .await
                    {
                        Ok(page) => page,
                        Err(e) => {
                            debug!(user = %self.user, cursor = %cursor, error = %e, "Feed walk stopped");
                            return Some(Err(e));
                        }
                    };

                    debug!(
                        user = %self.user,
                        cursor = %cursor,
                        items = page.videos.len(),
                        has_more = page.has_more,
                        "Feed page fetched"
                    );
                    self.state = State::Draining {
                        items: page.videos.into(),
                        next_cursor: page.has_more.then_some(page.cursor),
                    };
                }
                State::Draining {
                    mut items,
                    next_cursor,
                } => {
                    let Some(post) = items.pop_front() else {
                        if let Some(cursor) = next_cursor {
                            self.state = State::Fetching(cursor);
                        }
                        continue;
                    };

                    if !self.hd {
                        self.state = State::Draining { items, next_cursor };
                        return Some(Ok(post));
                    }

                    // Still `Done` while enriching: a cancelled pull drops the rest of the page.
                    let enriched = self.client.posts().fetch(post.id(), true).await;
                    self.state = State::Draining { items, next_cursor };
                    return Some(enriched);
                }
            }
        }
    }

    /// Adapt the paginator into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = ApiResult<Post>> {
        stream::unfold(self, |mut paginator| async move {
            let item = paginator.next().await?;
            Some((item, paginator))
        })
    }
}
