//! Lazy iteration over paginated results.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use futures::stream::{self, Stream};
use tracing::debug;

use crate::client::{ApiCall, ClientCore};
use crate::error::{Error, Result};

/// Query parameter carrying the continuation token.
pub const CONTINUATION_TOKEN: &str = "continuation_token";

struct PageSource<T> {
    core: Arc<ClientCore>,
    call: ApiCall<T>,
}

/// Items of a response, fetched page by page as they are consumed.
///
/// The iterator starts with the first page's items. Once those run out and the
/// server indicated more (a continuation token, and `more_items_remaining` not
/// `false`), it repeats the original call with the token through the client's
/// dispatcher and continues with the new page. It is single-pass: once it
/// returns `None` it stays exhausted and never touches the network again.
///
/// # Example
///
/// ```rust,no_run
/// # use flashblade_sdk::{Client, ListParams};
/// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
/// let response = client.file_systems().list(&ListParams::new()).await?.into_result()?;
/// let mut items = response.into_items();
/// while let Some(fs) = items.next().await? {
///     println!("{:?}", fs.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ItemIterator<T> {
    source: Option<PageSource<T>>,
    continuation_token: Option<String>,
    total_item_count: Option<u64>,
    more_items_remaining: Option<bool>,
    request_id: String,
    buffer: VecDeque<T>,
    exhausted: bool,
}

impl<T> ItemIterator<T> {
    pub(crate) fn new(
        core: Arc<ClientCore>,
        call: ApiCall<T>,
        continuation_token: Option<String>,
        total_item_count: Option<u64>,
        items: Vec<T>,
        request_id: String,
        more_items_remaining: Option<bool>,
    ) -> Self {
        Self {
            source: Some(PageSource { core, call }),
            continuation_token,
            total_item_count,
            more_items_remaining,
            request_id,
            buffer: items.into(),
            exhausted: false,
        }
    }

    /// An iterator over a fixed set of items with no further pages.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            source: None,
            continuation_token: None,
            total_item_count: None,
            more_items_remaining: Some(false),
            request_id: String::new(),
            buffer: items.into(),
            exhausted: false,
        }
    }

    /// Number of items across all pages, if the server reported it.
    #[must_use]
    pub fn total_item_count(&self) -> Option<u64> {
        self.total_item_count
    }

    /// Token that will be used for the next page fetch.
    #[must_use]
    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    /// Request id shared by every page of this result.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Items already fetched but not yet yielded.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true once the iterator has yielded its last item.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn has_more_pages(&self) -> bool {
        self.source.is_some()
            && self.continuation_token.is_some()
            && self.more_items_remaining != Some(false)
    }

    /// Returns the next item, fetching the next page when needed.
    ///
    /// # Errors
    ///
    /// Fails if a page fetch fails; the iterator is exhausted afterwards.
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.exhausted || !self.has_more_pages() {
                self.exhausted = true;
                return Ok(None);
            }
            if let Err(e) = self.fetch_next_page().await {
                self.exhausted = true;
                return Err(e);
            }
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let (Some(source), Some(token)) = (&self.source, self.continuation_token.take()) else {
            return Ok(());
        };

        let mut call = source.call.clone();
        call.params.insert(CONTINUATION_TOKEN, &token);
        call.request_id = Some(self.request_id.clone());
        debug!(path = %call.endpoint.path, request_id = %self.request_id, "fetching next page");

        let page = source
            .core
            .fetch_page(&call)
            .await?
            .map_err(|e| Error::PageFetch {
                status: e.status,
                errors: e.errors,
            })?;

        self.continuation_token = page.continuation_token;
        self.more_items_remaining = page.more_items_remaining;
        if page.total_item_count.is_some() {
            self.total_item_count = page.total_item_count;
        }
        self.buffer.extend(page.items);
        Ok(())
    }

    /// Drains every remaining item into a vector.
    ///
    /// # Errors
    ///
    /// Fails if any page fetch fails.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(self.buffer.len());
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Turns the iterator into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
        stream::try_unfold(self, |mut items| async move {
            Ok(items.next().await?.map(|item| (item, items)))
        })
    }
}

impl<T> fmt::Debug for ItemIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemIterator")
            .field("buffered", &self.buffer.len())
            .field("continuation_token", &self.continuation_token)
            .field("total_item_count", &self.total_item_count)
            .field("more_items_remaining", &self.more_items_remaining)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
