//! Drives infinite scroll: fetches the next page of a query, one request at a time.

use crate::{
    connection::{Connection, Cursor, Page},
    fetch::FetchClient,
    node::Node,
    query::QueryKey,
    store::Pager,
    PagerError, PagerResult,
};
use feed_pager_lib::{
    config::{FetchConfig, PagerConfig},
    utils::attempt_with_backoff,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, error, info, warn};

/// What a call to [`LoadMoreDriver::load_more`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The next page was merged; `added` edges were new.
    Merged { added: usize },
    /// The connection has no next page. Nothing was fetched.
    Exhausted,
    /// Another load for this connection is already in flight.
    Suppressed,
    /// The result arrived after teardown, or no longer continues the connection.
    Discarded,
}

/// Marks a connection as having a load in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Loads pages of one query into a [`Pager`].
///
/// Only one load runs at a time; a second trigger while one is outstanding is
/// suppressed. After [`LoadMoreDriver::teardown`], late results are discarded.
pub struct LoadMoreDriver<N: Node, C: FetchClient<N>> {
    pager: Arc<Pager<N>>,
    client: Arc<C>,
    fetch_config: FetchConfig,
    page_size: u32,
    in_flight: AtomicBool,
    live: AtomicBool,
}

impl<N: Node, C: FetchClient<N>> LoadMoreDriver<N, C> {
    /// Fetch the first page of `query` and start tracking it.
    pub async fn start(
        client: Arc<C>,
        query: QueryKey,
        config: &PagerConfig,
    ) -> PagerResult<Self> {
        let page_size = if config.page_size == 0 {
            warn!("Pager({query}) configured with page_size 0, requesting 1 edge per page");
            1
        } else {
            config.page_size
        };

        let first =
            fetch_page(client.as_ref(), &query, None, page_size, &config.fetch).await?;
        let pager = Pager::new(query, Page::first(first))?;

        Ok(Self {
            pager: Arc::new(pager),
            client,
            fetch_config: config.fetch.clone(),
            page_size,
            in_flight: AtomicBool::new(false),
            live: AtomicBool::new(true),
        })
    }

    pub fn pager(&self) -> &Arc<Pager<N>> {
        &self.pager
    }

    pub fn query(&self) -> &QueryKey {
        self.pager.query()
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether a scroll trigger should call [`LoadMoreDriver::load_more`] now.
    pub fn should_load(&self) -> bool {
        self.is_live() && !self.is_loading() && self.pager.snapshot().has_next_page()
    }

    /// Fetch and merge the page after the current end cursor.
    ///
    /// A failed fetch leaves the connection unchanged and is returned to the
    /// caller, who decides whether to offer a retry.
    pub async fn load_more(&self) -> PagerResult<LoadOutcome> {
        if !self.is_live() {
            return Ok(LoadOutcome::Discarded);
        }

        let _in_flight = match InFlight::acquire(&self.in_flight) {
            Some(guard) => guard,
            None => {
                debug!("Pager({}) load already in flight", self.query());
                return Ok(LoadOutcome::Suppressed);
            }
        };

        let snapshot = self.pager.snapshot();
        if !snapshot.has_next_page() {
            debug!("Pager({}) has no next page", self.query());
            return Ok(LoadOutcome::Exhausted);
        }

        let after = snapshot.end_cursor().cloned();
        let connection = fetch_page(
            self.client.as_ref(),
            self.query(),
            after.as_ref(),
            self.page_size,
            &self.fetch_config,
        )
        .await?;

        if !self.is_live() {
            warn!(
                "Pager({}) torn down while fetching after {after:?}, discarding page",
                self.query()
            );
            return Ok(LoadOutcome::Discarded);
        }

        match self.pager.merge_page(Page { after, connection }) {
            Ok(added) => Ok(LoadOutcome::Merged { added }),
            Err(e @ (PagerError::StaleCursor { .. } | PagerError::NoNextPage)) => {
                warn!("Pager({}) discarding page: {e}", self.query());
                Ok(LoadOutcome::Discarded)
            }
            Err(e) => Err(e),
        }
    }

    /// Stop accepting results. Loads that resolve afterwards are discarded.
    pub fn teardown(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            info!("Pager({}) torn down", self.query());
        }
    }
}

impl<N: Node, C: FetchClient<N>> Drop for LoadMoreDriver<N, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Fetch one page, retrying transport failures with backoff.
async fn fetch_page<N: Node, C: FetchClient<N>>(
    client: &C,
    query: &QueryKey,
    after: Option<&Cursor>,
    first: u32,
    config: &FetchConfig,
) -> PagerResult<Connection<N>> {
    debug!("Pager({query}) fetching {first} after {after:?}");
    attempt_with_backoff(
        config.retry_attempts,
        config.initial_retry_delay_ms,
        move || client.fetch(query, after, first),
        |e| matches!(e, PagerError::Fetch(_)),
    )
    .await
    .map_err(|e| {
        error!("Pager({query}) failed to fetch page after {after:?}: {e}");
        e
    })
}
