//! In-memory collaborators for exercising pagers without a server.

use crate::{
    connection::{Connection, Cursor, Edge, PageInfo},
    entity::{Article, Comment, Draft},
    fetch::FetchClient,
    node::Node,
    query::QueryKey,
    PagerError, PagerResult,
};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, MutexGuard,
};
use tokio::sync::Semaphore;

pub fn drafts(n: usize) -> Vec<Draft> {
    (0..n)
        .map(|i| Draft::new(format!("Draft:{i}"), format!("Draft #{i}")))
        .collect()
}

pub fn articles(n: usize) -> Vec<Article> {
    (0..n)
        .map(|i| Article::new(format!("Article:{i}"), format!("Article #{i}")))
        .collect()
}

pub fn comments(n: usize) -> Vec<Comment> {
    (0..n)
        .map(|i| Comment::new(format!("Comment:{i}"), format!("Comment #{i}")))
        .collect()
}

/// Cursor the mock source assigns to a node.
pub fn cursor_of<N: Node>(node: &N) -> Cursor {
    Cursor::new(format!("cursor:{}", node.id()))
}

/// A paged source backed by a list of nodes.
///
/// Failures can be scripted with [`MockFetcher::fail_next`] and
/// [`MockFetcher::malform_next`]. [`MockFetcher::set_overlap`] makes pages
/// overlap the previous one. A gated fetcher holds every request until
/// [`MockFetcher::release`] is called.
pub struct MockFetcher<N> {
    nodes: Mutex<Vec<N>>,
    calls: AtomicUsize,
    failures: AtomicUsize,
    malformed: AtomicUsize,
    overlap: AtomicUsize,
    gate: Option<Semaphore>,
}

impl<N: Node> MockFetcher<N> {
    pub fn new(nodes: Vec<N>) -> Self {
        Self {
            nodes: Mutex::new(nodes),
            calls: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            malformed: AtomicUsize::new(0),
            overlap: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// A fetcher whose requests only complete once released.
    pub fn gated(nodes: Vec<N>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(nodes)
        }
    }

    /// Let `n` pending or future requests complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of fetches issued so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fail the next `n` fetches with [`PagerError::Fetch`].
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Answer the next `n` fetches with [`PagerError::MalformedPage`].
    pub fn malform_next(&self, n: usize) {
        self.malformed.store(n, Ordering::SeqCst);
    }

    /// Start continued pages `n` edges before the requested cursor.
    pub fn set_overlap(&self, n: usize) {
        self.overlap.store(n, Ordering::SeqCst);
    }

    pub fn insert(&self, index: usize, node: N) {
        let mut nodes = self.nodes();
        let index = index.min(nodes.len());
        nodes.insert(index, node);
    }

    fn nodes(&self) -> MutexGuard<'_, Vec<N>> {
        self.nodes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn page(&self, after: Option<&Cursor>, first: u32) -> PagerResult<Connection<N>> {
        let nodes = self.nodes();

        let start = match after {
            None => 0,
            Some(cursor) => {
                let position = nodes
                    .iter()
                    .position(|n| &cursor_of(n) == cursor)
                    .ok_or_else(|| PagerError::Fetch(format!("unknown cursor {cursor}")))?;
                (position + 1).saturating_sub(self.overlap.load(Ordering::SeqCst))
            }
        };
        let end = (start + first as usize).min(nodes.len());
        let slice = nodes.get(start..end).unwrap_or_default();

        let edges: Vec<Edge<N>> = slice
            .iter()
            .map(|n| Edge::new(cursor_of(n), n.clone()))
            .collect();

        Ok(Connection {
            page_info: PageInfo {
                start_cursor: edges.first().map(|e| e.cursor.clone()),
                end_cursor: edges.last().map(|e| e.cursor.clone()),
                has_next_page: end < nodes.len(),
                has_previous_page: start > 0,
            },
            edges,
            total_count: Some(nodes.len() as i64),
        })
    }
}

#[async_trait]
impl<N: Node> FetchClient<N> for MockFetcher<N> {
    async fn fetch(
        &self,
        _query: &QueryKey,
        after: Option<&Cursor>,
        first: u32,
    ) -> PagerResult<Connection<N>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| PagerError::Fetch(e.to_string()))?
                .forget();
        }

        if Self::take(&self.failures) {
            return Err(PagerError::Fetch("connection reset".into()));
        }

        if Self::take(&self.malformed) {
            return Err(PagerError::MalformedPage("pageInfo is missing".into()));
        }

        self.page(after, first)
    }
}
