//! Observable owner of one merged connection.

use crate::{
    connection::{Connection, Page},
    entity::EntityPatch,
    merge,
    node::Node,
    query::QueryKey,
    PagerResult,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Exclusive owner of a query's merged connection.
///
/// Renderers read snapshots through [`Pager::watch`] or [`Pager::snapshot`];
/// the only ways to change the state are [`Pager::merge_page`] and
/// [`Pager::reconcile`].
pub struct Pager<N: Node> {
    query: QueryKey,
    state: watch::Sender<Arc<Connection<N>>>,
}

impl<N: Node> Pager<N> {
    /// Create a pager from the first page of its query.
    pub fn new(query: QueryKey, first: Page<N>) -> PagerResult<Self> {
        let connection = merge::initialize(first)?;
        info!(
            "Pager({query}) initialized with {} {} edges, has_next_page={}",
            connection.len(),
            N::TYPENAME,
            connection.has_next_page()
        );
        let (state, _) = watch::channel(Arc::new(connection));
        Ok(Self { query, state })
    }

    pub fn query(&self) -> &QueryKey {
        &self.query
    }

    /// The current merged connection.
    pub fn snapshot(&self) -> Arc<Connection<N>> {
        self.state.borrow().clone()
    }

    /// Subscribe to every future state change.
    pub fn watch(&self) -> watch::Receiver<Arc<Connection<N>>> {
        self.state.subscribe()
    }

    /// Merge the next page into the current state.
    ///
    /// On error nothing is published and the state is unchanged. Returns the
    /// number of edges added.
    pub fn merge_page(&self, next: Page<N>) -> PagerResult<usize> {
        let mut result = Ok(0);
        self.state.send_if_modified(|current| {
            match merge::load_more(&**current, next) {
                Ok(merged) => {
                    let added = merged.len() - current.len();
                    *current = Arc::new(merged);
                    result = Ok(added);
                    true
                }
                Err(e) => {
                    result = Err(e);
                    false
                }
            }
        });
        result
    }

    /// Apply a patch to the node it targets. Returns whether a node was patched.
    pub fn reconcile(&self, patch: &N::Patch) -> bool {
        self.state.send_if_modified(|current| {
            let next = merge::reconcile(&**current, patch);
            if next == **current {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        })
    }

    /// Apply a live update if it targets this pager's node kind.
    pub fn apply_entity_patch(&self, patch: &EntityPatch) -> bool {
        match N::select_patch(patch) {
            Some(patch) => self.reconcile(patch),
            None => {
                debug!(
                    "Pager({}) ignoring {} patch for {}",
                    self.query,
                    patch.typename(),
                    patch.id()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::{Cursor, Edge, PageInfo},
        entity::{Comment, CommentPatch, Draft, DraftPatch},
        PagerError,
    };
    use assert_matches::assert_matches;

    fn drafts(ids: &[&str], end: &str, has_next: bool) -> Connection<Draft> {
        Connection::new(
            ids.iter()
                .map(|id| Edge::new(format!("cursor-{id}"), Draft::new(*id, "Untitled")))
                .collect(),
            PageInfo {
                end_cursor: Some(Cursor::new(end)),
                has_next_page: has_next,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_merge_page_publishes_new_state() {
        let pager = Pager::new(
            QueryKey::viewer_drafts("User:1"),
            Page::first(drafts(&["1"], "cursor-1", true)),
        )
        .unwrap();
        let mut rx = pager.watch();

        let added = pager
            .merge_page(Page::after("cursor-1", drafts(&["2", "3"], "cursor-3", false)))
            .unwrap();

        assert_eq!(added, 2);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 3);
        assert_eq!(pager.snapshot().len(), 3);
    }

    #[test]
    fn test_failed_merge_leaves_state_untouched() {
        let pager = Pager::new(
            QueryKey::viewer_drafts("User:1"),
            Page::first(drafts(&["1"], "cursor-1", true)),
        )
        .unwrap();
        let rx = pager.watch();
        let before = pager.snapshot();

        let res = pager.merge_page(Page::after("cursor-0", drafts(&["2"], "cursor-2", false)));

        assert_matches!(res, Err(PagerError::StaleCursor { .. }));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(pager.snapshot(), before);
    }

    #[test]
    fn test_reconcile_only_notifies_on_change() {
        let pager = Pager::new(
            QueryKey::viewer_drafts("User:1"),
            Page::first(drafts(&["1"], "cursor-1", false)),
        )
        .unwrap();
        let mut rx = pager.watch();
        let patch = DraftPatch {
            title: Some("Renamed".into()),
            ..DraftPatch::new("1")
        };

        assert!(pager.reconcile(&patch));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!pager.reconcile(&patch));
        assert!(!rx.has_changed().unwrap());
        assert!(!pager.reconcile(&DraftPatch::new("404")));
        assert_eq!(pager.snapshot().edges[0].node.title, "Renamed");
    }

    #[test]
    fn test_entity_patches_of_other_kinds_are_ignored() {
        let pager = Pager::new(
            QueryKey::viewer_drafts("User:1"),
            Page::first(drafts(&["1"], "cursor-1", false)),
        )
        .unwrap();

        let comment_patch = EntityPatch::Comment(CommentPatch {
            content: Some("same id, other kind".into()),
            ..CommentPatch::new("1")
        });
        assert!(!pager.apply_entity_patch(&comment_patch));

        let draft_patch = EntityPatch::Draft(DraftPatch {
            summary: Some("Summary".into()),
            ..DraftPatch::new("1")
        });
        assert!(pager.apply_entity_patch(&draft_patch));
        assert_eq!(pager.snapshot().edges[0].node.summary, "Summary");

        let comments = Pager::<Comment>::new(
            QueryKey::article_comments("Article:1"),
            Page::first(Connection::empty()),
        )
        .unwrap();
        assert!(comments.snapshot().is_empty());
    }
}
