//! Pure operations over connections.
//!
//! Nothing here performs I/O or mutates its input: every function takes the
//! current connection by reference and returns a new one, so a failed merge
//! leaves the caller's state exactly as it was.

use crate::{
    connection::{Connection, Edge, Page},
    node::{Node, NodePatch},
    PagerError, PagerResult,
};
use std::collections::HashSet;
use tracing::debug;

/// Append `edges` to `into`, skipping any node whose id is already present.
///
/// Returns the number of edges inserted.
fn append_unique<N: Node>(
    into: &mut Vec<Edge<N>>,
    seen: &mut HashSet<String>,
    edges: Vec<Edge<N>>,
) -> usize {
    let before = into.len();
    for edge in edges {
        if seen.insert(edge.node.id().to_string()) {
            into.push(edge);
        } else {
            debug!(
                "Dropping duplicate {} {} at cursor {}",
                N::TYPENAME,
                edge.node.id(),
                edge.cursor
            );
        }
    }
    into.len() - before
}

/// Establish a connection from the first page of a query.
///
/// The page must have been fetched without a continuation cursor. Its edges
/// keep their order; a node repeated within the page keeps its first edge.
pub fn initialize<N: Node>(first: Page<N>) -> PagerResult<Connection<N>> {
    if first.after.is_some() {
        return Err(PagerError::StaleCursor {
            expected: None,
            actual: first.after,
        });
    }

    let Connection {
        edges,
        page_info,
        total_count,
    } = first.connection;

    let mut merged = Vec::with_capacity(edges.len());
    let mut seen = HashSet::with_capacity(edges.len());
    append_unique(&mut merged, &mut seen, edges);

    Ok(Connection {
        edges: merged,
        page_info,
        total_count,
    })
}

/// Append the next page to `current`.
///
/// `next` must have been fetched after `current`'s end cursor, and `current`
/// must still have a next page. Edges of `next` whose node is already in
/// `current` are dropped, so earlier edges never move.
pub fn load_more<N: Node>(
    current: &Connection<N>,
    next: Page<N>,
) -> PagerResult<Connection<N>> {
    if !current.page_info.has_next_page {
        return Err(PagerError::NoNextPage);
    }

    if next.after.as_ref() != current.page_info.end_cursor.as_ref() {
        return Err(PagerError::StaleCursor {
            expected: current.page_info.end_cursor.clone(),
            actual: next.after,
        });
    }

    let Connection {
        edges,
        page_info,
        total_count,
    } = next.connection;

    let mut merged = current.edges.clone();
    merged.reserve(edges.len());
    let mut seen: HashSet<String> =
        current.nodes().map(|n| n.id().to_string()).collect();
    let added = append_unique(&mut merged, &mut seen, edges);

    debug!(
        "Merged {added} {} edges after {:?}",
        N::TYPENAME,
        current.page_info.end_cursor
    );

    let mut merged_info = current.page_info.clone();
    merged_info.has_next_page = page_info.has_next_page;
    if page_info.end_cursor.is_some() {
        merged_info.end_cursor = page_info.end_cursor;
    }

    Ok(Connection {
        edges: merged,
        page_info: merged_info,
        total_count: total_count.or(current.total_count),
    })
}

/// Fold a pushed partial update into the node it targets.
///
/// Nodes that were never fetched are not inserted: a pushed node has no
/// position in the server's ordering. Page info and edge order are untouched,
/// and applying the same patch again changes nothing.
pub fn reconcile<N: Node>(current: &Connection<N>, patch: &N::Patch) -> Connection<N> {
    let mut next = current.clone();
    match next.edges.iter_mut().find(|e| e.node.id() == patch.id()) {
        Some(edge) => edge.node.apply(patch),
        None => debug!("No {} {} to reconcile", N::TYPENAME, patch.id()),
    }
    next
}

/// A read-only, restartable view over the nodes of a connection that satisfy a
/// predicate.
pub struct Filtered<'a, N, P> {
    edges: &'a [Edge<N>],
    predicate: P,
}

impl<'a, N, P> Filtered<'a, N, P>
where
    P: Fn(&N) -> bool,
{
    /// Iterate the matching nodes from the start, in edge order.
    pub fn iter(&self) -> impl Iterator<Item = &'a N> + '_ {
        self.edges
            .iter()
            .map(|e| &e.node)
            .filter(move |n| (self.predicate)(*n))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'s, 'a, N, P> IntoIterator for &'s Filtered<'a, N, P>
where
    P: Fn(&N) -> bool,
{
    type Item = &'a N;
    type IntoIter = Box<dyn Iterator<Item = &'a N> + 's>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// View the nodes of `connection` that satisfy `predicate`.
pub fn filter<N, P>(connection: &Connection<N>, predicate: P) -> Filtered<'_, N, P>
where
    P: Fn(&N) -> bool,
{
    Filtered {
        edges: &connection.edges,
        predicate,
    }
}
