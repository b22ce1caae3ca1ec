//! Relay-style cursor connections.
//! See: https://relay.dev/graphql/connections.htm#sec-Connection-Types

use crate::{node::Node, PagerError, PagerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque position marker in a connection. Only ever compared for equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// See: https://relay.dev/graphql/connections.htm#sec-PageInfo
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    /// Page info of a connection that has nothing more to load.
    pub fn terminal(end_cursor: Option<Cursor>) -> Self {
        Self {
            start_cursor: None,
            end_cursor,
            has_next_page: false,
            has_previous_page: false,
        }
    }
}

/// See: https://relay.dev/graphql/connections.htm#sec-Edge-Types
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge<N> {
    pub cursor: Cursor,
    pub node: N,
}

impl<N> Edge<N> {
    pub fn new(cursor: impl Into<Cursor>, node: N) -> Self {
        Self {
            cursor: cursor.into(),
            node,
        }
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An ordered list of edges plus the information needed to continue it.
///
/// Edge order is the order the server assigned; nothing in this crate ever
/// re-sorts it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "RawConnection<N>",
    bound(deserialize = "N: Deserialize<'de>")
)]
pub struct Connection<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

impl<N> Connection<N> {
    pub fn new(edges: Vec<Edge<N>>, page_info: PageInfo) -> Self {
        Self {
            edges,
            page_info,
            total_count: None,
        }
    }

    /// An empty, exhausted connection.
    pub fn empty() -> Self {
        Self::new(Vec::new(), PageInfo::default())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.has_next_page
    }

    pub fn end_cursor(&self) -> Option<&Cursor> {
        self.page_info.end_cursor.as_ref()
    }

    /// Nodes in edge order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> + Clone {
        self.edges.iter().map(|e| &e.node)
    }
}

impl<N: Node> Connection<N> {
    /// Find the node with the given id, if it was fetched.
    pub fn node(&self, id: &str) -> Option<&N> {
        self.nodes().find(|n| n.id() == id)
    }

    /// Position of the node with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.edges.iter().position(|e| e.node.id() == id)
    }
}

/// A fetched connection page, together with the cursor it was fetched after.
///
/// `after` is `None` for the first page of a query.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<N> {
    pub after: Option<Cursor>,
    pub connection: Connection<N>,
}

impl<N> Page<N> {
    pub fn first(connection: Connection<N>) -> Self {
        Self {
            after: None,
            connection,
        }
    }

    pub fn after(cursor: impl Into<Cursor>, connection: Connection<N>) -> Self {
        Self {
            after: Some(cursor.into()),
            connection,
        }
    }
}

/// Page info exactly as it arrives over the wire, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPageInfo {
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
    pub has_next_page: Option<bool>,
    pub has_previous_page: Option<bool>,
}

impl TryFrom<RawPageInfo> for PageInfo {
    type Error = PagerError;

    fn try_from(raw: RawPageInfo) -> PagerResult<Self> {
        let has_next_page = raw.has_next_page.ok_or_else(|| {
            PagerError::MalformedPage("pageInfo.hasNextPage is missing".into())
        })?;

        if has_next_page && raw.end_cursor.is_none() {
            return Err(PagerError::MalformedPage(
                "pageInfo.endCursor is missing while hasNextPage is true".into(),
            ));
        }

        Ok(PageInfo {
            start_cursor: raw.start_cursor,
            end_cursor: raw.end_cursor,
            has_next_page,
            has_previous_page: raw.has_previous_page.unwrap_or(false),
        })
    }
}

/// A connection exactly as it arrives over the wire, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnection<N> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<N>>,
    pub page_info: Option<RawPageInfo>,
    pub total_count: Option<i64>,
}

impl<N> TryFrom<RawConnection<N>> for Connection<N> {
    type Error = PagerError;

    fn try_from(raw: RawConnection<N>) -> PagerResult<Self> {
        let page_info = raw
            .page_info
            .ok_or_else(|| PagerError::MalformedPage("pageInfo is missing".into()))?;

        Ok(Connection {
            edges: raw.edges,
            page_info: page_info.try_into()?,
            total_count: raw.total_count,
        })
    }
}
