//! # feed-pager
//!
//! Keeps one cursor-paginated connection per feed (a viewer's drafts, an
//! article's comments), merges newly fetched pages into it without
//! duplicates, and folds live updates into the nodes it already holds.
//!
//! The merge logic in [`merge`] is pure. [`store::Pager`] owns the merged
//! state and publishes snapshots to renderers, [`driver::LoadMoreDriver`]
//! fetches pages one at a time, and [`live`] forwards pushed patches.

#![deny(unused_crate_dependencies)]

pub mod connection;
pub mod driver;
pub mod entity;
pub mod fetch;
pub mod live;
pub mod merge;
pub mod node;
pub mod path;
pub mod query;
pub mod store;
pub mod testing;

pub use connection::{Connection, Cursor, Edge, Page, PageInfo};
pub use driver::{LoadMoreDriver, LoadOutcome};
pub use entity::{Article, Comment, Draft, EntityPatch};
pub use fetch::{FetchClient, PathFetcher, ResponseSource};
pub use live::{LiveChannel, SubscriptionRegistry};
pub use node::{Node, NodePatch};
pub use path::ConnectionPath;
pub use query::QueryKey;
pub use store::Pager;
use thiserror::Error;

pub mod prelude {
    pub use super::{
        merge, Article, Comment, Connection, ConnectionPath, Cursor, Draft, Edge,
        EntityPatch, FetchClient, LiveChannel, LoadMoreDriver, LoadOutcome, Node,
        NodePatch, Page, PageInfo, Pager, PagerError, PagerResult, PathFetcher,
        QueryKey, ResponseSource, SubscriptionRegistry,
    };
    pub use feed_pager_lib::config::PagerConfig;
}

pub type PagerResult<T> = core::result::Result<T, PagerError>;

#[derive(Error, Debug)]
pub enum PagerError {
    #[error("Malformed page: {0}")]
    MalformedPage(String),
    #[error("Page was fetched after {actual:?} but the connection continues from {expected:?}")]
    StaleCursor {
        expected: Option<Cursor>,
        actual: Option<Cursor>,
    },
    #[error("Connection has no next page")]
    NoNextPage,
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Could not deserialize page: {0:?}")]
    Deserialize(#[from] serde_json::Error),
    #[error("Invalid connection path: {0:?}")]
    InvalidConnectionPath(String),
    #[error("Query {0} already has a live subscription")]
    AlreadySubscribed(String),
}
