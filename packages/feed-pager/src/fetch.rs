//! Collaborators that fetch connection pages.

use crate::{
    connection::{Connection, Cursor},
    node::Node,
    path::{extract_connection, ConnectionPath},
    query::QueryKey,
    PagerResult,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

/// Fetches one page of a query.
///
/// `after` is `None` for the first page. Network and server failures are
/// reported as [`crate::PagerError::Fetch`].
#[async_trait]
pub trait FetchClient<N: Node>: Send + Sync + 'static {
    async fn fetch(
        &self,
        query: &QueryKey,
        after: Option<&Cursor>,
        first: u32,
    ) -> PagerResult<Connection<N>>;
}

/// Produces raw GraphQL response data for a query.
#[async_trait]
pub trait ResponseSource: Send + Sync + 'static {
    async fn query(
        &self,
        query: &QueryKey,
        after: Option<&Cursor>,
        first: u32,
    ) -> PagerResult<Value>;
}

/// Adapts a [`ResponseSource`] into a typed [`FetchClient`] by extracting the
/// connection found at a fixed path in every response.
pub struct PathFetcher<S, N> {
    source: S,
    path: ConnectionPath,
    _node: PhantomData<fn() -> N>,
}

impl<S, N> PathFetcher<S, N> {
    pub fn new(source: S, path: ConnectionPath) -> Self {
        Self {
            source,
            path,
            _node: PhantomData,
        }
    }

    pub fn path(&self) -> &ConnectionPath {
        &self.path
    }
}

#[async_trait]
impl<S, N> FetchClient<N> for PathFetcher<S, N>
where
    S: ResponseSource,
    N: Node + DeserializeOwned,
{
    async fn fetch(
        &self,
        query: &QueryKey,
        after: Option<&Cursor>,
        first: u32,
    ) -> PagerResult<Connection<N>> {
        let response = self.source.query(query, after, first).await?;
        extract_connection(&response, &self.path)
    }
}
