//! Locating a connection inside a query response.

use crate::{
    connection::{Connection, RawConnection},
    PagerError, PagerResult,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, str::FromStr};

/// Dotted path from the root of a response to a connection, e.g. `viewer.drafts`
/// or `article.comments`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionPath {
    segments: Vec<String>,
}

impl ConnectionPath {
    pub fn parse(path: &str) -> PagerResult<Self> {
        if path.is_empty() {
            return Err(PagerError::InvalidConnectionPath(path.to_string()));
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(PagerError::InvalidConnectionPath(path.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk `response` down this path.
    pub fn resolve<'v>(&self, response: &'v Value) -> Option<&'v Value> {
        self.segments
            .iter()
            .try_fold(response, |value, segment| value.get(segment.as_str()))
            .filter(|value| !value.is_null())
    }
}

impl FromStr for ConnectionPath {
    type Err = PagerError;

    fn from_str(s: &str) -> PagerResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Pull the connection at `path` out of a query response and validate its page info.
pub fn extract_connection<N: DeserializeOwned>(
    response: &Value,
    path: &ConnectionPath,
) -> PagerResult<Connection<N>> {
    let value = path.resolve(response).ok_or_else(|| {
        PagerError::MalformedPage(format!("no connection at path '{path}'"))
    })?;

    let raw: RawConnection<N> = serde_json::from_value(value.clone())?;
    Connection::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Comment, Draft};
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_parse_connection_path() {
        let path = ConnectionPath::parse("viewer.drafts").unwrap();
        assert_eq!(path.segments(), ["viewer", "drafts"]);
        assert_eq!(path.to_string(), "viewer.drafts");

        assert_matches!(
            ConnectionPath::parse(""),
            Err(PagerError::InvalidConnectionPath(_))
        );
        assert_matches!(
            "article..comments".parse::<ConnectionPath>(),
            Err(PagerError::InvalidConnectionPath(_))
        );
    }

    #[test]
    fn test_extract_drafts_connection() {
        let response = json!({
            "viewer": {
                "id": "User:1",
                "drafts": {
                    "pageInfo": { "startCursor": "a", "endCursor": "a", "hasNextPage": true },
                    "edges": [
                        {
                            "cursor": "a",
                            "node": { "id": "Draft:1", "title": "Hello", "publishState": "pending" }
                        }
                    ]
                }
            }
        });

        let path = ConnectionPath::parse("viewer.drafts").unwrap();
        let drafts = extract_connection::<Draft>(&response, &path).unwrap();

        assert_eq!(drafts.len(), 1);
        assert!(drafts.edges[0].node.is_locked());
    }

    #[test]
    fn test_extract_nested_comment_replies() {
        let response = json!({
            "article": {
                "comments": {
                    "totalCount": 1,
                    "pageInfo": { "endCursor": "c1", "hasNextPage": false },
                    "edges": [{
                        "cursor": "c1",
                        "node": {
                            "id": "Comment:1",
                            "state": "archived",
                            "comments": {
                                "pageInfo": { "endCursor": "r1", "hasNextPage": false },
                                "edges": [{
                                    "cursor": "r1",
                                    "node": { "id": "Comment:2", "content": "reply" }
                                }]
                            }
                        }
                    }]
                }
            }
        });

        let path = ConnectionPath::parse("article.comments").unwrap();
        let comments = extract_connection::<Comment>(&response, &path).unwrap();

        assert_eq!(comments.total_count, Some(1));
        assert_eq!(comments.edges[0].node.replies().count(), 1);
    }

    #[test]
    fn test_extract_reports_missing_and_malformed_connections() {
        let path = ConnectionPath::parse("viewer.drafts").unwrap();

        assert_matches!(
            extract_connection::<Draft>(&json!({ "viewer": null }), &path),
            Err(PagerError::MalformedPage(_))
        );
        assert_matches!(
            extract_connection::<Draft>(&json!({ "viewer": { "drafts": { "edges": [] } } }), &path),
            Err(PagerError::MalformedPage(_))
        );
        assert_matches!(
            extract_connection::<Draft>(
                &json!({ "viewer": { "drafts": {
                    "pageInfo": { "hasNextPage": false },
                    "edges": [{ "cursor": "a", "node": { "title": "no id" } }]
                } } }),
                &path
            ),
            Err(PagerError::Deserialize(_))
        );
    }
}
