use std::fmt;

/// Identity of one paged query, e.g. the viewer's drafts or one article's comments.
///
/// Mirrors the `@connection(key: ...)` directive: `name` is the connection key and
/// `scope` whatever the query is parametrized by (viewer id, article id).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub name: String,
    pub scope: String,
}

impl QueryKey {
    pub fn new(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
        }
    }

    pub fn viewer_drafts(viewer_id: impl Into<String>) -> Self {
        Self::new("viewerDrafts", viewer_id)
    }

    pub fn article_comments(article_id: impl Into<String>) -> Self {
        Self::new("articleComments", article_id)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.scope)
    }
}
