use super::{apply_fields, EntityPatch};
use crate::{
    connection::Connection,
    merge::{self, Filtered},
    node::{Node, NodePatch},
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentState {
    #[default]
    Active,
    Archived,
    Banned,
    Collapsed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub state: CommentState,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub author: Option<String>,
    /// Replies to this comment, when the query asked for them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Connection<Comment>>,
}

impl Comment {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == CommentState::Active
    }

    /// Replies in edge order; empty when none were fetched.
    pub fn replies(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().flat_map(|c| c.nodes())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPatch {
    pub id: String,
    pub content: Option<String>,
    pub state: Option<CommentState>,
    pub pinned: Option<bool>,
    pub upvotes: Option<i64>,
    pub downvotes: Option<i64>,
}

impl CommentPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl NodePatch for CommentPatch {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Node for Comment {
    type Patch = CommentPatch;

    const TYPENAME: &'static str = "Comment";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: &CommentPatch) {
        apply_fields!(self, patch; content, state, pinned, upvotes, downvotes);
    }

    fn select_patch(patch: &EntityPatch) -> Option<&CommentPatch> {
        match patch {
            EntityPatch::Comment(p) => Some(p),
            _ => None,
        }
    }
}

/// Options for [`is_visible`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CommentFilter {
    /// Drop pinned comments; they are shown in a section of their own.
    pub exclude_pinned: bool,
}

/// Whether a comment should be shown in a feed.
///
/// A comment that is no longer active stays visible while at least one of its
/// replies is, so the thread does not disappear with its root.
pub fn is_visible(comment: &Comment, filter: CommentFilter) -> bool {
    if filter.exclude_pinned && comment.pinned {
        return false;
    }
    comment.is_active() || comment.replies().any(Comment::is_active)
}

/// Visible pinned comments.
pub fn pinned_comments(
    connection: &Connection<Comment>,
) -> Filtered<'_, Comment, impl Fn(&Comment) -> bool> {
    merge::filter(connection, |c: &Comment| {
        c.pinned && is_visible(c, CommentFilter::default())
    })
}

/// Visible comments that are not pinned.
pub fn regular_comments(
    connection: &Connection<Comment>,
) -> Filtered<'_, Comment, impl Fn(&Comment) -> bool> {
    merge::filter(connection, |c: &Comment| {
        is_visible(
            c,
            CommentFilter {
                exclude_pinned: true,
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Edge, PageInfo};

    fn with_replies(mut comment: Comment, replies: Vec<Comment>) -> Comment {
        let edges = replies
            .into_iter()
            .map(|r| Edge::new(r.id.clone(), r))
            .collect();
        comment.comments = Some(Connection::new(edges, PageInfo::terminal(None)));
        comment
    }

    #[test]
    fn test_active_comments_are_visible() {
        let comment = Comment::new("1", "hello");
        assert!(is_visible(&comment, CommentFilter::default()));
    }

    #[test]
    fn test_inactive_comment_without_active_replies_is_hidden() {
        let archived = Comment {
            state: CommentState::Archived,
            ..Comment::new("1", "gone")
        };
        assert!(!is_visible(&archived, CommentFilter::default()));

        let banned_reply = Comment {
            state: CommentState::Banned,
            ..Comment::new("2", "spam")
        };
        let thread = with_replies(archived, vec![banned_reply]);
        assert!(!is_visible(&thread, CommentFilter::default()));
    }

    #[test]
    fn test_inactive_comment_with_active_reply_is_visible() {
        let archived = Comment {
            state: CommentState::Archived,
            ..Comment::new("1", "gone")
        };
        let thread = with_replies(archived, vec![Comment::new("2", "still here")]);
        assert!(is_visible(&thread, CommentFilter::default()));
    }

    #[test]
    fn test_pinned_comments_can_be_excluded() {
        let pinned = Comment {
            pinned: true,
            ..Comment::new("1", "pinned")
        };
        assert!(is_visible(&pinned, CommentFilter::default()));
        assert!(!is_visible(
            &pinned,
            CommentFilter {
                exclude_pinned: true
            }
        ));
    }

    #[test]
    fn test_pinned_and_regular_split() {
        let feed = Connection::new(
            vec![
                Edge::new(
                    "a",
                    Comment {
                        pinned: true,
                        ..Comment::new("1", "pinned")
                    },
                ),
                Edge::new("b", Comment::new("2", "regular")),
                Edge::new(
                    "c",
                    Comment {
                        state: CommentState::Banned,
                        ..Comment::new("3", "hidden")
                    },
                ),
                Edge::new("d", Comment::new("4", "regular")),
            ],
            PageInfo::terminal(Some("d".into())),
        );

        let pinned = pinned_comments(&feed);
        let regular = regular_comments(&feed);

        assert_eq!(pinned.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), ["1"]);
        assert_eq!(
            regular.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            ["2", "4"]
        );
        assert_eq!(regular.count(), 2);
        assert_eq!(feed.len(), 4);
    }

    #[test]
    fn test_comment_patch_leaves_replies_alone() {
        let mut thread = with_replies(Comment::new("1", "root"), vec![Comment::new("2", "reply")]);
        thread.apply(&CommentPatch {
            pinned: Some(true),
            ..CommentPatch::new("1")
        });

        assert!(thread.pinned);
        assert_eq!(thread.content, "root");
        assert_eq!(thread.replies().count(), 1);
    }
}
