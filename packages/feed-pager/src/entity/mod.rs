//! Typed entities served by the feeds, and the patches the live channel
//! delivers for them.

mod article;
mod comment;
mod draft;

/// Overwrite each listed field of `$node` with the patch value, if the patch carries one.
macro_rules! apply_fields {
    ($node:expr, $patch:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $node.$field = value.clone();
            }
        )+
    };
}

pub(crate) use apply_fields;

pub use article::*;
pub use comment::*;
pub use draft::*;

use crate::node::NodePatch;
use serde::{Deserialize, Serialize};

/// A push-delivered partial update, tagged with the GraphQL type of the node
/// it targets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum EntityPatch {
    Article(ArticlePatch),
    Comment(CommentPatch),
    Draft(DraftPatch),
}

impl EntityPatch {
    pub fn id(&self) -> &str {
        match self {
            Self::Article(p) => p.id(),
            Self::Comment(p) => p.id(),
            Self::Draft(p) => p.id(),
        }
    }

    pub fn typename(&self) -> &'static str {
        match self {
            Self::Article(_) => "Article",
            Self::Comment(_) => "Comment",
            Self::Draft(_) => "Draft",
        }
    }
}

impl From<ArticlePatch> for EntityPatch {
    fn from(p: ArticlePatch) -> Self {
        Self::Article(p)
    }
}

impl From<CommentPatch> for EntityPatch {
    fn from(p: CommentPatch) -> Self {
        Self::Comment(p)
    }
}

impl From<DraftPatch> for EntityPatch {
    fn from(p: DraftPatch) -> Self {
        Self::Draft(p)
    }
}
