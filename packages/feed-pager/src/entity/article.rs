use super::{apply_fields, EntityPatch};
use crate::node::{Node, NodePatch};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleState {
    #[default]
    Active,
    Archived,
    Banned,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub media_hash: Option<String>,
    #[serde(default)]
    pub state: ArticleState,
    /// Whether the article pushes live comment updates.
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub appreciations_received_total: i64,
}

impl Article {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    pub id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub media_hash: Option<String>,
    pub state: Option<ArticleState>,
    pub live: Option<bool>,
    pub comment_count: Option<i64>,
    pub appreciations_received_total: Option<i64>,
}

impl ArticlePatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl NodePatch for ArticlePatch {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Node for Article {
    type Patch = ArticlePatch;

    const TYPENAME: &'static str = "Article";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: &ArticlePatch) {
        apply_fields!(self, patch;
            title,
            summary,
            state,
            live,
            comment_count,
            appreciations_received_total,
        );
        if let Some(media_hash) = &patch.media_hash {
            self.media_hash = Some(media_hash.clone());
        }
    }

    fn select_patch(patch: &EntityPatch) -> Option<&ArticlePatch> {
        match patch {
            EntityPatch::Article(p) => Some(p),
            _ => None,
        }
    }
}
