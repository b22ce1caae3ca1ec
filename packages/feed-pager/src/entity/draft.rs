use super::{apply_fields, EntityPatch};
use crate::node::{Node, NodePatch};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    #[default]
    Unpublished,
    Pending,
    Published,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publish_state: PublishState,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Draft {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Pending and published drafts can no longer be edited.
    pub fn is_locked(&self) -> bool {
        matches!(
            self.publish_state,
            PublishState::Pending | PublishState::Published
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPatch {
    pub id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub publish_state: Option<PublishState>,
    pub updated_at: Option<String>,
}

impl DraftPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl NodePatch for DraftPatch {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Node for Draft {
    type Patch = DraftPatch;

    const TYPENAME: &'static str = "Draft";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: &DraftPatch) {
        apply_fields!(self, patch; title, summary, publish_state);
        if let Some(updated_at) = &patch.updated_at {
            self.updated_at = Some(updated_at.clone());
        }
    }

    fn select_patch(patch: &EntityPatch) -> Option<&DraftPatch> {
        match patch {
            EntityPatch::Draft(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_state_locks_draft() {
        let mut draft = Draft::new("d1", "Untitled");
        assert!(!draft.is_locked());

        draft.apply(&DraftPatch {
            publish_state: Some(PublishState::Pending),
            updated_at: Some("2020-01-01T00:00:00Z".into()),
            ..DraftPatch::new("d1")
        });

        assert!(draft.is_locked());
        assert_eq!(draft.title, "Untitled");
        assert_eq!(draft.updated_at.as_deref(), Some("2020-01-01T00:00:00Z"));
    }
}
