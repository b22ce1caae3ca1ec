//! Entities that can live in a connection.
//! See: https://graphql.org/learn/global-object-identification/#node-interface

use crate::entity::EntityPatch;
use std::fmt::Debug;

/// An entity with a durable identity.
///
/// `id()` is the dedup key used when pages are merged; cursors are never used
/// for identity.
pub trait Node: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Partial update delivered out of band for this kind of node.
    type Patch: NodePatch;

    /// GraphQL type name, used to route live patches.
    const TYPENAME: &'static str;

    fn id(&self) -> &str;

    /// Shallow, field-level merge: fields present in the patch overwrite,
    /// absent fields are left untouched.
    fn apply(&mut self, patch: &Self::Patch);

    /// Pick this node kind's patch out of a live update, if it is one.
    fn select_patch(patch: &EntityPatch) -> Option<&Self::Patch>;
}

/// A partial update for one node, addressed by id.
pub trait NodePatch: Clone + Debug + Send + Sync + 'static {
    fn id(&self) -> &str;
}
