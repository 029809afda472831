use crate::ids::*;
use lathe_base::bounding_box::BoundingBox;
use lathe_base::box_tree::BoxTree;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A volume: a connected region of a body, owning faces and wire edges.
#[derive(Debug, Default)]
pub struct Volume {
    pub(crate) body: Option<BodyId>,
    pub(crate) faces: BTreeSet<FaceId>,
    pub(crate) edges: BTreeSet<EdgeId>,
    pub(crate) owners: BTreeSet<EntityId>,
    pub(crate) cached_box: RwLock<Option<BoundingBox>>,
    pub(crate) cached_tree: RwLock<Option<Arc<BoxTree<FaceId>>>>,
}

impl Volume {
    /// the parent body
    #[inline(always)]
    pub fn body(&self) -> Option<BodyId> { self.body }

    /// the faces of the volume, in id order
    #[inline(always)]
    pub fn faces(&self) -> &BTreeSet<FaceId> { &self.faces }

    /// the wire edges of the volume, in id order
    #[inline(always)]
    pub fn edges(&self) -> &BTreeSet<EdgeId> { &self.edges }

    /// the entities referring to this volume
    #[inline(always)]
    pub fn owners(&self) -> &BTreeSet<EntityId> { &self.owners }

    /// a volume is top level when it has no body and no owners
    #[inline(always)]
    pub fn is_top_level(&self) -> bool { self.body.is_none() && self.owners.is_empty() }

    pub(crate) fn invalidate(&self) {
        *self.cached_box.write() = None;
        *self.cached_tree.write() = None;
    }
}

impl Clone for Volume {
    fn clone(&self) -> Self {
        Self {
            body: self.body,
            faces: self.faces.clone(),
            edges: self.edges.clone(),
            owners: self.owners.clone(),
            cached_box: RwLock::new(None),
            cached_tree: RwLock::new(None),
        }
    }
}
