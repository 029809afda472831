use crate::ids::*;
use lathe_base::bounding_box::BoundingBox;
use lathe_base::cgmath64::*;
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// A body: the top of the ownership chain, owning a set of volumes.
#[derive(Debug, Default)]
pub struct Body {
    pub(crate) volumes: BTreeSet<VolumeId>,
    pub(crate) points: Vec<Point3>,
    pub(crate) owners: BTreeSet<EntityId>,
    pub(crate) cached_box: RwLock<Option<BoundingBox>>,
}

impl Body {
    /// the volumes owned by this body, in id order
    #[inline(always)]
    pub fn volumes(&self) -> &BTreeSet<VolumeId> { &self.volumes }

    /// optional construction points
    #[inline(always)]
    pub fn points(&self) -> &[Point3] { &self.points }

    /// the entities referring to this body
    #[inline(always)]
    pub fn owners(&self) -> &BTreeSet<EntityId> { &self.owners }

    /// a body is top level when nothing owns it
    #[inline(always)]
    pub fn is_top_level(&self) -> bool { self.owners.is_empty() }

    pub(crate) fn invalidate(&self) { *self.cached_box.write() = None; }
}

impl Clone for Body {
    fn clone(&self) -> Self {
        Self {
            volumes: self.volumes.clone(),
            points: self.points.clone(),
            owners: self.owners.clone(),
            cached_box: RwLock::new(None),
        }
    }
}
