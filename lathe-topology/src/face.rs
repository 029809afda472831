use crate::ids::*;
use lathe_base::bounding_box::BoundingBox;
use lathe_base::cgmath64::*;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Which side of an oriented edge a face lies on: the face is on the left
/// as one moves from start to end standing along the face normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeSide {
    /// the face lies on the left of the edge
    Left,
    /// the face lies on the right of the edge
    Right,
    /// the edge borders the face on both sides (a slit or seam edge)
    Both,
}

/// Cached tessellation of a face, written by the facetor.
#[derive(Clone, Debug, Default)]
pub struct FaceFacets {
    /// parameter-space points
    pub points2d: Vec<Point2>,
    /// space points, one per parameter point
    pub points3d: Vec<Point3>,
    /// unit surface normals, one per point
    pub normals: Vec<Vector3>,
    /// triangles as flat index triples, counter-clockwise in uv for
    /// non-flipped faces
    pub triangles: Vec<u32>,
    /// for each point the face, incident edge, or incident vertex it
    /// belongs to
    pub point_owners: Vec<EntityId>,
}

/// A face: a bounded patch of a surface with oriented boundary edges.
#[derive(Debug, Default)]
pub struct Face {
    pub(crate) volume: Option<VolumeId>,
    pub(crate) surface: Option<SurfaceId>,
    pub(crate) edges: BTreeMap<EdgeId, EdgeSide>,
    pub(crate) flipped: bool,
    pub(crate) sides: u8,
    pub(crate) owners: BTreeSet<EntityId>,
    pub(crate) cached_box: RwLock<Option<BoundingBox>>,
    pub(crate) cached_facets: RwLock<Option<Arc<FaceFacets>>>,
}

impl Face {
    /// the parent volume; a face without one is top level
    #[inline(always)]
    pub fn volume(&self) -> Option<VolumeId> { self.volume }

    /// the underlying surface
    #[inline(always)]
    pub fn surface(&self) -> Option<SurfaceId> { self.surface }

    /// the boundary edges with their sides, in id order
    #[inline(always)]
    pub fn edges(&self) -> &BTreeMap<EdgeId, EdgeSide> { &self.edges }

    /// which side of `edge` this face lies on
    #[inline]
    pub fn edge_side(&self, edge: EdgeId) -> Option<EdgeSide> { self.edges.get(&edge).copied() }

    /// whether the outward normal is the reverse of the surface normal
    #[inline(always)]
    pub fn flipped(&self) -> bool { self.flipped }

    /// `1` for a solid boundary face, `2` for a double-sided sheet face
    #[inline(always)]
    pub fn sides(&self) -> u8 { self.sides }

    /// the entities referring to this face
    #[inline(always)]
    pub fn owners(&self) -> &BTreeSet<EntityId> { &self.owners }

    /// a face is top level when it has no volume and no owners
    #[inline(always)]
    pub fn is_top_level(&self) -> bool { self.volume.is_none() && self.owners.is_empty() }

    /// the cached tessellation, if the facetor has run
    #[inline]
    pub fn facets(&self) -> Option<Arc<FaceFacets>> { self.cached_facets.read().clone() }

    /// Stores a tessellation. Called by the facetor; the cache is dropped
    /// on any topology or geometry change.
    pub fn set_facets(&self, facets: FaceFacets) {
        *self.cached_facets.write() = Some(Arc::new(facets));
    }

    pub(crate) fn invalidate(&self) {
        *self.cached_box.write() = None;
        *self.cached_facets.write() = None;
    }
}

impl Clone for Face {
    fn clone(&self) -> Self {
        Self {
            volume: self.volume,
            surface: self.surface,
            edges: self.edges.clone(),
            flipped: self.flipped,
            sides: self.sides,
            owners: self.owners.clone(),
            cached_box: RwLock::new(None),
            cached_facets: RwLock::new(None),
        }
    }
}
