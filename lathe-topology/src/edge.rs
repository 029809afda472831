use crate::ids::*;
use lathe_base::bounding_box::{BoundingBox, Interval1D};
use lathe_base::cgmath64::*;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Cached polyline of an edge, written by the facetor.
#[derive(Clone, Debug, Default)]
pub struct EdgeFacets {
    /// curve parameters of the samples
    pub params: Vec<f64>,
    /// sample points
    pub points: Vec<Point3>,
}

/// An edge: a bounded arc of a curve joining at most two vertices.
#[derive(Debug)]
pub struct Edge {
    pub(crate) curve: Option<CurveId>,
    pub(crate) start: Option<VertexId>,
    pub(crate) end: Option<VertexId>,
    pub(crate) volume: Option<VolumeId>,
    pub(crate) faces: BTreeSet<FaceId>,
    pub(crate) domain: Interval1D,
    pub(crate) tolerance: f64,
    pub(crate) owners: BTreeSet<EntityId>,
    pub(crate) cached_box: RwLock<Option<BoundingBox>>,
    pub(crate) cached_facets: RwLock<Option<Arc<EdgeFacets>>>,
}

impl Default for Edge {
    fn default() -> Self {
        Self {
            curve: None,
            start: None,
            end: None,
            volume: None,
            faces: BTreeSet::new(),
            domain: Interval1D::new(0.0, 1.0),
            tolerance: lathe_base::tolerance::TOLERANCE,
            owners: BTreeSet::new(),
            cached_box: RwLock::new(None),
            cached_facets: RwLock::new(None),
        }
    }
}

impl Edge {
    /// the underlying curve
    #[inline(always)]
    pub fn curve(&self) -> Option<CurveId> { self.curve }

    /// the start vertex; equal to the end vertex on closed edges
    #[inline(always)]
    pub fn start(&self) -> Option<VertexId> { self.start }

    /// the end vertex
    #[inline(always)]
    pub fn end(&self) -> Option<VertexId> { self.end }

    /// the parent volume of a wire edge; `None` when faces own the edge
    #[inline(always)]
    pub fn volume(&self) -> Option<VolumeId> { self.volume }

    /// the faces bordered by this edge, in id order
    #[inline(always)]
    pub fn faces(&self) -> &BTreeSet<FaceId> { &self.faces }

    /// the parameter interval on the curve
    #[inline(always)]
    pub fn domain(&self) -> Interval1D { self.domain }

    /// the edge tolerance
    #[inline(always)]
    pub fn tolerance(&self) -> f64 { self.tolerance }

    /// the entities referring to this edge
    #[inline(always)]
    pub fn owners(&self) -> &BTreeSet<EntityId> { &self.owners }

    /// an edge is top level when no face, volume, or owner refers to it
    #[inline(always)]
    pub fn is_top_level(&self) -> bool {
        self.faces.is_empty() && self.volume.is_none() && self.owners.is_empty()
    }

    /// the cached polyline, if the facetor has run
    #[inline]
    pub fn facets(&self) -> Option<Arc<EdgeFacets>> { self.cached_facets.read().clone() }

    /// Stores a polyline. Called by the facetor.
    pub fn set_facets(&self, facets: EdgeFacets) {
        *self.cached_facets.write() = Some(Arc::new(facets));
    }

    pub(crate) fn invalidate(&self) {
        *self.cached_box.write() = None;
        *self.cached_facets.write() = None;
    }
}

impl Clone for Edge {
    fn clone(&self) -> Self {
        Self {
            curve: self.curve,
            start: self.start,
            end: self.end,
            volume: self.volume,
            faces: self.faces.clone(),
            domain: self.domain,
            tolerance: self.tolerance,
            owners: self.owners.clone(),
            cached_box: RwLock::new(None),
            cached_facets: RwLock::new(None),
        }
    }
}
