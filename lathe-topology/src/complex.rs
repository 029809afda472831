use crate::ids::*;
use lathe_base::bounding_box::BoundingBox;
use lathe_base::box_tree::BoxTree;
use lathe_base::cgmath64::*;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A complex: an unstructured bag of points with segment and triangle
/// index lists; used for polylines, triangle soups, and imports.
#[derive(Debug, Default)]
pub struct Complex {
    pub(crate) points: Vec<Point3>,
    pub(crate) segments: Vec<u32>,
    pub(crate) triangles: Vec<u32>,
    pub(crate) owners: BTreeSet<EntityId>,
    pub(crate) cached_box: RwLock<Option<BoundingBox>>,
    pub(crate) cached_tree: RwLock<Option<Arc<BoxTree<u32>>>>,
}

impl Complex {
    pub(crate) fn new(points: Vec<Point3>, segments: Vec<u32>, triangles: Vec<u32>) -> Self {
        Self {
            points,
            segments,
            triangles,
            ..Self::default()
        }
    }

    /// the points
    #[inline(always)]
    pub fn points(&self) -> &[Point3] { &self.points }

    /// index pairs forming segments
    #[inline(always)]
    pub fn segments(&self) -> &[u32] { &self.segments }

    /// index triples forming triangles
    #[inline(always)]
    pub fn triangles(&self) -> &[u32] { &self.triangles }

    /// the entities referring to this complex
    #[inline(always)]
    pub fn owners(&self) -> &BTreeSet<EntityId> { &self.owners }

    /// a complex is top level when nothing owns it
    #[inline(always)]
    pub fn is_top_level(&self) -> bool { self.owners.is_empty() }

    /// the bounding box, cached
    pub fn bounding_box(&self) -> BoundingBox {
        if let Some(bb) = *self.cached_box.read() {
            return bb;
        }
        let bb = BoundingBox::from_points(&self.points);
        *self.cached_box.write() = Some(bb);
        bb
    }

    /// A box tree over the triangles, keyed by the index of the first
    /// corner in `triangles()`; cached.
    pub fn triangle_tree(&self) -> Arc<BoxTree<u32>> {
        if let Some(tree) = self.cached_tree.read().as_ref() {
            return Arc::clone(tree);
        }
        let leaves = self
            .triangles
            .chunks_exact(3)
            .enumerate()
            .map(|(i, tri)| {
                let bb = BoundingBox::from_points(
                    tri.iter().map(|&k| &self.points[k as usize]),
                );
                (bb, (i * 3) as u32)
            })
            .collect();
        let tree = Arc::new(BoxTree::new(leaves));
        *self.cached_tree.write() = Some(Arc::clone(&tree));
        tree
    }

    /// total area of the triangles
    pub fn area(&self) -> f64 {
        self.triangles
            .chunks_exact(3)
            .map(|tri| {
                let a = self.points[tri[0] as usize];
                let b = self.points[tri[1] as usize];
                let c = self.points[tri[2] as usize];
                (b - a).cross(c - a).magnitude() * 0.5
            })
            .sum()
    }

    pub(crate) fn invalidate(&self) {
        *self.cached_box.write() = None;
        *self.cached_tree.write() = None;
    }
}

impl Clone for Complex {
    fn clone(&self) -> Self {
        Self {
            points: self.points.clone(),
            segments: self.segments.clone(),
            triangles: self.triangles.clone(),
            owners: self.owners.clone(),
            cached_box: RwLock::new(None),
            cached_tree: RwLock::new(None),
        }
    }
}
