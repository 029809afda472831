//! A flat axis-aligned bounding box tree used as the spatial index for
//! volume faces, complex triangles, and triangle location in the facetor.

use crate::bounding_box::BoundingBox;
use crate::cgmath64::*;

#[derive(Clone, Debug)]
enum Node {
    // child node indices
    Branch(usize, usize),
    // range into the leaf payload array
    Leaf(usize, usize),
}

/// Bounding box tree over payloads of type `T`.
///
/// Built once from `(box, payload)` pairs; queries return payload references
/// in insertion order within each leaf, so results are deterministic.
#[derive(Clone, Debug)]
pub struct BoxTree<T> {
    nodes: Vec<(BoundingBox, Node)>,
    leaves: Vec<(BoundingBox, T)>,
    root: Option<usize>,
}

const LEAF_SIZE: usize = 8;

impl<T> BoxTree<T> {
    /// Builds a tree from `(box, payload)` pairs.
    pub fn new(mut leaves: Vec<(BoundingBox, T)>) -> Self {
        let mut nodes = Vec::new();
        let n = leaves.len();
        let root = match n {
            0 => None,
            _ => Some(build(&mut leaves, 0, n, &mut nodes)),
        };
        Self { nodes, leaves, root }
    }

    /// Whether the tree holds no leaves.
    pub fn is_empty(&self) -> bool { self.root.is_none() }

    /// The box of the whole tree.
    pub fn total_box(&self) -> BoundingBox {
        match self.root {
            Some(root) => self.nodes[root].0,
            None => BoundingBox::empty(),
        }
    }

    /// Payloads whose boxes overlap `query`.
    pub fn find_intersecting_box(&self, query: &BoundingBox) -> Vec<&T> {
        let mut hits = Vec::new();
        self.walk(
            |bb| bb.intersects(query),
            &mut |payload| hits.push(payload),
        );
        hits
    }

    /// Payloads whose boxes are hit by the whole line `origin + t * dir`.
    pub fn find_intersecting_line(&self, origin: Point3, dir: Vector3, tol: f64) -> Vec<&T> {
        let mut hits = Vec::new();
        self.walk(
            |bb| bb.hit_by_line(origin, dir, tol),
            &mut |payload| hits.push(payload),
        );
        hits
    }

    /// Payloads whose boxes contain `pos` after stretching by `tol`.
    pub fn find_containing_point(&self, pos: Point3, tol: f64) -> Vec<&T> {
        let mut hits = Vec::new();
        self.walk(
            |bb| bb.stretch(tol).contains(pos),
            &mut |payload| hits.push(payload),
        );
        hits
    }

    fn walk<'a>(&'a self, accept: impl Fn(&BoundingBox) -> bool, visit: &mut impl FnMut(&'a T)) {
        let Some(root) = self.root else { return };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let (bb, node) = &self.nodes[idx];
            if !accept(bb) {
                continue;
            }
            match node {
                Node::Branch(a, b) => {
                    stack.push(*b);
                    stack.push(*a);
                }
                Node::Leaf(begin, end) => {
                    for (leaf_bb, payload) in &self.leaves[*begin..*end] {
                        if accept(leaf_bb) {
                            visit(payload);
                        }
                    }
                }
            }
        }
    }
}

fn build<T>(
    leaves: &mut [(BoundingBox, T)],
    begin: usize,
    end: usize,
    nodes: &mut Vec<(BoundingBox, Node)>,
) -> usize {
    let mut bb = BoundingBox::empty();
    for (leaf_bb, _) in &leaves[begin..end] {
        bb = bb.union(leaf_bb);
    }
    if end - begin <= LEAF_SIZE {
        nodes.push((bb, Node::Leaf(begin, end)));
        return nodes.len() - 1;
    }
    // split at the center median of the longest axis
    let extent = bb.max - bb.min;
    let axis = match (extent.x >= extent.y, extent.x >= extent.z, extent.y >= extent.z) {
        (true, true, _) => 0,
        (_, _, true) => 1,
        _ => 2,
    };
    let mid = (begin + end) / 2;
    leaves[begin..end].select_nth_unstable_by(mid - begin, |(a, _), (b, _)| {
        a.center()[axis].partial_cmp(&b.center()[axis]).unwrap()
    });
    let left = build(leaves, begin, mid, nodes);
    let right = build(leaves, mid, end, nodes);
    let idx = nodes.len();
    nodes.push((bb, Node::Branch(left, right)));
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(center: Point3) -> BoundingBox {
        let d = Vector3::new(0.5, 0.5, 0.5);
        BoundingBox::from_points(&[center - d, center + d])
    }

    #[test]
    fn grid_queries() {
        let leaves: Vec<(BoundingBox, usize)> = (0..100)
            .map(|i| {
                let c = Point3::new((i % 10) as f64 * 2.0, (i / 10) as f64 * 2.0, 0.0);
                (unit_box(c), i)
            })
            .collect();
        let tree = BoxTree::new(leaves);
        // the whole x = 0 column, fired along +y
        let hits = tree.find_intersecting_line(
            Point3::new(0.0, -5.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            0.0,
        );
        assert_eq!(hits.len(), 10);
        assert!(hits.iter().all(|&&i| i % 10 == 0));

        let hits = tree.find_containing_point(Point3::new(2.0, 2.0, 0.0), 0.0);
        assert_eq!(hits, vec![&11]);

        assert!(tree
            .find_intersecting_box(&unit_box(Point3::new(100.0, 0.0, 0.0)))
            .is_empty());
    }

    #[test]
    fn empty_tree() {
        let tree: BoxTree<usize> = BoxTree::new(Vec::new());
        assert!(tree.is_empty());
        assert!(tree
            .find_containing_point(Point3::new(0.0, 0.0, 0.0), 1.0)
            .is_empty());
    }
}
