use crate::delaunay::{delaunay_flips, fix_back_pointers, flip_triangles};
use crate::triangulate::NO_NEIGHBOR;
use lathe_base::box_tree::BoxTree;
use lathe_base::prelude::*;
use lathe_geometry::surfaces::Surface;
use lathe_topology::EntityId;
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// the growing tessellation of one face
pub(crate) struct MeshData<'a> {
    pub surface: &'a Surface,
    pub face_owner: EntityId,
    pub points2d: Vec<Point2>,
    pub points3d: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub owners: Vec<EntityId>,
    pub triangles: Vec<u32>,
    pub adjacencies: Vec<u32>,
}

impl MeshData<'_> {
    pub(crate) fn add_point(&mut self, uv: Point2) -> u32 {
        self.points2d.push(uv);
        self.points3d.push(self.surface.subs(uv.x, uv.y));
        self.normals.push(self.surface.normal(uv.x, uv.y));
        self.owners.push(self.face_owner);
        (self.points2d.len() - 1) as u32
    }

    /// Splits the side `edge` of triangle `tri` at its uv midpoint,
    /// reconnecting two triangles into four (or one into two on the
    /// boundary), and re-runs local Delaunay flips. Returns the new point.
    fn split_edge(&mut self, tri: u32, edge: u32) -> u32 {
        let t = tri as usize;
        let k = edge as usize;
        let a = self.triangles[t + k];
        let b = self.triangles[t + (k + 1) % 3];
        let c = self.triangles[t + (k + 2) % 3];
        let mid = Point2::new(
            (self.points2d[a as usize].x + self.points2d[b as usize].x) * 0.5,
            (self.points2d[a as usize].y + self.points2d[b as usize].y) * 0.5,
        );
        let m = self.add_point(mid);
        let neighbor = self.adjacencies[t + k];
        let t_bc = self.adjacencies[t + (k + 1) % 3];
        let t_ca = self.adjacencies[t + (k + 2) % 3];

        // the half keeping index t: (a, m, c)
        self.triangles[t] = a;
        self.triangles[t + 1] = m;
        self.triangles[t + 2] = c;
        // the other half: (m, b, c)
        let t2 = self.triangles.len() as u32;
        self.triangles.extend_from_slice(&[m, b, c]);
        self.adjacencies.extend_from_slice(&[NO_NEIGHBOR, t_bc, tri]);
        self.adjacencies[t] = NO_NEIGHBOR;
        self.adjacencies[t + 1] = t2;
        self.adjacencies[t + 2] = t_ca;

        if neighbor != NO_NEIGHBOR {
            let n = neighbor as usize;
            // rotate the neighbor so its shared edge (b, a) leads
            let j = (0..3)
                .find(|&j| self.triangles[n + j] == b && self.triangles[n + (j + 1) % 3] == a)
                .expect("adjacency out of step");
            let d = self.triangles[n + (j + 2) % 3];
            let n_ad = self.adjacencies[n + (j + 1) % 3];
            let n_db = self.adjacencies[n + (j + 2) % 3];
            // neighbor keeps (b, m, d)
            self.triangles[n] = b;
            self.triangles[n + 1] = m;
            self.triangles[n + 2] = d;
            // and spawns (m, a, d)
            let n2 = self.triangles.len() as u32;
            self.triangles.extend_from_slice(&[m, a, d]);
            self.adjacencies.extend_from_slice(&[tri, n_ad, neighbor]);
            self.adjacencies[n] = t2;
            self.adjacencies[n + 1] = n2;
            self.adjacencies[n + 2] = n_db;
            self.adjacencies[t] = n2;
            self.adjacencies[t2 as usize] = neighbor;
            fix_back_pointers(neighbor, &self.triangles, &mut self.adjacencies);
            fix_back_pointers(n2, &self.triangles, &mut self.adjacencies);
        }
        fix_back_pointers(tri, &self.triangles, &mut self.adjacencies);
        fix_back_pointers(t2, &self.triangles, &mut self.adjacencies);
        self.local_delaunay(&[tri, t2, neighbor]);
        m
    }

    /// Splits triangle `tri` into three at the interior point `uv`.
    fn split_triangle(&mut self, tri: u32, uv: Point2) -> u32 {
        let t = tri as usize;
        let (a, b, c) = (
            self.triangles[t],
            self.triangles[t + 1],
            self.triangles[t + 2],
        );
        let m = self.add_point(uv);
        let (t_ab, t_bc, t_ca) = (
            self.adjacencies[t],
            self.adjacencies[t + 1],
            self.adjacencies[t + 2],
        );
        let t2 = self.triangles.len() as u32;
        let t3 = t2 + 3;
        self.triangles[t + 2] = m; // (a, b, m)
        self.triangles.extend_from_slice(&[b, c, m]);
        self.triangles.extend_from_slice(&[c, a, m]);
        self.adjacencies[t] = t_ab;
        self.adjacencies[t + 1] = t2;
        self.adjacencies[t + 2] = t3;
        self.adjacencies.extend_from_slice(&[t_bc, t3, tri]);
        self.adjacencies.extend_from_slice(&[t_ca, tri, t2]);
        fix_back_pointers(tri, &self.triangles, &mut self.adjacencies);
        fix_back_pointers(t2, &self.triangles, &mut self.adjacencies);
        fix_back_pointers(t3, &self.triangles, &mut self.adjacencies);
        self.local_delaunay(&[tri, t2, t3]);
        m
    }

    /// flips around the given triangles until the fan settles
    fn local_delaunay(&mut self, seeds: &[u32]) {
        for _ in 0..8 {
            let mut flipped = false;
            for &tri in seeds {
                if tri == NO_NEIGHBOR {
                    continue;
                }
                for edge in 0..3 {
                    if flip_triangles(
                        &self.points2d,
                        &mut self.triangles,
                        &mut self.adjacencies,
                        tri,
                        edge,
                    ) {
                        flipped = true;
                    }
                }
            }
            if !flipped {
                break;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct EdgeValue {
    dot: f64,
    tri: u32,
    edge: u32,
}

impl Eq for EdgeValue {}

impl Ord for EdgeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        // smallest dot = widest normal spread = highest priority
        other
            .dot
            .partial_cmp(&self.dot)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.tri.cmp(&other.tri))
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

impl PartialOrd for EdgeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// Splits interior triangle edges whose endpoint normals spread more than
/// the face angle tolerance, worst first through a priority queue, until
/// the mesh meets the tolerance or the facet cap.
pub(crate) fn refine_by_curvature(mesh: &mut MeshData<'_>, face_angle_tol: f64, max_facets: usize) {
    let cos_tol = f64::cos(face_angle_tol);
    let edge_dot = |mesh: &MeshData<'_>, tri: usize, edge: usize| -> Option<f64> {
        if mesh.adjacencies[tri + edge] == NO_NEIGHBOR {
            return None;
        }
        let a = mesh.triangles[tri + edge] as usize;
        let b = mesh.triangles[tri + (edge + 1) % 3] as usize;
        let (na, nb) = (mesh.normals[a], mesh.normals[b]);
        if na.magnitude().so_small() || nb.magnitude().so_small() {
            return None;
        }
        Some(na.dot(nb))
    };
    let mut heap = BinaryHeap::new();
    for tri in (0..mesh.triangles.len()).step_by(3) {
        for edge in 0..3 {
            if let Some(dot) = edge_dot(mesh, tri, edge) {
                if dot < cos_tol {
                    heap.push(EdgeValue { dot, tri: tri as u32, edge: edge as u32 });
                }
            }
        }
    }
    let mut splits = 0;
    while let Some(EdgeValue { dot, tri, edge }) = heap.pop() {
        if mesh.triangles.len() / 3 >= max_facets {
            debug!("curvature refinement stopped at the facet cap");
            break;
        }
        // the mesh may have moved on under this entry
        let current = edge_dot(mesh, tri as usize, edge as usize);
        match current {
            Some(d) if d < cos_tol => {
                if (d - dot).abs() > ZERO {
                    heap.push(EdgeValue { dot: d, tri, edge });
                    continue;
                }
            }
            _ => continue,
        }
        let before = mesh.triangles.len();
        mesh.split_edge(tri, edge);
        splits += 1;
        for t in ((before.saturating_sub(3))..mesh.triangles.len()).step_by(3) {
            for e in 0..3 {
                if let Some(d) = edge_dot(mesh, t, e) {
                    if d < cos_tol {
                        heap.push(EdgeValue { dot: d, tri: t as u32, edge: e as u32 });
                    }
                }
            }
        }
        for e in 0..3 {
            if let Some(d) = edge_dot(mesh, tri as usize, e) {
                if d < cos_tol {
                    heap.push(EdgeValue { dot: d, tri, edge: e as u32 });
                }
            }
        }
    }
    if splits > 0 {
        debug!("curvature refinement split {splits} edges");
    }
}

/// Inserts interior points into the triangulation: each point is located
/// through a box tree over the triangles with an adjacency walk as the
/// fallback, then split into the containing triangle or edge. Points
/// falling on existing points or outside every triangle are skipped.
pub(crate) fn insert_points(mesh: &mut MeshData<'_>, insert: &[Point2]) {
    if mesh.triangles.is_empty() {
        return;
    }
    let tree = triangle_tree(mesh);
    for &uv in insert {
        let exists = mesh
            .points2d
            .iter()
            .any(|p| p.distance2(uv) < TOLERANCE2);
        if exists {
            continue;
        }
        let candidates = tree.find_containing_point(Point3::new(uv.x, uv.y, 0.0), TOLERANCE);
        let located = candidates
            .iter()
            .map(|&&t| t)
            .find(|&t| triangle_contains(mesh, t, uv))
            .or_else(|| {
                candidates
                    .first()
                    .and_then(|&&start| walk_to(mesh, start, uv))
            });
        let Some(tri) = located else { continue };
        // on-edge points split the edge, interior points the triangle
        let t = tri as usize;
        let mut on_edge = None;
        for k in 0..3 {
            let a = mesh.points2d[mesh.triangles[t + k] as usize];
            let b = mesh.points2d[mesh.triangles[t + (k + 1) % 3] as usize];
            if Segment2::new(a, b).distance(uv) < TOLERANCE {
                on_edge = Some(k as u32);
                break;
            }
        }
        match on_edge {
            Some(k) => {
                let m = mesh.split_edge(tri, k);
                // land the new point exactly where asked
                mesh.points2d[m as usize] = uv;
                mesh.points3d[m as usize] = mesh.surface.subs(uv.x, uv.y);
                mesh.normals[m as usize] = mesh.surface.normal(uv.x, uv.y);
            }
            None => {
                mesh.split_triangle(tri, uv);
            }
        }
    }
    delaunay_flips(&mesh.points2d, &mut mesh.triangles, &mut mesh.adjacencies);
}

// uv boxes live in the z = 0 plane
fn triangle_tree(mesh: &MeshData<'_>) -> BoxTree<u32> {
    let leaves = mesh
        .triangles
        .chunks_exact(3)
        .enumerate()
        .map(|(i, tri)| {
            let mut bb = lathe_base::bounding_box::BoundingBox::empty();
            for &k in tri {
                let p = mesh.points2d[k as usize];
                bb.push(Point3::new(p.x, p.y, 0.0));
            }
            (bb, (i * 3) as u32)
        })
        .collect();
    BoxTree::new(leaves)
}

fn triangle_contains(mesh: &MeshData<'_>, tri: u32, uv: Point2) -> bool {
    let t = tri as usize;
    (0..3).all(|k| {
        let a = mesh.points2d[mesh.triangles[t + k] as usize];
        let b = mesh.points2d[mesh.triangles[t + (k + 1) % 3] as usize];
        (b - a).perp_dot(uv - a) >= -TOLERANCE
    })
}

/// adjacency walk toward `uv`, the classic point-location fallback
fn walk_to(mesh: &MeshData<'_>, start: u32, uv: Point2) -> Option<u32> {
    let mut tri = start;
    for _ in 0..mesh.triangles.len() {
        if triangle_contains(mesh, tri, uv) {
            return Some(tri);
        }
        let t = tri as usize;
        let step = (0..3).find(|&k| {
            let a = mesh.points2d[mesh.triangles[t + k] as usize];
            let b = mesh.points2d[mesh.triangles[t + (k + 1) % 3] as usize];
            (b - a).perp_dot(uv - a) < -TOLERANCE && mesh.adjacencies[t + k] != NO_NEIGHBOR
        })?;
        tri = mesh.adjacencies[t + step];
    }
    None
}
