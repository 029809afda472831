use crate::delaunay::delaunay_flips;
use crate::errors::Result;
use crate::loops::{facet_face_loops, inset_domain, point_in_loops, LoopNode};
use crate::options::FacetOptions;
use crate::refine::{insert_points, refine_by_curvature, MeshData};
use crate::triangulate::{triangulate_polygon, NO_NEIGHBOR};
use lathe_base::prelude::*;
use lathe_geometry::surfaces::{Surface, SurfaceKind};
use lathe_topology::{EntityId, FaceFacets, FaceId, Thing};
use std::sync::Arc;

/// Facets a face: 2D and 3D points, outward normals, triangles, and the
/// owning entity of every point, cached on the face. Triangles come out
/// counter-clockwise in parameter space, clockwise for flipped faces.
pub fn facet_face(thing: &Thing, face_id: FaceId, options: &FacetOptions) -> Result<Arc<FaceFacets>> {
    let face = thing.face(face_id)?;
    if let Some(facets) = face.facets() {
        return Ok(facets);
    }
    let surface_id = face.surface().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("face {face_id:?} has no surface"))
    })?;
    let surface = thing.surface(surface_id)?;
    let flipped = face.flipped();

    let loops = facet_face_loops(thing, face_id, options)?;
    if options.interrupted() {
        return Err(crate::errors::Error::Interrupted);
    }
    let (points2d, points3d, owners, polygons) = assemble_points(&loops);
    let (triangles, adjacencies) = triangulate_polygon(&points2d, &polygons)?;

    let mut mesh = MeshData {
        surface,
        face_owner: face_id.into(),
        normals: points2d
            .iter()
            .map(|uv| surface.normal(uv.x, uv.y))
            .collect(),
        points2d,
        points3d,
        owners,
        triangles,
        adjacencies,
    };
    delaunay_flips(&mesh.points2d, &mut mesh.triangles, &mut mesh.adjacencies);

    if !options.parametric {
        if surface.kind() == SurfaceKind::Torus {
            add_grid(&mut mesh, &loops, options);
        }
        if options.interrupted() {
            return Err(crate::errors::Error::Interrupted);
        }
        refine_by_curvature(&mut mesh, options.face_angle_tol, options.max_facets);
    }

    add_polar_caps(&mut mesh, options);
    patch_singular_normals(&mut mesh);
    attach_vertex_owners(thing, &mut mesh)?;

    let MeshData {
        points2d,
        points3d,
        mut normals,
        owners,
        mut triangles,
        ..
    } = mesh;
    if flipped {
        for tri in triangles.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        normals.iter_mut().for_each(|n| *n = -*n);
    }
    face.set_facets(FaceFacets {
        points2d,
        points3d,
        normals,
        triangles,
        point_owners: owners,
    });
    Ok(face.facets().expect("just stored"))
}

/// Whether the uv point lies in the face: winding against the facetted
/// boundary loops, with the periodic images of the point also tried on
/// closed surfaces.
pub fn point_in_face(thing: &Thing, face_id: FaceId, uv: Point2) -> Result<bool> {
    let face = thing.face(face_id)?;
    let surface_id = face.surface().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("face {face_id:?} has no surface"))
    })?;
    let surface = thing.surface(surface_id)?;
    let loops = facet_face_loops(thing, face_id, &FacetOptions::default())?;
    Ok(uv_in_face(surface, &loops, uv))
}

pub(crate) fn uv_in_face(surface: &Surface, loops: &[Vec<LoopNode>], uv: Point2) -> bool {
    let uv = clamp_past_singularities(surface, uv);
    let mut candidates = vec![uv];
    if let Some(period) = surface.u_period() {
        candidates.push(Point2::new(uv.x + period, uv.y));
        candidates.push(Point2::new(uv.x - period, uv.y));
    }
    if let Some(period) = surface.v_period() {
        for i in 0..candidates.len() {
            let c = candidates[i];
            candidates.push(Point2::new(c.x, c.y + period));
            candidates.push(Point2::new(c.x, c.y - period));
        }
    }
    if candidates.iter().any(|&c| point_in_loops(loops, c)) {
        return true;
    }
    // points within tolerance of the boundary count as inside; scale the
    // space tolerance into parameter space
    let scale = f64::max(
        surface.uder(uv.x, uv.y).magnitude(),
        surface.vder(uv.x, uv.y).magnitude(),
    )
    .max(TOLERANCE);
    let uv_tol = TOLERANCE / scale * 10.0 + TOLERANCE;
    candidates.iter().any(|&c| {
        loops.iter().any(|piece| {
            let n = piece.len();
            (0..n).any(|i| {
                Segment2::new(piece[i].uv, piece[(i + 1) % n].uv).distance(c) < uv_tol
            })
        })
    })
}

/// Points beyond a singular ring line lie in the polar cap; pull them
/// just inside the ring so the winding test against the inset loops sees
/// them.
fn clamp_past_singularities(surface: &Surface, uv: Point2) -> Point2 {
    let domain = surface.domain();
    let effective = inset_domain(surface, &FacetOptions::default());
    let clamp = |x: f64, eff: Interval1D, dom: Interval1D| -> f64 {
        // half the ring gap lands safely inside the inset rectangle
        if eff.min > dom.min && x < eff.min {
            eff.min + (eff.min - dom.min) * 0.5
        } else if eff.max < dom.max && x > eff.max {
            eff.max - (dom.max - eff.max) * 0.5
        } else {
            x
        }
    };
    Point2::new(
        clamp(uv.x, effective.u, domain.u),
        clamp(uv.y, effective.v, domain.v),
    )
}

/// deduplicates loop nodes into shared point arrays and index polygons
fn assemble_points(
    loops: &[Vec<LoopNode>],
) -> (Vec<Point2>, Vec<Point3>, Vec<EntityId>, Vec<Vec<u32>>) {
    let mut points2d: Vec<Point2> = Vec::new();
    let mut points3d: Vec<Point3> = Vec::new();
    let mut owners: Vec<EntityId> = Vec::new();
    let mut polygons = Vec::with_capacity(loops.len());
    for piece in loops {
        let mut polygon = Vec::with_capacity(piece.len());
        for node in piece {
            let found = points2d
                .iter()
                .position(|p| p.distance2(node.uv) < TOLERANCE2);
            let idx = match found {
                Some(idx) => idx as u32,
                None => {
                    points2d.push(node.uv);
                    points3d.push(node.pos);
                    owners.push(node.owner);
                    (points2d.len() - 1) as u32
                }
            };
            if polygon.last() != Some(&idx) {
                polygon.push(idx);
            }
        }
        if polygon.first() == polygon.last() && polygon.len() > 1 {
            polygon.pop();
        }
        if polygon.len() >= 3 {
            polygons.push(polygon);
        }
    }
    (points2d, points3d, owners, polygons)
}

/// Overlays the regular grid the torus needs for a consistent interior:
/// the triangulation of the boundary alone leaves the middle empty.
fn add_grid(mesh: &mut MeshData<'_>, loops: &[Vec<LoopNode>], options: &FacetOptions) {
    let domain = mesh.surface.domain();
    let nu = usize::clamp((domain.u.length() / options.edge_angle_tol) as usize, 4, 128);
    let nv = usize::clamp((domain.v.length() / options.edge_angle_tol) as usize, 4, 128);
    let mut grid = Vec::with_capacity(nu * nv);
    for i in 0..=nu {
        for j in 0..=nv {
            let uv = Point2::new(
                domain.u.mid_point(i as f64 / nu as f64),
                domain.v.mid_point(j as f64 / nv as f64),
            );
            if point_in_loops(loops, uv) {
                grid.push(uv);
            }
        }
    }
    insert_points(mesh, &grid);
}

/// Polar caps: the loop assembly pulled every singular side of the
/// parameter rectangle in to a ring line; fan triangles from the ring to
/// the pole close the surface there, emitted directly rather than through
/// the triangulator. For a sphere these are the polar triangles.
fn add_polar_caps(mesh: &mut MeshData<'_>, options: &FacetOptions) {
    let surface = mesh.surface;
    let domain = surface.domain();
    let effective = inset_domain(surface, options);
    // (coordinate, ring line, singular line)
    let mut sides: Vec<(usize, f64, f64)> = Vec::new();
    if effective.u.min > domain.u.min {
        sides.push((0, effective.u.min, domain.u.min));
    }
    if effective.u.max < domain.u.max {
        sides.push((0, effective.u.max, domain.u.max));
    }
    if effective.v.min > domain.v.min {
        sides.push((1, effective.v.min, domain.v.min));
    }
    if effective.v.max < domain.v.max {
        sides.push((1, effective.v.max, domain.v.max));
    }
    for (coord, ring_value, pole_value) in sides {
        let pick = |uv: Point2, c: usize| if c == 0 { uv.x } else { uv.y };
        let tol = TOLERANCE + f64::abs(ring_value) * 1.0e-12;
        let mut ring: Vec<u32> = (0..mesh.points2d.len() as u32)
            .filter(|&i| (pick(mesh.points2d[i as usize], coord) - ring_value).abs() <= tol)
            .collect();
        if ring.len() < 2 {
            continue;
        }
        ring.sort_by(|&a, &b| {
            let pa = pick(mesh.points2d[a as usize], 1 - coord);
            let pb = pick(mesh.points2d[b as usize], 1 - coord);
            pa.partial_cmp(&pb).unwrap()
        });
        let first = pick(mesh.points2d[ring[0] as usize], 1 - coord);
        let last = pick(mesh.points2d[ring[ring.len() - 1] as usize], 1 - coord);
        let mid = (first + last) * 0.5;
        let pole_uv = match coord {
            0 => Point2::new(pole_value, mid),
            _ => Point2::new(mid, pole_value),
        };
        let pole = mesh.add_point(pole_uv);
        for pair in ring.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let pa = mesh.points2d[a as usize];
            let pb = mesh.points2d[b as usize];
            if pa.distance2(pb) < TOLERANCE2 {
                continue;
            }
            // counter-clockwise in parameter space
            let pp = mesh.points2d[pole as usize];
            let tri = match (pb - pa).perp_dot(pp - pa) > 0.0 {
                true => [a, b, pole],
                false => [b, a, pole],
            };
            mesh.triangles.extend_from_slice(&tri);
            // the fan is terminal: nothing walks its adjacency afterwards
            mesh.adjacencies.extend_from_slice(&[NO_NEIGHBOR; 3]);
        }
    }
}

/// Points on singular lines have no surface normal; borrow the average of
/// their triangle neighbors.
fn patch_singular_normals(mesh: &mut MeshData<'_>) {
    let singular: Vec<usize> = (0..mesh.normals.len())
        .filter(|&i| mesh.normals[i].magnitude().so_small())
        .collect();
    for i in singular {
        let mut acc = Vector3::zero();
        for tri in mesh.triangles.chunks_exact(3) {
            if tri.contains(&(i as u32)) {
                for &k in tri {
                    let n = mesh.normals[k as usize];
                    if !n.magnitude().so_small() {
                        acc += n;
                    }
                }
            }
        }
        if !acc.magnitude().so_small() {
            mesh.normals[i] = acc.normalize();
        }
    }
}

/// Boundary points coinciding with an edge's end vertices get the vertex
/// as their owner so downstream stitching can find them.
fn attach_vertex_owners(thing: &Thing, mesh: &mut MeshData<'_>) -> Result<()> {
    for i in 0..mesh.owners.len() {
        let owner = mesh.owners[i];
        let Some(lathe_topology::Entity::Edge(edge)) = thing.find_entity(owner) else {
            continue;
        };
        for vertex in [edge.start(), edge.end()].into_iter().flatten() {
            let vpos = thing.vertex(vertex)?.point();
            if vpos.distance2(mesh.points3d[i]) < TOLERANCE2 {
                mesh.owners[i] = vertex.into();
            }
        }
    }
    Ok(())
}
