use crate::errors::Result;
use lathe_base::prelude::*;
use lathe_base::quadrature::{integrate, integrate_2d};
use lathe_geometry::surfaces::Surface;
use lathe_meshalgo::{facet_edge, facet_face, point_in_face, FacetOptions};
use lathe_topology::{
    BodyId, EdgeId, EdgeSide, EntityId, EntityKind, FaceId, Thing, VolumeId,
};

/// Evaluates the curve under an edge at `t`.
pub fn evaluate_curve(thing: &Thing, edge: EdgeId, t: f64) -> Result<Point3> {
    let e = thing.edge(edge)?;
    let curve = thing.curve(e.curve().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("edge {edge:?} has no curve"))
    })?)?;
    Ok(curve.subs(t))
}

/// Inverts a position onto the curve under an edge.
pub fn curve_inverse(
    thing: &Thing,
    edge: EdgeId,
    pos: Point3,
    guess: Option<f64>,
) -> Result<(f64, Point3)> {
    let e = thing.edge(edge)?;
    let curve = thing.curve(e.curve().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("edge {edge:?} has no curve"))
    })?)?;
    Ok(curve.inverse(pos, guess))
}

/// Evaluates the surface under a face at `(u, v)`.
pub fn evaluate_surface(thing: &Thing, face: FaceId, uv: Point2) -> Result<Point3> {
    Ok(face_surface(thing, face)?.subs(uv.x, uv.y))
}

/// Inverts a position onto the surface under a face.
pub fn surface_inverse(
    thing: &Thing,
    face: FaceId,
    pos: Point3,
    guess: Option<Point2>,
) -> Result<(Point2, Point3)> {
    Ok(face_surface(thing, face)?.inverse(pos, guess))
}

fn face_surface<'a>(thing: &'a Thing, face: FaceId) -> Result<&'a Surface> {
    let f = thing.face(face)?;
    Ok(thing.surface(f.surface().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("face {face:?} has no surface"))
    })?)?)
}

/// The area of a face: exact boundary integrals for planar faces, domain
/// quadrature for faces covering their whole parameter rectangle, the
/// facet sum otherwise.
pub fn find_area(thing: &Thing, face: FaceId) -> Result<f64> {
    let surface = face_surface(thing, face)?;
    if let Surface::Plane(plane) = surface {
        return planar_area(thing, face, plane).map(f64::abs);
    }
    if let Some(rect) = rectangular_coverage(thing, face)? {
        let area = integrate_2d(
            &|u, v| surface.uder(u, v).cross(surface.vder(u, v)).magnitude(),
            (rect.u.min, rect.u.max),
            (rect.v.min, rect.v.max),
            TOLERANCE * 1.0e-3,
        );
        return Ok(area);
    }
    // trimmed curved face: the facet sum
    let facets = facet_face(thing, face, &FacetOptions::default())?;
    let area = facets
        .triangles
        .chunks_exact(3)
        .map(|tri| {
            let a = facets.points3d[tri[0] as usize];
            let b = facets.points3d[tri[1] as usize];
            let c = facets.points3d[tri[2] as usize];
            (b - a).cross(c - a).magnitude() * 0.5
        })
        .sum();
    Ok(area)
}

/// Green's theorem over the boundary with exact curve evaluation: the
/// signed area in the plane's coordinates.
fn planar_area(
    thing: &Thing,
    face: FaceId,
    plane: &lathe_geometry::surfaces::Plane,
) -> Result<f64> {
    let mut total = 0.0;
    for cycle in thing.find_loops(face)? {
        for (edge_id, side) in cycle {
            let e = thing.edge(edge_id)?;
            let curve = thing.curve(e.curve().ok_or_else(|| {
                lathe_topology::Error::TopologyCorrupt(format!("edge {edge_id:?} has no curve"))
            })?)?;
            let domain = e.domain();
            let integrand = |t: f64| -> f64 {
                let p = plane.project(curve.subs(t));
                let d = curve.der(t);
                let du = d.dot(plane.x_axis());
                let dv = d.dot(plane.y_axis());
                0.5 * (p.x * dv - p.y * du)
            };
            let piece = integrate(&integrand, domain.min, domain.max, TOLERANCE * 1.0e-4);
            total += match side {
                EdgeSide::Right => -piece,
                _ => piece,
            };
        }
    }
    Ok(total)
}

/// The uv box of a face whose boundary loops trace exactly that box, when
/// they do: such a face covers its whole parameter rectangle and admits
/// direct domain quadrature. Sides the loop assembly pulled in to a
/// singular ring line snap back out to the true domain bound, so the
/// quadrature covers the polar caps as well.
fn rectangular_coverage(thing: &Thing, face: FaceId) -> Result<Option<Interval2D>> {
    let options = FacetOptions::default();
    let loops = lathe_meshalgo::loops::facet_face_loops(thing, face, &options)?;
    let mut u = Interval1D::empty();
    let mut v = Interval1D::empty();
    for node in loops.iter().flatten() {
        u.add(node.uv.x);
        v.add(node.uv.y);
    }
    if u.is_empty() || u.length().so_small() || v.length().so_small() {
        return Ok(None);
    }
    let tol = f64::max(u.length(), v.length()) * 1.0e-9 + TOLERANCE;
    let on_box = loops.iter().flatten().all(|node| {
        u.on_boundary(node.uv.x, tol) || v.on_boundary(node.uv.y, tol)
    });
    if !on_box || loops.len() != 1 {
        return Ok(None);
    }
    let surface = face_surface(thing, face)?;
    let domain = surface.domain();
    let slack = options.edge_angle_tol * 2.0;
    if surface.singular_low_u() && (u.min - domain.u.min).abs() <= slack {
        u.min = domain.u.min;
    }
    if surface.singular_high_u() && (domain.u.max - u.max).abs() <= slack {
        u.max = domain.u.max;
    }
    if surface.singular_low_v() && (v.min - domain.v.min).abs() <= slack {
        v.min = domain.v.min;
    }
    if surface.singular_high_v() && (domain.v.max - v.max).abs() <= slack {
        v.max = domain.v.max;
    }
    Ok(Some(Interval2D::new(u, v)))
}

/// how a body's volume gets computed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeMethod {
    /// exact boundary-flux quadrature where the face shape allows,
    /// facet sums elsewhere
    Quadrature,
    /// facet sums everywhere
    Facets,
}

/// The enclosed volume of a body by the divergence theorem over its
/// boundary faces.
pub fn find_volume(thing: &Thing, body: BodyId, method: VolumeMethod) -> Result<f64> {
    let mut total = 0.0;
    for &volume in thing.body(body)?.volumes() {
        for &face in thing.volume(volume)?.faces() {
            total += face_flux_volume(thing, face, method)?;
        }
    }
    Ok(total.abs())
}

fn face_flux_volume(thing: &Thing, face_id: FaceId, method: VolumeMethod) -> Result<f64> {
    let face = thing.face(face_id)?;
    let surface = face_surface(thing, face_id)?;
    let orient = match face.flipped() {
        true => -1.0,
        false => 1.0,
    };
    if method == VolumeMethod::Quadrature {
        if let Surface::Plane(plane) = surface {
            let area = planar_area(thing, face_id, plane)?;
            let height = plane.origin().to_vec().dot(plane.unit_normal());
            return Ok(orient * height * area / 3.0);
        }
        if let Some(rect) = rectangular_coverage(thing, face_id)? {
            let flux = integrate_2d(
                &|u, v| {
                    let p = surface.subs(u, v);
                    let n = surface.uder(u, v).cross(surface.vder(u, v));
                    p.to_vec().dot(n)
                },
                (rect.u.min, rect.u.max),
                (rect.v.min, rect.v.max),
                TOLERANCE * 1.0e-3,
            );
            return Ok(orient * flux / 3.0);
        }
    }
    // facet fallback: signed tetrahedra against the origin; the stored
    // winding already carries the face orientation
    let facets = facet_face(thing, face_id, &FacetOptions::default())?;
    let volume = facets
        .triangles
        .chunks_exact(3)
        .map(|tri| {
            let a = facets.points3d[tri[0] as usize].to_vec();
            let b = facets.points3d[tri[1] as usize].to_vec();
            let c = facets.points3d[tri[2] as usize].to_vec();
            a.cross(b).dot(c) / 6.0
        })
        .sum::<f64>();
    Ok(volume)
}

/// Whether a position lies in (or on) an entity.
pub fn point_in_entity(thing: &Thing, pos: Point3, entity: EntityId, tol: f64) -> Result<bool> {
    let tol = f64::max(tol, TOLERANCE);
    let kind = thing
        .kind_of(entity)
        .ok_or(lathe_topology::Error::UnknownEntityId(entity))?;
    match kind {
        EntityKind::Body => {
            let body = thing.body(BodyId::from(entity))?;
            for &volume in body.volumes() {
                if lathe_intersect::point_in_volume(thing, pos, volume, tol)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        EntityKind::Volume => {
            Ok(lathe_intersect::point_in_volume(thing, pos, VolumeId::from(entity), tol)?)
        }
        EntityKind::Face => {
            let face = FaceId::from(entity);
            let surface = face_surface(thing, face)?;
            let (uv, close) = surface.inverse(pos, None);
            if close.distance(pos) > tol {
                return Ok(false);
            }
            Ok(point_in_face(thing, face, uv)?)
        }
        EntityKind::Edge => {
            let edge = thing.edge(EdgeId::from(entity))?;
            let curve = thing.curve(edge.curve().ok_or_else(|| {
                lathe_topology::Error::TopologyCorrupt(format!("edge {entity:?} has no curve"))
            })?)?;
            let (t, close) = curve.inverse(pos, None);
            Ok(close.distance(pos) <= tol && edge.domain().contains(t))
        }
        EntityKind::Vertex => {
            let vertex = thing.vertex(lathe_topology::VertexId::from(entity))?;
            Ok(vertex.point().distance(pos) <= tol)
        }
        _ => Ok(false),
    }
}

/// Faces of an entity within `dist` of a position.
pub fn find_close_faces(
    thing: &Thing,
    pos: Point3,
    entity: EntityId,
    dist: f64,
) -> Result<Vec<FaceId>> {
    let mut out = Vec::new();
    for face in faces_under(thing, entity)? {
        if !thing.face_box(face)?.stretch(dist).contains(pos) {
            continue;
        }
        let surface = face_surface(thing, face)?;
        let (uv, close) = surface.inverse(pos, None);
        let near_surface = close.distance(pos) <= dist && point_in_face(thing, face, uv)?;
        let near_boundary = || -> Result<bool> {
            for &edge in thing.face(face)?.edges().keys() {
                let facets = facet_edge(thing, edge, &FacetOptions::default())?;
                if facets.points.iter().any(|p| p.distance(pos) <= dist) {
                    return Ok(true);
                }
            }
            Ok(false)
        };
        if near_surface || near_boundary()? {
            out.push(face);
        }
    }
    Ok(out)
}

/// Edges of an entity within `dist` of a position.
pub fn find_close_edges(
    thing: &Thing,
    pos: Point3,
    entity: EntityId,
    dist: f64,
) -> Result<Vec<EdgeId>> {
    let mut out = Vec::new();
    for edge_id in edges_under(thing, entity)? {
        if !thing.edge_box(edge_id)?.stretch(dist).contains(pos) {
            continue;
        }
        let edge = thing.edge(edge_id)?;
        let curve = thing.curve(edge.curve().ok_or_else(|| {
            lathe_topology::Error::TopologyCorrupt(format!("edge {edge_id:?} has no curve"))
        })?)?;
        let (t, close) = curve.inverse(pos, None);
        if close.distance(pos) <= dist && edge.domain().contains(t) {
            out.push(edge_id);
        }
    }
    Ok(out)
}

/// Faces whose surfaces carry the same geometry as the given face's.
pub fn find_similar_faces(thing: &Thing, face: FaceId, tol: f64) -> Result<Vec<FaceId>> {
    let target = face_surface(thing, face)?;
    let mut out = Vec::new();
    for other in thing.get_faces(false) {
        if other == face {
            continue;
        }
        if face_surface(thing, other)?.is_same(target, tol) {
            out.push(other);
        }
    }
    Ok(out)
}

/// The triangle mesh of a face: positions, flat triangle indices, and
/// outward unit normals.
pub fn get_face_triangles(
    thing: &Thing,
    face: FaceId,
    options: &FacetOptions,
) -> Result<(Vec<Point3>, Vec<u32>, Vec<Vector3>)> {
    let facets = facet_face(thing, face, options)?;
    Ok((
        facets.points3d.clone(),
        facets.triangles.clone(),
        facets.normals.clone(),
    ))
}

/// The facet polyline of an edge.
pub fn get_edge_facets(thing: &Thing, edge: EdgeId, options: &FacetOptions) -> Result<Vec<Point3>> {
    Ok(facet_edge(thing, edge, options)?.points.clone())
}

fn faces_under(thing: &Thing, entity: EntityId) -> Result<Vec<FaceId>> {
    match thing.kind_of(entity) {
        Some(EntityKind::Body) => {
            let mut out = Vec::new();
            for &volume in thing.body(BodyId::from(entity))?.volumes() {
                out.extend(thing.volume(volume)?.faces().iter().copied());
            }
            Ok(out)
        }
        Some(EntityKind::Volume) => Ok(thing
            .volume(VolumeId::from(entity))?
            .faces()
            .iter()
            .copied()
            .collect()),
        Some(EntityKind::Face) => Ok(vec![FaceId::from(entity)]),
        _ => Ok(Vec::new()),
    }
}

fn edges_under(thing: &Thing, entity: EntityId) -> Result<Vec<EdgeId>> {
    match thing.kind_of(entity) {
        Some(EntityKind::Edge) => Ok(vec![EdgeId::from(entity)]),
        _ => {
            let mut out = std::collections::BTreeSet::new();
            for face in faces_under(thing, entity)? {
                out.extend(thing.face(face)?.edges().keys().copied());
            }
            if let Some(EntityKind::Volume) = thing.kind_of(entity) {
                out.extend(thing.volume(VolumeId::from(entity))?.edges().iter().copied());
            }
            if let Some(EntityKind::Body) = thing.kind_of(entity) {
                for &volume in thing.body(BodyId::from(entity))?.volumes() {
                    out.extend(thing.volume(volume)?.edges().iter().copied());
                }
            }
            Ok(out.into_iter().collect())
        }
    }
}
