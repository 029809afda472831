use crate::errors::Result;
use crate::line_curve::intersect_line_and_curve;
use crate::line_surface::intersect_line_and_surface;
use crate::types::{order_and_dedup, Hit, IntersectionKind};
use lathe_base::hash::jitter_direction3;
use lathe_base::prelude::*;
use lathe_meshalgo::point_in_face;
use lathe_topology::{ComplexId, EdgeId, EntityId, EntityKind, FaceId, Thing, VolumeId};

/// Fires the ray `origin + t * axis` through an entity: every hit on the
/// entity's boundary, ordered by signed distance along the axis, without
/// duplicates closer than `tol`. Hits behind the origin are discarded
/// unless `use_whole_line` is set.
pub fn ray_fire(
    thing: &Thing,
    origin: Point3,
    axis: Vector3,
    entity: EntityId,
    tol: f64,
    use_whole_line: bool,
) -> Result<Vec<Hit>> {
    let axis = axis.normalize();
    let tol = f64::max(tol, TOLERANCE);
    let kind = thing
        .kind_of(entity)
        .ok_or(lathe_topology::Error::UnknownEntityId(entity))?;
    let mut hits = match kind {
        EntityKind::Body => {
            let body = thing.body(lathe_topology::BodyId::from(entity))?;
            let mut hits = Vec::new();
            for &volume in body.volumes() {
                hits.extend(ray_fire_volume(thing, origin, axis, volume, tol)?);
            }
            hits
        }
        EntityKind::Volume => ray_fire_volume(thing, origin, axis, VolumeId::from(entity), tol)?,
        EntityKind::Face => ray_fire_face(thing, origin, axis, FaceId::from(entity), tol)?,
        EntityKind::Edge => ray_fire_edge(thing, origin, axis, EdgeId::from(entity), tol)?,
        EntityKind::Complex => {
            ray_fire_complex(thing, origin, axis, ComplexId::from(entity), tol)?
        }
        _ => Vec::new(),
    };
    if !use_whole_line {
        hits.retain(|hit| (hit.0 - origin).dot(axis) >= -tol);
    }
    Ok(order_and_dedup(origin, axis, hits, tol))
}

fn ray_fire_volume(
    thing: &Thing,
    origin: Point3,
    axis: Vector3,
    volume: VolumeId,
    tol: f64,
) -> Result<Vec<Hit>> {
    let tree = thing.volume_face_tree(volume)?;
    let mut hits = Vec::new();
    for &face in tree.find_intersecting_line(origin, axis, tol) {
        hits.extend(ray_fire_face(thing, origin, axis, face, tol)?);
    }
    Ok(hits)
}

fn ray_fire_face(
    thing: &Thing,
    origin: Point3,
    axis: Vector3,
    face_id: FaceId,
    tol: f64,
) -> Result<Vec<Hit>> {
    let face = thing.face(face_id)?;
    let surface_id = face.surface().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("face {face_id:?} has no surface"))
    })?;
    let surface = thing.surface(surface_id)?;
    let mut hits = Vec::new();
    for hit in intersect_line_and_surface(origin, axis, surface, tol) {
        if hit.1 == IntersectionKind::Coincident {
            hits.push(hit);
            continue;
        }
        let (uv, _) = surface.inverse(hit.0, None);
        if point_in_face(thing, face_id, uv)? {
            hits.push(hit);
        }
    }
    Ok(hits)
}

fn ray_fire_edge(
    thing: &Thing,
    origin: Point3,
    axis: Vector3,
    edge_id: EdgeId,
    tol: f64,
) -> Result<Vec<Hit>> {
    let edge = thing.edge(edge_id)?;
    let curve_id = edge.curve().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("edge {edge_id:?} has no curve"))
    })?;
    let curve = thing.curve(curve_id)?;
    let domain = edge.domain();
    let hits = intersect_line_and_curve(origin, axis, curve, tol)
        .into_iter()
        .filter(|hit| {
            let (t, _) = curve.inverse(hit.0, None);
            domain.contains(t) || domain.on_boundary(t, tol)
        })
        .collect();
    Ok(hits)
}

fn ray_fire_complex(
    thing: &Thing,
    origin: Point3,
    axis: Vector3,
    complex_id: ComplexId,
    tol: f64,
) -> Result<Vec<Hit>> {
    let complex = thing.complex(complex_id)?;
    let tree = complex.triangle_tree();
    let points = complex.points();
    let triangles = complex.triangles();
    let mut hits = Vec::new();
    for &start in tree.find_intersecting_line(origin, axis, tol) {
        let a = points[triangles[start as usize] as usize];
        let b = points[triangles[start as usize + 1] as usize];
        let c = points[triangles[start as usize + 2] as usize];
        if let Some(hit) = ray_triangle(origin, axis, a, b, c, tol) {
            hits.push(hit);
        }
    }
    Ok(hits)
}

/// intersection with one triangle, in the triangle's plane
fn ray_triangle(
    origin: Point3,
    axis: Vector3,
    a: Point3,
    b: Point3,
    c: Point3,
    tol: f64,
) -> Option<Hit> {
    let n = (b - a).cross(c - a);
    if n.magnitude().so_small() {
        return None;
    }
    let n = n.normalize();
    let denom = axis.dot(n);
    if denom.abs() < ZERO {
        return None;
    }
    let t = (a - origin).dot(n) / denom;
    let p = origin + axis * t;
    let inside = [(a, b), (b, c), (c, a)].into_iter().all(|(u, v)| {
        (v - u).cross(p - u).dot(n) >= -tol
    });
    match inside {
        true => Some((p, IntersectionKind::Point)),
        false => None,
    }
}

/// Clips ray-fire hits to a segment.
pub fn intersect_segment(
    thing: &Thing,
    segment: Segment3,
    entity: EntityId,
    tol: f64,
) -> Result<Vec<Hit>> {
    let dir = segment.end - segment.start;
    let length = dir.magnitude();
    if length.so_small() {
        return Ok(Vec::new());
    }
    let axis = dir / length;
    let hits = ray_fire(thing, segment.start, axis, entity, tol, false)?;
    Ok(hits
        .into_iter()
        .filter(|hit| (hit.0 - segment.start).dot(axis) <= length + tol)
        .collect())
}

/// Whether `pos` lies inside the volume, by ray parity. Rays grazing the
/// boundary tangentially retry along a jittered direction.
pub fn point_in_volume(thing: &Thing, pos: Point3, volume: VolumeId, tol: f64) -> Result<bool> {
    if !thing.volume_box(volume)?.stretch(tol).contains(pos) {
        return Ok(false);
    }
    let mut direction = Vector3::new(0.577_350_269_189_625_7, 0.577_350_269_189_625_7, 0.577_350_269_189_625_7);
    for salt in 0..8 {
        let hits = ray_fire_volume(thing, pos, direction, volume, tol)?;
        let hits = order_and_dedup(pos, direction, hits, tol);
        let forward: Vec<_> = hits
            .iter()
            .filter(|hit| (hit.0 - pos).dot(direction) >= -tol)
            .collect();
        // a boundary point is inside
        if forward
            .first()
            .map(|hit| hit.0.distance(pos) <= tol)
            .unwrap_or(false)
        {
            return Ok(true);
        }
        let grazing = forward
            .iter()
            .any(|hit| hit.1 != IntersectionKind::Point);
        if !grazing {
            return Ok(forward.len() % 2 == 1);
        }
        direction = jitter_direction3(pos, salt as f64 + 1.0);
    }
    // every retry grazed; fall back to the last parity
    let hits = ray_fire_volume(thing, pos, direction, volume, tol)?;
    let count = order_and_dedup(pos, direction, hits, tol)
        .into_iter()
        .filter(|hit| (hit.0 - pos).dot(direction) >= -tol)
        .count();
    Ok(count % 2 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use lathe_geometry::curves::Circle;
    use lathe_geometry::curves::Curve;

    #[test]
    fn edge_hits_clip_to_domain() {
        let mut thing = Thing::new();
        let circle: Curve = Circle::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            2.0,
            None,
        )
        .into();
        let curve = thing.add_curve(circle);
        let edge = thing.add_edge(curve).unwrap();
        // restrict to the right half of the circle
        thing
            .edge_set_domain(edge, Interval1D::new(-std::f64::consts::PI / 2.0, std::f64::consts::PI / 2.0))
            .unwrap();
        // a horizontal line catches only the x > 0 crossing
        let hits = ray_fire(
            &thing,
            Point3::new(-5.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            edge.into(),
            1.0e-6,
            true,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_near!(hits[0].0, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn complex_triangle_hit() {
        let mut thing = Thing::new();
        let complex = thing.add_complex(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            Vec::new(),
            vec![0, 1, 2],
        );
        let hits = ray_fire(
            &thing,
            Point3::new(0.5, 0.5, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
            complex.into(),
            1.0e-6,
            false,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_near!(hits[0].0, Point3::new(0.5, 0.5, 0.0));
        // firing away from the triangle finds nothing without whole-line
        let hits = ray_fire(
            &thing,
            Point3::new(0.5, 0.5, -1.0),
            Vector3::new(0.0, 0.0, -1.0),
            complex.into(),
            1.0e-6,
            false,
        )
        .unwrap();
        assert!(hits.is_empty());
    }
}
