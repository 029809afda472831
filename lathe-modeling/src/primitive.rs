use crate::errors::{Error, Result};
use lathe_base::prelude::*;
use lathe_geometry::curves::{Circle, Curve, Line};
use lathe_geometry::surfaces::{Cone, Cylinder, Plane, Sphere, Surface, Torus, TorusKind};
use lathe_topology::{BodyId, EdgeId, EdgeSide, FaceId, Thing, VertexId};

/// Creates an edge over `curve`, restricted to `domain` when given, with
/// vertices at the open ends.
pub fn create_edge(
    thing: &mut Thing,
    curve: Curve,
    domain: Option<Interval1D>,
) -> Result<EdgeId> {
    let closed = curve.is_closed();
    let curve_domain = curve.domain();
    let domain = domain.unwrap_or(curve_domain);
    let front = curve.subs(domain.min);
    let back = curve.subs(domain.max);
    let curve_id = thing.add_curve(curve);
    let edge = thing.add_edge(curve_id)?;
    thing.edge_set_domain(edge, domain)?;
    let whole = near_equal(domain.length(), curve_domain.length(), TOLERANCE, false);
    if !(closed && whole) {
        let v0 = thing.add_vertex(front);
        let v1 = match front.near(&back) {
            true => v0,
            false => thing.add_vertex(back),
        };
        thing.edge_set_vertices(edge, Some(v0), Some(v1))?;
    }
    Ok(edge)
}

/// Creates a linear edge from `start` to `end`.
pub fn create_edge_from_points(thing: &mut Thing, start: Point3, end: Point3) -> Result<EdgeId> {
    create_edge(thing, Line::from_points(start, end).into(), None)
}

/// an edge between existing vertices over `curve`
pub fn create_edge_between(
    thing: &mut Thing,
    curve: Curve,
    start: VertexId,
    end: VertexId,
) -> Result<EdgeId> {
    let curve_id = thing.add_curve(curve);
    let edge = thing.add_edge(curve_id)?;
    thing.edge_set_vertices(edge, Some(start), Some(end))?;
    Ok(edge)
}

/// Creates an axis-aligned block spanning the two corner points.
pub fn create_block(thing: &mut Thing, corner1: Point3, corner2: Point3) -> Result<BodyId> {
    let lo = Point3::new(
        corner1.x.min(corner2.x),
        corner1.y.min(corner2.y),
        corner1.z.min(corner2.z),
    );
    let hi = Point3::new(
        corner1.x.max(corner2.x),
        corner1.y.max(corner2.y),
        corner1.z.max(corner2.z),
    );
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;
    // the eight corners, bit k of the index selecting hi per axis
    let corner = |i: usize| -> Point3 {
        Point3::new(
            if i & 1 == 0 { lo.x } else { hi.x },
            if i & 2 == 0 { lo.y } else { hi.y },
            if i & 4 == 0 { lo.z } else { hi.z },
        )
    };
    let vertices: Vec<VertexId> = (0..8).map(|i| thing.add_vertex(corner(i))).collect();
    // the twelve edges as corner index pairs
    let edge_pairs = [
        (0, 1), (2, 3), (4, 5), (6, 7), // along x
        (0, 2), (1, 3), (4, 6), (5, 7), // along y
        (0, 4), (1, 5), (2, 6), (3, 7), // along z
    ];
    let mut edges = Vec::with_capacity(12);
    for &(a, b) in &edge_pairs {
        let curve = thing.add_curve(Line::from_points(corner(a), corner(b)).into());
        let edge = thing.add_edge(curve)?;
        thing.edge_set_vertices(edge, Some(vertices[a]), Some(vertices[b]))?;
        edges.push(edge);
    }
    let edge_index = |a: usize, b: usize| -> (usize, bool) {
        for (i, &(p, q)) in edge_pairs.iter().enumerate() {
            if (p, q) == (a, b) {
                return (i, true);
            }
            if (p, q) == (b, a) {
                return (i, false);
            }
        }
        unreachable!("not a block edge")
    };
    // faces: corner loops counter-clockwise seen from outside, with the
    // outward plane normal
    let face_loops: [( [usize; 4], Vector3); 6] = [
        ([0, 2, 3, 1], Vector3::new(0.0, 0.0, -1.0)), // bottom
        ([4, 5, 7, 6], Vector3::new(0.0, 0.0, 1.0)),  // top
        ([0, 1, 5, 4], Vector3::new(0.0, -1.0, 0.0)), // front
        ([2, 6, 7, 3], Vector3::new(0.0, 1.0, 0.0)),  // back
        ([0, 4, 6, 2], Vector3::new(-1.0, 0.0, 0.0)), // left
        ([1, 3, 7, 5], Vector3::new(1.0, 0.0, 0.0)),  // right
    ];
    for (loop_corners, normal) in face_loops {
        let face = thing.add_face(Some(volume))?;
        let plane = Plane::new(corner(loop_corners[0]), normal);
        let surface = thing.add_surface(plane.into());
        thing.face_set_surface(face, surface)?;
        for k in 0..4 {
            let (a, b) = (loop_corners[k], loop_corners[(k + 1) % 4]);
            let (idx, forward) = edge_index(a, b);
            let side = match forward {
                true => EdgeSide::Left,
                false => EdgeSide::Right,
            };
            thing.face_add_edge(face, edges[idx], side)?;
        }
    }
    Ok(body)
}

/// Creates a solid sphere.
pub fn create_sphere(thing: &mut Thing, center: Point3, radius: f64) -> Result<BodyId> {
    if radius <= 0.0 {
        return Err(Error::InsufficientData("sphere radius must be positive".into()));
    }
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;
    let face = thing.add_face(Some(volume))?;
    let surface = thing.add_surface(Sphere::new(center, radius).into());
    thing.face_set_surface(face, surface)?;
    Ok(body)
}

/// Creates a solid cylinder between two cap centers, or the open side
/// sheet when `sheet` is set.
pub fn create_cylinder(
    thing: &mut Thing,
    bottom: Point3,
    top: Point3,
    radius: f64,
    sheet: bool,
) -> Result<BodyId> {
    let axis = top - bottom;
    if axis.magnitude().so_small() || radius <= 0.0 {
        return Err(Error::InsufficientData(
            "cylinder needs distinct cap centers and a positive radius".into(),
        ));
    }
    let axis_dir = axis.normalize();
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;

    let cylinder = Cylinder::from_ends(bottom, top, radius);
    let x_axis = cylinder.x_axis();
    let side_surface = thing.add_surface(cylinder.into());
    let side = thing.add_face(Some(volume))?;
    thing.face_set_surface(side, side_surface)?;

    let bottom_curve: Curve = Circle::new(bottom, axis_dir, radius, Some(x_axis)).into();
    let top_curve: Curve = Circle::new(top, axis_dir, radius, Some(x_axis)).into();
    let bottom_edge = create_edge(thing, bottom_curve, None)?;
    let top_edge = create_edge(thing, top_curve, None)?;
    thing.face_add_edge(side, bottom_edge, EdgeSide::Left)?;
    thing.face_add_edge(side, top_edge, EdgeSide::Right)?;
    if sheet {
        thing.face_set_sides(side, 2)?;
        return Ok(body);
    }
    // the caps: outward plane normals, disk interior on the matching side
    let bottom_face = thing.add_face(Some(volume))?;
    let bottom_plane = thing.add_surface(Plane::new(bottom, -axis_dir).into());
    thing.face_set_surface(bottom_face, bottom_plane)?;
    thing.face_add_edge(bottom_face, bottom_edge, EdgeSide::Right)?;

    let top_face = thing.add_face(Some(volume))?;
    let top_plane = thing.add_surface(Plane::new(top, axis_dir).into());
    thing.face_set_surface(top_face, top_plane)?;
    thing.face_add_edge(top_face, top_edge, EdgeSide::Left)?;
    Ok(body)
}

/// Creates a solid cone frustum between two cap centers; a zero top
/// radius closes the top at the apex.
pub fn create_cone(
    thing: &mut Thing,
    bottom: Point3,
    top: Point3,
    bottom_radius: f64,
    top_radius: f64,
) -> Result<BodyId> {
    let axis = top - bottom;
    let height = axis.magnitude();
    if height.so_small() || bottom_radius < 0.0 || top_radius < 0.0 {
        return Err(Error::InsufficientData(
            "cone needs distinct cap centers and non-negative radii".into(),
        ));
    }
    if near_equal(bottom_radius, top_radius, TOLERANCE, false) {
        return create_cylinder(thing, bottom, top, bottom_radius, false);
    }
    let axis_dir = axis.normalize();
    // widen toward the bottom: the surface axis points at the apex
    let (base, base_radius, tip, tip_radius, surface_axis) = match bottom_radius > top_radius {
        true => (bottom, bottom_radius, top, top_radius, axis_dir),
        false => (top, top_radius, bottom, bottom_radius, -axis_dir),
    };
    let half_angle = f64::atan2(base_radius - tip_radius, height);
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;
    let cone = Cone::new(base, surface_axis, base_radius, half_angle);
    let side_surface = thing.add_surface(cone.into());
    let side = thing.add_face(Some(volume))?;
    thing.face_set_surface(side, side_surface)?;

    let base_curve: Curve = Circle::new(base, axis_dir, base_radius, None).into();
    let base_edge = create_edge(thing, base_curve, None)?;
    let base_side = match bottom_radius > top_radius {
        true => EdgeSide::Left,
        false => EdgeSide::Right,
    };
    thing.face_add_edge(side, base_edge, base_side)?;

    let base_face = thing.add_face(Some(volume))?;
    let base_out = match bottom_radius > top_radius {
        true => -axis_dir,
        false => axis_dir,
    };
    let base_plane = thing.add_surface(Plane::new(base, base_out).into());
    thing.face_set_surface(base_face, base_plane)?;
    let base_cap_side = match base_side {
        EdgeSide::Left => EdgeSide::Right,
        _ => EdgeSide::Left,
    };
    thing.face_add_edge(base_face, base_edge, base_cap_side)?;

    if tip_radius > TOLERANCE {
        let tip_curve: Curve = Circle::new(tip, axis_dir, tip_radius, None).into();
        let tip_edge = create_edge(thing, tip_curve, None)?;
        let tip_side = match base_side {
            EdgeSide::Left => EdgeSide::Right,
            _ => EdgeSide::Left,
        };
        thing.face_add_edge(side, tip_edge, tip_side)?;
        let tip_face = thing.add_face(Some(volume))?;
        let tip_plane = thing.add_surface(Plane::new(tip, -base_out).into());
        thing.face_set_surface(tip_face, tip_plane)?;
        thing.face_add_edge(tip_face, tip_edge, base_side)?;
    }
    Ok(body)
}

/// Creates a solid torus; `apple` picks the outer branch when the minor
/// radius exceeds the major.
pub fn create_torus(
    thing: &mut Thing,
    center: Point3,
    axis: Vector3,
    minor_radius: f64,
    major_radius: f64,
    apple: bool,
) -> Result<BodyId> {
    if minor_radius <= 0.0 || major_radius <= 0.0 {
        return Err(Error::InsufficientData("torus radii must be positive".into()));
    }
    let kind = match () {
        _ if minor_radius < major_radius - TOLERANCE => TorusKind::Donut,
        _ if near_equal(minor_radius, major_radius, TOLERANCE, false) => TorusKind::Pinched,
        _ if apple => TorusKind::Apple,
        _ => TorusKind::Lemon,
    };
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;
    let face = thing.add_face(Some(volume))?;
    let surface =
        thing.add_surface(Torus::with_kind(center, axis, minor_radius, major_radius, kind).into());
    thing.face_set_surface(face, surface)?;
    Ok(body)
}

/// Revolves a generator curve fully about an axis into a sheet body, the
/// boundary circles of the open generator ends becoming edges.
pub fn create_revolve(
    thing: &mut Thing,
    origin: Point3,
    axis: Vector3,
    curve: Curve,
) -> Result<BodyId> {
    let surface = lathe_geometry::surfaces::Revolve::new(origin, axis, curve);
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;
    let face = thing.add_face(Some(volume))?;
    let closed_v = surface.closed_v();
    let domain = lathe_base::geom_traits::BoundedSurface::parameter_range(&surface);
    let surface: Surface = surface.into();
    let mut boundary = Vec::new();
    if !closed_v {
        for (v, side) in [(domain.v.min, EdgeSide::Left), (domain.v.max, EdgeSide::Right)] {
            if let Some(ring) = surface.v_param_line(v) {
                boundary.push((ring, side));
            }
        }
    }
    let surface_id = thing.add_surface(surface);
    thing.face_set_surface(face, surface_id)?;
    for (ring, side) in boundary {
        let edge = create_edge(thing, ring, None)?;
        thing.face_add_edge(face, edge, side)?;
    }
    thing.face_set_sides(face, 2)?;
    Ok(body)
}

/// Creates a sheet body over a prefabricated surface and boundary edges.
pub fn create_sheet_body(
    thing: &mut Thing,
    surface: Surface,
    edges: Vec<(EdgeId, EdgeSide)>,
) -> Result<BodyId> {
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;
    let face = thing.add_face(Some(volume))?;
    let surface_id = thing.add_surface(surface);
    thing.face_set_surface(face, surface_id)?;
    for (edge, side) in edges {
        thing.face_add_edge(face, edge, side)?;
    }
    thing.face_set_sides(face, 2)?;
    Ok(body)
}

/// Creates a flat circular sheet.
pub fn create_disk(
    thing: &mut Thing,
    center: Point3,
    normal: Vector3,
    radius: f64,
) -> Result<BodyId> {
    if radius <= 0.0 {
        return Err(Error::InsufficientData("disk radius must be positive".into()));
    }
    let rim: Curve = Circle::new(center, normal, radius, None).into();
    let edge = create_edge(thing, rim, None)?;
    create_sheet_body(
        thing,
        Plane::new(center, normal).into(),
        vec![(edge, EdgeSide::Left)],
    )
}

/// Creates a wire body from free edges.
pub fn create_wire_body(thing: &mut Thing, edges: Vec<EdgeId>) -> Result<BodyId> {
    let body = thing.add_body();
    let volume = thing.add_volume(Some(body))?;
    for edge in edges {
        thing.volume_add_edge(volume, edge)?;
    }
    Ok(body)
}

/// Creates a body carrying loose construction points.
pub fn create_point_body(thing: &mut Thing, points: Vec<Point3>) -> Result<BodyId> {
    let body = thing.add_body();
    thing.body_add_points(body, points)?;
    Ok(body)
}

/// Creates a complex from points with segment and triangle index lists.
pub fn create_complex(
    thing: &mut Thing,
    points: Vec<Point3>,
    segments: Vec<u32>,
    triangles: Vec<u32>,
) -> lathe_topology::ComplexId {
    thing.add_complex(points, segments, triangles)
}

/// every face under a body, in id order
pub fn faces_of_body(thing: &Thing, body: BodyId) -> Result<Vec<FaceId>> {
    let mut faces = Vec::new();
    for &volume in thing.body(body)?.volumes() {
        faces.extend(thing.volume(volume)?.faces().iter().copied());
    }
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_topology() {
        let mut thing = Thing::new();
        let body = create_block(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 3.0),
        )
        .unwrap();
        let faces = faces_of_body(&thing, body).unwrap();
        assert_eq!(faces.len(), 6);
        assert_eq!(thing.get_edges(false).len(), 12);
        assert_eq!(thing.get_vertices(false).len(), 8);
        assert!(thing.check().is_empty(), "{:?}", thing.check());
        // every face has a closed loop of four edges
        for face in faces {
            let loops = thing.find_loops(face).unwrap();
            assert_eq!(loops.len(), 1);
            assert_eq!(loops[0].len(), 4);
        }
    }

    #[test]
    fn cylinder_topology() {
        let mut thing = Thing::new();
        let body = create_cylinder(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
            1.0,
            false,
        )
        .unwrap();
        let faces = faces_of_body(&thing, body).unwrap();
        assert_eq!(faces.len(), 3);
        // shared rim edges between the side and the caps
        assert_eq!(thing.get_edges(false).len(), 2);
        assert!(thing.check().is_empty());
    }

    #[test]
    fn cone_to_apex() {
        let mut thing = Thing::new();
        let body = create_cone(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            1.0,
            0.0,
        )
        .unwrap();
        let faces = faces_of_body(&thing, body).unwrap();
        // the side and the bottom cap only
        assert_eq!(faces.len(), 2);
        assert!(thing.check().is_empty());
    }

    #[test]
    fn torus_and_sphere_have_single_faces() {
        let mut thing = Thing::new();
        let sphere = create_sphere(&mut thing, Point3::new(0.0, 0.0, 0.0), 1.0).unwrap();
        let torus = create_torus(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            3.0,
            false,
        )
        .unwrap();
        assert_eq!(faces_of_body(&thing, sphere).unwrap().len(), 1);
        assert_eq!(faces_of_body(&thing, torus).unwrap().len(), 1);
    }

    #[test]
    fn revolve_of_offset_line() {
        let mut thing = Thing::new();
        let generator: Curve =
            Line::from_points(Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 1.0)).into();
        let body = create_revolve(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            generator,
        )
        .unwrap();
        let faces = faces_of_body(&thing, body).unwrap();
        assert_eq!(faces.len(), 1);
        // two boundary rings
        assert_eq!(thing.face(faces[0]).unwrap().edges().len(), 2);
    }
}
