use lathe_base::prelude::*;
use lathe_meshalgo::{facet_edge, facet_face, FacetOptions};
use lathe_modeling::{create_block, create_cylinder, create_torus, faces_of_body};
use lathe_topology::Thing;
use std::collections::BTreeMap;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// boundary half-edges of a face triangulation, each directed pair
/// appearing once
fn boundary_segments(triangles: &[u32]) -> Vec<(u32, u32)> {
    let mut count: BTreeMap<(u32, u32), i32> = BTreeMap::new();
    for tri in triangles.chunks_exact(3) {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            let key = (a.min(b), a.max(b));
            *count.entry(key).or_insert(0) += 1;
        }
    }
    count
        .into_iter()
        .filter(|&(_, c)| c == 1)
        .map(|(key, _)| key)
        .collect()
}

#[test]
fn block_faces_tessellate_exactly() {
    init();
    let mut thing = Thing::new();
    let body = create_block(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 3.0, 4.0),
    )
    .unwrap();
    let options = FacetOptions::default();
    for face in faces_of_body(&thing, body).unwrap() {
        let facets = facet_face(&thing, face, &options).unwrap();
        // a planar rectangle facets into two triangles over four points
        assert_eq!(facets.points3d.len(), 4);
        assert_eq!(facets.triangles.len(), 6);
        // every boundary point belongs to an edge or a vertex
        for owner in &facets.point_owners {
            let kind = thing.kind_of(*owner).unwrap();
            assert_ne!(kind, lathe_topology::EntityKind::Face);
        }
    }
}

#[test]
fn cylinder_boundary_coincides_with_edge_facets() {
    init();
    let mut thing = Thing::new();
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        1.0,
        false,
    )
    .unwrap();
    let options = FacetOptions::default();
    let faces = faces_of_body(&thing, body).unwrap();
    let side = faces[0];
    let facets = facet_face(&thing, side, &options).unwrap();
    assert!(!facets.triangles.is_empty());

    // every point of the rim edge polylines appears among the face's
    // boundary points
    let boundary = boundary_segments(&facets.triangles);
    let boundary_points: Vec<Point3> = boundary
        .iter()
        .flat_map(|&(a, b)| [facets.points3d[a as usize], facets.points3d[b as usize]])
        .collect();
    for &edge in thing.face(side).unwrap().edges().keys() {
        let polyline = facet_edge(&thing, edge, &options).unwrap();
        for p in &polyline.points {
            let found = boundary_points.iter().any(|q| q.distance(*p) < 1.0e-6);
            assert!(found, "edge facet point {p:?} missing from the face boundary");
        }
    }

    // all points stay on the cylinder
    for p in &facets.points3d {
        assert!((f64::sqrt(p.x * p.x + p.y * p.y) - 1.0).abs() < 1.0e-9);
        assert!((-1.0e-9..=2.0 + 1.0e-9).contains(&p.z));
    }
}

#[test]
fn curvature_refinement_meets_the_angle_tolerance() {
    init();
    let mut thing = Thing::new();
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        1.0,
        false,
    )
    .unwrap();
    let options = FacetOptions::default();
    let side = faces_of_body(&thing, body).unwrap()[0];
    let facets = facet_face(&thing, side, &options).unwrap();
    let cos_tol = f64::cos(options.face_angle_tol * 1.05);
    let boundary = boundary_segments(&facets.triangles);
    for tri in facets.triangles.chunks_exact(3) {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            if boundary.contains(&(a.min(b), a.max(b))) {
                continue;
            }
            let na = facets.normals[a as usize];
            let nb = facets.normals[b as usize];
            assert!(
                na.dot(nb) >= cos_tol,
                "normals spread {} degrees across an interior edge",
                na.dot(nb).acos().to_degrees()
            );
        }
    }
}

#[test]
fn sphere_poles_are_fanned_not_collapsed() {
    init();
    let mut thing = Thing::new();
    let body = lathe_modeling::create_sphere(&mut thing, Point3::new(0.0, 0.0, 0.0), 1.0).unwrap();
    let face = faces_of_body(&thing, body).unwrap()[0];
    let facets = facet_face(&thing, face, &FacetOptions::default()).unwrap();
    use std::f64::consts::PI;
    // both pole points are present, reached by the cap fans
    for pole_v in [PI / 2.0, -PI / 2.0] {
        let pole = facets
            .points2d
            .iter()
            .position(|uv| (uv.y - pole_v).abs() < 1.0e-9);
        assert!(pole.is_some(), "no pole point at v = {pole_v}");
        let pole = pole.unwrap() as u32;
        let fan: Vec<_> = facets
            .triangles
            .chunks_exact(3)
            .filter(|tri| tri.contains(&pole))
            .collect();
        assert!(fan.len() >= 3, "only {} fan triangles at v = {pole_v}", fan.len());
        // the fan triangles span real area in space: nothing collapsed
        // onto the singularity
        for tri in fan {
            let a = facets.points3d[tri[0] as usize];
            let b = facets.points3d[tri[1] as usize];
            let c = facets.points3d[tri[2] as usize];
            let area = (b - a).cross(c - a).magnitude() * 0.5;
            assert!(area > 1.0e-8, "degenerate pole triangle of area {area}");
        }
    }
}

#[test]
fn torus_face_gets_grid_interior() {
    init();
    let mut thing = Thing::new();
    let body = create_torus(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        1.0,
        3.0,
        false,
    )
    .unwrap();
    let face = faces_of_body(&thing, body).unwrap()[0];
    let facets = facet_face(&thing, face, &FacetOptions::default()).unwrap();
    // interior points exist beyond the synthesized rectangle boundary
    let interior = facets
        .point_owners
        .iter()
        .filter(|&&o| thing.kind_of(o) == Some(lathe_topology::EntityKind::Face))
        .count();
    assert!(interior > 16, "only {interior} interior points");
    // all points on the torus
    for p in &facets.points3d {
        let rho = f64::sqrt(p.x * p.x + p.y * p.y);
        let d = f64::sqrt((rho - 3.0) * (rho - 3.0) + p.z * p.z);
        assert!((d - 1.0).abs() < 1.0e-9, "off torus by {}", (d - 1.0).abs());
    }
}
