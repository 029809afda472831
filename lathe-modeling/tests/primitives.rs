use lathe_base::prelude::*;
use lathe_modeling::*;
use lathe_topology::Thing;
use std::f64::consts::PI;

fn relative_near(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * f64::max(b.abs(), 1.0)
}

#[test]
fn block_volume_is_exact() {
    let mut thing = Thing::new();
    let body = create_block(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 10.0, 10.0),
    )
    .unwrap();
    let volume = find_volume(&thing, body, VolumeMethod::Quadrature).unwrap();
    assert!(
        relative_near(volume, 1000.0, 1.0e-9),
        "block volume {volume}"
    );
}

#[test]
fn block_volume_spans_the_corner_gap() {
    let mut thing = Thing::new();
    let body = create_block(
        &mut thing,
        Point3::new(-1.0, 2.0, 0.5),
        Point3::new(2.0, 4.0, 3.5),
    )
    .unwrap();
    let volume = find_volume(&thing, body, VolumeMethod::Quadrature).unwrap();
    assert!(relative_near(volume, 3.0 * 2.0 * 3.0, 1.0e-9));
}

#[test]
fn unit_cylinder_volume_is_pi() {
    let mut thing = Thing::new();
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        1.0,
        false,
    )
    .unwrap();
    let volume = find_volume(&thing, body, VolumeMethod::Quadrature).unwrap();
    assert!(
        relative_near(volume, PI, 1.0e-6),
        "cylinder volume {volume} vs {PI}"
    );
}

#[test]
fn sphere_area_is_four_pi_r_squared() {
    let mut thing = Thing::new();
    let body = create_sphere(&mut thing, Point3::new(0.0, 0.0, 0.0), 2.0).unwrap();
    let face = faces_of_body(&thing, body).unwrap()[0];
    let area = find_area(&thing, face).unwrap();
    assert!(
        relative_near(area, 16.0 * PI, 1.0e-6),
        "sphere area {area} vs {}",
        16.0 * PI
    );
}

#[test]
fn torus_area_matches_the_closed_form() {
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
    let area = find_area(&thing, face).unwrap();
    let expect = 4.0 * PI * PI * 1.0 * 3.0;
    assert!(relative_near(area, expect, 1.0e-6), "torus area {area} vs {expect}");
}

#[test]
fn disk_area_is_exact() {
    let mut thing = Thing::new();
    let body = create_disk(
        &mut thing,
        Point3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, 1.0),
        2.0,
    )
    .unwrap();
    let face = faces_of_body(&thing, body).unwrap()[0];
    let area = find_area(&thing, face).unwrap();
    assert!(relative_near(area, 4.0 * PI, 1.0e-9), "disk area {area}");
}

#[test]
fn point_in_cylinder() {
    let mut thing = Thing::new();
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        1.0,
        false,
    )
    .unwrap();
    // outside left of the wall, then on the axis
    assert!(!point_in_entity(&thing, Point3::new(-2.0, 0.0, 1.0), body.into(), 1.0e-6).unwrap());
    assert!(point_in_entity(&thing, Point3::new(0.0, 0.0, 1.0), body.into(), 1.0e-6).unwrap());
    assert!(!point_in_entity(&thing, Point3::new(0.0, 0.0, 3.0), body.into(), 1.0e-6).unwrap());
    assert!(point_in_entity(&thing, Point3::new(0.5, 0.2, 0.5), body.into(), 1.0e-6).unwrap());
}

#[test]
fn transform_round_trip_preserves_volume() {
    let mut thing = Thing::new();
    let body = create_block(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 3.0, 4.0),
    )
    .unwrap();
    let before = find_volume(&thing, body, VolumeMethod::Quadrature).unwrap();
    let trans = lathe_geometry::transform::Transform3::rotate_about(
        Point3::new(1.0, 1.0, 1.0),
        Vector3::new(1.0, 2.0, 0.5),
        Rad(0.83),
    );
    thing.transform_entity(body.into(), &trans).unwrap();
    thing.transform_entity(body.into(), &trans.inverse()).unwrap();
    let after = find_volume(&thing, body, VolumeMethod::Quadrature).unwrap();
    assert!(relative_near(after, before, 1.0e-9));
    assert!(thing.check().is_empty());
}

#[test]
fn clone_is_structurally_equal() {
    let mut thing = Thing::new();
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        1.0,
        false,
    )
    .unwrap();
    let copy = thing.clone_entity(body.into()).unwrap();
    let copy_body = lathe_topology::BodyId::from(copy);
    let v1 = find_volume(&thing, body, VolumeMethod::Quadrature).unwrap();
    let v2 = find_volume(&thing, copy_body, VolumeMethod::Quadrature).unwrap();
    assert!(relative_near(v1, v2, 1.0e-12));
    assert!(thing.check().is_empty());
}

#[test]
fn refacetting_is_deterministic() {
    let mut thing = Thing::new();
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        1.0,
        false,
    )
    .unwrap();
    let face = faces_of_body(&thing, body).unwrap()[0];
    let options = lathe_meshalgo::FacetOptions::default();
    let (pts1, tris1, _) = get_face_triangles(&thing, face, &options).unwrap();
    // drop the cache and refacet
    thing.transform_entity(body.into(), &lathe_geometry::transform::Transform3::identity())
        .unwrap();
    let (pts2, tris2, _) = get_face_triangles(&thing, face, &options).unwrap();
    assert_eq!(tris1, tris2);
    assert_eq!(pts1.len(), pts2.len());
    for (a, b) in pts1.iter().zip(&pts2) {
        assert!(a.distance(*b) < 1.0e-9);
    }
}

#[test]
fn facets_respect_orientation() {
    let mut thing = Thing::new();
    let body = create_sphere(&mut thing, Point3::new(0.0, 0.0, 0.0), 1.0).unwrap();
    let face = faces_of_body(&thing, body).unwrap()[0];
    let facets =
        lathe_meshalgo::facet_face(&thing, face, &lathe_meshalgo::FacetOptions::default()).unwrap();
    // triangles come out counter-clockwise in parameter space for a
    // non-flipped face
    for tri in facets.triangles.chunks_exact(3) {
        let a = facets.points2d[tri[0] as usize];
        let b = facets.points2d[tri[1] as usize];
        let c = facets.points2d[tri[2] as usize];
        assert!((b - a).perp_dot(c - a) > 0.0);
    }
}

#[test]
fn similar_faces_sees_shared_geometry() {
    let mut thing = Thing::new();
    let b1 = create_sphere(&mut thing, Point3::new(0.0, 0.0, 0.0), 1.0).unwrap();
    let b2 = create_sphere(&mut thing, Point3::new(0.0, 0.0, 0.0), 1.0).unwrap();
    let f1 = faces_of_body(&thing, b1).unwrap()[0];
    let f2 = faces_of_body(&thing, b2).unwrap()[0];
    let similar = find_similar_faces(&thing, f1, 1.0e-6).unwrap();
    assert_eq!(similar, vec![f2]);
}

#[test]
fn close_faces_and_edges() {
    let mut thing = Thing::new();
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        1.0,
        false,
    )
    .unwrap();
    // near the bottom rim every face and both rim edges are close
    let probe = Point3::new(1.0, 0.0, 0.0);
    let faces = find_close_faces(&thing, probe, body.into(), 0.1).unwrap();
    assert_eq!(faces.len(), 2, "side face and bottom cap, got {faces:?}");
    let edges = find_close_edges(&thing, probe, body.into(), 0.1).unwrap();
    assert_eq!(edges.len(), 1);
    // far away nothing is close
    assert!(find_close_faces(&thing, Point3::new(10.0, 0.0, 0.0), body.into(), 0.1)
        .unwrap()
        .is_empty());
}
