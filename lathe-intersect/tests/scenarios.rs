use lathe_base::prelude::*;
use lathe_intersect::{ray_fire, IntersectionKind};
use lathe_modeling::{create_block, create_cylinder, create_sphere, create_torus};
use lathe_topology::Thing;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn ray_through_cylinder_body() {
    init();
    let mut thing = Thing::new();
    // a unit cylinder standing on the origin
    let body = create_cylinder(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
        1.0,
        false,
    )
    .unwrap();
    let hits = ray_fire(
        &thing,
        Point3::new(-2.0, 0.0, 1.0),
        Vector3::new(1.0, 0.0, 0.0),
        body.into(),
        1.0e-6,
        false,
    )
    .unwrap();
    assert_eq!(hits.len(), 2, "hits: {hits:?}");
    assert!(hits[0].0.distance(Point3::new(-1.0, 0.0, 1.0)) < 1.0e-6);
    assert!(hits[1].0.distance(Point3::new(1.0, 0.0, 1.0)) < 1.0e-6);
    assert_eq!(hits[0].1, IntersectionKind::Point);
    assert_eq!(hits[1].1, IntersectionKind::Point);
}

#[test]
fn ray_through_torus_body() {
    init();
    let mut thing = Thing::new();
    // the donut on the z axis
    let body = create_torus(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        1.0,
        3.0,
        false,
    )
    .unwrap();
    let hits = ray_fire(
        &thing,
        Point3::new(-20.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        body.into(),
        1.0e-6,
        false,
    )
    .unwrap();
    assert_eq!(hits.len(), 4, "hits: {hits:?}");
    for (hit, x) in hits.iter().zip([-4.0, -2.0, 2.0, 4.0]) {
        assert!(hit.0.distance(Point3::new(x, 0.0, 0.0)) < 1.0e-6);
        assert_eq!(hit.1, IntersectionKind::Point);
    }
    // offset to the tangent height: one tangent hit
    let hits = ray_fire(
        &thing,
        Point3::new(-20.0, 4.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        body.into(),
        1.0e-6,
        false,
    )
    .unwrap();
    assert_eq!(hits.len(), 1, "hits: {hits:?}");
    assert_eq!(hits[0].1, IntersectionKind::Tangent);
    assert!(hits[0].0.distance(Point3::new(0.0, 4.0, 0.0)) < 1.0e-6);
}

#[test]
fn ray_hits_are_ordered_and_deduplicated() {
    init();
    let mut thing = Thing::new();
    let body = create_block(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 10.0, 10.0),
    )
    .unwrap();
    let hits = ray_fire(
        &thing,
        Point3::new(-5.0, 5.0, 5.0),
        Vector3::new(1.0, 0.0, 0.0),
        body.into(),
        1.0e-6,
        false,
    )
    .unwrap();
    assert_eq!(hits.len(), 2);
    let d0 = (hits[0].0 - Point3::new(-5.0, 5.0, 5.0)).magnitude();
    let d1 = (hits[1].0 - Point3::new(-5.0, 5.0, 5.0)).magnitude();
    assert!(d0 < d1);
    assert!(hits[0].0.distance(Point3::new(0.0, 5.0, 5.0)) < 1.0e-6);
    assert!(hits[1].0.distance(Point3::new(10.0, 5.0, 5.0)) < 1.0e-6);

    // whole-line keeps hits behind the origin
    let behind = ray_fire(
        &thing,
        Point3::new(15.0, 5.0, 5.0),
        Vector3::new(1.0, 0.0, 0.0),
        body.into(),
        1.0e-6,
        true,
    )
    .unwrap();
    assert_eq!(behind.len(), 2);
    let forward_only = ray_fire(
        &thing,
        Point3::new(15.0, 5.0, 5.0),
        Vector3::new(1.0, 0.0, 0.0),
        body.into(),
        1.0e-6,
        false,
    )
    .unwrap();
    assert!(forward_only.is_empty());
}

#[test]
fn ray_grazing_sphere_is_tangent() {
    init();
    let mut thing = Thing::new();
    let body = create_sphere(&mut thing, Point3::new(0.0, 0.0, 0.0), 2.0).unwrap();
    let hits = ray_fire(
        &thing,
        Point3::new(-5.0, 2.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        body.into(),
        1.0e-6,
        false,
    )
    .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].1, IntersectionKind::Tangent);
}

#[test]
fn segment_clips_hits() {
    init();
    let mut thing = Thing::new();
    let body = create_block(
        &mut thing,
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 10.0, 10.0),
    )
    .unwrap();
    let hits = lathe_intersect::intersect_segment(
        &thing,
        Segment3::new(Point3::new(-5.0, 5.0, 5.0), Point3::new(5.0, 5.0, 5.0)),
        body.into(),
        1.0e-6,
    )
    .unwrap();
    // only the near wall lies within the segment
    assert_eq!(hits.len(), 1);
    assert!(hits[0].0.distance(Point3::new(0.0, 5.0, 5.0)) < 1.0e-6);
}
