//! Topological structs: the `Thing` arena keyed by stable entity ids, and
//! the body, volume, face, edge, vertex, and complex variants it owns.
//!
//! Geometry is shared by reference: one surface may underlie many faces,
//! one curve many edges. Topology down-ownership is exclusive, each entity
//! keeps a back-pointer set, and every container iterates in id order so
//! outputs are deterministic.

#![cfg_attr(not(debug_assertions), deny(warnings))]
#![deny(clippy::all, rust_2018_idioms)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

mod body;
mod complex;
mod edge;
/// Enumerates `Error`.
pub mod errors;
mod face;
mod ids;
mod thing;
mod vertex;
mod volume;

pub use body::Body;
pub use complex::Complex;
pub use edge::{Edge, EdgeFacets};
pub use errors::{Error, Result};
pub use face::{EdgeSide, Face, FaceFacets};
pub use ids::{
    BodyId, ComplexId, CurveId, EdgeId, EntityId, FaceId, SurfaceId, VertexId, VolumeId,
};
pub use thing::{CurveEntity, Entity, EntityKind, SurfaceEntity, Thing};
pub use vertex::Vertex;
pub use volume::Volume;

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::prelude::*;
    use lathe_geometry::curves::{Circle, Line};
    use lathe_geometry::surfaces::Plane;
    use lathe_geometry::transform::Transform3;

    fn line_edge(thing: &mut Thing, start: Point3, end: Point3) -> EdgeId {
        let curve = thing.add_curve(Line::from_points(start, end).into());
        let edge = thing.add_edge(curve).unwrap();
        let v0 = thing.add_vertex(start);
        let v1 = thing.add_vertex(end);
        thing.edge_set_vertices(edge, Some(v0), Some(v1)).unwrap();
        edge
    }

    #[test]
    fn ids_are_monotone_and_stable() {
        let mut thing = Thing::new();
        let b1 = thing.add_body();
        let b2 = thing.add_body();
        assert!(b1.entity_id() < b2.entity_id());
        assert_eq!(thing.kind_of(b1.entity_id()), Some(EntityKind::Body));
        assert_eq!(thing.get_bodies(true), vec![b1, b2]);
    }

    #[test]
    fn delete_severs_and_cascades() {
        let mut thing = Thing::new();
        let body = thing.add_body();
        let volume = thing.add_volume(Some(body)).unwrap();
        let face = thing.add_face(Some(volume)).unwrap();
        let surface = thing.add_surface(
            Plane::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).into(),
        );
        thing.face_set_surface(face, surface).unwrap();
        let edge = line_edge(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        thing.face_add_edge(face, edge, EdgeSide::Left).unwrap();

        assert!(thing.check().is_empty());
        thing.delete_entity(body.entity_id()).unwrap();
        assert_eq!(thing.entity_count(), 0);
    }

    #[test]
    fn delete_shared_edge_is_refused() {
        let mut thing = Thing::new();
        let face = thing.add_face(None).unwrap();
        let edge = line_edge(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        thing.face_add_edge(face, edge, EdgeSide::Left).unwrap();
        assert_eq!(
            thing.delete_entity(edge.entity_id()),
            Err(Error::DeleteWillCorruptModel(edge.entity_id()))
        );
    }

    #[test]
    fn clone_remaps_ids() {
        let mut thing = Thing::new();
        let body = thing.add_body();
        let volume = thing.add_volume(Some(body)).unwrap();
        let face = thing.add_face(Some(volume)).unwrap();
        let surface = thing.add_surface(
            Plane::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).into(),
        );
        thing.face_set_surface(face, surface).unwrap();

        let copy = thing.clone_entity(body.entity_id()).unwrap();
        assert_ne!(copy, body.entity_id());
        let copy_body = thing.body(BodyId::from(copy)).unwrap();
        assert_eq!(copy_body.volumes().len(), 1);
        let copy_volume = *copy_body.volumes().iter().next().unwrap();
        assert_ne!(copy_volume, volume);
        let vol = thing.volume(copy_volume).unwrap();
        assert_eq!(vol.body(), Some(BodyId::from(copy)));
        // structural equality: same shape, fresh ids
        assert_eq!(vol.faces().len(), 1);
        assert!(thing.check().is_empty());
    }

    #[test]
    fn loops_order_edges_tip_to_tail() {
        let mut thing = Thing::new();
        let face = thing.add_face(None).unwrap();
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 1.0, 0.0);
        // triangle a -> b -> c
        let curve_ab = thing.add_curve(Line::from_points(a, b).into());
        let curve_bc = thing.add_curve(Line::from_points(b, c).into());
        let curve_ca = thing.add_curve(Line::from_points(c, a).into());
        let va = thing.add_vertex(a);
        let vb = thing.add_vertex(b);
        let vc = thing.add_vertex(c);
        let eab = thing.add_edge(curve_ab).unwrap();
        thing.edge_set_vertices(eab, Some(va), Some(vb)).unwrap();
        let ebc = thing.add_edge(curve_bc).unwrap();
        thing.edge_set_vertices(ebc, Some(vb), Some(vc)).unwrap();
        let eca = thing.add_edge(curve_ca).unwrap();
        thing.edge_set_vertices(eca, Some(vc), Some(va)).unwrap();
        for e in [eab, ebc, eca] {
            thing.face_add_edge(face, e, EdgeSide::Left).unwrap();
        }
        let loops = thing.find_loops(face).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 3);
        // each edge's head is the next edge's tail
        assert_eq!(loops[0][0].0, eab);
        assert_eq!(loops[0][1].0, ebc);
        assert_eq!(loops[0][2].0, eca);
    }

    #[test]
    fn closed_edge_forms_own_loop() {
        let mut thing = Thing::new();
        let face = thing.add_face(None).unwrap();
        let circle = thing.add_curve(
            Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, None)
                .into(),
        );
        let edge = thing.add_edge(circle).unwrap();
        thing.face_add_edge(face, edge, EdgeSide::Left).unwrap();
        let loops = thing.find_loops(face).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0], vec![(edge, EdgeSide::Left)]);
    }

    #[test]
    fn transform_moves_geometry_and_drops_caches() {
        let mut thing = Thing::new();
        let edge = line_edge(
            &mut thing,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        let before = thing.edge_box(edge).unwrap();
        thing
            .transform_entity(
                edge.entity_id(),
                &Transform3::translate(Vector3::new(5.0, 0.0, 0.0)),
            )
            .unwrap();
        let after = thing.edge_box(edge).unwrap();
        assert!((after.min.x - before.min.x - 5.0).abs() < 1.0e-6);
        assert!(thing.check().is_empty());
    }
}
