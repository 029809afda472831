use crate::body::Body;
use crate::complex::Complex;
use crate::edge::Edge;
use crate::errors::{Error, Result};
use crate::face::{EdgeSide, Face};
use crate::ids::*;
use crate::vertex::Vertex;
use crate::volume::Volume;
use lathe_base::bounding_box::{BoundingBox, Interval1D};
use lathe_base::box_tree::BoxTree;
use lathe_base::cgmath64::*;
use lathe_geometry::curves::{Curve, CurveKind};
use lathe_geometry::surfaces::Surface;
use lathe_geometry::transform::{Transform3, Transformed};
use lathe_base::geom_traits::ParametricCurve;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A curve owned by the thing and shared by edges.
#[derive(Clone, Debug)]
pub struct CurveEntity {
    pub(crate) curve: Curve,
    pub(crate) owners: BTreeSet<EntityId>,
}

impl CurveEntity {
    /// the geometry
    #[inline(always)]
    pub fn curve(&self) -> &Curve { &self.curve }
    /// the edges referring to this curve
    #[inline(always)]
    pub fn owners(&self) -> &BTreeSet<EntityId> { &self.owners }
    /// a curve is top level when no edge refers to it
    #[inline(always)]
    pub fn is_top_level(&self) -> bool { self.owners.is_empty() }
}

/// A surface owned by the thing and shared by faces.
#[derive(Clone, Debug)]
pub struct SurfaceEntity {
    pub(crate) surface: Surface,
    pub(crate) owners: BTreeSet<EntityId>,
}

impl SurfaceEntity {
    /// the geometry
    #[inline(always)]
    pub fn surface(&self) -> &Surface { &self.surface }
    /// the faces referring to this surface
    #[inline(always)]
    pub fn owners(&self) -> &BTreeSet<EntityId> { &self.owners }
    /// a surface is top level when no face refers to it
    #[inline(always)]
    pub fn is_top_level(&self) -> bool { self.owners.is_empty() }
}

/// the kind of an entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// body
    Body,
    /// volume
    Volume,
    /// face
    Face,
    /// edge
    Edge,
    /// vertex
    Vertex,
    /// complex
    Complex,
    /// curve
    Curve,
    /// surface
    Surface,
}

/// one entity of the arena
#[derive(Clone, Debug)]
pub enum Entity {
    /// body
    Body(Body),
    /// volume
    Volume(Volume),
    /// face
    Face(Face),
    /// edge
    Edge(Edge),
    /// vertex
    Vertex(Vertex),
    /// complex
    Complex(Complex),
    /// curve
    Curve(CurveEntity),
    /// surface
    Surface(SurfaceEntity),
}

impl Entity {
    /// the kind of this entity
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Body(_) => EntityKind::Body,
            Entity::Volume(_) => EntityKind::Volume,
            Entity::Face(_) => EntityKind::Face,
            Entity::Edge(_) => EntityKind::Edge,
            Entity::Vertex(_) => EntityKind::Vertex,
            Entity::Complex(_) => EntityKind::Complex,
            Entity::Curve(_) => EntityKind::Curve,
            Entity::Surface(_) => EntityKind::Surface,
        }
    }
}

/// The topology store: owns every entity by stable id and enforces the
/// ownership and back-pointer invariants.
///
/// Single-threaded contract: no operation on one `Thing` may run
/// concurrently with another on the same `Thing`. Independent `Thing`
/// instances are independent.
#[derive(Debug, Default)]
pub struct Thing {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

macro_rules! typed_access {
    ($get: ident, $get_mut: ident, $idty: ty, $variant: ident, $strukt: ty) => {
        /// typed entity lookup
        pub fn $get(&self, id: $idty) -> Result<&$strukt> {
            match self.entities.get(&id.entity_id()) {
                Some(Entity::$variant(e)) => Ok(e),
                Some(_) => Err(Error::WrongEntityKind(id.entity_id())),
                None => Err(Error::UnknownEntityId(id.entity_id())),
            }
        }
        /// typed mutable entity lookup
        pub fn $get_mut(&mut self, id: $idty) -> Result<&mut $strukt> {
            match self.entities.get_mut(&id.entity_id()) {
                Some(Entity::$variant(e)) => Ok(e),
                Some(_) => Err(Error::WrongEntityKind(id.entity_id())),
                None => Err(Error::UnknownEntityId(id.entity_id())),
            }
        }
    };
}

impl Thing {
    /// an empty thing
    pub fn new() -> Self { Self::default() }

    /// the next fresh id
    fn new_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let id = self.new_id();
        self.entities.insert(id, entity);
        id
    }

    typed_access!(body, body_mut, BodyId, Body, Body);
    typed_access!(volume, volume_mut, VolumeId, Volume, Volume);
    typed_access!(face, face_mut, FaceId, Face, Face);
    typed_access!(edge, edge_mut, EdgeId, Edge, Edge);
    typed_access!(vertex, vertex_mut, VertexId, Vertex, Vertex);
    typed_access!(complex, complex_mut, ComplexId, Complex, Complex);
    typed_access!(curve_entity, curve_entity_mut, CurveId, Curve, CurveEntity);
    typed_access!(surface_entity, surface_entity_mut, SurfaceId, Surface, SurfaceEntity);

    /// the geometry of a curve entity
    #[inline]
    pub fn curve(&self, id: CurveId) -> Result<&Curve> {
        Ok(self.curve_entity(id)?.curve())
    }

    /// the geometry of a surface entity
    #[inline]
    pub fn surface(&self, id: SurfaceId) -> Result<&Surface> {
        Ok(self.surface_entity(id)?.surface())
    }

    /// untyped lookup
    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> { self.entities.get(&id) }

    /// the kind of the entity with the given id
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.entities.get(&id).map(Entity::kind)
    }

    /// the number of stored entities
    pub fn entity_count(&self) -> usize { self.entities.len() }

    // ---------------------------------------------------------------- //
    // creation

    /// creates an empty body
    pub fn add_body(&mut self) -> BodyId { BodyId(self.insert(Entity::Body(Body::default()))) }

    /// creates an empty volume, attached to `body` when given
    pub fn add_volume(&mut self, body: Option<BodyId>) -> Result<VolumeId> {
        let id = VolumeId(self.insert(Entity::Volume(Volume::default())));
        if let Some(body) = body {
            self.body_add_volume(body, id)?;
        }
        Ok(id)
    }

    /// creates an empty face, attached to `volume` when given
    pub fn add_face(&mut self, volume: Option<VolumeId>) -> Result<FaceId> {
        let id = FaceId(self.insert(Entity::Face(Face {
            sides: 1,
            ..Face::default()
        })));
        if let Some(volume) = volume {
            self.volume_add_face(volume, id)?;
        }
        Ok(id)
    }

    /// creates an edge over `curve`, spanning the whole curve domain
    pub fn add_edge(&mut self, curve: CurveId) -> Result<EdgeId> {
        let domain = self.curve(curve)?.domain();
        let id = EdgeId(self.insert(Entity::Edge(Edge {
            curve: Some(curve),
            domain,
            ..Edge::default()
        })));
        self.curve_entity_mut(curve)?.owners.insert(id.entity_id());
        Ok(id)
    }

    /// creates a vertex at `point`
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        VertexId(self.insert(Entity::Vertex(Vertex::new(point))))
    }

    /// creates a complex from points, segment indices, and triangle indices
    pub fn add_complex(
        &mut self,
        points: Vec<Point3>,
        segments: Vec<u32>,
        triangles: Vec<u32>,
    ) -> ComplexId {
        ComplexId(self.insert(Entity::Complex(Complex::new(points, segments, triangles))))
    }

    /// stores a curve
    pub fn add_curve(&mut self, curve: Curve) -> CurveId {
        CurveId(self.insert(Entity::Curve(CurveEntity {
            curve,
            owners: BTreeSet::new(),
        })))
    }

    /// stores a surface
    pub fn add_surface(&mut self, surface: Surface) -> SurfaceId {
        SurfaceId(self.insert(Entity::Surface(SurfaceEntity {
            surface,
            owners: BTreeSet::new(),
        })))
    }

    // ---------------------------------------------------------------- //
    // linking

    /// attaches `volume` to `body`
    pub fn body_add_volume(&mut self, body: BodyId, volume: VolumeId) -> Result<()> {
        self.body(body)?;
        let vol = self.volume_mut(volume)?;
        vol.body = Some(body);
        self.body_mut(body)?.volumes.insert(volume);
        self.invalidate_upward(body.entity_id());
        Ok(())
    }

    /// attaches construction points to `body`
    pub fn body_add_points(&mut self, body: BodyId, points: Vec<Point3>) -> Result<()> {
        self.body_mut(body)?.points.extend(points);
        Ok(())
    }

    /// attaches `face` to `volume`
    pub fn volume_add_face(&mut self, volume: VolumeId, face: FaceId) -> Result<()> {
        self.volume(volume)?;
        self.face_mut(face)?.volume = Some(volume);
        let vol = self.volume_mut(volume)?;
        vol.faces.insert(face);
        vol.invalidate();
        Ok(())
    }

    /// attaches a wire `edge` to `volume`
    pub fn volume_add_edge(&mut self, volume: VolumeId, edge: EdgeId) -> Result<()> {
        self.volume(volume)?;
        self.edge_mut(edge)?.volume = Some(volume);
        let vol = self.volume_mut(volume)?;
        vol.edges.insert(edge);
        vol.invalidate();
        Ok(())
    }

    /// attaches `edge` to `face` on the given side
    pub fn face_add_edge(&mut self, face: FaceId, edge: EdgeId, side: EdgeSide) -> Result<()> {
        self.face(face)?;
        self.edge_mut(edge)?.faces.insert(face);
        let f = self.face_mut(face)?;
        f.edges.insert(edge, side);
        f.invalidate();
        Ok(())
    }

    /// sets the surface under `face`
    pub fn face_set_surface(&mut self, face: FaceId, surface: SurfaceId) -> Result<()> {
        self.surface_entity_mut(surface)?.owners.insert(face.entity_id());
        let f = self.face_mut(face)?;
        f.surface = Some(surface);
        f.invalidate();
        Ok(())
    }

    /// sets whether the face normal opposes the surface normal
    pub fn face_set_flipped(&mut self, face: FaceId, flipped: bool) -> Result<()> {
        let f = self.face_mut(face)?;
        f.flipped = flipped;
        f.invalidate();
        Ok(())
    }

    /// sets the number of sides of the face, `1` or `2`
    pub fn face_set_sides(&mut self, face: FaceId, sides: u8) -> Result<()> {
        self.face_mut(face)?.sides = sides;
        Ok(())
    }

    /// sets the start and end vertices of `edge`
    pub fn edge_set_vertices(
        &mut self,
        edge: EdgeId,
        start: Option<VertexId>,
        end: Option<VertexId>,
    ) -> Result<()> {
        // detach the previous vertices first
        let (old_start, old_end) = {
            let e = self.edge(edge)?;
            (e.start, e.end)
        };
        for old in [old_start, old_end].into_iter().flatten() {
            self.vertex_mut(old)?.edges.remove(&edge);
        }
        for vertex in [start, end].into_iter().flatten() {
            self.vertex_mut(vertex)?.edges.insert(edge);
        }
        let e = self.edge_mut(edge)?;
        e.start = start;
        e.end = end;
        e.invalidate();
        Ok(())
    }

    /// restricts the parameter interval of `edge`
    pub fn edge_set_domain(&mut self, edge: EdgeId, domain: Interval1D) -> Result<()> {
        let e = self.edge_mut(edge)?;
        e.domain = domain;
        e.invalidate();
        Ok(())
    }

    /// sets the tolerance of `edge`
    pub fn edge_set_tolerance(&mut self, edge: EdgeId, tolerance: f64) -> Result<()> {
        self.edge_mut(edge)?.tolerance = tolerance;
        Ok(())
    }

    fn invalidate_upward(&self, id: EntityId) {
        if let Some(Entity::Body(b)) = self.entities.get(&id) {
            b.invalidate();
        }
    }

    // ---------------------------------------------------------------- //
    // enumeration, in id order

    fn collect<T, F: Fn(EntityId, &Entity) -> Option<T>>(&self, f: F) -> Vec<T> {
        self.entities.iter().filter_map(|(id, e)| f(*id, e)).collect()
    }

    /// all bodies; only those with no owner when `top_level`
    pub fn get_bodies(&self, top_level: bool) -> Vec<BodyId> {
        self.collect(|id, e| match e {
            Entity::Body(b) if !top_level || b.is_top_level() => Some(BodyId(id)),
            _ => None,
        })
    }

    /// all volumes; only parentless ones when `top_level`
    pub fn get_volumes(&self, top_level: bool) -> Vec<VolumeId> {
        self.collect(|id, e| match e {
            Entity::Volume(v) if !top_level || v.is_top_level() => Some(VolumeId(id)),
            _ => None,
        })
    }

    /// all faces; only parentless ones when `top_level`
    pub fn get_faces(&self, top_level: bool) -> Vec<FaceId> {
        self.collect(|id, e| match e {
            Entity::Face(f) if !top_level || f.is_top_level() => Some(FaceId(id)),
            _ => None,
        })
    }

    /// all edges; only parentless ones when `top_level`
    pub fn get_edges(&self, top_level: bool) -> Vec<EdgeId> {
        self.collect(|id, e| match e {
            Entity::Edge(ed) if !top_level || ed.is_top_level() => Some(EdgeId(id)),
            _ => None,
        })
    }

    /// all vertices; only parentless ones when `top_level`
    pub fn get_vertices(&self, top_level: bool) -> Vec<VertexId> {
        self.collect(|id, e| match e {
            Entity::Vertex(v) if !top_level || v.is_top_level() => Some(VertexId(id)),
            _ => None,
        })
    }

    /// all complexes; only parentless ones when `top_level`
    pub fn get_complexes(&self, top_level: bool) -> Vec<ComplexId> {
        self.collect(|id, e| match e {
            Entity::Complex(c) if !top_level || c.is_top_level() => Some(ComplexId(id)),
            _ => None,
        })
    }

    /// all curves; only unreferenced ones when `top_level`
    pub fn get_curves(&self, top_level: bool) -> Vec<CurveId> {
        self.collect(|id, e| match e {
            Entity::Curve(c) if !top_level || c.is_top_level() => Some(CurveId(id)),
            _ => None,
        })
    }

    /// all surfaces; only unreferenced ones when `top_level`
    pub fn get_surfaces(&self, top_level: bool) -> Vec<SurfaceId> {
        self.collect(|id, e| match e {
            Entity::Surface(s) if !top_level || s.is_top_level() => Some(SurfaceId(id)),
            _ => None,
        })
    }

    // ---------------------------------------------------------------- //
    // edge geometry helpers

    /// the start point: the start vertex position, or the curve at the
    /// domain minimum
    pub fn edge_start_point(&self, edge: EdgeId) -> Result<Point3> {
        let e = self.edge(edge)?;
        if let Some(v) = e.start {
            return Ok(self.vertex(v)?.point());
        }
        let curve = self.curve(e.curve.ok_or_else(|| {
            Error::TopologyCorrupt(format!("edge {edge:?} has no curve"))
        })?)?;
        Ok(curve.subs(e.domain.min))
    }

    /// the end point: the end vertex position, or the curve at the domain
    /// maximum
    pub fn edge_end_point(&self, edge: EdgeId) -> Result<Point3> {
        let e = self.edge(edge)?;
        if let Some(v) = e.end {
            return Ok(self.vertex(v)?.point());
        }
        let curve = self.curve(e.curve.ok_or_else(|| {
            Error::TopologyCorrupt(format!("edge {edge:?} has no curve"))
        })?)?;
        Ok(curve.subs(e.domain.max))
    }

    /// the point at the given domain fraction of the edge
    pub fn edge_midpoint(&self, edge: EdgeId, fraction: f64) -> Result<Point3> {
        let e = self.edge(edge)?;
        let curve = self.curve(e.curve.ok_or_else(|| {
            Error::TopologyCorrupt(format!("edge {edge:?} has no curve"))
        })?)?;
        Ok(curve.subs(e.domain.mid_point(fraction)))
    }

    // ---------------------------------------------------------------- //
    // boxes and trees

    /// the bounding box of an edge, cached
    pub fn edge_box(&self, edge: EdgeId) -> Result<BoundingBox> {
        let e = self.edge(edge)?;
        if let Some(bb) = *e.cached_box.read() {
            return Ok(bb);
        }
        let curve = self.curve(e.curve.ok_or_else(|| {
            Error::TopologyCorrupt(format!("edge {edge:?} has no curve"))
        })?)?;
        let bb = curve.bounding_box(e.domain);
        *e.cached_box.write() = Some(bb);
        Ok(bb)
    }

    /// the bounding box of a face, cached; conservative
    pub fn face_box(&self, face: FaceId) -> Result<BoundingBox> {
        let f = self.face(face)?;
        if let Some(bb) = *f.cached_box.read() {
            return Ok(bb);
        }
        let bb = if let Some(facets) = f.facets() {
            BoundingBox::from_points(&facets.points3d)
        } else {
            let mut bb = BoundingBox::empty();
            for &edge in f.edges.keys() {
                bb = bb.union(&self.edge_box(edge)?);
            }
            let surface = self.surface(f.surface.ok_or_else(|| {
                Error::TopologyCorrupt(format!("face {face:?} has no surface"))
            })?)?;
            let domain = surface.domain();
            // with a bounded domain the whole patch box is a safe cover;
            // ruled unbounded kinds are covered by their edges
            if domain.u.is_bounded() && domain.v.is_bounded() {
                bb = bb.union(&surface.bounding_box(domain));
            }
            bb
        };
        *f.cached_box.write() = Some(bb);
        Ok(bb)
    }

    /// the bounding box of a volume, cached
    pub fn volume_box(&self, volume: VolumeId) -> Result<BoundingBox> {
        let v = self.volume(volume)?;
        if let Some(bb) = *v.cached_box.read() {
            return Ok(bb);
        }
        let mut bb = BoundingBox::empty();
        for &face in &v.faces {
            bb = bb.union(&self.face_box(face)?);
        }
        for &edge in &v.edges {
            bb = bb.union(&self.edge_box(edge)?);
        }
        *v.cached_box.write() = Some(bb);
        Ok(bb)
    }

    /// the bounding box of a body, cached
    pub fn body_box(&self, body: BodyId) -> Result<BoundingBox> {
        let b = self.body(body)?;
        if let Some(bb) = *b.cached_box.read() {
            return Ok(bb);
        }
        let mut bb = BoundingBox::empty();
        for &volume in &b.volumes {
            bb = bb.union(&self.volume_box(volume)?);
        }
        for p in &b.points {
            bb.push(*p);
        }
        *b.cached_box.write() = Some(bb);
        Ok(bb)
    }

    /// the bounding box of everything
    pub fn total_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for body in self.get_bodies(true) {
            if let Ok(b) = self.body_box(body) {
                bb = bb.union(&b);
            }
        }
        for complex in self.get_complexes(true) {
            if let Ok(c) = self.complex(complex) {
                bb = bb.union(&c.bounding_box());
            }
        }
        bb
    }

    /// the box tree over a volume's faces, cached; contents always equal
    /// the face set
    pub fn volume_face_tree(&self, volume: VolumeId) -> Result<Arc<BoxTree<FaceId>>> {
        let v = self.volume(volume)?;
        if let Some(tree) = v.cached_tree.read().as_ref() {
            return Ok(Arc::clone(tree));
        }
        let mut leaves = Vec::with_capacity(v.faces.len());
        for &face in &v.faces {
            leaves.push((self.face_box(face)?, face));
        }
        let tree = Arc::new(BoxTree::new(leaves));
        *v.cached_tree.write() = Some(Arc::clone(&tree));
        Ok(tree)
    }

    // ---------------------------------------------------------------- //
    // loops

    /// Partitions the edges of a face into loops: cyclic sequences ordered
    /// tip to tail, with the side each edge presents to the face. Edges
    /// with side `Both` appear twice, once per direction.
    pub fn find_loops(&self, face: FaceId) -> Result<Vec<Vec<(EdgeId, EdgeSide)>>> {
        let f = self.face(face)?;
        // half edges: (edge, side) traversals the loop must contain
        let mut pending: Vec<(EdgeId, EdgeSide)> = Vec::new();
        for (&edge, &side) in &f.edges {
            match side {
                EdgeSide::Both => {
                    pending.push((edge, EdgeSide::Left));
                    pending.push((edge, EdgeSide::Right));
                }
                side => pending.push((edge, side)),
            }
        }
        let mut loops = Vec::new();
        while let Some(&(start_edge, start_side)) = pending.first() {
            let mut cycle = vec![(start_edge, start_side)];
            pending.remove(0);
            let mut head = self.traversal_head(start_edge, start_side)?;
            let loop_start = self.traversal_tail(start_edge, start_side)?;
            loop {
                if let (Some(h), Some(s)) = (head, loop_start) {
                    if h == s {
                        break;
                    }
                } else {
                    // an edge without vertices closes on itself
                    break;
                }
                let next = pending.iter().position(|&(edge, side)| {
                    self.traversal_tail(edge, side).ok().flatten() == head
                });
                let Some(idx) = next else {
                    return Err(Error::TopologyCorrupt(format!(
                        "open loop on face {face:?}: no edge continues at {head:?}"
                    )));
                };
                let (edge, side) = pending.remove(idx);
                head = self.traversal_head(edge, side)?;
                cycle.push((edge, side));
            }
            loops.push(cycle);
        }
        Ok(loops)
    }

    // the vertex a loop traversal of (edge, side) ends at
    fn traversal_head(&self, edge: EdgeId, side: EdgeSide) -> Result<Option<VertexId>> {
        let e = self.edge(edge)?;
        Ok(match side {
            EdgeSide::Right => e.start,
            _ => e.end,
        })
    }

    // the vertex a loop traversal of (edge, side) starts at
    fn traversal_tail(&self, edge: EdgeId, side: EdgeSide) -> Result<Option<VertexId>> {
        let e = self.edge(edge)?;
        Ok(match side {
            EdgeSide::Right => e.end,
            _ => e.start,
        })
    }

    // ---------------------------------------------------------------- //
    // deletion

    /// Deletes an entity: severs all relations, removes exclusively owned
    /// children, and frees shared children that become unreferenced.
    /// Deleting an entity still needed by a peer fails with
    /// `DeleteWillCorruptModel` and leaves the thing untouched.
    pub fn delete_entity(&mut self, id: EntityId) -> Result<()> {
        let kind = self.kind_of(id).ok_or(Error::UnknownEntityId(id))?;
        match kind {
            EntityKind::Body => self.delete_body(BodyId(id)),
            EntityKind::Volume => self.delete_volume(VolumeId(id)),
            EntityKind::Face => self.delete_face(FaceId(id)),
            EntityKind::Edge => {
                let e = self.edge(EdgeId(id))?;
                if !e.faces.is_empty() {
                    return Err(Error::DeleteWillCorruptModel(id));
                }
                self.delete_edge(EdgeId(id))
            }
            EntityKind::Vertex => {
                let v = self.vertex(VertexId(id))?;
                if !v.edges.is_empty() {
                    return Err(Error::DeleteWillCorruptModel(id));
                }
                self.entities.remove(&id);
                Ok(())
            }
            EntityKind::Curve => {
                if !self.curve_entity(CurveId(id))?.owners.is_empty() {
                    return Err(Error::DeleteWillCorruptModel(id));
                }
                self.entities.remove(&id);
                Ok(())
            }
            EntityKind::Surface => {
                if !self.surface_entity(SurfaceId(id))?.owners.is_empty() {
                    return Err(Error::DeleteWillCorruptModel(id));
                }
                self.entities.remove(&id);
                Ok(())
            }
            EntityKind::Complex => {
                self.entities.remove(&id);
                Ok(())
            }
        }
    }

    fn delete_body(&mut self, body: BodyId) -> Result<()> {
        let volumes: Vec<VolumeId> = self.body(body)?.volumes.iter().copied().collect();
        for volume in volumes {
            self.delete_volume(volume)?;
        }
        self.entities.remove(&body.entity_id());
        Ok(())
    }

    fn delete_volume(&mut self, volume: VolumeId) -> Result<()> {
        let (faces, edges, body) = {
            let v = self.volume(volume)?;
            (
                v.faces.iter().copied().collect::<Vec<_>>(),
                v.edges.iter().copied().collect::<Vec<_>>(),
                v.body,
            )
        };
        for face in faces {
            self.delete_face(face)?;
        }
        for edge in edges {
            self.edge_mut(edge)?.volume = None;
            self.delete_edge(edge)?;
        }
        if let Some(body) = body {
            if let Ok(b) = self.body_mut(body) {
                b.volumes.remove(&volume);
                b.invalidate();
            }
        }
        self.entities.remove(&volume.entity_id());
        Ok(())
    }

    fn delete_face(&mut self, face: FaceId) -> Result<()> {
        let (edges, surface, volume) = {
            let f = self.face(face)?;
            (
                f.edges.keys().copied().collect::<Vec<_>>(),
                f.surface,
                f.volume,
            )
        };
        for edge in edges {
            let e = self.edge_mut(edge)?;
            e.faces.remove(&face);
            // the thing is the ultimate owner: free the edge once no face
            // refers to it and it is not a wire
            let orphaned = e.faces.is_empty() && e.volume.is_none();
            if orphaned {
                self.delete_edge(edge)?;
            }
        }
        if let Some(surface) = surface {
            let s = self.surface_entity_mut(surface)?;
            s.owners.remove(&face.entity_id());
            if s.owners.is_empty() {
                self.entities.remove(&surface.entity_id());
            }
        }
        if let Some(volume) = volume {
            if let Ok(v) = self.volume_mut(volume) {
                v.faces.remove(&face);
                v.invalidate();
            }
        }
        self.entities.remove(&face.entity_id());
        Ok(())
    }

    fn delete_edge(&mut self, edge: EdgeId) -> Result<()> {
        let (start, end, curve, volume) = {
            let e = self.edge(edge)?;
            (e.start, e.end, e.curve, e.volume)
        };
        let mut seen = None;
        for vertex in [start, end].into_iter().flatten() {
            if seen == Some(vertex) {
                continue;
            }
            seen = Some(vertex);
            let v = self.vertex_mut(vertex)?;
            v.edges.remove(&edge);
            if v.edges.is_empty() && v.owners.is_empty() {
                self.entities.remove(&vertex.entity_id());
            }
        }
        if let Some(curve) = curve {
            let c = self.curve_entity_mut(curve)?;
            c.owners.remove(&edge.entity_id());
            if c.owners.is_empty() {
                self.entities.remove(&curve.entity_id());
            }
        }
        if let Some(volume) = volume {
            if let Ok(v) = self.volume_mut(volume) {
                v.edges.remove(&edge);
                v.invalidate();
            }
        }
        self.entities.remove(&edge.entity_id());
        Ok(())
    }

    // ---------------------------------------------------------------- //
    // cloning

    /// Structural deep copy of the entity and everything it owns,
    /// downward. Internal references are remapped through an
    /// old-id-to-new-id table in a second pass; references to entities
    /// outside the copied set are dropped.
    pub fn clone_entity(&mut self, id: EntityId) -> Result<EntityId> {
        let mut set = BTreeSet::new();
        self.reachable(id, &mut set)?;
        let mut map: FxHashMap<EntityId, EntityId> = FxHashMap::default();
        let copies: Vec<(EntityId, Entity)> = set
            .iter()
            .map(|old| (*old, self.entities[old].clone()))
            .collect();
        for (old, entity) in copies {
            let new = self.insert(entity);
            map.insert(old, new);
        }
        for old in &set {
            let new = map[old];
            let mut entity = self.entities.remove(&new).ok_or_else(|| {
                Error::TopologyCorrupt(format!("lost clone of {old:?}"))
            })?;
            remap_entity(&mut entity, &map);
            self.entities.insert(new, entity);
        }
        Ok(map[&id])
    }

    fn reachable(&self, id: EntityId, set: &mut BTreeSet<EntityId>) -> Result<()> {
        if !set.insert(id) {
            return Ok(());
        }
        match self.entities.get(&id).ok_or(Error::UnknownEntityId(id))? {
            Entity::Body(b) => {
                for &v in &b.volumes {
                    self.reachable(v.entity_id(), set)?;
                }
            }
            Entity::Volume(v) => {
                for &f in &v.faces {
                    self.reachable(f.entity_id(), set)?;
                }
                for &e in &v.edges {
                    self.reachable(e.entity_id(), set)?;
                }
            }
            Entity::Face(f) => {
                if let Some(s) = f.surface {
                    self.reachable(s.entity_id(), set)?;
                }
                for &e in f.edges.keys() {
                    self.reachable(e.entity_id(), set)?;
                }
            }
            Entity::Edge(e) => {
                if let Some(c) = e.curve {
                    self.reachable(c.entity_id(), set)?;
                }
                for v in [e.start, e.end].into_iter().flatten() {
                    self.reachable(v.entity_id(), set)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ---------------------------------------------------------------- //
    // transform

    /// Transforms an entity and everything it owns. Geometry moves;
    /// boxes, trees, and tessellation caches drop.
    pub fn transform_entity(&mut self, id: EntityId, trans: &Transform3) -> Result<()> {
        let mut set = BTreeSet::new();
        self.reachable(id, &mut set)?;
        // line and hermite parameters are arc lengths and scale with the
        // geometry; find those edges before mutating anything
        let mut scaling_edges: BTreeSet<EntityId> = BTreeSet::new();
        for eid in &set {
            if let Some(Entity::Edge(e)) = self.entities.get(eid) {
                if let Some(curve) = e.curve {
                    if let Some(Entity::Curve(c)) = self.entities.get(&curve.entity_id()) {
                        if matches!(c.curve.kind(), CurveKind::Line | CurveKind::Hermite) {
                            scaling_edges.insert(*eid);
                        }
                    }
                }
            }
        }
        for eid in set {
            match self.entities.get_mut(&eid) {
                Some(Entity::Curve(c)) => c.curve.transform_by(trans),
                Some(Entity::Surface(s)) => s.surface.transform_by(trans),
                Some(Entity::Vertex(v)) => v.point = trans.transform_point(v.point),
                Some(Entity::Edge(e)) => {
                    if scaling_edges.contains(&eid) {
                        e.domain = Interval1D::new(
                            e.domain.min * trans.scale_factor(),
                            e.domain.max * trans.scale_factor(),
                        );
                    }
                    e.invalidate();
                }
                Some(Entity::Complex(c)) => {
                    c.points.iter_mut().for_each(|p| *p = trans.transform_point(*p));
                    c.invalidate();
                }
                Some(Entity::Body(b)) => {
                    b.points.iter_mut().for_each(|p| *p = trans.transform_point(*p));
                    b.invalidate();
                }
                Some(Entity::Volume(v)) => v.invalidate(),
                Some(Entity::Face(f)) => f.invalidate(),
                _ => {}
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------- //
    // checking

    /// Audits the ownership and back-pointer invariants of the whole
    /// thing; returns one message per violation.
    pub fn check(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (&id, entity) in &self.entities {
            match entity {
                Entity::Body(b) => {
                    for &v in &b.volumes {
                        match self.volume(v) {
                            Ok(vol) if vol.body != Some(BodyId(id)) => issues.push(format!(
                                "volume {v:?} of body {id:?} does not point back"
                            )),
                            Ok(_) => {}
                            Err(_) => issues
                                .push(format!("body {id:?} owns missing volume {v:?}")),
                        }
                    }
                }
                Entity::Volume(v) => {
                    for &f in &v.faces {
                        match self.face(f) {
                            Ok(face) if face.volume != Some(VolumeId(id)) => issues.push(
                                format!("face {f:?} of volume {id:?} does not point back"),
                            ),
                            Ok(_) => {}
                            Err(_) => {
                                issues.push(format!("volume {id:?} owns missing face {f:?}"))
                            }
                        }
                    }
                }
                Entity::Face(f) => {
                    if f.surface.is_none() {
                        issues.push(format!("face {id:?} has no surface"));
                    }
                    for &e in f.edges.keys() {
                        match self.edge(e) {
                            Ok(edge) if !edge.faces.contains(&FaceId(id)) => issues.push(
                                format!("edge {e:?} of face {id:?} does not point back"),
                            ),
                            Ok(_) => {}
                            Err(_) => {
                                issues.push(format!("face {id:?} owns missing edge {e:?}"))
                            }
                        }
                    }
                }
                Entity::Edge(e) => {
                    let Some(curve) = e.curve else {
                        issues.push(format!("edge {id:?} has no curve"));
                        continue;
                    };
                    let Ok(curve) = self.curve(curve) else {
                        issues.push(format!("edge {id:?} refers to missing curve"));
                        continue;
                    };
                    // endpoints must sit on the curve within tolerance
                    for (vertex, t) in [(e.start, e.domain.min), (e.end, e.domain.max)] {
                        if let Some(vertex) = vertex {
                            match self.vertex(vertex) {
                                Ok(v) => {
                                    let d = v.point().distance(curve.subs(t));
                                    if d > f64::max(e.tolerance, lathe_base::tolerance::TOLERANCE)
                                    {
                                        issues.push(format!(
                                            "vertex {vertex:?} of edge {id:?} is {d} off the curve"
                                        ));
                                    }
                                    if !v.edges.contains(&EdgeId(id)) {
                                        issues.push(format!(
                                            "vertex {vertex:?} of edge {id:?} does not point back"
                                        ));
                                    }
                                }
                                Err(_) => issues.push(format!(
                                    "edge {id:?} refers to missing vertex {vertex:?}"
                                )),
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        issues
    }
}

fn remap_set<T: Copy + Ord + From<EntityId> + Into<EntityId>>(
    set: &BTreeSet<T>,
    map: &FxHashMap<EntityId, EntityId>,
) -> BTreeSet<T> {
    set.iter()
        .filter_map(|&t| map.get(&t.into()).map(|&new| T::from(new)))
        .collect()
}

fn remap_opt<T: Copy + From<EntityId> + Into<EntityId>>(
    opt: Option<T>,
    map: &FxHashMap<EntityId, EntityId>,
) -> Option<T> {
    opt.and_then(|t| map.get(&t.into()).map(|&new| T::from(new)))
}

fn remap_entity(entity: &mut Entity, map: &FxHashMap<EntityId, EntityId>) {
    match entity {
        Entity::Body(b) => {
            b.volumes = remap_set(&b.volumes, map);
            b.owners = remap_set(&b.owners, map);
        }
        Entity::Volume(v) => {
            v.body = remap_opt(v.body, map);
            v.faces = remap_set(&v.faces, map);
            v.edges = remap_set(&v.edges, map);
            v.owners = remap_set(&v.owners, map);
        }
        Entity::Face(f) => {
            f.volume = remap_opt(f.volume, map);
            f.surface = remap_opt(f.surface, map);
            f.edges = f
                .edges
                .iter()
                .filter_map(|(&e, &side)| {
                    map.get(&e.entity_id()).map(|&new| (EdgeId(new), side))
                })
                .collect();
            f.owners = remap_set(&f.owners, map);
        }
        Entity::Edge(e) => {
            e.curve = remap_opt(e.curve, map);
            e.start = remap_opt(e.start, map);
            e.end = remap_opt(e.end, map);
            e.volume = remap_opt(e.volume, map);
            e.faces = remap_set(&e.faces, map);
            e.owners = remap_set(&e.owners, map);
        }
        Entity::Vertex(v) => {
            v.edges = remap_set(&v.edges, map);
            v.owners = remap_set(&v.owners, map);
        }
        Entity::Complex(c) => {
            c.owners = remap_set(&c.owners, map);
        }
        Entity::Curve(c) => {
            c.owners = remap_set(&c.owners, map);
        }
        Entity::Surface(s) => {
            s.owners = remap_set(&s.owners, map);
        }
    }
}
