use serde::{Deserialize, Serialize};

/// Process-unique entity id, assigned monotonically by the [`Thing`].
/// The id is the only cross-reference that survives cloning.
///
/// [`Thing`]: crate::Thing
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    /// the raw id value
    #[inline(always)]
    pub const fn as_u64(self) -> u64 { self.0 }
}

macro_rules! typed_id {
    ($(#[$doc: meta] $name: ident),* $(,)?) => {
        $(
            #[$doc]
            #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            pub struct $name(pub(crate) EntityId);

            impl $name {
                /// the untyped entity id
                #[inline(always)]
                pub const fn entity_id(self) -> EntityId { self.0 }
            }

            impl From<$name> for EntityId {
                #[inline(always)]
                fn from(id: $name) -> EntityId { id.0 }
            }

            impl From<EntityId> for $name {
                #[inline(always)]
                fn from(id: EntityId) -> $name { $name(id) }
            }
        )*
    };
}

typed_id!(
    /// id of a body
    BodyId,
    /// id of a volume
    VolumeId,
    /// id of a face
    FaceId,
    /// id of an edge
    EdgeId,
    /// id of a vertex
    VertexId,
    /// id of a complex
    ComplexId,
    /// id of a curve entity
    CurveId,
    /// id of a surface entity
    SurfaceId,
);
