use crate::ids::EntityId;
use thiserror::Error;

/// Error handler for [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Topological errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// No entity carries the given id.
    #[error("no entity with id {0:?}")]
    UnknownEntityId(EntityId),
    /// The entity with the given id is of another kind than expected.
    #[error("entity {0:?} is not of the expected kind")]
    WrongEntityKind(EntityId),
    /// Removing the entity would leave a peer with a dangling reference.
    #[error("deleting entity {0:?} would corrupt the model")]
    DeleteWillCorruptModel(EntityId),
    /// A query found a broken ownership or back-pointer invariant.
    #[error("topology corrupt: {0}")]
    TopologyCorrupt(String),
}
