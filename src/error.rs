use thiserror::Error;

/// Errors that can occur constructing or binding a replicator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// An object-sequence replicator over an empty collection has no way
    /// to infer how elements are built
    #[error("Cannot replicate an empty object sequence without a declared constructor. Supply one via `ReplicateMark::with_ctor()`, or bind to a non-empty collection")]
    MissingConstructor,

    /// The element factory refused an element present at construction
    #[error("Element at slot {slot} cannot be replicated: {reason}")]
    UnreplicableElement { slot: usize, reason: String },
}

/// Errors produced by the factory dispatch contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The factory has no replication strategy for this value shape
    #[error("No replication strategy available for {shape}")]
    Unsupported { shape: &'static str },

    /// A strategy was selected but its constructor rejected the target
    #[error(transparent)]
    Construction(#[from] ReplicationError),
}
