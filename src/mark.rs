use crate::object::ObjCtor;

/// Declared strategy for a replicated object sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeqStrategy {
    /// Per-slot primitive values; no nested replicators, no identity.
    Scalar,
    /// Slots tracked by position only. Cheap, but unsuitable when
    /// elements are inserted, removed, or shuffled by identity.
    Positional,
    /// Elements tracked by identity across insertion, removal, and
    /// reordering, with a queryable history of structural operations.
    Linked,
}

/// Construction-time metadata for a replicated collection.
///
/// This is the slice of the annotation system the engine consumes: an
/// optional declared strategy, and an optional element constructor for
/// object sequences that may start out (or become) empty. When no
/// constructor is declared it is inferred from the first live element;
/// an empty initial collection with no declared constructor is rejected
/// at construction time.
#[derive(Clone, Default)]
pub struct ReplicateMark {
    strategy: Option<SeqStrategy>,
    ctor: Option<ObjCtor>,
}

impl ReplicateMark {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: SeqStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_ctor(mut self, ctor: ObjCtor) -> Self {
        self.ctor = Some(ctor);
        self
    }

    pub fn strategy(&self) -> Option<SeqStrategy> {
        self.strategy
    }

    pub fn ctor(&self) -> Option<ObjCtor> {
        self.ctor.clone()
    }
}
