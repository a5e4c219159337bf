use crate::{
    delta::Delta,
    object::ObjHandle,
    types::{ObjSeq, ScalarSeq, Version},
};

/// A live value a replicator can bind to.
///
/// The variant is decided once at bind time; strategies never re-sniff
/// the shape of their target per call. `Object` is the element-level
/// binding handed to nested child replicators.
#[derive(Clone)]
pub enum Binding {
    Scalars(ScalarSeq),
    Objects(ObjSeq),
    Object(ObjHandle),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalars(_) => "scalar sequence",
            Self::Objects(_) => "object sequence",
            Self::Object(_) => "object",
        }
    }
}

/// The uniform protocol every replication strategy implements.
///
/// A source-side instance is bound to a live collection that application
/// code mutates directly between delta cycles; a mirror-side instance is
/// bound to an independently-owned copy and reconciled purely through
/// [`apply_diff`](Replicator::apply_diff). Everything is synchronous and
/// single-threaded; no operation suspends or blocks.
pub trait Replicator {
    /// The currently bound target, as a shared handle (never a copy).
    fn binding(&self) -> Binding;

    /// Rebind to a new target **without** resetting accumulated shadow
    /// state. Used when an enclosing replicator's slot now refers to a
    /// different live object at the same position. A binding of the
    /// wrong kind is reported on the fault channel and ignored.
    fn rebind(&mut self, binding: Binding);

    /// Produce a delta covering the half-open version range `(from, to]`,
    /// or `None` when nothing tracked changed in that range.
    ///
    /// `from == FULL_RESYNC` (-1) means "diff against nothing": the
    /// returned delta carries the complete current value. A range with
    /// `to < from` is invalid and yields `None`.
    ///
    /// Safe to call repeatedly with the same `to`: the target is scanned
    /// at most once per version, and later calls are answered from the
    /// cached shadow so that independent observers at different `from`
    /// versions each get their own delta from identical scan results.
    fn gen_diff(&mut self, from: Version, to: Version) -> Option<Delta>;

    /// Mutate the bound target in place to match `delta`. A malformed
    /// delta is a no-op (reported as a fault), never an error.
    fn apply_diff(&mut self, delta: &Delta);

    /// Highest `to` version this instance has produced a delta for.
    /// Applying deltas does not advance it.
    fn version(&self) -> Version;
}
