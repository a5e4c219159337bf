//! Sequence replication strategies.
//!
//! Three strategies cover the shapes a replicated collection can take:
//!
//! * [`ScalarSeqReplicator`] — sequences of primitive values; a plain
//!   per-slot value+version shadow, no nested replicators.
//! * [`SlotSeqReplicator`] — sequences of replicable objects where only
//!   *position* matters; each slot delegates diffing to a child
//!   replicator bound to whatever object currently occupies it.
//! * [`LinkedSeqReplicator`] — sequences where objects are tracked by
//!   *identity* across insertion, removal, and reordering, backed by a
//!   durable, range-queryable [`ActionLog`].

mod action_log;
mod linked;
mod positional;
mod scalar;

pub use action_log::{ActionLog, LogEntry};
pub use linked::LinkedSeqReplicator;
pub use positional::SlotSeqReplicator;
pub use scalar::ScalarSeqReplicator;

use std::rc::Rc;

use crate::{
    error::ReplicationError,
    mark::ReplicateMark,
    object::ObjCtor,
    types::ObjSeq,
};

/// Resolve the element constructor for an object sequence: an explicit
/// mark wins, otherwise the first live element serves as a prototype.
pub(crate) fn resolve_ctor(
    target: &ObjSeq,
    mark: Option<&ReplicateMark>,
) -> Result<ObjCtor, ReplicationError> {
    if let Some(ctor) = mark.and_then(|m| m.ctor()) {
        return Ok(ctor);
    }
    let live = target.borrow();
    match live.first() {
        Some(first) => {
            let proto = first.clone();
            Ok(Rc::new(move || proto.fresh()))
        }
        None => Err(ReplicationError::MissingConstructor),
    }
}
