//! # Replica Sync
//! Incremental, version-stamped delta replication for real-time
//! simulation state.
//!
//! One authoritative **source** replicator is bound to a live collection
//! that application code mutates directly. Any number of independently
//! paced **mirrors** catch up from their own last-acknowledged version:
//! each poll asks the source for a delta covering `(from, to]`, and the
//! source answers from its cached shadow and action log instead of
//! rescanning or resending history it has already condensed.
//!
//! ```
//! use replica_sync::{scalar_seq, FaultChannel, Replicator, Scalar, ScalarSeqReplicator};
//!
//! let source = scalar_seq([Scalar::Int(1), Scalar::Int(2)]);
//! let mirror = scalar_seq([Scalar::Int(1), Scalar::Int(2)]);
//! let mut source_rp = ScalarSeqReplicator::new(source.clone(), FaultChannel::new());
//! let mut mirror_rp = ScalarSeqReplicator::new(mirror.clone(), FaultChannel::new());
//!
//! source.borrow_mut().push(Scalar::Int(3));
//!
//! let delta = source_rp.gen_diff(0, 1).expect("a change happened");
//! mirror_rp.apply_diff(&delta);
//! assert_eq!(*source.borrow(), *mirror.borrow());
//! ```
//!
//! Everything is synchronous and single-threaded; versions are supplied
//! by the caller and only ever recorded, never generated here.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod delta;
mod dispatch;
mod error;
mod fault;
mod mark;
mod object;
mod replicator;
mod sequence;
mod types;
mod value;

pub use delta::{Command, Delta};
pub use dispatch::{ReplicatorFactory, SequenceDispatcher};
pub use error::{DispatchError, ReplicationError};
pub use fault::{Fault, FaultChannel};
pub use mark::{ReplicateMark, SeqStrategy};
pub use object::{ObjCtor, ObjHandle, ObjId, Replicated};
pub use replicator::{Binding, Replicator};
pub use sequence::{
    ActionLog, LinkedSeqReplicator, LogEntry, ScalarSeqReplicator, SlotSeqReplicator,
};
pub use types::{obj_seq, scalar_seq, ObjSeq, ScalarSeq, Version, FULL_RESYNC};
pub use value::Scalar;
