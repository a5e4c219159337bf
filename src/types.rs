use std::{cell::RefCell, rc::Rc};

use crate::{object::ObjHandle, value::Scalar};

/// Caller-supplied version stamp. The engine never generates versions;
/// it only records the versions it is handed. Versions must be
/// non-decreasing across `gen_diff` calls on the same source instance.
pub type Version = i64;

/// Sentinel `from` version meaning "diff against nothing": the generated
/// delta must carry the complete current value, not an increment.
pub const FULL_RESYNC: Version = -1;

/// A live sequence of primitive values, shared between the application
/// (which mutates it directly) and the replicator bound to it.
pub type ScalarSeq = Rc<RefCell<Vec<Scalar>>>;

/// A live sequence of replicated objects.
pub type ObjSeq = Rc<RefCell<Vec<ObjHandle>>>;

/// Convenience constructor for a shared scalar sequence.
pub fn scalar_seq<I: IntoIterator<Item = Scalar>>(values: I) -> ScalarSeq {
    Rc::new(RefCell::new(values.into_iter().collect()))
}

/// Convenience constructor for a shared object sequence.
pub fn obj_seq<I: IntoIterator<Item = ObjHandle>>(values: I) -> ObjSeq {
    Rc::new(RefCell::new(values.into_iter().collect()))
}
