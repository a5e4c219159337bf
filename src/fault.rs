use std::{cell::RefCell, rc::Rc};

use log::warn;

/// A structural-consistency violation detected during a delta cycle.
///
/// Faults mean the shadow fell out of sync with its live collection,
/// almost always because a caller mutated state outside the expected
/// protocol. They are diagnostics, not errors: the replicator keeps
/// going best-effort, and tests assert on the recorded faults instead
/// of parsing log output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Shadow sequence length disagrees with the live collection.
    LengthMismatch {
        strategy: &'static str,
        shadow_len: usize,
        live_len: usize,
    },
    /// The identity index and the shadow sequence are no longer a
    /// bijection at the given slot.
    IdentityDesync {
        strategy: &'static str,
        slot: usize,
    },
    /// A delta of the wrong shape was handed to `apply_diff`, or a
    /// command referenced an index outside the collection.
    MalformedDelta { strategy: &'static str },
    /// `rebind` was handed a binding of the wrong kind.
    BindingMismatch { strategy: &'static str },
    /// The element factory could not produce a child replicator for the
    /// element at the given slot.
    ChildDispatchFailed {
        strategy: &'static str,
        slot: usize,
    },
}

/// Shared recorder for [`Fault`]s.
///
/// Cloning is cheap and clones observe the same underlying buffer; a
/// source replicator and all of its nested children report into one
/// channel. Every report is also logged at `warn` level.
#[derive(Clone, Default)]
pub struct FaultChannel {
    faults: Rc<RefCell<Vec<Fault>>>,
}

impl FaultChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, fault: Fault) {
        warn!("replication fault: {:?}", fault);
        self.faults.borrow_mut().push(fault);
    }

    pub fn is_empty(&self) -> bool {
        self.faults.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.faults.borrow().len()
    }

    /// Take all recorded faults, leaving the channel empty.
    pub fn drain(&self) -> Vec<Fault> {
        std::mem::take(&mut *self.faults.borrow_mut())
    }
}
