use std::rc::Rc;

use crate::{
    delta::Delta,
    dispatch::ReplicatorFactory,
    error::ReplicationError,
    fault::{Fault, FaultChannel},
    mark::ReplicateMark,
    object::{ObjCtor, ObjHandle, ObjId},
    replicator::{Binding, Replicator},
    sequence::resolve_ctor,
    types::{ObjSeq, Version, FULL_RESYNC},
};

const STRATEGY: &str = "SlotSeq";

struct SlotEntry {
    /// Version at which this slot was created. Observers behind this
    /// version get a full resync of the slot instead of an increment.
    version: Version,
    child: Box<dyn Replicator>,
}

impl SlotEntry {
    fn bound_id(&self) -> Option<ObjId> {
        match self.child.binding() {
            Binding::Object(handle) => Some(handle.id()),
            _ => None,
        }
    }
}

/// Replicates a sequence of objects where only *position* matters.
///
/// Each shadow slot wraps a child replicator bound to whatever object
/// currently occupies that position. When an outside actor reassigns a
/// slot to a different object without any structural operation, the
/// child is rebound in place: its accumulated shadow state survives,
/// and the next scan emits whatever differs between that state and the
/// replacement object.
///
/// Elements are never tracked across slots: a collection whose elements
/// are inserted, removed, or shuffled by identity belongs to
/// [`LinkedSeqReplicator`](crate::LinkedSeqReplicator) instead.
pub struct SlotSeqReplicator {
    target: ObjSeq,
    shadow: Vec<SlotEntry>,
    ctor: ObjCtor,
    factory: Rc<dyn ReplicatorFactory>,
    faults: FaultChannel,
    last_version: Version,
    last_scan_version: Version,
    last_length_version: Version,
}

impl SlotSeqReplicator {
    pub fn new(
        target: ObjSeq,
        mark: Option<&ReplicateMark>,
        factory: Rc<dyn ReplicatorFactory>,
        faults: FaultChannel,
    ) -> Result<Self, ReplicationError> {
        let ctor = resolve_ctor(&target, mark)?;
        let mut replicator = Self {
            target: target.clone(),
            shadow: Vec::new(),
            ctor,
            factory,
            faults,
            last_version: 0,
            last_scan_version: 0,
            last_length_version: 0,
        };
        let live: Vec<ObjHandle> = target.borrow().clone();
        for (slot, elem) in live.iter().enumerate() {
            let child = replicator
                .make_child(elem, slot)
                .ok_or_else(|| ReplicationError::UnreplicableElement {
                    slot,
                    reason: "element factory returned no replicator".to_string(),
                })?;
            replicator.shadow.push(SlotEntry { version: 0, child });
        }
        Ok(replicator)
    }

    fn make_child(&self, elem: &ObjHandle, slot: usize) -> Option<Box<dyn Replicator>> {
        match self
            .factory
            .replicator_for(Binding::Object(elem.clone()), None, &self.faults)
        {
            Ok(child) => Some(child),
            Err(_) => {
                self.faults.report(Fault::ChildDispatchFailed {
                    strategy: STRATEGY,
                    slot,
                });
                None
            }
        }
    }

    fn scan(&mut self, from: Version, to: Version) -> (usize, Vec<(usize, Delta)>) {
        let live: Vec<ObjHandle> = self.target.borrow().clone();
        let mut writes = Vec::new();

        if self.shadow.len() != live.len() {
            self.last_length_version = to;
        }
        self.shadow.truncate(live.len());

        for (i, elem) in live.iter().enumerate() {
            if self.shadow.len() <= i {
                let Some(mut child) = self.make_child(elem, i) else {
                    continue;
                };
                let delta = child.gen_diff(FULL_RESYNC, to);
                self.shadow.push(SlotEntry { version: to, child });
                if let Some(delta) = delta {
                    writes.push((i, delta));
                }
            } else {
                let entry = &mut self.shadow[i];
                if entry.bound_id() != Some(elem.id()) {
                    // Out-of-band slot reassignment: keep the child and
                    // its shadow, point it at the replacement.
                    entry.child.rebind(Binding::Object(elem.clone()));
                }
                let baseline = if entry.version > from { FULL_RESYNC } else { from };
                if let Some(delta) = entry.child.gen_diff(baseline, to) {
                    writes.push((i, delta));
                }
            }
        }
        self.last_scan_version = to;
        (live.len(), writes)
    }

    /// Answer a lagging observer from the shadow alone; the live
    /// sequence was already scanned at `to`.
    fn replay_shadow(&mut self, from: Version, to: Version) -> (usize, Vec<(usize, Delta)>) {
        let mut writes = Vec::new();
        for (i, entry) in self.shadow.iter_mut().enumerate() {
            let baseline = if entry.version > from { FULL_RESYNC } else { from };
            if let Some(delta) = entry.child.gen_diff(baseline, to) {
                writes.push((i, delta));
            }
        }
        (self.shadow.len(), writes)
    }
}

impl Replicator for SlotSeqReplicator {
    fn binding(&self) -> Binding {
        Binding::Objects(self.target.clone())
    }

    fn rebind(&mut self, binding: Binding) {
        match binding {
            Binding::Objects(seq) => self.target = seq,
            _ => self.faults.report(Fault::BindingMismatch { strategy: STRATEGY }),
        }
    }

    fn gen_diff(&mut self, from: Version, to: Version) -> Option<Delta> {
        if to < from {
            return None;
        }
        if self.target.borrow().is_empty() && self.shadow.is_empty() {
            return None;
        }
        let need_scan = self.last_scan_version < to;
        if !need_scan && from > self.last_version {
            return None;
        }

        let (len, writes) = if need_scan {
            self.scan(from, to)
        } else {
            self.replay_shadow(from, to)
        };

        if writes.is_empty() && self.last_length_version <= from {
            return None;
        }
        self.last_version = to;
        Some(Delta::Slots { len, writes })
    }

    fn apply_diff(&mut self, delta: &Delta) {
        let Delta::Slots { len, writes } = delta else {
            self.faults.report(Fault::MalformedDelta { strategy: STRATEGY });
            return;
        };
        {
            let mut live = self.target.borrow_mut();
            live.truncate(*len);
            self.shadow.truncate(*len);

            for (index, child_delta) in writes {
                if *index > live.len() {
                    self.faults.report(Fault::MalformedDelta { strategy: STRATEGY });
                    continue;
                }
                if *index == live.len() {
                    let elem = (self.ctor)();
                    live.push(elem.clone());
                    if let Some(child) = self.make_child(&elem, *index) {
                        self.shadow.push(SlotEntry {
                            version: self.last_version,
                            child,
                        });
                    }
                }
                if let Some(entry) = self.shadow.get_mut(*index) {
                    entry.child.apply_diff(child_delta);
                }
            }

            // Trailing slots the delta grew but carried no writes for
            // still need default elements, so lengths stay in step.
            while live.len() < *len {
                let elem = (self.ctor)();
                live.push(elem.clone());
                if let Some(child) = self.make_child(&elem, live.len() - 1) {
                    self.shadow.push(SlotEntry {
                        version: self.last_version,
                        child,
                    });
                }
            }
        }
        if self.target.borrow().len() != self.shadow.len() {
            self.faults.report(Fault::LengthMismatch {
                strategy: STRATEGY,
                shadow_len: self.shadow.len(),
                live_len: self.target.borrow().len(),
            });
        }
    }

    fn version(&self) -> Version {
        self.last_version
    }
}
