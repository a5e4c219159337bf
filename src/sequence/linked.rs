//! Identity-tracked sequence replication.
//!
//! The hardest collection shape: elements keep their identity while the
//! application inserts, removes, and shuffles them, and every observer
//! may be behind by a different amount. Three pieces of state make that
//! work:
//!
//! * a **shadow sequence** mirroring the live layout slot for slot, each
//!   entry owning the child replicator for its element;
//! * an **identity index** mapping element identity to its current slot,
//!   a bijection with the shadow after every cycle;
//! * an **action log** of structural commands, append-only and ordered
//!   by version, so a delta for any historical range is a binary search
//!   plus a replay — the source never resends history it has already
//!   condensed, except for `Clear`, which subsumes everything.
//!
//! Reconciliation applies deletions first (descending, so earlier
//! removals never shift later ones), then insertions (ascending final
//! positions), then repairs residual order drift by following the
//! permutation's cycles and emitting one swap per step — `len − cycles`
//! swaps in total, the minimum decomposition into transpositions.

use std::{collections::HashMap, rc::Rc};

use crate::{
    delta::{Command, Delta},
    dispatch::ReplicatorFactory,
    error::ReplicationError,
    fault::{Fault, FaultChannel},
    mark::ReplicateMark,
    object::{ObjCtor, ObjHandle, ObjId},
    replicator::{Binding, Replicator},
    sequence::{action_log::ActionLog, resolve_ctor},
    types::{ObjSeq, Version, FULL_RESYNC},
};

const STRATEGY: &str = "LinkedSeq";

struct LinkEntry {
    /// Version at which this entry was created. Observers behind this
    /// version receive the element's complete value, not an increment.
    version: Version,
    /// The live element this entry mirrors. Identity, not a value copy.
    elem: ObjHandle,
    child: Box<dyn Replicator>,
}

/// Replicates a sequence of objects tracked by identity.
pub struct LinkedSeqReplicator {
    target: ObjSeq,
    shadow: Vec<LinkEntry>,
    /// Element identity -> current slot. Kept exactly in sync with the
    /// shadow after every reconciliation.
    index: HashMap<ObjId, usize>,
    log: ActionLog,
    ctor: ObjCtor,
    factory: Rc<dyn ReplicatorFactory>,
    faults: FaultChannel,
    last_version: Version,
    last_scan_version: Version,
}

impl LinkedSeqReplicator {
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
            index: HashMap::new(),
            log: ActionLog::new(),
            ctor,
            factory,
            faults,
            last_version: 0,
            last_scan_version: 0,
        };
        let live: Vec<ObjHandle> = target.borrow().clone();
        for (slot, elem) in live.iter().enumerate() {
            let child = replicator
                .make_child(elem, slot)
                .ok_or_else(|| ReplicationError::UnreplicableElement {
                    slot,
                    reason: "element factory returned no replicator".to_string(),
                })?;
            replicator.shadow.push(LinkEntry {
                version: 0,
                elem: elem.clone(),
                child,
            });
            replicator.index.insert(elem.id(), slot);
        }
        Ok(replicator)
    }

    /// Read-only view of the structural history, mostly for tests.
    pub fn action_log(&self) -> &ActionLog {
        &self.log
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

    /// Diff the live layout against the identity index and bring the
    /// shadow back in step, returning the structural commands that
    /// describe the transition. Consumes `self.index` and leaves the
    /// freshly rebuilt mapping in its place.
    fn reconcile(&mut self, to: Version) -> Vec<Command> {
        let live: Vec<ObjHandle> = self.target.borrow().clone();
        let mut commands = Vec::new();

        if live.is_empty() {
            if self.shadow.is_empty() {
                return commands;
            }
            self.shadow.clear();
            self.index.clear();
            commands.push(Command::Clear);
            return commands;
        }

        let mut new_index: HashMap<ObjId, usize> = HashMap::with_capacity(live.len());
        let mut inserts: Vec<usize> = Vec::new();
        for (i, elem) in live.iter().enumerate() {
            if self.index.remove(&elem.id()).is_none() {
                inserts.push(i);
            }
            new_index.insert(elem.id(), i);
        }

        // Identities left over in the old index vanished from the live
        // sequence; their old slots are the deletion set.
        let mut deletes: Vec<usize> = self.index.values().copied().collect();
        deletes.sort_unstable_by(|a, b| b.cmp(a));

        if !deletes.is_empty() {
            for &slot in &deletes {
                if slot < self.shadow.len() {
                    self.shadow.remove(slot);
                } else {
                    self.faults.report(Fault::IdentityDesync {
                        strategy: STRATEGY,
                        slot,
                    });
                }
            }
            commands.push(Command::Delete(deletes));
        }

        if !inserts.is_empty() {
            for &slot in &inserts {
                let elem = live[slot].clone();
                let Some(child) = self.make_child(&elem, slot) else {
                    continue;
                };
                let at = slot.min(self.shadow.len());
                if at != slot {
                    self.faults.report(Fault::IdentityDesync {
                        strategy: STRATEGY,
                        slot,
                    });
                }
                self.shadow.insert(
                    at,
                    LinkEntry {
                        version: to,
                        elem,
                        child,
                    },
                );
            }
            commands.push(Command::Insert(inserts.clone()));
        }

        if self.shadow.len() != live.len() {
            self.faults.report(Fault::LengthMismatch {
                strategy: STRATEGY,
                shadow_len: self.shadow.len(),
                live_len: live.len(),
            });
        }

        // Repair residual order drift: for each slot, swap until the
        // element that belongs there occupies it. Following the cycles
        // this way emits each transposition exactly once, and applying
        // the same swaps in the same order replays the permutation.
        let mut moves: Vec<(usize, usize)> = Vec::new();
        for i in 0..self.shadow.len() {
            loop {
                let Some(&want) = new_index.get(&self.shadow[i].elem.id()) else {
                    self.faults.report(Fault::IdentityDesync {
                        strategy: STRATEGY,
                        slot: i,
                    });
                    break;
                };
                if want == i {
                    break;
                }
                if want >= self.shadow.len() {
                    self.faults.report(Fault::IdentityDesync {
                        strategy: STRATEGY,
                        slot: i,
                    });
                    break;
                }
                moves.push((i, want));
                self.shadow.swap(i, want);
            }
        }
        if !moves.is_empty() {
            commands.push(Command::Move(moves));
        }

        self.index = new_index;
        commands
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (slot, entry) in self.shadow.iter().enumerate() {
            self.index.insert(entry.elem.id(), slot);
        }
    }

    /// Post-scan consistency check: shadow, live sequence, and identity
    /// index must agree slot for slot. Violations mean a caller mutated
    /// state outside the protocol; they are reported and survived.
    fn check_consistency(&self) {
        let live = self.target.borrow();
        if live.len() != self.shadow.len() {
            self.faults.report(Fault::LengthMismatch {
                strategy: STRATEGY,
                shadow_len: self.shadow.len(),
                live_len: live.len(),
            });
            return;
        }
        for (i, elem) in live.iter().enumerate() {
            let aligned = self.shadow[i].elem == *elem && self.index.get(&elem.id()) == Some(&i);
            if !aligned {
                self.faults.report(Fault::IdentityDesync {
                    strategy: STRATEGY,
                    slot: i,
                });
                return;
            }
        }
    }
}

impl Replicator for LinkedSeqReplicator {
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
        let need_scan = self.last_scan_version < to;
        if !need_scan && from > self.last_version {
            return None;
        }

        if need_scan {
            let actions = self.reconcile(to);
            self.last_scan_version = to;
            if let Some(first) = actions.first() {
                if *first == Command::Clear {
                    // A clear subsumes all prior structural history for
                    // any future range query.
                    self.log.reset_to_clear(to);
                    self.last_version = to;
                    return Some(Delta::Commands(vec![Command::Clear]));
                }
                self.log.append(to, actions);
            }
            self.check_consistency();
        }

        let mut commands = self.log.replay_since(from);

        let mut updates: Vec<(usize, Delta)> = Vec::new();
        for (i, entry) in self.shadow.iter_mut().enumerate() {
            let baseline = if entry.version > from { FULL_RESYNC } else { from };
            if let Some(delta) = entry.child.gen_diff(baseline, to) {
                updates.push((i, delta));
            }
        }
        if !updates.is_empty() {
            commands.push(Command::Update(updates));
        }

        if commands.is_empty() {
            return None;
        }
        self.last_version = to;
        Some(Delta::Commands(commands))
    }

    fn apply_diff(&mut self, delta: &Delta) {
        let Delta::Commands(commands) = delta else {
            self.faults.report(Fault::MalformedDelta { strategy: STRATEGY });
            return;
        };
        {
            let mut live = self.target.borrow_mut();
            for command in commands {
                match command {
                    Command::Insert(indices) => {
                        for &index in indices {
                            if index > live.len() || index > self.shadow.len() {
                                self.faults
                                    .report(Fault::MalformedDelta { strategy: STRATEGY });
                                continue;
                            }
                            let elem = (self.ctor)();
                            // Element and child go in together or not at
                            // all; a half-inserted slot would leave the
                            // shadow short of the live sequence.
                            let Some(child) = self.make_child(&elem, index) else {
                                continue;
                            };
                            live.insert(index, elem.clone());
                            self.shadow.insert(
                                index,
                                LinkEntry {
                                    version: self.last_version,
                                    elem,
                                    child,
                                },
                            );
                        }
                    }
                    Command::Delete(indices) => {
                        for &index in indices {
                            if index < live.len() && index < self.shadow.len() {
                                live.remove(index);
                                self.shadow.remove(index);
                            } else {
                                self.faults
                                    .report(Fault::MalformedDelta { strategy: STRATEGY });
                            }
                        }
                    }
                    Command::Move(pairs) => {
                        for &(a, b) in pairs {
                            let in_bounds = a < live.len()
                                && b < live.len()
                                && a < self.shadow.len()
                                && b < self.shadow.len();
                            if in_bounds {
                                live.swap(a, b);
                                self.shadow.swap(a, b);
                            } else {
                                self.faults
                                    .report(Fault::MalformedDelta { strategy: STRATEGY });
                            }
                        }
                    }
                    Command::Update(writes) => {
                        for (index, child_delta) in writes {
                            if let Some(entry) = self.shadow.get_mut(*index) {
                                entry.child.apply_diff(child_delta);
                            } else {
                                self.faults
                                    .report(Fault::MalformedDelta { strategy: STRATEGY });
                            }
                        }
                    }
                    Command::Clear => {
                        live.clear();
                        self.shadow.clear();
                    }
                }
            }
        }
        let live_len = self.target.borrow().len();
        if live_len != self.shadow.len() {
            self.faults.report(Fault::LengthMismatch {
                strategy: STRATEGY,
                shadow_len: self.shadow.len(),
                live_len,
            });
        }
        self.rebuild_index();
    }

    fn version(&self) -> Version {
        self.last_version
    }
}
