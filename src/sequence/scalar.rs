use crate::{
    delta::Delta,
    fault::{Fault, FaultChannel},
    replicator::{Binding, Replicator},
    types::{ScalarSeq, Version},
    value::Scalar,
};

const STRATEGY: &str = "ScalarSeq";

struct ScalarSlot {
    version: Version,
    value: Scalar,
}

/// Replicates a sequence of primitive values.
///
/// The shadow holds one `(version, value)` slot per live index. A scan
/// runs at most once per version; observers that ask again for an
/// already-scanned version are answered from the shadow alone, without
/// re-reading the live sequence. An observer lagging at `from` receives
/// every slot whose last change falls inside `(from, to]`, plus the
/// current length so the mirror can truncate or extend.
pub struct ScalarSeqReplicator {
    target: ScalarSeq,
    shadow: Vec<ScalarSlot>,
    last_version: Version,
    last_scan_version: Version,
    last_length_version: Version,
    faults: FaultChannel,
}

impl ScalarSeqReplicator {
    pub fn new(target: ScalarSeq, faults: FaultChannel) -> Self {
        let shadow = target
            .borrow()
            .iter()
            .map(|value| ScalarSlot {
                version: 0,
                value: value.clone(),
            })
            .collect();
        Self {
            target,
            shadow,
            last_version: 0,
            last_scan_version: 0,
            last_length_version: 0,
            faults,
        }
    }

    /// Walk the live sequence once, refreshing the shadow and collecting
    /// every slot that changed, plus slots an observer at `from` has not
    /// seen yet.
    fn scan(&mut self, from: Version, to: Version) -> Option<Delta> {
        let live = self.target.borrow();
        let mut writes = Vec::new();

        if self.shadow.len() != live.len() {
            self.last_length_version = to;
        }
        self.shadow.truncate(live.len());

        for (i, value) in live.iter().enumerate() {
            if self.shadow.len() <= i {
                self.shadow.push(ScalarSlot {
                    version: to,
                    value: value.clone(),
                });
                writes.push((i, value.clone()));
            } else if self.shadow[i].value != *value {
                self.shadow[i].version = to;
                self.shadow[i].value = value.clone();
                writes.push((i, value.clone()));
            } else if self.shadow[i].version > from && self.shadow[i].version <= to {
                writes.push((i, value.clone()));
            }
        }
        self.last_scan_version = to;

        if writes.is_empty() && self.last_length_version <= from {
            return None;
        }
        self.last_version = to;
        Some(Delta::Scalars {
            len: live.len(),
            writes,
        })
    }

    /// Answer from the shadow alone: slots whose last change falls in
    /// range. Used when the target was already scanned at `to`.
    fn filter(&self, from: Version, to: Version) -> Option<Delta> {
        let mut writes = Vec::new();
        for (i, slot) in self.shadow.iter().enumerate() {
            if slot.version > from && slot.version <= to {
                writes.push((i, slot.value.clone()));
            }
        }
        if writes.is_empty() && self.last_length_version <= from {
            return None;
        }
        Some(Delta::Scalars {
            len: self.shadow.len(),
            writes,
        })
    }
}

impl Replicator for ScalarSeqReplicator {
    fn binding(&self) -> Binding {
        Binding::Scalars(self.target.clone())
    }

    fn rebind(&mut self, binding: Binding) {
        match binding {
            Binding::Scalars(seq) => self.target = seq,
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
            self.scan(from, to)
        } else {
            self.filter(from, to)
        }
    }

    fn apply_diff(&mut self, delta: &Delta) {
        let Delta::Scalars { len, writes } = delta else {
            self.faults.report(Fault::MalformedDelta { strategy: STRATEGY });
            return;
        };
        let mut live = self.target.borrow_mut();
        live.truncate(*len);
        for (index, value) in writes {
            if *index < live.len() {
                live[*index] = value.clone();
            } else {
                live.push(value.clone());
            }
        }
    }

    fn version(&self) -> Version {
        self.last_version
    }
}
