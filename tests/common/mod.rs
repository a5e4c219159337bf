//! Shared scaffolding for integration tests: a minimal replicable
//! element type (`Point`), the single-object replicator the engine
//! would normally get from the field-scanner subsystem, and the element
//! factory that hands those out.
#![allow(dead_code)]

use std::any::Any;
use std::rc::Rc;

use replica_sync::{
    Binding, Delta, DispatchError, Fault, FaultChannel, ObjHandle, ObjSeq, Replicated, Replicator,
    ReplicatorFactory, ReplicateMark, Scalar, Version,
};

#[derive(Debug, Default, PartialEq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn handle(x: i64, y: i64) -> ObjHandle {
        ObjHandle::from_value(Point { x, y })
    }
}

impl Replicated for Point {
    fn fresh(&self) -> ObjHandle {
        ObjHandle::from_value(Point::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn set_point(handle: &ObjHandle, x: i64, y: i64) {
    let mut point = handle.borrow_mut_as::<Point>().expect("not a Point");
    point.x = x;
    point.y = y;
}

pub fn points_of(seq: &ObjSeq) -> Vec<(i64, i64)> {
    seq.borrow()
        .iter()
        .map(|handle| {
            let point = handle.borrow_as::<Point>().expect("not a Point");
            (point.x, point.y)
        })
        .collect()
}

/// Field indices used by the `Point` wire shape.
const FIELD_X: usize = 0;
const FIELD_Y: usize = 1;

/// What the reflection-driven field scanner would produce for `Point`:
/// a per-field value+version shadow over the two coordinates, emitting
/// sparse `(field, value)` writes.
pub struct PointReplicator {
    target: ObjHandle,
    shadow: [(Version, i64); 2],
    last_version: Version,
    last_scan_version: Version,
    faults: FaultChannel,
}

impl PointReplicator {
    pub fn new(target: ObjHandle, faults: FaultChannel) -> Self {
        let (x, y) = {
            let point = target.borrow_as::<Point>().expect("not a Point");
            (point.x, point.y)
        };
        Self {
            target,
            shadow: [(0, x), (0, y)],
            last_version: 0,
            last_scan_version: 0,
            faults,
        }
    }

    fn field_writes(&self, from: Version, to: Version) -> Vec<(usize, Scalar)> {
        self.shadow
            .iter()
            .enumerate()
            .filter(|(_, (version, _))| *version > from && *version <= to)
            .map(|(field, (_, value))| (field, Scalar::Int(*value)))
            .collect()
    }
}

impl Replicator for PointReplicator {
    fn binding(&self) -> Binding {
        Binding::Object(self.target.clone())
    }

    fn rebind(&mut self, binding: Binding) {
        match binding {
            Binding::Object(handle) => self.target = handle,
            _ => self.faults.report(Fault::BindingMismatch {
                strategy: "PointReplicator",
            }),
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
            let (x, y) = {
                let point = self.target.borrow_as::<Point>().expect("not a Point");
                (point.x, point.y)
            };
            for (slot, value) in [(FIELD_X, x), (FIELD_Y, y)] {
                if self.shadow[slot].1 != value {
                    self.shadow[slot] = (to, value);
                }
            }
            self.last_scan_version = to;
        }
        let writes = self.field_writes(from, to);
        if writes.is_empty() {
            return None;
        }
        self.last_version = to;
        Some(Delta::Scalars { len: 2, writes })
    }

    fn apply_diff(&mut self, delta: &Delta) {
        let Delta::Scalars { len: _, writes } = delta else {
            self.faults.report(Fault::MalformedDelta {
                strategy: "PointReplicator",
            });
            return;
        };
        let mut point = self.target.borrow_mut_as::<Point>().expect("not a Point");
        for (field, value) in writes {
            let Scalar::Int(value) = value else {
                self.faults.report(Fault::MalformedDelta {
                    strategy: "PointReplicator",
                });
                continue;
            };
            match *field {
                FIELD_X => point.x = *value,
                FIELD_Y => point.y = *value,
                _ => self.faults.report(Fault::MalformedDelta {
                    strategy: "PointReplicator",
                }),
            }
        }
    }

    fn version(&self) -> Version {
        self.last_version
    }
}

/// Element-level factory: replicates `Point`s, refuses everything else.
pub struct PointFactory;

impl ReplicatorFactory for PointFactory {
    fn replicator_for(
        &self,
        binding: Binding,
        _mark: Option<&ReplicateMark>,
        faults: &FaultChannel,
    ) -> Result<Box<dyn Replicator>, DispatchError> {
        match binding {
            Binding::Object(handle) => {
                if handle.borrow().as_any().is::<Point>() {
                    Ok(Box::new(PointReplicator::new(handle, faults.clone())))
                } else {
                    Err(DispatchError::Unsupported {
                        shape: "a non-Point element",
                    })
                }
            }
            other => Err(DispatchError::Unsupported { shape: other.kind() }),
        }
    }
}

pub fn point_factory() -> Rc<dyn ReplicatorFactory> {
    Rc::new(PointFactory)
}
