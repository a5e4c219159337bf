use std::rc::Rc;

use crate::{
    error::DispatchError,
    fault::FaultChannel,
    mark::{ReplicateMark, SeqStrategy},
    replicator::{Binding, Replicator},
    sequence::{LinkedSeqReplicator, ScalarSeqReplicator, SlotSeqReplicator},
};

/// The dispatch contract: given a bound value and optional metadata,
/// produce a strategy instance satisfying [`Replicator`], or an explicit
/// "unsupported" signal. The engine never inspects a factory's internal
/// rules beyond receiving a valid instance or an error.
///
/// Sequence strategies use the factory they were built with to create
/// child replicators for their elements, handing down the fault channel
/// so that nested faults surface in one place.
pub trait ReplicatorFactory {
    fn replicator_for(
        &self,
        binding: Binding,
        mark: Option<&ReplicateMark>,
        faults: &FaultChannel,
    ) -> Result<Box<dyn Replicator>, DispatchError>;
}

/// Thin routing layer over the built-in sequence strategies.
///
/// Scalar sequences always take the scalar strategy. Object sequences
/// route on the declared [`SeqStrategy`], defaulting to positional when
/// the mark declares none. Element-level (`Binding::Object`) requests
/// are delegated to the application-supplied factory, which is where
/// the field-scanner, trigger, and engine-type adapters plug in.
pub struct SequenceDispatcher {
    element_factory: Rc<dyn ReplicatorFactory>,
}

impl SequenceDispatcher {
    pub fn new(element_factory: Rc<dyn ReplicatorFactory>) -> Self {
        Self { element_factory }
    }
}

impl ReplicatorFactory for SequenceDispatcher {
    fn replicator_for(
        &self,
        binding: Binding,
        mark: Option<&ReplicateMark>,
        faults: &FaultChannel,
    ) -> Result<Box<dyn Replicator>, DispatchError> {
        let declared = mark.and_then(|m| m.strategy());
        match binding {
            Binding::Scalars(seq) => match declared {
                None | Some(SeqStrategy::Scalar) => {
                    Ok(Box::new(ScalarSeqReplicator::new(seq, faults.clone())))
                }
                Some(_) => Err(DispatchError::Unsupported {
                    shape: "a scalar sequence marked with an object strategy",
                }),
            },
            Binding::Objects(seq) => match declared.unwrap_or(SeqStrategy::Positional) {
                SeqStrategy::Scalar => Err(DispatchError::Unsupported {
                    shape: "an object sequence marked with the scalar strategy",
                }),
                SeqStrategy::Positional => Ok(Box::new(SlotSeqReplicator::new(
                    seq,
                    mark,
                    self.element_factory.clone(),
                    faults.clone(),
                )?)),
                SeqStrategy::Linked => Ok(Box::new(LinkedSeqReplicator::new(
                    seq,
                    mark,
                    self.element_factory.clone(),
                    faults.clone(),
                )?)),
            },
            Binding::Object(_) => self.element_factory.replicator_for(binding, mark, faults),
        }
    }
}
