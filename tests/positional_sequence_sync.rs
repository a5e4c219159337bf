//! Position-tracked object sequence replication, end to end through the
//! `Point` element factory.

mod common;

use std::rc::Rc;

use common::{point_factory, points_of, set_point, Point};
use replica_sync::{
    obj_seq, Delta, FaultChannel, ReplicateMark, ReplicationError, Replicator, SlotSeqReplicator,
};

fn points(values: &[(i64, i64)]) -> replica_sync::ObjSeq {
    obj_seq(values.iter().map(|&(x, y)| Point::handle(x, y)))
}

#[test]
fn field_change_round_trips_through_one_slot_write() {
    let source = points(&[(1, 1), (2, 2)]);
    let mirror = points(&[(1, 1), (2, 2)]);
    let faults = FaultChannel::new();
    let mut source_rp =
        SlotSeqReplicator::new(source.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");
    let mut mirror_rp =
        SlotSeqReplicator::new(mirror.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");

    set_point(&source.borrow()[0], 9, 1);

    let delta = source_rp.gen_diff(0, 1).expect("field change");
    mirror_rp.apply_diff(&delta);

    assert_eq!(points_of(&mirror), points_of(&source));
    assert!(faults.is_empty());
}

#[test]
fn growth_resyncs_the_new_slot_in_full() {
    let source = points(&[(1, 1)]);
    let faults = FaultChannel::new();
    let mut source_rp =
        SlotSeqReplicator::new(source.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");

    source.borrow_mut().push(Point::handle(2, 2));
    let delta = source_rp.gen_diff(0, 1).expect("growth");

    let mirror = points(&[(1, 1)]);
    let mut mirror_rp =
        SlotSeqReplicator::new(mirror.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");
    mirror_rp.apply_diff(&delta);
    assert_eq!(points_of(&mirror), vec![(1, 1), (2, 2)]);

    // A second observer at the same range is served from the shadow;
    // the new slot still arrives with its complete value.
    let replayed = source_rp.gen_diff(0, 1).expect("still in range");
    let late_mirror = points(&[(1, 1)]);
    let mut late_rp =
        SlotSeqReplicator::new(late_mirror.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");
    late_rp.apply_diff(&replayed);
    assert_eq!(points_of(&late_mirror), vec![(1, 1), (2, 2)]);

    assert!(faults.is_empty());
}

#[test]
fn shrink_truncates_the_mirror() {
    let source = points(&[(1, 1), (2, 2), (3, 3)]);
    let mirror = points(&[(1, 1), (2, 2), (3, 3)]);
    let faults = FaultChannel::new();
    let mut source_rp =
        SlotSeqReplicator::new(source.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");
    let mut mirror_rp =
        SlotSeqReplicator::new(mirror.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");

    source.borrow_mut().truncate(1);

    let delta = source_rp.gen_diff(0, 1).expect("length change");
    mirror_rp.apply_diff(&delta);

    assert_eq!(points_of(&mirror), vec![(1, 1)]);
    assert!(faults.is_empty());
}

#[test]
fn shrink_seen_first_by_a_caught_up_observer_still_truncates_the_shadow() {
    let source = points(&[(1, 1), (2, 2), (3, 3)]);
    let faults = FaultChannel::new();
    let mut source_rp =
        SlotSeqReplicator::new(source.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");

    // The first poll after the shrink comes from an observer that is
    // already at the target version, so it gets nothing back.
    source.borrow_mut().truncate(1);
    assert!(source_rp.gen_diff(1, 1).is_none());

    // A lagging observer served from the shadow must still see the
    // post-shrink length, not the stale one.
    let delta = source_rp.gen_diff(0, 1).expect("length change in range");
    assert!(matches!(delta, Delta::Slots { len: 1, .. }));

    let mirror = points(&[(1, 1), (2, 2), (3, 3)]);
    let mut mirror_rp =
        SlotSeqReplicator::new(mirror.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");
    mirror_rp.apply_diff(&delta);

    assert_eq!(points_of(&mirror), vec![(1, 1)]);
    assert!(faults.is_empty());
}

#[test]
fn out_of_band_slot_reassignment_rebinds_in_place() {
    let source = points(&[(1, 1), (2, 2)]);
    let mirror = points(&[(1, 1), (2, 2)]);
    let faults = FaultChannel::new();
    let mut source_rp =
        SlotSeqReplicator::new(source.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");
    let mut mirror_rp =
        SlotSeqReplicator::new(mirror.clone(), None, point_factory(), faults.clone())
            .expect("non-empty sequence");

    // Replace slot 0 with a different object, no structural operation.
    source.borrow_mut()[0] = Point::handle(9, 9);

    let delta = source_rp.gen_diff(0, 1).expect("slot reassignment");
    mirror_rp.apply_diff(&delta);

    assert_eq!(points_of(&mirror), vec![(9, 9), (2, 2)]);
    assert!(faults.is_empty());
}

#[test]
fn no_op_stability_once_caught_up() {
    let source = points(&[(1, 1)]);
    let mut source_rp =
        SlotSeqReplicator::new(source.clone(), None, point_factory(), FaultChannel::new())
            .expect("non-empty sequence");

    set_point(&source.borrow()[0], 5, 5);
    assert!(source_rp.gen_diff(0, 1).is_some());
    assert!(source_rp.gen_diff(1, 1).is_none());
    assert!(source_rp.gen_diff(1, 2).is_none());
}

#[test]
fn empty_sequence_without_a_constructor_is_rejected() {
    let source = points(&[]);
    let result = SlotSeqReplicator::new(source, None, point_factory(), FaultChannel::new());
    assert!(matches!(
        result.map(|_| ()),
        Err(ReplicationError::MissingConstructor)
    ));
}

#[test]
fn declared_constructor_allows_an_empty_start() {
    let source = points(&[]);
    let mark = ReplicateMark::new().with_ctor(Rc::new(|| Point::handle(0, 0)));
    let faults = FaultChannel::new();
    let mut source_rp =
        SlotSeqReplicator::new(source.clone(), Some(&mark), point_factory(), faults.clone())
            .expect("constructor declared");

    // Still empty: nothing to say.
    assert!(source_rp.gen_diff(0, 1).is_none());

    source.borrow_mut().push(Point::handle(4, 2));
    let delta = source_rp.gen_diff(1, 2).expect("growth");

    let mirror = points(&[]);
    let mut mirror_rp =
        SlotSeqReplicator::new(mirror.clone(), Some(&mark), point_factory(), faults.clone())
            .expect("constructor declared");
    mirror_rp.apply_diff(&delta);

    assert_eq!(points_of(&mirror), vec![(4, 2)]);
    assert!(faults.is_empty());
}
