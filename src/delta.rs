use crate::value::Scalar;

/// One structural operation on an identity-tracked sequence.
///
/// Commands always appear in a fixed order inside a single log entry:
/// `Delete`, then `Insert`, then `Move`. A trailing `Update` carries the
/// per-slot nested deltas, and `Clear` only ever appears alone.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Splice a fresh default-initialized element in at each index, in
    /// the order given (indices are ascending final positions).
    Insert(Vec<usize>),
    /// Remove the element at each index, in the order given (indices
    /// are descending pre-command positions, so earlier removals never
    /// shift later ones).
    Delete(Vec<usize>),
    /// Pairwise swaps `(from, to)`, applied one after another in the
    /// order emitted. The generating side performs the same swaps on its
    /// own shadow as it emits them, so sequential replay reproduces the
    /// permutation exactly.
    Move(Vec<(usize, usize)>),
    /// Per-slot nested deltas, addressed by post-structural slot index.
    Update(Vec<(usize, Delta)>),
    /// Nuclear reset: the sequence became empty. Supersedes and discards
    /// all prior structural history.
    Clear,
}

/// A self-describing delta produced by [`Replicator::gen_diff`].
///
/// "No change" is not a `Delta`: `gen_diff` returns `Option<Delta>` and
/// `None` is the sentinel, so an empty-but-meaningful delta can never be
/// confused with no update at all.
///
/// [`Replicator::gen_diff`]: crate::Replicator::gen_diff
#[derive(Clone, Debug, PartialEq)]
pub enum Delta {
    /// Sparse writes to a scalar sequence: post-change length plus
    /// `(index, value)` pairs.
    Scalars {
        len: usize,
        writes: Vec<(usize, Scalar)>,
    },
    /// Sparse writes to a position-tracked object sequence: post-change
    /// length plus `(index, child delta)` pairs.
    Slots {
        len: usize,
        writes: Vec<(usize, Delta)>,
    },
    /// Ordered command replay for an identity-tracked sequence.
    Commands(Vec<Command>),
    /// Leaf shape for single-value child replicators.
    Value(Scalar),
}
