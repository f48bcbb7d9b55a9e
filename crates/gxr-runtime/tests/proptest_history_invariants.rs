//! Property tests for the undo/redo history.
//!
//! 1. **Inverse law**: after any sequence of commits, undos and redos,
//!    `undo(live)` returning `s` followed by `redo(s)` returns `live`.
//! 2. **Commit clears redo**: the redo stack is empty after every commit.
//! 3. **Bound**: neither stack ever exceeds `max_depth`.
//! 4. **Eviction order**: committing N > 20 snapshots keeps exactly the
//!    newest 20, in order.
//! 5. **Dirty state survives**: undoing an uncommitted live state and
//!    redoing brings it back.

use gxr_runtime::undo::{HistoryConfig, HistoryManager, MAX_HISTORY};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Commit(u16),
    Undo,
    Redo,
    /// Change the live state without committing.
    Edit(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u16>().prop_map(Op::Commit),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => any::<u16>().prop_map(Op::Edit),
    ]
}

/// Drive `history` through `ops`, tracking the caller's live state the way
/// the editor does. Returns the final live state.
fn run(history: &mut HistoryManager<u16>, ops: &[Op]) -> Result<u16, TestCaseError> {
    let mut live = 0u16;
    history.commit(live);
    for op in ops {
        match *op {
            Op::Commit(v) => {
                live = v;
                history.commit(v);
                prop_assert_eq!(history.redo_depth(), 0);
            }
            Op::Undo => {
                if let Some(s) = history.undo(&live) {
                    live = s;
                }
            }
            Op::Redo => {
                if let Some(s) = history.redo(&live) {
                    live = s;
                }
            }
            Op::Edit(v) => live = v,
        }
        let max = history.config().max_depth;
        prop_assert!(history.undo_depth() <= max);
        prop_assert!(history.redo_depth() <= max);
    }
    Ok(live)
}

proptest! {
    #[test]
    fn undo_then_redo_restores_live(
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        let mut history = HistoryManager::default();
        let live = run(&mut history, &ops)?;
        if let Some(previous) = history.undo(&live) {
            let restored = history.redo(&previous);
            prop_assert_eq!(restored, Some(live));
        }
    }

    #[test]
    fn bound_holds_with_small_depth(
        depth in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        let mut history = HistoryManager::new(HistoryConfig::new(depth));
        run(&mut history, &ops)?;
        prop_assert!(history.undo_depth() <= depth);
    }

    #[test]
    fn overflow_keeps_newest_in_order(n in (MAX_HISTORY + 1)..200usize) {
        let mut history = HistoryManager::default();
        for i in 0..n {
            history.commit(i);
        }
        let kept: Vec<usize> = history.undo_snapshots().copied().collect();
        let expected: Vec<usize> = (n - MAX_HISTORY..n).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn dirty_live_state_round_trips(
        committed in prop::collection::vec(any::<u16>(), 1..10),
        dirty in any::<u16>(),
    ) {
        let mut history = HistoryManager::default();
        for v in &committed {
            history.commit(*v);
        }
        let newest = *committed.last().unwrap_or(&0);
        prop_assume!(dirty != newest);
        prop_assert_eq!(history.undo(&dirty), Some(newest));
        prop_assert_eq!(history.redo(&newest), Some(dirty));
    }
}

#[test]
fn committing_25_leaves_last_20() {
    let mut history = HistoryManager::default();
    for i in 0..25u32 {
        history.commit(i);
    }
    assert_eq!(history.undo_depth(), 20);
    let kept: Vec<u32> = history.undo_snapshots().copied().collect();
    assert_eq!(kept, (5..25).collect::<Vec<_>>());
}
