#![forbid(unsafe_code)]

//! Bounded undo/redo over edit snapshots.
//!
//! [`HistoryManager`] keeps two stacks of checkpoints. The manager never
//! applies a snapshot itself: the caller passes in its live state at
//! undo/redo time and applies whatever comes back.
//!
//! # Model
//!
//! `commit(s)` records `s`, the state *after* an edit, as the newest
//! checkpoint. The newest checkpoint therefore normally equals the live
//! state. When it does not, the live state has uncommitted changes (a
//! drag in progress, an unsettled slider) and undo first returns to the
//! newest checkpoint, parking the dirty state on the redo stack.
//!
//! ```text
//! commit(A) commit(B)
//! ┌──────────────────────────────┐
//! │ Undo Stack: [A, B]  live = B │
//! │ Redo Stack: []               │
//! └──────────────────────────────┘
//!
//! undo(B) -> A
//! ┌──────────────────────────────┐
//! │ Undo Stack: [A]     live = A │
//! │ Redo Stack: [B]              │
//! └──────────────────────────────┘
//!
//! redo(A) -> B
//! ┌──────────────────────────────┐
//! │ Undo Stack: [A, B]  live = B │
//! │ Redo Stack: []               │
//! └──────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `undo_stack.len() <= config.max_depth` and
//!    `redo_stack.len() <= config.max_depth` after any operation.
//! 2. The redo stack is empty immediately after `commit`.
//! 3. Overflow evicts the oldest checkpoint first.
//! 4. `undo(live)` returning `s`, followed by `redo(s)`, returns `live`.

use std::collections::VecDeque;
use std::fmt;

use gxr_core::EditSnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default maximum number of checkpoints.
pub const MAX_HISTORY: usize = 20;

/// Configuration for the history manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of checkpoints kept on each stack.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_HISTORY,
        }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Manager for undo/redo history.
pub struct HistoryManager<T = EditSnapshot> {
    /// Checkpoints available for undo (newest at back).
    undo_stack: VecDeque<T>,
    /// States available for redo (newest at back).
    redo_stack: VecDeque<T>,
    config: HistoryConfig,
}

impl<T> fmt::Debug for HistoryManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Clone + PartialEq> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<T: Clone + PartialEq> HistoryManager<T> {
    /// Create a new history manager with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
        }
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Record `snapshot` as the newest checkpoint and drop the redo branch.
    pub fn commit(&mut self, snapshot: T) {
        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot);
        enforce_depth(&mut self.undo_stack, self.config.max_depth);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = 0usize,
            "history commit"
        );
    }

    /// Step back from `live`. Returns the state to apply, or `None` when
    /// there is nothing older than `live`.
    pub fn undo(&mut self, live: &T) -> Option<T> {
        let newest = self.undo_stack.back()?;
        if newest == live {
            if self.undo_stack.len() < 2 {
                return None;
            }
            let current = self.undo_stack.pop_back()?;
            self.redo_stack.push_back(current);
        } else {
            // Uncommitted edits: return to the newest checkpoint first.
            self.redo_stack.push_back(live.clone());
        }
        enforce_depth(&mut self.redo_stack, self.config.max_depth);
        let target = self.undo_stack.back().cloned();
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "history undo"
        );
        target
    }

    /// Step forward from `live`. Returns the state to apply, or `None` when
    /// the redo stack is empty.
    pub fn redo(&mut self, live: &T) -> Option<T> {
        let next = self.redo_stack.pop_back()?;
        if self.undo_stack.back() != Some(live) {
            self.undo_stack.push_back(live.clone());
        }
        self.undo_stack.push_back(next.clone());
        enforce_depth(&mut self.undo_stack, self.config.max_depth);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "history redo"
        );
        Some(next)
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Whether [`undo`](Self::undo) would return a state for `live`.
    #[must_use]
    pub fn can_undo(&self, live: &T) -> bool {
        match self.undo_stack.back() {
            Some(newest) => newest != live || self.undo_stack.len() >= 2,
            None => false,
        }
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// The newest checkpoint.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.undo_stack.back()
    }

    /// Undo checkpoints, oldest first.
    pub fn undo_snapshots(&self) -> impl Iterator<Item = &T> {
        self.undo_stack.iter()
    }

    /// Redo states, next-to-redo first.
    pub fn redo_snapshots(&self) -> impl Iterator<Item = &T> {
        self.redo_stack.iter().rev()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Change the depth limit, evicting immediately if it shrank.
    pub fn set_config(&mut self, config: HistoryConfig) {
        self.config = config;
        enforce_depth(&mut self.undo_stack, self.config.max_depth);
        enforce_depth(&mut self.redo_stack, self.config.max_depth);
    }
}

/// Evict from the front (oldest) until `stack` fits in `max_depth`.
fn enforce_depth<T>(stack: &mut VecDeque<T>, max_depth: usize) {
    while stack.len() > max_depth {
        stack.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_manager() {
        let mgr = HistoryManager::<u32>::default();
        assert!(!mgr.can_undo(&0));
        assert!(!mgr.can_redo());
        assert_eq!(mgr.undo_depth(), 0);
        assert_eq!(mgr.config().max_depth, MAX_HISTORY);
    }

    #[test]
    fn test_commit_undo_redo_scenario() {
        let mut mgr = HistoryManager::default();
        mgr.commit('A');
        mgr.commit('B');
        assert_eq!(mgr.undo(&'B'), Some('A'));
        assert_eq!(mgr.redo(&'A'), Some('B'));
        assert_eq!(mgr.undo_snapshots().copied().collect::<String>(), "AB");
        assert!(!mgr.can_redo());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut mgr = HistoryManager::<u32>::default();
        assert_eq!(mgr.undo(&5), None);
        assert_eq!(mgr.redo(&5), None);
        assert_eq!(mgr.undo_depth(), 0);
        assert_eq!(mgr.redo_depth(), 0);
    }

    #[test]
    fn test_single_checkpoint_matching_live_has_no_undo() {
        let mut mgr = HistoryManager::default();
        mgr.commit(1);
        assert!(!mgr.can_undo(&1));
        assert_eq!(mgr.undo(&1), None);
        assert_eq!(mgr.undo_depth(), 1);
    }

    #[test]
    fn test_dirty_live_state_returns_to_checkpoint() {
        let mut mgr = HistoryManager::default();
        mgr.commit(1);
        // Live state moved to 7 without a commit.
        assert!(mgr.can_undo(&7));
        assert_eq!(mgr.undo(&7), Some(1));
        assert_eq!(mgr.redo_depth(), 1);
        // Redo brings the uncommitted state back.
        assert_eq!(mgr.redo(&1), Some(7));
        assert_eq!(mgr.undo_snapshots().copied().collect::<Vec<_>>(), vec![1, 7]);
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut mgr = HistoryManager::default();
        mgr.commit(1);
        mgr.commit(2);
        mgr.undo(&2);
        assert!(mgr.can_redo());
        mgr.commit(3);
        assert!(!mgr.can_redo());
        assert_eq!(mgr.undo_snapshots().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_max_depth_enforced() {
        let mut mgr = HistoryManager::default();
        for i in 0..25 {
            mgr.commit(i);
        }
        assert_eq!(mgr.undo_depth(), 20);
        let kept: Vec<_> = mgr.undo_snapshots().copied().collect();
        assert_eq!(kept, (5..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_redo_after_edit_keeps_edit_reachable() {
        let mut mgr = HistoryManager::default();
        mgr.commit(1);
        mgr.commit(2);
        assert_eq!(mgr.undo(&2), Some(1));
        // Live drifts to 9, then the user hits redo.
        assert_eq!(mgr.redo(&9), Some(2));
        assert_eq!(mgr.undo(&2), Some(9));
    }

    #[test]
    fn test_multiple_undo_redo_cycle() {
        let mut mgr = HistoryManager::default();
        for i in 1..=4 {
            mgr.commit(i);
        }
        let mut live = 4;
        for expected in [3, 2, 1] {
            live = mgr.undo(&live).unwrap();
            assert_eq!(live, expected);
        }
        assert_eq!(mgr.undo(&live), None);
        for expected in [2, 3, 4] {
            live = mgr.redo(&live).unwrap();
            assert_eq!(live, expected);
        }
        assert_eq!(mgr.redo(&live), None);
    }

    #[test]
    fn test_shrinking_config_evicts() {
        let mut mgr = HistoryManager::new(HistoryConfig::unlimited());
        for i in 0..10 {
            mgr.commit(i);
        }
        mgr.set_config(HistoryConfig::new(3));
        assert_eq!(mgr.undo_snapshots().copied().collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn test_clear() {
        let mut mgr = HistoryManager::default();
        mgr.commit(1);
        mgr.commit(2);
        mgr.undo(&2);
        mgr.clear();
        assert_eq!(mgr.undo_depth(), 0);
        assert_eq!(mgr.redo_depth(), 0);
    }

    #[test]
    fn test_debug_impl() {
        let mgr = HistoryManager::<u8>::default();
        let dbg = format!("{mgr:?}");
        assert!(dbg.contains("HistoryManager"));
        assert!(dbg.contains("undo_depth"));
    }
}
