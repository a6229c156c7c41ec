/// LIFO stack of game-state snapshots backing save-before-mutate /
/// restore-after-explore during recursive search.
///
/// Balance discipline is the caller's: one `save` per exploration level, any
/// number of `load`s while that level runs, exactly one `pop` when it
/// completes (including early pruning exits). `load` does not pop; the top
/// snapshot is reused for every sibling move at the same ply.
#[derive(Default)]
pub struct SnapshotStack<S: Clone> {
    saves: Vec<S>,
}

impl<S: Clone> SnapshotStack<S> {
    pub fn new() -> Self {
        Self { saves: Vec::new() }
    }

    /// Push a deep copy of `state`.
    pub fn save(&mut self, state: &S) {
        self.saves.push(state.clone());
    }

    /// Overwrite `state` with the top snapshot, without popping.
    pub fn load(&self, state: &mut S) {
        debug_assert!(!self.saves.is_empty(), "load on empty snapshot stack");
        if let Some(top) = self.saves.last() {
            *state = top.clone();
        }
    }

    pub fn pop(&mut self) -> Option<S> {
        debug_assert!(!self.saves.is_empty(), "pop on empty snapshot stack");
        self.saves.pop()
    }

    /// Current stack depth; equals the number of ply saved-and-not-yet-popped
    /// on the active recursion path.
    pub fn depth(&self) -> usize {
        self.saves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn save_load_round_trips_exactly() {
        let mut stack: SnapshotStack<Vec<u32>> = SnapshotStack::new();
        let saved = vec![1, 2, 3];
        let mut state = saved.clone();
        stack.save(&state);
        state.push(99);
        state[0] = 42;
        stack.load(&mut state);
        assert_eq!(state, saved);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn load_does_not_pop() {
        let mut stack: SnapshotStack<i32> = SnapshotStack::new();
        let mut state = 7;
        stack.save(&state);
        state = 8;
        stack.load(&mut state);
        assert_eq!(state, 7);
        state = 9;
        stack.load(&mut state);
        assert_eq!(state, 7);
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn snapshots_are_independent_copies() {
        let mut stack: SnapshotStack<Vec<u32>> = SnapshotStack::new();
        let mut state = vec![5];
        stack.save(&state);
        state[0] = 6; // mutating the live state must not touch the snapshot
        stack.load(&mut state);
        assert_eq!(state, vec![5]);
    }
}
