use crate::rules::RulesEngine;
use crate::snapshot::SnapshotStack;
use crate::types::{Move, Side};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct MinimaxParams {
    /// Search horizon in ply; the static evaluation is returned at this depth.
    pub max_depth: u32,
    /// Alpha-beta cutoffs. Off only exists so tests can check that pruning
    /// never changes the returned value, only the work performed.
    pub use_pruning: bool,
}

impl Default for MinimaxParams {
    fn default() -> Self {
        Self { max_depth: 5, use_pruning: true }
    }
}

/// Depth-bounded, alpha-beta-pruned adversarial search. White maximizes,
/// Black minimizes; the evaluation convention is white-positive throughout.
///
/// The shared state is scratch space for the duration of one `search` call:
/// every ply saves a snapshot before branching, restores it after each child,
/// and pops it exactly once when the ply completes (normally or via cutoff).
pub struct MinimaxSearcher<R: RulesEngine> {
    pub params: MinimaxParams,
    saves: SnapshotStack<R::State>,
    best_move: Option<Move>,
    nodes: u64,
    total_nodes: u64,
    max_snapshot_depth: usize,
    last_elapsed: Option<Duration>,
}

impl<R: RulesEngine> Default for MinimaxSearcher<R> {
    fn default() -> Self {
        Self {
            params: MinimaxParams::default(),
            saves: SnapshotStack::new(),
            best_move: None,
            nodes: 0,
            total_nodes: 0,
            max_snapshot_depth: 0,
            last_elapsed: None,
        }
    }
}

impl<R: RulesEngine> MinimaxSearcher<R> {
    pub fn new(params: MinimaxParams) -> Self {
        Self { params, ..Self::default() }
    }

    /// Full-window search from the root. `maximizing` says whether the side
    /// to move is the maximizing (White) side. The best root move is
    /// retrievable through `best_move` afterwards.
    pub fn search_root(&mut self, rules: &R, state: &mut R::State, maximizing: bool) -> i32 {
        self.nodes = 0;
        self.best_move = None;
        self.max_snapshot_depth = 0;
        let value = self.search(rules, state, maximizing, 0, i32::MIN, i32::MAX);
        debug_assert_eq!(self.saves.depth(), 0, "snapshot stack not drained after root search");
        value
    }

    /// Timed companion of `search_root`; identical semantics, records elapsed
    /// wall-clock time for diagnostics.
    pub fn search_root_timed(&mut self, rules: &R, state: &mut R::State, maximizing: bool) -> i32 {
        let start = Instant::now();
        let value = self.search_root(rules, state, maximizing);
        let elapsed = start.elapsed();
        self.last_elapsed = Some(elapsed);
        log::debug!(
            "minimax depth {} searched {} nodes in {:.3}s",
            self.params.max_depth,
            self.nodes,
            elapsed.as_secs_f64()
        );
        value
    }

    /// One minimax node. `depth` is the ply distance from the root, passed by
    /// value so each call owns its own bookkeeping.
    pub fn search(
        &mut self,
        rules: &R,
        state: &mut R::State,
        maximizing: bool,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;
        self.total_nodes += 1;
        if depth >= self.params.max_depth {
            return rules.evaluate(state);
        }
        if rules.is_checkmate(state) {
            // Tie-break among checkmates: strip the losing king's square value.
            let king = rules.king_square(state, rules.side_to_move(state));
            return rules.evaluate(state) - rules.square_value(state, king);
        }
        let side = if maximizing { Side::White } else { Side::Black };
        let moves = rules.legal_moves(state, side);
        if moves.is_empty() || rules.is_draw_by_move_count(state) {
            // No continuation and no checkmate: stalemate, neutral score.
            rules.mark_stalemate(state);
            return 0;
        }

        // One snapshot per ply, reused across every sibling at this level.
        self.saves.save(state);
        self.max_snapshot_depth = self.max_snapshot_depth.max(self.saves.depth());
        if maximizing {
            for mv in &moves {
                let applied = rules.apply_move(state, mv);
                debug_assert!(applied, "rules engine rejected one of its own legal moves");
                let value = self.search(rules, state, false, depth + 1, alpha, beta);
                self.saves.load(state);
                if value > alpha {
                    alpha = value;
                    if depth == 0 {
                        self.best_move = Some(*mv);
                    }
                }
                if self.params.use_pruning && alpha >= beta {
                    self.saves.pop();
                    return alpha;
                }
            }
            self.saves.pop();
            alpha
        } else {
            for mv in &moves {
                let applied = rules.apply_move(state, mv);
                debug_assert!(applied, "rules engine rejected one of its own legal moves");
                let value = self.search(rules, state, true, depth + 1, alpha, beta);
                self.saves.load(state);
                if value < beta {
                    beta = value;
                    if depth == 0 {
                        self.best_move = Some(*mv);
                    }
                }
                if self.params.use_pruning && alpha >= beta {
                    self.saves.pop();
                    return beta;
                }
            }
            self.saves.pop();
            beta
        }
    }

    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    /// Nodes visited by the last root search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Nodes visited over the searcher's lifetime.
    pub fn total_nodes(&self) -> u64 {
        self.total_nodes
    }

    pub fn last_elapsed(&self) -> Option<Duration> {
        self.last_elapsed
    }

    /// Outstanding snapshot count; 0 whenever no search is in flight.
    pub fn snapshot_depth(&self) -> usize {
        self.saves.depth()
    }

    /// Deepest snapshot stack reached by the last root search. At ply `d` the
    /// stack holds `d + 1` snapshots, and only plies below the horizon save,
    /// so this never exceeds `max_depth`.
    pub fn max_snapshot_depth(&self) -> usize {
        self.max_snapshot_depth
    }
}
