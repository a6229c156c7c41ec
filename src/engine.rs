use crate::error::EngineError;
use crate::mcts::{MctsParams, MctsSearcher, TreeReuse};
use crate::rules::RulesEngine;
use crate::search::minimax::{MinimaxParams, MinimaxSearcher};
use crate::types::Move;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;

/// Aggregate diagnostics across both searchers, for logs and reports.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub minimax_nodes: u64,
    pub minimax_total_nodes: u64,
    pub minimax_elapsed: Option<Duration>,
    pub mcts_iterations: u64,
    pub mcts_nodes_created: u64,
    pub mcts_total_nodes_created: u64,
    pub mcts_tree_reuse: Option<TreeReuse>,
    pub mcts_elapsed: Option<Duration>,
}

/// Facade over both search algorithms. Owns the rules engine, a minimax
/// searcher, an MCTS searcher (with its reusable tree), and the most recently
/// chosen move.
///
/// The caller keeps ownership of the game state and lends it exclusively for
/// the duration of each search call; every call restores the state before
/// returning.
pub struct Engine<R: RulesEngine> {
    rules: R,
    minimax: MinimaxSearcher<R>,
    mcts: MctsSearcher<R>,
    chosen: Option<Move>,
    chosen_eval: i32,
}

impl<R: RulesEngine> Engine<R> {
    pub fn new(rules: R) -> Self {
        Self::with_rng(rules, SmallRng::from_entropy())
    }

    /// Deterministic engine for tests and reproducible play.
    pub fn with_seed(rules: R, seed: u64) -> Self {
        Self::with_rng(rules, SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(rules: R, rng: SmallRng) -> Self {
        Self {
            rules,
            minimax: MinimaxSearcher::default(),
            mcts: MctsSearcher::new(rng),
            chosen: None,
            chosen_eval: 0,
        }
    }

    /// Depth-limited alpha-beta search; returns the root evaluation. The
    /// chosen move is retrievable through `chosen_move` afterwards.
    pub fn run_minimax(&mut self, state: &mut R::State, depth_limit: u32) -> i32 {
        self.set_max_depth(depth_limit);
        let maximizing = self.rules.side_to_move(state).is_white();
        let score = self.minimax.search_root(&self.rules, state, maximizing);
        self.chosen = self.minimax.best_move();
        self.chosen_eval = score;
        score
    }

    /// Same as `run_minimax`, additionally recording elapsed wall-clock time.
    pub fn run_minimax_timed(&mut self, state: &mut R::State, depth_limit: u32) -> i32 {
        self.set_max_depth(depth_limit);
        let maximizing = self.rules.side_to_move(state).is_white();
        let score = self.minimax.search_root_timed(&self.rules, state, maximizing);
        self.chosen = self.minimax.best_move();
        self.chosen_eval = score;
        score
    }

    /// Time-budgeted MCTS; `Ok(false)` only when the root has no legal
    /// continuation.
    pub fn run_mcts(
        &mut self,
        state: &mut R::State,
        time_budget: Duration,
    ) -> Result<bool, EngineError> {
        self.run_mcts_with_params(state, MctsParams { time_budget, ..Default::default() })
    }

    pub fn run_mcts_with_params(
        &mut self,
        state: &mut R::State,
        params: MctsParams,
    ) -> Result<bool, EngineError> {
        let found = self.mcts.search(&self.rules, state, params)?;
        if found {
            self.chosen = self.mcts.best_move();
            self.chosen_eval = self.mcts.best_eval();
        }
        Ok(found)
    }

    /// Same as `run_mcts`, additionally recording elapsed wall-clock time.
    pub fn run_mcts_timed(
        &mut self,
        state: &mut R::State,
        time_budget: Duration,
    ) -> Result<bool, EngineError> {
        let params = MctsParams { time_budget, ..Default::default() };
        let found = self.mcts.search_timed(&self.rules, state, params)?;
        if found {
            self.chosen = self.mcts.best_move();
            self.chosen_eval = self.mcts.best_eval();
        }
        Ok(found)
    }

    /// Apply the most recently chosen move to `state` through the rules
    /// engine. False when no move has been chosen or it does not apply.
    pub fn apply_chosen_move(&self, state: &mut R::State) -> bool {
        match self.chosen {
            Some(mv) => self.rules.apply_move(state, &mv),
            None => false,
        }
    }

    pub fn chosen_move(&self) -> Option<Move> {
        self.chosen
    }

    /// Evaluation attached to the chosen move: the root minimax value, or the
    /// static evaluation of the MCTS best child's state.
    pub fn chosen_eval(&self) -> i32 {
        self.chosen_eval
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        if depth > 0 {
            self.minimax.params.max_depth = depth;
        }
    }

    pub fn minimax_params(&self) -> MinimaxParams {
        self.minimax.params
    }

    pub fn set_minimax_params(&mut self, params: MinimaxParams) {
        self.minimax.params = params;
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn minimax(&self) -> &MinimaxSearcher<R> {
        &self.minimax
    }

    pub fn mcts(&self) -> &MctsSearcher<R> {
        &self.mcts
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            minimax_nodes: self.minimax.nodes(),
            minimax_total_nodes: self.minimax.total_nodes(),
            minimax_elapsed: self.minimax.last_elapsed(),
            mcts_iterations: self.mcts.iterations(),
            mcts_nodes_created: self.mcts.nodes_created(),
            mcts_total_nodes_created: self.mcts.total_nodes_created(),
            mcts_tree_reuse: self.mcts.last_reuse(),
            mcts_elapsed: self.mcts.last_elapsed(),
        }
    }
}
