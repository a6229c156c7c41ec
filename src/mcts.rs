use crate::error::EngineError;
use crate::rules::RulesEngine;
use crate::snapshot::SnapshotStack;
use crate::types::{Move, Side};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Index into the node arena.
pub type NodeId = usize;

/// One explored game state. Parent links are non-owning indices; only the
/// arena owns nodes, and liveness is reachability from the root.
pub struct Node<S> {
    /// Ply distance from the current tree root (root = 0).
    pub depth: u32,
    pub parent: Option<NodeId>,
    /// Moves already explored, as owned child nodes.
    pub children: Vec<NodeId>,
    /// Legal moves not yet expanded; shrinks monotonically. Together with
    /// `children` this covers the node's legal-move set exactly once each.
    pub untried: Vec<Move>,
    pub state: S,
    pub visits: u32,
    /// Win counters indexed by `Side::index()`; draws are inferred as
    /// `visits - wins[0] - wins[1]`.
    pub wins: [u32; 2],
}

impl<S> Node<S> {
    /// Plain win rate for `side`; 0 if unvisited.
    pub fn win_rate(&self, side: Side) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.wins[side.index()] as f64 / self.visits as f64
    }

    pub fn draws(&self) -> u32 {
        self.visits - self.wins[0] - self.wins[1]
    }

    /// A dead end reached without explicit terminal detection: nothing left
    /// to try and nothing explored.
    pub fn is_dead_end(&self) -> bool {
        self.untried.is_empty() && self.children.is_empty()
    }
}

/// Arena-backed search tree. Re-rooting rebuilds the arena around the
/// promoted node; every sibling subtree becomes unreachable and is dropped
/// with the old storage, never the promoted node itself.
pub struct Tree<S> {
    nodes: Vec<Node<S>>,
    root: NodeId,
}

impl<S> Tree<S> {
    pub fn new(state: S, untried: Vec<Move>) -> Self {
        let root = Node {
            depth: 0,
            parent: None,
            children: Vec::new(),
            untried,
            state,
            visits: 0,
            wins: [0, 0],
        };
        Self { nodes: vec![root], root: 0 }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node<S>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach a freshly expanded child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, state: S, untried: Vec<Move>) -> NodeId {
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node {
            depth,
            parent: Some(parent),
            children: Vec::new(),
            untried,
            state,
            visits: 0,
            wins: [0, 0],
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Remove and return a uniformly random untried move of `id`.
    pub fn pop_random_untried(&mut self, id: NodeId, rng: &mut SmallRng) -> Option<Move> {
        let node = &mut self.nodes[id];
        if node.untried.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..node.untried.len());
        Some(node.untried.swap_remove(idx))
    }

    /// UCT score of `id` for `side`. The root carries no score of its own
    /// (selection starts below it) and an unvisited node is always preferred,
    /// so both report +inf.
    pub fn uct(&self, id: NodeId, side: Side) -> f64 {
        let node = self.node(id);
        let Some(parent) = node.parent else {
            return f64::INFINITY;
        };
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let parent_visits = self.node(parent).visits as f64;
        node.win_rate(side)
            + std::f64::consts::SQRT_2 * (parent_visits.ln() / node.visits as f64).sqrt()
    }

    /// Child of `id` with the highest UCT score for `side`; ties go to the
    /// first encountered.
    pub fn best_uct_child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.node(id).children {
            let score = self.uct(child, side);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((child, score));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Child of `id` with the highest plain win rate for `side`. This is the
    /// decide-time policy, deliberately not UCT. Ties go to the first
    /// encountered.
    pub fn best_child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.node(id).children {
            let rate = self.node(child).win_rate(side);
            if best.map_or(true, |(_, b)| rate > b) {
                best = Some((child, rate));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Credit a rollout outcome to `leaf` and every ancestor up to and
    /// including the root. `result` encodes 1 white win, 0 draw, -1 black
    /// win; anything else is a contract violation and aborts the search.
    pub fn backpropagate(&mut self, leaf: NodeId, result: i8) -> Result<(), EngineError> {
        if !(-1..=1).contains(&result) {
            return Err(EngineError::RolloutContract(result));
        }
        let mut cur = Some(leaf);
        while let Some(id) = cur {
            let node = &mut self.nodes[id];
            node.visits += 1;
            match result {
                1 => node.wins[Side::White.index()] += 1,
                -1 => node.wins[Side::Black.index()] += 1,
                _ => {} // draws are inferred, no counter
            }
            cur = node.parent;
        }
        Ok(())
    }

    /// Re-root at `new_root`: retain exactly its subtree, drop everything
    /// else. Depths become relative to the new root.
    pub fn promote(&mut self, new_root: NodeId) {
        // Breadth-first order over the kept subtree; parents precede children.
        let mut order = vec![new_root];
        let mut i = 0;
        while i < order.len() {
            let id = order[i];
            order.extend(self.nodes[id].children.iter().copied());
            i += 1;
        }
        let mut remap = vec![usize::MAX; self.nodes.len()];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id] = new_id;
        }
        let mut old: Vec<Option<Node<S>>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes: Vec<Node<S>> = Vec::with_capacity(order.len());
        for &old_id in &order {
            let mut node = old[old_id].take().expect("subtree node visited once");
            node.parent = if old_id == new_root {
                None
            } else {
                node.parent.map(|p| remap[p])
            };
            for child in node.children.iter_mut() {
                *child = remap[*child];
            }
            nodes.push(node);
        }
        for id in 0..nodes.len() {
            nodes[id].depth = match nodes[id].parent {
                Some(p) => nodes[p].depth + 1,
                None => 0,
            };
        }
        self.nodes = nodes;
        self.root = 0;
        // Unreachable siblings went down with the old storage.
    }
}

/// A node is terminal if its state is checkmate, the move-count draw rule
/// holds, or it is a dead end.
pub fn node_is_terminal<R: RulesEngine>(rules: &R, node: &Node<R::State>) -> bool {
    if rules.is_checkmate(&node.state) {
        return true;
    }
    if rules.is_draw_by_move_count(&node.state) {
        return true;
    }
    node.is_dead_end()
}

#[derive(Debug, Clone, Copy)]
pub struct MctsParams {
    /// Wall-clock budget, polled between iterations; an in-flight iteration
    /// always runs to completion, so actual usage can overshoot by one
    /// iteration's cost.
    pub time_budget: Duration,
    /// Hard iteration cap for deterministic tests; `None` means time-only.
    pub max_iterations: Option<u64>,
}

impl Default for MctsParams {
    fn default() -> Self {
        Self { time_budget: Duration::from_secs(5), max_iterations: None }
    }
}

/// How the previous tree was carried into the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TreeReuse {
    /// No tree existed yet.
    Fresh,
    /// The engine's own suggestion was played; its child became the root.
    PromotedBest,
    /// The opponent's reply was found among the best child's children.
    PromotedReply,
    /// State diverged; the old tree was discarded wholesale.
    Rebuilt,
}

/// Time-budgeted Monte Carlo tree search with UCT selection and tree reuse
/// across successive calls. The shared state is scratch for one `search`
/// call: a snapshot is taken once on entry and restored after every
/// iteration and again on exit.
pub struct MctsSearcher<R: RulesEngine> {
    saves: SnapshotStack<R::State>,
    tree: Option<Tree<R::State>>,
    rng: SmallRng,
    best_move: Option<Move>,
    best_eval: i32,
    iterations: u64,
    nodes_created: u64,
    total_nodes_created: u64,
    last_reuse: Option<TreeReuse>,
    last_elapsed: Option<Duration>,
}

impl<R: RulesEngine> MctsSearcher<R> {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            saves: SnapshotStack::new(),
            tree: None,
            rng,
            best_move: None,
            best_eval: 0,
            iterations: 0,
            nodes_created: 0,
            total_nodes_created: 0,
            last_reuse: None,
            last_elapsed: None,
        }
    }

    /// Run the search loop until the time budget (or iteration cap) is
    /// exhausted. Returns `Ok(false)` only when the root is already terminal,
    /// i.e. there is no legal continuation to recommend.
    pub fn search(
        &mut self,
        rules: &R,
        state: &mut R::State,
        params: MctsParams,
    ) -> Result<bool, EngineError> {
        self.saves.save(state);
        let outcome = self.search_inner(rules, state, params);
        // Restore unconditionally so even the error path leaves the shared
        // state exactly as it was on entry.
        self.saves.load(state);
        self.saves.pop();
        outcome
    }

    /// Timed companion of `search`; identical semantics, records elapsed
    /// wall-clock time for diagnostics.
    pub fn search_timed(
        &mut self,
        rules: &R,
        state: &mut R::State,
        params: MctsParams,
    ) -> Result<bool, EngineError> {
        let start = Instant::now();
        let outcome = self.search(rules, state, params);
        let elapsed = start.elapsed();
        self.last_elapsed = Some(elapsed);
        log::debug!(
            "mcts ran {} iterations ({} new nodes) in {:.3}s",
            self.iterations,
            self.nodes_created,
            elapsed.as_secs_f64()
        );
        outcome
    }

    fn search_inner(
        &mut self,
        rules: &R,
        state: &mut R::State,
        params: MctsParams,
    ) -> Result<bool, EngineError> {
        self.iterations = 0;
        self.nodes_created = 0;
        let reuse = self.continue_tree(rules, state);
        self.last_reuse = Some(reuse);
        log::debug!("mcts tree continuity: {:?}", reuse);

        let mut tree = self.tree.take().expect("tree initialized by continue_tree");
        // The side the engine optimizes for: whoever moves at the root.
        let side = rules.side_to_move(&tree.node(tree.root()).state);

        if node_is_terminal(rules, tree.node(tree.root())) {
            self.tree = Some(tree);
            return Ok(false);
        }

        let start = Instant::now();
        loop {
            // Selection: descend through fully expanded nodes by UCT,
            // mirroring the path onto the shared state.
            let mut leaf = tree.root();
            while tree.node(leaf).untried.is_empty() && !tree.node(leaf).children.is_empty() {
                leaf = tree
                    .best_uct_child(leaf, side)
                    .expect("children checked non-empty");
                *state = tree.node(leaf).state.clone();
            }

            // Expansion: one uniformly random untried move becomes a child.
            if !node_is_terminal(rules, tree.node(leaf)) && !tree.node(leaf).untried.is_empty() {
                let mv = tree
                    .pop_random_untried(leaf, &mut self.rng)
                    .expect("untried checked non-empty");
                let applied = rules.apply_move(state, &mv);
                debug_assert!(applied, "rules engine rejected one of its own legal moves");
                let untried = rules.legal_moves(state, rules.side_to_move(state));
                leaf = tree.add_child(leaf, state.clone(), untried);
                self.nodes_created += 1;
                self.total_nodes_created += 1;
            }

            // Simulation: random playout from the leaf's state.
            let result = self.simulate(rules, state);

            // Backpropagation: leaf to root inclusive, via parent links.
            if let Err(e) = tree.backpropagate(leaf, result) {
                self.tree = Some(tree);
                return Err(e);
            }

            // Restore the shared state to the call-entry snapshot.
            self.saves.load(state);
            self.iterations += 1;

            if start.elapsed() >= params.time_budget {
                break;
            }
            if let Some(max) = params.max_iterations {
                if self.iterations >= max {
                    break;
                }
            }
        }

        let root = tree.root();
        if let Some(best) = tree.best_child(root, side) {
            let node = tree.node(best);
            self.best_move = rules.last_move(&node.state);
            self.best_eval = rules.evaluate(&node.state);
            log::debug!(
                "mcts best child: win rate {:.3} over {} visits",
                node.win_rate(side),
                node.visits
            );
        } else {
            self.best_move = None;
        }
        self.tree = Some(tree);
        Ok(true)
    }

    /// Carry the previous call's tree forward when the external state matches
    /// a known continuation; fall back to a fresh tree otherwise. A failed
    /// match never leaves partial tree state behind.
    fn continue_tree(&mut self, rules: &R, state: &R::State) -> TreeReuse {
        let Some(mut tree) = self.tree.take() else {
            self.tree = Some(self.fresh_tree(rules, state));
            return TreeReuse::Fresh;
        };
        let root = tree.root();
        let side = rules.side_to_move(&tree.node(root).state);
        if let Some(best) = tree.best_child(root, side) {
            if tree.node(best).state == *state {
                tree.promote(best);
                self.tree = Some(tree);
                return TreeReuse::PromotedBest;
            }
            // The opponent's reply may already sit under our suggested move.
            let reply = tree
                .node(best)
                .children
                .iter()
                .copied()
                .find(|&c| tree.node(c).state == *state);
            if let Some(reply) = reply {
                tree.promote(reply);
                self.tree = Some(tree);
                return TreeReuse::PromotedReply;
            }
        }
        self.tree = Some(self.fresh_tree(rules, state));
        TreeReuse::Rebuilt
    }

    fn fresh_tree(&mut self, rules: &R, state: &R::State) -> Tree<R::State> {
        self.nodes_created += 1;
        self.total_nodes_created += 1;
        let untried = rules.legal_moves(state, rules.side_to_move(state));
        Tree::new(state.clone(), untried)
    }

    /// Random playout to a terminal outcome: 1 white win, 0 draw, -1 black
    /// win. A checkmate is credited to the side that delivered it.
    fn simulate(&mut self, rules: &R, state: &mut R::State) -> i8 {
        loop {
            if rules.is_checkmate(state) {
                return if rules.side_to_move(state).is_white() { -1 } else { 1 };
            }
            let side = rules.side_to_move(state);
            let moves = rules.legal_moves(state, side);
            if moves.is_empty() || rules.is_draw_by_move_count(state) {
                rules.mark_stalemate(state);
                return 0;
            }
            let mv = moves[self.rng.gen_range(0..moves.len())];
            let applied = rules.apply_move(state, &mv);
            debug_assert!(applied, "rules engine rejected one of its own legal moves");
        }
    }

    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    /// Static evaluation of the recommended move's resulting state.
    pub fn best_eval(&self) -> i32 {
        self.best_eval
    }

    /// Completed iterations in the last call.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Nodes created in the last call (including a fresh root, if any).
    pub fn nodes_created(&self) -> u64 {
        self.nodes_created
    }

    pub fn total_nodes_created(&self) -> u64 {
        self.total_nodes_created
    }

    pub fn last_reuse(&self) -> Option<TreeReuse> {
        self.last_reuse
    }

    pub fn last_elapsed(&self) -> Option<Duration> {
        self.last_elapsed
    }

    pub fn tree(&self) -> Option<&Tree<R::State>> {
        self.tree.as_ref()
    }
}
