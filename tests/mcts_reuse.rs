use plybot::board::minichess::{MiniChess, MiniState};
use plybot::engine::Engine;
use plybot::mcts::{MctsParams, TreeReuse};
use plybot::rules::RulesEngine;
use std::time::Duration;

fn capped(iterations: u64) -> MctsParams {
    MctsParams {
        time_budget: Duration::from_secs(60),
        max_iterations: Some(iterations),
    }
}

#[test]
fn first_call_builds_a_fresh_tree() {
    let mut state = MiniState::initial();
    let mut engine = Engine::with_seed(MiniChess, 9);
    engine.run_mcts_with_params(&mut state, capped(50)).unwrap();
    assert_eq!(engine.mcts().last_reuse(), Some(TreeReuse::Fresh));
}

#[test]
fn replaying_the_suggestion_promotes_the_best_child() {
    let mut state = MiniState::initial();
    let mut engine = Engine::with_seed(MiniChess, 9);
    engine.run_mcts_with_params(&mut state, capped(400)).unwrap();
    assert!(engine.apply_chosen_move(&mut state));

    engine.run_mcts_with_params(&mut state, capped(100)).unwrap();
    assert_eq!(
        engine.mcts().last_reuse(),
        Some(TreeReuse::PromotedBest),
        "the engine's own suggestion was played; the subtree must carry over"
    );

    // Carried statistics: the new root keeps the visits it accumulated as a
    // child during the first call, on top of the second call's iterations.
    let tree = engine.mcts().tree().expect("tree exists after search");
    assert!(
        tree.node(tree.root()).visits > engine.mcts().iterations() as u32,
        "promoted root should keep its first-call visit count"
    );
}

#[test]
fn opponent_reply_found_among_grandchildren_is_promoted() {
    let rules = MiniChess;
    let mut state = MiniState::initial();
    let mut engine = Engine::with_seed(rules, 9);
    engine.run_mcts_with_params(&mut state, capped(2000)).unwrap();
    assert!(engine.apply_chosen_move(&mut state));

    // Play, as the opponent, a reply the tree has already expanded under the
    // engine's suggested move.
    let reply = {
        let tree = engine.mcts().tree().expect("tree exists after search");
        let root = tree.root();
        let side = rules.side_to_move(&tree.node(root).state);
        let best = tree.best_child(root, side).expect("root has children");
        let grandchild = *tree
            .node(best)
            .children
            .first()
            .expect("best child explored at least one reply");
        rules
            .last_move(&tree.node(grandchild).state)
            .expect("non-root nodes carry a last move")
    };
    assert!(rules.apply_move(&mut state, &reply));

    engine.run_mcts_with_params(&mut state, capped(100)).unwrap();
    assert_eq!(engine.mcts().last_reuse(), Some(TreeReuse::PromotedReply));
}

#[test]
fn diverged_state_rebuilds_from_scratch() {
    let rules = MiniChess;
    let mut state = MiniState::initial();
    let mut engine = Engine::with_seed(rules, 9);
    engine.run_mcts_with_params(&mut state, capped(400)).unwrap();

    // Play a move other than the suggestion: the external state no longer
    // matches the best child or any of its children.
    let chosen = engine.chosen_move().expect("search chose a move");
    let side = rules.side_to_move(&state);
    let other = rules
        .legal_moves(&state, side)
        .into_iter()
        .find(|m| *m != chosen)
        .expect("position has more than one legal move");
    assert!(rules.apply_move(&mut state, &other));

    engine.run_mcts_with_params(&mut state, capped(50)).unwrap();
    assert_eq!(engine.mcts().last_reuse(), Some(TreeReuse::Rebuilt));
}
