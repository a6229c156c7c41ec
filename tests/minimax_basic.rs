use plybot::board::minichess::{Kind, MiniChess, MiniState, MATE_SCORE};
use plybot::engine::Engine;
use plybot::rules::RulesEngine;
use plybot::types::{Move, Side, Square};

fn mate_in_one() -> MiniState {
    // White: Kc3, Rd1. Black: lone Ka4. Rd1-a1 is the only mate.
    let mut s = MiniState::empty(Side::White);
    s.place(Square::new(2, 2), Side::White, Kind::King);
    s.place(Square::new(0, 3), Side::White, Kind::Rook);
    s.place(Square::new(3, 0), Side::Black, Kind::King);
    s
}

fn stalemate_for_black() -> MiniState {
    // Black king a4, not in check, with every escape covered.
    let mut s = MiniState::empty(Side::Black);
    s.place(Square::new(2, 2), Side::White, Kind::King);
    s.place(Square::new(1, 1), Side::White, Kind::Pawn);
    s.place(Square::new(3, 0), Side::Black, Kind::King);
    s
}

#[test]
fn forced_single_move_is_chosen_at_depth_one() {
    // White king a1 has exactly one legal move (Kb1); depth 1 must pick it.
    let mut state = MiniState::empty(Side::White);
    state.place(Square::new(0, 0), Side::White, Kind::King);
    state.place(Square::new(2, 1), Side::Black, Kind::King);
    let rules = MiniChess;
    assert_eq!(rules.legal_moves(&state, Side::White).len(), 1);

    let mut engine = Engine::with_seed(rules, 7);
    engine.run_minimax(&mut state, 1);
    assert_eq!(
        engine.chosen_move(),
        Some(Move::new(Square::new(0, 0), Square::new(0, 1)))
    );

    // Same answer without pruning: cutoffs never affect a forced move.
    let mut params = engine.minimax_params();
    params.use_pruning = false;
    engine.set_minimax_params(params);
    engine.run_minimax(&mut state, 1);
    assert_eq!(
        engine.chosen_move(),
        Some(Move::new(Square::new(0, 0), Square::new(0, 1)))
    );
}

#[test]
fn finds_mate_in_one() {
    let mut state = mate_in_one();
    let mut engine = Engine::with_seed(MiniChess, 7);
    let score = engine.run_minimax(&mut state, 2);
    assert_eq!(
        engine.chosen_move(),
        Some(Move::new(Square::new(0, 3), Square::new(0, 0))),
        "expected Rd1-a1 back-rank mate"
    );
    assert!(score > MATE_SCORE / 2, "mate score too low: {score}");
}

#[test]
fn stalemate_scores_zero_and_is_marked() {
    let mut state = stalemate_for_black();
    let mut engine = Engine::with_seed(MiniChess, 7);
    let score = engine.run_minimax(&mut state, 3);
    assert_eq!(score, 0);
    assert_eq!(engine.chosen_move(), None);
    assert!(state.is_stalemate_marked());
}

#[test]
fn search_restores_the_shared_state() {
    let mut state = MiniState::initial();
    let before = state.clone();
    let mut engine = Engine::with_seed(MiniChess, 7);
    engine.run_minimax(&mut state, 3);
    assert_eq!(state, before, "state must be restored after search");
    assert_eq!(
        engine.minimax().snapshot_depth(),
        0,
        "snapshot stack must drain back to zero"
    );
}

#[test]
fn snapshot_stack_stays_within_the_search_horizon() {
    // One save per ply: exploring ply d holds d + 1 snapshots, and the
    // horizon ply returns before saving, so the peak is exactly max_depth
    // whenever the tree is deep enough.
    for depth in [1, 2, 3] {
        let mut state = MiniState::initial();
        let mut engine = Engine::with_seed(MiniChess, 7);
        engine.run_minimax(&mut state, depth);
        assert_eq!(
            engine.minimax().max_snapshot_depth(),
            depth as usize,
            "snapshot peak off at depth {depth}"
        );
        assert_eq!(engine.minimax().snapshot_depth(), 0);
    }
}

#[test]
fn pruning_changes_work_not_values() {
    // Alpha-beta cutoffs must return exactly the full-window minimax value
    // (and the same root move) while visiting no more nodes.
    let rules = MiniChess;
    let mut positions = vec![MiniState::initial(), mate_in_one()];
    // A middlegame-ish position: play two forced-sensible moves from the start.
    let mut mid = MiniState::initial();
    let mv = rules.legal_moves(&mid, Side::White)[0];
    assert!(rules.apply_move(&mut mid, &mv));
    let mv = rules.legal_moves(&mid, Side::Black)[0];
    assert!(rules.apply_move(&mut mid, &mv));
    positions.push(mid);

    for depth in [2, 3, 4] {
        for position in &positions {
            let mut pruned = Engine::with_seed(rules, 7);
            let mut full = Engine::with_seed(rules, 7);
            let mut params = full.minimax_params();
            params.use_pruning = false;
            full.set_minimax_params(params);

            let mut a = position.clone();
            let mut b = position.clone();
            let pruned_score = pruned.run_minimax(&mut a, depth);
            let full_score = full.run_minimax(&mut b, depth);

            assert_eq!(pruned_score, full_score, "value diverged at depth {depth}");
            assert_eq!(
                pruned.chosen_move(),
                full.chosen_move(),
                "root move diverged at depth {depth}"
            );
            assert!(
                pruned.minimax().nodes() <= full.minimax().nodes(),
                "pruning should never visit more nodes"
            );
        }
    }
}

#[test]
fn timed_variant_matches_untimed_semantics() {
    let mut a = MiniState::initial();
    let mut b = MiniState::initial();
    let mut plain = Engine::with_seed(MiniChess, 7);
    let mut timed = Engine::with_seed(MiniChess, 7);
    let s1 = plain.run_minimax(&mut a, 3);
    let s2 = timed.run_minimax_timed(&mut b, 3);
    assert_eq!(s1, s2);
    assert_eq!(plain.chosen_move(), timed.chosen_move());
    assert!(timed.minimax().last_elapsed().is_some());
}
