use anyhow::Result;
use clap::Parser;
use plybot::board::minichess::{MiniChess, MiniState};
use plybot::engine::{Engine, EngineStats};
use plybot::rules::RulesEngine;
use plybot::types::Side;
use serde::Serialize;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Self-play demo of the plybot search engines on 4x4 mini-chess", long_about = None)]
struct Args {
    /// Engine for White: 'minimax' or 'mcts'
    #[arg(long, default_value = "minimax")]
    white: String,

    /// Engine for Black: 'minimax' or 'mcts'
    #[arg(long, default_value = "mcts")]
    black: String,

    /// Minimax depth limit in ply
    #[arg(long, default_value_t = 4)]
    depth: u32,

    /// MCTS time budget per move, in milliseconds
    #[arg(long, default_value_t = 250)]
    budget_ms: u64,

    /// RNG seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many plies and call the game drawn
    #[arg(long, default_value_t = 60)]
    max_plies: u32,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Print the board after every move
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Minimax,
    Mcts,
}

fn parse_kind(s: &str) -> Result<Kind> {
    match s.to_lowercase().as_str() {
        "minimax" | "ab" => Ok(Kind::Minimax),
        "mcts" => Ok(Kind::Mcts),
        _ => anyhow::bail!("invalid engine '{s}': use 'minimax' or 'mcts'"),
    }
}

#[derive(Debug, Serialize)]
struct GameReport {
    moves: Vec<String>,
    plies: u32,
    result: String,
    white: EngineStats,
    black: EngineStats,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let kinds = [parse_kind(&args.white)?, parse_kind(&args.black)?];
    let budget = Duration::from_millis(args.budget_ms);
    let rules = MiniChess;

    let mut engines = match args.seed {
        Some(seed) => [
            Engine::with_seed(rules, seed),
            Engine::with_seed(rules, seed.wrapping_add(1)),
        ],
        None => [Engine::new(rules), Engine::new(rules)],
    };

    let mut state = MiniState::initial();
    let mut moves: Vec<String> = Vec::new();
    let mut result = String::from("draw (ply limit)");

    println!("{}\n", state);
    for ply in 0..args.max_plies {
        let side = rules.side_to_move(&state);
        let idx = side.index();
        let engine = &mut engines[idx];

        if rules.is_checkmate(&state) {
            result = format!("checkmate, {:?} wins", side.opponent());
            break;
        }
        if rules.is_draw_by_move_count(&state) {
            result = String::from("draw (move-count rule)");
            break;
        }

        let found = match kinds[idx] {
            Kind::Minimax => {
                let score = engine.run_minimax_timed(&mut state, args.depth);
                log::info!("ply {ply}: minimax score {score}");
                engine.chosen_move().is_some()
            }
            Kind::Mcts => engine.run_mcts_timed(&mut state, budget)?,
        };
        if !found || engine.chosen_move().is_none() {
            result = format!("stalemate, {:?} has no move", side);
            break;
        }

        let mv = engine.chosen_move().expect("checked above");
        if !engine.apply_chosen_move(&mut state) {
            anyhow::bail!("engine chose an illegal move: {mv}");
        }
        moves.push(mv.to_string());
        if args.verbose {
            println!("{:?} plays {} (eval {})\n{}\n", side, mv, engine.chosen_eval(), state);
        }
    }

    let report = GameReport {
        plies: moves.len() as u32,
        moves,
        result,
        white: engines[Side::White.index()].stats(),
        black: engines[Side::Black.index()].stats(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}\n", state);
        println!("Result: {} after {} plies", report.result, report.plies);
        println!("Moves: {}", report.moves.join(" "));
    }
    Ok(())
}
