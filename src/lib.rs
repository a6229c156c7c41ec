// Game-tree search core: snapshot stack, alpha-beta minimax, and MCTS over
// an injected rules engine.
pub mod board;
pub mod engine;
pub mod error;
pub mod mcts;
pub mod rules;
pub mod search;
pub mod snapshot;
pub mod types;

// Re-exports kept minimal
pub use engine::Engine;
pub use error::EngineError;
pub use rules::RulesEngine;
pub use types::{Move, MoveTags, Side, Square};
