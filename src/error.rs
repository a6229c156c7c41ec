use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A rollout handed backpropagation a result outside {-1, 0, 1}.
    /// This is an internal contract violation and aborts the search.
    #[error("rollout result {0} is not one of -1 (black win), 0 (draw), 1 (white win)")]
    RolloutContract(i8),
}
