use crate::types::{Move, Side, Square};

/// The rules-engine contract the search core depends on. The board
/// representation, legality, check detection and static evaluation all live
/// behind this trait; the search core only mutates states through
/// `apply_move` and restores them by overwriting with snapshots.
///
/// `State` clones must be deep and independent: a cloned state shares no
/// mutable sub-structure with the original, so overwriting one never
/// disturbs the other.
pub trait RulesEngine {
    type State: Clone + PartialEq;

    /// All legal moves for `side` in `state`. Order only matters for
    /// tie-breaking (first encountered wins), never for correctness.
    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Move>;

    /// Apply `mv` to `state`. Returns whether the move was legally applied.
    fn apply_move(&self, state: &mut Self::State, mv: &Move) -> bool;

    fn is_checkmate(&self, state: &Self::State) -> bool;

    /// Move-count draw rule (fifty-move or the variant's equivalent).
    fn is_draw_by_move_count(&self, state: &Self::State) -> bool;

    /// Static evaluation; positive favors White.
    fn evaluate(&self, state: &Self::State) -> i32;

    fn side_to_move(&self, state: &Self::State) -> Side;

    fn king_square(&self, state: &Self::State, side: Side) -> Square;

    /// Value of whatever occupies `sq` (0 for an empty square).
    fn square_value(&self, state: &Self::State, sq: Square) -> i32;

    /// The most recently applied move, if any.
    fn last_move(&self, state: &Self::State) -> Option<Move>;

    /// Record that `state` ended in stalemate. Engines call this when a side
    /// has no legal moves without being checkmated; rules engines that do not
    /// track the flag can ignore it.
    fn mark_stalemate(&self, _state: &mut Self::State) {}
}
