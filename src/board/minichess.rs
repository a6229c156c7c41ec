//! A complete, tiny rules engine used by the demo binary, integration tests
//! and benches: 4x4 board, king + rook + two pawns per side. Standard check,
//! checkmate and stalemate rules; pawns promote to rooks on the last rank;
//! draws by a 20-halfmove clock (no capture or pawn move). Not a serious
//! game, just a full `RulesEngine` implementation small enough to read.

use crate::rules::RulesEngine;
use crate::types::{Move, MoveTags, Side, Square};
use std::fmt;

pub const SIZE: i8 = 4;
/// Halfmoves without a capture or pawn move before the game is drawn.
pub const DRAW_CLOCK: u8 = 20;
/// Opaque promotion payload carried in `MoveTags::promotion`.
pub const PROMOTE_ROOK: u8 = 1;

const PAWN: i32 = 100;
const ROOK: i32 = 500;
const KING: i32 = 10_000;
pub const MATE_SCORE: i32 = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    King,
    Rook,
    Pawn,
}

impl Kind {
    fn value(self) -> i32 {
        match self {
            Kind::King => KING,
            Kind::Rook => ROOK,
            Kind::Pawn => PAWN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Piece {
    side: Side,
    kind: Kind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiniState {
    board: [[Option<Piece>; SIZE as usize]; SIZE as usize],
    turn: Side,
    halfmove_clock: u8,
    last_move: Option<Move>,
    stalemate: bool,
}

impl MiniState {
    /// Starting position:
    /// ```text
    /// 4  r k p .
    /// 3  . p p .
    /// 2  . P P .
    /// 1  . . K R
    /// a b c d (mirrored per side)
    /// ```
    pub fn initial() -> Self {
        let mut s = Self::empty(Side::White);
        s.place(Square::new(0, 2), Side::White, Kind::King);
        s.place(Square::new(0, 3), Side::White, Kind::Rook);
        s.place(Square::new(1, 1), Side::White, Kind::Pawn);
        s.place(Square::new(1, 2), Side::White, Kind::Pawn);
        s.place(Square::new(3, 1), Side::Black, Kind::King);
        s.place(Square::new(3, 0), Side::Black, Kind::Rook);
        s.place(Square::new(2, 1), Side::Black, Kind::Pawn);
        s.place(Square::new(2, 2), Side::Black, Kind::Pawn);
        s
    }

    /// Empty board with `turn` to move, for building test positions.
    pub fn empty(turn: Side) -> Self {
        Self {
            board: Default::default(),
            turn,
            halfmove_clock: 0,
            last_move: None,
            stalemate: false,
        }
    }

    pub fn place(&mut self, sq: Square, side: Side, kind: Kind) {
        self.board[sq.row as usize][sq.col as usize] = Some(Piece { side, kind });
    }

    fn piece(&self, sq: Square) -> Option<Piece> {
        self.board[sq.row as usize][sq.col as usize]
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn halfmove_clock(&self) -> u8 {
        self.halfmove_clock
    }

    pub fn is_stalemate_marked(&self) -> bool {
        self.stalemate
    }
}

impl fmt::Display for MiniState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..SIZE).rev() {
            write!(f, "{} ", row + 1)?;
            for col in 0..SIZE {
                let c = match self.piece(Square::new(row, col)) {
                    Some(Piece { side: Side::White, kind: Kind::King }) => 'K',
                    Some(Piece { side: Side::White, kind: Kind::Rook }) => 'R',
                    Some(Piece { side: Side::White, kind: Kind::Pawn }) => 'P',
                    Some(Piece { side: Side::Black, kind: Kind::King }) => 'k',
                    Some(Piece { side: Side::Black, kind: Kind::Rook }) => 'r',
                    Some(Piece { side: Side::Black, kind: Kind::Pawn }) => 'p',
                    None => '.',
                };
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d")
    }
}

fn on_board(row: i8, col: i8) -> bool {
    (0..SIZE).contains(&row) && (0..SIZE).contains(&col)
}

fn promo_row(side: Side) -> i8 {
    if side.is_white() {
        SIZE - 1
    } else {
        0
    }
}

fn pawn_dir(side: Side) -> i8 {
    if side.is_white() {
        1
    } else {
        -1
    }
}

/// The rules engine itself is stateless; everything lives in `MiniState`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MiniChess;

impl MiniChess {
    fn pseudo_moves(&self, state: &MiniState, side: Side) -> Vec<Move> {
        let mut out = Vec::new();
        for row in 0..SIZE {
            for col in 0..SIZE {
                let from = Square::new(row, col);
                let Some(piece) = state.piece(from) else { continue };
                if piece.side != side {
                    continue;
                }
                match piece.kind {
                    Kind::King => {
                        for dr in -1..=1 {
                            for dc in -1..=1 {
                                if dr == 0 && dc == 0 {
                                    continue;
                                }
                                let (r, c) = (row + dr, col + dc);
                                if !on_board(r, c) {
                                    continue;
                                }
                                let to = Square::new(r, c);
                                if state.piece(to).map_or(true, |p| p.side != side) {
                                    out.push(Move::new(from, to));
                                }
                            }
                        }
                    }
                    Kind::Rook => {
                        for (dr, dc) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                            let (mut r, mut c) = (row + dr, col + dc);
                            while on_board(r, c) {
                                let to = Square::new(r, c);
                                match state.piece(to) {
                                    None => out.push(Move::new(from, to)),
                                    Some(p) => {
                                        if p.side != side {
                                            out.push(Move::new(from, to));
                                        }
                                        break;
                                    }
                                }
                                r += dr;
                                c += dc;
                            }
                        }
                    }
                    Kind::Pawn => {
                        let dir = pawn_dir(side);
                        let fwd = Square::new(row + dir, col);
                        if on_board(fwd.row, fwd.col) && state.piece(fwd).is_none() {
                            out.push(pawn_move(side, from, fwd));
                        }
                        for dc in [-1, 1] {
                            let (r, c) = (row + dir, col + dc);
                            if !on_board(r, c) {
                                continue;
                            }
                            let to = Square::new(r, c);
                            if state.piece(to).map_or(false, |p| p.side != side) {
                                out.push(pawn_move(side, from, to));
                            }
                        }
                    }
                }
            }
        }
        out
    }

    fn square_attacked(&self, state: &MiniState, target: Square, by: Side) -> bool {
        for row in 0..SIZE {
            for col in 0..SIZE {
                let from = Square::new(row, col);
                let Some(piece) = state.piece(from) else { continue };
                if piece.side != by || from == target {
                    continue;
                }
                let hit = match piece.kind {
                    Kind::King => {
                        (row - target.row).abs() <= 1 && (col - target.col).abs() <= 1
                    }
                    Kind::Pawn => {
                        target.row == row + pawn_dir(by) && (target.col - col).abs() == 1
                    }
                    Kind::Rook => self.rook_reaches(state, from, target),
                };
                if hit {
                    return true;
                }
            }
        }
        false
    }

    fn rook_reaches(&self, state: &MiniState, from: Square, target: Square) -> bool {
        if from.row != target.row && from.col != target.col {
            return false;
        }
        let dr = (target.row - from.row).signum();
        let dc = (target.col - from.col).signum();
        let (mut r, mut c) = (from.row + dr, from.col + dc);
        while (r, c) != (target.row, target.col) {
            if state.piece(Square::new(r, c)).is_some() {
                return false;
            }
            r += dr;
            c += dc;
        }
        true
    }

    fn in_check(&self, state: &MiniState, side: Side) -> bool {
        let king = self.king_square(state, side);
        on_board(king.row, king.col) && self.square_attacked(state, king, side.opponent())
    }

    /// Perform `mv` without legality checks; callers validate first.
    fn apply_unchecked(&self, state: &mut MiniState, mv: Move) {
        let Some(mut piece) = state.piece(mv.present) else { return };
        let capture = state.piece(mv.future).is_some();
        let pawn_move = piece.kind == Kind::Pawn;
        if pawn_move && mv.tags.promotion == Some(PROMOTE_ROOK) {
            piece.kind = Kind::Rook;
        }
        state.board[mv.present.row as usize][mv.present.col as usize] = None;
        state.board[mv.future.row as usize][mv.future.col as usize] = Some(piece);
        state.halfmove_clock = if capture || pawn_move {
            0
        } else {
            state.halfmove_clock + 1
        };
        state.last_move = Some(mv);
        state.turn = state.turn.opponent();
    }
}

fn pawn_move(side: Side, from: Square, to: Square) -> Move {
    if to.row == promo_row(side) {
        Move::with_tags(from, to, MoveTags { promotion: Some(PROMOTE_ROOK), ..Default::default() })
    } else {
        Move::new(from, to)
    }
}

impl RulesEngine for MiniChess {
    type State = MiniState;

    fn legal_moves(&self, state: &MiniState, side: Side) -> Vec<Move> {
        self.pseudo_moves(state, side)
            .into_iter()
            .filter(|mv| {
                let mut probe = state.clone();
                self.apply_unchecked(&mut probe, *mv);
                !self.in_check(&probe, side)
            })
            .collect()
    }

    fn apply_move(&self, state: &mut MiniState, mv: &Move) -> bool {
        if !self.legal_moves(state, state.turn).contains(mv) {
            return false;
        }
        self.apply_unchecked(state, *mv);
        true
    }

    fn is_checkmate(&self, state: &MiniState) -> bool {
        self.in_check(state, state.turn) && self.legal_moves(state, state.turn).is_empty()
    }

    fn is_draw_by_move_count(&self, state: &MiniState) -> bool {
        state.halfmove_clock >= DRAW_CLOCK
    }

    fn evaluate(&self, state: &MiniState) -> i32 {
        let mut score = 0;
        for row in 0..SIZE {
            for col in 0..SIZE {
                if let Some(piece) = state.piece(Square::new(row, col)) {
                    let v = piece.kind.value();
                    score += if piece.side.is_white() { v } else { -v };
                }
            }
        }
        if self.is_checkmate(state) {
            // The side to move is the mated side.
            score += if state.turn == Side::Black { MATE_SCORE } else { -MATE_SCORE };
        }
        score
    }

    fn side_to_move(&self, state: &MiniState) -> Side {
        state.turn
    }

    fn king_square(&self, state: &MiniState, side: Side) -> Square {
        for row in 0..SIZE {
            for col in 0..SIZE {
                let sq = Square::new(row, col);
                if state.piece(sq) == Some(Piece { side, kind: Kind::King }) {
                    return sq;
                }
            }
        }
        Square::new(-1, -1)
    }

    fn square_value(&self, state: &MiniState, sq: Square) -> i32 {
        if !on_board(sq.row, sq.col) {
            return 0;
        }
        state.piece(sq).map_or(0, |p| p.kind.value())
    }

    fn last_move(&self, state: &MiniState) -> Option<Move> {
        state.last_move
    }

    fn mark_stalemate(&self, state: &mut MiniState) {
        state.stalemate = true;
    }
}
