use serde::{Deserialize, Serialize};
use std::fmt;

/// Side to move. White is the maximizing side by convention: positive
/// evaluations favor White.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Index into per-side counter arrays (White = 0, Black = 1).
    pub fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    pub fn is_white(self) -> bool {
        self == Side::White
    }
}

/// A board coordinate. Row/column ranges are the rules engine's business;
/// the search core only carries squares around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // a1-style coordinates
        write!(f, "{}{}", (b'a' + self.col as u8) as char, self.row + 1)
    }
}

/// Opaque special-move payloads. The rules engine defines what the codes
/// mean (which pawn is captured en passant, which rook castles, what the
/// pawn promotes to); the search core carries them without interpreting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveTags {
    pub en_passant: Option<u8>,
    pub castling: Option<u8>,
    pub promotion: Option<u8>,
}

/// An immutable move value: source square, destination square, and opaque
/// special-move tags. Equality is structural.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub present: Square,
    pub future: Square,
    pub tags: MoveTags,
}

impl Move {
    pub fn new(present: Square, future: Square) -> Self {
        Self { present, future, tags: MoveTags::default() }
    }

    pub fn with_tags(present: Square, future: Square, tags: MoveTags) -> Self {
        Self { present, future, tags }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.present, self.future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_equality_is_structural() {
        let a = Move::new(Square::new(0, 0), Square::new(1, 0));
        let b = Move::new(Square::new(0, 0), Square::new(1, 0));
        assert_eq!(a, b);
        let c = Move::with_tags(
            Square::new(0, 0),
            Square::new(1, 0),
            MoveTags { promotion: Some(3), ..Default::default() },
        );
        assert_ne!(a, c);
    }

    #[test]
    fn move_displays_as_coordinates() {
        let m = Move::new(Square::new(0, 4), Square::new(3, 4));
        assert_eq!(format!("{}", m), "e1e4");
    }
}
