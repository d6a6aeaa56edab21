use std::fmt::{self, Display};

use shakmaty::{
    fen::Fen, uci::UciMove, CastlingMode, Chess, EnPassantMode, Move, Position as _,
};

use crate::errors::RecordError;

/// Whether a move in coordinate notation carries a promotion suffix.
pub fn is_promotion_uci(uci: &str) -> bool {
    uci.len() == 5 && matches!(uci.as_bytes()[4], b'n' | b'b' | b'r' | b'q')
}

/// A legal chess position, as read from a FEN string.
#[derive(Debug, Clone)]
pub struct Board {
    pos: Chess,
    mode: CastlingMode,
}

impl Board {
    /// Parses a FEN. Castling rights that only make sense with the rooks off
    /// their standard squares are read as Chess960 rights.
    pub fn from_fen(fen: &str) -> Result<Self, RecordError> {
        let invalid = |reason: String| RecordError::InvalidFen { fen: fen.to_string(), reason };
        let parsed = fen.trim().parse::<Fen>().map_err(|e| invalid(e.to_string()))?;
        match parsed.clone().into_position::<Chess>(CastlingMode::Standard) {
            Ok(pos) => Ok(Self { pos, mode: CastlingMode::Standard }),
            Err(standard) => parsed
                .into_position::<Chess>(CastlingMode::Chess960)
                .map(|pos| Self { pos, mode: CastlingMode::Chess960 })
                .map_err(|_| invalid(standard.to_string())),
        }
    }

    /// Renders the position as a FEN, writing the en passant square only when
    /// an en passant capture is actually legal.
    pub fn fen(&self) -> String {
        Fen::from_setup(self.pos.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    /// Resolves a coordinate-notation move against this position.
    pub fn parse_move(&self, uci: &str) -> Result<Move, RecordError> {
        let uci_move =
            uci.parse::<UciMove>().map_err(|_| RecordError::InvalidMove(uci.to_string()))?;
        uci_move
            .to_move(&self.pos)
            .map_err(|_| RecordError::IllegalMove { mv: uci.to_string(), fen: self.fen() })
    }

    pub fn is_capture(&self, uci: &str) -> Result<bool, RecordError> {
        Ok(self.parse_move(uci)?.is_capture())
    }

    /// All legal moves, ordered by piece kind, then source square, then
    /// destination square, then promotion kind.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = self.pos.legal_moves().into_iter().collect::<Vec<_>>();
        moves.sort_by_key(|m| (m.role(), m.from(), m.to(), m.promotion()));
        moves
    }

    /// The position reached by playing `mv`, which must be legal here.
    pub fn play(&self, mv: &Move) -> Self {
        let mut pos = self.pos.clone();
        pos.play_unchecked(mv);
        Self { pos, mode: self.mode }
    }

    /// Coordinate notation for a move in this position. Castling is written
    /// king-to-destination, or king-takes-rook for Chess960 positions.
    pub fn uci(&self, mv: &Move) -> String {
        mv.to_uci(self.mode).to_string()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}
