use std::str::FromStr;

use crate::errors::RecordError;

/// Piece placement of the standard chess starting position.
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// One row of a position dump.
///
/// Rows have the fixed field order
/// `ply,fen,bestmove,bestmove_score,result,search_method,alt1,alt1_score[,alt2,alt2_score]`.
/// The alternate scores are kept as text and only read as integers by
/// [`PositionRecord::alt_scores`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub ply: u32,
    pub fen: String,
    pub best_move: String,
    pub best_move_score: i32,
    pub game_result: String,
    pub search_method: String,
    pub alt_move_1: Option<String>,
    pub alt_move_1_score: Option<String>,
    pub alt_move_2: Option<String>,
    pub alt_move_2_score: Option<String>,
}

impl PositionRecord {
    /// Whether this row is the first position of a new game.
    pub const fn is_game_start(&self) -> bool {
        self.ply == 0
    }

    /// The piece-placement field of the FEN.
    pub fn placement(&self) -> &str {
        self.fen.split_whitespace().next().unwrap_or("")
    }

    /// Whether the piece placement is the standard starting arrangement.
    pub fn is_standard_start(&self) -> bool {
        self.placement() == STARTING_PLACEMENT
    }

    /// Both alternate scores as integers, or `None` unless both are present.
    pub fn alt_scores(&self) -> Result<Option<(i32, i32)>, RecordError> {
        match (&self.alt_move_1_score, &self.alt_move_2_score) {
            (Some(s1), Some(s2)) => {
                Ok(Some((parse_int("alt move 1 score", s1)?, parse_int("alt move 2 score", s2)?)))
            }
            _ => Ok(None),
        }
    }
}

fn parse_int<T: FromStr>(field: &'static str, value: &str) -> Result<T, RecordError> {
    value
        .trim()
        .parse()
        .map_err(|_| RecordError::InvalidInteger { field, value: value.to_string() })
}

fn optional_str(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl FromStr for PositionRecord {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields = line.trim().split(',').collect::<Vec<_>>();
        if fields.len() != 8 && fields.len() != 10 {
            return Err(RecordError::FieldCount(fields.len()));
        }

        Ok(Self {
            ply: parse_int("ply", fields[0])?,
            fen: fields[1].to_string(),
            best_move: fields[2].to_string(),
            best_move_score: parse_int("bestmove score", fields[3])?,
            game_result: fields[4].to_string(),
            search_method: fields[5].to_string(),
            alt_move_1: optional_str(Some(fields[6])),
            alt_move_1_score: optional_str(Some(fields[7])),
            alt_move_2: optional_str(fields.get(8).copied()),
            alt_move_2_score: optional_str(fields.get(9).copied()),
        })
    }
}
