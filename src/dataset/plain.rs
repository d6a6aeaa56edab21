use std::{
    fmt::{self, Display, Formatter},
    io::Write,
};

use crate::record::PositionRecord;

/// One position in the plain text training format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainPosition<'a> {
    pub fen: &'a str,
    pub score: i32,
    pub mv: &'a str,
    pub ply: u32,
    pub result: &'a str,
}

impl<'a> PlainPosition<'a> {
    /// The record as-is, labelled with its best move and that move's score.
    pub fn from_record(record: &'a PositionRecord) -> Self {
        Self {
            fen: &record.fen,
            score: record.best_move_score,
            mv: &record.best_move,
            ply: record.ply,
            result: &record.game_result,
        }
    }

    pub fn write_to(&self, writer: &mut (impl Write + ?Sized)) -> std::io::Result<()> {
        write!(writer, "{self}")
    }
}

impl Display for PlainPosition<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "fen {}", self.fen)?;
        writeln!(f, "score {}", self.score)?;
        writeln!(f, "move {}", self.mv)?;
        writeln!(f, "ply {}", self.ply)?;
        writeln!(f, "result {}", self.result)?;
        writeln!(f, "e")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout() {
        let record: PositionRecord =
            "31,8/5k2/8/8/8/8/5K2/8 b - - 3 60,f7e6,-5,1/2-1/2,sf,f7g6,-4".parse().unwrap();
        let mut out = Vec::new();
        PlainPosition::from_record(&record).write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "fen 8/5k2/8/8/8/8/5K2/8 b - - 3 60\nscore -5\nmove f7e6\nply 31\nresult 1/2-1/2\ne\n"
        );
    }
}
