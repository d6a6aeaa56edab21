//! Recovers the move played between consecutive positions of a game.
//!
//! Position dumps store each position of a game independently, so the only
//! move attached to a row is the engine's suggestion. When consecutive rows
//! really are consecutive positions, the move actually played can be found
//! by trying every legal move until one reaches the next row's position.

use std::io::Write;

use crate::{
    board::Board,
    dataset::plain::PlainPosition,
    errors::RecordError,
    filter::Decision,
    record::PositionRecord,
};

/// Score written for filtered-out positions whose played move was recovered,
/// telling the trainer to skip them.
pub const DISCARD_SCORE: i32 = 32002;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairStats {
    pub games: u64,
    pub positions: u64,
    pub moves_recovered: u64,
    pub gaps: u64,
    pub sentinel_scores: u64,
}

impl std::fmt::Display for RepairStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  # games written:               {:8}", self.games)?;
        writeln!(f, "  # positions written:           {:8}", self.positions)?;
        writeln!(f, "    # played moves recovered:    {:8}", self.moves_recovered)?;
        writeln!(f, "    # unconnected positions:     {:8}", self.gaps)?;
        write!(f, "    # sentinel scores:           {:8}", self.sentinel_scores)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    record: PositionRecord,
    discarded: bool,
    played: Option<String>,
    score: i32,
}

/// The buffered positions of the game currently being read.
#[derive(Debug, Default)]
pub struct GameWindow {
    entries: Vec<Entry>,
}

impl GameWindow {
    pub fn push(&mut self, record: PositionRecord, decision: Decision) {
        let score = record.best_move_score;
        self.entries.push(Entry { record, discarded: decision.is_discard(), played: None, score });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fills in the played move for every position that has a successor.
    /// A position with no connecting move keeps its best move and score.
    pub fn reconstruct(&mut self, stats: &mut RepairStats) -> Result<(), RecordError> {
        let boards = self
            .entries
            .iter()
            .map(|entry| Board::from_fen(&entry.record.fen))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, pair) in boards.windows(2).enumerate() {
            let (board, next) = (&pair[0], &pair[1]);
            let target = next.fen();
            let found = board.legal_moves().into_iter().find(|mv| board.play(mv).fen() == target);

            let Some(mv) = found else {
                stats.gaps += 1;
                let (current, following) = (&self.entries[i].record, &self.entries[i + 1].record);
                log::warn!(
                    "no legal move connects ply {} ({}) to ply {} ({}), keeping best move {}",
                    current.ply,
                    current.fen,
                    following.ply,
                    following.fen,
                    current.best_move,
                );
                continue;
            };

            let entry = &mut self.entries[i];
            entry.played = Some(board.uci(&mv));
            stats.moves_recovered += 1;
            if entry.discarded {
                entry.score = DISCARD_SCORE;
                stats.sentinel_scores += 1;
            }
        }

        Ok(())
    }

    /// Writes every buffered position as a plain block and empties the window.
    pub fn write_to(
        &mut self,
        writer: &mut (impl Write + ?Sized),
        stats: &mut RepairStats,
    ) -> std::io::Result<()> {
        for entry in self.entries.drain(..) {
            let position = PlainPosition {
                fen: &entry.record.fen,
                score: entry.score,
                mv: entry.played.as_deref().unwrap_or(&entry.record.best_move),
                ply: entry.record.ply,
                result: &entry.record.game_result,
            };
            position.write_to(writer)?;
            stats.positions += 1;
        }
        stats.games += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DiscardReason;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";

    fn record(ply: u32, fen: &str, best: &str, score: i32) -> PositionRecord {
        format!("{ply},{fen},{best},{score},1-0,sf,{best},{score}").parse().unwrap()
    }

    #[test]
    fn recovers_played_moves() {
        let mut window = GameWindow::default();
        let early = Decision::Discard(DiscardReason::EarlyPly);
        window.push(record(0, STARTPOS, "d2d4", 20), Decision::Discard(DiscardReason::StartPosition));
        window.push(record(1, AFTER_E4, "c7c5", -30), early);
        window.push(record(2, AFTER_E4_E5, "g1f3", 25), Decision::Keep);

        let mut stats = RepairStats::default();
        window.reconstruct(&mut stats).unwrap();
        assert_eq!(stats.moves_recovered, 2);
        assert_eq!(stats.gaps, 0);
        assert_eq!(stats.sentinel_scores, 2);

        let mut out = Vec::new();
        window.write_to(&mut out, &mut stats).unwrap();
        assert!(window.is_empty());
        assert_eq!(stats.positions, 3);
        assert_eq!(stats.games, 1);

        let text = String::from_utf8(out).unwrap();
        let blocks = text.split("e\n").filter(|b| !b.is_empty()).collect::<Vec<_>>();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].contains("move e2e4\n"));
        assert!(blocks[0].contains(&format!("score {DISCARD_SCORE}\n")));
        assert!(blocks[1].contains("move e7e5\n"));
        assert!(blocks[1].contains(&format!("score {DISCARD_SCORE}\n")));
        // last position has no successor, so it keeps its own move and score
        assert!(blocks[2].contains("move g1f3\n"));
        assert!(blocks[2].contains("score 25\n"));
    }

    #[test]
    fn kept_positions_keep_their_score() {
        let mut window = GameWindow::default();
        window.push(record(30, STARTPOS, "d2d4", 20), Decision::Keep);
        window.push(record(31, AFTER_E4, "c7c5", -30), Decision::Keep);

        let mut stats = RepairStats::default();
        window.reconstruct(&mut stats).unwrap();
        assert_eq!(stats.moves_recovered, 1);
        assert_eq!(stats.sentinel_scores, 0);

        let mut out = Vec::new();
        window.write_to(&mut out, &mut stats).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&format!("fen {STARTPOS}\nscore 20\nmove e2e4\nply 30\n")));
    }

    #[test]
    fn unconnected_positions_keep_best_move() {
        let mut window = GameWindow::default();
        let early = Decision::Discard(DiscardReason::EarlyPly);
        window.push(record(1, STARTPOS, "d2d4", 20), early);
        // two plies later, nothing connects them directly
        window.push(record(3, AFTER_E4_E5, "g1f3", 25), early);

        let mut stats = RepairStats::default();
        window.reconstruct(&mut stats).unwrap();
        assert_eq!(stats.moves_recovered, 0);
        assert_eq!(stats.gaps, 1);
        assert_eq!(stats.sentinel_scores, 0);

        let mut out = Vec::new();
        window.write_to(&mut out, &mut stats).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&format!("fen {STARTPOS}\nscore 20\nmove d2d4\n")));
    }

    #[test]
    fn successor_fen_is_compared_after_normalisation() {
        // the dump writes an en passant square even though no capture is possible
        let with_ep = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let mut window = GameWindow::default();
        window.push(record(40, STARTPOS, "d2d4", 20), Decision::Keep);
        window.push(record(41, with_ep, "c7c5", -30), Decision::Keep);

        let mut stats = RepairStats::default();
        window.reconstruct(&mut stats).unwrap();
        assert_eq!(stats.moves_recovered, 1);
    }

    #[test]
    fn bad_fen_is_fatal() {
        let mut window = GameWindow::default();
        window.push(record(40, STARTPOS, "d2d4", 20), Decision::Keep);
        window.push(record(41, "not/a/fen", "c7c5", -30), Decision::Keep);
        let mut stats = RepairStats::default();
        assert!(matches!(window.reconstruct(&mut stats), Err(RecordError::InvalidFen { .. })));
    }
}
