//! Running counters for the filtering pass, and their report tables.

use std::fmt::{self, Display, Formatter};

use crate::{
    filter::{Decision, DiscardReason},
    record::PositionRecord,
};

/// Counters accumulated over one pass. They only ever go up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub games: u64,
    pub standard_games: u64,
    pub non_standard_games: u64,
    pub positions: u64,
    discards: [u64; DiscardReason::ALL.len()],
}

impl FilterStats {
    /// Counts a record and the decision made about it.
    pub fn tally(&mut self, record: &PositionRecord, decision: Decision) {
        if record.is_game_start() {
            self.games += 1;
            if record.is_standard_start() {
                self.standard_games += 1;
            } else {
                self.non_standard_games += 1;
            }
        }
        if let Decision::Discard(reason) = decision {
            self.discards[reason.index()] += 1;
        }
        self.positions += 1;
    }

    pub const fn discarded(&self, reason: DiscardReason) -> u64 {
        self.discards[reason.index()]
    }

    pub fn filtered_out(&self) -> u64 {
        self.discards.iter().sum()
    }

    pub fn kept(&self) -> u64 {
        self.positions - self.filtered_out()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn kept_percentage(&self) -> f64 {
        if self.positions == 0 {
            return 0.0;
        }
        self.kept() as f64 / self.positions as f64 * 100.0
    }
}

impl Display for FilterStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  # games:                       {:8}", self.games)?;
        writeln!(f, "    # standard games:            {:8}", self.standard_games)?;
        writeln!(f, "    # non-standard games:        {:8}", self.non_standard_games)?;
        writeln!(f, "  # positions:                   {:8}", self.positions)?;
        for reason in DiscardReason::ALL {
            let label = format!("# {reason}:");
            writeln!(f, "    {label:<29}{:8}", self.discarded(reason))?;
        }
        writeln!(f, "  # positions after filtering:   {:8}", self.kept())?;
        write!(f, "    % positions kept:            {:8.1}", self.kept_percentage())
    }
}

/// Game and position counts without any filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameCounts {
    pub games: u64,
    pub standard_games: u64,
    pub non_standard_games: u64,
    pub positions: u64,
}

impl GameCounts {
    pub fn tally(&mut self, record: &PositionRecord) {
        if record.is_game_start() {
            self.games += 1;
            if record.is_standard_start() {
                self.standard_games += 1;
            } else {
                self.non_standard_games += 1;
            }
        }
        self.positions += 1;
    }
}

impl Display for GameCounts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  # games:                 {:8}", self.games)?;
        writeln!(f, "    # standard games:      {:8}", self.standard_games)?;
        writeln!(f, "    # non-standard games:  {:8}", self.non_standard_games)?;
        write!(f, "  # positions:             {:8}", self.positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn record(line: &str) -> PositionRecord {
        line.parse().unwrap()
    }

    #[test]
    fn every_record_counts_once() {
        let mut stats = FilterStats::default();
        let start = record(&format!("0,{STARTPOS},e2e4,20,1-0,sf,e2e4,20"));
        let later = record(&format!("31,{STARTPOS},e2e4,20,1-0,sf,e2e4,20"));
        stats.tally(&start, Decision::Discard(DiscardReason::StartPosition));
        stats.tally(&later, Decision::Discard(DiscardReason::OneGoodMove));
        stats.tally(&later, Decision::Keep);
        assert_eq!(stats.games, 1);
        assert_eq!(stats.positions, 3);
        assert_eq!(stats.filtered_out(), 2);
        assert_eq!(stats.kept(), 1);
        assert_eq!(stats.discarded(DiscardReason::OneGoodMove), 1);
        assert_eq!(stats.discarded(DiscardReason::InCheck), 0);
    }

    #[test]
    fn non_standard_games() {
        let mut counts = GameCounts::default();
        counts.tally(&record(
            "0,nrbbqkrn/pppppppp/8/8/8/8/PPPPPPPP/NRBBQKRN w KQkq - 0 1,e2e4,20,1-0,sf,e2e4,20",
        ));
        counts.tally(&record(&format!("0,{STARTPOS},e2e4,20,1-0,sf,e2e4,20")));
        counts.tally(&record(&format!("1,{STARTPOS},e2e4,20,1-0,sf,e2e4,20")));
        assert_eq!(counts.games, 2);
        assert_eq!(counts.standard_games, 1);
        assert_eq!(counts.non_standard_games, 1);
        assert_eq!(counts.positions, 3);
    }

    #[test]
    fn report_mentions_every_reason() {
        let report = FilterStats::default().to_string();
        for reason in DiscardReason::ALL {
            assert!(report.contains(reason.label()), "missing {reason} in\n{report}");
        }
        assert!(report.ends_with("0.0"));
    }
}
