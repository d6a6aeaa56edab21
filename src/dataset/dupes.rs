//! Duplicate-placement statistics for a position dump.

use std::fmt::{self, Display, Formatter};

use fxhash::FxHashSet;

use crate::{record::PositionRecord, stats::GameCounts};

/// Ply ranges reported separately. They overlap on purpose: a ply-30
/// position counts towards all three "above" buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyBucket {
    Above28,
    Above24,
    Above20,
    UpTo20,
}

impl PlyBucket {
    pub const ALL: [Self; 4] = [Self::Above28, Self::Above24, Self::Above20, Self::UpTo20];

    pub const fn contains(self, ply: u32) -> bool {
        match self {
            Self::Above28 => ply > 28,
            Self::Above24 => ply > 24,
            Self::Above20 => ply > 20,
            Self::UpTo20 => ply <= 20,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Above28 => "ply > 28",
            Self::Above24 => "ply > 24",
            Self::Above20 => "ply > 20",
            Self::UpTo20 => "ply <= 20",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub positions: u64,
    pub unique: u64,
}

/// Counts how often piece placements repeat across a dump.
///
/// A position is unique if its placement had not been seen anywhere earlier
/// in the file, regardless of which bucket the earlier sighting fell in.
#[derive(Debug, Default)]
pub struct DupeStats {
    seen: FxHashSet<String>,
    pub games: GameCounts,
    pub unique: u64,
    buckets: [BucketCounts; PlyBucket::ALL.len()],
}

impl DupeStats {
    pub fn tally(&mut self, record: &PositionRecord) {
        self.games.tally(record);

        let placement = record.placement();
        let is_new = !self.seen.contains(placement);
        if is_new {
            self.seen.insert(placement.to_string());
            self.unique += 1;
        }

        for (bucket, counts) in PlyBucket::ALL.into_iter().zip(self.buckets.iter_mut()) {
            if bucket.contains(record.ply) {
                counts.positions += 1;
                counts.unique += u64::from(is_new);
            }
        }
    }

    pub const fn positions(&self) -> u64 {
        self.games.positions
    }

    pub const fn bucket(&self, bucket: PlyBucket) -> BucketCounts {
        self.buckets[bucket as usize]
    }
}

#[allow(clippy::cast_precision_loss)]
fn fraction(part: u64, whole: u64) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

impl Display for DupeStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  # standard games:           {}", self.games.standard_games)?;
        writeln!(f, "  # non-standard games:       {}", self.games.non_standard_games)?;
        writeln!(f, "  # positions:                {}", self.positions())?;
        writeln!(f, "    # unique:                 {}", self.unique)?;
        write!(f, "    % unique:                 {:.2}", fraction(self.unique, self.positions()))?;
        for bucket in PlyBucket::ALL {
            let counts = self.bucket(bucket);
            let label = format!("# positions {}:", bucket.label());
            writeln!(f)?;
            writeln!(f, "  {label:<26}{}", counts.positions)?;
            writeln!(f, "    # unique:                 {}", counts.unique)?;
            write!(f, "    % unique:                 {:.2}", fraction(counts.unique, counts.positions))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    fn record(ply: u32, fen: &str) -> PositionRecord {
        format!("{ply},{fen},e2e4,0,1-0,sf,e2e4,0").parse().unwrap()
    }

    #[test]
    fn repeats_are_not_unique() {
        let mut stats = DupeStats::default();
        stats.tally(&record(0, STARTPOS));
        stats.tally(&record(1, AFTER_E4));
        stats.tally(&record(0, STARTPOS));
        // same placement, different side to move: still a repeat
        stats.tally(&record(30, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1"));

        assert_eq!(stats.positions(), 4);
        assert_eq!(stats.unique, 2);
        assert_eq!(stats.games.games, 2);
        assert_eq!(stats.games.standard_games, 2);
        assert_eq!(stats.bucket(PlyBucket::UpTo20), BucketCounts { positions: 3, unique: 2 });
        assert_eq!(stats.bucket(PlyBucket::Above28), BucketCounts { positions: 1, unique: 0 });
        assert_eq!(stats.bucket(PlyBucket::Above20), BucketCounts { positions: 1, unique: 0 });
    }

    #[test]
    fn overlapping_buckets() {
        let mut stats = DupeStats::default();
        stats.tally(&record(26, STARTPOS));
        assert_eq!(stats.bucket(PlyBucket::Above28).positions, 0);
        assert_eq!(stats.bucket(PlyBucket::Above24), BucketCounts { positions: 1, unique: 1 });
        assert_eq!(stats.bucket(PlyBucket::Above20), BucketCounts { positions: 1, unique: 1 });
        assert_eq!(stats.bucket(PlyBucket::UpTo20).positions, 0);
    }

    #[test]
    fn empty_report_does_not_divide_by_zero() {
        let report = DupeStats::default().to_string();
        assert!(report.contains("# positions ply <= 20:"));
        assert!(!report.contains("NaN"));
    }
}
