use std::{fmt::Display, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    board::{is_promotion_uci, Board},
    errors::{ConfigError, RecordError},
    record::PositionRecord,
    stats::FilterStats,
};

/// Positions at or below this ply are too close to the opening to train on.
pub const EARLY_PLY_LIMIT: u32 = 28;
/// Scores with a magnitude below this are treated as roughly equal.
pub const EQUAL_SCORE_LIMIT: i32 = 110;
/// Scores with a magnitude above this are treated as a clear advantage.
pub const DECISIVE_SCORE_LIMIT: i32 = 200;

/// Why a position was thrown away. Variants are listed in the order the
/// filter checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    StartPosition,
    EarlyPly,
    InCheck,
    BestMoveCapture,
    BestMovePromotion,
    AltMoveTactical,
    OneGoodMove,
}

impl DiscardReason {
    pub const ALL: [Self; 7] = [
        Self::StartPosition,
        Self::EarlyPly,
        Self::InCheck,
        Self::BestMoveCapture,
        Self::BestMovePromotion,
        Self::AltMoveTactical,
        Self::OneGoodMove,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::StartPosition => "start positions",
            Self::EarlyPly => "early plies",
            Self::InCheck => "in check",
            Self::BestMoveCapture => "bestmove captures",
            Self::BestMovePromotion => "bestmove promos",
            Self::AltMoveTactical => "alt move 1 cap promo",
            Self::OneGoodMove => "one good move",
        }
    }
}

impl Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Discard(DiscardReason),
}

impl Decision {
    pub const fn is_discard(self) -> bool {
        matches!(self, Self::Discard(_))
    }
}

/// Policy thresholds for the filter. Any key missing from a config file
/// takes its default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub early_ply_limit: u32,
    pub equal_score_limit: i32,
    pub decisive_score_limit: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            early_ply_limit: EARLY_PLY_LIMIT,
            equal_score_limit: EQUAL_SCORE_LIMIT,
            decisive_score_limit: DECISIVE_SCORE_LIMIT,
        }
    }
}

impl FilterConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.equal_score_limit > config.decisive_score_limit {
            return Err(ConfigError::Thresholds {
                equal: config.equal_score_limit,
                decisive: config.decisive_score_limit,
            });
        }
        Ok(config)
    }
}

impl Display for FilterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "early ply limit {}, equal score limit {}, decisive score limit {}",
            self.early_ply_limit, self.equal_score_limit, self.decisive_score_limit
        )
    }
}

/// Decides which positions are worth keeping as training samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filter {
    config: FilterConfig,
}

impl Filter {
    pub const fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Classifies a record and tallies the outcome into `stats`.
    pub fn apply(
        &self,
        record: &PositionRecord,
        stats: &mut FilterStats,
    ) -> Result<Decision, RecordError> {
        let decision = self.classify(record)?;
        stats.tally(record, decision);
        Ok(decision)
    }

    /// Runs the checks in priority order; the first one that matches decides.
    pub fn classify(&self, record: &PositionRecord) -> Result<Decision, RecordError> {
        use DiscardReason::*;

        if record.is_game_start() {
            return Ok(Decision::Discard(StartPosition));
        }
        if record.ply <= self.config.early_ply_limit {
            return Ok(Decision::Discard(EarlyPly));
        }

        let board = Board::from_fen(&record.fen)?;
        if board.is_check() {
            return Ok(Decision::Discard(InCheck));
        }
        if board.is_capture(&record.best_move)? {
            return Ok(Decision::Discard(BestMoveCapture));
        }
        if is_promotion_uci(&record.best_move) {
            return Ok(Decision::Discard(BestMovePromotion));
        }
        if let Some(alt) = &record.alt_move_1 {
            if board.is_capture(alt)? || is_promotion_uci(alt) {
                return Ok(Decision::Discard(AltMoveTactical));
            }
        }
        if let Some((s1, s2)) = record.alt_scores()? {
            if self.one_good_move(s1, s2) {
                return Ok(Decision::Discard(OneGoodMove));
            }
        }

        Ok(Decision::Keep)
    }

    /// Whether the top two candidate scores diverge enough that the position
    /// only has a single reasonable move.
    fn one_good_move(&self, s1: i32, s2: i32) -> bool {
        let equal = i64::from(self.config.equal_score_limit);
        let decisive = i64::from(self.config.decisive_score_limit);
        let (a1, a2) = (i64::from(s1).abs(), i64::from(s2).abs());

        // about equal, second choice loses
        (a1 < equal && a2 > decisive)
            // winning, second choice only equalises
            || (a1 > decisive && a2 < equal)
            // winning, second choice loses outright
            || (a1 > decisive && a2 > decisive && (s1 > 0) != (s2 > 0))
    }
}
