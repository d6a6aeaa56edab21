use thiserror::Error;

/// Problems with a single CSV row. All of these are fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected 8 or 10 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {field} field {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("invalid move {0:?}")]
    InvalidMove(String),
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

/// Problems with a filter configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read filter config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse filter config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("filter config is inconsistent: equal_score_limit ({equal}) exceeds decisive_score_limit ({decisive})")]
    Thresholds { equal: i32, decisive: i32 },
}
