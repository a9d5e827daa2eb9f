// Failure and abstention types for the projection pipeline.

use std::fmt;

use huddle_stats::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The stats provider could not supply a table (transport or parse failure).
    #[error("stats data unavailable: {0}")]
    DataUnavailable(#[from] ProviderError),

    /// The player's team could not be resolved from their weekly rows.
    #[error("player `{player}` has no weekly rows for {season}")]
    PlayerNotFound { player: String, season: u16 },

    /// Position outside RB/WR/TE.
    #[error("unsupported position `{0}`")]
    UnsupportedPosition(String),
}

/// Why no projection was produced. This is a legitimate outcome, not a
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Abstention {
    /// The player has no seasonal row, so their position is unknown.
    UnknownPlayer,
    /// Fewer weekly rows than the minimum sample across both seasons.
    InsufficientSample { found: usize, required: usize },
    UnsupportedPosition(String),
    /// No current-season weekly row to take the team from.
    TeamNotResolved,
    /// Defense allowed data could not be loaded.
    DefenseUnavailable,
}

impl fmt::Display for Abstention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abstention::UnknownPlayer => f.write_str("player not found in seasonal data"),
            Abstention::InsufficientSample { found, required } => {
                write!(f, "insufficient data ({found} of {required} weekly games)")
            }
            Abstention::UnsupportedPosition(pos) => write!(f, "unsupported position `{pos}`"),
            Abstention::TeamNotResolved => f.write_str("current team could not be resolved"),
            Abstention::DefenseUnavailable => f.write_str("defense data unavailable"),
        }
    }
}
