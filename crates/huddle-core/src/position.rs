// Fantasy positions and the stat categories tracked for them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positions the projection engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FantasyPosition {
    RB,
    WR,
    TE,
}

impl FantasyPosition {
    pub const ALL: [FantasyPosition; 3] = [FantasyPosition::RB, FantasyPosition::WR, FantasyPosition::TE];

    /// Parse a position code (case-insensitive). Returns `None` for anything
    /// outside RB/WR/TE, including QB and K.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "RB" => Some(FantasyPosition::RB),
            "WR" => Some(FantasyPosition::WR),
            "TE" => Some(FantasyPosition::TE),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FantasyPosition::RB => "RB",
            FantasyPosition::WR => "WR",
            FantasyPosition::TE => "TE",
        }
    }

    /// The yardage category a player at this position is projected on.
    pub fn primary_category(&self) -> StatCategory {
        match self {
            FantasyPosition::RB => StatCategory::RushingYards,
            FantasyPosition::WR | FantasyPosition::TE => StatCategory::ReceivingYards,
        }
    }
}

impl fmt::Display for FantasyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Non-PPR counting stats carried on weekly and seasonal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCategory {
    Carries,
    RushingYards,
    RushingTds,
    Receptions,
    Targets,
    ReceivingYards,
    ReceivingTds,
}

impl StatCategory {
    pub const ALL: [StatCategory; 7] = [
        StatCategory::Carries,
        StatCategory::RushingYards,
        StatCategory::RushingTds,
        StatCategory::Receptions,
        StatCategory::Targets,
        StatCategory::ReceivingYards,
        StatCategory::ReceivingTds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatCategory::Carries => "carries",
            StatCategory::RushingYards => "rushing_yards",
            StatCategory::RushingTds => "rushing_tds",
            StatCategory::Receptions => "receptions",
            StatCategory::Targets => "targets",
            StatCategory::ReceivingYards => "receiving_yards",
            StatCategory::ReceivingTds => "receiving_tds",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        StatCategory::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Category used for a player's trend given their raw position code:
    /// receiving yards for WR/TE, rushing yards for everyone else.
    pub fn for_position_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "WR" | "TE" => StatCategory::ReceivingYards,
            _ => StatCategory::RushingYards,
        }
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_positions_only() {
        assert_eq!(FantasyPosition::from_code("rb"), Some(FantasyPosition::RB));
        assert_eq!(FantasyPosition::from_code(" WR "), Some(FantasyPosition::WR));
        assert_eq!(FantasyPosition::from_code("TE"), Some(FantasyPosition::TE));
        assert_eq!(FantasyPosition::from_code("QB"), None);
        assert_eq!(FantasyPosition::from_code(""), None);
    }

    #[test]
    fn category_rule_matches_position_rule() {
        for pos in FantasyPosition::ALL {
            assert_eq!(pos.primary_category(), StatCategory::for_position_code(pos.code()));
        }
        assert_eq!(StatCategory::for_position_code("QB"), StatCategory::RushingYards);
    }

    #[test]
    fn stat_names_round_trip() {
        for cat in StatCategory::ALL {
            assert_eq!(StatCategory::from_name(cat.as_str()), Some(cat));
        }
        assert_eq!(StatCategory::from_name("passing_yards"), None);
    }
}
