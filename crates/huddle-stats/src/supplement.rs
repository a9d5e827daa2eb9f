// Supplementary team usage data loaded from CSV exports: air yards and
// snap-count percentages, one row per team with one column per week.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

const AIR_YARDS_FILE: &str = "ftn_Airyards.csv";
const SNAP_COUNTS_FILE: &str = "snap_count_percentages.csv";

#[derive(Debug, Error)]
pub enum SupplementError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{path} has no `Team` column")]
    MissingTeamColumn { path: PathBuf },
}

/// One team's row: `(column name, value)` pairs for every `Week*` column in
/// file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeries {
    pub team: String,
    pub weeks: Vec<(String, f64)>,
}

impl TeamSeries {
    /// Keep only the last `n` week columns.
    pub fn last_weeks(&self, n: usize) -> TeamSeries {
        let skip = self.weeks.len().saturating_sub(n);
        TeamSeries {
            team: self.team.clone(),
            weeks: self.weeks[skip..].to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamUsage {
    pub air_yards: Vec<TeamSeries>,
    pub snap_counts: Vec<TeamSeries>,
}

pub struct SupplementLoader {
    dir: PathBuf,
}

impl SupplementLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load_air_yards(&self) -> Result<Vec<TeamSeries>, SupplementError> {
        self.load(AIR_YARDS_FILE)
    }

    pub fn load_snap_counts(&self) -> Result<Vec<TeamSeries>, SupplementError> {
        self.load(SNAP_COUNTS_FILE)
    }

    /// Both tables filtered to `team`, optionally trimmed to the most recent
    /// `last_weeks` columns.
    pub fn team_usage(&self, team: &str, last_weeks: Option<usize>) -> Result<TeamUsage, SupplementError> {
        let pick = |rows: Vec<TeamSeries>| -> Vec<TeamSeries> {
            rows.into_iter()
                .filter(|r| r.team == team)
                .map(|r| match last_weeks {
                    Some(n) => r.last_weeks(n),
                    None => r,
                })
                .collect()
        };
        Ok(TeamUsage {
            air_yards: pick(self.load_air_yards()?),
            snap_counts: pick(self.load_snap_counts()?),
        })
    }

    fn load(&self, file_name: &str) -> Result<Vec<TeamSeries>, SupplementError> {
        let path = self.dir.join(file_name);
        let file = std::fs::File::open(&path).map_err(|source| SupplementError::Io {
            path: path.clone(),
            source,
        })?;
        parse_team_series(file, &path)
    }
}

/// Parse a team-by-week CSV. Blank or non-numeric week cells are skipped
/// for that row.
pub fn parse_team_series<R: Read>(rdr: R, path: &Path) -> Result<Vec<TeamSeries>, SupplementError> {
    let csv_err = |source| SupplementError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let team_idx = headers
        .iter()
        .position(|h| h.trim() == "Team")
        .ok_or_else(|| SupplementError::MissingTeamColumn {
            path: path.to_path_buf(),
        })?;
    let week_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim().starts_with("Week"))
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed row in {}: {}", path.display(), e);
                continue;
            }
        };
        let Some(team) = record.get(team_idx).map(str::trim).filter(|t| !t.is_empty()) else {
            continue;
        };
        let weeks = week_cols
            .iter()
            .filter_map(|(i, name)| {
                let value = record.get(*i)?.trim().trim_end_matches('%').parse::<f64>().ok()?;
                Some((name.clone(), value))
            })
            .collect();
        rows.push(TeamSeries {
            team: team.to_string(),
            weeks,
        });
    }
    Ok(rows)
}
