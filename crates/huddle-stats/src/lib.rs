// Data sources: the historical stats provider seam and its implementations,
// plus the ESPN league client and supplementary CSV data.

pub mod derive;
pub mod espn;
pub mod memory;
pub mod nflverse;
pub mod provider;
pub mod supplement;

pub use memory::{Endpoint, InMemoryProvider};
pub use nflverse::NflverseProvider;
pub use provider::{
    DefenseRecord, Game, ProviderError, SeasonalRecord, StatLine, StatsProvider, WeeklyRecord,
};
