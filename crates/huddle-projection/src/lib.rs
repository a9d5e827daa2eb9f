// Player projection engine: defense strength, player trends, schedules,
// z-score projections and the concurrent batch runner.

pub mod batch;
pub mod defense;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod schedule;
pub mod stats;
pub mod trend;

pub use batch::{project_batch, BatchEntry, BatchReport, Exclusion, ExclusionReason};
pub use defense::{DefenseProfile, DefenseProfiles, LeagueBaseline};
pub use engine::{DefenseCache, ProjectionEngine, ProjectionOutcome, ProjectionResult};
pub use error::{Abstention, ProjectionError};
pub use ranking::rank_players;
pub use schedule::ScheduleEntry;
pub use trend::PlayerTrend;
