// Shared foundations: configuration, caching, season and team reference data.

pub mod cache;
pub mod config;
pub mod names;
pub mod position;
pub mod season;
pub mod team;

pub use cache::TtlCache;
pub use config::{Config, ConfigError};
pub use position::{FantasyPosition, StatCategory};
