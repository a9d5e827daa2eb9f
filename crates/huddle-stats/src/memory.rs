// Fixture-backed provider for tests and offline demos.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::derive;
use crate::provider::{DefenseRecord, Game, ProviderError, SeasonalRecord, StatsProvider, WeeklyRecord};

/// Which provider operation a fixture or failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Weekly,
    Seasonal,
    Schedules,
    Defense,
}

impl Endpoint {
    fn label(&self) -> &'static str {
        match self {
            Endpoint::Weekly => "weekly stats",
            Endpoint::Seasonal => "seasonal stats",
            Endpoint::Schedules => "schedules",
            Endpoint::Defense => "defense stats",
        }
    }
}

#[derive(Default)]
struct CallCounts {
    weekly: AtomicUsize,
    seasonal: AtomicUsize,
    schedules: AtomicUsize,
    defense: AtomicUsize,
}

/// In-memory `StatsProvider`.
///
/// Seasons without fixtures return empty tables. Seasonal and defense tables
/// are derived from the weekly fixtures unless set explicitly.
#[derive(Default)]
pub struct InMemoryProvider {
    weekly: HashMap<u16, Arc<Vec<WeeklyRecord>>>,
    seasonal: HashMap<u16, Arc<Vec<SeasonalRecord>>>,
    schedules: HashMap<u16, Arc<Vec<Game>>>,
    defense: HashMap<u16, Arc<Vec<DefenseRecord>>>,
    failing: HashSet<(Endpoint, u16)>,
    calls: CallCounts,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weekly(mut self, season: u16, rows: Vec<WeeklyRecord>) -> Self {
        self.weekly.insert(season, Arc::new(rows));
        self
    }

    pub fn with_seasonal(mut self, season: u16, rows: Vec<SeasonalRecord>) -> Self {
        self.seasonal.insert(season, Arc::new(rows));
        self
    }

    pub fn with_schedules(mut self, season: u16, games: Vec<Game>) -> Self {
        self.schedules.insert(season, Arc::new(games));
        self
    }

    pub fn with_defense(mut self, season: u16, rows: Vec<DefenseRecord>) -> Self {
        self.defense.insert(season, Arc::new(rows));
        self
    }

    /// Make `endpoint` fail for `season` as if the upstream were down.
    pub fn failing(mut self, endpoint: Endpoint, season: u16) -> Self {
        self.failing.insert((endpoint, season));
        self
    }

    /// How many times `endpoint` has been called.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.counter(endpoint).load(Ordering::SeqCst)
    }

    fn counter(&self, endpoint: Endpoint) -> &AtomicUsize {
        match endpoint {
            Endpoint::Weekly => &self.calls.weekly,
            Endpoint::Seasonal => &self.calls.seasonal,
            Endpoint::Schedules => &self.calls.schedules,
            Endpoint::Defense => &self.calls.defense,
        }
    }

    fn enter(&self, endpoint: Endpoint, season: u16) -> Result<(), ProviderError> {
        self.counter(endpoint).fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&(endpoint, season)) {
            return Err(ProviderError::Unavailable {
                what: endpoint.label(),
                season,
            });
        }
        Ok(())
    }

    fn weekly_rows(&self, season: u16) -> Arc<Vec<WeeklyRecord>> {
        self.weekly.get(&season).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl StatsProvider for InMemoryProvider {
    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyRecord>>, ProviderError> {
        self.enter(Endpoint::Weekly, season)?;
        Ok(self.weekly_rows(season))
    }

    async fn seasonal_stats(&self, season: u16) -> Result<Arc<Vec<SeasonalRecord>>, ProviderError> {
        self.enter(Endpoint::Seasonal, season)?;
        Ok(match self.seasonal.get(&season) {
            Some(rows) => Arc::clone(rows),
            None => Arc::new(derive::seasonal_from_weekly(&self.weekly_rows(season))),
        })
    }

    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError> {
        self.enter(Endpoint::Schedules, season)?;
        Ok(self.schedules.get(&season).cloned().unwrap_or_default())
    }

    async fn defense_stats(&self, season: u16) -> Result<Arc<Vec<DefenseRecord>>, ProviderError> {
        self.enter(Endpoint::Defense, season)?;
        Ok(match self.defense.get(&season) {
            Some(rows) => Arc::clone(rows),
            None => Arc::new(derive::defense_from_weekly(&self.weekly_rows(season))),
        })
    }
}
