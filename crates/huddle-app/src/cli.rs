use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "huddle")]
#[command(version)]
#[command(about = "Fantasy football projections and league data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// NFL season (defaults to config, then the calendar)
    #[arg(short, long, global = true, env = "HUDDLE_SEASON")]
    pub season: Option<u16>,

    /// Log to stderr instead of logs/huddle.log
    #[arg(long, global = true)]
    pub log_stderr: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Project one player's remaining games
    Project {
        /// Player display name, e.g. "Ja'Marr Chase"
        player: String,
    },
    /// Average projections for many players
    Batch {
        /// Comma-separated player names (default: top players by production)
        #[arg(short, long, value_delimiter = ',')]
        players: Vec<String>,
        /// Maximum projections in flight
        #[arg(short, long)]
        concurrency: Option<usize>,
    },
    /// Players ranked by season receiving yards
    Rank {
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// A player's week-by-week values for one stat
    Series {
        player: String,
        /// Stat name, e.g. receiving_yards
        #[arg(long, default_value = "receiving_yards")]
        stat: String,
    },
    /// Per-team allowed production for a position
    Defense {
        /// RB, WR or TE
        position: String,
    },
    /// ESPN league name
    League,
    /// ESPN league standings
    Standings,
    /// ESPN current-week scoreboard
    Scoreboard,
    /// ESPN free agents
    FreeAgents {
        /// Filter by position (QB, RB, WR, TE, K, D/ST)
        #[arg(short, long)]
        position: Option<String>,
    },
    /// Team air yards and snap-count percentages
    Usage {
        /// Team abbreviation
        team: String,
        /// Only the most recent N weeks
        #[arg(short, long)]
        weeks: Option<usize>,
    },
}
