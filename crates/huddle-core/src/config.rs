// Configuration loading and parsing (huddle.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("no default for {path}; run from the directory holding defaults/")]
    MissingDefault { path: PathBuf },

    #[error("failed to seed {path}: {source}")]
    Seed {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: SeasonConfig,
    pub projection: ProjectionConfig,
    pub provider: ProviderConfig,
    pub espn: EspnConfig,
    pub supplement: SupplementConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// huddle.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire huddle.toml file.
#[derive(Debug, Clone, Deserialize)]
struct HuddleFile {
    #[serde(default)]
    season: SeasonConfig,
    projection: ProjectionConfig,
    provider: ProviderConfig,
    espn: EspnConfig,
    #[serde(default)]
    supplement: SupplementConfig,
}

/// Season selection. When `year` is omitted the season is resolved from the
/// calendar (see [`crate::season::current_season`]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonConfig {
    #[serde(default)]
    pub year: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    /// Maximum number of player projections in flight at once.
    pub concurrency: usize,
    /// Minimum combined weekly sample (current + prior season) before a
    /// trend is computed.
    pub min_sample: usize,
    /// Size of the default batch when no player list is supplied.
    pub default_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Weekly player stats CSV, with a `{season}` placeholder.
    pub weekly_url: String,
    /// League-wide games CSV (all seasons in one file).
    pub schedules_url: String,
    pub timeout_secs: u64,
    /// How long a downloaded season table stays fresh.
    pub cache_ttl_secs: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Expand the weekly URL template for one season.
    pub fn weekly_url_for(&self, season: u16) -> String {
        self.weekly_url.replace("{season}", &season.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnConfig {
    pub league_id: u32,
    /// League season on ESPN. Falls back to the resolved NFL season.
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default = "default_standings_ttl")]
    pub standings_ttl_secs: u64,
    #[serde(default = "default_scoreboard_ttl")]
    pub scoreboard_ttl_secs: u64,
    #[serde(default = "default_free_agents_ttl")]
    pub free_agents_ttl_secs: u64,
}

fn default_standings_ttl() -> u64 {
    300
}

fn default_scoreboard_ttl() -> u64 {
    180
}

fn default_free_agents_ttl() -> u64 {
    600
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplementConfig {
    pub dir: String,
}

impl Default for SupplementConfig {
    fn default() -> Self {
        Self { dir: "data".into() }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

/// ESPN cookies for private leagues. Public leagues need neither.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/huddle.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not seed missing files; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- huddle.toml (required) ---
    let huddle_path = config_dir.join("huddle.toml");
    let huddle_text = read_file(&huddle_path)?;
    let file: HuddleFile = toml::from_str(&huddle_text).map_err(|e| ConfigError::ParseError {
        path: huddle_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        season: file.season,
        projection: file.projection,
        provider: file.provider,
        espn: file.espn,
        supplement: file.supplement,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Files under `config/` that are seeded from `defaults/` when missing.
/// `credentials.toml` is optional and only ships as a `.example` template.
const SEEDED_FILES: &[&str] = &["huddle.toml"];

/// Copy each missing seeded file from `defaults/` into `config/`.
/// Returns the files written. Existing files are never overwritten.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let mut seeded = Vec::new();
    for name in SEEDED_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(ConfigError::MissingDefault { path: source });
        }
        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Seed {
            path: config_dir.clone(),
            source: e,
        })?;
        if seed_file(&source, &target)? {
            info!(file = %target.display(), "seeded config from defaults");
            seeded.push(target);
        }
    }

    let credentials = config_dir.join("credentials.toml");
    if !credentials.exists() && defaults_dir.join("credentials.toml.example").exists() {
        debug!("no credentials.toml; ESPN requests will be unauthenticated");
    }

    Ok(seeded)
}

/// Write `source` to `target` unless `target` appeared in the meantime.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::Seed {
                path: target.to_path_buf(),
                source: e,
            })
        }
    };
    let mut src = std::fs::File::open(source).map_err(|e| ConfigError::Seed {
        path: source.to_path_buf(),
        source: e,
    })?;
    std::io::copy(&mut src, &mut dest).map_err(|e| ConfigError::Seed {
        path: target.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}

/// Load config relative to the current working directory, seeding missing
/// files from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let projection = &config.projection;
    let positive_fields: &[(&str, usize)] = &[
        ("projection.concurrency", projection.concurrency),
        ("projection.min_sample", projection.min_sample),
        ("projection.default_batch_size", projection.default_batch_size),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if !config.provider.weekly_url.contains("{season}") {
        return Err(ConfigError::ValidationError {
            field: "provider.weekly_url".into(),
            message: "must contain a `{season}` placeholder".into(),
        });
    }

    if config.provider.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "provider.timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    if let Some(year) = config.season.year {
        if !(1999..=2100).contains(&year) {
            return Err(ConfigError::ValidationError {
                field: "season.year".into(),
                message: format!("must be a season from 1999 onward, got {year}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HUDDLE_TOML: &str = r#"
[season]
year = 2024

[projection]
concurrency = 5
min_sample = 4
default_batch_size = 50

[provider]
weekly_url = "https://example.test/player_stats_{season}.csv"
schedules_url = "https://example.test/games.csv"
timeout_secs = 30
cache_ttl_secs = 3600

[espn]
league_id = 123456

[supplement]
dir = "data"
"#;

    /// Create a scratch directory with `config/huddle.toml` written from `text`.
    fn scratch_with(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/huddle.toml"), text).unwrap();
        tmp
    }

    #[test]
    fn loads_valid_config() {
        let tmp = scratch_with("huddle_config_valid", HUDDLE_TOML);

        let config = load_config_from(&tmp).expect("should load valid config");
        assert_eq!(config.season.year, Some(2024));
        assert_eq!(config.projection.concurrency, 5);
        assert_eq!(config.projection.min_sample, 4);
        assert_eq!(config.projection.default_batch_size, 50);
        assert_eq!(
            config.provider.weekly_url_for(2023),
            "https://example.test/player_stats_2023.csv"
        );
        assert_eq!(config.provider.timeout(), Duration::from_secs(30));
        assert_eq!(config.espn.league_id, 123456);
        assert_eq!(config.espn.standings_ttl_secs, 300);
        assert_eq!(config.espn.scoreboard_ttl_secs, 180);
        assert_eq!(config.espn.free_agents_ttl_secs, 600);
        assert!(config.credentials.espn_s2.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn season_and_supplement_sections_are_optional() {
        let text = HUDDLE_TOML
            .replace("[season]\nyear = 2024\n", "")
            .replace("[supplement]\ndir = \"data\"\n", "");
        let tmp = scratch_with("huddle_config_optional_sections", &text);

        let config = load_config_from(&tmp).expect("should load without optional sections");
        assert!(config.season.year.is_none());
        assert_eq!(config.supplement.dir, "data");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_is_read_when_present() {
        let tmp = scratch_with("huddle_config_creds", HUDDLE_TOML);
        fs::write(
            tmp.join("config/credentials.toml"),
            "espn_s2 = \"abc\"\nswid = \"{XYZ}\"\n",
        )
        .unwrap();

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.credentials.espn_s2.as_deref(), Some("abc"));
        assert_eq!(config.credentials.swid.as_deref(), Some("{XYZ}"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let tmp = scratch_with(
            "huddle_config_zero_concurrency",
            &HUDDLE_TOML.replace("concurrency = 5", "concurrency = 0"),
        );

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "projection.concurrency");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_weekly_url_without_placeholder() {
        let tmp = scratch_with(
            "huddle_config_bad_url",
            &HUDDLE_TOML.replace("player_stats_{season}.csv", "player_stats.csv"),
        );

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "provider.weekly_url");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_implausible_season() {
        let tmp = scratch_with(
            "huddle_config_bad_season",
            &HUDDLE_TOML.replace("year = 2024", "year = 1950"),
        );

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "season.year"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_huddle_toml() {
        let tmp = std::env::temp_dir().join("huddle_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("huddle.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = scratch_with("huddle_config_invalid", "this is not valid [[[ toml");

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("huddle.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seeds_huddle_toml_but_not_credentials_template() {
        let tmp = std::env::temp_dir().join("huddle_config_seed");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join("huddle.toml"), HUDDLE_TOML).unwrap();
        fs::write(defaults_dir.join("credentials.toml.example"), "espn_s2 = \"...\"\n").unwrap();

        let seeded = ensure_config_files(&tmp).expect("should seed");
        assert_eq!(seeded, vec![tmp.join("config/huddle.toml")]);
        assert!(!tmp.join("config/credentials.toml").exists());
        assert!(!tmp.join("config/credentials.toml.example").exists());

        // The seeded file loads as-is.
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.projection.concurrency, 5);

        // A local edit survives the next run.
        fs::write(tmp.join("config/huddle.toml"), "# custom\n").unwrap();
        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        let content = fs::read_to_string(tmp.join("config/huddle.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_config_needs_no_defaults() {
        let tmp = scratch_with("huddle_config_no_defaults", HUDDLE_TOML);

        assert!(ensure_config_files(&tmp).unwrap().is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_default_is_reported_with_its_path() {
        let tmp = std::env::temp_dir().join("huddle_config_missing_default");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::MissingDefault { path } => {
                assert_eq!(path, &tmp.join("defaults/huddle.toml"));
            }
            other => panic!("expected MissingDefault, got: {other}"),
        }
        assert!(!tmp.join("config").exists());

        let _ = fs::remove_dir_all(&tmp);
    }
}
