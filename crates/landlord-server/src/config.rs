use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_BASE_STAKE: u64 = 1;
const DEFAULT_STARTING_BALANCE: i64 = 1_000;
const DEFAULT_BOT_REFILL: i64 = 1_000;
const DEFAULT_MIN_DELAY_MS: u64 = 800;
const DEFAULT_MAX_DELAY_MS: u64 = 2_000;
const DEFAULT_CLAIM_THRESHOLD: i32 = 7;
const DEFAULT_HINT_TIMEOUT_MS: u64 = 1_500;
const DEFAULT_SIM_GAMES: usize = 10;
const DEFAULT_SIM_OUTPUT: &str = "out/landlord/games.jsonl";

/// Root server configuration loaded from YAML. Every block is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub stakes: StakesConfig,
    #[serde(default)]
    pub bots: BotsConfig,
    #[serde(default)]
    pub hint: Option<HintConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

impl ServerConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ServerConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.stakes.validate()?;
        self.bots.validate()?;
        if let Some(hint) = self.hint.as_mut() {
            hint.validate()?;
        }
        self.sim.validate()?;
        self.logging.normalize();
        Ok(())
    }

    /// Directory that receives the JSONL game log and structured telemetry.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.sim.output)
            .parent()
            .map(Path::to_path_buf)
            .filter(|dir| dir.components().count() > 0)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StakesConfig {
    #[serde(default = "default_base_stake")]
    pub base: u64,
    #[serde(default = "default_starting_balance")]
    pub starting_balance: i64,
    #[serde(default = "default_bot_refill")]
    pub bot_refill: i64,
}

impl Default for StakesConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_STAKE,
            starting_balance: DEFAULT_STARTING_BALANCE,
            bot_refill: DEFAULT_BOT_REFILL,
        }
    }
}

impl StakesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.base == 0 {
            return Err(invalid("stakes.base", "base stake must be greater than zero"));
        }
        if self.starting_balance < 0 {
            return Err(invalid(
                "stakes.starting_balance",
                "starting balance must not be negative",
            ));
        }
        if self.bot_refill <= 0 {
            return Err(invalid("stakes.bot_refill", "bot refill must be positive"));
        }
        Ok(())
    }
}

fn default_base_stake() -> u64 {
    DEFAULT_BASE_STAKE
}

fn default_starting_balance() -> i64 {
    DEFAULT_STARTING_BALANCE
}

fn default_bot_refill() -> i64 {
    DEFAULT_BOT_REFILL
}

/// Bot pacing and behaviour.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BotsConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_claim_threshold")]
    pub claim_threshold: i32,
    #[serde(default = "default_true")]
    pub auto_play_offline: bool,
}

impl Default for BotsConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            claim_threshold: DEFAULT_CLAIM_THRESHOLD,
            auto_play_offline: true,
        }
    }
}

impl BotsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(invalid(
                "bots.min_delay_ms",
                "minimum delay must not exceed bots.max_delay_ms",
            ));
        }
        Ok(())
    }
}

fn default_min_delay_ms() -> u64 {
    DEFAULT_MIN_DELAY_MS
}

fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

fn default_claim_threshold() -> i32 {
    DEFAULT_CLAIM_THRESHOLD
}

fn default_true() -> bool {
    true
}

/// External hint process invoked once per decision.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HintConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default = "default_hint_timeout_ms")]
    pub timeout_ms: u64,
}

impl HintConfig {
    fn validate(&mut self) -> Result<(), ValidationError> {
        self.command = self.command.trim().to_string();
        if self.command.is_empty() {
            return Err(invalid("hint.command", "command must not be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("hint.timeout_ms", "timeout must be greater than zero"));
        }
        Ok(())
    }
}

fn default_hint_timeout_ms() -> u64 {
    DEFAULT_HINT_TIMEOUT_MS
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

/// Bot-only simulation run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimConfig {
    #[serde(default = "default_sim_games")]
    pub games: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_sim_output")]
    pub output: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            games: DEFAULT_SIM_GAMES,
            seed: None,
            output: default_sim_output(),
        }
    }
}

impl SimConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.games == 0 {
            return Err(invalid("sim.games", "number of games must be greater than zero"));
        }
        if self.output.trim().is_empty() {
            return Err(invalid("sim.output", "path must not be empty"));
        }
        Ok(())
    }
}

fn default_sim_games() -> usize {
    DEFAULT_SIM_GAMES
}

fn default_sim_output() -> String {
    DEFAULT_SIM_OUTPUT.to_string()
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
