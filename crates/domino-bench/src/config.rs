use domino_core::board::Side;
use domino_core::model::{MAX_PARTIES, Pip, Tile};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const MAX_PIP_LIMIT: Pip = 12;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root scenario configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub run_id: String,
    pub table: TableConfig,
    #[serde(default)]
    pub moves: Vec<MoveConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScenarioConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ScenarioConfig =
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
        validate_run_id(&self.run_id)?;
        self.table.validate()?;
        validate_moves(&self.moves, &self.table)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            report_json: resolve_template(&self.run_id, &self.outputs.report_json),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// The table being observed: tile set, seats and the observer's own hand.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_max_pip")]
    pub max_pip: Pip,
    pub parties: usize,
    pub hand_size: usize,
    #[serde(default)]
    pub observer: u8,
    /// Explicit observer hand. When absent, one is dealt from `seed`.
    #[serde(default)]
    pub observer_hand: Option<Vec<Tile>>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TableConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_pip > MAX_PIP_LIMIT {
            return Err(invalid(
                "table.max_pip",
                format!("max_pip must be at most {MAX_PIP_LIMIT}"),
            ));
        }

        if self.parties < 2 || self.parties > MAX_PARTIES {
            return Err(invalid(
                "table.parties",
                format!("parties must be between 2 and {MAX_PARTIES}"),
            ));
        }

        if self.hand_size == 0 {
            return Err(invalid("table.hand_size", "hand size must be greater than zero"));
        }

        let pool_size = self.pool_size();
        if self.hand_size * self.parties > pool_size {
            return Err(invalid(
                "table.hand_size",
                format!(
                    "{} parties x {} tiles exceeds the {pool_size}-tile pool",
                    self.parties, self.hand_size
                ),
            ));
        }

        if self.observer as usize >= self.parties {
            return Err(invalid(
                "table.observer",
                format!("observer seat {} is not at the table", self.observer),
            ));
        }

        match (&self.observer_hand, self.seed) {
            (None, None) => {
                return Err(invalid(
                    "table.observer_hand",
                    "either observer_hand or seed must be given",
                ));
            }
            (Some(hand), _) => {
                if hand.len() != self.hand_size {
                    return Err(invalid(
                        "table.observer_hand",
                        format!("expected {} tiles but found {}", self.hand_size, hand.len()),
                    ));
                }
                let mut seen = HashSet::new();
                for tile in hand {
                    if tile.high() > self.max_pip {
                        return Err(invalid(
                            "table.observer_hand",
                            format!("{tile} is not part of a double-{} set", self.max_pip),
                        ));
                    }
                    if !seen.insert(*tile) {
                        return Err(invalid(
                            "table.observer_hand",
                            format!("{tile} listed more than once"),
                        ));
                    }
                }
            }
            (None, Some(_)) => {}
        }

        Ok(())
    }

    pub fn pool_size(&self) -> usize {
        let n = self.max_pip as usize + 1;
        n * (n + 1) / 2
    }
}

fn default_max_pip() -> Pip {
    6
}

/// One observed event, applied in order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveConfig {
    Play { party: u8, tile: Tile, side: Side },
    Pass { party: u8 },
    Reveal { party: u8, pips: Vec<Pip> },
}

impl MoveConfig {
    pub fn party(&self) -> u8 {
        match self {
            MoveConfig::Play { party, .. }
            | MoveConfig::Pass { party }
            | MoveConfig::Reveal { party, .. } => *party,
        }
    }
}

fn validate_moves(moves: &[MoveConfig], table: &TableConfig) -> Result<(), ValidationError> {
    let mut played = HashSet::new();
    for (index, step) in moves.iter().enumerate() {
        let field = format!("moves[{index}]");
        if step.party() as usize >= table.parties {
            return Err(invalid(
                &field,
                format!("party {} is not at the table", step.party()),
            ));
        }
        match step {
            MoveConfig::Play { tile, .. } => {
                if tile.high() > table.max_pip {
                    return Err(invalid(&field, format!("{tile} is not in the pool")));
                }
                if !played.insert(*tile) {
                    return Err(invalid(&field, format!("{tile} played twice")));
                }
            }
            MoveConfig::Reveal { pips, .. } => {
                if pips.is_empty() {
                    return Err(invalid(&field, "reveal must name at least one pip"));
                }
                if let Some(pip) = pips.iter().find(|pip| **pip > table.max_pip) {
                    return Err(invalid(&field, format!("pip {pip} exceeds max_pip")));
                }
            }
            MoveConfig::Pass { .. } => {}
        }
    }
    Ok(())
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub report_json: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.report_json", &self.report_json),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(label, "path must not be empty"));
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
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

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(invalid("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub report_json: PathBuf,
    pub summary_md: PathBuf,
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

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "opening_pass"
table:
  max_pip: 6
  parties: 4
  hand_size: 7
  observer: 0
  seed: 4242
moves:
  - kind: play
    party: 1
    tile: [6, 6]
    side: left
  - kind: pass
    party: 2
  - kind: reveal
    party: 3
    pips: [1, 4]
outputs:
  report_json: "bench/out/{run_id}/report.json"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: ScenarioConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.moves.len(), 3);
        assert_eq!(
            cfg.moves[0],
            MoveConfig::Play {
                party: 1,
                tile: Tile::new(6, 6),
                side: Side::Left
            }
        );
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.report_json,
            PathBuf::from("bench/out/opening_pass/report.json")
        );
    }

    #[test]
    fn rejects_table_without_hand_source() {
        let yaml = BASIC_YAML.replace("  seed: 4242\n", "");
        let mut cfg: ScenarioConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "table.observer_hand"
        ));
    }

    #[test]
    fn rejects_oversized_hands() {
        let yaml = BASIC_YAML.replace("hand_size: 7", "hand_size: 8");
        let mut cfg: ScenarioConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("28 tiles cannot fill 4 x 8");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "table.hand_size"
        ));
    }

    #[test]
    fn rejects_moves_by_absent_party() {
        let yaml = BASIC_YAML.replace("party: 3", "party: 7");
        let mut cfg: ScenarioConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("seat 7 is not at the table");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "moves[2]"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("opening_pass", "opening pass");
        let mut cfg: ScenarioConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn explicit_observer_hand_must_match_hand_size() {
        let yaml = BASIC_YAML.replace(
            "  seed: 4242\n",
            "  observer_hand: [[0, 0], [0, 1], [2, 5]]\n",
        );
        let mut cfg: ScenarioConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("three tiles for a seven-tile hand");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "table.observer_hand"
        ));
    }
}
