use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YshConfig {
    pub shell: ShellConfig,
    pub eval: EvalConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    /// Prompt shown while a backslash-continued line is being joined.
    pub continuation_prompt: String,
    pub history: HistoryConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "ysh> ".to_string(),
            continuation_prompt: "... ".to_string(),
            history: HistoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub file: String,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: "~/.ysh_history".to_string(),
            max_entries: 1000,
        }
    }
}

impl HistoryConfig {
    /// History file with a leading `~/` resolved against the home directory.
    pub fn path(&self) -> PathBuf {
        match self.file.strip_prefix("~/") {
            Some(stripped) => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(stripped),
            None => PathBuf::from(&self.file),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub unbound_names: UnboundNames,
    pub fault_policy: FaultPolicy,
}

/// What an expression does when it reads a name that has no binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnboundNames {
    /// Bind the name to `Int(0)` and read that.
    #[default]
    BindZero,
    /// Produce an in-band error value instead of binding.
    Error,
}

/// How far a fatal fault unwinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Report the fault and continue with the next line.
    #[default]
    AbortLine,
    /// Report the fault and end the session with a failure status.
    AbortSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            filter: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::InvalidValue(format!("unknown log level '{other}'"))),
        }
    }
}

impl FromStr for UnboundNames {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bind_zero" => Ok(Self::BindZero),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::InvalidValue(format!(
                "unknown unbound-name policy '{other}'"
            ))),
        }
    }
}

impl FromStr for FaultPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "abort_line" => Ok(Self::AbortLine),
            "abort_session" => Ok(Self::AbortSession),
            other => Err(ConfigError::InvalidValue(format!("unknown fault policy '{other}'"))),
        }
    }
}
