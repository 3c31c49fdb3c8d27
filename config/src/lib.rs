//! ysh Configuration System
//!
//! Provides layered YAML-based configuration for the ysh shell.
//!
//! # Configuration Loading Priority
//!
//! 1. Compiled-in defaults
//! 2. `/etc/ysh/ysh.yaml` (system-wide)
//! 3. `~/.config/ysh/ysh.yaml` (user)
//! 4. `./ysh.yaml` (project-local)
//! 5. `YSH_CONFIG=/path/to/config.yaml` (explicit)
//! 6. Environment variables (highest priority)
//!
//! # Example Configuration
//!
//! ```yaml
//! shell:
//!   prompt: "ysh> "
//!   history:
//!     file: "${HOME}/.ysh_history"
//!
//! eval:
//!   unbound_names: error
//!   fault_policy: abort_line
//!
//! logging:
//!   level: debug
//! ```

#![allow(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::*;

/// Load configuration from default locations.
///
/// Searches for config files in order and merges them.
/// Environment variables override file values.
pub fn load() -> Result<YshConfig, ConfigError> {
    ConfigLoader::new().load()
}

/// Load configuration from a specific file.
pub fn load_from_file(path: &str) -> Result<YshConfig, ConfigError> {
    ConfigLoader::new().with_file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_preserves_observed_quirks() {
        let config = YshConfig::default();
        assert_eq!(config.eval.unbound_names, UnboundNames::BindZero);
        assert_eq!(config.eval.fault_policy, FaultPolicy::AbortLine);
        assert_eq!(config.shell.prompt, "ysh> ");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = r#"
shell:
  prompt: "> "
"#;
        let config: YshConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.shell.prompt, "> ");
        assert_eq!(config.shell.continuation_prompt, "... "); // default
        assert!(config.shell.history.enabled);
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
shell:
  prompt: "$ "
  continuation_prompt: "> "
  history:
    enabled: false
    file: "/tmp/hist"
    max_entries: 10

eval:
  unbound_names: error
  fault_policy: abort_session

logging:
  level: trace
  filter: "ysh=trace"
"#;
        let config: YshConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.shell.prompt, "$ ");
        assert!(!config.shell.history.enabled);
        assert_eq!(config.shell.history.max_entries, 10);
        assert_eq!(config.eval.unbound_names, UnboundNames::Error);
        assert_eq!(config.eval.fault_policy, FaultPolicy::AbortSession);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert_eq!(config.logging.filter, "ysh=trace");
    }
}
