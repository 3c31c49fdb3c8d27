use crate::{ConfigError, YshConfig};
use regex::Regex;
use std::path::PathBuf;
use tracing::debug;

pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".config/ysh/ysh.yaml"));
        }
        search_paths.push(PathBuf::from("./ysh.yaml"));

        #[cfg(unix)]
        search_paths.insert(0, PathBuf::from("/etc/ysh/ysh.yaml"));

        Self {
            explicit_file: None,
            search_paths,
        }
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.explicit_file = Some(PathBuf::from(path));
        self
    }

    /// Replace the default search locations.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn load(&self) -> Result<YshConfig, ConfigError> {
        let mut config = YshConfig::default();

        if let Ok(env_path) = std::env::var("YSH_CONFIG") {
            config = self.read_file(&PathBuf::from(env_path))?;
        } else if let Some(ref explicit) = self.explicit_file {
            config = self.read_file(explicit)?;
        } else {
            for path in &self.search_paths {
                if path.exists() {
                    if let Ok(content) = std::fs::read_to_string(path) {
                        debug!(path = ?path, "Merging config file");
                        config = self.merge_yaml(&config, &content)?;
                    }
                }
            }
        }

        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    fn read_file(&self, path: &PathBuf) -> Result<YshConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = ?path, "Loading config file");
        self.parse_yaml(&content)
    }

    fn parse_yaml(&self, content: &str) -> Result<YshConfig, ConfigError> {
        let expanded = self.expand_env_vars(content);
        Ok(serde_yaml::from_str(&expanded)?)
    }

    fn merge_yaml(&self, base: &YshConfig, content: &str) -> Result<YshConfig, ConfigError> {
        let overlay = self.parse_yaml(content)?;
        Ok(self.merge_configs(base, &overlay))
    }

    fn merge_configs(&self, base: &YshConfig, overlay: &YshConfig) -> YshConfig {
        let defaults = YshConfig::default();
        let mut result = base.clone();

        if overlay.shell.prompt != defaults.shell.prompt {
            result.shell.prompt = overlay.shell.prompt.clone();
        }
        if overlay.shell.continuation_prompt != defaults.shell.continuation_prompt {
            result.shell.continuation_prompt = overlay.shell.continuation_prompt.clone();
        }
        if overlay.shell.history.file != defaults.shell.history.file
            || overlay.shell.history.enabled != defaults.shell.history.enabled
            || overlay.shell.history.max_entries != defaults.shell.history.max_entries
        {
            result.shell.history = overlay.shell.history.clone();
        }
        if overlay.eval.unbound_names != defaults.eval.unbound_names {
            result.eval.unbound_names = overlay.eval.unbound_names;
        }
        if overlay.eval.fault_policy != defaults.eval.fault_policy {
            result.eval.fault_policy = overlay.eval.fault_policy;
        }
        if overlay.logging.level != defaults.logging.level
            || !overlay.logging.filter.is_empty()
        {
            result.logging = overlay.logging.clone();
        }

        result
    }

    fn expand_env_vars(&self, content: &str) -> String {
        let Ok(re) = Regex::new(r"\$\{([^}]+)\}") else {
            return content.to_string();
        };
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_default()
        })
        .to_string()
    }

    fn apply_env_overrides(&self, config: &mut YshConfig) -> Result<(), ConfigError> {
        if let Ok(prompt) = std::env::var("YSH_PROMPT") {
            config.shell.prompt = prompt;
        }
        if let Ok(file) = std::env::var("YSH_HISTORY_FILE") {
            if file.is_empty() {
                config.shell.history.enabled = false;
            } else {
                config.shell.history.file = file;
            }
        }
        if let Ok(level) = std::env::var("YSH_LOG_LEVEL") {
            config.logging.level = level.parse()?;
        }
        if let Ok(policy) = std::env::var("YSH_UNBOUND_NAMES") {
            config.eval.unbound_names = policy.parse()?;
        }
        if let Ok(policy) = std::env::var("YSH_FAULT_POLICY") {
            config.eval.fault_policy = policy.parse()?;
        }
        Ok(())
    }
}
