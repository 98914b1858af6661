use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The main rule document.
    pub rules: Option<PathBuf>,

    /// A local rules file merged over the main document; its definitions win.
    pub personal_rules: Option<PathBuf>,

    /// Regex patterns for rule keys to ignore.
    #[serde(default)]
    pub ignore_keys: Vec<String>,

    /// Characters of context shown on each side of a finding.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

fn default_context_window() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: None,
            personal_rules: None,
            ignore_keys: Vec::new(),
            context_window: default_context_window(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        rules: Option<PathBuf>,
        personal_rules: Option<PathBuf>,
        cli_ignore_keys: Vec<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(".subchk.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        // Apply CLI overrides
        if rules.is_some() {
            config.rules = rules;
        }
        if personal_rules.is_some() {
            config.personal_rules = personal_rules;
        }
        if !cli_ignore_keys.is_empty() {
            config.ignore_keys.extend(cli_ignore_keys);
        }

        // Fall back to the installed default rule document
        if config.rules.is_none() {
            if let Some(data_dir) = Self::data_dir() {
                let default_rules = data_dir.join("default.rules");
                if default_rules.exists() {
                    config.rules = Some(default_rules);
                }
            }
        }

        // Set default personal rules file if not specified
        if config.personal_rules.is_none() {
            config.personal_rules = Self::default_personal_rules_path();
        }

        // Ensure personal rules file exists
        if let Some(path) = &config.personal_rules {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create personal rules directory")?;
            }
            if !path.exists() {
                fs::write(path, "").context("Failed to create personal rules file")?;
            }
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        if other.rules.is_some() {
            self.rules = other.rules;
        }
        if other.personal_rules.is_some() {
            self.personal_rules = other.personal_rules;
        }
        if !other.ignore_keys.is_empty() {
            self.ignore_keys = other.ignore_keys;
        }
        if other.context_window != default_context_window() {
            self.context_window = other.context_window;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "subchk").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_rules_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "subchk").map(|dirs| dirs.config_dir().join("personal.rules"))
    }

    pub fn cache_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "subchk").map(|dirs| dirs.cache_dir().to_path_buf())
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "subchk").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rules, None);
        assert!(config.ignore_keys.is_empty());
        assert_eq!(config.context_window, 20);
    }

    #[test]
    fn test_merge_configs() {
        let base = Config {
            rules: Some(PathBuf::from("main.rules")),
            ignore_keys: vec!["^x".to_string()],
            ..Default::default()
        };
        let override_config = Config {
            rules: Some(PathBuf::from("other.rules")),
            context_window: 40,
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.rules, Some(PathBuf::from("other.rules")));
        assert_eq!(merged.context_window, 40);
        // untouched fields keep the base values
        assert_eq!(merged.ignore_keys, vec!["^x".to_string()]);
    }

    #[test]
    fn test_config_from_toml() {
        let config: Config = toml::from_str(
            "rules = \"shared.rules\"\nignore_keys = [\"^第.*集$\"]\ncontext_window = 10\n",
        )
        .unwrap();

        assert_eq!(config.rules, Some(PathBuf::from("shared.rules")));
        assert_eq!(config.ignore_keys, vec!["^第.*集$".to_string()]);
        assert_eq!(config.context_window, 10);
    }
}
