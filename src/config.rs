use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DiffsenseError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Rendering defaults
    pub render: RenderConfig,

    /// Diff filtering settings
    pub filter: FilterConfig,

    /// Analysis-result cache settings
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Emit ANSI colors
    pub colors: bool,

    /// Show old/new line-number gutters
    pub line_numbers: bool,

    /// Context lines to request from upstream diff tools
    pub context_lines: usize,

    /// Target output width in columns
    pub max_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// File patterns dropped from diffs before display or analysis
    /// (exact names or globs, matched against basename and full path)
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory; defaults to the per-user cache location
    pub dir: Option<PathBuf>,

    /// Entry lifetime in hours
    pub ttl_hours: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig {
                colors: true,
                line_numbers: true,
                context_lines: 3,
                max_width: 80,
            },
            filter: FilterConfig {
                ignore_patterns: vec![
                    "package-lock.json".to_string(),
                    "yarn.lock".to_string(),
                    "pnpm-lock.yaml".to_string(),
                    "Cargo.lock".to_string(),
                    "composer.lock".to_string(),
                    "Gemfile.lock".to_string(),
                ],
            },
            cache: CacheConfig {
                dir: None,
                ttl_hours: crate::core::DEFAULT_TTL_HOURS,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| DiffsenseError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DiffsenseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = ["Diffsense.toml", "diffsense.toml", ".diffsense.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
