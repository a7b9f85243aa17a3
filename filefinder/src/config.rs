use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};

/// Configuration for a search run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.filefinder.yaml` in the current directory
/// 3. Global `$HOME/.config/filefinder/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Literal text to look for (no regex, case-sensitive)
/// word: "Hello"
///
/// # Root directory to search in
/// root_path: "."
///
/// # Worker threads executing the per-entry tasks (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
///
/// # Print only the summary line
/// stats_only: false
/// ```
///
/// Command-line arguments take precedence over config file values, see
/// [`SearchConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The substring a line must contain for its file to match
    #[serde(default)]
    pub word: String,

    /// Root directory to start search from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Number of pool threads running traversal and scan tasks.
    /// The number of queued tasks is not limited by this value.
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to only show the summary instead of individual paths
    #[serde(default)]
    pub stats_only: bool,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

pub(crate) fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            word: String::new(),
            root_path: default_root_path(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
            stats_only: false,
        }
    }
}

impl SearchConfig {
    /// Creates a configuration for `word` under `root_path` with defaults elsewhere
    pub fn new(word: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            word: word.into(),
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> SearchResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus an optional explicit file.
    ///
    /// An explicit file that does not exist is an error; missing default files are skipped.
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("filefinder/config.yaml")),
            Some(PathBuf::from(".filefinder.yaml")),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Rejects settings no search could ever satisfy
    pub fn validate(&self) -> SearchResult<()> {
        if self.word.contains(&['\n', '\r'][..]) {
            return Err(SearchError::config_error(
                "search word must not contain a line break, lines are matched one at a time",
            ));
        }
        Ok(())
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(word) = cli.word {
            self.word = word;
        }
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if let Some(thread_count) = cli.thread_count {
            self.thread_count = thread_count;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        if cli.stats_only {
            self.stats_only = true;
        }
        self
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub word: Option<String>,
    pub root_path: Option<PathBuf>,
    pub thread_count: Option<NonZeroUsize>,
    pub log_level: Option<String>,
    pub stats_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, config_path)
    }

    #[test]
    fn test_load_config_file() {
        let (_dir, config_path) = write_config(
            r#"
            word: "Hello"
            root_path: "src"
            thread_count: 4
            log_level: "debug"
            stats_only: true
        "#,
        );

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.word, "Hello");
        assert_eq!(config.root_path, PathBuf::from("src"));
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.log_level, "debug");
        assert!(config.stats_only);
    }

    #[test]
    fn test_default_values() {
        let (_dir, config_path) = write_config(
            r#"
            word: "test"
        "#,
        );

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.word, "test");
        assert_eq!(config.root_path, PathBuf::from("."));
        assert_eq!(config.thread_count, default_thread_count());
        assert_eq!(config.log_level, "warn");
        assert!(!config.stats_only);
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = SearchConfig {
            word: "TODO".to_string(),
            root_path: PathBuf::from("src"),
            thread_count: NonZeroUsize::new(4).unwrap(),
            log_level: "warn".to_string(),
            stats_only: false,
        };

        let merged = file_config.clone().merge_with_cli(CliOverrides {
            word: Some("FIXME".to_string()),
            thread_count: Some(NonZeroUsize::new(8).unwrap()),
            stats_only: true,
            ..CliOverrides::default()
        });
        assert_eq!(merged.word, "FIXME"); // CLI value
        assert_eq!(merged.root_path, PathBuf::from("src")); // File value
        assert_eq!(merged.thread_count, NonZeroUsize::new(8).unwrap()); // CLI value
        assert_eq!(merged.log_level, "warn"); // File value
        assert!(merged.stats_only); // CLI value

        let untouched = file_config.clone().merge_with_cli(CliOverrides::default());
        assert_eq!(untouched, file_config);
    }

    #[test]
    fn test_invalid_config() {
        let (_dir, config_path) = write_config(
            r#"
            word: []
            thread_count: "invalid"
        "#,
        );

        let result = SearchConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }

    #[test]
    fn test_zero_threads_rejected() {
        let (_dir, config_path) = write_config("thread_count: 0\n");
        assert!(SearchConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_validate_rejects_line_breaks() {
        assert!(SearchConfig::new("Hello", ".").validate().is_ok());

        let err = SearchConfig::new("two\nlines", ".").validate().unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SearchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
