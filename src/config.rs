//! Configuration file schema and discovery.
//!
//! Configuration is optional: every field has a default, and a missing file
//! means "use the defaults". Lookup order is the `--config` flag, the
//! `CODELENS_CONFIG` environment variable, `codelens.yaml` or
//! `.codelens.yaml` in the working directory, then `config.yaml` in the
//! per-user config directory.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "CODELENS_CONFIG";

/// File names looked up in the working directory.
pub const LOCAL_CONFIG_FILES: &[&str] = &["codelens.yaml", ".codelens.yaml"];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum accepted source length in characters, enforced by the CLI.
    pub max_code_length: usize,
    pub log_level: String,
    pub analysis: AnalysisConfig,
    pub enrichment: EnrichmentConfig,
    pub batch: BatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_code_length: 10_000,
            log_level: "info".to_string(),
            analysis: AnalysisConfig::default(),
            enrichment: EnrichmentConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

/// Default output sections of an analysis.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub include_suggestions: bool,
    pub include_recommendations: bool,
    pub include_enrichment: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_suggestions: true,
            include_recommendations: true,
            include_enrichment: true,
        }
    }
}

/// Settings for the model-based enrichment provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Enrichment is off unless explicitly enabled.
    pub enabled: bool,
    /// OpenAI-compatible chat completions URL.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound for one enrichment call, rate-limit waits included.
    pub timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 1000,
            temperature: 0.3,
            timeout_secs: 30,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// At most `max_calls` provider calls per `window_secs`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_calls: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 20,
            window_secs: 60,
        }
    }
}

/// Batch analysis settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads used for batch analysis.
    pub pool_size: usize,
    /// Glob patterns for paths to skip when walking a directory.
    pub exclude: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Check if a path matches one of the `batch.exclude` patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.batch.exclude.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();
        self.batch.exclude.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|glob| glob.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Per-user config file, e.g. `~/.config/codelens/config.yaml`.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "codelens").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Pick the config file to load.
///
/// An explicit path or `env_path` is returned even when it does not exist,
/// so that loading reports the mistake. The local and per-user files are
/// only returned when present.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_path: Option<String>,
    cwd: &Path,
    user_path: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    LOCAL_CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|p| p.is_file())
        .or_else(|| user_path.filter(|p| p.is_file()))
}

/// Load the configuration using the standard lookup order.
///
/// Returns the configuration and the file it came from, if any.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let cwd = std::env::current_dir()?;
    let path = resolve_path(
        explicit,
        std::env::var(CONFIG_ENV).ok(),
        &cwd,
        user_config_path(),
    );

    let config = match &path {
        Some(p) => Config::parse_file(p)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", p.display(), e))?,
        None => Config::default(),
    };
    validate(&config)?;
    Ok((config, path))
}

/// Validate a configuration.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.max_code_length == 0 {
        anyhow::bail!("max_code_length must be greater than zero");
    }

    if !LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()) {
        anyhow::bail!(
            "invalid log_level {:?}, must be one of: {}",
            config.log_level,
            LOG_LEVELS.join(", ")
        );
    }

    let enrichment = &config.enrichment;
    if !(0.0..=2.0).contains(&enrichment.temperature) {
        anyhow::bail!(
            "enrichment.temperature must be between 0 and 2, got {}",
            enrichment.temperature
        );
    }
    if enrichment.timeout_secs == 0 {
        anyhow::bail!("enrichment.timeout_secs must be greater than zero");
    }
    if enrichment.rate_limit.max_calls == 0 || enrichment.rate_limit.window_secs == 0 {
        anyhow::bail!("enrichment.rate_limit needs non-zero max_calls and window_secs");
    }

    if config.batch.pool_size == 0 {
        anyhow::bail!("batch.pool_size must be greater than zero");
    }
    for pattern in &config.batch.exclude {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid batch.exclude pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_code_length, 10_000);
        assert!(config.analysis.include_enrichment);
        assert!(!config.enrichment.enabled);
        assert_eq!(config.enrichment.model, "gpt-3.5-turbo");
        assert_eq!(config.enrichment.rate_limit.max_calls, 20);
        assert_eq!(config.batch.pool_size, 4);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
max_code_length: 500
analysis:
  include_recommendations: false
enrichment:
  enabled: true
  rate_limit:
    max_calls: 5
batch:
  exclude:
    - "**/generated/**"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_code_length, 500);
        assert!(config.analysis.include_suggestions);
        assert!(!config.analysis.include_recommendations);
        assert!(config.enrichment.enabled);
        assert_eq!(config.enrichment.rate_limit.max_calls, 5);
        assert_eq!(config.enrichment.rate_limit.window_secs, 60);
        assert_eq!(config.log_level, "info");
        assert!(config.is_path_excluded(Path::new("src/generated/api.py")));
        assert!(!config.is_path_excluded(Path::new("src/api.py")));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.enrichment.temperature = 2.5;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.batch.pool_size = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.batch.exclude = vec!["src/[".to_string()];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("batch.exclude"));
    }

    #[test]
    fn test_resolve_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.yaml");
        fs::write(&user, "log_level: debug").unwrap();

        assert_eq!(
            resolve_path(None, None, dir.path(), Some(user.clone())),
            Some(user.clone())
        );

        let local = dir.path().join(".codelens.yaml");
        fs::write(&local, "log_level: warn").unwrap();
        assert_eq!(
            resolve_path(None, None, dir.path(), Some(user.clone())),
            Some(local.clone())
        );

        assert_eq!(
            resolve_path(None, Some("env.yaml".into()), dir.path(), None),
            Some(PathBuf::from("env.yaml"))
        );

        let explicit = Path::new("flag.yaml");
        assert_eq!(
            resolve_path(Some(explicit), Some("env.yaml".into()), dir.path(), None),
            Some(explicit.to_path_buf())
        );

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(resolve_path(None, None, empty.path(), None), None);
    }
}
