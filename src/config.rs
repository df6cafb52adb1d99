use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use crate::core::RematchPolicy;
use crate::models::RelevanceWeights;
use crate::services::{MatchingOptions, PostgrestTables};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    /// Saved profiles fall back to an in-process store when absent
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Postgrest,
    #[default]
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub kind: BackendKind,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub tables: PostgrestTables,
    /// JSON reference lists loaded into the `memory` backend
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Shared L2 tier; L1 only when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    pub default_limit: Option<u16>,
    pub max_limit: Option<u16>,
    #[serde(default)]
    pub rematch_policy: RematchPolicy,
}

impl MatchingSettings {
    pub fn options(&self) -> MatchingOptions {
        let defaults = MatchingOptions::default();
        let max_limit = self.max_limit.map_or(defaults.max_limit, usize::from);
        MatchingOptions {
            rematch_policy: self.rematch_policy,
            default_limit: self
                .default_limit
                .map_or(defaults.default_limit, usize::from)
                .min(max_limit),
            max_limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_industry_overlap_weight")]
    pub industry_overlap: u32,
    #[serde(default = "default_same_stage_weight")]
    pub same_stage: u32,
    #[serde(default = "default_adjacent_stage_weight")]
    pub adjacent_stage: u32,
    #[serde(default = "default_complementary_skill_weight")]
    pub complementary_skill: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            industry_overlap: default_industry_overlap_weight(),
            same_stage: default_same_stage_weight(),
            adjacent_stage: default_adjacent_stage_weight(),
            complementary_skill: default_complementary_skill_weight(),
        }
    }
}

impl From<&WeightsConfig> for RelevanceWeights {
    fn from(config: &WeightsConfig) -> Self {
        RelevanceWeights {
            industry_overlap: config.industry_overlap,
            same_stage: config.same_stage,
            adjacent_stage: config.adjacent_stage,
            complementary_skill: config.complementary_skill,
        }
    }
}

fn default_industry_overlap_weight() -> u32 { 2 }
fn default_same_stage_weight() -> u32 { 3 }
fn default_adjacent_stage_weight() -> u32 { 1 }
fn default_complementary_skill_weight() -> u32 { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with COSTART__)
    /// 4. SUPABASE_URL, SUPABASE_KEY and DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., COSTART__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("COSTART")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

/// Apply the well-known secret variables on top of the loaded config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("backend.url", url)?;
    }
    if let Ok(key) = env::var("SUPABASE_KEY") {
        builder = builder.set_override("backend.api_key", key)?;
    }
    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_weights() {
        let weights = RelevanceWeights::from(&WeightsConfig::default());
        assert_eq!(weights, RelevanceWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.backend.kind, BackendKind::Memory);
        assert!(settings.database.is_none());
        assert_eq!(settings.matching.rematch_policy, RematchPolicy::Block);
        assert_eq!(settings.backend.tables.founder_matches, "founder_matches");
    }

    #[test]
    fn test_sections_override_defaults() {
        let settings = from_toml(
            r#"
            [backend]
            kind = "postgrest"
            url = "https://example.supabase.co"

            [backend.tables]
            founder_matches = "matches_v2"

            [matching]
            default_limit = 500
            max_limit = 50
            rematch_policy = "reset"

            [scoring.weights]
            same_stage = 5
            "#,
        );

        assert_eq!(settings.backend.kind, BackendKind::Postgrest);
        assert_eq!(settings.backend.tables.founder_matches, "matches_v2");
        assert_eq!(settings.backend.tables.skills, "skills");
        assert_eq!(settings.scoring.weights.same_stage, 5);
        assert_eq!(settings.scoring.weights.industry_overlap, 2);

        let options = settings.matching.options();
        assert_eq!(options.rematch_policy, RematchPolicy::Reset);
        assert_eq!(options.max_limit, 50);
        assert_eq!(options.default_limit, 50);
    }
}
