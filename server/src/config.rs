use pooltrivia_shared::config::{RulesConfig, TableConfig};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    pub broadcast_rate_hz: u32,
    pub rng_seed: u64,
    /// Directory served over HTTP (index.html, manifest, images)
    pub web_root: PathBuf,
    pub groups_path: PathBuf,
    /// Use the built-in groups when the manifest cannot be loaded
    pub allow_local_fallback: bool,
    pub onboarding_path: PathBuf,
    pub max_connections: usize,
    /// Client messages allowed per connection per second
    pub max_inputs_per_sec: u32,
    pub table: TableConfig,
    pub rules: RulesConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9002".to_string(),
            tick_rate_hz: 60,
            broadcast_rate_hz: 30,
            rng_seed: 42,
            web_root: PathBuf::from("web"),
            groups_path: PathBuf::from("web/functional_groups.json"),
            allow_local_fallback: true,
            onboarding_path: PathBuf::from(".pooltrivia/onboarding.json"),
            max_connections: 64,
            max_inputs_per_sec: 240,
            table: TableConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `POOLTRIVIA_*` environment variables.
    /// Without `POOLTRIVIA_SEED` every run gets a fresh seed.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if std::env::var("POOLTRIVIA_SEED").is_err() {
            config.rng_seed = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(config.rng_seed);
        }
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(addr) = lookup("POOLTRIVIA_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(v) = lookup("POOLTRIVIA_TICK_HZ") {
            config.tick_rate_hz = parse_var("POOLTRIVIA_TICK_HZ", &v)?;
        }
        if let Some(v) = lookup("POOLTRIVIA_BROADCAST_HZ") {
            config.broadcast_rate_hz = parse_var("POOLTRIVIA_BROADCAST_HZ", &v)?;
        }
        if let Some(v) = lookup("POOLTRIVIA_SEED") {
            config.rng_seed = parse_var("POOLTRIVIA_SEED", &v)?;
        }
        if let Some(v) = lookup("POOLTRIVIA_MAX_CONNECTIONS") {
            config.max_connections = parse_var("POOLTRIVIA_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("POOLTRIVIA_MAX_INPUTS_PER_SEC") {
            config.max_inputs_per_sec = parse_var("POOLTRIVIA_MAX_INPUTS_PER_SEC", &v)?;
        }
        if let Some(root) = lookup("POOLTRIVIA_WEB_ROOT") {
            config.groups_path = PathBuf::from(&root).join("functional_groups.json");
            config.web_root = PathBuf::from(root);
        }
        if let Some(path) = lookup("POOLTRIVIA_GROUPS_PATH") {
            config.groups_path = PathBuf::from(path);
        }
        if let Some(v) = lookup("POOLTRIVIA_ALLOW_FALLBACK") {
            config.allow_local_fallback = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(format!("POOLTRIVIA_ALLOW_FALLBACK must be a boolean, got {v:?}")),
            };
        }
        if let Some(path) = lookup("POOLTRIVIA_ONBOARDING_PATH") {
            config.onboarding_path = PathBuf::from(path);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        if self.broadcast_rate_hz == 0 || self.broadcast_rate_hz > self.tick_rate_hz {
            return Err("broadcast_rate_hz must be in 1..=tick_rate_hz".to_string());
        }
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }
        if self.max_inputs_per_sec == 0 {
            return Err("max_inputs_per_sec must be > 0".to_string());
        }
        self.table.validate()?;
        self.rules.validate()?;
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("{key} is invalid ({value:?}): {e}"))
}
