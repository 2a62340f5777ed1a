//! Gremview configuration.
//!
//! Configuration is read from a TOML file and then overlaid with
//! `GREMVIEW_<SECTION>_<KEY>` environment variables. The file is located, in
//! order, from an explicit path, the `GREMVIEW_CONFIG` variable, or
//! `<config dir>/gremview/config.toml`.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1"
//! port = 3000
//!
//! [backend]
//! host = "localhost"
//! port = 8182
//!
//! [pipeline]
//! gap_batch_size = 500
//! ```

use crate::endpoint::{BackendVariant, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TRAVERSAL_SOURCE};
use crate::{Endpoint, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project name used for the config directory and env prefix.
pub const PROJECT_NAME: &str = "gremview";

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "GREMVIEW_CONFIG";

const ENV_PREFIX: &str = "GREMVIEW";

// ============================================================================
// Sections
// ============================================================================

/// HTTP server settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Defaults for the Gremlin backend when a request does not name one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Default host.
    pub host: String,
    /// Default port.
    pub port: u16,
    /// Traversal source aliased to `g`.
    pub traversal_source: String,
    /// Default backend variant.
    pub variant: BackendVariant,
    /// Seconds allowed for opening a session.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            traversal_source: DEFAULT_TRAVERSAL_SOURCE.to_string(),
            variant: BackendVariant::default(),
            connect_timeout_secs: 10,
        }
    }
}

impl BackendConfig {
    /// The default endpoint described by this section.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port).with_traversal_source(&self.traversal_source)
    }

    /// Session open timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Reconciliation pipeline tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seconds allowed for the primary query.
    pub primary_timeout_secs: u64,
    /// Seconds allowed for each follow-up batch.
    pub stage_timeout_secs: u64,
    /// Ids per missing-endpoint lookup query.
    pub gap_batch_size: usize,
    /// Ids per property enrichment query.
    pub enrichment_batch_size: usize,
    /// The induced connector is skipped at or above this many nodes.
    pub connect_node_ceiling: usize,
    /// Batches of one stage allowed in flight at once.
    pub max_concurrent_batches: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            primary_timeout_secs: 120,
            stage_timeout_secs: 30,
            gap_batch_size: 500,
            enrichment_batch_size: 200,
            connect_node_ceiling: 1000,
            max_concurrent_batches: 4,
        }
    }
}

impl PipelineConfig {
    /// Primary query timeout.
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_timeout_secs)
    }

    /// Per-batch timeout for follow-up stages.
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}

// ============================================================================
// GremviewConfig
// ============================================================================

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GremviewConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Backend defaults.
    pub backend: BackendConfig,
    /// Pipeline tuning.
    pub pipeline: PipelineConfig,
}

impl GremviewConfig {
    /// Resolve the config file path.
    ///
    /// Returns `None` only when no explicit path is given and the platform
    /// has no config directory.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// The platform default config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Load configuration from the resolved path and the process environment.
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                log::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Overlay `GREMVIEW_<SECTION>_<KEY>` variables found through `lookup`.
    ///
    /// Values are parsed according to the type of the field they replace.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut doc = toml::Value::try_from(&*self).map_err(|e| Error::config(e.to_string()))?;
        let mut changed = false;

        if let Some(root) = doc.as_table_mut() {
            for (section, fields) in root.iter_mut() {
                let Some(fields) = fields.as_table_mut() else {
                    continue;
                };
                for (key, current) in fields.iter_mut() {
                    let var = env_var_name(section, key);
                    if let Some(raw) = lookup(&var) {
                        *current = parse_like(current, &raw)
                            .ok_or_else(|| Error::config(format!("Invalid value for {var}: {raw}")))?;
                        changed = true;
                    }
                }
            }
        }

        if changed {
            let text = toml::to_string(&doc).map_err(|e| Error::config(e.to_string()))?;
            *self = Self::from_toml_str(&text)?;
        }
        Ok(())
    }

    /// Flatten the configuration into `GREMVIEW_<SECTION>_<KEY>` pairs.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let doc = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        if let Some(root) = doc.as_table() {
            for (section, fields) in root {
                if let Some(fields) = fields.as_table() {
                    for (key, value) in fields {
                        let rendered = match value {
                            toml::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        vars.push((env_var_name(section, key), rendered));
                    }
                }
            }
        }
        Ok(vars)
    }

    /// Reject settings that would stall or break the pipeline.
    pub fn validate(&self) -> Result<()> {
        let p = &self.pipeline;
        if p.gap_batch_size == 0 || p.enrichment_batch_size == 0 {
            return Err(Error::config("Batch sizes must be greater than zero"));
        }
        if p.max_concurrent_batches == 0 {
            return Err(Error::config("max_concurrent_batches must be greater than zero"));
        }
        if p.primary_timeout_secs == 0
            || p.stage_timeout_secs == 0
            || self.backend.connect_timeout_secs == 0
        {
            return Err(Error::config("Timeouts must be greater than zero"));
        }
        Ok(())
    }

    /// `bind:port` for the HTTP listener.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

fn env_var_name(section: &str, key: &str) -> String {
    format!(
        "{ENV_PREFIX}_{}_{}",
        section.to_ascii_uppercase(),
        key.to_ascii_uppercase()
    )
}

fn parse_like(current: &toml::Value, raw: &str) -> Option<toml::Value> {
    match current {
        toml::Value::Integer(_) => raw.trim().parse::<i64>().ok().map(toml::Value::Integer),
        toml::Value::Float(_) => raw.trim().parse::<f64>().ok().map(toml::Value::Float),
        toml::Value::Boolean(_) => raw.trim().parse::<bool>().ok().map(toml::Value::Boolean),
        _ => Some(toml::Value::String(raw.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ------------------------------------------------------------------------
    // Defaults and parsing
    // ------------------------------------------------------------------------

    #[test]
    fn test_defaults() {
        let config = GremviewConfig::default();
        assert_eq!(config.backend.port, 8182);
        assert_eq!(config.pipeline.gap_batch_size, 500);
        assert_eq!(config.pipeline.enrichment_batch_size, 200);
        assert_eq!(config.pipeline.connect_node_ceiling, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GremviewConfig::from_toml_str("[backend]\nhost = \"graph.local\"\n").unwrap();
        assert_eq!(config.backend.host, "graph.local");
        assert_eq!(config.backend.port, 8182);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = GremviewConfig::default();
        config.backend.variant = BackendVariant::Puppy;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[pipeline]"));
        assert_eq!(GremviewConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = GremviewConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_from_file_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = GremviewConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_load_missing_explicit_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let config = GremviewConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    // ------------------------------------------------------------------------
    // Environment overrides
    // ------------------------------------------------------------------------

    #[test]
    fn test_env_overrides_typed_fields() {
        let mut config = GremviewConfig::default();
        config
            .apply_env_overrides(lookup_from(&[
                ("GREMVIEW_BACKEND_HOST", "janus.prod"),
                ("GREMVIEW_BACKEND_PORT", "8183"),
                ("GREMVIEW_PIPELINE_GAP_BATCH_SIZE", "250"),
                ("GREMVIEW_BACKEND_VARIANT", "puppy"),
            ]))
            .unwrap();
        assert_eq!(config.backend.host, "janus.prod");
        assert_eq!(config.backend.port, 8183);
        assert_eq!(config.pipeline.gap_batch_size, 250);
        assert_eq!(config.backend.variant, BackendVariant::Puppy);
    }

    #[test]
    fn test_env_override_rejects_bad_number() {
        let mut config = GremviewConfig::default();
        let err = config
            .apply_env_overrides(lookup_from(&[("GREMVIEW_SERVER_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("GREMVIEW_SERVER_PORT"));
    }

    #[test]
    fn test_env_overrides_none_is_noop() {
        let mut config = GremviewConfig::default();
        config.apply_env_overrides(|_| None).unwrap();
        assert_eq!(config, GremviewConfig::default());
    }

    #[test]
    fn test_to_env_vars() {
        let vars = GremviewConfig::default().to_env_vars().unwrap();
        assert!(vars.contains(&("GREMVIEW_BACKEND_HOST".to_string(), "localhost".to_string())));
        assert!(vars.contains(&("GREMVIEW_SERVER_PORT".to_string(), "3000".to_string())));
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = GremviewConfig::default();
        config.pipeline.gap_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = GremviewConfig::default();
        config.pipeline.stage_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_endpoint() {
        let mut config = GremviewConfig::default();
        config.backend.traversal_source = "g2".to_string();
        let ep = config.backend.endpoint();
        assert_eq!(ep.url(), "ws://localhost:8182/gremlin");
        assert_eq!(ep.traversal_source, "g2");
    }
}
