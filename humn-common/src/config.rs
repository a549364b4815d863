//! Bootstrap configuration loading
//!
//! Settings are resolved in this priority order:
//! 1. Command-line arguments (applied by each binary after loading)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing config file is not an error: a warning is logged and the
//! compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default admin HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Default admin session lifetime (24 hours)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24;

/// Public site URL; calls-to-action point here
pub const SITE_URL: &str = "https://xn--humn-7z5f.com";

/// Full configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub story: StoryConfig,
    pub storage: StorageConfig,
    pub integrations: IntegrationsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Admin credentials and policy
///
/// Login is refused outright when either credential is unset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    pub session_ttl_secs: u64,
    /// Account identifiers granted admin rights in the member area
    pub allowed_ids: Vec<String>,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            allowed_ids: Vec::new(),
            secure_cookies: false,
        }
    }
}

impl AdminConfig {
    /// Whether `id` is on the configured admin allow-list
    pub fn is_allowed(&self, id: &str) -> bool {
        !id.is_empty() && self.allowed_ids.iter().any(|allowed| allowed == id)
    }
}

/// Story presentation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Prefix prepended to each narration audio path
    pub audio_base_url: String,
    /// Nominal length of one narration in the terminal rehearsal player
    pub rehearsal_section_secs: u64,
    /// Link used by call-to-action sections
    pub show_interest_url: String,
    /// Directory served under `/story/` by the admin service
    pub audio_dir: Option<PathBuf>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            audio_base_url: String::new(),
            rehearsal_section_secs: 20,
            show_interest_url: SITE_URL.to_string(),
            audio_dir: None,
        }
    }
}

/// Local document store settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; `None` resolves to the platform data directory
    pub database_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Database path, falling back to the OS-dependent default
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Third-party API credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    /// Contact copied on (and replying to) every welcome email
    pub email_cc: Option<String>,
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            gemini_api_key: None,
            resend_api_key: None,
            email_from: "hello@xn--humn-7z5f.com".to_string(),
            email_cc: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Load configuration for a binary.
    ///
    /// An explicit path must exist. Without one, the platform config
    /// locations are searched; when none exists the defaults are used.
    /// Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => match find_config_file() {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => {
                    warn!("No config file found, using compiled defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay environment variables using `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("HUMN_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(email) = get("ADMIN_EMAIL") {
            self.admin.email = Some(email);
        }
        if let Some(password) = get("ADMIN_PASSWORD") {
            self.admin.password = Some(password);
        }
        if let Some(ids) = get("HUMN_ADMIN_IDS") {
            self.admin.allowed_ids = ids
                .split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
        }
        if let Some(path) = get("HUMN_DATABASE") {
            self.storage.database_path = Some(PathBuf::from(path));
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.integrations.openai_api_key = Some(key);
        }
        if let Some(key) = get("GOOGLE_GENERATIVE_AI_API_KEY") {
            self.integrations.gemini_api_key = Some(key);
        }
        if let Some(key) = get("RESEND_API_KEY") {
            self.integrations.resend_api_key = Some(key);
        }
        if let Some(level) = get("HUMN_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

/// Search the platform config locations.
///
/// Linux: `~/.config/humn/config.toml`, then `/etc/humn/config.toml`.
/// Elsewhere: the platform config dir only.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("humn").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/humn/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("humn").join("humn.db"))
        .unwrap_or_else(|| PathBuf::from("./humn_data/humn.db"))
}
