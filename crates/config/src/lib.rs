use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "portal.toml",
    "config/portal.toml",
    "crates/config/portal.toml",
    "../portal.toml",
    "../config/portal.toml",
    "../crates/config/portal.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
    #[serde(default)]
    pub agreements: AgreementsConfig,
}

/// Site scoping for per-site records kept in the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub sitekey: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sitekey: "portal".to_string(),
        }
    }
}

/// Connection settings for the user-directory service.
///
/// ```
/// use portal_config::DirectoryConfig;
///
/// let directory = DirectoryConfig::default();
/// assert_eq!(directory.base_url, "http://127.0.0.1:8081");
/// assert_eq!(directory.request_timeout_seconds, 10);
/// assert!(directory.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "DirectoryConfig::default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl DirectoryConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:8081".to_string()
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_key: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    #[serde(default = "MailerConfig::default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl MailerConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:8082".to_string()
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_key: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Terms-of-service agreement approved for every new registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementsConfig {
    #[serde(default = "AgreementsConfig::default_tos_id")]
    pub tos_id: String,
    #[serde(default = "AgreementsConfig::default_tos_version")]
    pub tos_version: String,
}

impl AgreementsConfig {
    fn default_tos_id() -> String {
        "test_tos".to_string()
    }

    fn default_tos_version() -> String {
        "version_0".to_string()
    }
}

impl Default for AgreementsConfig {
    fn default() -> Self {
        Self {
            tos_id: Self::default_tos_id(),
            tos_version: Self::default_tos_version(),
        }
    }
}

const fn default_request_timeout() -> u64 {
    10
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use portal_config::load;
///
/// std::env::remove_var("PORTAL_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.session.sitekey.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let timeout = |seconds: u64| i64::try_from(seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("session.sitekey", defaults.session.sitekey.clone())?
        .set_default("directory.base_url", defaults.directory.base_url.clone())?
        .set_default(
            "directory.request_timeout_seconds",
            timeout(defaults.directory.request_timeout_seconds),
        )?
        .set_default("mailer.base_url", defaults.mailer.base_url.clone())?
        .set_default(
            "mailer.request_timeout_seconds",
            timeout(defaults.mailer.request_timeout_seconds),
        )?
        .set_default("agreements.tos_id", defaults.agreements.tos_id.clone())?
        .set_default(
            "agreements.tos_version",
            defaults.agreements.tos_version.clone(),
        )?;

    let environment_overrides = config::Environment::with_prefix("PORTAL").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("PORTAL_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via PORTAL_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.session.sitekey.trim().is_empty() {
        anyhow::bail!("session.sitekey must not be empty");
    }

    debug!(sitekey = %config.session.sitekey, "loaded portal configuration");
    Ok(config)
}
