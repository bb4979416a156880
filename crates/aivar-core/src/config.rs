//! Configuration types.
//!
//! Configuration lives in `config.toml` under the platform config directory
//! (`~/.config/aivar/config.toml` on Linux). Every section is optional.
//! A handful of `AIVAR_*` environment variables override the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Origin the site is served from, e.g. "https://aivar.example".
    #[serde(default = "default_origin")]
    pub origin: String,

    #[serde(default)]
    pub navigation: NavigationConfig,

    #[serde(default)]
    pub sso: SsoConfig,

    #[serde(default)]
    pub voice_agent: VoiceAgentConfig,

    #[serde(default)]
    pub scene: SceneConfig,

    #[serde(default)]
    pub features: FeatureFlags,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            navigation: NavigationConfig::default(),
            sso: SsoConfig::default(),
            voice_agent: VoiceAgentConfig::default(),
            scene: SceneConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:5173".to_string()
}

/// Row navigation tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Minimum wheel delta / touch travel for a gesture to count.
    pub scroll_threshold: f64,

    /// Minimum time between accepted gestures.
    pub cooldown_ms: u64,

    /// Viewport widths up to this value are treated as mobile.
    pub mobile_max_width: u32,

    /// Which edge entering rows come from.
    pub entry_direction: EntryDirectionPolicy,

    /// What to do when a device-class change leaves the current row out of bounds.
    pub on_device_change: DeviceChangePolicy,

    /// Duration of the exit half of a transition.
    pub exit_ms: u64,

    /// Duration of the enter half of a transition.
    pub enter_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: 50.0,
            cooldown_ms: 800,
            mobile_max_width: 639,
            entry_direction: EntryDirectionPolicy::Directional,
            on_device_change: DeviceChangePolicy::Clamp,
            exit_ms: 200,
            enter_ms: 450,
        }
    }
}

impl NavigationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn exit_duration(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }

    pub fn enter_duration(&self) -> Duration {
        Duration::from_millis(self.enter_ms)
    }
}

/// Edge selection for entering rows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirectionPolicy {
    /// Always enter from below, exit upward.
    Fixed,
    /// Enter from below when advancing, from above when retreating.
    #[default]
    Directional,
}

/// Policy for a current row beyond the bound of a new device class.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChangePolicy {
    /// Move to the last valid row.
    #[default]
    Clamp,
    /// Go back to the first row.
    Reset,
}

/// SSO settings. Unset values are derived from the origin.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SsoConfig {
    pub authority: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub post_logout_redirect_uri: Option<String>,
    pub silent_redirect_uri: Option<String>,
}

const STAGING_AUTHORITY: &str = "https://auth.staging.aisharing.ai/realms/ais";
const PRODUCTION_AUTHORITY: &str = "https://auth.production.aisharing.ai/realms/ais";
const DEFAULT_CLIENT_ID: &str = "aivarmetaland-client";

/// Fully resolved OIDC client settings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SsoSettings {
    pub authority: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub post_logout_redirect_uri: String,
    pub silent_redirect_uri: String,
    pub response_type: &'static str,
    pub scope: &'static str,
    pub load_user_info: bool,
    pub automatic_silent_renew: bool,
}

/// Voice agent settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VoiceAgentConfig {
    /// Agent identifier. Empty means not configured.
    pub agent_id: String,

    /// Variables passed to the agent when a session starts.
    pub dynamic_variables: BTreeMap<String, String>,
}

impl Default for VoiceAgentConfig {
    fn default() -> Self {
        let dynamic_variables = [
            ("nome_utente", "Utente"),
            ("cliente_ecommerce", "no"),
            ("acquisti_recenti", "nessuno"),
            ("cliente_viaggi", "no"),
            ("cliente_giochi", "no"),
            ("giochi_preferiti", "nessuno"),
            ("ultima_visita", "prima volta"),
            ("cliente_finanza", "no"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            agent_id: String::new(),
            dynamic_variables,
        }
    }
}

/// Embedded 3D scene settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SceneConfig {
    pub url: String,

    /// Frame rate below which a performance warning is shown.
    pub fps_threshold: u32,

    /// Delay before frame rate monitoring starts.
    pub warmup_ms: u64,

    pub monitoring: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            url: "https://prod.spline.design/U4pluEHM1r2eie-d/scene.splinecode".to_string(),
            fps_threshold: 30,
            warmup_ms: 2000,
            monitoring: true,
        }
    }
}

/// Feature flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureFlags {
    pub voice_chat: bool,
    pub animations: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            voice_chat: true,
            animations: true,
        }
    }
}

impl SiteConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path.map(Path::to_path_buf).or_else(config_path) {
            Some(p) if path.is_some() || p.exists() => Self::from_file(&p)?,
            Some(p) => {
                tracing::info!("No config found at {:?}, using defaults", p);
                Self::default()
            }
            None => {
                tracing::info!("No config directory, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Overlay `AIVAR_*` environment overrides using the given lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = non_empty("AIVAR_SSO_AUTHORITY") {
            self.sso.authority = Some(v);
        }
        if let Some(v) = non_empty("AIVAR_SSO_CLIENT_ID") {
            self.sso.client_id = Some(v);
        }
        if let Some(v) = non_empty("AIVAR_SSO_REDIRECT_URI") {
            self.sso.redirect_uri = Some(v);
        }
        if let Some(v) = non_empty("AIVAR_SSO_POST_LOGOUT_REDIRECT_URI") {
            self.sso.post_logout_redirect_uri = Some(v);
        }
        if let Some(v) = non_empty("AIVAR_SSO_SILENT_REDIRECT_URI") {
            self.sso.silent_redirect_uri = Some(v);
        }
        if let Some(v) = non_empty("AIVAR_VOICE_AGENT_ID") {
            self.voice_agent.agent_id = v;
        }
    }

    /// Reject values the navigation core cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        if !nav.scroll_threshold.is_finite() || nav.scroll_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "navigation.scroll_threshold",
                message: format!("expected a non-negative number, got {}", nav.scroll_threshold),
            });
        }
        if nav.exit_ms + nav.enter_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "navigation.exit_ms",
                message: "exit_ms and enter_ms cannot both be zero".to_string(),
            });
        }
        if self.origin.trim_end_matches('/').is_empty() {
            return Err(ConfigError::Invalid {
                field: "origin",
                message: "origin cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the site is running against a local development host.
    pub fn is_development(&self) -> bool {
        let host = self
            .origin
            .split("://")
            .nth(1)
            .unwrap_or(&self.origin)
            .split(['/', ':'])
            .next()
            .unwrap_or_default();
        host == "localhost" || host == "127.0.0.1"
    }

    /// Resolve SSO settings, deriving unset values from the origin.
    pub fn sso_settings(&self) -> SsoSettings {
        let origin = self.origin.trim_end_matches('/');
        let authority = if self.is_development() {
            STAGING_AUTHORITY
        } else {
            PRODUCTION_AUTHORITY
        };

        SsoSettings {
            authority: self.sso.authority.clone().unwrap_or_else(|| authority.to_string()),
            client_id: self
                .sso
                .client_id
                .clone()
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            redirect_uri: self
                .sso
                .redirect_uri
                .clone()
                .unwrap_or_else(|| format!("{origin}/#/callback")),
            post_logout_redirect_uri: self
                .sso
                .post_logout_redirect_uri
                .clone()
                .unwrap_or_else(|| format!("{origin}/#/")),
            silent_redirect_uri: self
                .sso
                .silent_redirect_uri
                .clone()
                .unwrap_or_else(|| format!("{origin}/silent-renew.html")),
            response_type: "code",
            scope: "openid profile email",
            load_user_info: true,
            automatic_silent_renew: true,
        }
    }
}

/// Get the path to config.toml.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aivar"))
}
