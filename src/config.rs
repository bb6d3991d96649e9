use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    // where the OAuth token JSON lives
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Name of the editorial playlist copied from.
    #[serde(default = "default_source_playlist")]
    pub source_playlist: String,

    /// Visibility of playlists created by a sync. Private unless set.
    #[serde(default)]
    pub public: bool,

    /// When set, logs are also written to a daily-rotated file here.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_auth_base")]
    pub auth_base: String,
}

fn default_redirect_uri() -> String { "http://127.0.0.1:8888/callback".into() }
fn default_source_playlist() -> String { "Discover Weekly".into() }
fn default_api_base() -> String { "https://api.spotify.com/v1".into() }
fn default_auth_base() -> String { "https://accounts.spotify.com".into() }

fn default_token_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rediscover-weekly")
        .join("token.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            token_path: default_token_path(),
            source_playlist: default_source_playlist(),
            public: false,
            log_dir: None,
            api_base: default_api_base(),
            auth_base: default_auth_base(),
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Resolve the config: an explicit path must parse; otherwise the
    /// per-user config file is used if present, else defaults. Environment
    /// overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = match explicit {
            Some(p) => Self::from_path(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_path(&p)?,
                _ => Config::default(),
            },
        };
        cfg.apply_env_with(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup. Both the `SPOTIPY_*` names
    /// used by older tooling and `SPOTIFY_*` are accepted; `SPOTIFY_*` wins.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |suffix: &str| {
            lookup(&format!("SPOTIFY_{}", suffix))
                .or_else(|| lookup(&format!("SPOTIPY_{}", suffix)))
                .filter(|v| !v.is_empty())
        };
        if let Some(v) = pick("CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = pick("CLIENT_SECRET") {
            self.client_secret = v;
        }
        if let Some(v) = pick("REDIRECT_URI") {
            self.redirect_uri = v;
        }
        if let Some(v) = lookup("SPOTIFY_API_BASE").filter(|v| !v.is_empty()) {
            self.api_base = v;
        }
        if let Some(v) = lookup("SPOTIFY_AUTH_BASE").filter(|v| !v.is_empty()) {
            self.auth_base = v;
        }
    }

    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rediscover-weekly").join("config.toml"))
}
