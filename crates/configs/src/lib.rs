use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Virtual proxy prefix, e.g. `hdr` for `https://host/hdr/qrs/...`.
    #[serde(default)]
    pub prefix: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { scheme: default_scheme(), host: String::new(), port: default_port(), prefix: None }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Client certificate plus `X-Qlik-User` impersonation header.
    #[default]
    Certificate,
    /// Virtual proxy header authentication.
    Header,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default = "default_user_directory")]
    pub user_directory: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub client_cert: Option<String>,
    #[serde(default)]
    pub client_key: Option<String>,
    #[serde(default)]
    pub root_cert: Option<String>,
    #[serde(default)]
    pub header_name: Option<String>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            user_directory: default_user_directory(),
            user_id: default_user_id(),
            client_cert: None,
            client_key: None,
            root_cert: None,
            header_name: None,
            accept_invalid_certs: false,
        }
    }
}

/// How ids are obtained for entities created without one.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random UUID v4 generated locally, no extra request.
    #[default]
    Client,
    /// Fetch a template entity from the server and reuse its id.
    Template,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            id_strategy: IdStrategy::default(),
        }
    }
}

fn default_scheme() -> String { "https".into() }
fn default_port() -> u16 { 4242 }
fn default_user_directory() -> String { "INTERNAL".into() }
fn default_user_id() -> String { "sa_repository".into() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "qrs.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    common::env::load_dotenv();
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read config {path}: {e}"))?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH`, fall back to pure environment configuration
    /// when the file is missing, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        common::env::load_dotenv();
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env_overrides(common::env::var_non_empty);
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Override selected values from the environment. `lookup` returns the
    /// value of a variable, or `None` when it is unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("QRS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("QRS_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = lookup("QRS_USER_DIRECTORY") {
            self.auth.user_directory = dir;
        }
        if let Some(id) = lookup("QRS_USER_ID") {
            self.auth.user_id = id;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.auth.validate()?;
        self.client.validate()?;
        Ok(())
    }

    /// Base URL of the server including the virtual proxy prefix, without a
    /// trailing slash.
    pub fn base_url(&self) -> String {
        let mut url = format!("{}://{}:{}", self.server.scheme, self.server.host, self.server.port);
        if let Some(prefix) = self.server.prefix.as_deref() {
            url.push('/');
            url.push_str(prefix);
        }
        url
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        self.host = self.host.trim().to_string();
        if self.host.is_empty() {
            return Err(anyhow!("server.host is empty; set it in the config file or QRS_HOST"));
        }
        self.scheme = self.scheme.trim().to_lowercase();
        if self.scheme != "https" && self.scheme != "http" {
            return Err(anyhow!("server.scheme must be http or https"));
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        self.prefix = self
            .prefix
            .take()
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());
        Ok(())
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        if self.user_directory.trim().is_empty() || self.user_id.trim().is_empty() {
            return Err(anyhow!("auth.user_directory and auth.user_id are required"));
        }
        match self.mode {
            AuthMode::Certificate => {
                if self.client_cert.is_none() || self.client_key.is_none() {
                    return Err(anyhow!("certificate auth needs auth.client_cert and auth.client_key"));
                }
            }
            AuthMode::Header => {
                if self.header_name.as_deref().map_or(true, |h| h.trim().is_empty()) {
                    return Err(anyhow!("header auth needs auth.header_name"));
                }
            }
        }
        Ok(())
    }
}

impl ClientConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(anyhow!("client timeouts must be positive seconds"));
        }
        Ok(())
    }
}
