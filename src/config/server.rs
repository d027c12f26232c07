use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "keyline.toml";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public base URL for external access (e.g., "https://portal.example.com").
    /// Used for building public file URLs. If not set, URLs are derived from request headers.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// API key for the transactional email provider. Without one, emails are only logged.
    pub resend_api_key: Option<String>,
    pub api_url: String,
    pub from_address: String,
    pub studio_name: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            api_url: "https://api.resend.com".to_string(),
            from_address: "Keyline Studios <hello@keylinestudios.com>".to_string(),
            studio_name: "Keyline Studios".to_string(),
        }
    }
}

/// On-disk overrides read from `<data_dir>/keyline.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_base_url: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub notify: FileNotifyConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileNotifyConfig {
    pub resend_api_key: Option<String>,
    pub api_url: Option<String>,
    pub from_address: Option<String>,
    pub studio_name: Option<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("keyline.db")
    }

    #[must_use]
    pub fn admin_token_path(&self) -> PathBuf {
        self.data_dir.join(".admin_token")
    }

    /// Builds a config for `data_dir`, applying `keyline.toml` from that directory if present.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Self {
            data_dir: data_dir.into(),
            ..Self::default()
        };

        let path = config.data_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            let file = read_file_config(&path)?;
            config.apply(file);
        }

        Ok(config)
    }

    pub fn apply(&mut self, file: FileConfig) {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if file.public_base_url.is_some() {
            self.public_base_url = file.public_base_url;
        }
        if let Some(limit) = file.max_upload_bytes {
            self.max_upload_bytes = limit;
        }

        let notify = file.notify;
        if notify.resend_api_key.is_some() {
            self.notify.resend_api_key = notify.resend_api_key;
        }
        if let Some(url) = notify.api_url {
            self.notify.api_url = url;
        }
        if let Some(from) = notify.from_address {
            self.notify.from_address = from;
        }
        if let Some(name) = notify.studio_name {
            self.notify.studio_name = name;
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            public_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            notify: NotifyConfig::default(),
        }
    }
}
