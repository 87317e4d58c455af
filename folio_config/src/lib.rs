use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{File, FileFormat};
use folio_models::email_address::EmailAddressWithName;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

pub fn load(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Trust a reverse proxy to report the real client ip.
    pub real_ip: Option<RealIpConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from: EmailAddressWithName,
    pub send_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Recipient of relayed contact form messages.
    pub email: EmailAddressWithName,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub quota: u64,
    pub window: Duration,
}

#[derive(Debug, Deserialize)]
pub struct CorsConfig {
    pub allowed_origin: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut out = std::time::Duration::default();
        for part in s.split_whitespace() {
            let mut bytes = part.bytes();
            let mut seconds = 0;
            for b in bytes.by_ref() {
                match b {
                    b'0'..=b'9' => seconds = seconds * 10 + (b - b'0') as u64,
                    b's' => break,
                    b'm' => {
                        seconds *= 60;
                        break;
                    }
                    b'h' => {
                        seconds *= 3600;
                        break;
                    }
                    b'd' => {
                        seconds *= 24 * 3600;
                        break;
                    }
                    _ => return Err(serde::de::Error::custom("Invalid duration")),
                }
            }
            if bytes.next().is_some() {
                return Err(serde::de::Error::custom("Invalid duration"));
            }
            out += std::time::Duration::from_secs(seconds);
        }
        Ok(Self(out))
    }
}
