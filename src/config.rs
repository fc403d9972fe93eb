use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

static CONFIG: OnceLock<ServerConfig> = OnceLock::new();

/// Byte ceilings a parser enforces on one message.
///
/// These are the only defense against a peer streaming unbounded header or
/// body data, so every parser is built with an explicit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserLimits {
    /// Start line, header lines and their CRLFs, blank line included
    pub max_header_size: usize,
    pub max_body_size: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_header_size: 8192,
            max_body_size: 1024 * 1024, // 1 MB
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,

    #[serde(flatten)]
    pub limits: ParserLimits,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub write_timeout: Duration,

    pub server_name: String,

    /// Sub-protocols the server agrees to; empty accepts whatever the client asks for first
    pub subprotocols: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 9005,

            limits: ParserLimits::default(),

            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),

            server_name: "rustyshake/0.1".to_string(),

            subprotocols: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!("Fail to read {}: {err}", path.display());
                warn!("Fall back to default config");
                return ServerConfig::default();
            }
        };

        match Self::from_toml(&content) {
            Ok(server_config) => server_config,
            Err(err) => {
                warn!("Fail to deserialize config file {}: {err}", path.display());
                warn!("Fall back to default config");
                ServerConfig::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ServerConfig>(content)
    }
}

/// Installs the process-wide config. Only the first call has an effect.
pub fn set_config(cfg: ServerConfig) {
    if CONFIG.set(cfg).is_err() {
        warn!("Config already set, keeping the first one");
    }
}

/// Process-wide config, the default one if [`set_config`] was never called.
pub fn config() -> &'static ServerConfig {
    CONFIG.get_or_init(ServerConfig::default)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
