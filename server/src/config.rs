use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 9001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    Any,
    Exact(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub cors_origin: CorsOrigin,
    pub log_format: LogFormat,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors_origin: CorsOrigin::Exact(DEFAULT_CORS_ORIGIN.to_string()),
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `PORT`, `BIND_ADDR`, `CORS_ORIGIN` and `LOG_FORMAT`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = ServerConfig::default();

        if let Some(v) = lookup("PORT") {
            cfg.port = v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: v.clone(),
                expected: "port number",
            })?;
        }
        if let Some(v) = lookup("BIND_ADDR") {
            cfg.bind_addr = v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "BIND_ADDR",
                value: v.clone(),
                expected: "IP address",
            })?;
        }
        if let Some(v) = lookup("CORS_ORIGIN") {
            cfg.cors_origin = match v.trim() {
                "*" => CorsOrigin::Any,
                "" => {
                    return Err(ConfigError::Invalid {
                        var: "CORS_ORIGIN",
                        value: v,
                        expected: "origin or *",
                    })
                }
                origin => CorsOrigin::Exact(origin.to_string()),
            };
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            cfg.log_format = match v.trim().to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "LOG_FORMAT",
                        value: v,
                        expected: "log format (text|json)",
                    })
                }
            };
        }
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
