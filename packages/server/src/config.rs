//! Listener and log settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 5050;

#[derive(Debug, thiserror::Error)]
#[error("invalid {var}={value:?}: expected {expected}")]
pub struct ServerConfigError {
    pub var: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    /// Read `PRINTFLOW_HOST`, `PRINTFLOW_PORT` and `LOG_FORMAT` (`pretty` or `json`).
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = get("PRINTFLOW_HOST") {
            config.host = raw.parse().map_err(|_| ServerConfigError {
                var: "PRINTFLOW_HOST",
                value: raw.clone(),
                expected: "IP address",
            })?;
        }
        if let Some(raw) = get("PRINTFLOW_PORT") {
            config.port = raw.parse().map_err(|_| ServerConfigError {
                var: "PRINTFLOW_PORT",
                value: raw.clone(),
                expected: "port number",
            })?;
        }
        if let Some(raw) = get("LOG_FORMAT") {
            config.log_format = match raw.to_ascii_lowercase().as_str() {
                "pretty" | "text" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ServerConfigError {
                        var: "LOG_FORMAT",
                        value: raw,
                        expected: "pretty|json",
                    });
                }
            };
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_localhost_5050() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr().to_string(), "127.0.0.1:5050");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PRINTFLOW_HOST", "0.0.0.0"),
            ("PRINTFLOW_PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PRINTFLOW_PORT", "http")])).unwrap_err();
        assert_eq!(err.var, "PRINTFLOW_PORT");
    }
}
