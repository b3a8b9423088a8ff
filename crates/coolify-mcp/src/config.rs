use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use coolify_api::CoolifyConfig;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// How the MCP endpoint is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

impl FromStr for Transport {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub coolify: CoolifyConfig,
    pub transport: Transport,
    pub listen_addr: SocketAddr,
    /// Bearer key required by the HTTP gateway. `None` leaves it open.
    pub gateway_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("COOLIFY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let access_token =
            get("COOLIFY_ACCESS_TOKEN").ok_or(ConfigError::Missing("COOLIFY_ACCESS_TOKEN"))?;

        let transport = match get("MCP_TRANSPORT") {
            Some(value) => value.parse::<Transport>().map_err(|_| ConfigError::Invalid {
                name: "MCP_TRANSPORT",
                value,
            })?,
            None => Transport::Stdio,
        };

        let listen_addr = get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into());
        let listen_addr: SocketAddr = listen_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "LISTEN_ADDR",
            value: listen_addr.clone(),
        })?;

        Ok(Self {
            coolify: CoolifyConfig {
                base_url,
                access_token,
            },
            transport,
            listen_addr,
            gateway_api_key: get("GATEWAY_API_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = config_from(&[("COOLIFY_ACCESS_TOKEN", "secret")]).unwrap();

        assert_eq!(config.coolify.base_url, "http://localhost:3000");
        assert_eq!(config.coolify.access_token, "secret");
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert!(config.gateway_api_key.is_none());
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = config_from(&[("COOLIFY_BASE_URL", "https://coolify.example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("COOLIFY_ACCESS_TOKEN")));
        assert_eq!(err.to_string(), "COOLIFY_ACCESS_TOKEN must be set");

        let err = config_from(&[("COOLIFY_ACCESS_TOKEN", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn reads_http_mode_settings() {
        let config = config_from(&[
            ("COOLIFY_BASE_URL", "https://coolify.example.com"),
            ("COOLIFY_ACCESS_TOKEN", "secret"),
            ("MCP_TRANSPORT", "HTTP"),
            ("LISTEN_ADDR", "127.0.0.1:8080"),
            ("GATEWAY_API_KEY", "gw-key"),
        ])
        .unwrap();

        assert_eq!(config.coolify.base_url, "https://coolify.example.com");
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.gateway_api_key.as_deref(), Some("gw-key"));
    }

    #[test]
    fn rejects_unknown_transport_and_bad_addr() {
        let err = config_from(&[("COOLIFY_ACCESS_TOKEN", "t"), ("MCP_TRANSPORT", "sse")])
            .unwrap_err();
        assert_eq!(err.to_string(), r#"MCP_TRANSPORT is invalid: "sse""#);

        let err = config_from(&[("COOLIFY_ACCESS_TOKEN", "t"), ("LISTEN_ADDR", "nope")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LISTEN_ADDR", .. }));
    }
}
