//! Relay configuration with TOML file support.
//!
//! The node endpoint, contract address, and signing account are required —
//! the process must not come up without them. Ports and logging have
//! sensible defaults. Heartbeat and reconnection timing are deliberately
//! not configurable (fixed by the supervisor).

use serde::{Deserialize, Serialize};

use crate::RelayError;

/// Process configuration, loaded once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    /// WebSocket JSON-RPC endpoint of the chain node (`ws://` or `wss://`).
    pub rpc_ws_url: String,

    /// Address of the refrigeration controller contract.
    pub contract_address: String,

    /// Node-managed account used to sign setpoint transactions.
    pub signer_address: String,

    /// Port for the viewer WebSocket server.
    #[serde(default = "default_viewer_port")]
    pub viewer_port: u16,

    /// Port for the command HTTP API.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to expose the Prometheus metrics endpoint.
    #[serde(default)]
    pub enable_metrics: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_viewer_port() -> u16 {
    8080
}

fn default_api_port() -> u16 {
    3000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RelayConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, RelayError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RelayError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string. Missing required fields are
    /// a parse error.
    pub fn from_toml_str(s: &str) -> Result<Self, RelayError> {
        let config: Self = toml::from_str(s).map_err(|e| RelayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value shapes beyond what serde enforces. Called by the loader;
    /// the daemon calls it again after applying CLI/env overrides.
    pub fn validate(&self) -> Result<(), RelayError> {
        if !self.rpc_ws_url.starts_with("ws://") && !self.rpc_ws_url.starts_with("wss://") {
            return Err(RelayError::Config(format!(
                "rpc_ws_url must be a ws:// or wss:// endpoint, got {:?}",
                self.rpc_ws_url
            )));
        }
        coldlink_evm::connection::parse_address(&self.contract_address)
            .map_err(|e| RelayError::Config(format!("contract_address: {e}")))?;
        coldlink_evm::connection::parse_address(&self.signer_address)
            .map_err(|e| RelayError::Config(format!("signer_address: {e}")))?;
        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("RelayConfig is always serializable to TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal_toml() -> String {
        r#"
            rpc_ws_url = "ws://127.0.0.1:8545"
            contract_address = "0x00000000000000000000000000000000000000aa"
            signer_address = "0x00000000000000000000000000000000000000bb"
        "#
        .to_string()
    }

    #[test]
    fn minimal_toml_uses_port_and_logging_defaults() {
        let config = RelayConfig::from_toml_str(&minimal_toml()).expect("should parse");
        assert_eq!(config.viewer_port, 8080);
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_level, "info");
        assert!(!config.enable_metrics);
    }

    #[test]
    fn overrides_apply() {
        let toml = format!("{}\nviewer_port = 9001\nenable_metrics = true", minimal_toml());
        let config = RelayConfig::from_toml_str(&toml).expect("should parse");
        assert_eq!(config.viewer_port, 9001);
        assert!(config.enable_metrics);
        assert_eq!(config.api_port, 3000); // default survives
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let toml = r#"
            rpc_ws_url = "ws://127.0.0.1:8545"
            contract_address = "0x00000000000000000000000000000000000000aa"
        "#;
        let err = RelayConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn http_url_is_rejected() {
        let toml = minimal_toml().replace("ws://", "http://");
        assert!(RelayConfig::from_toml_str(&toml).is_err());
    }

    #[test]
    fn malformed_contract_address_is_rejected() {
        let toml = minimal_toml().replace(
            "0x00000000000000000000000000000000000000aa",
            "not-an-address",
        );
        assert!(RelayConfig::from_toml_str(&toml).is_err());
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = RelayConfig::from_toml_file("/nonexistent/coldlink.toml");
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(minimal_toml().as_bytes()).unwrap();
        let config = RelayConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();

        let reparsed = RelayConfig::from_toml_str(&config.to_toml_string()).unwrap();
        assert_eq!(reparsed.rpc_ws_url, config.rpc_ws_url);
        assert_eq!(reparsed.viewer_port, config.viewer_port);
    }
}
