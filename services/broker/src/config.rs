use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

// Broker configuration from CLI flags, with env fallbacks for deployments
// that prefer variables over arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "no-spam-broker")]
#[command(about = "Multi-tenant push-notification broker")]
pub struct BrokerConfig {
    /// Address to listen on
    #[arg(long, default_value = ":8443", env = "NOSPAM_ADDR")]
    pub addr: String,

    /// Path to TLS certificate file
    #[arg(long = "cert", default_value = "certs/cert.pem", env = "NOSPAM_CERT")]
    pub cert: PathBuf,

    /// Path to TLS key file
    #[arg(long = "key", default_value = "certs/key.pem", env = "NOSPAM_KEY")]
    pub key: PathBuf,

    /// Run in HTTP mode (disable TLS, for proxy-fronted deployment)
    #[arg(long, env = "NOSPAM_HTTP")]
    pub http: bool,

    /// Path to Firebase credentials file (optional)
    #[arg(long = "fcm-creds", default_value = "", env = "NOSPAM_FCM_CREDS")]
    pub fcm_creds: String,

    /// Path to the broker database file
    #[arg(long = "db", default_value = "no-spam.db", env = "NOSPAM_DB")]
    pub db: String,

    /// Serve Prometheus metrics on this address
    #[arg(long = "metrics-bind", env = "NOSPAM_METRICS_BIND")]
    pub metrics_bind: Option<SocketAddr>,

    /// Fixed admin bootstrap password, for end-to-end test setups
    #[arg(
        long = "initial-admin-password",
        hide = true,
        env = "NOSPAM_INITIAL_ADMIN_PASSWORD"
    )]
    pub initial_admin_password: Option<String>,
}

impl BrokerConfig {
    /// Resolve the listen address. A bare `:port` binds every interface.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let addr = if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        };
        addr.parse()
            .with_context(|| format!("parse listen address: {}", self.addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let config = BrokerConfig::parse_from(["no-spam-broker"]);
        assert_eq!(config.addr, ":8443");
        assert_eq!(config.cert, PathBuf::from("certs/cert.pem"));
        assert_eq!(config.key, PathBuf::from("certs/key.pem"));
        assert!(!config.http);
        assert_eq!(config.fcm_creds, "");
        assert_eq!(config.db, "no-spam.db");
        assert!(config.metrics_bind.is_none());
        assert!(config.initial_admin_password.is_none());
    }

    #[test]
    fn bare_port_listen_addr_binds_all_interfaces() {
        let config = BrokerConfig::parse_from(["no-spam-broker", "--addr", ":9443"]);
        assert_eq!(
            config.listen_addr().expect("addr").to_string(),
            "0.0.0.0:9443"
        );
    }

    #[test]
    fn full_listen_addr_is_used_as_given() {
        let config = BrokerConfig::parse_from(["no-spam-broker", "--addr", "127.0.0.1:8080"]);
        assert_eq!(
            config.listen_addr().expect("addr").to_string(),
            "127.0.0.1:8080"
        );
    }

    #[test]
    fn invalid_listen_addr_is_rejected() {
        let config = BrokerConfig::parse_from(["no-spam-broker", "--addr", "not-an-address"]);
        assert!(config.listen_addr().is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let config = BrokerConfig::parse_from([
            "no-spam-broker",
            "--http",
            "--db",
            "scratch.db",
            "--fcm-creds",
            "creds.json",
        ]);
        assert!(config.http);
        assert_eq!(config.db, "scratch.db");
        assert_eq!(config.fcm_creds, "creds.json");
    }
}
