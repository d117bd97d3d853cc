//! Configuration module

use std::env;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;

/// Frontend origins allowed by default
const DEFAULT_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "https://vehicle-type-classification-frontend.onrender.com",
    "https://vehicle-type-classification.onrender.com",
    "https://*.onrender.com",
];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind IP, v4 or v6
    pub host: String,

    /// Server port
    pub port: u16,

    /// Persisted model file
    pub model_path: PathBuf,

    /// Seed for the bootstrap model when no model file can be loaded
    pub bootstrap_seed: u64,

    /// Trees in the bootstrap forest
    pub bootstrap_trees: usize,

    /// Write the bootstrap model to `model_path`
    pub persist_bootstrap: bool,

    /// CORS origins; "*" allows any origin, "https://*.example.com" any
    /// subdomain of example.com over https
    pub allowed_origins: Vec<String>,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("model/vehicle_model.json"),
            bootstrap_seed: 42,
            bootstrap_trees: crate::training::BOOTSTRAP_TREES,
            persist_bootstrap: true,
            allowed_origins: DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            bootstrap_seed: env::var("BOOTSTRAP_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bootstrap_seed),

            bootstrap_trees: env::var("BOOTSTRAP_TREES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.bootstrap_trees),

            persist_bootstrap: env::var("PERSIST_BOOTSTRAP")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.persist_bootstrap),

            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|v| parse_origins(&v))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.allowed_origins),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Socket address to listen on; IPv6 hosts need no brackets
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.trim().parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|pattern| origin_matches(pattern, origin))
    }

    pub fn bootstrap_options(&self) -> crate::training::BootstrapOptions {
        crate::training::BootstrapOptions {
            seed: self.bootstrap_seed,
            n_estimators: self.bootstrap_trees,
            persist: self.persist_bootstrap,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Exact match, or a `scheme://*.domain` pattern matching any subdomain
fn origin_matches(pattern: &str, origin: &str) -> bool {
    if pattern == "*" || pattern == origin {
        return true;
    }

    match pattern.split_once("://*.") {
        Some((scheme, domain)) => origin
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("://"))
            .and_then(|host| host.strip_suffix(domain))
            .and_then(|sub| sub.strip_suffix('.'))
            .is_some_and(|sub| !sub.is_empty() && !sub.contains('/')),
        None => false,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_path, PathBuf::from("model/vehicle_model.json"));
        assert!(config.persist_bootstrap);
        assert!(!config.allows_any_origin());
        assert!(!config.is_production());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );

        let config = Config {
            allowed_origins: parse_origins("*"),
            ..Config::default()
        };
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_bind_addr() {
        let v4 = Config::default().bind_addr().unwrap();
        assert_eq!(v4.to_string(), "0.0.0.0:5000");

        let v6 = Config {
            host: "::".to_string(),
            port: 8080,
            ..Config::default()
        };
        let addr = v6.bind_addr().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.to_string(), "[::]:8080");

        let bad = Config {
            host: "localhost:1".to_string(),
            ..Config::default()
        };
        assert!(bad.bind_addr().is_err());
    }

    #[test]
    fn test_origin_patterns() {
        let config = Config::default();

        assert!(config.allows_origin("http://localhost:3000"));
        assert!(config.allows_origin("https://vehicle-type-classification.onrender.com"));
        assert!(config.allows_origin("https://preview-42.onrender.com"));

        assert!(!config.allows_origin("http://preview-42.onrender.com"));
        assert!(!config.allows_origin("https://onrender.com"));
        assert!(!config.allows_origin("https://onrender.com.evil.test"));
        assert!(!config.allows_origin("https://evilonrender.com"));
        assert!(!config.allows_origin("http://localhost:4000"));
    }
}
