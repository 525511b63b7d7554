//! Server configuration.
//!
//! Layered, lowest precedence first:
//! 1. Defaults (`#[serde(default)]` on every section)
//! 2. Optional TOML/YAML file
//! 3. Environment variables prefixed `LOANER__`, nested with `__`
//!    (e.g. `LOANER__LISTEN_ADDR`, `LOANER__DATABASE__URL`,
//!    `LOANER__AUTH__PEPPER`)

use std::path::Path;

use ::config::{Config as ConfigBuilder, ConfigError, Environment, File};
use loaner_auth::AuthConfig;
use loaner_db::DbConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub listen_addr: String,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub cookie: CookieConfig,
    /// Only the current holder of a test user sees its password; it is
    /// omitted for everyone else, and for everyone while available.
    pub conceal_credentials: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".into(),
            database: DbConfig::default(),
            auth: AuthConfig::default(),
            cookie: CookieConfig::default(),
            conceal_credentials: false,
        }
    }
}

/// The session cookie.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    /// Set the `Secure` attribute. Enable whenever served over HTTPS.
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".into(),
            secure: false,
        }
    }
}

/// Load configuration from an optional file and the environment.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ConfigError> {
    ConfigBuilder::builder()
        .add_source(File::from(path.as_ref()).required(false))
        .add_source(
            Environment::with_prefix("LOANER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.database.url, "mem://");
        assert_eq!(config.auth.session_lifetime_secs, 604_800);
        assert_eq!(config.cookie.name, "session");
        assert!(!config.cookie.secure);
        assert!(!config.conceal_credentials);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load("definitely-not-here.toml").unwrap();
        assert_eq!(config.cookie.name, "session");
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("loaner-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "listen_addr = \"0.0.0.0:8080\"\n\
             conceal_credentials = true\n\
             [database]\n\
             namespace = \"staging\"\n\
             [cookie]\n\
             secure = true"
        )
        .unwrap();

        let config = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.conceal_credentials);
        assert_eq!(config.database.namespace, "staging");
        assert_eq!(config.database.url, "mem://");
        assert!(config.cookie.secure);
        assert_eq!(config.cookie.name, "session");
    }
}
