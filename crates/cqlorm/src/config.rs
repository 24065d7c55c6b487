//! Cluster/session configuration.

use crate::error::{OrmError, OrmResult};
use crate::monitor::MonitorConfig;
use serde::Deserialize;
use std::path::Path;

/// Connection and bootstrap settings, usually loaded from `cqlorm.toml`.
///
/// ```toml
/// hosts = ["127.0.0.1:9042"]
/// keyspace = "example_keyspace"
/// username = "${SCYLLA_USER}"
/// password = "${SCYLLA_PASSWORD}"
///
/// [replication]
/// strategy = "SimpleStrategy"
/// factor = 1
///
/// [logging]
/// queries = true
/// slow_query_ms = 500
/// ```
///
/// `${VAR}` references in string values are replaced from the environment when loading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub replication: ReplicationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplicationConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_factor")]
    pub factor: u32,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            factor: default_factor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Send every statement to the query log sink.
    #[serde(default = "default_true")]
    pub queries: bool,
    /// Report statements slower than this many milliseconds.
    #[serde(default)]
    pub slow_query_ms: Option<u64>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            queries: true,
            slow_query_ms: None,
        }
    }
}

fn default_strategy() -> String {
    "SimpleStrategy".to_string()
}

fn default_factor() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl SessionConfig {
    /// Config for `hosts` and `keyspace` with every other setting at its default.
    pub fn new<S: Into<String>>(hosts: impl IntoIterator<Item = S>, keyspace: &str) -> Self {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            keyspace: keyspace.to_string(),
            username: None,
            password: None,
            replication: ReplicationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Set password credentials.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    /// Parse, expand `${VAR}` references and validate.
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        let mut config: SessionConfig = toml::from_str(raw)?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|e| OrmError::config(format!("{}: {e}", path.display())))
    }

    fn expand_env(&mut self) -> OrmResult<()> {
        for host in &mut self.hosts {
            *host = expand_env_vars(host)?;
        }
        self.keyspace = expand_env_vars(&self.keyspace)?;
        if let Some(user) = self.username.as_mut() {
            *user = expand_env_vars(user)?;
        }
        if let Some(pass) = self.password.as_mut() {
            *pass = expand_env_vars(pass)?;
        }
        self.replication.strategy = expand_env_vars(&self.replication.strategy)?;
        Ok(())
    }

    /// Check the settings that would otherwise fail late at connect time.
    pub fn validate(&self) -> OrmResult<()> {
        if self.hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(OrmError::config("at least one host is required"));
        }
        if !is_identifier(&self.keyspace) {
            return Err(OrmError::config(format!(
                "invalid keyspace name '{}': expected letters, digits and '_'",
                self.keyspace
            )));
        }
        if !is_identifier(&self.replication.strategy) {
            return Err(OrmError::config(format!(
                "invalid replication strategy '{}'",
                self.replication.strategy
            )));
        }
        if self.replication.factor == 0 {
            return Err(OrmError::config("replication factor must be at least 1"));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(OrmError::config(
                "username and password must be given together",
            ));
        }
        Ok(())
    }

    /// `CREATE KEYSPACE IF NOT EXISTS` statement for this config.
    pub fn create_keyspace_cql(&self) -> String {
        format!(
            "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': '{}', 'replication_factor': {}}}",
            self.keyspace, self.replication.strategy, self.replication.factor
        )
    }

    /// Monitor settings derived from `[logging]`.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::from(&self.logging)
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn expand_env_vars(input: &str) -> OrmResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(OrmError::config(format!(
                    "unterminated env var reference: ${{{key}"
                )));
            }
            if key.is_empty() {
                return Err(OrmError::config("invalid env var reference: ${}"));
            }

            let v = std::env::var(&key).map_err(|_| {
                OrmError::config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
