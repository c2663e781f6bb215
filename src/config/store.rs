//! Graph store connection configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Write semantics for per-document loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Replace the named graph (HTTP PUT), idempotent
    Replace,
    /// Add to the named graph (HTTP POST), duplicates on re-run
    Append,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph store endpoints and credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Graph Store Protocol endpoint, including the `?graph=` parameter
    #[serde(default = "default_data_url")]
    pub data_url: String,
    /// SPARQL update endpoint
    #[serde(default = "default_update_url")]
    pub update_url: String,
    /// SPARQL query endpoint
    #[serde(default = "default_query_url")]
    pub query_url: String,
    /// Basic auth user
    #[serde(default = "default_username")]
    pub username: String,
    /// Basic auth password
    #[serde(default)]
    pub password: String,
    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Replace or append for per-document writes
    #[serde(default = "default_write_mode")]
    pub write_mode: WriteMode,
    /// Log the response body of every write at debug level
    #[serde(default = "default_log_response_body")]
    pub log_response_body: bool,
}

fn default_data_url() -> String {
    "http://fuseki:3030/dataset/data?graph=http://projectgutenberg.org/graph/ebooks".to_string()
}

fn default_update_url() -> String {
    "http://fuseki:3030/dataset/update".to_string()
}

fn default_query_url() -> String {
    "http://fuseki:3030/dataset/query".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_write_mode() -> WriteMode {
    WriteMode::Replace
}

fn default_log_response_body() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_url: default_data_url(),
            update_url: default_update_url(),
            query_url: default_query_url(),
            username: default_username(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
            write_mode: default_write_mode(),
            log_response_body: default_log_response_body(),
        }
    }
}

// Keeps the password out of logs and panic messages
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("data_url", &self.data_url)
            .field("update_url", &self.update_url)
            .field("query_url", &self.query_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("write_mode", &self.write_mode)
            .field("log_response_body", &self.log_response_body)
            .finish()
    }
}
