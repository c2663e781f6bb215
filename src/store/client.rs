//! Blocking HTTP client for a SPARQL graph store (Fuseki and friends)

use super::{GraphStore, SendOutcome, StoreError, WriteMode, RDF_XML, SPARQL_QUERY, SPARQL_UPDATE};
use crate::config::StoreConfig;
use crate::util::truncate_str;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Response bodies kept in a [`SendOutcome::Rejected`]
const MAX_BODY_EXCERPT: usize = 512;

const USER_AGENT: &str = concat!("gutenberg-graph/", env!("CARGO_PKG_VERSION"));

/// `Authorization` header value for HTTP Basic authentication
pub fn basic_auth_value(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Graph store client with credentials fixed at construction
#[derive(Debug)]
pub struct StoreClient {
    client: Client,
    config: StoreConfig,
}

impl StoreClient {
    /// Create a client for the configured endpoints
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        info!(
            "Initializing graph store client: data={}, user={}, mode={}",
            config.data_url, config.username, config.write_mode
        );

        let mut auth = HeaderValue::from_str(&basic_auth_value(&config.username, &config.password))
            .map_err(|e| StoreError::Config(format!("Invalid credentials: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn write(&self, document: &str, mode: WriteMode) -> reqwest::Result<Response> {
        let request = match mode {
            WriteMode::Replace => self.client.put(&self.config.data_url),
            WriteMode::Append => self.client.post(&self.config.data_url),
        };

        request
            .header(CONTENT_TYPE, RDF_XML)
            .body(document.to_owned())
            .send()
    }

    /// Submit update-language text to the update endpoint
    pub fn update(&self, update: &str) -> Result<String, StoreError> {
        self.submit(&self.config.update_url, SPARQL_UPDATE, update)
    }

    /// Submit a query and return the result set as the store rendered it
    pub fn query(&self, query: &str) -> Result<String, StoreError> {
        self.submit(&self.config.query_url, SPARQL_QUERY, query)
    }

    fn submit(&self, url: &str, content_type: &str, body: &str) -> Result<String, StoreError> {
        debug!("POST {} ({}, {} bytes)", url, content_type, body.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.to_owned())
            .send()?;

        let status = response.status();
        let text = response.text()?;

        if self.config.log_response_body {
            debug!("Response {}: {}", status, text.trim_end());
        }

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: truncate_str(&text, MAX_BODY_EXCERPT),
            });
        }

        Ok(text)
    }
}

impl GraphStore for StoreClient {
    fn send(&self, document: &str, mode: WriteMode) -> SendOutcome {
        let response = match self.write(document, mode) {
            Ok(response) => response,
            Err(e) => {
                warn!("Graph store request failed: {}", e);
                return SendOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status();
        let body = response.text().unwrap_or_else(|e| {
            debug!("Could not read response body: {}", e);
            String::new()
        });

        if self.config.log_response_body && !body.is_empty() {
            debug!("Response {}: {}", status, body.trim_end());
        }

        if status.is_success() {
            SendOutcome::Stored {
                status: status.as_u16(),
            }
        } else {
            warn!("Graph store rejected document: {}", status);
            SendOutcome::Rejected {
                status: status.as_u16(),
                body: truncate_str(&body, MAX_BODY_EXCERPT),
            }
        }
    }
}
