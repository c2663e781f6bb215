//! Graph store access
//!
//! Documents are written through the SPARQL 1.1 Graph Store HTTP Protocol:
//! `PUT` replaces the named graph, `POST` merges into it. The update and
//! query endpoints are exposed for ad-hoc maintenance; the bulk load only
//! uses [`GraphStore::send`].

mod client;

pub use client::{basic_auth_value, StoreClient};
pub use crate::config::WriteMode;

use std::fmt;
use thiserror::Error;

/// MIME type of per-document writes
pub const RDF_XML: &str = "application/rdf+xml";
/// MIME type of update-language submissions
pub const SPARQL_UPDATE: &str = "application/sparql-update";
/// MIME type of query submissions
pub const SPARQL_QUERY: &str = "application/sparql-query";

/// Errors from the update and query operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result of writing one document
///
/// Writes never fail past the store boundary; the caller decides whether a
/// rejected document matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// 2xx response
    Stored { status: u16 },
    /// Non-2xx response, with an excerpt of the body
    Rejected { status: u16, body: String },
    /// No response: connection failure, timeout, TLS error
    Failed { reason: String },
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Stored { .. })
    }

    /// HTTP status, if the store answered
    pub fn status(&self) -> Option<u16> {
        match self {
            SendOutcome::Stored { status } | SendOutcome::Rejected { status, .. } => Some(*status),
            SendOutcome::Failed { .. } => None,
        }
    }

    /// Credentials were refused
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SendOutcome::Rejected { status: 401 | 403, .. })
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Stored { status } => write!(f, "{} stored", status),
            SendOutcome::Rejected { status, .. } if self.is_auth_failure() => {
                write!(f, "{} authentication rejected", status)
            }
            SendOutcome::Rejected { status, .. } => write!(f, "{} rejected", status),
            SendOutcome::Failed { reason } => write!(f, "transport error: {}", reason),
        }
    }
}

/// Destination for decoded RDF documents
pub trait GraphStore {
    /// Write one document with the given semantics
    fn send(&self, document: &str, mode: WriteMode) -> SendOutcome;
}

impl<T: GraphStore + ?Sized> GraphStore for &T {
    fn send(&self, document: &str, mode: WriteMode) -> SendOutcome {
        (**self).send(document, mode)
    }
}
