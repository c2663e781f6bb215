//! gutenberg-graph: bulk loader for Project Gutenberg RDF metadata
//!
//! Streams per-book RDF/XML records out of the `rdf-files.tar.zip` feed and
//! writes each one into a SPARQL graph store over the Graph Store Protocol:
//! - Streaming zip -> tar traversal without extracting to disk
//! - Full sweep or exact-key lookup (`cache/epub/{id}/pg{id}.rdf`)
//! - Replace (PUT) or append (POST) writes with Basic authentication
//! - One-shot trigger marker deferring the heavy first load
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌────────────────┐   ┌────────────┐   ┌─────────────┐
//! │ ArchiveSource  │──▶│  InnerArchive  │──▶│  decode()  │──▶│ GraphStore  │
//! │ (zip container)│   │ (tar entries)  │   │  (UTF-8)   │   │ (PUT/POST)  │
//! └────────────────┘   └────────────────┘   └────────────┘   └─────────────┘
//!          ▲                                                        │
//!          └──────────────── LoadCoordinator ◀──────────────────────┘
//!                          (gated by OneShotTrigger)
//! ```

pub mod archive;
pub mod config;
pub mod load;
pub mod store;
pub mod util;

pub use config::Config;
