//! Streaming access to the RDF metadata feed
//!
//! The Gutenberg feed ships as a zip container wrapping a single tar archive
//! (`rdf-files.tar.zip`). Nothing is extracted to disk: the tar stream is
//! read straight out of the zip entry, and each RDF record is decoded in
//! memory only when it is visited.
//!
//! # Example Usage
//!
//! ```no_run
//! use gutenberg_graph::archive::ArchiveSource;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = ArchiveSource::open("Resources/rdf-files.tar.zip")?;
//! let mut inner = source.inner_archive()?;
//!
//! if let Some(hit) = inner.lookup(1)? {
//!     println!("{} ({} bytes)", hit.entry.key, hit.entry.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod entries;
pub mod source;

pub use decode::{decode, READ_BUFFER_SIZE};
pub use entries::{rdf_key, ArchiveEntry, InnerArchive, LookupHit, Traversal, TraversalSummary};
pub use source::{ArchiveSource, DEFAULT_INNER_SUFFIX};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or walking the feed
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No inner archive ending in '{suffix}' found in {}", .container.display())]
    NoInnerArchive { container: PathBuf, suffix: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("UTF-8 decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

impl ArchiveError {
    /// Whether the error only affects a single document
    ///
    /// Malformed text in one record must not abort a sweep over the corpus;
    /// everything else means the archive itself is unusable.
    pub fn is_per_document(&self) -> bool {
        matches!(self, ArchiveError::Decode(_))
    }
}
