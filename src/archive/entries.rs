//! Forward-only traversal of the inner tar archive

use super::decode::decode;
use super::ArchiveError;
use std::io::Read;
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Archive key of the RDF record for a Gutenberg item
pub fn rdf_key(id: u64) -> String {
    format!("cache/epub/{id}/pg{id}.rdf")
}

/// Metadata of one entry in the inner archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the entry inside the archive, unique per archive
    pub key: String,
    /// Declared size from the entry header (advisory)
    pub size: u64,
    /// Directory entries are never yielded as documents
    pub is_directory: bool,
}

/// How entries are selected during a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every non-directory entry, in archive order
    Sweep,
    /// Only the first entry whose key equals `rdf_key(id)`
    Lookup { id: u64 },
}

impl Traversal {
    fn target_key(&self) -> Option<String> {
        match self {
            Traversal::Sweep => None,
            Traversal::Lookup { id } => Some(rdf_key(*id)),
        }
    }
}

/// Counters collected while walking the entry stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalSummary {
    /// Entry headers read from the stream
    pub entries_seen: usize,
    /// Entries handed to the visitor
    pub entries_yielded: usize,
    /// Directory entries passed over
    pub directories_skipped: usize,
    /// Entries whose header could not be interpreted
    pub unreadable_skipped: usize,
    /// Traversal ended before the stream was exhausted
    pub stopped_early: bool,
}

/// Result of an exact-key lookup
#[derive(Debug, Clone)]
pub struct LookupHit {
    pub entry: ArchiveEntry,
    pub content: String,
    /// Entry headers read up to and including the match
    pub entries_scanned: usize,
}

/// The tar archive found inside the container
///
/// Single pass: the tar format has no index, so reaching an entry means
/// reading every entry before it. Walking again requires reopening the
/// [`ArchiveSource`](super::ArchiveSource).
pub struct InnerArchive<'a> {
    name: String,
    archive: tar::Archive<Box<dyn Read + 'a>>,
}

impl<'a> InnerArchive<'a> {
    /// Wrap a raw tar byte stream
    pub fn from_reader<R: Read + 'a>(name: impl Into<String>, reader: R) -> Self {
        let reader: Box<dyn Read + 'a> = Box::new(reader);
        Self {
            name: name.into(),
            archive: tar::Archive::new(reader),
        }
    }

    /// Key of the inner archive within its container
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Walk the entry stream, handing selected entries to `visit`
    ///
    /// The visitor receives the entry metadata and a reader positioned at the
    /// entry content. Returning `ControlFlow::Break` ends the walk; a lookup
    /// ends on its own after the first match. Visitor errors and corrupt
    /// headers abort the walk, while entries with uninterpretable paths are
    /// logged and skipped.
    pub fn traverse<F>(
        self,
        traversal: Traversal,
        mut visit: F,
    ) -> Result<TraversalSummary, ArchiveError>
    where
        F: FnMut(&ArchiveEntry, &mut dyn Read) -> Result<ControlFlow<()>, ArchiveError>,
    {
        let target = traversal.target_key();
        let mut archive = self.archive;
        let mut summary = TraversalSummary::default();

        for entry in archive.entries()? {
            let mut entry = entry?;
            summary.entries_seen += 1;

            let key = match entry.path() {
                Ok(path) => match path.to_str() {
                    Some(key) => key.to_string(),
                    None => {
                        warn!("Skipping entry with non UTF-8 path: {}", path.display());
                        summary.unreadable_skipped += 1;
                        continue;
                    }
                },
                Err(e) => {
                    warn!("Skipping unreadable entry #{}: {}", summary.entries_seen, e);
                    summary.unreadable_skipped += 1;
                    continue;
                }
            };

            let record = ArchiveEntry {
                key,
                size: entry.size(),
                is_directory: entry.header().entry_type().is_dir(),
            };

            if record.is_directory {
                summary.directories_skipped += 1;
                continue;
            }

            if let Some(ref target) = target {
                if record.key != *target {
                    continue;
                }
            }

            summary.entries_yielded += 1;
            let flow = visit(&record, &mut entry)?;

            if target.is_some() || flow.is_break() {
                summary.stopped_early = true;
                break;
            }
        }

        debug!(
            "Traversal of {} finished: {} seen, {} yielded, {} directories, {} unreadable",
            self.name,
            summary.entries_seen,
            summary.entries_yielded,
            summary.directories_skipped,
            summary.unreadable_skipped
        );

        Ok(summary)
    }

    /// Visit every non-directory entry in archive order
    pub fn sweep<F>(self, visit: F) -> Result<TraversalSummary, ArchiveError>
    where
        F: FnMut(&ArchiveEntry, &mut dyn Read) -> Result<ControlFlow<()>, ArchiveError>,
    {
        self.traverse(Traversal::Sweep, visit)
    }

    /// Find and decode the RDF record for `id`
    ///
    /// Absence is not an error: `Ok(None)` means the stream was exhausted
    /// without a match.
    pub fn lookup(self, id: u64) -> Result<Option<LookupHit>, ArchiveError> {
        let mut found = None;

        let summary = self.traverse(Traversal::Lookup { id }, |entry, reader| {
            let content = decode(reader)?;
            found = Some((entry.clone(), content));
            Ok(ControlFlow::Break(()))
        })?;

        Ok(found.map(|(entry, content)| LookupHit {
            entry,
            content,
            entries_scanned: summary.entries_seen,
        }))
    }
}
