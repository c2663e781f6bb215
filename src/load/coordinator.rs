//! Load coordinator that drives one sweep of the feed into the store

use super::progress::{LoadProgress, LoadStats};
use super::trigger::{OneShotTrigger, TriggerError};
use crate::archive::{decode, ArchiveError, ArchiveSource, TraversalSummary, DEFAULT_INNER_SUFFIX};
use crate::config::{Config, WriteMode};
use crate::store::GraphStore;
use std::fmt;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Opening,
    Sweeping,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Opening => "opening",
            RunState::Sweeping => "sweeping",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-run settings
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub write_mode: WriteMode,
    /// Bounded mode: stop once this many documents were consumed
    pub max_documents: Option<usize>,
    pub inner_suffix: String,
    pub quiet: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::Replace,
            max_documents: None,
            inner_suffix: DEFAULT_INNER_SUFFIX.to_string(),
            quiet: false,
        }
    }
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            write_mode: config.store.write_mode,
            max_documents: config.load.max_documents,
            inner_suffix: config.load.inner_suffix.clone(),
            quiet: config.load.quiet,
        }
    }
}

/// Final result of a run
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// `Done` or `Failed`
    pub state: RunState,
    pub stats: LoadStats,
    /// Entry stream counters, absent if the inner archive was never reached
    pub traversal: Option<TraversalSummary>,
    /// Why the run ended early or failed
    pub message: Option<String>,
}

impl LoadReport {
    pub fn is_failure(&self) -> bool {
        self.state == RunState::Failed
    }
}

/// Result of a trigger-gated run
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Marker was just created; nothing was loaded
    Deferred { marker: PathBuf },
    Finished(LoadReport),
}

/// Sequential loader: one entry is decoded and sent before the next is read
pub struct LoadCoordinator<S: GraphStore> {
    store: S,
    options: LoadOptions,
    state: RunState,
}

impl<S: GraphStore> LoadCoordinator<S> {
    pub fn new(store: S, options: LoadOptions) -> Self {
        Self {
            store,
            options,
            state: RunState::Idle,
        }
    }

    /// Override the configured document cap
    pub fn with_max_documents(mut self, max_documents: Option<usize>) -> Self {
        self.options.max_documents = max_documents;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.options.write_mode = write_mode;
        self
    }

    /// Set quiet mode (no progress output)
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.options.quiet = quiet;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Load the container at `path`
    ///
    /// Never returns an error: failures end the run in `RunState::Failed`
    /// with whatever counters had accumulated.
    pub fn run(&mut self, path: &Path) -> LoadReport {
        info!(
            "Starting load from {} (mode: {}, cap: {})",
            path.display(),
            self.options.write_mode,
            self.options
                .max_documents
                .map_or_else(|| "none".to_string(), |max| max.to_string())
        );

        self.state = RunState::Opening;
        let mut progress = LoadProgress::new(self.options.quiet);

        let (state, traversal, message) = match self.sweep(path, &mut progress) {
            Ok(summary) => (RunState::Done, Some(summary), None),
            Err(e @ ArchiveError::NoInnerArchive { .. }) => {
                warn!("{}; nothing to load", e);
                (RunState::Done, None, Some(e.to_string()))
            }
            Err(e) => {
                error!("Load failed: {}", e);
                (RunState::Failed, None, Some(e.to_string()))
            }
        };

        self.state = state;
        let stats = progress.finish(state);
        info!("{}", stats.summary_line());

        LoadReport {
            state,
            stats,
            traversal,
            message,
        }
    }

    /// Consult the trigger, then run if it allows
    pub fn run_with_trigger(
        &mut self,
        trigger: &OneShotTrigger,
        path: &Path,
    ) -> Result<LoadOutcome, TriggerError> {
        if !trigger.should_run()? {
            return Ok(LoadOutcome::Deferred {
                marker: trigger.marker_path().to_path_buf(),
            });
        }
        Ok(LoadOutcome::Finished(self.run(path)))
    }

    fn sweep(
        &mut self,
        path: &Path,
        progress: &mut LoadProgress,
    ) -> Result<TraversalSummary, ArchiveError> {
        let mut source = ArchiveSource::open(path)?.with_suffix(self.options.inner_suffix.clone());
        let inner = source.inner_archive()?;
        info!("Sweeping {} in {}", inner.name(), path.display());

        self.state = RunState::Sweeping;
        let store = &self.store;
        let mode = self.options.write_mode;
        let cap = self.options.max_documents;

        inner.sweep(|entry, reader| {
            if cap.is_some_and(|max| progress.documents_processed() >= max) {
                return Ok(ControlFlow::Break(()));
            }

            match decode(reader) {
                Ok(document) => {
                    let outcome = store.send(&document, mode);
                    info!("Key: {}, Size: {}, Response: {}", entry.key, entry.size, outcome);
                    progress.document_sent(&entry.key, entry.size, &outcome);
                }
                Err(e) if e.is_per_document() => {
                    warn!("Skipping {}: {}", entry.key, e);
                    progress.document_undecodable(&entry.key, entry.size);
                }
                Err(e) => return Err(e),
            }

            // Stop before the next entry is read
            match cap {
                Some(max) if progress.documents_processed() >= max => {
                    info!("Reached max documents limit: {}", max);
                    Ok(ControlFlow::Break(()))
                }
                _ => Ok(ControlFlow::Continue(())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SendOutcome;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    /// Records every document; fails the documents whose 1-based position
    /// is listed in `fail_at`
    #[derive(Default)]
    struct RecordingStore {
        sent: Mutex<Vec<(String, WriteMode)>>,
        fail_at: Vec<usize>,
    }

    impl RecordingStore {
        fn failing_at(positions: &[usize]) -> Self {
            Self {
                fail_at: positions.to_vec(),
                ..Default::default()
            }
        }

        fn documents(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(doc, _)| doc.clone())
                .collect()
        }
    }

    impl GraphStore for RecordingStore {
        fn send(&self, document: &str, mode: WriteMode) -> SendOutcome {
            let mut sent = self.sent.lock().unwrap();
            sent.push((document.to_string(), mode));
            if self.fail_at.contains(&sent.len()) {
                SendOutcome::Rejected {
                    status: 500,
                    body: "boom".to_string(),
                }
            } else {
                SendOutcome::Stored { status: 201 }
            }
        }
    }

    fn tar_with(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, content) in entries {
            let mut header = tar::Header::new_gnu();
            if path.ends_with('/') {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
            } else {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_size(content.len() as u64);
            }
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_slice())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    /// Tar whose entry names are copied into the header verbatim, so they
    /// need not be valid UTF-8
    fn raw_tar(entries: &[(&[u8], &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in entries {
            let mut header = tar::Header::new_ustar();
            header.as_mut_bytes()[..name.len()].copy_from_slice(name);
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, *content).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn write_container(dir: &TempDir, inner_name: &str, tar: &[u8]) -> PathBuf {
        let path = dir.path().join("rdf-files.tar.zip");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file(inner_name, SimpleFileOptions::default())
            .unwrap();
        zip.write_all(tar).unwrap();
        zip.finish().unwrap();
        path
    }

    fn corpus(count: u64) -> Vec<(String, Vec<u8>)> {
        let mut entries = vec![("cache/".to_string(), Vec::new())];
        for id in 1..=count {
            entries.push((format!("cache/epub/{id}/"), Vec::new()));
            entries.push((
                crate::archive::rdf_key(id),
                format!("<rdf:RDF id=\"{id}\"/>").into_bytes(),
            ));
        }
        entries
    }

    fn quiet_options() -> LoadOptions {
        LoadOptions {
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_sweep_in_archive_order() {
        let dir = TempDir::new().unwrap();
        let path = write_container(&dir, "rdf-files.tar", &tar_with(&corpus(3)));

        let store = RecordingStore::default();
        let mut coordinator = LoadCoordinator::new(&store, quiet_options());
        assert_eq!(coordinator.state(), RunState::Idle);

        let report = coordinator.run(&path);
        assert_eq!(report.state, RunState::Done);
        assert_eq!(coordinator.state(), RunState::Done);
        assert_eq!(report.stats.documents_processed, 3);
        assert_eq!(report.stats.documents_sent, 3);
        assert_eq!(report.stats.total_bytes, 3 * 17);

        let traversal = report.traversal.unwrap();
        assert_eq!(traversal.directories_skipped, 4);
        assert!(!traversal.stopped_early);

        assert_eq!(
            store.documents(),
            vec![
                "<rdf:RDF id=\"1\"/>",
                "<rdf:RDF id=\"2\"/>",
                "<rdf:RDF id=\"3\"/>",
            ]
        );
    }

    #[test]
    fn test_cap_halts_before_next_entry() {
        let dir = TempDir::new().unwrap();
        let path = write_container(&dir, "rdf-files.tar", &tar_with(&corpus(50)));

        let store = RecordingStore::default();
        let mut coordinator = LoadCoordinator::new(&store, quiet_options()).with_max_documents(Some(10));
        let report = coordinator.run(&path);

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.stats.documents_processed, 10);
        assert_eq!(store.documents().len(), 10);
        let traversal = report.traversal.unwrap();
        assert!(traversal.stopped_early);
        // Document 11 was never handed to the visitor
        assert_eq!(traversal.entries_yielded, 10);
    }

    #[test]
    fn test_partial_failure_does_not_abort() {
        let dir = TempDir::new().unwrap();
        let path = write_container(&dir, "rdf-files.tar", &tar_with(&corpus(10)));

        let store = RecordingStore::failing_at(&[3]);
        let mut coordinator = LoadCoordinator::new(&store, quiet_options());
        let report = coordinator.run(&path);

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.stats.documents_processed, 10);
        assert_eq!(report.stats.documents_sent, 9);
        assert_eq!(report.stats.documents_failed, 1);
    }

    #[test]
    fn test_undecodable_entry_is_skipped_and_counted() {
        let dir = TempDir::new().unwrap();
        let entries = vec![
            ("cache/epub/1/pg1.rdf".to_string(), b"<ok/>".to_vec()),
            ("cache/epub/2/pg2.rdf".to_string(), vec![0xff, 0xfe, 0xfd]),
            ("cache/epub/3/pg3.rdf".to_string(), b"<ok/>".to_vec()),
        ];
        let path = write_container(&dir, "rdf-files.tar", &tar_with(&entries));

        let store = RecordingStore::default();
        let report = LoadCoordinator::new(&store, quiet_options()).run(&path);

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.stats.documents_processed, 3);
        assert_eq!(report.stats.documents_undecodable, 1);
        assert_eq!(store.documents().len(), 2);
    }

    #[test]
    fn test_missing_inner_archive_is_clean_done() {
        let dir = TempDir::new().unwrap();
        let path = write_container(&dir, "readme.txt", b"no tar here");

        let store = RecordingStore::default();
        let report = LoadCoordinator::new(&store, quiet_options()).run(&path);

        assert_eq!(report.state, RunState::Done);
        assert!(!report.is_failure());
        assert_eq!(report.stats.documents_processed, 0);
        assert!(report.message.unwrap().contains("No inner archive"));
    }

    #[test]
    fn test_missing_container_fails() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::default();
        let mut coordinator = LoadCoordinator::new(&store, quiet_options());

        let report = coordinator.run(&dir.path().join("absent.tar.zip"));
        assert!(report.is_failure());
        assert_eq!(coordinator.state(), RunState::Failed);
        assert!(report.message.unwrap().contains("absent.tar.zip"));
        assert!(store.documents().is_empty());
    }

    #[test]
    fn test_unreadable_entry_name_is_skipped_uncounted() {
        let dir = TempDir::new().unwrap();
        let tar = raw_tar(&[
            (&b"cache/epub/1/pg1.rdf"[..], &b"<a/>"[..]),
            (&b"cache/epub/\xff/bad.rdf"[..], &b"<b/>"[..]),
            (&b"cache/epub/3/pg3.rdf"[..], &b"<c/>"[..]),
        ]);
        let path = write_container(&dir, "rdf-files.tar", &tar);

        let store = RecordingStore::default();
        let report = LoadCoordinator::new(&store, quiet_options()).run(&path);

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.stats.documents_processed, 2);
        assert_eq!(report.traversal.unwrap().unreadable_skipped, 1);
        assert_eq!(store.documents(), vec!["<a/>", "<c/>"]);
    }

    #[test]
    fn test_corrupt_header_fails_with_accumulated_counters() {
        let dir = TempDir::new().unwrap();
        let entries: Vec<(String, Vec<u8>)> = (1..=4)
            .map(|id| (crate::archive::rdf_key(id), format!("<doc{id}/>").into_bytes()))
            .collect();
        let mut tar = tar_with(&entries);
        // One header block and one data block per entry; clobber the
        // checksum field of the third header
        let third = 2 * 1024;
        tar[third + 148..third + 156].copy_from_slice(b"zzzzzzz\0");
        let path = write_container(&dir, "rdf-files.tar", &tar);

        let store = RecordingStore::default();
        let mut coordinator = LoadCoordinator::new(&store, quiet_options());
        let report = coordinator.run(&path);

        assert_eq!(report.state, RunState::Failed);
        assert_eq!(coordinator.state(), RunState::Failed);
        assert_eq!(report.stats.documents_processed, 2);
        assert_eq!(report.stats.documents_sent, 2);
        assert!(report.traversal.is_none());
        assert!(report.message.is_some());
        assert_eq!(store.documents(), vec!["<doc1/>", "<doc2/>"]);
    }

    #[test]
    fn test_write_mode_is_forwarded() {
        let dir = TempDir::new().unwrap();
        let path = write_container(&dir, "rdf-files.tar", &tar_with(&corpus(2)));

        let store = RecordingStore::default();
        LoadCoordinator::new(&store, quiet_options())
            .with_write_mode(WriteMode::Append)
            .run(&path);

        let sent = store.sent.lock().unwrap();
        assert!(sent.iter().all(|(_, mode)| *mode == WriteMode::Append));
    }

    #[test]
    fn test_trigger_defers_first_run() {
        let dir = TempDir::new().unwrap();
        let path = write_container(&dir, "rdf-files.tar", &tar_with(&corpus(2)));
        let trigger = OneShotTrigger::new(dir.path().join("marker"));

        let store = RecordingStore::default();
        let mut coordinator = LoadCoordinator::new(&store, quiet_options());

        let first = coordinator.run_with_trigger(&trigger, &path).unwrap();
        assert!(matches!(first, LoadOutcome::Deferred { .. }));
        assert_eq!(coordinator.state(), RunState::Idle);
        assert!(store.documents().is_empty());

        let second = coordinator.run_with_trigger(&trigger, &path).unwrap();
        match second {
            LoadOutcome::Finished(report) => assert_eq!(report.stats.documents_sent, 2),
            other => panic!("expected a finished run, got {:?}", other),
        }
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.store.write_mode = WriteMode::Append;
        config.load.max_documents = Some(10);

        let options = LoadOptions::from(&config);
        assert_eq!(options.write_mode, WriteMode::Append);
        assert_eq!(options.max_documents, Some(10));
        assert_eq!(options.inner_suffix, ".tar");
    }
}
