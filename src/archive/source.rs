//! Outer zip container holding the tar archive

use super::entries::InnerArchive;
use super::ArchiveError;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

/// Suffix identifying the inner archive inside the container
pub const DEFAULT_INNER_SUFFIX: &str = ".tar";

/// An open feed container
///
/// Owns the zip handle for the whole run. [`InnerArchive`] borrows it
/// mutably, so the inner stream is always released before the container.
pub struct ArchiveSource {
    path: PathBuf,
    container: ZipArchive<BufReader<File>>,
    suffix: String,
}

impl ArchiveSource {
    /// Open a zip container from a local path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ArchiveError::NotFound(path));
            }
            Err(e) => return Err(ArchiveError::Io(e)),
        };

        let container = ZipArchive::new(BufReader::with_capacity(1024 * 1024, file))?;
        debug!(
            "Opened container {} with {} entries",
            path.display(),
            container.len()
        );

        Ok(Self {
            path,
            container,
            suffix: DEFAULT_INNER_SUFFIX.to_string(),
        })
    }

    /// Set the suffix used to recognise the inner archive
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Index of the first non-directory entry ending in the suffix
    ///
    /// Reads only central-directory metadata; no entry is decompressed.
    fn locate_inner(&mut self) -> Result<Option<usize>, ArchiveError> {
        let suffix = self.suffix.to_lowercase();

        for index in 0..self.container.len() {
            let entry = self.container.by_index_raw(index)?;
            if !entry.is_dir() && entry.name().to_lowercase().ends_with(&suffix) {
                return Ok(Some(index));
            }
        }

        Ok(None)
    }

    /// Open a stream over the inner archive
    ///
    /// Only the matching entry is decompressed, and only as it is read.
    pub fn inner_archive(&mut self) -> Result<InnerArchive<'_>, ArchiveError> {
        let Some(index) = self.locate_inner()? else {
            return Err(ArchiveError::NoInnerArchive {
                container: self.path.clone(),
                suffix: self.suffix.clone(),
            });
        };

        let entry = self.container.by_index(index)?;
        let name = entry.name().to_string();
        info!(
            "Streaming inner archive {} ({} bytes uncompressed)",
            name,
            entry.size()
        );

        Ok(InnerArchive::from_reader(name, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(dir: &TempDir, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.path().join(name);
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        for (entry_name, data) in entries {
            if entry_name.ends_with('/') {
                writer
                    .add_directory(*entry_name, SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer
                    .start_file(*entry_name, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap();
        path
    }

    fn tar_with(path: &str, content: &str) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content.as_bytes())
            .unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ArchiveSource::open(dir.path().join("absent.tar.zip"));
        assert!(matches!(result, Err(ArchiveError::NotFound(_))));
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.zip");
        std::fs::write(&path, b"definitely not a zip file").unwrap();
        assert!(matches!(
            ArchiveSource::open(&path),
            Err(ArchiveError::Zip(_))
        ));
    }

    #[test]
    fn test_inner_archive_located_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let tar = tar_with("cache/epub/5/pg5.rdf", "<five/>");
        let path = write_zip(
            &dir,
            "feed.zip",
            &[
                ("README.txt", b"readme"),
                ("nested.TAR/", b""),
                ("rdf-files.TAR", &tar),
            ],
        );

        let mut source = ArchiveSource::open(&path).unwrap();

        let inner = source.inner_archive().unwrap();
        assert_eq!(inner.name(), "rdf-files.TAR");
        let hit = inner.lookup(5).unwrap().unwrap();
        assert_eq!(hit.content, "<five/>");
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let dir = TempDir::new().unwrap();
        let first = tar_with("cache/epub/1/pg1.rdf", "first");
        let second = tar_with("cache/epub/1/pg1.rdf", "second");
        let path = write_zip(&dir, "feed.zip", &[("a.tar", &first), ("b.tar", &second)]);

        let mut source = ArchiveSource::open(&path).unwrap();
        let hit = source.inner_archive().unwrap().lookup(1).unwrap().unwrap();
        assert_eq!(hit.content, "first");
    }

    #[test]
    fn test_no_inner_archive() {
        let dir = TempDir::new().unwrap();
        let path = write_zip(&dir, "feed.zip", &[("notes.txt", b"no tar here")]);

        let mut source = ArchiveSource::open(&path).unwrap();
        match source.inner_archive() {
            Err(ArchiveError::NoInnerArchive { suffix, .. }) => assert_eq!(suffix, ".tar"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected NoInnerArchive"),
        };
    }

    #[test]
    fn test_custom_suffix() {
        let dir = TempDir::new().unwrap();
        let tar = tar_with("cache/epub/3/pg3.rdf", "three");
        let path = write_zip(&dir, "feed.zip", &[("rdf-files.tar", &tar), ("rdf.ustar", &tar)]);

        let mut source = ArchiveSource::open(&path).unwrap().with_suffix(".ustar");
        let inner = source.inner_archive().unwrap();
        assert_eq!(inner.name(), "rdf.ustar");
    }
}
