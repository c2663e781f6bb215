//! Whole-document decoding of archive entries

use super::ArchiveError;
use std::io::{ErrorKind, Read};

/// Size of the fixed read buffer used while draining an entry
pub const READ_BUFFER_SIZE: usize = 8192;

/// Read an entry stream to the end and decode it as UTF-8
///
/// Records in the feed are single-book metadata files, so the whole entry
/// is buffered. Callers get the complete document or an error, never a
/// partial one.
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<String, ArchiveError> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut content = Vec::new();

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => content.extend_from_slice(&buffer[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::Io(e)),
        }
    }

    Ok(String::from_utf8(content)?)
}
