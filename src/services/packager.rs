use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

use crate::error::{MashupError, Result};

/// Wraps `source` unmodified into a single-entry zip at `archive`.
///
/// The entry is named after the source file and stamped with a fixed
/// timestamp, so the same input always yields the same archive bytes.
pub fn package(source: &Path, archive: &Path) -> Result<PathBuf> {
    let entry_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| MashupError::Io(io::Error::other("archive source has no file name")))?;

    let mut input = BufReader::new(File::open(source)?);
    let mut zip = ZipWriter::new(BufWriter::new(File::create(archive)?));

    let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
    zip.start_file(entry_name.as_str(), options)?;
    io::copy(&mut input, &mut zip)?;
    zip.finish()?;

    info!("Packaged {} into {}", entry_name, archive.display());
    Ok(archive.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;

    #[test]
    fn archive_holds_one_unmodified_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let mp3 = tmp.path().join("mashup.mp3");
        fs::write(&mp3, b"ID3\x03\x00fake-frames").unwrap();

        let zip_path = package(&mp3, &tmp.path().join("mashup.zip")).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
        assert_eq!(zip.len(), 1);
        let mut entry = zip.by_index(0).unwrap();
        assert_eq!(entry.name(), "mashup.mp3");
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"ID3\x03\x00fake-frames");
    }

    #[test]
    fn same_input_gives_same_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let mp3 = tmp.path().join("mashup.mp3");
        fs::write(&mp3, vec![7u8; 4096]).unwrap();

        let first = package(&mp3, &tmp.path().join("one.zip")).unwrap();
        let second = package(&mp3, &tmp.path().join("two.zip")).unwrap();
        assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = package(&tmp.path().join("absent.mp3"), &tmp.path().join("x.zip")).unwrap_err();
        assert!(matches!(err, MashupError::Io(_)));
        assert!(!tmp.path().join("x.zip").exists());
    }
}
