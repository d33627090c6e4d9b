//! File-backed journal storage with an exclusive process lock.

use crate::ports::JournalStorage;
use fs2::FileExt;
use shared_types::HubError;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Append-only journal file.
///
/// Holds an exclusive flock for the lifetime of the handle: only one
/// writer process can own a journal. The lock is released when the handle
/// is dropped.
pub struct FileJournalStorage {
    file: File,
    path: PathBuf,
}

impl FileJournalStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HubError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        file.try_lock_exclusive().map_err(|_| {
            HubError::Storage(format!(
                "journal {} is locked by another process",
                path.display()
            ))
        })?;

        info!(path = %path.display(), "opened journal file");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JournalStorage for FileJournalStorage {
    fn append(&mut self, bytes: &[u8]) -> Result<(), HubError> {
        self.file.write_all(bytes)?;
        self.file.sync_data()?;
        Ok(())
    }

    fn read_from(&mut self, offset: u64, max_len: usize) -> Result<Vec<u8>, HubError> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::with_capacity(max_len.min(64 * 1024));
        let mut handle = (&self.file).take(max_len as u64);
        handle.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn len(&mut self) -> Result<u64, HubError> {
        Ok(self.file.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> Result<(), HubError> {
        self.file.set_len(len)?;
        self.file.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.log");

        let mut storage = FileJournalStorage::open(&path).unwrap();
        storage.append(b"one\n").unwrap();
        storage.append(b"two\n").unwrap();

        assert_eq!(storage.len().unwrap(), 8);
        assert_eq!(storage.read_from(0, 1024).unwrap(), b"one\ntwo\n");
        assert_eq!(storage.read_from(4, 1024).unwrap(), b"two\n");
        assert_eq!(storage.read_from(4, 2).unwrap(), b"tw");
    }

    #[test]
    fn test_second_open_fails_while_locked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.log");

        let _storage = FileJournalStorage::open(&path).unwrap();
        let second = FileJournalStorage::open(&path);
        assert!(second.is_err());
    }

    #[test]
    fn test_truncate_drops_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.log");

        let mut storage = FileJournalStorage::open(&path).unwrap();
        storage.append(b"one\npartial").unwrap();
        storage.truncate(4).unwrap();

        assert_eq!(storage.len().unwrap(), 4);
        assert_eq!(storage.read_from(0, 1024).unwrap(), b"one\n");
    }

    #[test]
    fn test_reopen_after_drop_sees_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.log");

        {
            let mut storage = FileJournalStorage::open(&path).unwrap();
            storage.append(b"persisted\n").unwrap();
        }

        let mut storage = FileJournalStorage::open(&path).unwrap();
        assert_eq!(storage.read_from(0, 1024).unwrap(), b"persisted\n");
    }
}
