//! Filesystem-backed vault
//!
//! Documents are markdown files under a root directory; paths are
//! vault-relative with `/` separators.

use std::fs;
use std::path::{Path, PathBuf};

use super::{DocumentStore, LinkResolver, Navigator, Result, VaultError};
use crate::links;

pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default vault location under the platform data directory.
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("melete"))
            .ok_or(VaultError::DataDirNotFound)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl DocumentStore for FileVault {
    fn read(&self, path: &str) -> Result<String> {
        let full = self.full_path(path);
        if !full.exists() {
            return Err(VaultError::NotFound(path.to_string()));
        }
        Ok(fs::read_to_string(&full)?)
    }

    fn write(&self, path: &str, text: &str) -> Result<()> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, text)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.full_path(path).exists()
    }

    fn create(&self, path: &str, text: &str) -> Result<()> {
        let full = self.full_path(path);
        if full.exists() {
            return Err(VaultError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                path.to_string(),
            )));
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, text)?;
        Ok(())
    }
}

impl LinkResolver for FileVault {
    fn note_exists(&self, link: &str, _context: &str) -> bool {
        // Block and heading suffixes resolve against the containing note.
        let note = links::note_part(link);
        if note.is_empty() {
            return false;
        }
        self.exists(&links::with_md_extension(note))
    }
}

/// Navigator that only records the intent in the log. Useful when the
/// embedder has no UI to open notes in.
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn open_link(&self, link: &str) {
        log::info!("Loading repetition: {}", links::remove_brackets(link));
    }
}
