//! Vault collaborators
//!
//! The queue engine only touches the outside world through these traits:
//! a document store for the queue file itself, a link resolver for
//! garbage-collecting rows whose notes were deleted, and a navigator for
//! opening the note a repetition points at.

mod file_vault;
mod memory;

pub use file_vault::{FileVault, LogNavigator};
pub use memory::MemoryVault;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, VaultError>;

/// Whole-document text storage keyed by vault-relative path.
pub trait DocumentStore: Send + Sync {
    /// Read a document, failing with `NotFound` if it doesn't exist.
    fn read(&self, path: &str) -> Result<String>;

    /// Overwrite a document, creating parent folders as needed.
    fn write(&self, path: &str, text: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;

    /// Create a document with initial text; fails if it already exists.
    fn create(&self, path: &str, text: &str) -> Result<()>;

    fn create_if_not_exists(&self, path: &str, text: &str) -> Result<()> {
        if !self.exists(path) {
            self.create(path, text)?;
        }
        Ok(())
    }
}

/// Resolves queue-row links against the vault's notes.
pub trait LinkResolver: Send + Sync {
    /// Does the note a link points at still exist? `context` is the path
    /// of the queue document holding the link.
    fn note_exists(&self, link: &str, context: &str) -> bool;

    /// Human-readable form of a link (brackets stripped).
    fn display_link(&self, link: &str) -> String {
        crate::links::remove_brackets(link).to_string()
    }
}

/// Opens a note in whatever view the embedder provides. Best effort.
pub trait Navigator: Send + Sync {
    fn open_link(&self, link: &str);
}
