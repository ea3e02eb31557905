//! In-memory vault for tests and embedders without a filesystem

use std::collections::HashMap;
use std::sync::Mutex;

use super::{DocumentStore, LinkResolver, Result, VaultError};
use crate::links;

#[derive(Default)]
pub struct MemoryVault {
    docs: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docs<I, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let vault = Self::new();
        {
            let mut map = vault.docs.lock().unwrap();
            for (path, text) in docs {
                map.insert(path.into(), text.into());
            }
        }
        vault
    }
}

impl DocumentStore for MemoryVault {
    fn read(&self, path: &str) -> Result<String> {
        self.docs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(path.to_string()))
    }

    fn write(&self, path: &str, text: &str) -> Result<()> {
        self.docs
            .lock()
            .unwrap()
            .insert(path.to_string(), text.to_string());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.docs.lock().unwrap().contains_key(path)
    }

    fn create(&self, path: &str, text: &str) -> Result<()> {
        let mut docs = self.docs.lock().unwrap();
        if docs.contains_key(path) {
            return Err(VaultError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                path.to_string(),
            )));
        }
        docs.insert(path.to_string(), text.to_string());
        Ok(())
    }
}

impl LinkResolver for MemoryVault {
    fn note_exists(&self, link: &str, _context: &str) -> bool {
        let note = links::note_part(link);
        !note.is_empty() && self.exists(&links::with_md_extension(note))
    }
}
