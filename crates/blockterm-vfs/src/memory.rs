//! In-memory VFS implementation.
//!
//! Entries live in a `Vec<String>` so listing order is insertion order.

use crate::Vfs;

/// A flat, fully in-memory directory listing.
#[derive(Debug, Clone, Default)]
pub struct MemoryVfs {
    entries: Vec<String>,
}

impl MemoryVfs {
    /// Create an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a listing seeded with `entries`, keeping their order.
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl Vfs for MemoryVfs {
    fn entries(&self) -> &[String] {
        &self.entries
    }

    fn add(&mut self, name: &str) {
        self.entries.push(name.to_string());
    }

    fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e != name);
        before - self.entries.len()
    }
}
