//! Mock filesystem for the BlockTerm shell.
//!
//! The filesystem is deliberately flat: an ordered list of entry labels with
//! no parent/child relationship. `mkdir` appends a label, `rmdir` drops every
//! matching label, and `ls` prints them in insertion order.

mod memory;

pub use memory::MemoryVfs;

/// Storage backend for the mock filesystem.
pub trait Vfs {
    /// All entries in insertion order.
    fn entries(&self) -> &[String];

    /// Append an entry. Duplicates and arbitrary text are allowed.
    fn add(&mut self, name: &str);

    /// Remove every entry equal to `name`, returning how many were dropped.
    fn remove(&mut self, name: &str) -> usize;

    /// Whether at least one entry equals `name`.
    fn contains(&self, name: &str) -> bool {
        self.entries().iter().any(|e| e == name)
    }

    /// Number of entries.
    fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether there are no entries.
    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
