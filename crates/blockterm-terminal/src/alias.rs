//! Alias table: invoked name -> canonical command name.

use std::collections::BTreeMap;

/// Runtime-mutable alias table.
///
/// Lookups are a single substitution step. An alias whose target is itself
/// an alias is not chased further, and self-referencing aliases are allowed.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) `alias -> command`.
    pub fn set(&mut self, alias: &str, command: &str) {
        self.aliases.insert(alias.to_string(), command.to_string());
    }

    /// Target of `name`, if it is an alias.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Rewrite `name` once if it is an alias, otherwise return it unchanged.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    /// All aliases, sorted by alias name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl FromIterator<(String, String)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut table = AliasTable::new();
        table.set("ll", "ls");
        assert_eq!(table.get("ll"), Some("ls"));
        assert_eq!(table.get("ls"), None);
    }

    #[test]
    fn resolve_passes_through_unknown() {
        let table = AliasTable::new();
        assert_eq!(table.resolve("echo"), "echo");
    }

    #[test]
    fn resolve_is_single_hop() {
        let mut table = AliasTable::new();
        table.set("a", "b");
        table.set("b", "c");
        assert_eq!(table.resolve("a"), "b");
    }

    #[test]
    fn self_alias_allowed() {
        let mut table = AliasTable::new();
        table.set("x", "x");
        assert_eq!(table.resolve("x"), "x");
    }

    #[test]
    fn overwrite_alias() {
        let mut table = AliasTable::new();
        table.set("ll", "ls");
        table.set("ll", "pwd");
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("ll"), "pwd");
    }

    #[test]
    fn from_iterator_and_iter_sorted() {
        let table: AliasTable = [
            ("zz".to_string(), "pwd".to_string()),
            ("cls".to_string(), "clear".to_string()),
        ]
        .into_iter()
        .collect();
        let pairs: Vec<(&str, &str)> = table.iter().collect();
        assert_eq!(pairs, [("cls", "clear"), ("zz", "pwd")]);
    }
}
