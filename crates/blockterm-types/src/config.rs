//! Session configuration loaded from TOML.
//!
//! Every field is optional in the file; anything left out falls back to the
//! stock BlockTerm session (`root@web:/root#`, the demo directory entries and
//! the `cls` alias).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TermError};

/// Release identifier shown in the `help` banner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    #[serde(default = "default_major")]
    pub major: u32,
    #[serde(default)]
    pub minor: u32,
    #[serde(default = "default_revision")]
    pub revision: u32,
    #[serde(default = "yes")]
    pub beta: bool,
    #[serde(default = "yes")]
    pub debug: bool,
}

fn default_major() -> u32 {
    1
}
fn default_revision() -> u32 {
    1
}
fn yes() -> bool {
    true
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            major: default_major(),
            minor: 0,
            revision: default_revision(),
            beta: true,
            debug: true,
        }
    }
}

impl VersionInfo {
    /// Build the banner line, e.g. `BlockTerm 1.0.1 BETA (DEBUG)`.
    ///
    /// The `BETA` and `(DEBUG)` markers only appear when their flag is set.
    pub fn banner(&self, product: &str) -> String {
        let mut out = format!(
            "{product} {}.{}.{}",
            self.major, self.minor, self.revision
        );
        if self.beta {
            out.push_str(" BETA");
        }
        if self.debug {
            out.push_str(" (DEBUG)");
        }
        out
    }
}

/// Top-level session configuration (`blockterm.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct TermConfig {
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default)]
    pub version: VersionInfo,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Initial working directory.
    #[serde(default = "default_home")]
    pub home: String,
    /// Initial directory entries of the mock filesystem, in listing order.
    #[serde(default = "default_filesystem")]
    pub filesystem: Vec<String>,
    /// Initial alias table (alias -> canonical command name).
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

fn default_product_name() -> String {
    "BlockTerm".to_string()
}
fn default_username() -> String {
    "root".to_string()
}
fn default_hostname() -> String {
    "web".to_string()
}
fn default_home() -> String {
    "/root".to_string()
}
fn default_filesystem() -> Vec<String> {
    [".", "secrets", "system", "bin", "shared", ".donotdeletethis"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_aliases() -> BTreeMap<String, String> {
    let mut aliases = BTreeMap::new();
    aliases.insert("cls".to_string(), "clear".to_string());
    aliases
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            version: VersionInfo::default(),
            username: default_username(),
            hostname: default_hostname(),
            home: default_home(),
            filesystem: default_filesystem(),
            aliases: default_aliases(),
        }
    }
}

impl TermConfig {
    /// Parse a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        if config.username.is_empty() {
            return Err(TermError::Config("username must not be empty".into()));
        }
        if config.hostname.is_empty() {
            return Err(TermError::Config("hostname must not be empty".into()));
        }
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Banner line for this configuration's product and version.
    pub fn banner(&self) -> String {
        self.version.banner(&self.product_name)
    }
}
