//! Build configuration module.
//!
//! Handles loading, validating, and merging `corpus.toml`. Stock defaults
//! describe the usual Tanzil asset layout; a `corpus.toml` in the corpus root
//! overrides only the values it names.
//!
//! ## Config File Location
//!
//! ```text
//! assets/
//! ├── corpus.toml              # Build config (optional)
//! ├── quran-simple.xml         # Original text
//! ├── quran-data.xml           # Page boundary index
//! ├── translations/
//! │   ├── ru.abuadel.xml       # Locale "ru" (file name up to the first dot)
//! │   └── en.sahih.xml         # Locale "en"
//! └── titles/
//!     └── ru.json              # Section titles for "ru"
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # provenance_file = "COPYRIGHT.txt"   # Replaces the built-in Tanzil notice
//!
//! [sources]
//! original = "quran-simple.xml"
//! boundaries = "quran-data.xml"
//! translations_dir = "translations"
//!
//! [sources.translations]   # Explicit locale → file, overrides discovery
//! # ru = "ru.abuadel.xml"
//!
//! [sources.titles]         # Locale → section title file
//! # ru = "titles/ru.json"
//!
//! [output]
//! sections = "quran.json"
//! pages = "quran-pages.json"
//! pretty = false
//!
//! [pagination]
//! page_offset = 2
//! section_start = "inclusive"   # or "previous-section-end"
//! ```
//!
//! All paths are relative to the corpus root. Unknown keys are rejected to
//! catch typos early.

use crate::paginate::{PAGE_INDEX_OFFSET, PaginateOptions, SectionStartPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "corpus.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `corpus.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    /// File whose content replaces the built-in provenance header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance_file: Option<String>,
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub pagination: PaginationConfig,
}

impl CorpusConfig {
    /// Validate that the config describes a buildable corpus.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.original.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sources.original must not be empty".into(),
            ));
        }
        if self.sources.boundaries.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sources.boundaries must not be empty".into(),
            ));
        }
        if self.output.sections.trim().is_empty() || self.output.pages.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.sections and output.pages must not be empty".into(),
            ));
        }
        if self.output.sections == self.output.pages {
            return Err(ConfigError::Validation(
                "output.sections and output.pages must be different files".into(),
            ));
        }
        let locales = self
            .sources
            .translations
            .keys()
            .chain(self.sources.titles.keys());
        for locale in locales {
            if locale.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "locale keys must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Input files, relative to the corpus root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Original-language text.
    pub original: String,
    /// Page boundary index.
    pub boundaries: String,
    /// Directory scanned for translations; each file's locale is its name up
    /// to the first dot. Missing directories are skipped.
    pub translations_dir: String,
    /// Explicit locale → translation file. Wins over discovered files.
    pub translations: BTreeMap<String, String>,
    /// Locale → section title file.
    pub titles: BTreeMap<String, String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            original: "quran-simple.xml".to_string(),
            boundaries: "quran-data.xml".to_string(),
            translations_dir: "translations".to_string(),
            translations: BTreeMap::new(),
            titles: BTreeMap::new(),
        }
    }
}

/// Output files, relative to the corpus root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Section-nested corpus view.
    pub sections: String,
    /// Page-partitioned corpus view.
    pub pages: String,
    /// Indent the JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sections: "quran.json".to_string(),
            pages: "quran-pages.json".to_string(),
            pretty: false,
        }
    }
}

/// Boundary index interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Subtracted from the source page numbers.
    pub page_offset: u32,
    /// How a boundary at a section's first verse closes its page.
    pub section_start: SectionStartPolicy,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_offset: PAGE_INDEX_OFFSET,
            section_start: SectionStartPolicy::default(),
        }
    }
}

impl PaginationConfig {
    pub fn options(&self) -> PaginateOptions {
        PaginateOptions {
            page_offset: self.page_offset,
            section_start: self.section_start,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CorpusConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `corpus.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<CorpusConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CorpusConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `corpus.toml` in the corpus root.
pub fn load_config(root: &Path) -> Result<CorpusConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

/// Returns a fully-commented stock `corpus.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Corpus Forge Configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Paths are relative to the corpus root (the --source directory).
# Unknown keys will cause an error.

# File whose content replaces the built-in Tanzil provenance header.
# provenance_file = "COPYRIGHT.txt"

# ---------------------------------------------------------------------------
# Sources
# ---------------------------------------------------------------------------
[sources]
# Original-language text (XML or JSON).
original = "quran-simple.xml"

# Page boundary index: ordered "page ends here" records.
boundaries = "quran-data.xml"

# Directory scanned for translations. The locale is the file name up to the
# first dot: ru.abuadel.xml -> "ru". Skipped if the directory is missing.
translations_dir = "translations"

# Explicit locale -> translation file. Overrides discovered files.
[sources.translations]
# ru = "ru.abuadel.xml"

# Locale -> section title file. A title file shorter than the section list
# leaves the remaining sections untitled for that locale.
[sources.titles]
# ru = "titles/ru.json"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Section-nested view: {copyright, corpus: {sections}}
sections = "quran.json"

# Page-partitioned view: {copyright, corpus: {pages}}
pages = "quran-pages.json"

# Indent JSON output.
pretty = false

# ---------------------------------------------------------------------------
# Pagination
# ---------------------------------------------------------------------------
[pagination]
# Subtracted from boundary page numbers. The Tanzil index numbers the first
# page end as 2, so the default maps it to page 0.
page_offset = 2

# How a boundary at a section's first verse closes its page:
#   "inclusive"            - the page ends with that first verse
#   "previous-section-end" - the page ends with the previous section
section_start = "inclusive"
"##
}
