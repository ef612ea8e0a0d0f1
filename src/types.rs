//! Shared types produced by the alignment stages.
//!
//! These are the records that end up in both output documents. Pass-through
//! attributes from the original source are flattened into the record, so a
//! verse serializes as `{"text": "...", "index": 0, "sectionIndex": 0, ...}`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque source metadata, keyed by canonical attribute name.
pub type Attributes = BTreeMap<String, String>;

/// One top-level division of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(flatten)]
    pub attributes: Attributes,
    /// Zero-based position in the corpus.
    pub index: usize,
    /// Locale → translated section title. A locale is missing when its title
    /// source was shorter than the section list.
    pub localized_title: BTreeMap<String, String>,
    pub verses: Vec<Verse>,
}

/// The atomic indexed unit of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    #[serde(flatten)]
    pub attributes: Attributes,
    /// Zero-based position within the owning section.
    pub index: usize,
    pub section_index: usize,
    /// Unique within one build only.
    pub id: String,
    pub localized_text: BTreeMap<String, String>,
    /// Set in the section view only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// A contiguous, boundary-defined run of verses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Normalized page number (see [`crate::paginate::normalize_page_index`]).
    pub index: u32,
    pub verses: Vec<Verse>,
}

/// A "page ends here" marker from the boundary index.
///
/// All three numbers are as found in the source: `page_index` still carries
/// the source offset, and both ordinals are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBoundary {
    pub page_index: u32,
    pub section_ordinal: usize,
    pub verse_ordinal: usize,
}

impl PageBoundary {
    pub fn new(page_index: u32, section_ordinal: usize, verse_ordinal: usize) -> Self {
        Self {
            page_index,
            section_ordinal,
            verse_ordinal,
        }
    }
}

impl fmt::Display for PageBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} at {}:{}",
            self.page_index, self.section_ordinal, self.verse_ordinal
        )
    }
}

/// Category of a non-fatal problem found while resolving the boundary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A boundary record is missing a field or has a non-numeric one.
    MalformedBoundary,
    /// A boundary names a section, verse or page index that does not exist.
    BoundaryOutOfRange,
    /// A boundary would produce an empty page or a non-increasing page index.
    NonMonotonicBoundary,
    /// Verses after the last boundary were collected into a final page.
    TrailingVerses,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedBoundary => "malformed boundary",
            DiagnosticKind::BoundaryOutOfRange => "boundary out of range",
            DiagnosticKind::NonMonotonicBoundary => "non-monotonic boundary",
            DiagnosticKind::TrailingVerses => "trailing verses",
        }
    }
}

/// Reported problem that did not abort the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}
