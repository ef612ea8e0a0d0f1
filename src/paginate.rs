//! Page partitioning of the aligned verse stream.
//!
//! The boundary index is an ordered list of "page ends here" markers, each
//! naming a 1-based `(section, verse)` position. A cursor walks the flattened
//! verse stream. Every boundary closes a page holding the verses from the
//! cursor through its position, inclusive, and moves the cursor past that
//! position:
//!
//! ```text
//! sections:    [a b c] [d e]
//! boundaries:  page 2 @ 1:2, page 3 @ 2:2
//! pages:       0 = [a b]   1 = [c d e]
//! ```
//!
//! Pages together cover every verse exactly once, in order, and page indices
//! strictly increase. Boundaries that would break either property are skipped
//! and reported as [`Diagnostic`]s, never as errors. Verses left after the
//! last boundary form one final page.
//!
//! ## Section-start boundaries
//!
//! A boundary whose verse ordinal is 1 closes a page at a section's first
//! verse. Whether that encodes "the page ends with this verse" or "the page
//! ends with the previous section" depends on the boundary source, so the
//! choice is a [`SectionStartPolicy`] and lives in [`section_start_end`].

use crate::types::{Diagnostic, DiagnosticKind, Page, PageBoundary, Section, Verse};
use serde::{Deserialize, Serialize};

/// Offset between the boundary index's page numbers and output page numbers.
///
/// The Tanzil page index numbers the first page *end* as page 2; output pages
/// start at 0.
pub const PAGE_INDEX_OFFSET: u32 = 2;

/// Map a source page number to an output page number.
///
/// Returns `None` for source numbers below `offset`, which have no output page.
pub fn normalize_page_index(source_index: u32, offset: u32) -> Option<u32> {
    source_index.checked_sub(offset)
}

/// How a boundary at a section's first verse closes its page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionStartPolicy {
    /// The page includes the section's first verse.
    #[default]
    Inclusive,
    /// The page ends with the last verse of the previous section.
    PreviousSectionEnd,
}

/// Absolute stream position at which a section-start boundary closes its page.
///
/// `section_start` is the absolute position of the section's first verse.
/// `None` means the page would end before the stream starts.
pub fn section_start_end(section_start: usize, policy: SectionStartPolicy) -> Option<usize> {
    match policy {
        SectionStartPolicy::Inclusive => Some(section_start),
        SectionStartPolicy::PreviousSectionEnd => section_start.checked_sub(1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginateOptions {
    pub page_offset: u32,
    pub section_start: SectionStartPolicy,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            page_offset: PAGE_INDEX_OFFSET,
            section_start: SectionStartPolicy::default(),
        }
    }
}

/// Result of partitioning: the pages plus everything that was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub diagnostics: Vec<Diagnostic>,
}

/// `(start, len)` of every section in the flattened verse stream.
struct Layout {
    sections: Vec<(usize, usize)>,
}

impl Layout {
    fn new(sections: &[Section]) -> Self {
        let mut start = 0;
        let sections = sections
            .iter()
            .map(|s| {
                let entry = (start, s.verses.len());
                start += s.verses.len();
                entry
            })
            .collect();
        Self { sections }
    }

    /// Absolute position of the last verse of the page this boundary closes.
    fn resolve(
        &self,
        boundary: &PageBoundary,
        policy: SectionStartPolicy,
    ) -> Result<Option<usize>, String> {
        let Some(&(start, len)) = boundary
            .section_ordinal
            .checked_sub(1)
            .and_then(|s| self.sections.get(s))
        else {
            return Err(format!(
                "{boundary}: section {} is outside 1..={}",
                boundary.section_ordinal,
                self.sections.len()
            ));
        };
        match boundary.verse_ordinal.checked_sub(1) {
            Some(verse) if verse < len => {
                if verse == 0 {
                    Ok(section_start_end(start, policy))
                } else {
                    Ok(Some(start + verse))
                }
            }
            _ => Err(format!(
                "{boundary}: verse {} is outside 1..={} of section {}",
                boundary.verse_ordinal, len, boundary.section_ordinal
            )),
        }
    }
}

/// Partition the verses of `sections` into pages.
///
/// Page verses carry no `pageNumber`; that field belongs to the section view
/// (see [`crate::assemble::annotate_page_numbers`]).
pub fn paginate(
    sections: &[Section],
    boundaries: &[PageBoundary],
    options: &PaginateOptions,
) -> Pagination {
    let stream: Vec<&Verse> = crate::align::flatten(sections).collect();
    let layout = Layout::new(sections);

    let mut pages: Vec<Page> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut cursor = 0;

    for boundary in boundaries {
        let Some(index) = normalize_page_index(boundary.page_index, options.page_offset) else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::BoundaryOutOfRange,
                format!(
                    "{boundary}: page index is below the source offset {}",
                    options.page_offset
                ),
            ));
            continue;
        };

        let end = match layout.resolve(boundary, options.section_start) {
            Ok(Some(end)) if end >= cursor => end,
            Ok(_) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::NonMonotonicBoundary,
                    format!("{boundary}: ends before the current page starts"),
                ));
                continue;
            }
            Err(message) => {
                diagnostics.push(Diagnostic::new(DiagnosticKind::BoundaryOutOfRange, message));
                continue;
            }
        };

        if let Some(last) = pages.last()
            && index <= last.index
        {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NonMonotonicBoundary,
                format!(
                    "{boundary}: page {index} does not follow page {}",
                    last.index
                ),
            ));
            continue;
        }

        pages.push(page(index, &stream[cursor..=end]));
        cursor = end + 1;
    }

    if cursor < stream.len() {
        let index = pages.last().map_or(0, |p| p.index + 1);
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::TrailingVerses,
            format!(
                "{} verse(s) after the last boundary collected into page {index}",
                stream.len() - cursor
            ),
        ));
        pages.push(page(index, &stream[cursor..]));
    }

    Pagination { pages, diagnostics }
}

fn page(index: u32, verses: &[&Verse]) -> Page {
    Page {
        index,
        verses: verses
            .iter()
            .map(|v| Verse {
                page_number: None,
                ..(*v).clone()
            })
            .collect(),
    }
}
