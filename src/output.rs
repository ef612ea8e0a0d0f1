//! CLI output formatting for the build and check commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Sections and pages
//! lead with their positional index and name; the files they came from are
//! listed once under `Sources`, relative to the corpus root.
//!
//! # Output Format
//!
//! ```text
//! Sources
//!     Original: quran-simple.xml
//!     Boundaries: quran-data.xml
//!     Translation en: translations/en.sahih.xml
//!     Translation ru: translations/ru.abuadel.xml
//!     Titles ru: titles/ru.json
//!
//! Sections
//! 001 الفاتحة (7 verses)
//!     Titles: ru
//!     Pages: 0
//! 002 البقرة (286 verses)
//!     Titles: ru
//!     Pages: 1-48
//!
//! Pages
//! 000 (7 verses) 1:1-1:7
//! 001 (5 verses) 2:1-2:5
//!
//! Built 114 sections, 6236 verses, 604 pages in 2 locales
//! ```
//!
//! Diagnostics are formatted separately and go to stderr:
//!
//! ```text
//! warning: boundary out of range: page 700 at 115:1: section 115 is outside 1..=114
//! ```
//!
//! # Architecture
//!
//! Each block has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes it out. Format functions
//! are pure: no I/O, no side effects.

use crate::pipeline::Build;
use crate::types::{Diagnostic, Page, Section};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + name, with optional verse count.
///
/// ```text
/// 001 الفاتحة (7 verses)
/// 000 (7 verses)
/// ```
fn entity_header(index: usize, name: &str, count: Option<usize>) -> String {
    let head = if name.is_empty() {
        format_index(index)
    } else {
        format!("{} {}", format_index(index), name)
    };
    match count {
        Some(1) => format!("{} (1 verse)", head),
        Some(n) => format!("{} ({} verses)", head, n),
        None => head,
    }
}

/// Path relative to the corpus root when possible.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// `"3"` for a single page, `"3-5"` for a run.
fn page_range(section: &Section) -> Option<String> {
    let mut numbers = section.verses.iter().filter_map(|v| v.page_number);
    let first = numbers.next()?;
    let last = numbers.last().unwrap_or(first);
    Some(if first == last {
        first.to_string()
    } else {
        format!("{first}-{last}")
    })
}

/// `"s:v-s:v"` in 1-based ordinals.
fn verse_span(page: &Page) -> String {
    let ordinal = |v: &crate::types::Verse| format!("{}:{}", v.section_index + 1, v.index + 1);
    match (page.verses.first(), page.verses.last()) {
        (Some(first), Some(last)) => format!("{}-{}", ordinal(first), ordinal(last)),
        _ => String::new(),
    }
}

// ============================================================================
// Build output
// ============================================================================

fn format_sources(build: &Build, root: &Path) -> Vec<String> {
    let sources = &build.sources;
    let mut lines = vec!["Sources".to_string()];
    lines.push(format!(
        "{}Original: {}",
        indent(1),
        relative(&sources.original, root)
    ));
    lines.push(format!(
        "{}Boundaries: {}",
        indent(1),
        relative(&sources.boundaries, root)
    ));
    for (locale, path) in &sources.translations {
        lines.push(format!(
            "{}Translation {}: {}",
            indent(1),
            locale,
            relative(path, root)
        ));
    }
    for (locale, path) in &sources.titles {
        lines.push(format!(
            "{}Titles {}: {}",
            indent(1),
            locale,
            relative(path, root)
        ));
    }
    if let Some(path) = &sources.provenance {
        lines.push(format!("{}Provenance: {}", indent(1), relative(path, root)));
    }
    lines
}

fn format_sections(sections: &[Section]) -> Vec<String> {
    let mut lines = vec!["Sections".to_string()];
    for section in sections {
        let name = section
            .attributes
            .get("name")
            .map(String::as_str)
            .unwrap_or("");
        lines.push(entity_header(
            section.index + 1,
            name,
            Some(section.verses.len()),
        ));
        if !section.localized_title.is_empty() {
            let locales: Vec<&str> = section.localized_title.keys().map(String::as_str).collect();
            lines.push(format!("{}Titles: {}", indent(1), locales.join(", ")));
        }
        if let Some(range) = page_range(section) {
            lines.push(format!("{}Pages: {}", indent(1), range));
        }
    }
    lines
}

fn format_pages(pages: &[Page]) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for page in pages {
        lines.push(format!(
            "{} {}",
            entity_header(page.index as usize, "", Some(page.verses.len())),
            verse_span(page)
        ));
    }
    lines
}

/// Format the result of a build: sources, section inventory, pages, summary.
pub fn format_build_output(build: &Build, root: &Path) -> Vec<String> {
    let sections = &build.sections.corpus.sections;
    let pages = &build.pages.corpus.pages;

    let mut lines = format_sources(build, root);
    lines.push(String::new());
    lines.extend(format_sections(sections));
    lines.push(String::new());
    lines.extend(format_pages(pages));
    lines.push(String::new());
    lines.push(format!(
        "Built {} sections, {} verses, {} pages in {} locales",
        sections.len(),
        build.verse_count(),
        pages.len(),
        build.locales().len()
    ));
    lines
}

pub fn print_build_output(build: &Build, root: &Path) {
    for line in format_build_output(build, root) {
        println!("{}", line);
    }
}

/// Format the output files written by `build`.
pub fn format_written(paths: &[&Path], root: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|path| format!("Wrote {}", relative(path, root)))
        .collect()
}

pub fn print_written(paths: &[&Path], root: &Path) {
    for line in format_written(paths, root) {
        println!("{}", line);
    }
}

/// One line per skipped boundary or record.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .map(|d| format!("warning: {}", d))
        .collect()
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for line in format_diagnostics(diagnostics) {
        eprintln!("{}", line);
    }
}
