//! Shared test utilities for the corpus-forge test suite.
//!
//! Provides synthetic corpora of a given shape and an isolated copy of the
//! on-disk fixture corpus.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! // Two sections of 3 and 2 verses, texts "ar 1:1" .. "ar 2:2"
//! let original = raw_corpus("ar", &[3, 2]);
//! let translations = locales(&[("ru", raw_corpus("ru", &[3, 2]))]);
//!
//! // Already aligned, with sequential ids
//! let sections = aligned_sections(&[3, 2]);
//! assert_eq!(verse_texts(&sections), ["ar 1:1", "ar 1:2", "ar 1:3", "ar 2:1", "ar 2:2"]);
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

use crate::align::{align, flatten};
use crate::ids::SequentialIds;
use crate::normalize::{RawCorpus, RawSection};
use crate::types::{Attributes, Section};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/corpus/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/corpus");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Synthetic corpora
// =========================================================================

/// A corpus with one section per entry in `counts`.
///
/// Verse texts are `"{prefix} {section}:{verse}"`, both 1-based.
pub fn raw_corpus(prefix: &str, counts: &[usize]) -> RawCorpus {
    RawCorpus {
        sections: counts
            .iter()
            .enumerate()
            .map(|(i, &count)| RawSection {
                attributes: Attributes::from([("name".to_string(), format!("{prefix} {}", i + 1))]),
                verses: (0..count)
                    .map(|j| {
                        Attributes::from([(
                            "text".to_string(),
                            format!("{prefix} {}:{}", i + 1, j + 1),
                        )])
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Build the locale → corpus map `align` expects.
pub fn locales(entries: &[(&str, RawCorpus)]) -> BTreeMap<String, RawCorpus> {
    entries
        .iter()
        .map(|(locale, corpus)| (locale.to_string(), corpus.clone()))
        .collect()
}

/// An `ar` original joined with one `ru` translation of the same shape.
pub fn aligned_sections(counts: &[usize]) -> Vec<Section> {
    let original = raw_corpus("ar", counts);
    let translations = locales(&[("ru", raw_corpus("ru", counts))]);
    align(&original, &translations, &mut SequentialIds::new()).unwrap()
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Original verse texts in corpus order.
pub fn verse_texts(sections: &[Section]) -> Vec<&str> {
    flatten(sections)
        .map(|v| v.attributes.get("text").map(String::as_str).unwrap_or(""))
        .collect()
}
