//! Verse alignment: original text × translations → merged section tree.
//!
//! Sources are joined by position only. Section `i`, verse `j` of every
//! translation is assumed to be section `i`, verse `j` of the original; there
//! is no content key to fall back on. A single missing record would silently
//! shift every later translation in that section, so [`check_shape`] compares
//! section and verse counts across all sources before anything is joined.
//!
//! Each merged verse is the original's attributes plus:
//!
//! | Field | Value |
//! |-------|-------|
//! | `index` | `j` |
//! | `sectionIndex` | `i` |
//! | `id` | fresh token from the [`IdSource`] |
//! | `localizedText.<locale>` | translation verse text at `(i, j)` |

use crate::ids::IdSource;
use crate::normalize::{RawCorpus, RawSection};
use crate::types::{Attributes, Section, Verse};
use std::collections::BTreeMap;
use thiserror::Error;

/// Sources disagree on the shape of the corpus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralMismatch {
    #[error(
        "Section count mismatch for locale '{locale}': original has {original}, translation has {translation}"
    )]
    Sections {
        locale: String,
        original: usize,
        translation: usize,
    },
    #[error(
        "Verse count mismatch for locale '{locale}' in section {section}: original has {original}, translation has {translation}"
    )]
    Verses {
        locale: String,
        /// Zero-based section position.
        section: usize,
        original: usize,
        translation: usize,
    },
    #[error("Title source for locale '{locale}' has {titles} entries for {sections} sections")]
    Titles {
        locale: String,
        titles: usize,
        sections: usize,
    },
}

/// Keys computed during alignment. Source attributes with these names are
/// replaced rather than emitted twice.
const DERIVED_VERSE_KEYS: &[&str] = &["index", "sectionIndex", "id", "localizedText", "pageNumber"];
const DERIVED_SECTION_KEYS: &[&str] = &["index", "localizedTitle", "verses"];

/// Verify every translation has the original's section and verse counts.
///
/// Locales are checked in order; the first difference wins.
pub fn check_shape(
    original: &RawCorpus,
    translations: &BTreeMap<String, RawCorpus>,
) -> Result<(), StructuralMismatch> {
    for (locale, translation) in translations {
        if translation.sections.len() != original.sections.len() {
            return Err(StructuralMismatch::Sections {
                locale: locale.clone(),
                original: original.sections.len(),
                translation: translation.sections.len(),
            });
        }
        for (section, (ours, theirs)) in original
            .sections
            .iter()
            .zip(&translation.sections)
            .enumerate()
        {
            if ours.verses.len() != theirs.verses.len() {
                return Err(StructuralMismatch::Verses {
                    locale: locale.clone(),
                    section,
                    original: ours.verses.len(),
                    translation: theirs.verses.len(),
                });
            }
        }
    }
    Ok(())
}

/// Join the original corpus with every translation.
///
/// Returns sections with `index` set and an empty `localizedTitle`; titles
/// are attached by [`crate::enrich::enrich_sections`].
pub fn align(
    original: &RawCorpus,
    translations: &BTreeMap<String, RawCorpus>,
    ids: &mut dyn IdSource,
) -> Result<Vec<Section>, StructuralMismatch> {
    check_shape(original, translations)?;

    let mut sections = Vec::with_capacity(original.sections.len());
    for (i, section) in original.sections.iter().enumerate() {
        let counterparts: Vec<(&str, &RawSection)> = translations
            .iter()
            .map(|(locale, corpus)| (locale.as_str(), &corpus.sections[i]))
            .collect();

        let verses = section
            .verses
            .iter()
            .enumerate()
            .map(|(j, verse)| Verse {
                attributes: without(verse, DERIVED_VERSE_KEYS),
                index: j,
                section_index: i,
                id: ids.new_id(),
                localized_text: counterparts
                    .iter()
                    .map(|(locale, raw)| {
                        let text = raw.verses[j].get("text").cloned().unwrap_or_default();
                        (locale.to_string(), text)
                    })
                    .collect(),
                page_number: None,
            })
            .collect();

        sections.push(Section {
            attributes: without(&section.attributes, DERIVED_SECTION_KEYS),
            index: i,
            localized_title: BTreeMap::new(),
            verses,
        });
    }
    Ok(sections)
}

fn without(attributes: &Attributes, keys: &[&str]) -> Attributes {
    attributes
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// All verses in corpus order.
pub fn flatten(sections: &[Section]) -> impl Iterator<Item = &Verse> {
    sections.iter().flat_map(|s| s.verses.iter())
}
