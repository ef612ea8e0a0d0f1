//! Section enrichment: localized titles and positional indices.
//!
//! Title sources are matched to sections by position, like translations. They
//! are lenient where translations are strict: a title list that stops early
//! leaves the remaining sections without a title for that locale. A list
//! *longer* than the corpus means the source describes something else, and is
//! rejected.

use crate::align::StructuralMismatch;
use crate::normalize::SectionTitles;
use crate::types::Section;
use std::collections::BTreeMap;

/// Attach `localizedTitle.<locale>` and `index` to every section.
pub fn enrich_sections(
    sections: Vec<Section>,
    titles: &BTreeMap<String, SectionTitles>,
) -> Result<Vec<Section>, StructuralMismatch> {
    for (locale, names) in titles {
        if names.extent > sections.len() {
            return Err(StructuralMismatch::Titles {
                locale: locale.clone(),
                titles: names.extent,
                sections: sections.len(),
            });
        }
    }

    Ok(sections
        .into_iter()
        .enumerate()
        .map(|(i, section)| Section {
            index: i,
            localized_title: titles
                .iter()
                .filter_map(|(locale, names)| {
                    names.get(i).map(|name| (locale.clone(), name.to_string()))
                })
                .collect(),
            ..section
        })
        .collect())
}
