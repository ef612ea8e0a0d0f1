//! Source vocabulary normalization.
//!
//! Sources describe the same hierarchy with different words: Tanzil XML says
//! `sura`/`aya`, other editions say `surah`/`ayah` or `chapter`/`verse`, and a
//! JSON export may use `sections`/`verses` array keys. Every known spelling is
//! mapped to one canonical name through [`TAG_TABLE`] and [`ATTRIBUTE_TABLE`].
//! Unknown keys pass through unchanged.
//!
//! Normalization never fails. A malformed source turns into a corpus with the
//! wrong shape, which the aligner's count check then rejects.

use crate::source::Node;
use crate::types::{Attributes, Diagnostic, DiagnosticKind, PageBoundary};
use std::collections::BTreeMap;

pub const SECTION: &str = "section";
pub const VERSE: &str = "verse";
pub const PAGE: &str = "page";

/// Source element name → canonical element name.
///
/// Plural wrappers used by Tanzil metadata (`suras`, `pages`) are deliberately
/// absent: they wrap records rather than being records.
pub const TAG_TABLE: &[(&str, &str)] = &[
    ("sura", SECTION),
    ("surah", SECTION),
    ("surahs", SECTION),
    ("chapter", SECTION),
    ("chapters", SECTION),
    ("sections", SECTION),
    ("aya", VERSE),
    ("ayah", VERSE),
    ("ayahs", VERSE),
    ("verses", VERSE),
    ("pagebreak", PAGE),
    ("boundary", PAGE),
    ("boundaries", PAGE),
];

/// Source attribute name → canonical attribute name.
pub const ATTRIBUTE_TABLE: &[(&str, &str)] = &[
    ("content", "text"),
    ("body", "text"),
    ("title", "name"),
    ("sura", "sectionOrdinal"),
    ("surah", "sectionOrdinal"),
    ("chapter", "sectionOrdinal"),
    ("section", "sectionOrdinal"),
    ("section_ordinal", "sectionOrdinal"),
    ("aya", "verseOrdinal"),
    ("ayah", "verseOrdinal"),
    ("verse", "verseOrdinal"),
    ("verse_ordinal", "verseOrdinal"),
    ("page", "pageIndex"),
    ("page_index", "pageIndex"),
];

fn lookup<'a>(table: &[(&str, &'a str)], key: &'a str) -> &'a str {
    table
        .iter()
        .find(|(source, _)| source.eq_ignore_ascii_case(key))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

pub fn canonical_tag(name: &str) -> &str {
    lookup(TAG_TABLE, name)
}

pub fn canonical_attribute(name: &str) -> &str {
    lookup(ATTRIBUTE_TABLE, name)
}

/// Rename every attribute key through [`ATTRIBUTE_TABLE`].
///
/// When two source keys collapse onto one canonical key, the key that was
/// already canonical wins.
pub fn normalize_attributes(attributes: &Attributes) -> Attributes {
    let mut out = Attributes::new();
    for (key, value) in attributes {
        let canonical = canonical_attribute(key);
        if canonical == key {
            out.insert(key.clone(), value.clone());
        } else {
            out.entry(canonical.to_string())
                .or_insert_with(|| value.clone());
        }
    }
    out
}

/// A section → verse hierarchy in canonical vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCorpus {
    pub sections: Vec<RawSection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSection {
    pub attributes: Attributes,
    pub verses: Vec<Attributes>,
}

impl RawCorpus {
    pub fn verse_count(&self) -> usize {
        self.sections.iter().map(|s| s.verses.len()).sum()
    }
}

fn is_tag(node: &Node, canonical: &str) -> bool {
    canonical_tag(&node.name) == canonical
}

/// Normalize a loaded text source into `{sections: [{..., verses: [...]}]}`.
///
/// Sections are all nodes whose canonical tag is `section`, in document order.
/// A verse without a `text` attribute takes its element text instead.
pub fn normalize_corpus(root: &Node) -> RawCorpus {
    let sections = root
        .descendants()
        .into_iter()
        .filter(|node| is_tag(node, SECTION))
        .map(|node| RawSection {
            attributes: normalize_attributes(&node.attributes),
            verses: node
                .children
                .iter()
                .filter(|child| is_tag(child, VERSE))
                .map(verse_attributes)
                .collect(),
        })
        .collect();
    RawCorpus { sections }
}

fn verse_attributes(node: &Node) -> Attributes {
    let mut attributes = normalize_attributes(&node.attributes);
    if let Some(text) = &node.text {
        attributes
            .entry("text".to_string())
            .or_insert_with(|| text.clone());
    }
    attributes
}

/// Records of a list-shaped source: canonical `tag` descendants if there are
/// any, otherwise the root's direct children.
fn records<'a>(root: &'a Node, tag: &str) -> Vec<&'a Node> {
    let tagged: Vec<&Node> = root
        .descendants()
        .into_iter()
        .filter(|node| is_tag(node, tag))
        .collect();
    if tagged.is_empty() {
        root.children.iter().collect()
    } else {
        tagged
    }
}

/// Section titles for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTitles {
    /// Zero-based section position → title.
    pub names: BTreeMap<usize, String>,
    /// Section positions the source claims to describe: the record count in
    /// document order, or the highest index when index-keyed.
    pub extent: usize,
}

impl SectionTitles {
    pub fn get(&self, position: usize) -> Option<&str> {
        self.names.get(&position).map(String::as_str)
    }
}

/// Section titles for one locale.
///
/// Records are `{name}` entries, optionally carrying a 1-based `index`. When
/// every record has a usable index the titles are index-keyed and gaps stay
/// empty; otherwise records are taken in document order. Element text stands
/// in for a missing `name`. Storage is proportional to the record count, not
/// to the indices named.
pub fn section_titles(root: &Node) -> SectionTitles {
    let entries: Vec<(Option<usize>, Option<String>)> = records(root, SECTION)
        .into_iter()
        .map(|node| {
            let attributes = normalize_attributes(&node.attributes);
            let index = attributes
                .get("index")
                .and_then(|i| i.trim().parse::<usize>().ok())
                .filter(|&i| i >= 1);
            let name = attributes
                .get("name")
                .cloned()
                .or_else(|| node.text.clone());
            (index, name)
        })
        .collect();

    let mut titles = SectionTitles::default();
    if !entries.is_empty() && entries.iter().all(|(index, _)| index.is_some()) {
        for (index, name) in entries {
            let Some(index) = index else { continue };
            titles.extent = titles.extent.max(index);
            if let Some(name) = name {
                titles.names.entry(index - 1).or_insert(name);
            }
        }
    } else {
        titles.extent = entries.len();
        for (position, (_, name)) in entries.into_iter().enumerate() {
            if let Some(name) = name {
                titles.names.insert(position, name);
            }
        }
    }
    titles
}

/// Boundary records in source order.
///
/// The page number is read from `pageIndex`, falling back to `index` (Tanzil
/// spells it `<page index=".." sura=".." aya=".."/>`). Records with a missing
/// or non-numeric field are skipped and reported.
pub fn boundary_records(root: &Node) -> (Vec<PageBoundary>, Vec<Diagnostic>) {
    let mut boundaries = Vec::new();
    let mut diagnostics = Vec::new();

    for (position, node) in records(root, PAGE).into_iter().enumerate() {
        let attributes = normalize_attributes(&node.attributes);
        let field = |key: &str| attributes.get(key).map(|v| v.trim().to_string());
        let page_index = field("pageIndex").or_else(|| field("index"));

        let parsed = (
            page_index.as_deref().and_then(|v| v.parse::<u32>().ok()),
            field("sectionOrdinal").and_then(|v| v.parse::<usize>().ok()),
            field("verseOrdinal").and_then(|v| v.parse::<usize>().ok()),
        );
        match parsed {
            (Some(page), Some(section), Some(verse)) => {
                boundaries.push(PageBoundary::new(page, section, verse));
            }
            _ => diagnostics.push(Diagnostic::new(
                DiagnosticKind::MalformedBoundary,
                format!(
                    "record {} ({}) needs numeric pageIndex, sectionOrdinal and verseOrdinal",
                    position + 1,
                    describe(node)
                ),
            )),
        }
    }

    (boundaries, diagnostics)
}

fn describe(node: &Node) -> String {
    let attrs: Vec<String> = node
        .attributes
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect();
    if attrs.is_empty() {
        format!("<{}>", node.name)
    } else {
        format!("<{} {}>", node.name, attrs.join(" "))
    }
}
