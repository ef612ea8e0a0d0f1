//! Build orchestration: load every source, run the stages, hand back the
//! documents.
//!
//! ```text
//! original ─┐
//! translations ─┼─ normalize ─→ align ─→ enrich ─┬─────────────→ sections document
//! titles ───┘                                    └─ paginate ─┬→ pages document
//! boundaries ─→ boundary_records ───────────────────────────────┘
//! ```
//!
//! [`build`] does everything except writing; [`run`] writes the two
//! documents afterwards. The `check` command uses `build` alone.

use crate::align::{StructuralMismatch, align};
use crate::assemble::{
    DEFAULT_PROVENANCE, PagesDocument, SectionsDocument, WriteError, annotate_page_numbers,
    assemble_pages, assemble_sections, write_documents,
};
use crate::config::{ConfigError, CorpusConfig};
use crate::enrich::enrich_sections;
use crate::ids::IdSource;
use crate::normalize::{RawCorpus, boundary_records, normalize_corpus, section_titles};
use crate::paginate::paginate;
use crate::source::{self, LoadError};
use crate::types::Diagnostic;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Mismatch(#[from] StructuralMismatch),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("No translations found in {dir} and none configured in [sources.translations]")]
    NoTranslations { dir: PathBuf },
}

/// Absolute paths of every input of one build.
#[derive(Debug, Clone, PartialEq)]
pub struct Sources {
    pub original: PathBuf,
    pub boundaries: PathBuf,
    pub translations: BTreeMap<String, PathBuf>,
    pub titles: BTreeMap<String, PathBuf>,
    pub provenance: Option<PathBuf>,
}

/// Everything one build produced.
#[derive(Debug, Clone)]
pub struct Build {
    pub sources: Sources,
    pub sections: SectionsDocument,
    pub pages: PagesDocument,
    pub diagnostics: Vec<Diagnostic>,
}

impl Build {
    pub fn locales(&self) -> Vec<&str> {
        self.sources.translations.keys().map(String::as_str).collect()
    }

    pub fn verse_count(&self) -> usize {
        self.sections
            .corpus
            .sections
            .iter()
            .map(|s| s.verses.len())
            .sum()
    }
}

/// Locale of a translation file: its name up to the first dot.
///
/// `ru.abuadel.xml` → `ru`. Returns `None` for dot-files and names without a
/// stem.
pub fn locale_of(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let locale = name.split('.').next()?;
    (!locale.is_empty()).then_some(locale)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml") || e.eq_ignore_ascii_case("json"))
}

/// Find translation sources under `dir`, keyed by locale.
///
/// A missing directory yields no translations. Two files claiming the same
/// locale are an error.
pub fn discover_translations(dir: &Path) -> Result<BTreeMap<String, PathBuf>, LoadError> {
    let mut found: BTreeMap<String, PathBuf> = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(found);
    }

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_source_file(path) {
            continue;
        }
        let Some(locale) = locale_of(path) else {
            continue;
        };
        if let Some(first) = found.get(locale) {
            return Err(LoadError::DuplicateLocale {
                locale: locale.to_string(),
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        debug!(locale, path = %path.display(), "discovered translation");
        found.insert(locale.to_string(), path.to_path_buf());
    }
    Ok(found)
}

/// Resolve the configured paths against `root` and discover translations.
pub fn resolve_sources(root: &Path, config: &CorpusConfig) -> Result<Sources, BuildError> {
    let sources = &config.sources;
    let translations_dir = root.join(&sources.translations_dir);

    let mut translations = discover_translations(&translations_dir)?;
    for (locale, path) in &sources.translations {
        if let Some(discovered) = translations.insert(locale.clone(), root.join(path)) {
            debug!(
                locale = %locale,
                replaced = %discovered.display(),
                "configured translation overrides discovered file"
            );
        }
    }
    if translations.is_empty() {
        return Err(BuildError::NoTranslations {
            dir: translations_dir,
        });
    }

    Ok(Sources {
        original: root.join(&sources.original),
        boundaries: root.join(&sources.boundaries),
        translations,
        titles: sources
            .titles
            .iter()
            .map(|(locale, path)| (locale.clone(), root.join(path)))
            .collect(),
        provenance: config.provenance_file.as_ref().map(|p| root.join(p)),
    })
}

fn load_corpus(path: &Path) -> Result<RawCorpus, LoadError> {
    let corpus = normalize_corpus(&source::parse(path)?);
    debug!(
        path = %path.display(),
        sections = corpus.sections.len(),
        verses = corpus.verse_count(),
        "loaded corpus"
    );
    Ok(corpus)
}

fn load_provenance(path: Option<&Path>) -> Result<String, LoadError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(DEFAULT_PROVENANCE.to_string()),
    }
}

/// Run every stage and return both documents without writing them.
pub fn build(
    root: &Path,
    config: &CorpusConfig,
    ids: &mut dyn IdSource,
) -> Result<Build, BuildError> {
    let sources = resolve_sources(root, config)?;

    let original = load_corpus(&sources.original)?;
    let translations = sources
        .translations
        .iter()
        .map(|(locale, path)| Ok((locale.clone(), load_corpus(path)?)))
        .collect::<Result<BTreeMap<_, _>, LoadError>>()?;
    let titles = sources
        .titles
        .iter()
        .map(|(locale, path)| Ok((locale.clone(), section_titles(&source::parse(path)?))))
        .collect::<Result<BTreeMap<_, _>, LoadError>>()?;
    let (boundaries, mut diagnostics) = boundary_records(&source::parse(&sources.boundaries)?);
    let copyright = load_provenance(sources.provenance.as_deref())?;

    let sections = enrich_sections(align(&original, &translations, ids)?, &titles)?;
    let pagination = paginate(&sections, &boundaries, &config.pagination.options());
    diagnostics.extend(pagination.diagnostics);

    let sections = annotate_page_numbers(sections, &pagination.pages);
    info!(
        sections = sections.len(),
        pages = pagination.pages.len(),
        diagnostics = diagnostics.len(),
        "corpus assembled"
    );
    Ok(Build {
        sources,
        sections: assemble_sections(&copyright, sections),
        pages: assemble_pages(&copyright, pagination.pages),
        diagnostics,
    })
}

/// Output paths for the configured documents.
pub fn output_paths(root: &Path, config: &CorpusConfig) -> (PathBuf, PathBuf) {
    (
        root.join(&config.output.sections),
        root.join(&config.output.pages),
    )
}

/// [`build`], then write both documents.
pub fn run(
    root: &Path,
    config: &CorpusConfig,
    ids: &mut dyn IdSource,
) -> Result<Build, BuildError> {
    let build = build(root, config, ids)?;
    let (sections_path, pages_path) = output_paths(root, config);
    write_documents(
        &build.sections,
        &sections_path,
        &build.pages,
        &pages_path,
        config.output.pretty,
    )?;
    Ok(build)
}
