//! Output documents: provenance header + section view / page view.
//!
//! Two documents are produced from one build:
//!
//! ```text
//! {"copyright": "...", "corpus": {"sections": [...]}}   section view, verses carry pageNumber
//! {"copyright": "...", "corpus": {"pages": [...]}}      page view, verses carry no pageNumber
//! ```
//!
//! Both are serialized in memory before anything touches the disk, and
//! [`write_documents`] replaces the two files together: a failure at any
//! step leaves the previous outputs in place.

use crate::types::{Page, Section};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Attribution block shipped with the Tanzil Quran text. Its terms require it
/// to be reproduced verbatim in every derived file.
pub const DEFAULT_PROVENANCE: &str = r#"
// PLEASE DO NOT REMOVE OR CHANGE THIS COPYRIGHT BLOCK
//====================================================================
//
//  Tanzil Quran Text (Simple, Version 1.1)
//  Copyright (C) 2007-2023 Tanzil Project
//  License: Creative Commons Attribution 3.0
//
//  This copy of the Quran text is carefully produced, highly 
//  verified and continuously monitored by a group of specialists 
//  at Tanzil Project.
//
//  TERMS OF USE:
//
//  - Permission is granted to copy and distribute verbatim copies 
//    of this text, but CHANGING IT IS NOT ALLOWED.
//
//  - This Quran text can be used in any website or application, 
//    provided that its source (Tanzil Project) is clearly indicated, 
//    and a link is made to tanzil.net to enable users to keep
//    track of changes.
//
//  - This copyright notice shall be included in all verbatim copies 
//    of the text, and shall be reproduced appropriately in all files 
//    derived from or containing substantial portion of this text.
//
//  Please check updates at: http://tanzil.net/updates/
//
//===================================================================="#;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionsDocument {
    pub copyright: String,
    pub corpus: SectionsBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionsBody {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagesDocument {
    pub copyright: String,
    pub corpus: PagesBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagesBody {
    pub pages: Vec<Page>,
}

/// Copy each verse's page number from the page view into the section view.
pub fn annotate_page_numbers(sections: Vec<Section>, pages: &[Page]) -> Vec<Section> {
    let page_of: HashMap<(usize, usize), u32> = pages
        .iter()
        .flat_map(|page| {
            page.verses
                .iter()
                .map(move |v| ((v.section_index, v.index), page.index))
        })
        .collect();

    sections
        .into_iter()
        .map(|mut section| {
            section.verses = std::mem::take(&mut section.verses)
                .into_iter()
                .map(|mut verse| {
                    verse.page_number = page_of.get(&(verse.section_index, verse.index)).copied();
                    verse
                })
                .collect();
            section
        })
        .collect()
}

pub fn assemble_sections(copyright: &str, sections: Vec<Section>) -> SectionsDocument {
    SectionsDocument {
        copyright: copyright.to_string(),
        corpus: SectionsBody { sections },
    }
}

pub fn assemble_pages(copyright: &str, pages: Vec<Page>) -> PagesDocument {
    PagesDocument {
        copyright: copyright.to_string(),
        corpus: PagesBody { pages },
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Serialize and persist both documents.
///
/// Both documents are written to temporary siblings first. Existing outputs
/// are then moved aside to `.bak` siblings and the new files renamed into
/// place. If any step fails, the new files are removed and the old outputs
/// restored, so either both documents are replaced or neither is.
pub fn write_documents(
    sections: &SectionsDocument,
    sections_path: &Path,
    pages: &PagesDocument,
    pages_path: &Path,
    pretty: bool,
) -> Result<(), WriteError> {
    let outputs = [
        (sections_path, to_json(sections, pretty)?),
        (pages_path, to_json(pages, pretty)?),
    ];

    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(outputs.len());
    for (path, json) in &outputs {
        match stage(path, json) {
            Ok(tmp) => staged.push((tmp, *path)),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    let mut backups: Vec<(PathBuf, &Path)> = Vec::new();
    for (_, path) in &staged {
        if !path.exists() {
            continue;
        }
        let backup = backup_path(path);
        if let Err(source) = fs::rename(path, &backup) {
            restore(&backups);
            discard(&staged);
            return Err(io_error(path, source));
        }
        backups.push((backup, *path));
    }

    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(tmp, path) {
            for (_, committed) in &staged[..i] {
                let _ = fs::remove_file(committed);
            }
            restore(&backups);
            discard(&staged[i..]);
            return Err(io_error(path, source));
        }
        debug!(path = %path.display(), "wrote document");
    }

    for (backup, _) in &backups {
        let _ = fs::remove_file(backup);
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> WriteError {
    WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

fn backup_path(path: &Path) -> PathBuf {
    sibling(path, ".bak")
}

fn restore(backups: &[(PathBuf, &Path)]) {
    for (backup, path) in backups {
        let _ = fs::rename(backup, path);
    }
}

fn stage(path: &Path, json: &str) -> Result<PathBuf, WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| io_error(path, e))?;
    Ok(tmp)
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}
