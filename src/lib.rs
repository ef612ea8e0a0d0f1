//! # Corpus Forge
//!
//! Builds a multilingual scripture corpus from Tanzil-style sources. An
//! original-language text, any number of positionally aligned translations,
//! optional localized section titles, and a page boundary index are merged
//! into two JSON documents: one nested by section, one partitioned by page.
//!
//! # Architecture: Linear Pipeline
//!
//! ```text
//! 1. Load       XML / JSON  →  Node tree        (format-agnostic)
//! 2. Normalize  Node tree   →  RawCorpus        (sura/aya/chapter/... → section/verse)
//! 3. Align      RawCorpus × translations → Section tree with localizedText
//! 4. Enrich     + localizedTitle per section
//! 5. Paginate   Section tree × boundaries → Page list
//! 6. Assemble   {copyright, corpus: {sections}} and {copyright, corpus: {pages}}
//! ```
//!
//! Every stage after loading is a pure function of its inputs. The only
//! nondeterminism is verse IDs, which come from an [`ids::IdSource`] the
//! caller supplies, so tests can swap in [`ids::SequentialIds`] and compare
//! outputs byte for byte.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | XML and JSON loading into a generic [`source::Node`] tree |
//! | [`normalize`] | Vocabulary tables and extraction of corpora, titles and boundaries |
//! | [`align`] | Positional join of the original with every translation, shape check |
//! | [`enrich`] | Localized section titles and section indices |
//! | [`paginate`] | Boundary resolution and page partitioning |
//! | [`assemble`] | Output documents, page-number annotation, atomic writes |
//! | [`ids`] | Verse ID generation seam |
//! | [`pipeline`] | Source discovery and stage orchestration |
//! | [`config`] | `corpus.toml` loading, validation, and merging |
//! | [`types`] | Shared output records (`Section`, `Verse`, `Page`) and diagnostics |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber and `RUST_LOG` filter |
//!
//! # Design Decisions
//!
//! ## Position Is the Only Join Key
//!
//! Translations carry no verse identifiers the aligner can trust, so section
//! `i`, verse `j` of a translation is taken to be section `i`, verse `j` of
//! the original. A translation that drops a single verse would shift every
//! later verse of its section, so the aligner compares counts for every
//! source before joining anything and refuses the whole build on the first
//! difference.
//!
//! ## Strict Joins, Lenient Titles
//!
//! Translations must match the original exactly. Title sources may stop
//! early; remaining sections simply lack a title for that locale.
//!
//! ## Diagnostics Instead of Silent Skips
//!
//! A boundary record that cannot be used (malformed, out of range, or one that
//! would break page ordering) is skipped, and the skip is reported as a
//! [`types::Diagnostic`]. The build still succeeds, and every verse still
//! lands on exactly one page.

pub mod align;
pub mod assemble;
pub mod config;
pub mod enrich;
pub mod ids;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod paginate;
pub mod pipeline;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
