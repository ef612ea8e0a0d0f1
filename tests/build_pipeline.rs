//! End-to-end builds over the fixture corpus through the public API.
//!
//! Run with: cargo test --test build_pipeline

use corpus_forge::align::StructuralMismatch;
use corpus_forge::config::{self, CONFIG_FILE, CorpusConfig};
use corpus_forge::ids::{SequentialIds, UuidIds};
use corpus_forge::paginate::SectionStartPolicy;
use corpus_forge::pipeline::{self, BuildError};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// Mirrors `test_helpers::setup_fixtures`, which is `#[cfg(test)]` and not visible here.
fn copy_dir_recursive(src: &Path, dst: &Path) {
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let dst_path = dst.join(entry.file_name());
        if entry.path().is_dir() {
            fs::create_dir_all(&dst_path).unwrap();
            copy_dir_recursive(&entry.path(), &dst_path);
        } else {
            fs::copy(entry.path(), &dst_path).unwrap();
        }
    }
}

fn fixture_corpus() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/corpus");
    copy_dir_recursive(&fixtures, tmp.path());
    tmp
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn run_fixture(root: &Path) -> (Value, Value) {
    let config = config::load_config(root).unwrap();
    pipeline::run(root, &config, &mut SequentialIds::new()).unwrap();
    let (sections, pages) = pipeline::output_paths(root, &config);
    (read_json(&sections), read_json(&pages))
}

/// `(sectionIndex, index)` of every verse in page order.
fn page_positions(pages: &Value) -> Vec<(u64, u64)> {
    pages["corpus"]["pages"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|page| page["verses"].as_array().unwrap().iter())
        .map(|v| {
            (
                v["sectionIndex"].as_u64().unwrap(),
                v["index"].as_u64().unwrap(),
            )
        })
        .collect()
}

// =============================================================================
// Join
// =============================================================================

#[test]
fn every_verse_has_every_locale() {
    let tmp = fixture_corpus();
    let (sections, _) = run_fixture(tmp.path());

    let sections = sections["corpus"]["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 3);
    for (i, section) in sections.iter().enumerate() {
        assert_eq!(section["index"], i);
        for (j, verse) in section["verses"].as_array().unwrap().iter().enumerate() {
            assert_eq!(verse["index"], j);
            assert_eq!(verse["sectionIndex"], i);
            let localized = verse["localizedText"].as_object().unwrap();
            assert_eq!(localized.len(), 2);
            assert!(localized.values().all(|t| !t.as_str().unwrap().is_empty()));
        }
    }
    assert_eq!(
        sections[1]["verses"][0]["localizedText"]["ru"],
        "Алиф. Лам. Мим."
    );
    // Pass-through attributes survive the join.
    assert_eq!(sections[0]["name"], "الفاتحة");
    assert_eq!(
        sections[1]["verses"][0]["bismillah"],
        "بسم الله الرحمن الرحيم"
    );
}

#[test]
fn uuid_ids_are_unique() {
    let tmp = fixture_corpus();
    let config = config::load_config(tmp.path()).unwrap();
    let build = pipeline::build(tmp.path(), &config, &mut UuidIds).unwrap();

    let ids: HashSet<&str> = build
        .sections
        .corpus
        .sections
        .iter()
        .flat_map(|s| s.verses.iter())
        .map(|v| v.id.as_str())
        .collect();
    assert_eq!(ids.len(), build.verse_count());
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn pages_partition_the_corpus_in_order() {
    let tmp = fixture_corpus();
    let (sections, pages) = run_fixture(tmp.path());

    let expected: Vec<(u64, u64)> = sections["corpus"]["sections"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|s| s["verses"].as_array().unwrap().iter())
        .map(|v| {
            (
                v["sectionIndex"].as_u64().unwrap(),
                v["index"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(page_positions(&pages), expected);

    let indices: Vec<u64> = pages["corpus"]["pages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["index"].as_u64().unwrap())
        .collect();
    assert_eq!(indices, [0, 1, 2]);
}

#[test]
fn section_view_page_numbers_match_page_view() {
    let tmp = fixture_corpus();
    let (sections, pages) = run_fixture(tmp.path());

    for page in pages["corpus"]["pages"].as_array().unwrap() {
        for verse in page["verses"].as_array().unwrap() {
            assert!(verse.get("pageNumber").is_none());
            let i = verse["sectionIndex"].as_u64().unwrap() as usize;
            let j = verse["index"].as_u64().unwrap() as usize;
            assert_eq!(
                sections["corpus"]["sections"][i]["verses"][j]["pageNumber"],
                page["index"]
            );
        }
    }
}

#[test]
fn previous_section_end_policy_moves_section_starts() {
    let tmp = fixture_corpus();
    fs::write(
        tmp.path().join("quran-data.xml"),
        r#"<quran><pages>
            <page index="2" sura="2" aya="1"/>
            <page index="3" sura="3" aya="4"/>
        </pages></quran>"#,
    )
    .unwrap();

    let mut config = config::load_config(tmp.path()).unwrap();
    let inclusive = pipeline::build(tmp.path(), &config, &mut SequentialIds::new()).unwrap();
    config.pagination.section_start = SectionStartPolicy::PreviousSectionEnd;
    let previous = pipeline::build(tmp.path(), &config, &mut SequentialIds::new()).unwrap();

    let first_page_len = |build: &pipeline::Build| build.pages.corpus.pages[0].verses.len();
    assert_eq!(first_page_len(&inclusive), 4);
    assert_eq!(first_page_len(&previous), 3);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn sequential_ids_give_identical_output() {
    let first = fixture_corpus();
    let second = fixture_corpus();
    run_fixture(first.path());
    run_fixture(second.path());

    let config = CorpusConfig::default();
    for name in [&config.output.sections, &config.output.pages] {
        let a = fs::read(first.path().join(name)).unwrap();
        let b = fs::read(second.path().join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between runs");
    }
}

// =============================================================================
// Titles
// =============================================================================

#[test]
fn short_title_source_falls_back_per_locale() {
    let tmp = fixture_corpus();
    let (sections, _) = run_fixture(tmp.path());
    let sections = sections["corpus"]["sections"].as_array().unwrap();

    assert_eq!(sections[0]["localizedTitle"]["en"], "The Opening");
    assert_eq!(sections[1]["localizedTitle"]["ru"], "Корова");
    assert!(sections[2]["localizedTitle"].get("en").is_none());
    assert_eq!(sections[2]["localizedTitle"]["ru"], "Семейство Имрана");
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn verse_count_mismatch_names_section_and_writes_nothing() {
    let tmp = fixture_corpus();
    fs::write(
        tmp.path().join("quran-simple.xml"),
        r#"<quran><sura index="1">
            <aya index="1" text="a"/><aya index="2" text="b"/><aya index="3" text="c"/>
            <aya index="4" text="d"/><aya index="5" text="e"/>
        </sura></quran>"#,
    )
    .unwrap();
    let one_section = r#"<quran><sura index="1">
            <aya index="1" text="a"/><aya index="2" text="b"/>
            <aya index="3" text="c"/><aya index="4" text="d"/>
        </sura></quran>"#;
    fs::write(tmp.path().join("translations/en.sample.xml"), one_section).unwrap();
    fs::write(tmp.path().join("translations/ru.sample.xml"), one_section).unwrap();
    let config = config::load_config(tmp.path()).unwrap();

    let err = pipeline::run(tmp.path(), &config, &mut SequentialIds::new()).unwrap_err();

    match &err {
        BuildError::Mismatch(StructuralMismatch::Verses {
            section,
            original,
            translation,
            ..
        }) => {
            assert_eq!((*section, *original, *translation), (0, 5, 4));
        }
        other => panic!("expected verse mismatch, got {other}"),
    }
    assert!(err.to_string().contains("section 0"));
    let (sections, pages) = pipeline::output_paths(tmp.path(), &config);
    assert!(!sections.exists());
    assert!(!pages.exists());
}

#[test]
fn existing_outputs_survive_a_failed_build() {
    let tmp = fixture_corpus();
    let (before, _) = run_fixture(tmp.path());

    fs::write(
        tmp.path().join("translations/ru.sample.xml"),
        "<quran><sura index=\"1\"></sura></quran>",
    )
    .unwrap();
    let config = config::load_config(tmp.path()).unwrap();
    assert!(pipeline::run(tmp.path(), &config, &mut SequentialIds::new()).is_err());

    let (sections, _) = pipeline::output_paths(tmp.path(), &config);
    assert_eq!(read_json(&sections), before);
}

#[test]
fn unsupported_source_format() {
    let tmp = fixture_corpus();
    fs::write(
        tmp.path().join(CONFIG_FILE),
        "[sources]\noriginal = \"quran.txt\"\n",
    )
    .unwrap();
    let config = config::load_config(tmp.path()).unwrap();
    let err = pipeline::build(tmp.path(), &config, &mut SequentialIds::new()).unwrap_err();
    assert!(err.to_string().contains("quran.txt"));
}

#[test]
fn stock_config_builds_fixture_corpus() {
    let tmp = fixture_corpus();
    let stock: CorpusConfig = toml::from_str(config::stock_config_toml()).unwrap();
    let build = pipeline::build(tmp.path(), &stock, &mut SequentialIds::new()).unwrap();
    assert_eq!(build.verse_count(), 9);
    assert!(build.sources.titles.is_empty());
}
