// 🚀 Pipelines - compound family and set resolution, end to end
//
// 1. read the corpus, sort by collation
// 2. build the registry (malformed tags abort here, before any write)
// 3. clear + recreate groups                       → commit
// 4. resolve associations                          → commit
// 5. render each group's html                      → commit
// 6. audit event, optional flashcard export
//
// Every run is a full rebuild. A failed run is simply re-run.

use crate::classifier::CompoundClassifier;
use crate::collation::{sort_by_collation, Collator};
use crate::config::Config;
use crate::db::{self, Event};
use crate::error::Result;
use crate::export::{flashcard_rows, write_flashcards};
use crate::headword::HeadwordRecord;
use crate::registry::{build_compound_registry, build_set_registry, GroupKind, GroupRegistry};
use crate::render::render_group;
use crate::resolver::{resolve_associations, ResolutionStats};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// RUN REPORT
// ============================================================================

/// Non-fatal problems, reported at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunWarning {
    /// Set with fewer members than `min_set_members`
    UnderpopulatedSet { key: String, count: usize },

    /// Flashcard row over the size ceiling, left out of the export
    OversizedExport { key: String, html_len: usize },
}

impl RunWarning {
    pub fn message(&self) -> String {
        match self {
            RunWarning::UnderpopulatedSet { key, count } => {
                format!("only {} names in set: {}", count, key)
            }
            RunWarning::OversizedExport { key, html_len } => {
                format!("{} flashcard is {} characters, left out of export", key, html_len)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub kind: GroupKind,
    pub headwords_scanned: usize,
    pub groups_created: usize,
    pub groups_deleted: usize,
    pub resolution: ResolutionStats,
    pub flashcards_written: usize,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "{}: {} groups from {} headwords, {} links ({} anchored), {} warnings",
            self.kind,
            self.groups_created,
            self.headwords_scanned,
            self.resolution.linked,
            self.resolution.anchored,
            self.warnings.len()
        )
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// ============================================================================
// PIPELINES
// ============================================================================

/// Rebuild compound families
pub fn run_compound_families<C: Collator + ?Sized>(
    conn: &mut Connection,
    config: &Config,
    collator: &C,
    generated_on: &str,
) -> Result<RunReport> {
    let classifier = CompoundClassifier::new(config.max_compound_len);
    let records = sorted_headwords(conn, collator)?;
    let registry = build_compound_registry(&records, &config.compound_separator, &classifier)?;

    let mut report = rebuild(
        conn,
        &records,
        &registry,
        &config.compound_separator,
        collator,
        &classifier,
    )?;

    if let Some(path) = &config.compound_tsv_path {
        export(&registry, path, generated_on, config, &mut report)?;
    }

    Ok(report)
}

/// Rebuild sets
pub fn run_family_sets<C: Collator + ?Sized>(
    conn: &mut Connection,
    config: &Config,
    collator: &C,
    generated_on: &str,
) -> Result<RunReport> {
    let classifier = CompoundClassifier::new(config.max_compound_len);
    let records: Vec<HeadwordRecord> = sorted_headwords(conn, collator)?
        .into_iter()
        .filter(|w| w.set_field().is_some())
        .collect();
    let registry = build_set_registry(&records, &config.set_separator)?;

    let mut report = rebuild(
        conn,
        &records,
        &registry,
        &config.set_separator,
        collator,
        &classifier,
    )?;

    for (key, count) in registry.underpopulated(config.min_set_members) {
        tracing::warn!(set = %key, count, "less than {} names in set", config.min_set_members);
        report
            .warnings
            .push(RunWarning::UnderpopulatedSet { key, count });
    }

    if let Some(path) = &config.set_tsv_path {
        export(&registry, path, generated_on, config, &mut report)?;
    }

    Ok(report)
}

fn sorted_headwords<C: Collator + ?Sized>(
    conn: &Connection,
    collator: &C,
) -> Result<Vec<HeadwordRecord>> {
    let mut records = db::get_all_headwords(conn)?;
    sort_by_collation(&mut records, collator, |w| w.pali_1.as_str());
    Ok(records)
}

/// Steps 3-6: the three commit checkpoints and the audit event
fn rebuild<C: Collator + ?Sized>(
    conn: &mut Connection,
    records: &[HeadwordRecord],
    registry: &GroupRegistry,
    separator: &str,
    collator: &C,
    classifier: &CompoundClassifier,
) -> Result<RunReport> {
    let kind = registry.kind();

    // (1) clear and recreate all groups, without html
    let tx = conn.transaction()?;
    let groups_deleted = db::clear_groups(&tx, kind)?;
    for (key, item) in registry.iter() {
        db::insert_group(&tx, kind, key, item.count())?;
    }
    tx.commit()?;
    tracing::info!(kind = %kind, created = registry.len(), deleted = groups_deleted, "groups recreated");

    // (2) associate headwords
    let tx = conn.transaction()?;
    let resolution = resolve_associations(&tx, records, registry, separator)?;
    tx.commit()?;

    // (3) render html, which needs the relation in place
    let tx = conn.transaction()?;
    for group in db::all_groups(&tx, kind)? {
        let html = render_group(&tx, &group, collator, classifier)?;
        db::update_group_html(&tx, kind, group.id, &html)?;
    }
    tx.commit()?;
    tracing::info!(kind = %kind, "group html rendered");

    let event = Event::new(
        "groups_rebuilt",
        kind.entity_type(),
        "all",
        serde_json::json!({
            "groups_created": registry.len(),
            "groups_deleted": groups_deleted,
            "linked": resolution.linked,
            "anchored": resolution.anchored,
        }),
        "family_pipeline",
    );
    db::insert_event(conn, &event)?;

    Ok(RunReport {
        run_id: event.event_id,
        kind,
        headwords_scanned: records.len(),
        groups_created: registry.len(),
        groups_deleted,
        resolution,
        flashcards_written: 0,
        warnings: Vec::new(),
    })
}

fn export(
    registry: &GroupRegistry,
    path: &Path,
    generated_on: &str,
    config: &Config,
    report: &mut RunReport,
) -> Result<()> {
    let (rows, skipped) = flashcard_rows(registry, generated_on, config.max_export_html_len);
    report.flashcards_written = write_flashcards(path, &rows)?;

    for s in skipped {
        report.warnings.push(RunWarning::OversizedExport {
            key: s.key,
            html_len: s.html_len,
        });
    }

    tracing::info!(path = %path.display(), rows = report.flashcards_written, "flashcards written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collation::PaliCollator;
    use crate::db::{
        all_groups, count_all_members, find_group, get_headword, groups_for_headword,
        insert_headwords, setup_database,
    };
    use crate::error::FamilyError;
    use crate::render::should_show_group_affordance;

    /// Compound families and sets as found in the dictionary
    fn corpus() -> Vec<HeadwordRecord> {
        vec![
            HeadwordRecord::new("aṭṭhakusalakammapaccayā", "masc", "masc, comp", "eight wholesome kamma conditions")
                .with_compound_family("aṭṭha1 kusala kamma paccayā"),
            HeadwordRecord::new("adhammakammasañña", "adj", "adj, comp", "perceiving an improper act")
                .with_compound_family("dhamma1 kamma saññā"),
            HeadwordRecord::new("apaṇṇakapaṭipadā", "fem", "fem, comp", "sure path")
                .with_compound_family("apaṇṇaka paṭipadā"),
            HeadwordRecord::new("gihisāmīcipaṭipadā", "fem", "fem, comp", "proper conduct for a householder")
                .with_compound_family("gihī sāmīci paṭipadā"),
            HeadwordRecord::new("sallekhasutta", "nt", "nt, comp", "discourse on effacement")
                .with_family_set("suttas of the Majjhima Nikāya"),
            HeadwordRecord::new("aṅgulipatodakasikkhāpada", "nt", "nt, comp", "training rule on tickling")
                .with_family_set("bhikkhupātimokkha rules"),
            HeadwordRecord::new("issatta", "nt", "nt", "archery"),
            HeadwordRecord::new("dvipadagga", "masc", "masc, comp", "best of bipeds")
                .with_compound_family("dvi pada agga1"),
            HeadwordRecord::new("sokaparidevamacchara", "nt", "nt, comp", "sorrow, lamentation and avarice")
                .with_compound_family("soka parideva macchara"),
            HeadwordRecord::new("aññāsikoṇḍañña", "masc", "masc, comp", "name of a monk")
                .with_compound_family("aññāsi")
                .with_family_set("names of monks; names of arahants"),
            HeadwordRecord::new("assayuja 1", "masc", "masc, comp", "name of a month")
                .with_compound_family("assa1 yuja")
                .with_family_set("months of the lunar year; astronomical terms"),
            HeadwordRecord::new("bodhirukkha", "masc", "masc, comp", "Bodhi tree")
                .with_compound_family("bodhi rukkha")
                .with_family_set("plants; trees"),
            HeadwordRecord::new("amba", "masc", "masc", "mango").with_family_set("plants; trees"),
            HeadwordRecord::new("sāla 1", "masc", "masc", "sal tree").with_family_set("trees"),
            HeadwordRecord::new("kamma 1", "nt", "nt", "action"),
            HeadwordRecord::new("gata 1", "pp", "pp", "gone"),
            HeadwordRecord::new("suññāgata", "nt", "nt, comp", "empty place")
                .with_compound_family("suñña gata"),
        ]
    }

    fn config() -> Config {
        Config {
            set_separator: "; ".to_string(),
            ..Config::default()
        }
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        insert_headwords(&conn, &corpus()).unwrap();
        conn
    }

    fn keys(conn: &Connection, kind: GroupKind, pali_1: &str, sep: &str) -> Vec<String> {
        let w = get_headword(conn, pali_1).unwrap();
        groups_for_headword(conn, kind, &w, sep)
            .unwrap()
            .into_iter()
            .map(|g| g.key)
            .collect()
    }

    #[test]
    fn test_compound_families_end_to_end() {
        let mut conn = setup();
        let report = run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();

        let expected: &[(&str, &[&str])] = &[
            ("aṭṭhakusalakammapaccayā", &["aṭṭha1", "kusala", "kamma", "paccayā"]),
            ("adhammakammasañña", &["dhamma1", "kamma", "saññā"]),
            ("apaṇṇakapaṭipadā", &["apaṇṇaka", "paṭipadā"]),
            ("gihisāmīcipaṭipadā", &["gihī", "sāmīci", "paṭipadā"]),
            ("sallekhasutta", &[]),
            ("aṅgulipatodakasikkhāpada", &[]),
            ("issatta", &[]),
            ("dvipadagga", &["dvi", "pada", "agga1"]),
            ("sokaparidevamacchara", &["soka", "parideva", "macchara"]),
            ("aññāsikoṇḍañña", &["aññāsi"]),
            ("assayuja 1", &["assa1", "yuja"]),
            ("bodhirukkha", &["bodhi", "rukkha"]),
            ("kamma 1", &["kamma"]),
            ("gata 1", &["gata"]),
        ];

        for (pali_1, expected_keys) in expected {
            assert_eq!(
                keys(&conn, GroupKind::CompoundFamily, pali_1, " "),
                *expected_keys,
                "families of {}",
                pali_1
            );
        }

        assert!(report.warnings.is_empty());
        assert_eq!(report.resolution.anchored, 2);
    }

    #[test]
    fn test_sets_end_to_end() {
        let mut conn = setup();
        let report = run_family_sets(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();

        let sep = "; ";
        assert_eq!(keys(&conn, GroupKind::Set, "sallekhasutta", sep), vec!["suttas of the Majjhima Nikāya"]);
        assert_eq!(keys(&conn, GroupKind::Set, "aññāsikoṇḍañña", sep), vec!["names of monks", "names of arahants"]);
        assert_eq!(keys(&conn, GroupKind::Set, "bodhirukkha", sep), vec!["plants", "trees"]);
        assert!(keys(&conn, GroupKind::Set, "dvipadagga", sep).is_empty());

        // plants has 2 members: reported, not fatal
        assert!(report
            .warnings
            .contains(&RunWarning::UnderpopulatedSet { key: "plants".to_string(), count: 2 }));
        assert!(!report
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::UnderpopulatedSet { key, .. } if key == "trees")));
    }

    #[test]
    fn test_malformed_tag_aborts_before_any_group_is_created() {
        let mut conn = setup();
        // an earlier good run leaves groups in place
        run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();
        let before = all_groups(&conn, GroupKind::CompoundFamily).unwrap();

        insert_headwords(
            &conn,
            &[HeadwordRecord::new("kusalakamma", "nt", "comp", "good deed").with_compound_family("kusala + kamma")],
        )
        .unwrap();

        let err = run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap_err();
        assert!(matches!(err, FamilyError::MalformedTag { ref headword, .. } if headword == "kusalakamma"));

        let after = all_groups(&conn, GroupKind::CompoundFamily).unwrap();
        assert_eq!(before, after, "store untouched by the failed run");
    }

    #[test]
    fn test_rerun_is_a_full_rebuild() {
        let mut conn = setup();
        let first = run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();
        let rows_first = count_all_members(&conn, GroupKind::CompoundFamily).unwrap();
        let html_first = find_group(&conn, GroupKind::CompoundFamily, "paṭipadā").unwrap().unwrap().html;

        let second = run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();
        let rows_second = count_all_members(&conn, GroupKind::CompoundFamily).unwrap();
        let html_second = find_group(&conn, GroupKind::CompoundFamily, "paṭipadā").unwrap().unwrap().html;

        assert_eq!(second.groups_deleted, first.groups_created);
        assert_eq!(rows_first, rows_second, "no duplicate membership rows");
        assert_eq!(html_first, html_second, "byte-identical html");
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_group_html_in_collation_order() {
        let mut conn = setup();
        run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();

        let html = find_group(&conn, GroupKind::CompoundFamily, "paṭipadā").unwrap().unwrap().html;
        let apannaka = html.find("apaṇṇakapaṭipadā").unwrap();
        let gihi = html.find("gihisāmīcipaṭipadā").unwrap();
        assert!(apannaka < gihi);
    }

    #[test]
    fn test_count_is_discovery_time() {
        let mut conn = setup();
        run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();

        // "gata" is counted from suññāgata only; gata 1 is linked as the anchor
        let gata = find_group(&conn, GroupKind::CompoundFamily, "gata").unwrap().unwrap();
        assert_eq!(gata.count, 1);
        assert_eq!(db::count_members(&conn, GroupKind::CompoundFamily, gata.id).unwrap(), 2);
    }

    #[test]
    fn test_affordance_follows_resolved_membership() {
        let mut conn = setup();
        run_compound_families(&mut conn, &config(), &PaliCollator, "2024-01-01").unwrap();

        let gata = get_headword(&conn, "gata 1").unwrap();
        let issatta = get_headword(&conn, "issatta").unwrap();
        let bodhirukkha = get_headword(&conn, "bodhirukkha").unwrap();

        // untagged, but anchors the gata family
        assert!(should_show_group_affordance(&conn, &gata).unwrap());
        assert!(!should_show_group_affordance(&conn, &issatta).unwrap());
        assert!(should_show_group_affordance(&conn, &bodhirukkha).unwrap());
    }

    #[test]
    fn test_export_and_audit_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.compound_tsv_path = Some(dir.path().join("family_compound.tsv"));

        let mut conn = setup();
        let report = run_compound_families(&mut conn, &config, &PaliCollator, "2024-01-01").unwrap();

        assert_eq!(report.flashcards_written, report.groups_created);
        assert!(dir.path().join("family_compound.tsv").exists());

        let events = db::get_events_for_entity(&conn, "family_compound", "all").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, report.run_id);
    }

    #[test]
    fn test_oversized_export_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.compound_tsv_path = Some(dir.path().join("family_compound.tsv"));
        config.max_export_html_len = 10;

        let mut conn = setup();
        let report = run_compound_families(&mut conn, &config, &PaliCollator, "2024-01-01").unwrap();

        assert_eq!(report.flashcards_written, 0);
        assert_eq!(report.warnings.len(), report.groups_created);
        assert!(matches!(report.warnings[0], RunWarning::OversizedExport { .. }));
    }
}
