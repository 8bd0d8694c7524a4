//! End-to-end tests of the fixture loader against a scratch database.
//!
//! Every test writes its own fixture directory into a temp dir, so they can
//! run in parallel.

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use jtw_codex::dedup::dedup_symmetric;
use jtw_codex::fixtures::{
    FixtureDir, CALAMITY_FILE, CHAPTER_FILE, CHARACTER_FILE, PLACE_FILE, WEAPON_FILE,
};
use jtw_codex::model::{NewCharacter, Race};
use jtw_codex::seed::{link_characters, SeedReport, SeedStep, Seeder};
use jtw_codex::store::{repo, Store};
use jtw_codex::ui::SilentUi;

// =============================================================================
// Fixture data
// =============================================================================

static CALAMITIES: Lazy<Value> = Lazy::new(|| {
    json!([
        {"title": "金蝉遭贬第一难", "summary": "金蝉子被贬下凡"},
        {"title": "出胎几杀第二难", "summary": "刘洪欲害婴儿"},
        {"title": "满月抛江第三难", "summary": "江流儿漂流金山寺"}
    ])
});

static PLACES: Lazy<Value> = Lazy::new(|| {
    json!([
        {"地名": "花果山", "所属大洲": "东胜神洲", "介绍": "十洲之祖脉，三岛之来龙"},
        {"地名": "长安", "所属大洲": "南赡部洲", "介绍": ""},
        {"地名": "天宫", "所属大洲": "三十三天", "介绍": "玉帝所居"}
    ])
});

static CHAPTERS: Lazy<Value> = Lazy::new(|| {
    json!([
        {"chapter": 1, "title": "灵根孕育源流出", "summary": "石猴出世", "locations": ["花果山", "水帘洞"]},
        {"chapter": 2, "title": "悟彻菩提真妙理", "summary": "拜师学艺", "locations": ["花果山"]}
    ])
});

static CHARACTERS: Lazy<Value> = Lazy::new(|| {
    json!([
        {"name": "唐僧", "type": "人", "ability": "念紧箍咒", "introduction": "取经人", "organization": "取经团队"},
        {"name": "孙悟空", "type": "妖", "ability": "七十二变",
         "superiors": {"唐僧": "师徒"}, "subordinates": {"猪八戒": "师兄弟"}},
        {"name": "猪八戒", "type": "妖", "ability": "三十六变",
         "superiors": {"唐僧": "师徒", "孙悟空": "师兄弟"}},
        {"name": " 沙僧 ", "organization": "  "},
        {"name": "敖广", "type": "仙", "subordinates": {"龙王三太子": "父子"}},
        {"name": "   "}
    ])
});

static WEAPONS: Lazy<Value> = Lazy::new(|| {
    json!([
        {"name": "如意金箍棒", "introduction": "重一万三千五百斤", "owner": "孙悟空"},
        {"name": "九齿钉耙", "introduction": "上宝沁金钯", "owner": "猪八戒"},
        {"name": "无主之宝", "introduction": "无人认领", "owner": ""},
        {"name": "芭蕉扇", "introduction": "一扇熄火", "owner": "铁扇公主"}
    ])
});

// =============================================================================
// Helpers
// =============================================================================

struct Scratch {
    store: Store,
    fixtures: FixtureDir,
    _dir: TempDir,
}

fn write_json(dir: &Path, file: &str, value: &Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A fresh database plus a fixture directory holding every file except
/// those listed in `omit`
fn scratch(omit: &[&str]) -> Scratch {
    let dir = TempDir::new().unwrap();
    let fixture_dir = dir.path().join("fixtures");
    fs::create_dir_all(&fixture_dir).unwrap();

    let files: [(&str, &Value); 5] = [
        (CALAMITY_FILE, &*CALAMITIES),
        (PLACE_FILE, &*PLACES),
        (CHAPTER_FILE, &*CHAPTERS),
        (CHARACTER_FILE, &*CHARACTERS),
        (WEAPON_FILE, &*WEAPONS),
    ];
    for (file, value) in files {
        if !omit.contains(&file) {
            write_json(&fixture_dir, file, value);
        }
    }

    let store = Store::open(&dir.path().join("codex.db")).unwrap();
    Scratch {
        store,
        fixtures: FixtureDir::new(fixture_dir),
        _dir: dir,
    }
}

impl Scratch {
    fn seed(&mut self, steps: &[SeedStep]) -> SeedReport {
        let mut ui = SilentUi::new();
        Seeder::new(&mut self.store, self.fixtures.clone()).run(steps, &mut ui)
    }

    fn seed_all(&mut self) -> SeedReport {
        self.seed(&SeedStep::ALL)
    }

    fn counts(&self) -> HashMap<&'static str, i64> {
        self.store.table_counts().unwrap().into_iter().collect()
    }

    fn fixture_path(&self, file: &str) -> std::path::PathBuf {
        self.fixtures.path_of(file)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_full_seed_populates_every_table() {
    let mut scratch = scratch(&[]);
    let report = scratch.seed_all();

    assert!(report.aborted_steps().is_empty(), "{:?}", report);
    let counts = scratch.counts();
    assert_eq!(counts["continents"], 5);
    assert_eq!(counts["relationship_types"], 9);
    assert_eq!(counts["calamities"], 3);
    // three from place.json plus 水帘洞 created while linking chapter 1
    assert_eq!(counts["locations"], 4);
    assert_eq!(counts["chapters"], 2);
    assert_eq!(counts["chapter_locations"], 3);
    assert_eq!(counts["characters"], 5);
    assert_eq!(counts["weapons"], 2);
    assert_eq!(counts["character_relationships"], 3);
}

#[test]
fn test_locations_resolve_continents() {
    let mut scratch = scratch(&[]);
    scratch.seed_all();
    let conn = scratch.store.conn();

    let huaguo = repo::location_id_by_name(conn, "花果山").unwrap().unwrap();
    assert_eq!(repo::location_continent_id(conn, huaguo).unwrap(), Some(1));

    // unknown continent falls back to the sentinel
    let tiangong = repo::location_id_by_name(conn, "天宫").unwrap().unwrap();
    let sentinel = repo::continent_id_by_name(conn, "无").unwrap().unwrap();
    assert_eq!(repo::location_continent_id(conn, tiangong).unwrap(), Some(sentinel));

    // created by chapter linking: placeholder description, no continent
    let shuilian = repo::location_id_by_name(conn, "水帘洞").unwrap().unwrap();
    assert_eq!(repo::location_continent_id(conn, shuilian).unwrap(), None);

    let detail = scratch.store.query().chapter_detail(1).unwrap();
    assert_eq!(detail.locations.len(), 2);
    assert!(detail.locations.contains(&"水帘洞".to_string()));
}

#[test]
fn test_sentinel_continent_is_created_when_missing() {
    let mut scratch = scratch(&[]);
    // no continent reset, so the sentinel does not exist yet
    let report = scratch.seed(&[SeedStep::Locations]);
    assert_eq!(report.step(SeedStep::Locations).unwrap().inserted, 3);

    let conn = scratch.store.conn();
    let sentinel = repo::continent_id_by_name(conn, "无").unwrap().unwrap();
    assert_eq!(sentinel, 1);
    assert_eq!(scratch.counts()["continents"], 1);
}

#[test]
fn test_character_defaults_and_trimming() {
    let mut scratch = scratch(&[]);
    let report = scratch.seed(&[SeedStep::Characters]);
    let step = report.step(SeedStep::Characters).unwrap();
    assert_eq!(step.inserted, 5);
    // the blank name
    assert_eq!(step.skipped, 1);

    let query = scratch.store.query();
    let names: Vec<String> = query.all_characters().unwrap().into_iter().map(|c| c.name).collect();
    assert!(names.contains(&"沙僧".to_string()));

    let (race, organization): (String, String) = scratch
        .store
        .conn()
        .query_row(
            "SELECT race, organization FROM characters WHERE name = '沙僧'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(race, "仙");
    assert_eq!(organization, "无组织");
}

#[test]
fn test_character_reconciliation_removes_stale_and_keeps_existing() {
    let mut scratch = scratch(&[]);
    for (name, intro) in [("牛魔王", "平天大圣"), ("唐僧", "手工修改过的介绍")] {
        repo::insert_character(
            scratch.store.conn(),
            &NewCharacter {
                name: name.to_string(),
                image: None,
                race: Race::Demon,
                ability: String::new(),
                intro: intro.to_string(),
                organization: "无组织".to_string(),
            },
        )
        .unwrap();
    }

    let report = scratch.seed(&[SeedStep::Characters]);
    let step = report.step(SeedStep::Characters).unwrap();
    assert_eq!(step.deleted, 1);
    assert_eq!(step.inserted, 4);

    let mut names = scratch.store.query().character_names().unwrap();
    names.sort();
    let mut expected = vec!["唐僧", "孙悟空", "猪八戒", "沙僧", "敖广"];
    expected.sort();
    assert_eq!(names, expected);

    let tang = repo::character_id_by_name(scratch.store.conn(), "唐僧").unwrap().unwrap();
    let detail = scratch.store.query().character_detail(tang).unwrap();
    assert_eq!(detail.intro, "手工修改过的介绍");
}

#[test]
fn test_malformed_character_record_keeps_stored_character() {
    let mut scratch = scratch(&[]);
    repo::insert_character(
        scratch.store.conn(),
        &NewCharacter {
            name: "唐僧".to_string(),
            image: None,
            race: Race::Human,
            ability: String::new(),
            intro: "取经人".to_string(),
            organization: "取经团队".to_string(),
        },
    )
    .unwrap();
    write_json(
        scratch.fixtures.root(),
        CHARACTER_FILE,
        &json!([
            {"name": "唐僧", "superiors": []},
            {"name": "孙悟空", "ability": 72}
        ]),
    );

    let report = scratch.seed(&[SeedStep::Characters]);
    let step = report.step(SeedStep::Characters).unwrap();
    assert_eq!(step.deleted, 0);
    assert_eq!(step.failed, 2);
    assert_eq!(step.inserted, 0);
    assert_eq!(scratch.store.query().character_names().unwrap(), vec!["唐僧"]);
}

#[test]
fn test_weapons_need_a_known_owner() {
    let mut scratch = scratch(&[]);
    let report = scratch.seed(&[SeedStep::Characters, SeedStep::Weapons]);
    let step = report.step(SeedStep::Weapons).unwrap();
    assert_eq!(step.inserted, 2);
    assert_eq!(step.skipped, 2);

    let weapons = scratch.store.query().all_weapons().unwrap();
    assert!(weapons.iter().all(|w| w.owner.is_some()));
    assert_eq!(weapons[0].name, "如意金箍棒");
    assert_eq!(weapons[0].owner.as_deref(), Some("孙悟空"));
}

#[test]
fn test_relationships_follow_superiors_and_subordinates() {
    let mut scratch = scratch(&[]);
    scratch.seed_all();

    let tang = repo::character_id_by_name(scratch.store.conn(), "唐僧").unwrap().unwrap();
    let detail = scratch.store.query().character_detail(tang).unwrap();
    let disciples: Vec<&str> = detail
        .relationships
        .iter()
        .map(|r| r.related_character.name.as_str())
        .collect();
    assert_eq!(detail.relationships.len(), 2);
    assert!(disciples.contains(&"孙悟空"));
    assert!(disciples.contains(&"猪八戒"));
    assert!(detail.relationships.iter().all(|r| r.kind == "师徒"));
}

#[test]
fn test_second_run_is_stable() {
    let mut scratch = scratch(&[]);
    scratch.seed_all();
    let first = scratch.counts();

    let report = scratch.seed_all();
    let second = scratch.counts();

    assert_eq!(
        first["character_relationships"],
        second["character_relationships"]
    );
    assert_eq!(first["characters"], second["characters"]);
    assert_eq!(first["weapons"], second["weapons"]);
    assert_eq!(first["chapter_locations"], second["chapter_locations"]);
    assert_eq!(first["continents"], second["continents"]);

    // the continent reset cleared these; the location step points them back
    let conn = scratch.store.conn();
    let huaguo = repo::location_id_by_name(conn, "花果山").unwrap().unwrap();
    assert_eq!(repo::location_continent_id(conn, huaguo).unwrap(), Some(1));
    let changan = repo::location_id_by_name(conn, "长安").unwrap().unwrap();
    assert_eq!(repo::location_continent_id(conn, changan).unwrap(), Some(3));
    let tiangong = repo::location_id_by_name(conn, "天宫").unwrap().unwrap();
    assert_eq!(repo::location_continent_id(conn, tiangong).unwrap(), Some(5));

    // chapters are plain inserts and collide on the second run
    let chapters = report.step(SeedStep::Chapters).unwrap();
    assert_eq!(chapters.inserted, 0);
    assert_eq!(chapters.failed, 2);
    assert!(chapters.is_ok());

    let links = report.step(SeedStep::ChapterLocations).unwrap();
    assert_eq!(links.inserted, 0);
    assert_eq!(links.skipped, 3);
}

#[test]
fn test_missing_file_does_not_stop_later_steps() {
    let mut scratch = scratch(&[WEAPON_FILE]);
    let report = scratch.seed_all();

    assert_eq!(report.aborted_steps(), vec![SeedStep::Weapons]);
    let weapons = report.step(SeedStep::Weapons).unwrap();
    assert!(weapons.error.as_deref().unwrap().contains("not found"));

    let relationships = report.step(SeedStep::Relationships).unwrap();
    assert!(relationships.is_ok());
    assert_eq!(relationships.inserted, 3);
}

#[test]
fn test_malformed_file_aborts_only_its_steps() {
    let mut scratch = scratch(&[]);
    fs::write(scratch.fixture_path(CHAPTER_FILE), "[{\"chapter\": 1,").unwrap();

    let report = scratch.seed_all();
    assert_eq!(
        report.aborted_steps(),
        vec![SeedStep::Chapters, SeedStep::ChapterLocations]
    );
    assert_eq!(scratch.counts()["characters"], 5);
}

#[test]
fn test_bad_records_are_counted_not_fatal() {
    let mut scratch = scratch(&[]);
    write_json(
        scratch.fixtures.root(),
        CHAPTER_FILE,
        &json!([
            {"chapter": "one", "title": "x", "summary": "y"},
            {"chapter": 3, "title": "猴王初问世", "summary": "z"}
        ]),
    );

    let report = scratch.seed(&[SeedStep::Chapters]);
    let step = report.step(SeedStep::Chapters).unwrap();
    assert_eq!(step.inserted, 1);
    assert_eq!(step.failed, 1);
}

#[test]
fn test_calamity_reset_keeps_rows_when_file_is_not_an_array() {
    let mut scratch = scratch(&[]);
    scratch.seed(&[SeedStep::Calamities]);
    write_json(
        scratch.fixtures.root(),
        CALAMITY_FILE,
        &json!({"title": "not a list"}),
    );

    let report = scratch.seed(&[SeedStep::Calamities]);
    assert_eq!(report.aborted_steps(), vec![SeedStep::Calamities]);
    assert_eq!(scratch.counts()["calamities"], 3);

    let calamities = scratch.store.query().all_calamities().unwrap();
    assert_eq!(calamities[0].id, 1);
    assert_eq!(calamities[0].title, "金蝉遭贬第一难");
}

#[test]
fn test_listing_dedups_mutual_edges() {
    let mut scratch = scratch(&[]);
    scratch.seed_all();

    // 猪八戒 -> 孙悟空 mirrors the stored 孙悟空 -> 猪八戒 edge
    link_characters(scratch.store.conn(), "猪八戒", "孙悟空", "敌对").unwrap();
    let all = scratch.store.query().all_relationships().unwrap();
    assert_eq!(all.len(), 4);

    let listed = dedup_symmetric(all.clone());
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|r| r.relationship_type.name != "敌对"));
}
