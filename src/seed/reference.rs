//! Full-reset steps: continents, the relationship vocabulary and calamities.
//! Each deletes every existing row and recreates the list from scratch.

use super::{RecordOutcome, SeedStep, StepReport};
use crate::error::Result;
use crate::fixtures::{parse_record, CalamityRecord, FixtureDir, CALAMITY_FILE};
use crate::model::SENTINEL_CONTINENT;
use crate::schema::tables::{CALAMITIES, CONTINENTS, RELATIONSHIP_TYPES};
use crate::store::{repo, Store};
use crate::ui::Ui;

/// The four continents plus the sentinel, in id order starting at 1
pub const FIXED_CONTINENTS: &[(&str, &str)] = &[
    ("东胜神洲", "灵秀之区，多产异宝奇珍，然无大智若愚之士。"),
    ("西牛贺洲", "不贪不杀，养气潜灵，佛国多妖，取经终点灵山所在。"),
    ("南赡部洲", "善人所居，多有布施斋僧，然无大勇大猛之夫。"),
    ("北俱芦洲", "仙人所宅，多有修真之客，然无大福大贵之神。"),
    (SENTINEL_CONTINENT, ""),
];

pub const RELATIONSHIP_VOCABULARY: &[(&str, &str)] = &[
    ("师徒", "师傅与徒弟之间的导师关系，强调传承与指导。"),
    ("师兄弟", "同辈之间的从师关系，象征团结与互助。"),
    ("夫妻", "婚姻关系，伴侣之间互相扶持、共同生活。"),
    ("父子", "父亲与儿子之间的亲子关系，体现血脉传承与教育。"),
    ("朋友", "非血缘的亲密友人关系，基于信任与共同兴趣。"),
    ("主仆", "主人与坐骑（宠物或交通工具）之间的主仆关系。"),
    ("君臣", "组织或团队中的层级关系，上级指导下级，下级服从上级。"),
    ("拜把子", "通过结拜仪式结成的义兄弟关系，强调忠诚与生死相依。"),
    ("敌对", "反目成仇"),
];

/// Replace all continents with [`FIXED_CONTINENTS`]. Locations that pointed
/// at a deleted continent lose their continent.
pub fn reset_continents(store: &mut Store, ui: &mut impl Ui) -> Result<StepReport> {
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::Continents);
    report.deleted = repo::clear_table(conn, &CONTINENTS)? as u64;

    let total = FIXED_CONTINENTS.len() as u64;
    for (index, (name, description)) in FIXED_CONTINENTS.iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::Continents.label());
        let outcome = repo::insert_continent(conn, index as i64 + 1, name, description)
            .map(|_| RecordOutcome::Inserted);
        report.record(name, outcome, ui);
    }

    Ok(report)
}

/// Replace the relationship vocabulary. Existing edges cascade away with
/// their types; the relationships step rebuilds them.
pub fn reset_relationship_types(store: &mut Store, ui: &mut impl Ui) -> Result<StepReport> {
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::RelationshipTypes);
    report.deleted = repo::clear_table(conn, &RELATIONSHIP_TYPES)? as u64;

    let total = RELATIONSHIP_VOCABULARY.len() as u64;
    for (index, (kind, description)) in RELATIONSHIP_VOCABULARY.iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::RelationshipTypes.label());
        let outcome = repo::insert_relationship_type(conn, kind, description)
            .map(|_| RecordOutcome::Inserted);
        report.record(kind, outcome, ui);
    }

    Ok(report)
}

/// Replace all calamities from `calamity.json`, numbering them from 1 in
/// file order. The file is read before anything is deleted.
pub fn reset_calamities(
    store: &mut Store,
    fixtures: &FixtureDir,
    ui: &mut impl Ui,
) -> Result<StepReport> {
    let items = fixtures.read_array(CALAMITY_FILE)?;
    let conn = store.conn();
    let mut report = StepReport::new(SeedStep::Calamities);
    report.deleted = repo::clear_table(conn, &CALAMITIES)? as u64;

    let total = items.len() as u64;
    for (index, item) in items.into_iter().enumerate() {
        ui.set_progress(index as u64 + 1, total, SeedStep::Calamities.label());
        let record: CalamityRecord = match parse_record(item) {
            Ok(record) => record,
            Err(err) => {
                report.malformed(index, &err, ui);
                continue;
            }
        };

        let id = index as i64 + 1;
        let outcome = repo::insert_calamity(conn, id, &record.title, &record.summary)
            .map(|_| RecordOutcome::Inserted);
        report.record(&record.title, outcome, ui);
    }

    Ok(report)
}
