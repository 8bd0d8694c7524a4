//! Fixture loader / reconciler.
//!
//! A seed run is a list of [`SeedStep`]s executed in canonical order. Steps
//! are independent: a step whose fixture file is missing or malformed is
//! reported as failed and the run moves on. Inside a step every record is
//! handled on its own, so one bad record costs one count, not the file.

mod cast;
mod places;
mod reference;

pub use cast::{build_relationships, link_characters, reconcile_characters, seed_weapons};
pub use places::{
    create_chapters, link_chapter_locations, resolve_continent, upsert_location, upsert_locations,
};
pub use reference::{
    reset_calamities, reset_continents, reset_relationship_types, FIXED_CONTINENTS,
    RELATIONSHIP_VOCABULARY,
};

use std::fmt;
use std::str::FromStr;

use tracing::{error, info, warn};

use crate::error::{CodexError, Result};
use crate::fixtures::FixtureDir;
use crate::store::Store;
use crate::ui::{Phase, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedStep {
    Continents,
    RelationshipTypes,
    Calamities,
    Locations,
    Chapters,
    ChapterLocations,
    Characters,
    Weapons,
    Relationships,
}

impl SeedStep {
    /// Every step in the order a full seed runs them
    pub const ALL: [SeedStep; 9] = [
        SeedStep::Continents,
        SeedStep::RelationshipTypes,
        SeedStep::Calamities,
        SeedStep::Locations,
        SeedStep::Chapters,
        SeedStep::ChapterLocations,
        SeedStep::Characters,
        SeedStep::Weapons,
        SeedStep::Relationships,
    ];

    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            SeedStep::Continents => "continents",
            SeedStep::RelationshipTypes => "relationship-types",
            SeedStep::Calamities => "calamities",
            SeedStep::Locations => "locations",
            SeedStep::Chapters => "chapters",
            SeedStep::ChapterLocations => "chapter-locations",
            SeedStep::Characters => "characters",
            SeedStep::Weapons => "weapons",
            SeedStep::Relationships => "relationships",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeedStep::Continents => "continents",
            SeedStep::RelationshipTypes => "relationship types",
            SeedStep::Calamities => "calamities",
            SeedStep::Locations => "locations",
            SeedStep::Chapters => "chapters",
            SeedStep::ChapterLocations => "chapter locations",
            SeedStep::Characters => "characters",
            SeedStep::Weapons => "weapons",
            SeedStep::Relationships => "relationships",
        }
    }

    /// Fixture file read by this step; `None` for built-in lists
    pub fn source_file(self) -> Option<&'static str> {
        use crate::fixtures::*;
        match self {
            SeedStep::Continents | SeedStep::RelationshipTypes => None,
            SeedStep::Calamities => Some(CALAMITY_FILE),
            SeedStep::Locations => Some(PLACE_FILE),
            SeedStep::Chapters | SeedStep::ChapterLocations => Some(CHAPTER_FILE),
            SeedStep::Characters | SeedStep::Relationships => Some(CHARACTER_FILE),
            SeedStep::Weapons => Some(WEAPON_FILE),
        }
    }

    /// Whether the step deletes existing rows before loading
    pub fn is_reset(self) -> bool {
        matches!(
            self,
            SeedStep::Continents | SeedStep::RelationshipTypes | SeedStep::Calamities
        )
    }
}

impl fmt::Display for SeedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeedStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        SeedStep::ALL
            .into_iter()
            .find(|step| step.name() == wanted)
            .ok_or_else(|| format!("Unknown seed step: {}", s))
    }
}

/// What happened to one fixture record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Inserted,
    Skipped(String),
}

/// Counters for one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: SeedStep,
    pub inserted: u64,
    pub skipped: u64,
    pub deleted: u64,
    pub failed: u64,
    /// File-level failure that aborted the step
    pub error: Option<String>,
}

impl StepReport {
    pub fn new(step: SeedStep) -> Self {
        Self {
            step,
            inserted: 0,
            skipped: 0,
            deleted: 0,
            failed: 0,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Count one record's outcome, logging skips and failures
    pub fn record(&mut self, what: &str, outcome: Result<RecordOutcome>, ui: &mut impl Ui) {
        match outcome {
            Ok(RecordOutcome::Inserted) => self.inserted += 1,
            Ok(RecordOutcome::Skipped(reason)) => {
                warn!(step = %self.step, record = what, "skipped: {}", reason);
                ui.log(format!("skip {}: {}", what, reason));
                self.skipped += 1;
            }
            Err(err) => {
                warn!(step = %self.step, record = what, error = %err, "record failed");
                ui.log(format!("fail {}: {}", what, err));
                self.failed += 1;
            }
        }
    }

    /// Count an element of a fixture array that did not match its record type
    pub fn malformed(&mut self, index: usize, err: &serde_json::Error, ui: &mut impl Ui) {
        warn!(step = %self.step, index, error = %err, "malformed fixture record");
        ui.log(format!("fail record #{}: {}", index + 1, err));
        self.failed += 1;
    }

    pub fn summary(&self) -> String {
        match &self.error {
            Some(err) => format!("{}: aborted ({})", self.step.label(), err),
            None => format!(
                "{}: {} inserted, {} skipped, {} deleted, {} failed",
                self.step.label(),
                self.inserted,
                self.skipped,
                self.deleted,
                self.failed
            ),
        }
    }
}

/// Reports for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub steps: Vec<StepReport>,
}

impl SeedReport {
    pub fn step(&self, step: SeedStep) -> Option<&StepReport> {
        self.steps.iter().find(|r| r.step == step)
    }

    pub fn total_inserted(&self) -> u64 {
        self.steps.iter().map(|r| r.inserted).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.steps.iter().map(|r| r.failed).sum()
    }

    pub fn aborted_steps(&self) -> Vec<SeedStep> {
        self.steps
            .iter()
            .filter(|r| !r.is_ok())
            .map(|r| r.step)
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} steps, {} records inserted, {} failed, {} steps aborted",
            self.steps.len(),
            self.total_inserted(),
            self.total_failed(),
            self.aborted_steps().len()
        )
    }
}

/// Runs seed steps against a store
pub struct Seeder<'s> {
    store: &'s mut Store,
    fixtures: FixtureDir,
}

impl<'s> Seeder<'s> {
    pub fn new(store: &'s mut Store, fixtures: FixtureDir) -> Self {
        Self { store, fixtures }
    }

    /// Run `steps` in canonical order regardless of the order given
    pub fn run(&mut self, steps: &[SeedStep], ui: &mut impl Ui) -> SeedReport {
        let mut report = SeedReport::default();
        info!(fixtures = %self.fixtures.root().display(), "seeding {} steps", steps.len());

        for step in SeedStep::ALL.into_iter().filter(|s| steps.contains(s)) {
            if ui.cancelled() {
                warn!("seed cancelled before {}", step);
                break;
            }
            report.steps.push(self.run_step(step, ui));
        }

        info!("{}", report.summary());
        report
    }

    pub fn run_all(&mut self, ui: &mut impl Ui) -> SeedReport {
        self.run(&SeedStep::ALL, ui)
    }

    /// Run one step; a file-level failure is folded into the report
    pub fn run_step(&mut self, step: SeedStep, ui: &mut impl Ui) -> StepReport {
        ui.set_phase(Phase::Seeding(step));
        ui.set_info(match step.source_file() {
            Some(file) => self.fixtures.path_of(file).display().to_string(),
            None => "built-in list".to_string(),
        });

        let store = &mut *self.store;
        let fixtures = &self.fixtures;
        let result = match step {
            SeedStep::Continents => reset_continents(store, ui),
            SeedStep::RelationshipTypes => reset_relationship_types(store, ui),
            SeedStep::Calamities => reset_calamities(store, fixtures, ui),
            SeedStep::Locations => upsert_locations(store, fixtures, ui),
            SeedStep::Chapters => create_chapters(store, fixtures, ui),
            SeedStep::ChapterLocations => link_chapter_locations(store, fixtures, ui),
            SeedStep::Characters => reconcile_characters(store, fixtures, ui),
            SeedStep::Weapons => seed_weapons(store, fixtures, ui),
            SeedStep::Relationships => build_relationships(store, fixtures, ui),
        };
        ui.clear_progress();

        let report = match result {
            Ok(report) => {
                info!("{}", report.summary());
                report
            }
            Err(err) => aborted(step, &err),
        };
        ui.step_finished(&report);
        report
    }
}

fn aborted(step: SeedStep, err: &CodexError) -> StepReport {
    if err.is_fixture() {
        error!(step = %step, "fixture error: {}", err);
    } else {
        error!(step = %step, "step failed: {}", err);
    }
    StepReport {
        error: Some(err.to_string()),
        ..StepReport::new(step)
    }
}
