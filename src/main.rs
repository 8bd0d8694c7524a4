use anyhow::{Context, Result};
use jtw_codex::{
    cli::{Cli, Commands, CreateTarget, DeleteTarget, ReadTarget, UpdateTarget},
    config::Settings,
    dedup::dedup_symmetric,
    export::export_weapons,
    filter::resolve_steps,
    fixtures::FixtureDir,
    forms::{self, CharacterSubmission, FormOutcome, WeaponSubmission},
    media::{ImageUpload, MediaStore},
    model::formatted_id,
    query::Direction,
    schema::{get_table, DependencyResolver},
    seed::{SeedStep, Seeder},
    store::Store,
    ConsoleUi, SeedScreen,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn open_store(settings: &Settings) -> Result<Store> {
    Store::open(&settings.database)
        .with_context(|| format!("Failed to open database {:?}", settings.database))
}

fn load_image(path: Option<PathBuf>) -> Result<Option<ImageUpload>> {
    path.map(|p| ImageUpload::from_path(&p).with_context(|| format!("Failed to read image {:?}", p)))
        .transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_outcome(outcome: &FormOutcome) -> ExitCode {
    println!("{}", outcome);
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn seed(settings: &Settings, steps: Vec<SeedStep>, tui: bool) -> Result<()> {
    let start = Instant::now();
    let mut store = open_store(settings)?;
    let fixtures = FixtureDir::new(&settings.fixtures_dir);
    let mut seeder = Seeder::new(&mut store, fixtures);

    let report = if tui {
        let mut ui = SeedScreen::new(&steps).context("Failed to start terminal UI")?;
        let report = seeder.run(&steps, &mut ui);
        ui.finish(&report)?;
        report
    } else {
        seeder.run(&steps, &mut ConsoleUi::new())
    };

    println!();
    for step in &report.steps {
        println!("  {}", step.summary());
    }
    println!(
        "\nSeeded {:?} ({}) in {:.1}s",
        settings.database,
        report.summary(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn read(store: &Store, target: ReadTarget, json: bool) -> Result<()> {
    let query = store.query();

    match target {
        ReadTarget::Calamities => {
            let calamities = query.all_calamities()?;
            if json {
                return print_json(&calamities);
            }
            for c in calamities {
                println!("{:>2}. {}", c.id, c.title);
                println!("    {}", c.summary);
            }
        }
        ReadTarget::Characters => {
            let characters = query.all_characters()?;
            if json {
                return print_json(&characters);
            }
            for c in characters {
                println!("{}  {}", formatted_id(c.id), c.name);
            }
        }
        ReadTarget::Chapters => {
            let chapters = query.all_chapters()?;
            if json {
                return print_json(&chapters);
            }
            for c in chapters {
                println!("第{}回  {}", c.chapter_number, c.title);
            }
        }
        ReadTarget::Relationships { all } => {
            let mut edges = query.all_relationships()?;
            if !all {
                edges = dedup_symmetric(edges);
            }
            if json {
                return print_json(&edges);
            }
            for e in edges {
                println!(
                    "{}  {} -> {}  [{}]",
                    formatted_id(e.id),
                    e.from_character.name,
                    e.to_character.name,
                    e.relationship_type.name
                );
            }
        }
        ReadTarget::Weapons => {
            let weapons = query.all_weapons()?;
            if json {
                return print_json(&weapons);
            }
            for w in weapons {
                println!("{}  ({})", w.name, w.owner.as_deref().unwrap_or("-"));
            }
        }
        ReadTarget::Character { id } => {
            let detail = query.character_detail(id)?;
            if json {
                return print_json(&detail);
            }
            println!("{}  {}", formatted_id(detail.id), detail.name);
            if let Some(image) = &detail.image {
                println!("image:   {}", image);
            }
            println!("ability: {}", detail.ability);
            println!("intro:   {}", detail.intro);
            for r in &detail.relationships {
                let arrow = match r.direction {
                    Direction::From => "->",
                    Direction::To => "<-",
                };
                println!("  {} {} [{}]", arrow, r.related_character.name, r.kind);
            }
        }
        ReadTarget::Chapter { number } => {
            let detail = query.chapter_detail(number)?;
            if json {
                return print_json(&detail);
            }
            println!("第{}回  {}", detail.chapter_number, detail.title);
            println!("{}", detail.summary);
            if !detail.locations.is_empty() {
                println!("locations: {}", detail.locations.join("、"));
            }
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::resolve(cli.database, cli.fixtures, cli.media)?;
    let media = MediaStore::new(&settings.media_root);

    match cli.command {
        Commands::Init { reset } => {
            let store = open_store(&settings)?;
            if reset {
                store.reset().context("Failed to reset schema")?;
            }
            println!("Database ready at {:?}", settings.database);
        }

        Commands::Seed { only, skip, tui } => {
            let steps = resolve_steps(only, skip)?;
            seed(&settings, steps, tui)?;
        }

        Commands::Tables => {
            let store = open_store(&settings)?;
            let resolver = DependencyResolver::new();
            println!("Tables:\n");
            for (name, count) in store.table_counts()? {
                let source = get_table(name)
                    .and_then(|t| t.source_file)
                    .unwrap_or("(built-in)");
                let dependents = resolver.dependents_of(name);
                if dependents.is_empty() {
                    println!("  {:<26} {:>6}  {}", name, count, source);
                } else {
                    println!(
                        "  {:<26} {:>6}  {}  <- {}",
                        name,
                        count,
                        source,
                        dependents.join(", ")
                    );
                }
            }
        }

        Commands::Steps => {
            println!("Seed steps:\n");
            for step in SeedStep::ALL {
                let source = step.source_file().unwrap_or("(built-in)");
                let mode = if step.is_reset() { "reset" } else { "merge" };
                println!("  {:<20} {:<6} {}", step.name(), mode, source);
            }
        }

        Commands::Read { json, target } => {
            let store = open_store(&settings)?;
            read(&store, target, json)?;
        }

        Commands::Create { target } => {
            let mut store = open_store(&settings)?;
            let outcome = match target {
                CreateTarget::Character(args) => {
                    let form = CharacterSubmission {
                        name: args.name,
                        race: args.race,
                        ability: args.ability,
                        intro: args.intro,
                        organization: args.organization,
                        image: load_image(args.image)?,
                    };
                    forms::create_character(&mut store, &media, &form)
                }
                CreateTarget::Weapon(args) => {
                    let form = WeaponSubmission {
                        name: args.name,
                        owner: args.owner,
                        description: args.description,
                        image: load_image(args.image)?,
                    };
                    forms::create_weapon(&mut store, &media, &form)
                }
            };
            return Ok(report_outcome(&outcome));
        }

        Commands::Update { target } => {
            let mut store = open_store(&settings)?;
            let outcome = match target {
                UpdateTarget::Image { name, image } => {
                    let image = load_image(image)?;
                    forms::update_character_image(&mut store, &media, &name, image.as_ref())
                }
                UpdateTarget::Intro { name, intro } => {
                    forms::update_character_intro(&mut store, &name, &intro)
                }
            };
            return Ok(report_outcome(&outcome));
        }

        Commands::Delete { target } => {
            let mut store = open_store(&settings)?;
            let outcome = match target {
                DeleteTarget::Character { name } => forms::delete_character(&mut store, &name),
                DeleteTarget::Weapon { name } => forms::delete_weapon(&mut store, &name),
            };
            return Ok(report_outcome(&outcome));
        }

        Commands::ExportWeapons { path } => {
            let store = open_store(&settings)?;
            let count = export_weapons(&store, &path)
                .with_context(|| format!("Failed to export weapons to {:?}", path))?;
            println!("Exported {} weapons to {:?}", count, path);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    // The full-screen UI owns the terminal; log lines would corrupt it
    let tui = matches!(cli.command, Commands::Seed { tui: true, .. });
    if !tui {
        init_tracing();
    }

    run(cli)
}
