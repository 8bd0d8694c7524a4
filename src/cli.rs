use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jtw-codex")]
#[command(version, about = "Journey to the West encyclopedia: seed, browse and edit the codex database")]
pub struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "JTW_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory containing the JSON fixture files
    #[arg(long, global = true, env = "JTW_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    /// Directory uploaded images are stored under
    #[arg(long, global = true, env = "JTW_MEDIA")]
    pub media: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database schema
    Init {
        /// Drop every table first, discarding all data
        #[arg(long)]
        reset: bool,
    },

    /// Load and reconcile the fixture files into the database
    Seed {
        /// Only run these steps (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        only: Option<Vec<String>>,

        /// Skip these steps (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        skip: Option<Vec<String>>,

        /// Show a full-screen progress display
        #[arg(long)]
        tui: bool,
    },

    /// List all tables with their row counts
    Tables,

    /// List all seed step names
    Steps,

    /// Browse the codex
    Read {
        /// Print JSON instead of text
        #[arg(long, global = true)]
        json: bool,

        #[command(subcommand)]
        target: ReadTarget,
    },

    /// Create a character or weapon
    Create {
        #[command(subcommand)]
        target: CreateTarget,
    },

    /// Update a character
    Update {
        #[command(subcommand)]
        target: UpdateTarget,
    },

    /// Delete a character or weapon by name
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },

    /// Write all weapons to a JSON file in the fixture format
    ExportWeapons {
        /// Output file
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReadTarget {
    /// The 81 calamities
    Calamities,
    /// Character ids and names
    Characters,
    /// Chapter numbers and titles
    Chapters,
    /// Relationship edges
    Relationships {
        /// Keep both directions of symmetric pairs
        #[arg(long)]
        all: bool,
    },
    /// Weapons with their owners
    Weapons,
    /// One character with its relationships
    Character { id: i64 },
    /// One chapter with its locations
    Chapter { number: i64 },
}

#[derive(Args, Debug)]
pub struct CharacterArgs {
    #[arg(long)]
    pub name: String,
    /// 人, 妖 or 仙
    #[arg(long)]
    pub race: String,
    #[arg(long)]
    pub ability: String,
    #[arg(long)]
    pub intro: String,
    #[arg(long, default_value = "")]
    pub organization: String,
    /// Portrait image file
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WeaponArgs {
    #[arg(long)]
    pub name: String,
    /// Name of the owning character
    #[arg(long)]
    pub owner: String,
    #[arg(long)]
    pub description: String,
    /// Weapon image file
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CreateTarget {
    Character(CharacterArgs),
    Weapon(WeaponArgs),
}

#[derive(Subcommand, Debug)]
pub enum UpdateTarget {
    /// Replace a character's image
    Image {
        name: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Replace a character's introduction
    Intro { name: String, intro: String },
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    Character { name: String },
    Weapon { name: String },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_filters() {
        let cli = Cli::try_parse_from([
            "jtw-codex",
            "--database",
            "/tmp/x.db",
            "seed",
            "--only",
            "continents,weapons",
        ])
        .unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
        match cli.command {
            Commands::Seed { only, skip, tui } => {
                assert_eq!(only.unwrap(), vec!["continents", "weapons"]);
                assert!(skip.is_none());
                assert!(!tui);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_read_character() {
        let cli = Cli::try_parse_from(["jtw-codex", "read", "--json", "character", "7"]).unwrap();
        match cli.command {
            Commands::Read {
                json,
                target: ReadTarget::Character { id },
            } => {
                assert!(json);
                assert_eq!(id, 7);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
