pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod filter;
pub mod fixtures;
pub mod forms;
pub mod media;
pub mod model;
pub mod query;
pub mod schema;
pub mod seed;
pub mod store;
pub mod ui;

pub use cli::{Cli, Commands};
pub use error::{CodexError, Result};
pub use seed::{SeedReport, SeedStep, Seeder};
pub use store::Store;
pub use ui::{ConsoleUi, Phase, SeedScreen, SilentUi, Ui};
