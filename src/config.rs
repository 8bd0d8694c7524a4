use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const DATABASE_FILE: &str = "codex.sqlite3";

/// Where the database, fixture files and uploaded media live
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub fixtures_dir: PathBuf,
    pub media_root: PathBuf,
}

impl Settings {
    /// Fill every location not given explicitly from the platform's data
    /// directory for this application
    pub fn resolve(
        database: Option<PathBuf>,
        fixtures_dir: Option<PathBuf>,
        media_root: Option<PathBuf>,
    ) -> Result<Self> {
        if let (Some(database), Some(fixtures_dir), Some(media_root)) =
            (&database, &fixtures_dir, &media_root)
        {
            return Ok(Self::new(database, fixtures_dir, media_root));
        }

        let proj_dirs = ProjectDirs::from("", "", "jtw-codex")
            .context("Could not determine data directory")?;
        Ok(Self::with_defaults(
            proj_dirs.data_dir(),
            database,
            fixtures_dir,
            media_root,
        ))
    }

    pub fn new(database: &Path, fixtures_dir: &Path, media_root: &Path) -> Self {
        Self {
            database: database.to_path_buf(),
            fixtures_dir: fixtures_dir.to_path_buf(),
            media_root: media_root.to_path_buf(),
        }
    }

    fn with_defaults(
        data_dir: &Path,
        database: Option<PathBuf>,
        fixtures_dir: Option<PathBuf>,
        media_root: Option<PathBuf>,
    ) -> Self {
        Self {
            database: database.unwrap_or_else(|| data_dir.join(DATABASE_FILE)),
            fixtures_dir: fixtures_dir.unwrap_or_else(|| data_dir.join("fixtures")),
            media_root: media_root.unwrap_or_else(|| data_dir.join("media")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_paths_win() {
        let settings = Settings::resolve(
            Some(PathBuf::from("/tmp/a.db")),
            Some(PathBuf::from("/tmp/fx")),
            Some(PathBuf::from("/tmp/media")),
        )
        .unwrap();
        assert_eq!(settings.database, PathBuf::from("/tmp/a.db"));
        assert_eq!(settings.media_root, PathBuf::from("/tmp/media"));
    }

    #[test]
    fn test_defaults_fill_gaps() {
        let settings = Settings::with_defaults(
            Path::new("/data"),
            None,
            Some(PathBuf::from("/tmp/fx")),
            None,
        );
        assert_eq!(settings.database, PathBuf::from("/data/codex.sqlite3"));
        assert_eq!(settings.fixtures_dir, PathBuf::from("/tmp/fx"));
        assert_eq!(settings.media_root, PathBuf::from("/data/media"));
    }
}
