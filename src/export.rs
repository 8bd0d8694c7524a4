use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::fixtures::WeaponRecord;
use crate::query::WeaponSummary;
use crate::store::Store;

impl From<WeaponSummary> for WeaponRecord {
    fn from(weapon: WeaponSummary) -> Self {
        WeaponRecord {
            name: Some(weapon.name),
            introduction: Some(weapon.introduction),
            owner: weapon.owner,
        }
    }
}

/// Write every weapon to `path` as a pretty-printed array in the
/// `weapon.json` shape, so the file can be fed back to the seeder.
/// Returns the number of weapons written.
pub fn export_weapons(store: &Store, path: &Path) -> Result<usize> {
    let records: Vec<WeaponRecord> = store
        .query()
        .all_weapons()?
        .into_iter()
        .map(WeaponRecord::from)
        .collect();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(&records).map_err(std::io::Error::from)?;
    fs::write(path, json)?;

    info!(path = %path.display(), count = records.len(), "exported weapons");
    Ok(records.len())
}
