use super::{FormOutcome, Route};
use crate::error::Result;
use crate::store::{repo, Store};

/// Returns `(relationships removed, weapons orphaned)`, or `None` when no
/// character has that name
fn remove_character(store: &mut Store, name: &str) -> Result<Option<(i64, i64)>> {
    let tx = store.transaction()?;
    let Some(id) = repo::character_id_by_name(&tx, name)? else {
        return Ok(None);
    };

    let edges = repo::count_relationships_of(&tx, id)?;
    let weapons = repo::count_weapons_owned_by(&tx, id)?;
    repo::delete_character(&tx, id)?;
    tx.commit()?;
    Ok(Some((edges, weapons)))
}

/// Delete a character by name. Its relationship edges go with it; weapons
/// it owned stay, without an owner.
pub fn delete_character(store: &mut Store, name: &str) -> FormOutcome {
    let route = Route::DeleteCharacter;
    let name = name.trim();
    if name.is_empty() {
        return FormOutcome::error(route, "select a character to delete");
    }

    match remove_character(store, name) {
        Ok(Some((edges, weapons))) => FormOutcome::success(
            route,
            format!(
                "character '{}' deleted; {} relationships removed, {} weapons left without owner",
                name, edges, weapons
            ),
        ),
        Ok(None) => FormOutcome::error(route, format!("character '{}' does not exist", name)),
        Err(err) => FormOutcome::failed(route, &err),
    }
}

pub fn delete_weapon(store: &mut Store, name: &str) -> FormOutcome {
    let route = Route::DeleteWeapon;
    let name = name.trim();
    if name.is_empty() {
        return FormOutcome::error(route, "select a weapon to delete");
    }

    let result = repo::weapon_id_by_name(store.conn(), name).and_then(|id| match id {
        Some(id) => repo::delete_weapon(store.conn(), id).map(Some),
        None => Ok(None),
    });

    match result {
        Ok(Some(_)) => FormOutcome::success(route, format!("weapon '{}' deleted", name)),
        Ok(None) => FormOutcome::error(route, format!("weapon '{}' does not exist", name)),
        Err(err) => FormOutcome::failed(route, &err),
    }
}
