use rusqlite::Transaction;
use std::fs;

use super::{require, FormOutcome, Route};
use crate::error::{CodexError, Result};
use crate::media::{ImageUpload, MediaKind, MediaStore};
use crate::model::{formatted_id, NewCharacter, NewWeapon, Race, DEFAULT_ORGANIZATION};
use crate::store::{repo, Store};

#[derive(Debug, Clone, Default)]
pub struct CharacterSubmission {
    pub name: String,
    pub race: String,
    pub ability: String,
    pub intro: String,
    pub organization: String,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default)]
pub struct WeaponSubmission {
    pub name: String,
    pub owner: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

fn required_image(image: Option<&ImageUpload>) -> Result<&ImageUpload> {
    let image = image.ok_or_else(|| CodexError::validation("an image file is required"))?;
    image.validate()?;
    Ok(image)
}

/// Store the image and point the row at it, then commit. The stored file is
/// removed again when the commit fails.
pub(super) fn attach_and_commit(
    tx: Transaction<'_>,
    media: &MediaStore,
    kind: MediaKind,
    image: &ImageUpload,
    set_image: impl FnOnce(&Transaction<'_>, &str) -> Result<()>,
) -> Result<String> {
    let relative = media.save(kind, image)?;
    let committed = set_image(&tx, &relative).and_then(|()| tx.commit().map_err(CodexError::from));
    if let Err(err) = committed {
        fs::remove_file(media.absolute(&relative)).ok();
        return Err(err);
    }
    Ok(relative)
}

fn insert_character(
    store: &mut Store,
    media: &MediaStore,
    form: &CharacterSubmission,
) -> Result<(i64, String)> {
    let tx = store.transaction()?;

    require(&[
        ("name", form.name.as_str()),
        ("race", form.race.as_str()),
        ("ability", form.ability.as_str()),
        ("intro", form.intro.as_str()),
    ])?;
    let image = required_image(form.image.as_ref())?;
    let race: Race = form.race.parse()?;

    let organization = match form.organization.trim() {
        "" => DEFAULT_ORGANIZATION,
        org => org,
    };
    let id = repo::insert_character(
        &tx,
        &NewCharacter {
            name: form.name.trim().to_string(),
            image: None,
            race,
            ability: form.ability.trim().to_string(),
            intro: form.intro.trim().to_string(),
            organization: organization.to_string(),
        },
    )?;

    let path = attach_and_commit(tx, media, MediaKind::Characters, image, |tx, path| {
        repo::set_character_image(tx, id, path)
    })?;
    Ok((id, path))
}

/// Create a character and store its portrait. Nothing is kept when any
/// part fails.
pub fn create_character(
    store: &mut Store,
    media: &MediaStore,
    form: &CharacterSubmission,
) -> FormOutcome {
    let route = Route::CreateCharacter;
    let name = form.name.trim();

    match repo::character_exists(store.conn(), name) {
        Ok(true) => return FormOutcome::error(route, format!("character '{}' already exists", name)),
        Ok(false) => {}
        Err(err) => return FormOutcome::failed(route, &err),
    }

    match insert_character(store, media, form) {
        Ok((id, path)) => FormOutcome::success(
            route,
            format!("character '{}' created, id {} (image {})", name, formatted_id(id), path),
        ),
        Err(err) => FormOutcome::failed(route, &err),
    }
}

fn insert_weapon(
    store: &mut Store,
    media: &MediaStore,
    form: &WeaponSubmission,
) -> Result<(i64, String)> {
    let tx = store.transaction()?;

    require(&[
        ("name", form.name.as_str()),
        ("owner", form.owner.as_str()),
        ("description", form.description.as_str()),
    ])?;
    let image = required_image(form.image.as_ref())?;

    let owner = form.owner.trim();
    let owner_id = repo::character_id_by_name(&tx, owner)?
        .ok_or_else(|| CodexError::not_found("character", owner))?;

    let id = repo::insert_weapon(
        &tx,
        &NewWeapon {
            name: form.name.trim().to_string(),
            image: None,
            description: form.description.trim().to_string(),
            owner_character_id: Some(owner_id),
        },
    )?;

    let path = attach_and_commit(tx, media, MediaKind::Weapons, image, |tx, path| {
        repo::set_weapon_image(tx, id, path)
    })?;
    Ok((id, path))
}

/// Create a weapon owned by an existing character
pub fn create_weapon(store: &mut Store, media: &MediaStore, form: &WeaponSubmission) -> FormOutcome {
    let route = Route::CreateWeapon;
    let name = form.name.trim();
    let owner = form.owner.trim();

    match repo::weapon_exists(store.conn(), name) {
        Ok(true) => return FormOutcome::error(route, format!("weapon '{}' already exists", name)),
        Ok(false) => {}
        Err(err) => return FormOutcome::failed(route, &err),
    }
    match repo::character_exists(store.conn(), owner) {
        Ok(true) => {}
        Ok(false) => return FormOutcome::error(route, format!("owner '{}' does not exist", owner)),
        Err(err) => return FormOutcome::failed(route, &err),
    }

    match insert_weapon(store, media, form) {
        Ok((id, _)) => FormOutcome::success(
            route,
            format!("weapon '{}' created, id {}, owner {}", name, formatted_id(id), owner),
        ),
        Err(err) => FormOutcome::failed(route, &err),
    }
}
