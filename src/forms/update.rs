use std::fs;
use tracing::warn;

use super::create::attach_and_commit;
use super::{require, FormOutcome, Route};
use crate::error::{CodexError, Result};
use crate::media::{ImageUpload, MediaKind, MediaStore};
use crate::store::{repo, Store};

fn replace_image(
    store: &mut Store,
    media: &MediaStore,
    name: &str,
    image: Option<&ImageUpload>,
) -> Result<Option<String>> {
    let tx = store.transaction()?;
    let id = repo::character_id_by_name(&tx, name)?
        .ok_or_else(|| CodexError::not_found("character", name))?;
    let Some(image) = image else {
        return Ok(None);
    };
    image.validate()?;

    let previous = repo::character_image(&tx, id)?;
    let path = attach_and_commit(tx, media, MediaKind::Characters, image, |tx, path| {
        repo::set_character_image(tx, id, path)
    })?;

    // the row no longer points at the old file
    if let Some(old) = previous.filter(|old| *old != path) {
        if let Err(err) = fs::remove_file(media.absolute(&old)) {
            warn!(path = %old, error = %err, "could not remove replaced image");
        }
    }
    Ok(Some(path))
}

/// Replace a character's portrait. Without a new image nothing changes.
pub fn update_character_image(
    store: &mut Store,
    media: &MediaStore,
    name: &str,
    image: Option<&ImageUpload>,
) -> FormOutcome {
    let route = Route::UpdateCharacterImage;
    let name = name.trim();

    match replace_image(store, media, name, image) {
        Ok(Some(_)) => FormOutcome::success(route, format!("image of '{}' updated", name)),
        Ok(None) => FormOutcome::success(route, format!("no new image for '{}'; nothing changed", name)),
        Err(err) if err.is_not_found() => {
            FormOutcome::error(route, format!("character '{}' not found", name))
        }
        Err(err) => FormOutcome::failed(route, &err),
    }
}

pub fn update_character_intro(store: &mut Store, name: &str, intro: &str) -> FormOutcome {
    let route = Route::UpdateCharacterIntro;
    let name = name.trim();

    let result = require(&[("name", name), ("introduction", intro)]).and_then(|()| {
        let id = repo::character_id_by_name(store.conn(), name)?
            .ok_or_else(|| CodexError::not_found("character", name))?;
        repo::set_character_intro(store.conn(), id, intro.trim())
    });

    match result {
        Ok(()) => FormOutcome::success(route, format!("introduction of '{}' updated", name)),
        Err(err) if err.is_not_found() => {
            FormOutcome::error(route, format!("character '{}' not found", name))
        }
        Err(err) => FormOutcome::failed(route, &err),
    }
}
