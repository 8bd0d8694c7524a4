//! Form handlers against a scratch database and media directory.

use std::fs;
use tempfile::TempDir;

use jtw_codex::forms::{
    create_character, create_weapon, delete_character, delete_weapon, update_character_image,
    update_character_intro, CharacterSubmission, Notice, Route, WeaponSubmission,
};
use jtw_codex::media::{ImageUpload, MediaStore};
use jtw_codex::seed::{link_characters, reset_relationship_types};
use jtw_codex::store::{repo, Store};
use jtw_codex::ui::SilentUi;

struct Scratch {
    store: Store,
    media: MediaStore,
    dir: TempDir,
}

fn scratch() -> Scratch {
    let dir = TempDir::new().unwrap();
    let store = Store::open(&dir.path().join("codex.db")).unwrap();
    let media = MediaStore::new(dir.path().join("media"));
    Scratch { store, media, dir }
}

fn png(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a],
    }
}

fn wukong() -> CharacterSubmission {
    CharacterSubmission {
        name: "孙悟空".to_string(),
        race: "妖".to_string(),
        ability: "七十二变".to_string(),
        intro: "齐天大圣".to_string(),
        organization: "花果山".to_string(),
        image: Some(png("wukong.png")),
    }
}

fn bajie() -> CharacterSubmission {
    CharacterSubmission {
        name: "猪八戒".to_string(),
        race: "妖".to_string(),
        ability: "三十六变".to_string(),
        intro: "天蓬元帅".to_string(),
        organization: String::new(),
        image: Some(png("bajie.png")),
    }
}

fn staff() -> WeaponSubmission {
    WeaponSubmission {
        name: "如意金箍棒".to_string(),
        owner: "孙悟空".to_string(),
        description: "重一万三千五百斤".to_string(),
        image: Some(png("staff.png")),
    }
}

#[test]
fn test_create_character_stores_row_and_image() {
    let mut s = scratch();
    let outcome = create_character(&mut s.store, &s.media, &wukong());

    assert_eq!(outcome.notice, Notice::Success, "{}", outcome);
    assert_eq!(outcome.redirect, Route::CreateCharacter);
    assert!(outcome.message.contains("000001"));

    let detail = s.store.query().character_detail(1).unwrap();
    let image = detail.image.unwrap();
    assert!(image.starts_with("characters/"));
    assert!(image.ends_with("/wukong.png"));
    assert!(s.media.absolute(&image).exists());
}

#[test]
fn test_duplicate_character_is_rejected() {
    let mut s = scratch();
    assert!(create_character(&mut s.store, &s.media, &wukong()).is_success());

    let outcome = create_character(&mut s.store, &s.media, &wukong());
    assert_eq!(outcome.notice, Notice::Error);
    assert!(outcome.message.contains("already exists"));
    assert_eq!(s.store.query().all_characters().unwrap().len(), 1);
}

#[test]
fn test_invalid_character_submissions_leave_nothing_behind() {
    let mut s = scratch();

    let blank = CharacterSubmission {
        ability: "  ".to_string(),
        ..wukong()
    };
    let no_image = CharacterSubmission {
        image: None,
        ..wukong()
    };
    let not_image = CharacterSubmission {
        image: Some(ImageUpload {
            content_type: "text/plain".to_string(),
            ..png("notes.txt")
        }),
        ..wukong()
    };
    let bad_race = CharacterSubmission {
        race: "龙".to_string(),
        ..wukong()
    };

    for form in [blank, no_image, not_image, bad_race] {
        let outcome = create_character(&mut s.store, &s.media, &form);
        assert_eq!(outcome.notice, Notice::Error);
        assert!(outcome.message.starts_with("validation failed"), "{}", outcome);
    }

    assert!(!repo::character_exists(s.store.conn(), "孙悟空").unwrap());
    assert!(!s.media.root().exists());
}

#[test]
fn test_character_row_rolls_back_when_image_cannot_be_stored() {
    let mut s = scratch();
    // a plain file where the media directory should be
    let blocked = s.dir.path().join("blocked");
    fs::write(&blocked, b"").unwrap();
    let media = MediaStore::new(&blocked);

    let outcome = create_character(&mut s.store, &media, &wukong());
    assert_eq!(outcome.notice, Notice::Error);
    assert!(!repo::character_exists(s.store.conn(), "孙悟空").unwrap());
    assert!(s.store.query().all_characters().unwrap().is_empty());
}

#[test]
fn test_organization_defaults() {
    let mut s = scratch();
    assert!(create_character(&mut s.store, &s.media, &bajie()).is_success());

    let organization: String = s
        .store
        .conn()
        .query_row(
            "SELECT organization FROM characters WHERE name = '猪八戒'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(organization, "无组织");
}

#[test]
fn test_create_weapon() {
    let mut s = scratch();

    let orphan = create_weapon(&mut s.store, &s.media, &staff());
    assert_eq!(orphan.notice, Notice::Error);
    assert!(orphan.message.contains("does not exist"));

    assert!(create_character(&mut s.store, &s.media, &wukong()).is_success());
    let outcome = create_weapon(&mut s.store, &s.media, &staff());
    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(outcome.redirect, Route::CreateWeapon);

    let again = create_weapon(&mut s.store, &s.media, &staff());
    assert!(again.message.contains("already exists"));

    let weapons = s.store.query().all_weapons().unwrap();
    assert_eq!(weapons.len(), 1);
    assert_eq!(weapons[0].owner.as_deref(), Some("孙悟空"));
}

#[test]
fn test_update_character() {
    let mut s = scratch();
    assert!(create_character(&mut s.store, &s.media, &wukong()).is_success());

    let outcome = update_character_intro(&mut s.store, "孙悟空", "斗战胜佛");
    assert!(outcome.is_success());
    assert_eq!(s.store.query().character_detail(1).unwrap().intro, "斗战胜佛");

    let missing = update_character_intro(&mut s.store, "孙悟饭", "x");
    assert!(missing.message.contains("not found"));

    let blank = update_character_intro(&mut s.store, "孙悟空", "  ");
    assert_eq!(blank.notice, Notice::Error);

    let unchanged = update_character_image(&mut s.store, &s.media, "孙悟空", None);
    assert!(unchanged.is_success());
}

#[test]
fn test_update_image_replaces_stored_file() {
    let mut s = scratch();
    assert!(create_character(&mut s.store, &s.media, &wukong()).is_success());
    let old = s.store.query().character_detail(1).unwrap().image.unwrap();

    let replaced = update_character_image(
        &mut s.store,
        &s.media,
        "孙悟空",
        Some(&png("buddha.png")),
    );
    assert!(replaced.is_success(), "{}", replaced);
    let image = s.store.query().character_detail(1).unwrap().image.unwrap();
    assert!(image.ends_with("/buddha.png"));
    assert!(s.media.absolute(&image).exists());
    assert!(!s.media.absolute(&old).exists());

    let rejected = update_character_image(
        &mut s.store,
        &s.media,
        "孙悟空",
        Some(&ImageUpload {
            content_type: "text/plain".to_string(),
            ..png("notes.txt")
        }),
    );
    assert_eq!(rejected.notice, Notice::Error);
    assert_eq!(s.store.query().character_detail(1).unwrap().image, Some(image));
}

#[test]
fn test_same_file_name_uploads_keep_separate_images() {
    let mut s = scratch();
    let tang = CharacterSubmission {
        name: "唐僧".to_string(),
        race: "人".to_string(),
        image: Some(ImageUpload {
            bytes: vec![1; 4],
            ..png("portrait.png")
        }),
        ..wukong()
    };
    let sun = CharacterSubmission {
        image: Some(ImageUpload {
            bytes: vec![2; 4],
            ..png("portrait.png")
        }),
        ..wukong()
    };
    assert!(create_character(&mut s.store, &s.media, &tang).is_success());
    assert!(create_character(&mut s.store, &s.media, &sun).is_success());

    let query = s.store.query();
    let tang_image = query.character_detail(1).unwrap().image.unwrap();
    let sun_image = query.character_detail(2).unwrap().image.unwrap();
    assert_ne!(tang_image, sun_image);
    assert_eq!(fs::read(s.media.absolute(&tang_image)).unwrap(), vec![1; 4]);
    assert_eq!(fs::read(s.media.absolute(&sun_image)).unwrap(), vec![2; 4]);
}

#[test]
fn test_delete_character_reports_cascade() {
    let mut s = scratch();
    let mut ui = SilentUi::new();
    reset_relationship_types(&mut s.store, &mut ui).unwrap();

    assert!(create_character(&mut s.store, &s.media, &wukong()).is_success());
    assert!(create_character(&mut s.store, &s.media, &bajie()).is_success());
    assert!(create_weapon(&mut s.store, &s.media, &staff()).is_success());
    link_characters(s.store.conn(), "孙悟空", "猪八戒", "师兄弟").unwrap();
    link_characters(s.store.conn(), "猪八戒", "孙悟空", "朋友").unwrap();

    let outcome = delete_character(&mut s.store, "孙悟空");
    assert!(outcome.is_success(), "{}", outcome);
    assert!(outcome.message.contains("2 relationships removed"));
    assert!(outcome.message.contains("1 weapons left without owner"));

    assert!(s.store.query().all_relationships().unwrap().is_empty());
    let weapons = s.store.query().all_weapons().unwrap();
    assert_eq!(weapons.len(), 1);
    assert_eq!(weapons[0].owner, None);

    let again = delete_character(&mut s.store, "孙悟空");
    assert_eq!(again.notice, Notice::Error);
    let blank = delete_character(&mut s.store, " ");
    assert_eq!(blank.notice, Notice::Error);
}

#[test]
fn test_delete_weapon() {
    let mut s = scratch();
    assert!(create_character(&mut s.store, &s.media, &wukong()).is_success());
    assert!(create_weapon(&mut s.store, &s.media, &staff()).is_success());

    assert!(delete_weapon(&mut s.store, "如意金箍棒").is_success());
    assert!(s.store.query().weapon_names().unwrap().is_empty());
    assert_eq!(
        delete_weapon(&mut s.store, "如意金箍棒").notice,
        Notice::Error
    );
    // the owner is untouched
    assert_eq!(s.store.query().character_names().unwrap(), vec!["孙悟空"]);
}
