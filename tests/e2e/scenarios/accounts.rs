use crate::harness::{Assertion, Scenario};

/// User directory of account "asd" under the default data root.
const ASD_DIR: &str = "/data/users/688787d8ff144c502c7f5cffaafe2cc588d86079f9de88304c26b0cb99ce91c6";

fn asd(file: &str) -> String {
    format!("{}/{}", ASD_DIR, file)
}

fn matches_fixture(file: &str) -> Assertion {
    Assertion::ContentMatchesFixture {
        path: asd(file),
        fixture: "asd_account".into(),
        file: file.into(),
    }
}

#[test]
fn test_seeded_account_is_readable() {
    Scenario::new("seeded_account")
        .seed_account("asd", "asd_account")
        .assert(Assertion::AccountExists { id: "asd".into() })
        .assert(matches_fixture("collection.anki2"))
        .assert(matches_fixture("data.json"))
        .assert(matches_fixture("collection.media/0"))
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_collection_survives_untouched_edit() {
    Scenario::new("collection_round_trip")
        .seed_account("asd", "asd_account")
        .refresh_root()
        .remember(&asd("collection.anki2"), "collection")
        .touch_file(&asd("collection.anki2"))
        .assert(matches_fixture("collection.anki2"))
        .assert_hash_unchanged(&asd("collection.anki2"), "collection")
        .assert_root_current()
        .assert_scratch_empty()
        .run()
        .unwrap();
}

#[test]
fn test_media_folder_edit_keeps_existing_media() {
    Scenario::new("media_folder_edit")
        .seed_account("asd", "asd_account")
        .refresh_root()
        .add_to_folder(&asd("collection.media"), &[("1", &b"second image"[..])])
        .assert(matches_fixture("collection.media/0"))
        .assert_content(&asd("collection.media/1"), b"second image")
        .assert(matches_fixture("collection.anki2"))
        .run()
        .unwrap();
}

#[test]
fn test_unknown_account_does_not_exist() {
    Scenario::new("unknown_account")
        .seed_account("asd", "asd_account")
        .assert(Assertion::AccountExists { id: "asd".into() })
        .run()
        .unwrap();

    let missing = Scenario::new("missing_account")
        .assert(Assertion::AccountExists { id: "nobody".into() })
        .run();
    assert!(!missing.success);
    assert!(missing
        .error
        .as_deref()
        .is_some_and(|e| e.contains("does not exist")));
}
