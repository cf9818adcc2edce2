use crate::harness::Scenario;

#[test]
fn test_file_context_on_empty_path_commits() {
    Scenario::new("file_context_commit")
        .assert_absent("/data/fresh.txt")
        .edit_file("/data/fresh.txt", b"B")
        .assert_content("/data/fresh.txt", b"B")
        .assert_root_current()
        .assert_scratch_empty()
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_file_context_with_extension() {
    Scenario::new("file_context_ext")
        .edit_file_with_ext("/data/deck.anki2", "anki2", b"db bytes")
        .assert_content("/data/deck.anki2", b"db bytes")
        .assert_scratch_empty()
        .run()
        .unwrap();
}

#[test]
fn test_file_context_error_keeps_original() {
    Scenario::new("file_context_error")
        .write("/data/c.txt", b"C")
        .remember("/data/c.txt", "c")
        .remember("/data", "root")
        .edit_file_fails("/data/c.txt", b"half-written garbage")
        .assert_content("/data/c.txt", b"C")
        .assert_hash_unchanged("/data", "root")
        .assert_scratch_empty()
        .run()
        .unwrap();
}

#[test]
fn test_dropped_context_cleans_up() {
    Scenario::new("file_context_dropped")
        .write("/data/c.txt", b"C")
        .edit_file_dropped("/data/c.txt", b"abandoned midway")
        .assert_content("/data/c.txt", b"C")
        .assert_scratch_empty()
        .run()
        .unwrap();
}

#[test]
fn test_edit_existing_file() {
    Scenario::new("file_context_edit")
        .write("/data/c.txt", b"version 1")
        .remember("/data/c.txt", "v1")
        .edit_file("/data/c.txt", b"version 2")
        .assert_content("/data/c.txt", b"version 2")
        .assert_hash_changed("/data/c.txt", "v1")
        .run()
        .unwrap();
}

#[test]
fn test_sequential_folder_contexts_last_wins() {
    Scenario::new("folder_contexts_sequential")
        .replace_folder("/data/media", &[("x.png", &b"X"[..])])
        .remember("/data/media", "x")
        .replace_folder("/data/media", &[("y.png", &b"Y"[..])])
        .remember("/data/media", "y")
        .assert_hash_changed("/data/media", "x")
        .assert_absent("/data/media/x.png")
        .assert_content("/data/media/y.png", b"Y")
        // X is no longer linked but is still retrievable by hash.
        .assert(crate::harness::Assertion::RememberedContent {
            label: "x".into(),
            child: Some("x.png".into()),
            content: b"X".to_vec(),
        })
        .link_folder("x", "/data/restored")
        .assert_content("/data/restored/x.png", b"X")
        .assert_scratch_empty()
        .run()
        .unwrap();
}

#[test]
fn test_folder_context_materializes_existing_tree() {
    Scenario::new("folder_context_materialize")
        .make_dirs("/data/tree/sub")
        .write("/data/tree/keep.txt", b"kept")
        .write("/data/tree/sub/deep.txt", b"deep")
        .add_to_folder("/data/tree", &[("new.txt", &b"new"[..])])
        .assert_content("/data/tree/keep.txt", b"kept")
        .assert_content("/data/tree/sub/deep.txt", b"deep")
        .assert_content("/data/tree/new.txt", b"new")
        .run()
        .unwrap();
}

#[test]
fn test_folder_context_error_keeps_tree() {
    Scenario::new("folder_context_error")
        .make_dirs("/data/tree")
        .write("/data/tree/a", b"a")
        .remember("/data/tree", "tree")
        .add_to_folder_fails("/data/tree", &[("b", &b"b"[..])])
        .assert_hash_unchanged("/data/tree", "tree")
        .assert_absent("/data/tree/b")
        .assert_scratch_empty()
        .run()
        .unwrap();
}
