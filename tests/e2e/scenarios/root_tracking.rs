use crate::harness::Scenario;

#[test]
fn test_root_follows_mutations() {
    Scenario::new("root_follows_mutations")
        .assert_root_current()
        .write("/data/a", b"a")
        .assert_root_current()
        .make_dirs("/data/dir")
        .assert_root_current()
        .edit_file("/data/dir/f", b"f")
        .assert_root_current()
        .replace_folder("/data/media", &[("m", &b"m"[..])])
        .assert_root_current()
        .remove("/data/a")
        .assert_root_current()
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_deferred_batch_then_refresh() {
    Scenario::new("deferred_batch")
        .write("/data/seed", b"seed")
        .make_dirs("/data/batch")
        .assert_root_current()
        .write_deferred("/data/batch/1", b"1")
        .write_deferred("/data/batch/2", b"2")
        .assert_root_stale()
        .refresh_root()
        .assert_root_current()
        .run()
        .unwrap();
}

#[test]
fn test_reconnect_sees_persisted_root() {
    Scenario::new("reconnect")
        .write("/data/persisted", b"still here")
        .remember("/data", "root")
        .reconnect()
        .assert_root_current()
        .assert_hash_unchanged("/data", "root")
        .assert_content("/data/persisted", b"still here")
        .run()
        .unwrap();
}

#[test]
fn test_writes_outside_data_root_leave_it_alone() {
    Scenario::new("outside_data_root")
        .remember("/data", "root")
        .write("/elsewhere", b"x")
        .assert_hash_unchanged("/data", "root")
        .assert_root_current()
        .run()
        .unwrap();
}
