use crate::harness::{Assertion, Scenario};
use mfstage_core::{LocalNode, MfsPath};

#[test]
fn test_custom_assertion_sees_node_state() {
    Scenario::new("custom_assertion")
        .write("/data/custom.txt", b"custom")
        .assert(Assertion::Custom(Box::new(|node: &LocalNode| -> anyhow::Result<()> {
            let path = MfsPath::parse("/data/custom.txt")?;
            let hash = node
                .stat(&path)?
                .ok_or_else(|| anyhow::anyhow!("custom.txt missing"))?;
            anyhow::ensure!(node.cat(&hash)? == b"custom", "unexpected bytes");
            Ok(())
        })))
        .run()
        .unwrap();
}

#[test]
fn test_failed_step_is_reported() {
    let result = Scenario::new("failing_step")
        .write("/data/a", b"a")
        .assert_content("/data/a", b"b")
        .run();

    assert!(!result.success);
    assert_eq!(result.failure_step, Some(1));
    assert!(result
        .error
        .as_deref()
        .is_some_and(|e| e.contains("Content mismatch")));
}

#[test]
fn test_missing_fixture_fails_seed() {
    let result = Scenario::new("missing_fixture")
        .seed_account("asd", "no_such_fixture")
        .run();

    assert!(!result.success);
    assert_eq!(result.failure_step, Some(0));
}

#[test]
fn test_file_link_restores_old_version() {
    Scenario::new("link_file")
        .write("/data/doc", b"first draft")
        .remember("/data/doc", "draft")
        .edit_file("/data/doc", b"second draft")
        .link_file("draft", "/data/doc")
        .assert_content("/data/doc", b"first draft")
        .assert_hash_unchanged("/data/doc", "draft")
        .assert_root_current()
        .run()
        .unwrap();
}
