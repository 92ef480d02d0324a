//! Loading rule files from disk and serving decisions through backends.

use std::sync::Arc;
use std::thread;

use warrant_rights::prelude::*;

fn write_rights(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("rights");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_load_preserves_authored_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rights(
        &dir,
        "[third]\nuser=c\ncollection=.*\npermissions=r\n\
         [first]\nuser=a\ncollection=.*\npermissions=r\n\
         [second]\nuser=b\ncollection=.*\npermissions=r\n",
    );

    let rules = RuleSet::load(&path).unwrap();
    let names: Vec<&str> = rules.iter().map(Rule::name).collect();
    assert_eq!(names, ["third", "first", "second"]);
    assert_eq!(rules.origin(), path.display().to_string());
}

#[test]
fn test_load_missing_file_reports_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent");
    let err = RuleSet::load(&path).unwrap_err();
    match &err {
        RightsError::Load { origin, .. } => assert_eq!(*origin, path.display().to_string()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_rule_definition());
    assert!(err.to_string().contains("absent"));
}

#[test]
fn test_load_missing_key_names_section_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rights(&dir, "[ok]\nuser=a\ncollection=b\npermissions=r\n[partial]\nuser=a\n");
    let err = RuleSet::load(&path).unwrap_err();
    assert!(err.is_rule_definition());
    let message = err.to_string();
    assert!(message.contains("partial"), "{message}");
    assert!(message.contains("collection"), "{message}");
}

#[test]
fn test_syntax_error_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rights(&dir, "[r]\nuser = a\n\nthis is not a rule\n");
    let err = RuleSet::load(&path).unwrap_err();
    assert!(matches!(err, RightsError::Syntax { line: 4, .. }));
}

#[test]
fn test_duplicate_names_are_all_evaluated() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rights(
        &dir,
        "[rule]\nuser = alice\ncollection = .*\npermissions = r\n\
         [rule]\nuser = bob\ncollection = .*\npermissions = w\n",
    );
    let backend = RulesFile::new(&path);
    let requested = Permissions::parse("rw");
    assert_eq!(
        backend.authorized(Some("alice"), "x", &requested).unwrap(),
        Permissions::parse("r")
    );
    assert_eq!(
        backend.authorized(Some("bob"), "x", &requested).unwrap(),
        Permissions::parse("w")
    );
}

#[test]
fn test_rules_file_reports_broken_edit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rights(&dir, "[r]\nuser=.*\ncollection=.*\npermissions=r\n");
    let backend = RulesFile::new(&path);
    assert!(backend.authorized(None, "x", &Permissions::parse("r")).is_ok());

    std::fs::write(&path, "[r]\nuser=.*\n").unwrap();
    let err = backend
        .authorized(None, "x", &Permissions::parse("r"))
        .unwrap_err();
    assert!(matches!(err, RightsError::MissingKey { .. }));
}

#[test]
fn test_cached_backend_is_shareable_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rights(
        &dir,
        "[owner]\nuser = (.+)\ncollection = {0}(/.*)?\npermissions = rw\n",
    );
    let backend: Arc<dyn Authorizer> = Arc::from(open_backend(&path, ReloadPolicy::OnChange));

    let handles: Vec<_> = ["ann", "ben", "cat", "dan"]
        .into_iter()
        .map(|user| {
            let backend = Arc::clone(&backend);
            thread::spawn(move || {
                let own = backend
                    .authorized(Some(user), &format!("/{user}/cal/"), &Permissions::parse("rw"))
                    .unwrap();
                let other = backend
                    .authorized(Some(user), "/someone-else/", &Permissions::parse("rw"))
                    .unwrap();
                (own, other)
            })
        })
        .collect();

    for handle in handles {
        let (own, other) = handle.join().unwrap();
        assert_eq!(own.to_string(), "rw");
        assert!(other.is_empty());
    }
}
