use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use sshm::{
    AppError, HOSTS_FILE_NAME, HostProfile, HostRegistry, validate_hostname, validate_port,
};

fn db1() -> HostProfile {
    HostProfile::new("db1", "10.0.0.5", "admin")
        .with_port(2222)
        .with_group("prod")
}

#[test]
fn add_then_group_queries() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = HostRegistry::open(dir.path()).unwrap();

    registry.add_host(db1()).unwrap();

    let prod = registry.list_by_group("prod");
    assert_eq!(prod.len(), 1);
    assert_eq!(prod[0], &db1());
    assert_eq!(registry.list_groups(), vec!["prod".to_string()]);
    assert_eq!(registry.get_host("db1").unwrap(), db1());
}

#[test]
fn list_by_group_is_subset_of_list_hosts() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = HostRegistry::open(dir.path()).unwrap();
    registry.add_host(db1()).unwrap();
    registry
        .add_host(HostProfile::new("db2", "10.0.0.6", "admin").with_group("prod"))
        .unwrap();
    registry
        .add_host(HostProfile::new("ci", "ci.example.com", "runner").with_group("build"))
        .unwrap();
    registry
        .add_host(HostProfile::new("laptop", "192.168.1.20", "me"))
        .unwrap();

    for group in registry.list_groups() {
        let expected: Vec<&HostProfile> = registry
            .list_hosts()
            .iter()
            .filter(|h| h.group.as_deref() == Some(group.as_str()))
            .collect();
        assert_eq!(registry.list_by_group(&group), expected);
    }
    assert_eq!(
        registry.list_groups(),
        vec!["build".to_string(), "prod".to_string()]
    );
}

#[test]
fn reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = HostRegistry::open(dir.path()).unwrap();
    registry.add_host(db1()).unwrap();
    registry
        .add_host(HostProfile::new("web", "web.example.com", "deploy").with_description("frontend"))
        .unwrap();

    assert_eq!(registry.hosts_file(), dir.path().join(HOSTS_FILE_NAME));
    assert!(registry.hosts_file().is_file());

    let reopened = HostRegistry::open(dir.path()).unwrap();
    let before: BTreeSet<_> = registry
        .list_hosts()
        .iter()
        .map(|h| format!("{:?}", h))
        .collect();
    let after: BTreeSet<_> = reopened
        .list_hosts()
        .iter()
        .map(|h| format!("{:?}", h))
        .collect();
    assert_eq!(before, after);
    assert_eq!(reopened.len(), 2);
}

#[test]
fn rename_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = HostRegistry::open(dir.path()).unwrap();
    registry.add_host(db1()).unwrap();

    let mut renamed = db1();
    renamed.alias = "db-primary".to_string();
    registry.update_host("db1", renamed.clone()).unwrap();
    assert!(matches!(
        registry.get_host("db1"),
        Err(AppError::NotFound(_))
    ));
    assert_eq!(registry.get_host("db-primary").unwrap(), renamed);

    registry.delete_host("db-primary").unwrap();
    assert!(matches!(
        registry.get_host("db-primary"),
        Err(AppError::NotFound(_))
    ));
    assert!(HostRegistry::open(dir.path()).unwrap().is_empty());
}

#[test]
fn validators_boundaries() {
    assert!(validate_port("0").is_err());
    assert!(validate_port("65536").is_err());
    assert!(validate_port("abc").is_err());
    assert_eq!(validate_port("22").unwrap(), 22);
    assert_eq!(validate_port("65535").unwrap(), 65535);

    assert!(validate_hostname("256.1.1.1").is_err());
    assert!(validate_hostname("").is_err());
    assert!(validate_hostname("my-host.example.com").is_ok());
}
