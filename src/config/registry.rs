use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::paths::ensure_config_dir;
use super::profile::{HostProfile, HostRecord};
use crate::error::{AppError, Result};

pub const HOSTS_FILE_NAME: &str = "ssh_hosts.json";

/// Durable alias → profile mapping backed by `ssh_hosts.json`.
///
/// Every mutation writes the whole mapping to a temporary file and renames
/// it over the backing file before the in-memory state changes, so memory
/// always mirrors the last successful write.
#[derive(Debug)]
pub struct HostRegistry {
    config_dir: PathBuf,
    hosts_file: PathBuf,
    hosts: Vec<HostProfile>,
}

impl HostRegistry {
    /// Open the registry in `config_dir`, creating the directory and an
    /// empty backing file when they don't exist yet.
    pub fn open<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();
        ensure_config_dir(&config_dir)?;

        let mut registry = Self {
            hosts_file: config_dir.join(HOSTS_FILE_NAME),
            config_dir,
            hosts: Vec::new(),
        };
        registry.load()?;
        Ok(registry)
    }

    pub fn hosts_file(&self) -> &Path {
        &self.hosts_file
    }

    /// Re-read the backing file. On error the current state is kept.
    pub fn load(&mut self) -> Result<()> {
        if !self.hosts_file.exists() {
            info!(
                "Hosts file {} not found, creating an empty one",
                self.hosts_file.display()
            );
            self.persist(&[])?;
            self.hosts.clear();
            return Ok(());
        }

        let content = fs::read_to_string(&self.hosts_file).map_err(|e| {
            AppError::PersistenceError(format!(
                "Failed to read {}: {}",
                self.hosts_file.display(),
                e
            ))
        })?;

        self.hosts = decode_hosts(&content)?;
        debug!(
            "Loaded {} hosts from {}",
            self.hosts.len(),
            self.hosts_file.display()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.position(alias).is_some()
    }

    /// Add a new host and persist it
    pub fn add_host(&mut self, profile: HostProfile) -> Result<()> {
        profile.validate()?;

        if self.contains(&profile.alias) {
            return Err(AppError::DuplicateAlias(profile.alias));
        }

        let alias = profile.alias.clone();
        let mut next = self.hosts.clone();
        next.push(profile);
        self.commit(next)?;
        info!("Added host '{}'", alias);
        Ok(())
    }

    /// Replace the record stored under `alias`. The new profile may carry a
    /// different alias, which renames the entry in a single write.
    pub fn update_host(&mut self, alias: &str, profile: HostProfile) -> Result<()> {
        let index = self
            .position(alias)
            .ok_or_else(|| AppError::NotFound(alias.to_string()))?;
        profile.validate()?;

        if profile.alias != alias && self.contains(&profile.alias) {
            return Err(AppError::DuplicateAlias(profile.alias));
        }

        let new_alias = profile.alias.clone();
        let mut next = self.hosts.clone();
        next[index] = profile;
        self.commit(next)?;
        if new_alias == alias {
            info!("Updated host '{}'", alias);
        } else {
            info!("Renamed host '{}' to '{}'", alias, new_alias);
        }
        Ok(())
    }

    /// Remove a host by alias
    pub fn delete_host(&mut self, alias: &str) -> Result<()> {
        let index = self
            .position(alias)
            .ok_or_else(|| AppError::NotFound(alias.to_string()))?;

        let mut next = self.hosts.clone();
        next.remove(index);
        self.commit(next)?;
        info!("Deleted host '{}'", alias);
        Ok(())
    }

    pub fn get_host(&self, alias: &str) -> Result<HostProfile> {
        self.hosts
            .iter()
            .find(|h| h.alias == alias)
            .cloned()
            .ok_or_else(|| AppError::NotFound(alias.to_string()))
    }

    /// All hosts, in insertion order for this session.
    pub fn list_hosts(&self) -> &[HostProfile] {
        &self.hosts
    }

    /// Hosts whose group equals `group` exactly.
    pub fn list_by_group(&self, group: &str) -> Vec<&HostProfile> {
        self.hosts
            .iter()
            .filter(|h| h.group.as_deref() == Some(group))
            .collect()
    }

    /// Distinct non-empty groups, sorted.
    pub fn list_groups(&self) -> Vec<String> {
        self.hosts
            .iter()
            .filter_map(|h| h.group.as_deref())
            .filter(|g| !g.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn position(&self, alias: &str) -> Option<usize> {
        self.hosts.iter().position(|h| h.alias == alias)
    }

    fn commit(&mut self, next: Vec<HostProfile>) -> Result<()> {
        self.persist(&next)?;
        self.hosts = next;
        Ok(())
    }

    /// Write the whole mapping atomically: temp file in the same directory,
    /// fsync, then rename over the backing file.
    fn persist(&self, hosts: &[HostProfile]) -> Result<()> {
        let records: BTreeMap<&str, HostRecord> = hosts
            .iter()
            .map(|h| (h.alias.as_str(), HostRecord::from(h)))
            .collect();

        let mut json = serde_json::to_string_pretty(&records)
            .map_err(|e| AppError::PersistenceError(format!("Failed to serialize hosts: {}", e)))?;
        json.push('\n');

        let write_err = |e: std::io::Error| {
            warn!("Failed to write {}: {}", self.hosts_file.display(), e);
            AppError::PersistenceError(format!(
                "Failed to write {}: {}",
                self.hosts_file.display(),
                e
            ))
        };

        let mut tmp = NamedTempFile::new_in(&self.config_dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.hosts_file)
            .map_err(|e| write_err(e.error))?;

        debug!("Persisted {} hosts", hosts.len());
        Ok(())
    }
}

fn decode_hosts(content: &str) -> Result<Vec<HostProfile>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)
        .map_err(|e| AppError::PersistenceError(format!("Failed to parse hosts file: {}", e)))?;

    raw.into_iter()
        .map(|(alias, value)| {
            serde_json::from_value::<HostRecord>(value)
                .map_err(|e| e.to_string())
                .and_then(|record| record.into_profile(&alias))
                .map_err(|e| {
                    AppError::PersistenceError(format!("Malformed host '{}': {}", alias, e))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> HostProfile {
        HostProfile::new("test", "example.com", "testuser")
            .with_description("Test host")
            .with_group("test-group")
    }

    fn registry() -> (tempfile::TempDir, HostRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = HostRegistry::open(dir.path()).unwrap();
        (dir, registry)
    }

    #[test]
    fn test_open_creates_empty_file() {
        let (dir, registry) = registry();
        assert!(registry.is_empty());
        let content = fs::read_to_string(dir.path().join(HOSTS_FILE_NAME)).unwrap();
        assert_eq!(content.trim(), "{}");
    }

    #[test]
    fn test_add_host() {
        let (_dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();

        let host = registry.get_host("test").unwrap();
        assert_eq!(host, sample());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_rejects_empty_alias() {
        let (_dir, mut registry) = registry();
        let mut profile = sample();
        profile.alias = String::new();
        assert!(matches!(
            registry.add_host(profile),
            Err(AppError::ValidationError(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_alias() {
        let (_dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();

        let other = HostProfile::new("test", "other.example.com", "root");
        assert!(matches!(
            registry.add_host(other),
            Err(AppError::DuplicateAlias(alias)) if alias == "test"
        ));
        assert_eq!(registry.get_host("test").unwrap().host, "example.com");
    }

    #[test]
    fn test_update_host() {
        let (_dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();

        let updated = HostProfile::new("test", "updated.com", "updateduser")
            .with_port(2222)
            .with_description("Updated host")
            .with_group("updated-group");
        registry.update_host("test", updated.clone()).unwrap();

        assert_eq!(registry.get_host("test").unwrap(), updated);
    }

    #[test]
    fn test_update_renames() {
        let (_dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();

        let mut renamed = sample();
        renamed.alias = "renamed".to_string();
        registry.update_host("test", renamed).unwrap();

        assert!(matches!(
            registry.get_host("test"),
            Err(AppError::NotFound(_))
        ));
        assert!(registry.get_host("renamed").is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_update_rename_onto_existing_alias_fails() {
        let (_dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();
        registry
            .add_host(HostProfile::new("other", "other.com", "root"))
            .unwrap();

        let mut clash = sample();
        clash.alias = "other".to_string();
        assert!(matches!(
            registry.update_host("test", clash),
            Err(AppError::DuplicateAlias(_))
        ));
        assert_eq!(registry.get_host("other").unwrap().host, "other.com");
        assert_eq!(registry.get_host("test").unwrap(), sample());
    }

    #[test]
    fn test_update_missing_host() {
        let (_dir, mut registry) = registry();
        assert!(matches!(
            registry.update_host("nope", sample()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_host() {
        let (_dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();
        registry.delete_host("test").unwrap();

        assert!(matches!(
            registry.get_host("test"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            registry.delete_host("test"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_groups() {
        let (_dir, mut registry) = registry();
        registry
            .add_host(HostProfile::new("a", "a.com", "u").with_group("prod"))
            .unwrap();
        registry
            .add_host(HostProfile::new("b", "b.com", "u").with_group("dev"))
            .unwrap();
        registry
            .add_host(HostProfile::new("c", "c.com", "u").with_group("prod"))
            .unwrap();
        registry.add_host(HostProfile::new("d", "d.com", "u")).unwrap();

        assert_eq!(registry.list_groups(), vec!["dev", "prod"]);

        let prod: Vec<&str> = registry
            .list_by_group("prod")
            .iter()
            .map(|h| h.alias.as_str())
            .collect();
        assert_eq!(prod, vec!["a", "c"]);
        assert!(registry.list_by_group("Prod").is_empty());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let (_dir, mut registry) = registry();
        for alias in ["zeta", "alpha", "mid"] {
            registry
                .add_host(HostProfile::new(alias, "example.com", "u"))
                .unwrap();
        }
        let aliases: Vec<&str> = registry
            .list_hosts()
            .iter()
            .map(|h| h.alias.as_str())
            .collect();
        assert_eq!(aliases, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_reload_round_trip() {
        let (dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();
        registry
            .add_host(
                HostProfile::new("db1", "10.0.0.5", "admin")
                    .with_port(2222)
                    .with_group("prod"),
            )
            .unwrap();

        let reloaded = HostRegistry::open(dir.path()).unwrap();
        let mut before = registry.list_hosts().to_vec();
        let mut after = reloaded.list_hosts().to_vec();
        before.sort_by(|a, b| a.alias.cmp(&b.alias));
        after.sort_by(|a, b| a.alias.cmp(&b.alias));
        assert_eq!(before, after);
    }

    #[test]
    fn test_file_format() {
        let (dir, mut registry) = registry();
        registry
            .add_host(HostProfile::new("db1", "10.0.0.5", "admin").with_port(2222))
            .unwrap();

        let content = fs::read_to_string(dir.path().join(HOSTS_FILE_NAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "db1": {
                    "host": "10.0.0.5",
                    "user": "admin",
                    "port": 2222,
                    "alias": "db1",
                    "description": null,
                    "group": null,
                    "key_path": null
                }
            })
        );
    }

    #[test]
    fn test_load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(HOSTS_FILE_NAME),
            r#"{
  "web": {"host": "web.example.com", "user": "deploy", "port": 22,
          "alias": "web", "description": null, "group": "prod", "key_path": null},
  "db": {"host": "db.example.com", "user": "admin"}
}"#,
        )
        .unwrap();

        let registry = HostRegistry::open(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_host("db").unwrap().port, 22);
        assert_eq!(registry.list_groups(), vec!["prod"]);
    }

    #[test]
    fn test_load_rejects_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(HOSTS_FILE_NAME),
            r#"{"broken": {"user": "admin"}}"#,
        )
        .unwrap();

        let err = HostRegistry::open(dir.path()).unwrap_err();
        match err {
            AppError::PersistenceError(message) => assert!(message.contains("broken")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let (dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();

        fs::write(dir.path().join(HOSTS_FILE_NAME), "not json").unwrap();
        assert!(registry.load().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_persist_failure_rolls_back() {
        let (dir, mut registry) = registry();
        registry.add_host(sample()).unwrap();

        // Without the directory the temp file can't be created.
        fs::remove_dir_all(dir.path()).unwrap();

        let result = registry.add_host(HostProfile::new("new", "new.com", "u"));
        assert!(matches!(result, Err(AppError::PersistenceError(_))));
        assert!(!registry.contains("new"));

        let result = registry.delete_host("test");
        assert!(matches!(result, Err(AppError::PersistenceError(_))));
        assert!(registry.contains("test"));
    }
}
