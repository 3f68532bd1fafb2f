use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::validation::{
    expand_path, validate_hostname, validate_key_path, validate_port, validate_username,
};

pub const DEFAULT_PORT: u16 = 22;

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Connection parameters for one remote host, keyed by `alias`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HostProfile {
    pub alias: String,
    pub host: String,
    pub user: String,
    pub port: u16,
    pub group: Option<String>,
    pub description: Option<String>,
    pub key_path: Option<String>,
}

impl HostProfile {
    /// Creates a profile on the default port with no optional fields set
    pub fn new(alias: impl Into<String>, host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            host: host.into(),
            user: user.into(),
            port: DEFAULT_PORT,
            group: None,
            description: None,
            key_path: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_key_path(mut self, key_path: impl Into<String>) -> Self {
        self.key_path = Some(key_path.into());
        self
    }

    pub fn host_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `user@host`, the target understood by the ssh client.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Validates the profile parameters
    pub fn validate(&self) -> Result<()> {
        if self.alias.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Host alias is required".to_string(),
            ));
        }
        validate_hostname(&self.host)?;
        validate_username(&self.user)?;
        validate_port(&self.port.to_string())?;
        validate_key_path(self.key_path.as_deref().unwrap_or_default())?;
        Ok(())
    }
}

/// On-disk shape of one profile in `ssh_hosts.json`.
///
/// Field order and nullability follow the file format; the map key carries
/// the alias, so the inner `alias` may be absent.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct HostRecord {
    pub host: String,
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub key_path: Option<String>,
}

impl HostRecord {
    pub(crate) fn into_profile(self, key: &str) -> std::result::Result<HostProfile, String> {
        let alias = match self.alias {
            None => key.to_string(),
            Some(alias) if alias == key => alias,
            Some(alias) => {
                return Err(format!(
                    "alias field '{alias}' does not match its key '{key}'"
                ));
            }
        };
        if alias.is_empty() {
            return Err("alias cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("port must be between 1 and 65535".to_string());
        }

        Ok(HostProfile {
            alias,
            host: self.host,
            user: self.user,
            port: self.port,
            group: self.group,
            description: self.description,
            key_path: self.key_path,
        })
    }
}

impl From<&HostProfile> for HostRecord {
    fn from(profile: &HostProfile) -> Self {
        Self {
            host: profile.host.clone(),
            user: profile.user.clone(),
            port: profile.port,
            alias: Some(profile.alias.clone()),
            description: profile.description.clone(),
            group: profile.group.clone(),
            key_path: profile.key_path.clone(),
        }
    }
}

/// Raw text collected from the add/edit form, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub alias: String,
    pub host: String,
    pub user: String,
    pub port: String,
    pub group: String,
    pub description: String,
    pub key_path: String,
}

impl ProfileDraft {
    pub fn from_profile(profile: &HostProfile) -> Self {
        Self {
            alias: profile.alias.clone(),
            host: profile.host.clone(),
            user: profile.user.clone(),
            port: profile.port.to_string(),
            group: profile.group.clone().unwrap_or_default(),
            description: profile.description.clone().unwrap_or_default(),
            key_path: profile.key_path.clone().unwrap_or_default(),
        }
    }

    /// Validate every field and build the profile.
    ///
    /// On failure returns all messages, in form order, rather than stopping
    /// at the first bad field.
    pub fn into_profile(self) -> std::result::Result<HostProfile, Vec<String>> {
        let mut errors = Vec::new();

        let alias = self.alias.trim().to_string();
        if alias.is_empty() {
            errors.push("Alias is required".to_string());
        }

        let host = self.host.trim().to_string();
        if let Err(e) = validate_hostname(&host) {
            errors.push(validation_message(e));
        }

        let user = self.user.trim().to_string();
        if let Err(e) = validate_username(&user) {
            errors.push(validation_message(e));
        }

        let port = match validate_port(&self.port) {
            Ok(port) => port,
            Err(e) => {
                errors.push(validation_message(e));
                DEFAULT_PORT
            }
        };

        let key_path = non_empty(&self.key_path).map(|p| expand_path(&p));
        if let Some(path) = &key_path
            && let Err(e) = validate_key_path(path)
        {
            errors.push(validation_message(e));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(HostProfile {
            alias,
            host,
            user,
            port,
            group: non_empty(&self.group),
            description: non_empty(&self.description),
            key_path,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validation_message(err: AppError) -> String {
    match err {
        AppError::ValidationError(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProfileDraft {
        ProfileDraft {
            alias: "db1".to_string(),
            host: "10.0.0.5".to_string(),
            user: "admin".to_string(),
            port: "2222".to_string(),
            group: "prod".to_string(),
            description: String::new(),
            key_path: String::new(),
        }
    }

    #[test]
    fn test_draft_into_profile() {
        let profile = draft().into_profile().unwrap();
        assert_eq!(profile.alias, "db1");
        assert_eq!(profile.port, 2222);
        assert_eq!(profile.group.as_deref(), Some("prod"));
        assert_eq!(profile.description, None);
        assert_eq!(profile.key_path, None);
    }

    #[test]
    fn test_draft_collects_all_errors() {
        let bad = ProfileDraft {
            alias: "  ".to_string(),
            host: "256.1.1.1".to_string(),
            user: "bad user".to_string(),
            port: "0".to_string(),
            key_path: "/definitely/not/here".to_string(),
            ..ProfileDraft::default()
        };
        let errors = bad.into_profile().unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Alias is required".to_string(),
                "IP address octets must be between 0 and 255".to_string(),
                "Username contains invalid characters".to_string(),
                "Port must be between 1 and 65535".to_string(),
                "Key file does not exist".to_string(),
            ]
        );
    }

    #[test]
    fn test_draft_round_trips_profile() {
        let profile = HostProfile::new("web", "web.example.com", "deploy")
            .with_group("staging")
            .with_description("frontend");
        let rebuilt = ProfileDraft::from_profile(&profile).into_profile().unwrap();
        assert_eq!(rebuilt, profile);
    }

    #[test]
    fn test_profile_validate() {
        assert!(HostProfile::new("a", "example.com", "root").validate().is_ok());
        assert!(HostProfile::new("", "example.com", "root").validate().is_err());
        assert!(HostProfile::new("a", "", "root").validate().is_err());
        assert!(HostProfile::new("a", "example.com", "").validate().is_err());
        assert!(
            HostProfile::new("a", "example.com", "root")
                .with_port(0)
                .validate()
                .is_err()
        );
        assert!(
            HostProfile::new("a", "example.com", "root")
                .with_key_path("/no/such/key")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_record_alias_must_match_key() {
        let record: HostRecord =
            serde_json::from_str(r#"{"host": "h.example.com", "user": "u", "alias": "other"}"#)
                .unwrap();
        assert!(record.into_profile("mine").is_err());

        let record: HostRecord =
            serde_json::from_str(r#"{"host": "h.example.com", "user": "u"}"#).unwrap();
        let profile = record.into_profile("mine").unwrap();
        assert_eq!(profile.alias, "mine");
        assert_eq!(profile.port, DEFAULT_PORT);
    }

    #[test]
    fn test_record_requires_host_and_user() {
        assert!(serde_json::from_str::<HostRecord>(r#"{"user": "u"}"#).is_err());
        assert!(serde_json::from_str::<HostRecord>(r#"{"host": "h"}"#).is_err());
        assert!(
            serde_json::from_str::<HostRecord>(r#"{"host": "h", "user": "u", "extra": 1}"#)
                .is_err()
        );
    }
}
