//! Syntactic checks for host profile input.
//!
//! Every validator is pure apart from [`validate_key_path`], which looks at
//! the filesystem, and [`expand_path`], which reads the home directory. A
//! failure carries a message suitable for showing to the user as-is.

use std::num::IntErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};

const MAX_HOSTNAME_LEN: usize = 255;

static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})$")
        .unwrap_or_else(|e| panic!("invalid IPv4 pattern: {e}"))
});

static HOSTNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap_or_else(|e| panic!("invalid hostname pattern: {e}"))
});

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.\-]+$").unwrap_or_else(|e| panic!("invalid username pattern: {e}"))
});

fn invalid(message: &str) -> AppError {
    AppError::ValidationError(message.to_string())
}

/// Checks that `hostname` is a dotted-quad IPv4 literal or a DNS name.
///
/// No resolution happens here. Anything made of four dot-separated numeric
/// groups is treated as an address, so `256.1.1.1` is rejected rather than
/// accepted as a name.
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty() || hostname.chars().count() > MAX_HOSTNAME_LEN {
        return Err(invalid("Hostname must be between 1 and 255 characters"));
    }

    if let Some(caps) = IPV4_PATTERN.captures(hostname) {
        for octet in caps.iter().skip(1).flatten() {
            let in_range = octet
                .as_str()
                .parse::<u16>()
                .map(|value| value <= 255)
                .unwrap_or(false);
            if !in_range {
                return Err(invalid("IP address octets must be between 0 and 255"));
            }
        }
        return Ok(());
    }

    if !HOSTNAME_PATTERN.is_match(hostname) {
        return Err(invalid("Invalid hostname format"));
    }

    Ok(())
}

/// Parses and range-checks a port typed by the user.
pub fn validate_port(port: &str) -> Result<u16> {
    match port.trim().parse::<i64>() {
        Ok(value) if (1..=65535).contains(&value) => Ok(value as u16),
        Ok(_) => Err(invalid("Port must be between 1 and 65535")),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(invalid("Port must be between 1 and 65535"))
        }
        Err(_) => Err(invalid("Port must be a number")),
    }
}

pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(invalid("Username cannot be empty"));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(invalid("Username contains invalid characters"));
    }
    Ok(())
}

/// An empty path is accepted: the host then authenticates with default keys.
/// Symlinks are followed, so a link to a regular file passes.
pub fn validate_key_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }

    let metadata = match std::fs::metadata(Path::new(path)) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(invalid("Key file does not exist"));
        }
        Err(e) => {
            return Err(AppError::ValidationError(format!(
                "Key file cannot be read: {e}"
            )));
        }
    };

    if !metadata.is_file() {
        return Err(invalid("Path is not a file"));
    }

    Ok(())
}

/// Expands a leading `~` to the current user's home directory.
pub fn expand_path(path: &str) -> String {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return path.to_string();
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home.to_string_lossy().into_owned(),
        Some(home) => home.join(rest).to_string_lossy().into_owned(),
        None => path.to_string(),
    }
}
