//! Session models.
//!
//! A session binds a caller to one MongoDB connection. Its key is composed
//! from the login user, host and port.

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Default MongoDB port.
pub const DEFAULT_MONGO_PORT: u16 = 27017;

/// User name used in session keys for logins without credentials.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Request body for opening a session.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// MongoDB host.
    #[validate(
        length(min = 1, max = 255, message = "Host must be 1-255 characters"),
        custom(function = "validate_host")
    )]
    pub host: String,
    /// MongoDB port (27017 if not specified).
    pub port: Option<u16>,
    /// User name.
    pub username: Option<String>,
    /// Password (never echoed back).
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_MONGO_PORT)
    }

    /// User name, treating an empty string like an absent one.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Host as dialed: an IPv6 literal loses its brackets.
    pub fn server_host(&self) -> &str {
        self.host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.host)
    }

    /// Session key in `user@host:port` form.
    pub fn session_key(&self) -> String {
        format!(
            "{}@{}:{}",
            self.username().unwrap_or(ANONYMOUS_USER),
            self.host,
            self.port()
        )
    }
}

/// A host is a single hostname, IPv4 address or IPv6 literal (bracketed or
/// bare). Anything that would read as connection-string syntax is rejected.
fn validate_host(host: &str) -> Result<(), ValidationError> {
    let invalid = || {
        ValidationError::new("host")
            .with_message("Host must be a single hostname or IP address".into())
    };

    if let Some(inner) = host.strip_prefix('[') {
        return match inner.strip_suffix(']').map(str::parse::<Ipv6Addr>) {
            Some(Ok(_)) => Ok(()),
            _ => Err(invalid()),
        };
    }
    if host.contains(':') {
        return host.parse::<Ipv6Addr>().map(|_| ()).map_err(|_| invalid());
    }

    let acceptable = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if acceptable {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// An open session, as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionItem {
    /// Key to send in the `x-session-key` header.
    pub session_key: String,
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl From<&LoginRequest> for SessionItem {
    fn from(req: &LoginRequest) -> Self {
        Self {
            session_key: req.session_key(),
            host: req.host.clone(),
            port: req.port(),
            username: req.username().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(host: &str, port: Option<u16>, user: Option<&str>) -> LoginRequest {
        LoginRequest {
            host: host.to_string(),
            port,
            username: user.map(str::to_string),
            password: None,
        }
    }

    #[test]
    fn test_session_key_composition() {
        assert_eq!(login("host", None, Some("u1")).session_key(), "u1@host:27017");
        assert_eq!(login("db.local", Some(27018), None).session_key(), "anonymous@db.local:27018");
        assert_eq!(login("h", None, Some("")).session_key(), "anonymous@h:27017");
    }

    #[test]
    fn test_empty_host_fails_validation() {
        assert!(login("", None, None).validate().is_err());
        assert!(login("localhost", None, None).validate().is_ok());
    }

    #[test]
    fn test_host_rejects_connection_string_syntax() {
        for host in ["a,b", "h/?replicaSet=x", "user@h", "h#frag", "h:27018", "a b", "[::1", "[h]"] {
            assert!(login(host, None, None).validate().is_err(), "{host} should be rejected");
        }
        for host in ["localhost", "db-1.example.com", "10.0.0.5", "::1", "[::1]", "fe80::1"] {
            assert!(login(host, None, None).validate().is_ok(), "{host} should be accepted");
        }
    }

    #[test]
    fn test_server_host_strips_ipv6_brackets() {
        assert_eq!(login("[::1]", None, None).server_host(), "::1");
        assert_eq!(login("::1", None, None).server_host(), "::1");
        assert_eq!(login("localhost", None, None).server_host(), "localhost");
    }

    #[test]
    fn test_session_item_hides_password() {
        let mut req = login("localhost", None, Some("admin"));
        req.password = Some("secret".into());
        let json = serde_json::to_string(&SessionItem::from(&req)).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("admin@localhost:27017"));
    }
}
