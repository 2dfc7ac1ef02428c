//! Session storage for persisting login state.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use rinnai_core::{AccessToken, IdToken, RefreshToken, SessionCredentials, SessionTokens};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub identity: String,
    id_token: String,
    access_token: String,
    refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    /// Capture a credential snapshot. Returns `None` without a full session.
    pub fn from_credentials(creds: &SessionCredentials) -> Option<Self> {
        let tokens = creds.tokens.as_ref()?;
        Some(Self {
            identity: creds.identity.clone()?,
            id_token: tokens.id_token().as_str().to_string(),
            access_token: tokens.access_token().as_str().to_string(),
            refresh_token: creds.refresh_token.as_ref()?.as_str().to_string(),
            expires_at: tokens.expires_at(),
        })
    }

    pub fn tokens(&self) -> SessionTokens {
        let tokens = SessionTokens::new(
            IdToken::new(self.id_token.clone()),
            AccessToken::new(self.access_token.clone()),
        );
        match self.expires_at {
            Some(expires_at) => tokens.with_expiry(expires_at),
            None => tokens,
        }
    }

    pub fn refresh_token(&self) -> RefreshToken {
        RefreshToken::new(self.refresh_token.clone())
    }
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "rinnai").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save a session to disk.
pub fn save_session(session: &StoredSession) -> Result<()> {
    let path = session_path()?;
    let json = serde_json::to_string_pretty(session)?;

    fs::write(&path, &json).context("Failed to write session file")?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Load a session from disk.
pub fn load_session() -> Result<Option<StoredSession>> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    let stored = serde_json::from_str(&json).context("Invalid session file")?;

    Ok(Some(stored))
}

/// Clear the stored session. Returns true if one existed.
pub fn clear_session() -> Result<bool> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove session file")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_without_refresh_token_is_not_stored() {
        let creds = SessionCredentials {
            identity: Some("user@example.com".to_string()),
            tokens: Some(SessionTokens::new(IdToken::new("id"), AccessToken::new("access"))),
            refresh_token: None,
        };
        assert!(StoredSession::from_credentials(&creds).is_none());
    }

    #[test]
    fn stored_session_round_trips_tokens() {
        let expires_at = DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let creds = SessionCredentials {
            identity: Some("user@example.com".to_string()),
            tokens: Some(
                SessionTokens::new(IdToken::new("id"), AccessToken::new("access"))
                    .with_expiry(expires_at),
            ),
            refresh_token: Some(RefreshToken::new("refresh")),
        };

        let stored = StoredSession::from_credentials(&creds).unwrap();
        let json = serde_json::to_string(&stored).unwrap();
        let loaded: StoredSession = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.identity, "user@example.com");
        assert_eq!(loaded.tokens(), creds.tokens.unwrap());
        assert_eq!(loaded.refresh_token().as_str(), "refresh");
    }
}
