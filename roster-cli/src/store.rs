//! Local storage for the CLI: the session file and the config file.

use anyhow::{Context, Result};
use roster_client::{RosterConfig, SessionStore, StoredSession, StoredUser};
use roster_types::UserId;
use std::path::{Path, PathBuf};

/// File name of the persisted session inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// File name of the config inside the data directory.
pub const CONFIG_FILE: &str = "roster.toml";

/// Session persisted as JSON in the data directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Session store for `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a login.
    pub async fn save(&self, token: &str, user_id: &str, name: Option<&str>) -> Result<()> {
        let session = StoredSession {
            token: Some(token.to_string()),
            user: Some(StoredUser {
                id: UserId::new(user_id),
                name: name.map(str::to_string),
            }),
        };
        let contents = serde_json::to_string_pretty(&session)?;
        tokio::fs::write(&self.path, contents)
            .await
            .context("Failed to save session")?;
        set_file_permissions_0600(&self.path).await?;
        Ok(())
    }

    /// Remove the session file. Returns false if there was none.
    pub async fn clear(&self) -> Result<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).context("Failed to remove session"),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> StoredSession {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return StoredSession::default();
        };
        match serde_json::from_str(&contents) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                StoredSession::default()
            }
        }
    }
}

/// Load the roster config.
///
/// An explicit path must exist. Otherwise `roster.toml` in the data
/// directory is used if present, and defaults if not.
pub fn load_config(data_dir: &Path, explicit: Option<&Path>) -> Result<RosterConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = data_dir.join(CONFIG_FILE);
            if !candidate.exists() {
                return Ok(RosterConfig::default());
            }
            candidate
        }
    };
    let config = RosterConfig::from_file(&path)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Set file permissions to 0600 (owner read/write only).
#[cfg(unix)]
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    tokio::fs::set_permissions(path, perms)
        .await
        .context("Failed to set file permissions")?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_file_permissions_0600(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_client::resolve;
    use tempfile::tempdir;

    #[tokio::test]
    async fn saved_session_resolves() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save("tok", "u1", Some("Ann")).await.unwrap();

        let session = resolve(&store).unwrap();
        assert_eq!(session.user_id().as_str(), "u1");
        assert_eq!(session.token(), "tok");
        assert_eq!(
            store.load().user.unwrap().name.as_deref(),
            Some("Ann")
        );
    }

    #[test]
    fn missing_file_is_empty_session() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert_eq!(store.load(), StoredSession::default());
        assert!(resolve(&store).is_none());
    }

    #[test]
    fn corrupt_file_is_empty_session() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(resolve(&store).is_none());
    }

    #[test]
    fn token_without_user_does_not_resolve() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), r#"{"token":"tok"}"#).unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(resolve(&store).is_none());
    }

    #[tokio::test]
    async fn clear_removes_session() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save("tok", "u1", None).await.unwrap();

        assert!(store.clear().await.unwrap());
        assert!(!store.path().exists());
        assert!(!store.clear().await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save("tok", "u1", None).await.unwrap();

        let perms = tokio::fs::metadata(store.path()).await.unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600, "file should be 0600");
    }

    #[test]
    fn config_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config, RosterConfig::default());
    }

    #[test]
    fn config_from_data_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[api]\nbase_url = \"http://chat.local:8080\"\n",
        )
        .unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.api.base_url, "http://chat.local:8080");
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("elsewhere.toml");
        assert!(load_config(dir.path(), Some(&missing)).is_err());
    }
}
