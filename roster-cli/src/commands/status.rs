//! Show where the CLI keeps its state and who is signed in.

use anyhow::Result;
use roster_client::{resolve, RosterConfig, SessionStore};
use std::path::Path;

use crate::store::FileSessionStore;

/// Run the status command.
pub fn run(data_dir: &Path, config: &RosterConfig) -> Result<()> {
    println!("=== parley-roster status ===");
    println!();
    println!("Data dir: {}", data_dir.display());
    println!("Backend:  {}", config.api.base_url);
    println!();

    let store = FileSessionStore::new(data_dir);
    match resolve(&store) {
        Some(session) => {
            let name = store.load().user.and_then(|u| u.name);
            println!("Session:");
            println!("  User: {}", session.user_id());
            if let Some(name) = name {
                println!("  Name: {}", name);
            }
        }
        None => {
            println!("Session: NOT SIGNED IN");
            println!();
            println!("Run 'parley-roster login --token <token> --user-id <id>' to sign in.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn status_without_session() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), &RosterConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn status_with_session() {
        let dir = tempdir().unwrap();
        FileSessionStore::new(dir.path())
            .save("tok", "u1", Some("Ann"))
            .await
            .unwrap();

        assert!(run(dir.path(), &RosterConfig::default()).is_ok());
    }
}
