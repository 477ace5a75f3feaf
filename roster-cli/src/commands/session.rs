//! Sign in and sign out.
//!
//! There is no credential exchange here. `login` stores a token obtained
//! from the backend's own login flow.

use anyhow::Result;
use std::path::Path;

use crate::store::FileSessionStore;

/// Run the login command.
pub async fn login(data_dir: &Path, token: &str, user_id: &str, name: Option<&str>) -> Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Token must not be empty");
    }
    if user_id.trim().is_empty() {
        anyhow::bail!("User id must not be empty");
    }

    let store = FileSessionStore::new(data_dir);
    store.save(token, user_id, name).await?;
    tracing::info!("Session saved to {}", store.path().display());

    println!("Signed in as {}", name.unwrap_or(user_id));
    println!();
    println!("Next steps:");
    println!("  1. See your conversations: parley-roster list");
    println!("  2. Start one: parley-roster start <user-id>");

    Ok(())
}

/// Run the logout command.
pub async fn logout(data_dir: &Path) -> Result<()> {
    let store = FileSessionStore::new(data_dir);
    if store.clear().await? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}
