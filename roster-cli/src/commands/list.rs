//! Show the roster: recent conversations and people to talk to.

use anyhow::Result;
use roster_client::{Activation, HttpApi, RosterClient};
use roster_core::{Placeholder, RosterView};
use std::fmt::Write;

/// Run the list command.
pub async fn run(client: &RosterClient<HttpApi>) -> Result<()> {
    if client.activate().await == Activation::Redirected {
        anyhow::bail!("Not signed in. Run 'parley-roster login --token <token> --user-id <id>' first.");
    }

    let view = client.view_now().await?;
    print!("{}", render(&view));
    client.deactivate().await;
    Ok(())
}

/// Render the roster as plain text.
pub fn render(view: &RosterView) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Recent conversations");
    if let Some(error) = &view.error {
        let _ = writeln!(out, "  ! {} (run 'parley-roster list' to retry)", error);
    } else if let Some(placeholder) = view.conversations_placeholder() {
        let _ = writeln!(out, "  {}", placeholder_line(&placeholder));
    }
    for row in &view.conversations {
        let activity = row.last_activity.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "  {} [{}]  {}  (open {})",
            row.title,
            row.presence.label(),
            activity,
            row.id
        );
        let _ = writeln!(out, "    {}", row.preview);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Start a new conversation");
    if let Some(placeholder) = view.contacts_placeholder() {
        let _ = writeln!(out, "  {}", placeholder_line(&placeholder));
    }
    for row in &view.contacts {
        let _ = writeln!(
            out,
            "  {} [{}]  {}  (start {})",
            row.display_name,
            row.presence.label(),
            row.location,
            row.id
        );
    }

    out
}

fn placeholder_line(placeholder: &Placeholder) -> String {
    match placeholder.hint {
        Some(hint) => format!("{}. {}", placeholder.title, hint),
        None => placeholder.title.to_string(),
    }
}
