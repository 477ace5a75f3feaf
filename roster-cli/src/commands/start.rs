//! Start or resume a conversation, or open an existing one.

use anyhow::Result;
use roster_client::{Activation, HttpApi, RosterClient, StartError};
use roster_types::{ConversationId, UserId};

/// Run the start command.
pub async fn run(client: &RosterClient<HttpApi>, user_id: &str) -> Result<()> {
    if client.activate().await == Activation::Redirected {
        anyhow::bail!("Not signed in. Run 'parley-roster login --token <token> --user-id <id>' first.");
    }

    let result = client.start_or_resume(&UserId::new(user_id)).await;
    client.deactivate().await;

    match result {
        Ok(conversation) => {
            println!("Conversation {} is ready.", conversation.id());
            Ok(())
        }
        Err(StartError::Failed { message, source }) => {
            tracing::debug!("Start failed: {}", source);
            anyhow::bail!(message)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the open command.
pub fn open(client: &RosterClient<HttpApi>, conversation_id: &str) -> Result<()> {
    if conversation_id.trim().is_empty() {
        anyhow::bail!("Conversation id must not be empty");
    }
    client.open_conversation(&ConversationId::new(conversation_id));
    Ok(())
}
