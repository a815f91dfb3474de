use anyhow::{bail, Result};

use crate::{
    config::ListConfig,
    infrastructure::terminal::TerminalPrompter,
    moderate::moderate_list,
    session::{SessionClient, SessionError},
};

/// Drives the run: lists in config order, one live session at a time,
/// re-authenticating whenever the credential triple changes between
/// consecutive entries.
pub struct ModeratorApp {
    lists: Vec<ListConfig>,
    debug: bool,
}

impl ModeratorApp {
    pub fn new(lists: Vec<ListConfig>, debug: bool) -> Self {
        Self { lists, debug }
    }

    pub async fn run(self) -> Result<()> {
        if self.lists.is_empty() {
            println!("no lists configured");
            return Ok(());
        }

        let mut prompter = TerminalPrompter;
        let mut session: Option<SessionClient> = None;

        for config in &self.lists {
            let reusable = session
                .as_ref()
                .map(|existing| existing.serves(config))
                .unwrap_or(false);
            if !reusable {
                if let Some(old) = session.take() {
                    log_out(old).await;
                }
                let client = SessionClient::new(config, self.debug)?;
                match client.login().await {
                    Ok(()) => session = Some(client),
                    Err(SessionError::LoginRejected(detail)) => {
                        // A rejected login aborts the whole run, not just
                        // this list.
                        bail!(
                            "login to {} as {} rejected: {detail}",
                            config.base_url,
                            config.username
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            if let Some(client) = session.as_ref() {
                moderate_list(client, config, &mut prompter).await?;
            }
        }

        if let Some(client) = session.take() {
            log_out(client).await;
        }
        Ok(())
    }
}

async fn log_out(session: SessionClient) {
    if let Err(err) = session.logout().await {
        tracing::warn!(target: "session", error = %err, "logout failed");
    }
}
