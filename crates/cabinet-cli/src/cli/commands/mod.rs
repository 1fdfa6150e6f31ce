//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod google;
pub mod password;
pub mod profile;
pub mod register;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use cabinet_core::api::display_message;

use crate::cli::App;

/// Prints `label` and reads one trimmed line from stdin.
///
/// Returns `None` at end of input.
pub(crate) fn prompt_line(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

/// Like [`prompt_line`], but end of input or a blank line is an error.
pub(crate) fn prompt_required(label: &str, what: &str) -> Result<String> {
    match prompt_line(label)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("{what} cannot be empty"),
    }
}

/// Replaces an error with the text a user should see, keeping the full chain
/// in the log.
pub(crate) fn user_facing(error: &anyhow::Error) -> anyhow::Error {
    tracing::debug!(error = %format!("{error:#}"), "command failed");
    anyhow::anyhow!(display_message(error))
}

/// Fails unless a session was restored or established.
pub(crate) fn require_login(app: &App) -> Result<()> {
    if app.session.is_authenticated() {
        Ok(())
    } else {
        anyhow::bail!("Not logged in. Run `cabinet login` first.")
    }
}
