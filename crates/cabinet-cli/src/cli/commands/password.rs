//! Password recovery and change handlers.

use anyhow::Result;
use cabinet_core::api::auth::ensure_passwords_match;
use cabinet_core::flows::PasswordRecovery;

use super::{prompt_line, prompt_required, require_login, user_facing};
use crate::cli::App;

pub async fn forgot(app: &App, email: &str) -> Result<()> {
    let mut flow = PasswordRecovery::new(app.session.api());

    flow.forgot_password(email)
        .await
        .map_err(|e| user_facing(&e))?;
    println!("Recovery code sent to {email}");

    loop {
        let Some(code) = prompt_line("Recovery code: ")? else {
            anyhow::bail!("Password reset cancelled");
        };
        let new_password = prompt_required("New password: ", "Password")?;
        let confirm = prompt_required("Confirm new password: ", "Password")?;

        match flow.reset_password(&code, &new_password, &confirm).await {
            Ok(_) => {
                println!("✓ Password updated. Run `cabinet login` to sign in.");
                return Ok(());
            }
            Err(_) => eprintln!("✗ {}", flow.state().error.as_deref().unwrap_or_default()),
        }
    }
}

pub async fn change(app: &App) -> Result<()> {
    require_login(app)?;

    let current = prompt_required("Current password: ", "Password")?;
    let new_password = prompt_required("New password: ", "Password")?;
    let confirm = prompt_required("Confirm new password: ", "Password")?;
    ensure_passwords_match(&new_password, &confirm)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let response = app
        .session
        .api()
        .change_password(&current, &new_password)
        .await
        .map_err(|e| user_facing(&e))?;
    if response.message.is_empty() {
        println!("✓ Password changed");
    } else {
        println!("✓ {}", response.message);
    }
    Ok(())
}
