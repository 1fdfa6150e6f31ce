//! Login, logout and status handlers.

use anyhow::Result;
use cabinet_core::api::types::LoginForm;
use cabinet_core::config::paths;
use cabinet_core::jwt;
use cabinet_core::logging::mask_token;

use super::{prompt_required, user_facing};
use crate::cli::App;

pub async fn login(app: &mut App, login: String) -> Result<()> {
    if let Some(user) = app.session.state().user() {
        println!("Already logged in as {}; replacing session.", user.display_name());
    }

    let password = prompt_required("Password: ", "Password")?;
    let form = LoginForm { login, password };

    let response = app
        .session
        .login(&form)
        .await
        .map_err(|e| user_facing(&e))?;

    println!();
    println!("✓ Logged in as {}", response.user.display_name());
    println!("  Credentials saved to: {}", paths::storage_path().display());
    Ok(())
}

pub async fn logout(app: &mut App) -> Result<()> {
    if app.session.api().stored_token().is_none() {
        println!("Not logged in (no stored session found).");
        return Ok(());
    }

    app.session.logout().await;
    println!("✓ Logged out");
    Ok(())
}

pub fn status(app: &App) {
    let state = app.session.state();
    let (Some(user), Some(token)) = (state.user(), state.token()) else {
        match app.session.api().stored_token() {
            Some(_) => println!("Not logged in (stored session has expired)."),
            None => println!("Not logged in."),
        }
        return;
    };

    println!("Logged in as {}", user.display_name());
    println!("  id:    {}", user.id);
    if let Some(email) = &user.email {
        println!("  email: {email}");
    }
    if !user.roles.is_empty() {
        println!("  roles: {}", user.roles.join(", "));
    }
    if let Some(provider) = &user.provider {
        println!("  via:   {provider}");
    }
    println!("  token: {}", mask_token(token));
    if let Some(expiry) = jwt::token_expiry(token) {
        println!("  expires: {}", expiry.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}
