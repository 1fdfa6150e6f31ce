//! Google sign-in and linking handlers.

use anyhow::Result;
use cabinet_core::api::types::User;
use cabinet_core::google::{self, CallbackLanding};

use super::{require_login, user_facing};
use crate::cli::App;

pub fn url(app: &App) {
    println!("{}", app.session.api().google_auth_url());
}

pub fn open(app: &App) {
    let url = google::redirect_to_google(&app.session);
    println!("To sign in with Google, finish in the browser (or visit the URL below):");
    println!("  {url}");
    println!();
    println!("Then run `cabinet google callback <URL>` with the address you were redirected to.");
}

pub async fn callback(app: &mut App, url: &str) -> Result<()> {
    let landing = CallbackLanding::from_config(&app.config.google).resolve(&mut app.session, url);

    if landing.authenticated {
        let name = app
            .session
            .state()
            .user()
            .map(User::display_name)
            .unwrap_or_default();
        println!("✓ Signed in with Google as {name}");
    } else {
        let reason = app.session.state().error.clone().unwrap_or_default();
        eprintln!("✗ {reason}");
    }

    let route = landing.navigate().await;
    println!("Redirecting to {}", route.path());

    if landing.authenticated {
        Ok(())
    } else {
        anyhow::bail!("Google sign-in failed")
    }
}

pub async fn status(app: &App) -> Result<()> {
    require_login(app)?;

    let status = app
        .session
        .api()
        .google_status()
        .await
        .map_err(|e| user_facing(&e))?;

    if status.is_linked {
        println!("Google account linked");
        if let Some(id) = &status.google_id {
            println!("  google id:  {id}");
        }
        if let Some(last) = &status.last_google_login {
            println!("  last login: {last}");
        }
        println!(
            "  token:      {}",
            if status.has_valid_token { "valid" } else { "expired" }
        );
    } else {
        println!("No Google account linked");
    }
    Ok(())
}

pub async fn link(app: &App) -> Result<()> {
    require_login(app)?;

    let response = app
        .session
        .api()
        .link_google_account()
        .await
        .map_err(|e| user_facing(&e))?;

    if !response.message.is_empty() {
        println!("{}", response.message);
    }
    println!("  {}", response.link_url);
    if let Err(e) = google::open_in_browser(&response.link_url) {
        tracing::warn!(error = %e, "could not open browser");
    }
    Ok(())
}

pub async fn unlink(app: &App) -> Result<()> {
    require_login(app)?;

    let response = app
        .session
        .api()
        .unlink_google_account()
        .await
        .map_err(|e| user_facing(&e))?;
    if response.message.is_empty() {
        println!("✓ Google account unlinked");
    } else {
        println!("✓ {}", response.message);
    }
    Ok(())
}
