//! Profile handlers.

use anyhow::Result;
use cabinet_core::api::types::{ProfilePatch, User};

use super::{require_login, user_facing};
use crate::cli::App;

fn print_user(user: &User) {
    println!("{}", user.display_name());
    println!("  id:          {}", user.id);
    let fields = [
        ("login", user.login.as_deref()),
        ("email", user.email.as_deref()),
        ("name", user.name.as_deref()),
        ("second name", user.second_name.as_deref()),
        ("avatar", user.avatar.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {:<12} {value}", format!("{label}:"));
        }
    }
    if !user.roles.is_empty() {
        println!("  {:<12} {}", "roles:", user.roles.join(", "));
    }
}

pub async fn show(app: &App) -> Result<()> {
    require_login(app)?;

    let user = app
        .users
        .get_profile()
        .await
        .map_err(|e| user_facing(&e))?;
    print_user(&user);
    Ok(())
}

pub async fn update(app: &mut App, patch: &ProfilePatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to update: pass at least one field");
    }
    require_login(app)?;

    let user = app
        .users
        .update_profile(patch)
        .await
        .map_err(|e| user_facing(&e))?;
    app.session.update_user(user.clone());

    println!("✓ Profile updated");
    print_user(&user);
    Ok(())
}
