//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;

/// Unsigned JWT expiring in 2100.
pub const VALID_TOKEN: &str =
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxIiwiZXhwIjo0MTAyNDQ0ODAwfQ.sig";

/// Unsigned JWT that expired in 2001.
pub const EXPIRED_TOKEN: &str =
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxIiwiZXhwIjoxMDAwMDAwMDAwfQ.sig";

/// `cabinet` bound to an isolated home and, optionally, a mock backend.
pub fn cabinet(home: &Path, api_url: Option<&str>) -> Command {
    let mut cmd = cargo_bin_cmd!("cabinet");
    cmd.env("CABINET_HOME", home)
        .env("CABINET_NO_BROWSER", "1")
        .env_remove("CABINET_ENV");
    match api_url {
        Some(url) => cmd.env("CABINET_API_URL", url),
        None => cmd.env_remove("CABINET_API_URL"),
    };
    cmd
}

/// Writes a stored session the way the client persists it.
pub fn write_session(home: &Path, token: &str, user: &serde_json::Value) {
    let storage = serde_json::json!({
        "auth_token": token,
        "user": user.to_string(),
    });
    fs::write(home.join("storage.json"), storage.to_string()).unwrap();
}

pub fn read_storage(home: &Path) -> serde_json::Value {
    let path = home.join("storage.json");
    if !path.exists() {
        return serde_json::json!({});
    }
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Config with no callback delays so tests don't sleep.
pub fn write_fast_config(home: &Path) {
    fs::write(
        home.join("config.toml"),
        "[google]\nsuccess_redirect_delay_ms = 0\nfailure_redirect_delay_ms = 0\n",
    )
    .unwrap();
}
