//! Integration tests for Google sign-in, linking and profile commands.

mod common;

use common::{VALID_TOKEN, cabinet, read_storage, write_fast_config, write_session};
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bearer() -> String {
    format!("Bearer {VALID_TOKEN}")
}

#[test]
fn test_google_url_uses_api_origin() {
    let home = tempdir().unwrap();

    cabinet(home.path(), Some("http://api.test"))
        .args(["google", "url"])
        .assert()
        .success()
        .stdout(predicate::str::diff("http://api.test/auth/google\n"));
}

#[test]
fn test_google_callback_success_signs_in() {
    let home = tempdir().unwrap();
    write_fast_config(home.path());

    cabinet(home.path(), None)
        .args([
            "google",
            "callback",
            "https://cabinet.test/auth/callback?token=goog&user=%7B%22id%22%3A5%2C%22name%22%3A%22Olga%22%7D",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in with Google as Olga"))
        .stdout(predicate::str::contains("Redirecting to /dashboard"));

    let storage = read_storage(home.path());
    assert_eq!(storage["auth_token"], "goog");
}

#[test]
fn test_google_callback_missing_user_goes_to_login() {
    let home = tempdir().unwrap();
    write_fast_config(home.path());

    cabinet(home.path(), None)
        .args(["google", "callback", "?token=goog"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Redirecting to /login"))
        .stderr(predicate::str::contains("missing token or user"));

    assert!(read_storage(home.path()).get("auth_token").is_none());
}

#[test]
fn test_google_status_requires_login() {
    let home = tempdir().unwrap();

    cabinet(home.path(), Some("http://127.0.0.1:9"))
        .args(["google", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[tokio::test]
async fn test_google_status_linked() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;
    write_session(home.path(), VALID_TOKEN, &json!({"id": 1}));

    Mock::given(method("GET"))
        .and(path("/auth/google/status"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isLinked": true,
            "googleId": "g-123",
            "hasValidToken": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    cabinet(home.path(), Some(&server.uri()))
        .args(["google", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Google account linked"))
        .stdout(predicate::str::contains("g-123"));
}

#[tokio::test]
async fn test_google_link_prints_link_url() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;
    write_session(home.path(), VALID_TOKEN, &json!({"id": 1}));

    Mock::given(method("POST"))
        .and(path("/auth/google/link"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Follow the link",
            "linkUrl": "https://accounts.google.test/o/oauth2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    cabinet(home.path(), Some(&server.uri()))
        .args(["google", "link"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://accounts.google.test/o/oauth2"));
}

#[tokio::test]
async fn test_profile_show() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;
    write_session(home.path(), VALID_TOKEN, &json!({"id": 1}));

    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "login": "anna",
            "email": "a@b.com",
            "roles": ["student", "mentor"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    cabinet(home.path(), Some(&server.uri()))
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a@b.com"))
        .stdout(predicate::str::contains("student, mentor"));
}

#[tokio::test]
async fn test_profile_update_refreshes_stored_user() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;
    write_session(home.path(), VALID_TOKEN, &json!({"id": 1, "name": "Anna"}));

    Mock::given(method("PATCH"))
        .and(path("/users/profile"))
        .and(body_json(json!({"name": "Anya"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "Anya"
        })))
        .expect(1)
        .mount(&server)
        .await;

    cabinet(home.path(), Some(&server.uri()))
        .args(["profile", "update", "--name", "Anya"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile updated"));

    let storage = read_storage(home.path());
    let user: serde_json::Value =
        serde_json::from_str(storage["user"].as_str().unwrap()).unwrap();
    assert_eq!(user["name"], "Anya");
    assert_eq!(storage["auth_token"], VALID_TOKEN);
}

#[test]
fn test_profile_update_without_fields() {
    let home = tempdir().unwrap();
    write_session(home.path(), VALID_TOKEN, &json!({"id": 1}));

    cabinet(home.path(), Some("http://127.0.0.1:9"))
        .args(["profile", "update"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));
}
