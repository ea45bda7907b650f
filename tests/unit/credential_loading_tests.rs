//! Unit tests for remote credential loading.
//!
//! The keychain service `estimate-desk` has no entries in test
//! environments, so loading falls through to the environment variables.
//!
//! NOTE: These tests mutate process-global env vars and must run serially.

use estimate_desk::config::{RemoteCredentials, REMOTE_TOKEN_ENV, REMOTE_URL_ENV};

#[allow(unsafe_code)]
fn clear_env() {
    unsafe {
        std::env::remove_var(REMOTE_URL_ENV);
        std::env::remove_var(REMOTE_TOKEN_ENV);
    }
}

#[tokio::test]
#[serial_test::serial]
#[allow(unsafe_code)]
async fn env_vars_configure_remote() {
    unsafe {
        std::env::set_var(REMOTE_URL_ENV, "https://rows.example.test/");
        std::env::set_var(REMOTE_TOKEN_ENV, "anon-token");
    }

    let creds = RemoteCredentials::load().await.expect("credentials from env");
    assert_eq!(creds.url, "https://rows.example.test");
    assert_eq!(creds.token, "anon-token");

    clear_env();
}

#[tokio::test]
#[serial_test::serial]
async fn missing_env_vars_mean_unconfigured() {
    clear_env();
    assert!(RemoteCredentials::load().await.is_none());
}

#[tokio::test]
#[serial_test::serial]
#[allow(unsafe_code)]
async fn url_without_token_is_unconfigured() {
    clear_env();
    unsafe {
        std::env::set_var(REMOTE_URL_ENV, "https://rows.example.test");
    }

    assert!(RemoteCredentials::load().await.is_none());

    clear_env();
}

#[tokio::test]
#[serial_test::serial]
#[allow(unsafe_code)]
async fn blank_env_var_is_treated_as_missing() {
    unsafe {
        std::env::set_var(REMOTE_URL_ENV, "https://rows.example.test");
        std::env::set_var(REMOTE_TOKEN_ENV, "   ");
    }

    assert!(RemoteCredentials::load().await.is_none());

    clear_env();
}

#[test]
fn new_trims_and_rejects_blank_values() {
    let creds = RemoteCredentials::new("  https://rows.example.test//  ", " key ").unwrap();
    assert_eq!(creds.url, "https://rows.example.test");
    assert_eq!(creds.token, "key");

    assert!(RemoteCredentials::new("", "key").is_none());
    assert!(RemoteCredentials::new("https://rows.example.test", "").is_none());
}

#[test]
fn debug_output_redacts_token() {
    let creds = RemoteCredentials::new("https://rows.example.test", "super-secret").unwrap();
    let rendered = format!("{creds:?}");
    assert!(rendered.contains("rows.example.test"));
    assert!(!rendered.contains("super-secret"));
}
