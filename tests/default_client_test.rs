// The free `search` entry point and `CrackwatchClient::default` must not pick
// up configuration files or environment overrides.
//
// This binary mutates process environment, so it holds a single test.

use std::fs;
use std::time::Duration;

use crackwatch::constants::{DEFAULT_ENDPOINT, DEFAULT_RECEIVE_TIMEOUT};
use crackwatch::{Config, CrackwatchClient, SearchError, ValidationError};
use tempfile::TempDir;

#[tokio::test]
async fn test_default_client_ignores_environment_configuration() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"endpoint":"ws://127.0.0.1:1/sockjs/x/y/websocket","receive_timeout_secs":3}"#,
    )
    .unwrap();
    std::env::set_var("CRACKWATCH_CONFIG_DIR", dir.path());
    std::env::set_var("CRACKWATCH_RECEIVE_TIMEOUT", "7");

    // The environment is wired up: explicit loading sees it.
    let loaded = Config::load().unwrap();
    assert_eq!(loaded.endpoint, "ws://127.0.0.1:1/sockjs/x/y/websocket");
    assert_eq!(loaded.receive_timeout(), Duration::from_secs(7));

    // The default client does not.
    let client = CrackwatchClient::default();
    assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    assert_eq!(client.receive_timeout(), DEFAULT_RECEIVE_TIMEOUT);

    // A broken file does not surface through the free function either;
    // validation fails before any connection.
    fs::write(dir.path().join("config.json"), "{ not json").unwrap();
    let err = crackwatch::search(&"a".repeat(101), 1).await.unwrap_err();
    assert_eq!(
        err,
        SearchError::Validation(ValidationError::TermTooLong { max: 100, len: 101 })
    );
}
