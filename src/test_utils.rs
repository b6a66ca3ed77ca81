//! Test utilities for SAO Chat
//!
//! This module provides common test utilities including temporary directory
//! management, config fixtures, sample sessions, and assertion helpers.

use crate::backend::Session;
use crate::config::Config;
use crate::error::SaoChatError;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T, SaoChatError>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}', got Ok", expected),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}

/// Create a test configuration pointing at `base_url`
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.backend.base_url = base_url.to_string();
    config.backend.timeout_seconds = 5;
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
backend:
  base_url: http://localhost:8000/api/v1
  chatbot_scope: /chatbot
  timeout_seconds: 10
user:
  user_id: "42"
sessions:
  normalize_on_load: true
  confirm_deletes: false
"#
    .to_string()
}

/// The two-session list used throughout the tests: "Budget" created on
/// 2025-01-01 and "Finance" on 2025-01-02, neither pinned, in that order.
pub fn sample_sessions() -> Vec<Session> {
    vec![
        Session::new("1", "Budget", "2025-01-01"),
        Session::new("2", "Finance", "2025-01-02"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "user: {}");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "user: {}");
    }

    #[test]
    fn test_assert_error_contains() {
        let result: Result<(), SaoChatError> = Err(SaoChatError::Config("invalid".to_string()));
        assert_error_contains(result, "invalid");
    }

    #[test]
    #[should_panic(expected = "got Ok")]
    fn test_assert_error_contains_panics_on_ok() {
        assert_error_contains(Ok::<(), SaoChatError>(()), "anything");
    }

    #[test]
    fn test_config_yaml_parses_and_validates() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.user.user_id, "42");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_sessions_in_server_order() {
        let sessions = sample_sessions();
        assert_eq!(sessions[0].title, "Budget");
        assert_eq!(sessions[1].title, "Finance");
    }
}
