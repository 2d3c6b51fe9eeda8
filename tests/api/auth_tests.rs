//! Authentication API Tests
//!
//! Request validation and response shaping rules. Credential and session
//! flows against repositories are covered by the service tests with mocks.

use fake::faker::lorem::en::Sentence;
use fake::Fake;
use test_case::test_case;
use uuid::Uuid;
use validator::Validate;

use gameconnecting::application::dto::request::{
    LoginRequest, RegisterRequest, VerifyResetCodeRequest,
};
use gameconnecting::application::dto::response::UserResponse;
use gameconnecting::domain::User;

use crate::{unique_username, TEST_USER};

#[test]
fn test_register_accepts_valid_payload() {
    let request = RegisterRequest {
        username: unique_username(),
        password: TEST_USER.password.to_string(),
        note: Some(Sentence(3..8).fake()),
    };

    assert!(request.validate().is_ok());
}

#[test_case(3 ; "username at minimum length")]
#[test_case(50 ; "username at maximum length")]
fn test_register_accepts_username_boundaries(len: usize) {
    let request = RegisterRequest {
        username: "u".repeat(len),
        password: TEST_USER.password.to_string(),
        note: None,
    };

    assert!(request.validate().is_ok());
}

#[test_case(2 ; "username below minimum length")]
#[test_case(51 ; "username above maximum length")]
fn test_register_rejects_bad_username_length(len: usize) {
    let request = RegisterRequest {
        username: "u".repeat(len),
        password: TEST_USER.password.to_string(),
        note: None,
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("username"));
}

#[test]
fn test_register_rejects_short_password() {
    let request = RegisterRequest {
        username: unique_username(),
        password: "12345".to_string(),
        note: None,
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("password"));
}

#[test]
fn test_register_rejects_oversized_note() {
    let request = RegisterRequest {
        username: unique_username(),
        password: TEST_USER.password.to_string(),
        note: Some("x".repeat(501)),
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("note"));
}

#[test]
fn test_login_requires_username_and_password() {
    let request = LoginRequest {
        username: String::new(),
        password: String::new(),
    };

    let errors = request.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("username"));
    assert!(fields.contains_key("password"));
}

#[test]
fn test_login_accepts_non_empty_credentials() {
    let request = LoginRequest {
        username: TEST_USER.username.to_string(),
        password: TEST_USER.password.to_string(),
    };

    assert!(request.validate().is_ok());
}

#[test_case("042317", true ; "six digit code")]
#[test_case("0423", false ; "code too short")]
#[test_case("04231789", false ; "code too long")]
fn test_reset_code_must_be_six_characters(code: &str, accepted: bool) {
    let request = VerifyResetCodeRequest {
        reset_request_id: Uuid::new_v4(),
        reset_code: code.to_string(),
    };

    assert_eq!(request.validate().is_ok(), accepted);
}

/// The profile payload must never carry the stored credential hash
#[test]
fn test_user_response_omits_password_hash() {
    let user = User::new("player_one".to_string(), "argon2-hash".to_string(), None);

    let body = serde_json::to_value(UserResponse::from_user(user)).unwrap();
    let keys = body.as_object().unwrap();

    assert!(keys.contains_key("username"));
    assert!(keys.contains_key("role"));
    assert!(keys.contains_key("status"));
    assert!(!keys.contains_key("password_hash"));
}
