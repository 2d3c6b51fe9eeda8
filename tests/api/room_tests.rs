//! Room API Tests
//!
//! Request validation and response shaping for the room endpoints.

use chrono::Utc;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use test_case::test_case;
use uuid::Uuid;
use validator::Validate;

use gameconnecting::application::dto::request::{CreateRoomRequest, UpdateRoomRequest};
use gameconnecting::application::dto::response::RoomResponse;
use gameconnecting::domain::{RoomSummary, RoomType};

#[test]
fn test_create_room_accepts_valid_payload() {
    let request = CreateRoomRequest {
        name: "Weekend Raid".to_string(),
        description: Some(Sentence(3..8).fake()),
        room_type: Some("private".to_string()),
    };

    assert!(request.validate().is_ok());
}

#[test_case(2 ; "name below minimum length")]
#[test_case(101 ; "name above maximum length")]
fn test_create_room_rejects_bad_name_length(len: usize) {
    let request = CreateRoomRequest {
        name: "r".repeat(len),
        description: None,
        room_type: None,
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("name"));
}

#[test]
fn test_create_room_rejects_oversized_description() {
    let request = CreateRoomRequest {
        name: "Weekend Raid".to_string(),
        description: Some("d".repeat(1001)),
        room_type: None,
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("description"));
}

#[test]
fn test_update_room_allows_partial_payload() {
    let request = UpdateRoomRequest {
        name: None,
        description: None,
    };

    assert!(request.validate().is_ok());
}

#[test]
fn test_update_room_still_checks_provided_name() {
    let request = UpdateRoomRequest {
        name: Some("ab".to_string()),
        description: None,
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("name"));
}

/// Ids are rendered as strings so JavaScript clients keep full precision
#[test]
fn test_room_response_renders_ids_as_strings() {
    let now = Utc::now();
    let creator = Uuid::new_v4();
    let summary = RoomSummary {
        id: 9_007_199_254_740_993,
        name: "Weekend Raid".to_string(),
        description: None,
        room_type: RoomType::Public,
        creator_id: creator,
        creator_username: "raid_lead".to_string(),
        member_count: 4,
        last_active_at: now,
        created_at: now,
    };

    let body = serde_json::to_value(RoomResponse::from(summary)).unwrap();

    assert_eq!(body["id"], "9007199254740993");
    assert_eq!(body["creator_id"], creator.to_string());
    assert_eq!(body["room_type"], "public");
}
