use crate::User;

use serde_json::{Map, Value, json};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// **VALUE**: Verifies the shallow merge used after profile and avatar updates.
///
/// **WHY THIS MATTERS**: The profile endpoint only echoes the editable fields. A merge
/// that replaced the whole record would wipe `id`, `email` and the verification flag.
#[test]
fn given_partial_profile_when_merged_then_only_patched_fields_change() {
    // GIVEN: A fully populated user
    let mut user: User = serde_json::from_value(json!({
        "id": 7,
        "username": "ana",
        "email": "ana@example.com",
        "first_name": "Ana",
        "bio": "old bio",
        "is_verified": true
    }))
    .expect("valid user");

    // WHEN: Merging a partial profile response
    let patch = object(json!({ "bio": "new bio", "phone": "555-0100" }));
    user.merge(&patch).expect("merge succeeds");

    // THEN: Patched fields change, the rest survive
    assert_eq!(user.bio.as_deref(), Some("new bio"));
    assert_eq!(user.phone.as_deref(), Some("555-0100"));
    assert_eq!(user.id, 7);
    assert_eq!(user.email.as_deref(), Some("ana@example.com"));
    assert_eq!(user.is_verified, Some(true));
}

#[test]
fn given_unknown_server_fields_when_merged_then_kept_in_extra() {
    // GIVEN: A user the server decorated with a field we do not model
    let mut user: User =
        serde_json::from_value(json!({ "id": 1, "badge": "founder" })).expect("valid user");

    // WHEN: Merging an avatar update
    user.merge(&object(json!({ "avatar": "/media/avatars/1.png" })))
        .expect("merge succeeds");

    // THEN: Both the unknown field and the avatar are present
    assert_eq!(user.extra.get("badge"), Some(&json!("founder")));
    assert_eq!(user.avatar.as_deref(), Some("/media/avatars/1.png"));
}

/// **BUG THIS CATCHES**: A failed merge must not leave a half-updated record behind.
#[test]
fn given_patch_with_invalid_id_when_merged_then_errors_and_user_unchanged() {
    let mut user = User::with_id(3);
    let before = user.clone();

    let result = user.merge(&object(json!({ "id": "not-a-number" })));

    assert!(result.is_err());
    assert_eq!(user, before);
}

#[test]
fn given_names_when_display_name_then_prefers_full_name_over_username() {
    let mut user = User::with_id(9);
    assert_eq!(user.display_name(), "user #9");

    user.username = Some(String::from("jdoe"));
    assert_eq!(user.display_name(), "jdoe");

    user.first_name = Some(String::from("Jane"));
    user.last_name = Some(String::from("Doe"));
    assert_eq!(user.display_name(), "Jane Doe");
}
