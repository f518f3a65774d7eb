use crate::cli::{Args, Command};
use crate::commands::{guess_image_mime, profile_changes};

use std::path::Path;

use clap::Parser;
use serde_json::json;

#[test]
fn given_typed_and_plain_values_when_building_profile_changes_then_json_types_are_kept() {
    // GIVEN: Mixed field values
    let fields = vec![
        (String::from("bio"), String::from("Investigadora")),
        (String::from("phone"), String::from("\"5550100\"")),
        (String::from("newsletter"), String::from("true")),
    ];

    // WHEN: Converting
    let changes = profile_changes(fields);

    // THEN: Plain text stays text, JSON literals keep their type
    assert_eq!(changes["bio"], json!("Investigadora"));
    assert_eq!(changes["phone"], json!("5550100"));
    assert_eq!(changes["newsletter"], json!(true));
}

#[test]
fn given_profile_command_when_parsing_then_fields_are_split_on_first_equals() {
    let args = Args::try_parse_from([
        "portal",
        "profile",
        "--field",
        "bio=a=b",
        "-f",
        "organization=UNAM",
    ])
    .expect("valid args");

    match args.command {
        Command::Profile { fields } => assert_eq!(
            fields,
            vec![
                (String::from("bio"), String::from("a=b")),
                (String::from("organization"), String::from("UNAM")),
            ]
        ),
        other => panic!("Expected profile command, got {other:?}"),
    }
}

#[test]
fn given_field_without_equals_when_parsing_then_rejected() {
    let result = Args::try_parse_from(["portal", "profile", "--field", "bio"]);

    assert!(result.is_err());
}

#[test]
fn given_config_command_when_parsing_then_options_are_optional() {
    let args = Args::try_parse_from(["portal", "config", "--timeout-secs", "30"]).expect("valid args");

    match args.command {
        Command::Config {
            api_url,
            timeout_secs,
        } => {
            assert_eq!(api_url, None);
            assert_eq!(timeout_secs, Some(30));
        }
        other => panic!("Expected config command, got {other:?}"),
    }
}

#[test]
fn given_image_extensions_when_guessing_mime_then_known_types_resolve() {
    assert_eq!(guess_image_mime(Path::new("me.PNG")), Some("image/png"));
    assert_eq!(guess_image_mime(Path::new("me.jpeg")), Some("image/jpeg"));
    assert_eq!(guess_image_mime(Path::new("notes.txt")), None);
    assert_eq!(guess_image_mime(Path::new("no-extension")), None);
}
