use crate::RedactedToken;

/// **VALUE**: Verifies that token values never appear in Debug or Display output.
///
/// **WHY THIS MATTERS**: Session state and errors are logged freely. A `{:?}` on a
/// session snapshot must not write a live bearer token to the log file.
#[test]
fn given_token_when_formatted_then_value_is_hidden() {
    // GIVEN: A token with a recognisable value
    let token = RedactedToken::new("secret-access-token");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{token:?}");
    let display = format!("{token}");

    // THEN: Neither contains the raw value
    assert!(!debug.contains("secret-access-token"));
    assert!(!display.contains("secret-access-token"));
    assert_eq!(token.len(), "secret-access-token".len());
}

#[test]
fn given_token_when_bearer_called_then_formats_authorization_value() {
    let token = RedactedToken::from("A1");

    assert_eq!(token.bearer(), "Bearer A1");
    assert_eq!(token.as_str(), "A1");
}

/// **BUG THIS CATCHES**: Would catch someone deriving `Serialize` on the wrapper, which
/// would let tokens leak into config or log JSON.
#[test]
fn given_token_when_serialized_then_returns_error() {
    let token = RedactedToken::new("R1");

    let result = serde_json::to_string(&token);

    assert!(result.is_err(), "Serializing a token must fail");
}
