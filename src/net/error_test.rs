use super::*;

#[test]
fn detail_string_is_returned_verbatim() {
    assert_eq!(error_message(400, br#"{"detail": "X"}"#), "X");
    assert_eq!(error_message(500, "{\"detail\": \"账号或密码错误\"}".as_bytes()), "账号或密码错误");
}

#[test]
fn malformed_body_falls_back_to_status() {
    assert_eq!(error_message(502, b"<html>bad gateway</html>"), "request failed: 502");
    assert_eq!(error_message(404, b""), "request failed: 404");
}

#[test]
fn json_without_known_fields_falls_back_to_status() {
    assert_eq!(error_message(418, br#"{"error": 1}"#), "request failed: 418");
    assert_eq!(error_message(400, br#"["detail"]"#), "request failed: 400");
    assert_eq!(error_message(400, br#"{"detail": ""}"#), "request failed: 400");
}

#[test]
fn message_field_used_when_detail_missing() {
    assert_eq!(error_message(409, br#"{"message": "conflict"}"#), "conflict");
}

#[test]
fn validation_detail_array_joins_messages() {
    let body = br#"{"detail": [{"loc": ["body", "account"], "msg": "field required"}, {"msg": "too short"}]}"#;
    assert_eq!(error_message(422, body), "field required; too short");
}

#[test]
fn request_failed_displays_bare_message() {
    let err = ApiError::RequestFailed { status: 401, message: "nope".to_owned() };
    assert_eq!(err.to_string(), "nope");
    assert_eq!(err.status(), Some(401));
}

#[test]
fn transport_error_has_no_status() {
    let err = ApiError::Transport("connection refused".to_owned());
    assert_eq!(err.status(), None);
    assert!(err.to_string().contains("connection refused"));
}
