use super::types::{TgResponse, TgUpdate};

#[test]
fn test_update_envelope_parses() {
    let json = r#"{
        "ok": true,
        "result": [{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "from": {"id": 12345, "first_name": "Ada", "username": "ada"},
                "chat": {"id": 12345, "type": "private"},
                "text": "/rules"
            }
        }]
    }"#;
    let body: TgResponse<Vec<TgUpdate>> = serde_json::from_str(json).unwrap();
    assert!(body.ok);
    let updates = body.result.unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].update_id, 42);
    let msg = updates[0].message.as_ref().unwrap();
    assert_eq!(msg.text.as_deref(), Some("/rules"));
    assert_eq!(msg.chat.chat_type, "private");
    assert_eq!(msg.from.as_ref().unwrap().id, 12345);
}

#[test]
fn test_error_envelope_parses() {
    let json = r#"{"ok": false, "description": "Unauthorized"}"#;
    let body: TgResponse<Vec<TgUpdate>> = serde_json::from_str(json).unwrap();
    assert!(!body.ok);
    assert_eq!(body.description.as_deref(), Some("Unauthorized"));
    assert!(body.result.is_none());
}

#[test]
fn test_non_text_update_tolerated() {
    // Sticker/photo updates arrive without `text`; the poll loop skips them.
    let json = r#"{
        "ok": true,
        "result": [{
            "update_id": 43,
            "message": {
                "message_id": 8,
                "chat": {"id": 12345, "type": "private"}
            }
        }]
    }"#;
    let body: TgResponse<Vec<TgUpdate>> = serde_json::from_str(json).unwrap();
    let updates = body.result.unwrap();
    assert!(updates[0].message.as_ref().unwrap().text.is_none());
}
