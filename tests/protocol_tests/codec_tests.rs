//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::Cursor;

use recipebox::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command, read_frame,
    read_response, write_command, write_response, Command, Response, Status, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
use recipebox::{Record, RecipeError};
use serde_json::json;

fn cake() -> Record {
    Record::new("Cake")
        .with_field("serves", 8)
        .with_field("tags", json!(["sweet", "baked"]))
}

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_every_command() {
    let commands = vec![
        Command::List,
        Command::Read {
            id: "cake".to_string(),
        },
        Command::Create { record: cake() },
        Command::Update {
            id: "1cake".to_string(),
            record: cake(),
        },
        Command::Delete {
            id: "cake".to_string(),
        },
        Command::Ping,
    ];

    for command in commands {
        let encoded = encode_command(&command).unwrap();
        assert_eq!(decode_command(&encoded).unwrap(), command);
    }
}

#[test]
fn test_command_header_layout() {
    let encoded = encode_command(&Command::Read {
        id: "pie".to_string(),
    })
    .unwrap();

    assert_eq!(encoded[0], 0x02);
    assert_eq!(&encoded[1..5], &3u32.to_be_bytes());
    assert_eq!(&encoded[HEADER_SIZE..], b"pie");
}

#[test]
fn test_update_payload_layout() {
    let encoded = encode_command(&Command::Update {
        id: "pie".to_string(),
        record: Record::new("Pie"),
    })
    .unwrap();

    let payload = &encoded[HEADER_SIZE..];
    assert_eq!(&payload[..4], &3u32.to_be_bytes());
    assert_eq!(&payload[4..7], b"pie");
    assert_eq!(&payload[7..], br#"{"title":"Pie"}"#);
}

#[test]
fn test_decode_keeps_invalid_ids_for_the_engine_to_reject() {
    // Grammar checks belong to the store; the codec only needs UTF-8
    let encoded = encode_command(&Command::Delete {
        id: "../etc".to_string(),
    })
    .unwrap();

    assert_eq!(
        decode_command(&encoded).unwrap(),
        Command::Delete {
            id: "../etc".to_string()
        }
    );
}

#[test]
fn test_decode_unknown_command_type() {
    let bytes = [0x7f, 0, 0, 0, 0];

    assert!(matches!(decode_command(&bytes), Err(RecipeError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_header() {
    assert!(matches!(decode_command(&[0x01, 0, 0]), Err(RecipeError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_payload() {
    let mut bytes = encode_command(&Command::Read {
        id: "chocolate".to_string(),
    })
    .unwrap();
    bytes.truncate(bytes.len() - 2);

    assert!(matches!(decode_command(&bytes), Err(RecipeError::Protocol(_))));
}

#[test]
fn test_decode_payload_too_large() {
    let mut bytes = vec![0x02];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    assert!(matches!(decode_command(&bytes), Err(RecipeError::Protocol(_))));
}

#[test]
fn test_decode_create_with_invalid_json() {
    let mut bytes = vec![0x03];
    bytes.extend_from_slice(&5u32.to_be_bytes());
    bytes.extend_from_slice(b"{{{{{");

    assert!(matches!(decode_command(&bytes), Err(RecipeError::Protocol(_))));
}

#[test]
fn test_decode_create_without_title() {
    let body = br#"{"name":"Cake"}"#;
    let mut bytes = vec![0x03];
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);

    let err = decode_command(&bytes).unwrap_err();
    assert!(matches!(err, RecipeError::Protocol(_)));
    assert_eq!(err.status(), Status::BadRequest);
}

#[test]
fn test_decode_update_with_short_id() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&50u32.to_be_bytes());
    payload.extend_from_slice(b"pie");
    let mut bytes = vec![0x04];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(matches!(decode_command(&bytes), Err(RecipeError::Protocol(_))));
}

#[test]
fn test_decode_ping_with_payload() {
    let bytes = [0x06, 0, 0, 0, 1, b'x'];

    assert!(matches!(decode_command(&bytes), Err(RecipeError::Protocol(_))));
}

#[test]
fn test_decode_non_utf8_id() {
    let bytes = [0x02, 0, 0, 0, 2, 0xff, 0xfe];

    assert!(matches!(decode_command(&bytes), Err(RecipeError::Protocol(_))));
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_responses() {
    let responses = vec![
        Response::ok(Some(b"{}".to_vec())),
        Response::created("cake"),
        Response::no_content(),
        Response::bad_request("bad id"),
        Response::not_found("ghost"),
        Response::error("disk on fire"),
    ];

    for response in responses {
        let encoded = encode_response(&response);
        assert_eq!(decode_response(&encoded).unwrap(), response);
    }
}

#[test]
fn test_status_http_codes() {
    assert_eq!(Status::Ok.http_code(), 200);
    assert_eq!(Status::Created.http_code(), 201);
    assert_eq!(Status::NoContent.http_code(), 204);
    assert_eq!(Status::BadRequest.http_code(), 400);
    assert_eq!(Status::NotFound.http_code(), 404);
    assert_eq!(Status::Error.http_code(), 500);
}

#[test]
fn test_error_body_shape() {
    let response = Response::not_found("Item does not exist: ghost");

    let body: serde_json::Value = response.body().unwrap();
    assert_eq!(body, json!({ "error": "Item does not exist: ghost" }));
    assert_eq!(
        response.error_message().as_deref(),
        Some("Item does not exist: ghost")
    );
}

#[test]
fn test_decode_unknown_status() {
    assert!(matches!(
        decode_response(&[0x42, 0, 0, 0, 0]),
        Err(RecipeError::Protocol(_))
    ));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_commands_in_sequence() {
    let mut buffer = Vec::new();
    write_command(&mut buffer, &Command::Create { record: cake() }).unwrap();
    write_command(&mut buffer, &Command::List).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(
        read_command(&mut cursor).unwrap(),
        Command::Create { record: cake() }
    );
    assert_eq!(read_command(&mut cursor).unwrap(), Command::List);
}

#[test]
fn test_stream_response() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::created("pie")).unwrap();

    let response = read_response(&mut Cursor::new(buffer)).unwrap();
    assert_eq!(response, Response::created("pie"));
}

#[test]
fn test_read_frame_keeps_stream_in_sync_after_bad_body() {
    let mut buffer = vec![0x03];
    buffer.extend_from_slice(&3u32.to_be_bytes());
    buffer.extend_from_slice(b"???");
    write_command(&mut buffer, &Command::Ping).unwrap();

    let mut cursor = Cursor::new(buffer);
    let bad = read_frame(&mut cursor).unwrap();
    assert!(decode_command(&bad).is_err());
    assert_eq!(read_command(&mut cursor).unwrap(), Command::Ping);
}

#[test]
fn test_read_from_empty_stream_is_eof() {
    let result = read_command(&mut Cursor::new(Vec::new()));

    match result {
        Err(RecipeError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected EOF, got {:?}", other),
    }
}
