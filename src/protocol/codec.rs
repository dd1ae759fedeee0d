//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - LIST:   empty
//! - READ:   id (UTF-8)
//! - CREATE: record JSON
//! - UPDATE: id_len (4 bytes) + id + record JSON
//! - DELETE: id (UTF-8)
//! - PING:   empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{RecipeError, Result};
use crate::record::Record;

use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let mut payload = BytesMut::new();

    match command {
        Command::List | Command::Ping => {}
        Command::Read { id } | Command::Delete { id } => {
            payload.put_slice(id.as_bytes());
        }
        Command::Create { record } => {
            payload.put_slice(&record.to_vec().map_err(RecipeError::Serialization)?);
        }
        Command::Update { id, record } => {
            payload.put_u32(id.len() as u32);
            payload.put_slice(id.as_bytes());
            payload.put_slice(&record.to_vec().map_err(RecipeError::Serialization)?);
        }
    }

    Ok(frame(command.command_type() as u8, &payload))
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    let cmd_type = CommandType::from_u8(cmd_type).ok_or_else(|| {
        RecipeError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_type))
    })?;

    match cmd_type {
        CommandType::List => expect_empty(payload, "LIST").map(|_| Command::List),
        CommandType::Ping => expect_empty(payload, "PING").map(|_| Command::Ping),
        CommandType::Read => Ok(Command::Read {
            id: decode_id(payload, "READ")?,
        }),
        CommandType::Delete => Ok(Command::Delete {
            id: decode_id(payload, "DELETE")?,
        }),
        CommandType::Create => Ok(Command::Create {
            record: decode_record(payload, "CREATE")?,
        }),
        CommandType::Update => decode_update_command(payload),
    }
}

/// Decode UPDATE command payload
fn decode_update_command(mut payload: &[u8]) -> Result<Command> {
    if payload.len() < 4 {
        return Err(RecipeError::Protocol(
            "UPDATE command: missing id length".to_string(),
        ));
    }

    let id_len = payload.get_u32() as usize;
    if payload.len() < id_len {
        return Err(RecipeError::Protocol(format!(
            "UPDATE command: incomplete id (expected {}, got {})",
            id_len,
            payload.len()
        )));
    }

    let (id_bytes, body) = payload.split_at(id_len);
    Ok(Command::Update {
        id: decode_id(id_bytes, "UPDATE")?,
        record: decode_record(body, "UPDATE")?,
    })
}

fn decode_id(bytes: &[u8], name: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| RecipeError::Protocol(format!("{} command: id is not valid UTF-8", name)))
}

fn decode_record(bytes: &[u8], name: &str) -> Result<Record> {
    Record::from_slice(bytes)
        .map_err(|e| RecipeError::Protocol(format!("{} command: invalid record: {}", name, e)))
}

fn expect_empty(payload: &[u8], name: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(RecipeError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    frame(response.status as u8, response.payload.as_deref().unwrap_or(&[]))
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        RecipeError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    Ok(Response {
        status,
        payload: (!payload.is_empty()).then(|| payload.to_vec()),
    })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(kind);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate a complete frame and split it into (kind, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(RecipeError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let kind = header.get_u8();
    let payload_len = header.get_u32();
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(RecipeError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(payload_len: u32) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(RecipeError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame (header + payload) from a stream
///
/// Blocks until the frame is received. Only the framing is checked, so a
/// frame whose payload later fails to decode leaves the stream in sync.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut len_bytes = &header[1..];
    let payload_len = len_bytes.get_u32();
    check_payload_len(payload_len)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len as usize];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
