//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Binary framing, JSON bodies)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: LIST    - Payload: empty
//! - 0x02: READ    - Payload: id
//! - 0x03: CREATE  - Payload: record JSON
//! - 0x04: UPDATE  - Payload: id_len (4) + id + record JSON
//! - 0x05: DELETE  - Payload: id
//! - 0x06: PING    - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes (HTTP equivalent)
//! - 0x00: OK           (200)
//! - 0x01: CREATED      (201)
//! - 0x02: NO_CONTENT   (204)
//! - 0x03: BAD_REQUEST  (400)
//! - 0x04: NOT_FOUND    (404)
//! - 0x05: ERROR        (500)

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command, read_frame,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
