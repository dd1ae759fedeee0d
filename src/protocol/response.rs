//! Response definitions
//!
//! Represents responses to clients.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::error::{RecipeError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    Created = 0x01,
    NoContent = 0x02,
    BadRequest = 0x03,
    NotFound = 0x04,
    Error = 0x05,
}

impl Status {
    /// Parse a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::Created),
            0x02 => Some(Status::NoContent),
            0x03 => Some(Status::BadRequest),
            0x04 => Some(Status::NotFound),
            0x05 => Some(Status::Error),
            _ => None,
        }
    }

    /// HTTP status code with the same meaning
    pub fn http_code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::Error => 500,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Ok | Status::Created | Status::NoContent)
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (JSON body, or `{"error": ..}` for failures)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(status: Status, body: &T) -> Result<Self> {
        let payload = serde_json::to_vec(body).map_err(RecipeError::Serialization)?;
        Ok(Self {
            status,
            payload: Some(payload),
        })
    }

    /// Create a CREATED response carrying `{"id": id}`
    pub fn created(id: &str) -> Self {
        Self {
            status: Status::Created,
            payload: Some(json!({ "id": id }).to_string().into_bytes()),
        }
    }

    /// Create a NO_CONTENT response
    pub fn no_content() -> Self {
        Self {
            status: Status::NoContent,
            payload: None,
        }
    }

    /// Create a failure response with an `{"error": message}` body
    pub fn failure(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(json!({ "error": message }).to_string().into_bytes()),
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: &str) -> Self {
        Self::failure(Status::NotFound, message)
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request(message: &str) -> Self {
        Self::failure(Status::BadRequest, message)
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self::failure(Status::Error, message)
    }

    /// Translate an error into the response a client should see
    pub fn from_error(err: &RecipeError) -> Self {
        Self::failure(err.status(), &err.to_string())
    }

    /// Decode the payload as JSON
    pub fn body<T: DeserializeOwned>(&self) -> Result<T> {
        let payload = self.payload.as_deref().unwrap_or(b"null");
        serde_json::from_slice(payload)
            .map_err(|e| RecipeError::Protocol(format!("unexpected response body: {}", e)))
    }

    /// The `error` field of a failure body, if any
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = self.body().ok()?;
        value.get("error")?.as_str().map(str::to_string)
    }
}
