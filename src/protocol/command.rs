//! Command definitions
//!
//! Represents requests from clients.

use crate::record::Record;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    List = 0x01,
    Read = 0x02,
    Create = 0x03,
    Update = 0x04,
    Delete = 0x05,
    Ping = 0x06,
}

impl CommandType {
    /// Parse a command type byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::List),
            0x02 => Some(CommandType::Read),
            0x03 => Some(CommandType::Create),
            0x04 => Some(CommandType::Update),
            0x05 => Some(CommandType::Delete),
            0x06 => Some(CommandType::Ping),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Full index listing
    List,

    /// Fetch one record
    Read { id: String },

    /// Store a new record under a freshly allocated id
    Create { record: Record },

    /// Replace an existing record
    Update { id: String, record: Record },

    /// Remove a record
    Delete { id: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List => CommandType::List,
            Command::Read { .. } => CommandType::Read,
            Command::Create { .. } => CommandType::Create,
            Command::Update { .. } => CommandType::Update,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
        }
    }
}
