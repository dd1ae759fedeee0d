//! Blocking client
//!
//! One request, one response, in order, over a single TCP connection.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{read_response, write_command, Command, Response};
use crate::record::Record;

/// Client for a RecipeBox server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Limit how long a response may take
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send any command and wait for its response
    pub fn send(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    pub fn list(&mut self) -> Result<Response> {
        self.send(&Command::List)
    }

    pub fn read(&mut self, id: &str) -> Result<Response> {
        self.send(&Command::Read { id: id.to_string() })
    }

    pub fn create(&mut self, record: Record) -> Result<Response> {
        self.send(&Command::Create { record })
    }

    pub fn update(&mut self, id: &str, record: Record) -> Result<Response> {
        self.send(&Command::Update {
            id: id.to_string(),
            record,
        })
    }

    pub fn delete(&mut self, id: &str) -> Result<Response> {
        self.send(&Command::Delete { id: id.to_string() })
    }

    pub fn ping(&mut self) -> Result<Response> {
        self.send(&Command::Ping)
    }
}
