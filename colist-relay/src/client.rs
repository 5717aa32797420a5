//! Blocking connection to a running relay, for synchronous peers.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use colist_core::protocol::encode_frame;
use colist_core::{ClientEvent, ServerEvent};

use crate::error::{io_err, RelayError};

pub struct PeerConnection {
    addr: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    /// Partial frame carried over a read timeout, kept as raw bytes so a
    /// timeout inside a multi-byte character loses nothing.
    pending: Vec<u8>,
}

impl PeerConnection {
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self, RelayError> {
        let not_running = || RelayError::RelayNotRunning {
            addr: addr.to_string(),
        };
        let target = addr
            .to_socket_addrs()
            .map_err(|e| io_err(addr, e))?
            .next()
            .ok_or_else(not_running)?;

        let stream = TcpStream::connect_timeout(&target, timeout).map_err(|err| {
            if matches!(
                err.kind(),
                ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset | ErrorKind::TimedOut
            ) {
                not_running()
            } else {
                io_err(addr, err)
            }
        })?;
        let _ = stream.set_nodelay(true);
        let reader = BufReader::new(stream.try_clone().map_err(|e| io_err(addr, e))?);
        Ok(Self {
            addr: addr.to_string(),
            stream,
            reader,
            pending: Vec::new(),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Write one frame. Takes `&self` so senders can share the connection.
    pub fn send(&self, event: &ClientEvent) -> Result<(), RelayError> {
        let frame = encode_frame(event)?;
        let mut stream = &self.stream;
        stream
            .write_all(frame.as_bytes())
            .map_err(|e| io_err(&self.addr, e))?;
        stream.flush().map_err(|e| io_err(&self.addr, e))?;
        Ok(())
    }

    /// Next event from the relay, or `None` once `timeout` passes without one.
    /// Unreadable frames are logged and skipped.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<ServerEvent>, RelayError> {
        self.read_event(Some(timeout))
    }

    /// Block until the relay sends an event.
    pub fn recv(&mut self) -> Result<ServerEvent, RelayError> {
        self.read_event(None)?
            .ok_or_else(|| RelayError::Protocol("read returned without a frame".to_string()))
    }

    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<ServerEvent>, RelayError> {
        self.stream
            .set_read_timeout(timeout)
            .map_err(|e| io_err(&self.addr, e))?;
        loop {
            match self.reader.read_until(b'\n', &mut self.pending) {
                Ok(0) => {
                    return Err(RelayError::Protocol(
                        "relay closed the connection".to_string(),
                    ))
                }
                Ok(_) if self.pending.last() != Some(&b'\n') => continue,
                Ok(_) => {
                    let frame = std::mem::take(&mut self.pending);
                    if frame.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    match serde_json::from_slice(&frame) {
                        Ok(event) => return Ok(Some(event)),
                        Err(err) => {
                            tracing::warn!(error = %err, "unreadable relay frame skipped");
                        }
                    }
                }
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(None)
                }
                Err(err) => return Err(io_err(&self.addr, err)),
            }
        }
    }
}
