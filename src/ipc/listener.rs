//! Loopback TCP [`CommandSource`] implementation.
//!
//! Binds a TCP socket (normally on `127.0.0.1`) and accepts one connection
//! at a time.  Each line received is parsed as a JSON-encoded [`Command`];
//! the [`Reply`] is written back as one line of JSON.
//!
//! # Wire format
//!
//! Requests and replies are single lines of JSON followed by `\n`:
//!
//! ```json
//! → {"ApplyWindowLayout":{"title":"client","width":480,"height":344}}
//! ← {"Placed":{"count":4,"message":"arranged 4 window(s)"}}
//! → "GetTrackedWindows"
//! ← {"Windows":[{"order":1,"title":"client","handle":6700,"x":0,"y":0,"has_caption":false,"has_border":true}]}
//! → not json
//! ← {"Error":{"kind":"InvalidArgument","message":"malformed command: ..."}}
//! ```

use crate::command::{Command, Reply, Request};
use crate::error::ErrorKind;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a TCP socket for JSON-encoded
/// commands.
///
/// Each accepted connection can send multiple newline-delimited commands
/// and receives one reply line per command, in order.  When the connection
/// closes, the listener waits for the next one.
pub struct TcpCommandListener {
    listener: TcpListener,
}

/// Errors produced by the TCP listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What to do after a connection ends.
enum Next {
    Accept,
    Shutdown,
}

impl TcpCommandListener {
    /// Bind to `addr` immediately so a busy port is reported at startup.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener })
    }

    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        Ok(self.listener.local_addr()?)
    }

    fn serve(&self, stream: TcpStream, sink: &mpsc::Sender<Request>) -> Result<Next, ListenerError> {
        let mut writer = stream.try_clone()?;
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            let text = line?;
            if text.trim().is_empty() {
                continue;
            }

            let reply = match serde_json::from_str::<Command>(&text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    let (req, rx) = Request::new(cmd);
                    if sink.send(req).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(Next::Shutdown);
                    }
                    match rx.recv() {
                        Ok(reply) => reply,
                        Err(_) => {
                            info!("request dropped without reply, shutting down");
                            return Ok(Next::Shutdown);
                        }
                    }
                }
                Err(e) => {
                    warn!("bad command: {}: {}", text, e);
                    Reply::Error {
                        kind: ErrorKind::InvalidArgument,
                        message: format!("malformed command: {}", e),
                    }
                }
            };

            let mut encoded = serde_json::to_string(&reply)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes())?;
            writer.flush()?;
        }
        Ok(Next::Accept)
    }
}

impl CommandSource for TcpCommandListener {
    type Error = ListenerError;

    /// Accept connections and forward their commands.
    ///
    /// This method **blocks** until the sink is closed.  Run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        info!("listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| "?".into());
                    debug!("client {} connected", peer);
                    match self.serve(stream, &sink) {
                        Ok(Next::Accept) => debug!("client {} disconnected", peer),
                        Ok(Next::Shutdown) => return Ok(()),
                        Err(e) => error!("client {}: {}", peer, e),
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

//  Tests
