//! TCP control server: accept loop and per-session frame handling.
//!
//! Remote providers connect over TCP and send length-framed
//! [`BridgeMessage`]s.  Each connection gets its own Tokio task that:
//!
//! 1. reads the 24-byte header, then exactly `payload_len` payload bytes
//! 2. decodes the payload and dispatches it through the shared
//!    [`BridgeRegistry`]
//! 3. writes any reply (`BridgeOpened`, `BridgeOpenFailed`, `Pong`) back
//!
//! A session remembers the bridges it created.  Re-opening a token that is
//! already open answers `BridgeOpened` but does not transfer ownership.  When
//! the connection ends, for any reason, each owned bridge is cleared (all keys
//! up, all contacts lifted, synced) and then closed, so a dropped provider
//! never leaves a key held down on the host.
//!
//! Reply sequence numbers come from one counter shared by every session.
//!
//! # Error policy
//!
//! - Payload decode failures and dispatch failures are logged and the session
//!   continues; the framing is still intact.
//! - Header failures (bad version, unknown type, oversized payload) end the
//!   session, since the byte stream can no longer be trusted.
//! - EOF on a frame boundary is a clean close; EOF inside a header is a
//!   truncated frame and is reported as an error.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    net::{
        tcp::OwnedWriteHalf,
        TcpListener, TcpStream,
    },
    sync::Mutex,
    time::timeout,
};
use tracing::{debug, error, info, warn};
use tvremote_core::{
    encode_message,
    protocol::{current_timestamp_us, decode_header, decode_payload, SequenceCounter, HEADER_SIZE},
    BridgeMessage, BridgeToken, ProtocolError,
};

use crate::application::bridge_registry::{BridgeError, BridgeRegistry};

/// The registry as shared between sessions.
pub type SharedRegistry = Arc<Mutex<BridgeRegistry>>;

/// How often the accept loop rechecks the `running` flag.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// Errors that end a control session or the server.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to bind control listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Accepts provider connections and runs one session task per connection.
pub struct ControlServer {
    listener: TcpListener,
    registry: SharedRegistry,
    sequence: Arc<SequenceCounter>,
    max_payload_bytes: u32,
}

impl ControlServer {
    /// Binds the listener.  Use port 0 to let the OS pick one.
    pub async fn bind(
        addr: SocketAddr,
        registry: SharedRegistry,
        max_payload_bytes: u32,
    ) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| NetworkError::Bind { addr, source })?;
        Ok(Self {
            listener,
            registry,
            sequence: Arc::new(SequenceCounter::new()),
            max_payload_bytes,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until `running` is cleared.
    ///
    /// Sessions already in progress are left to finish on their own; bridges
    /// they still hold are closed by the caller via
    /// [`BridgeRegistry::close_all`].
    pub async fn serve(self, running: Arc<AtomicBool>) -> Result<(), NetworkError> {
        info!("control server listening on {}", self.local_addr()?);

        while running.load(Ordering::Relaxed) {
            match timeout(ACCEPT_POLL, self.listener.accept()).await {
                Ok(Ok((stream, peer))) => {
                    info!("provider connected from {peer}");
                    let session = Session::new(
                        peer,
                        Arc::clone(&self.registry),
                        Arc::clone(&self.sequence),
                        self.max_payload_bytes,
                    );
                    tokio::spawn(handle_session(stream, session));
                }
                Ok(Err(e)) => error!("accept error: {e}"),
                Err(_) => {} // poll timeout
            }
        }

        info!("shutdown flag set; control server stopped accepting");
        Ok(())
    }
}

// ── Per-session handling ──────────────────────────────────────────────────────

async fn handle_session(stream: TcpStream, mut session: Session) {
    let peer = session.peer;
    let outcome = session.run(stream).await;
    session.release_bridges().await;

    match outcome {
        Ok(()) => info!("session {peer} closed normally"),
        Err(e) => warn!("session {peer} closed with error: {e}"),
    }
}

struct Session {
    peer: SocketAddr,
    registry: SharedRegistry,
    max_payload_bytes: u32,
    owned: HashSet<BridgeToken>,
    sequence: Arc<SequenceCounter>,
}

impl Session {
    fn new(
        peer: SocketAddr,
        registry: SharedRegistry,
        sequence: Arc<SequenceCounter>,
        max_payload_bytes: u32,
    ) -> Self {
        Self {
            peer,
            registry,
            max_payload_bytes,
            owned: HashSet::new(),
            sequence,
        }
    }

    async fn run(&mut self, stream: TcpStream) -> Result<(), NetworkError> {
        let (mut reader, mut writer) = stream.into_split();

        while let Some(frame) = self.read_frame(&mut reader).await? {
            let message = match frame {
                Ok(message) => message,
                Err(e) => {
                    warn!("session {}: dropping undecodable frame: {e}", self.peer);
                    continue;
                }
            };

            if let Some(reply) = self.dispatch(&message).await {
                self.send(&mut writer, &reply).await?;
            }
        }
        Ok(())
    }

    /// Reads one frame.
    ///
    /// `Ok(None)` is a clean EOF on a frame boundary.  The inner `Result`
    /// carries payload decode errors, which do not end the session.
    async fn read_frame<R>(
        &self,
        reader: &mut R,
    ) -> Result<Option<Result<BridgeMessage, ProtocolError>>, NetworkError>
    where
        R: AsyncRead + Unpin,
    {
        let mut header_buf = [0u8; HEADER_SIZE];
        let mut filled = 0;
        while filled < HEADER_SIZE {
            let n = reader.read(&mut header_buf[filled..]).await?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                warn!(
                    "session {}: truncated frame, EOF after {filled} of {HEADER_SIZE} header bytes",
                    self.peer
                );
                return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
            }
            filled += n;
        }

        let header = decode_header(&header_buf)?;
        if header.payload_length > self.max_payload_bytes {
            return Err(ProtocolError::PayloadTooLarge {
                declared: header.payload_length as usize,
                max: self.max_payload_bytes as usize,
            }
            .into());
        }

        let mut payload = vec![0u8; header.payload_length as usize];
        reader.read_exact(&mut payload).await?;

        debug!(
            "session {}: frame {:?} seq={} len={}",
            self.peer, header.message_type, header.sequence_number, header.payload_length
        );
        Ok(Some(decode_payload(header.message_type, &payload)))
    }

    async fn dispatch(&mut self, message: &BridgeMessage) -> Option<BridgeMessage> {
        let (already_open, result) = {
            let mut registry = self.registry.lock().await;
            let already_open = match message {
                BridgeMessage::OpenBridge(open) => registry.is_open(open.token),
                _ => false,
            };
            (already_open, registry.dispatch(message))
        };

        match (&result, message) {
            (Ok(Some(BridgeMessage::BridgeOpened { token })), _) if !already_open => {
                self.owned.insert(*token);
            }
            (Ok(_), BridgeMessage::CloseBridge { token }) => {
                self.owned.remove(token);
            }
            _ => {}
        }

        match result {
            Ok(reply) => reply,
            Err(e @ BridgeError::UnknownBridge(_)) => {
                debug!("session {}: {e}", self.peer);
                None
            }
            Err(e) => {
                warn!(
                    "session {}: {:?} rejected: {e}",
                    self.peer,
                    message.message_type()
                );
                None
            }
        }
    }

    async fn send(
        &self,
        writer: &mut OwnedWriteHalf,
        reply: &BridgeMessage,
    ) -> Result<(), NetworkError> {
        let bytes = encode_message(reply, self.sequence.next(), current_timestamp_us())?;
        writer.write_all(&bytes).await?;
        Ok(())
    }

    /// Clears, then closes, every bridge this session opened.
    async fn release_bridges(&mut self) {
        if self.owned.is_empty() {
            return;
        }
        let mut registry = self.registry.lock().await;
        for token in self.owned.drain() {
            if let Err(e) = registry.clear(token) {
                debug!("session {}: clear of {token} skipped: {e}", self.peer);
            }
            match registry.close(token) {
                Ok(true) => info!("session {}: released bridge {token}", self.peer),
                Ok(false) => {}
                Err(e) => warn!("session {}: closing bridge {token} failed: {e}", self.peer),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
