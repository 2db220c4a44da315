use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use owo_colors::OwoColorize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info};

use lodestone_proto::codec::{CipherContext, CipherKey, ReadableCodec, WritableCodec};
use lodestone_proto::io::VarInt;
use lodestone_proto::packet::serverbound::{Handshake, HandshakeMapping};
use lodestone_proto::packet::{clientbound, Clientbound, Serverbound};
use lodestone_proto::state::ProtocolState;

use crate::error::NetError;

pub const DEFAULT_PORT: u16 = 25565;

/// Wire protocol version sent in the handshake. 4 corresponds to game
/// version 1.7.2.
pub const PROTOCOL_VERSION: i32 = 4;

const READ_CHUNK_LEN: usize = 4096;

struct WriteEnd {
    sink: OwnedWriteHalf,
    codec: WritableCodec,
    scratch: Vec<u8>,
}

struct Shared {
    state: AtomicU8,
    write: Mutex<WriteEnd>,
}

impl Shared {
    fn state(&self) -> ProtocolState {
        // The cell only ever holds values stored from a ProtocolState.
        ProtocolState::from_u8(self.state.load(Ordering::Acquire)).unwrap()
    }

    async fn send(&self, packet: &Serverbound) -> Result<(), NetError> {
        let state = self.state();
        if packet.state() != state {
            return Err(NetError::Protocol(format!(
                "packet {} belongs to {} state, connection is in {}",
                packet.name(),
                packet.state(),
                state,
            )));
        }

        let mut write = self.write.lock().await;
        let write = &mut *write;

        write.scratch.clear();
        write.codec.write(packet, &mut write.scratch).map_err(NetError::Codec)?;
        write.sink.write_all(&write.scratch).await?;

        debug!("sent {} ({:#04x})", packet.name(), packet.id().0);

        Ok(())
    }
}

/// A cloneable handle onto the outbound half of a connection. Every frame
/// goes out under the shared writer lock, so packets sent from concurrent
/// tasks never interleave on the wire.
#[derive(Clone)]
pub struct PacketSender {
    shared: Arc<Shared>,
}

impl PacketSender {
    pub fn state(&self) -> ProtocolState {
        self.shared.state()
    }

    pub async fn send(&self, packet: Serverbound) -> Result<(), NetError> {
        self.shared.send(&packet).await
    }
}

/// One protocol connection: the socket, the current connection state and
/// the codecs of both directions. The inbound side belongs exclusively to
/// the task that owns this value; the outbound side is shared through
/// [`PacketSender`] handles.
pub struct Connection {
    host: String,
    port: u16,
    reader: OwnedReadHalf,
    codec: ReadableCodec,
    chunk: Vec<u8>,
    shared: Arc<Shared>,
}

impl Connection {
    /// Opens a TCP connection to `host[:port]`, defaulting to port 25565.
    /// The connection starts in the handshake state with plaintext codecs.
    pub async fn dial(addr: &str) -> Result<Self, NetError> {
        let (host, port) = split_addr(addr)?;

        let stream = TcpStream::connect((host.as_str(), port)).await?;
        stream.set_nodelay(true)?;

        info!(
            "Connected to {}",
            format!("{}:{}", host, port).cyan().underline()
        );

        let (reader, sink) = stream.into_split();

        Ok(Self {
            host,
            port,
            reader,
            codec: ReadableCodec::new(),
            chunk: vec![0; READ_CHUNK_LEN],
            shared: Arc::new(Shared {
                state: AtomicU8::new(ProtocolState::Handshake as u8),
                write: Mutex::new(WriteEnd {
                    sink,
                    codec: WritableCodec::new(),
                    scratch: Vec::new(),
                }),
            }),
        })
    }

    pub fn state(&self) -> ProtocolState {
        self.shared.state()
    }

    pub(crate) fn set_state(&self, state: ProtocolState) {
        self.shared.state.store(state as u8, Ordering::Release);
    }

    pub fn sender(&self) -> PacketSender {
        PacketSender {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Encodes and flushes one packet. Fails with a protocol error, writing
    /// nothing, when the packet does not belong to the current state.
    pub async fn send(&self, packet: Serverbound) -> Result<(), NetError> {
        self.shared.send(&packet).await
    }

    /// Sends the handshake packet and advances into the requested state,
    /// which must be status or login.
    pub async fn handshake(&mut self, next: ProtocolState) -> Result<(), NetError> {
        let Some(next_state) = next.next_state() else {
            return Err(NetError::Protocol(format!(
                "cannot handshake into {} state",
                next
            )));
        };

        self.send(Serverbound::Handshake(HandshakeMapping::Handshake(Handshake {
            protocol_version: VarInt(PROTOCOL_VERSION),
            server_address: self.host.clone(),
            server_port: self.port,
            next_state,
        })))
        .await?;

        self.set_state(next);

        Ok(())
    }

    /// Blocks until one whole frame has arrived and decodes it against the
    /// registry of the current state. A frame whose body fails to decode is
    /// still consumed whole, so the stream stays aligned.
    pub async fn recv(&mut self) -> Result<Clientbound, NetError> {
        loop {
            let state = self.state();

            let frame = match state {
                ProtocolState::Handshake => {
                    return Err(NetError::Protocol(
                        "no clientbound packets exist in handshake state".to_owned(),
                    ));
                }
                ProtocolState::Status => self
                    .codec
                    .next::<clientbound::StatusMapping>()
                    .map(|packet| packet.map(Clientbound::Status)),
                ProtocolState::Login => self
                    .codec
                    .next::<clientbound::LoginMapping>()
                    .map(|packet| packet.map(Clientbound::Login)),
                ProtocolState::Play => self
                    .codec
                    .next::<clientbound::PlayMapping>()
                    .map(|packet| packet.map(Clientbound::Play)),
            };

            match frame {
                Ok(Some(packet)) => {
                    debug!("recv {} ({:#04x})", packet.name(), packet.id().0);

                    return Ok(packet);
                }
                Ok(None) => {
                    let n = self.reader.read(&mut self.chunk).await?;
                    if n == 0 {
                        return Err(if self.codec.buf().is_empty() {
                            NetError::Closed
                        } else {
                            NetError::TruncatedFrame
                        });
                    }

                    self.codec.append(&self.chunk[..n]);
                }
                Err(e) => return Err(NetError::from_decode(state, e)),
            }
        }
    }

    /// Installs the AES/CFB8 overlay on both directions, with `secret`
    /// serving as key and IV. Call exactly once, after the encryption
    /// response went out and before the next inbound byte is consumed.
    pub async fn install_crypto(&mut self, secret: CipherKey) {
        self.codec.enable_encryption(CipherContext::new(secret));
        self.shared
            .write
            .lock()
            .await
            .codec
            .enable_encryption(CipherContext::new(secret));
    }

    /// The steady-state receive loop: every decoded packet is handed to
    /// `handler` together with a sender for responses. Exits on the first
    /// transport, codec or handler error.
    pub async fn run<F, Fut>(&mut self, mut handler: F) -> Result<(), NetError>
    where
        F: FnMut(PacketSender, Clientbound) -> Fut,
        Fut: Future<Output = Result<(), NetError>>,
    {
        loop {
            let packet = self.recv().await?;
            handler(self.sender(), packet).await?;
        }
    }
}

fn split_addr(addr: &str) -> Result<(String, u16), NetError> {
    let (host, port) = match addr.split_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| NetError::AddrInvalid(addr.to_owned()))?;

            (host, port)
        }
        None => (addr, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(NetError::AddrInvalid(addr.to_owned()));
    }

    Ok((host.to_owned(), port))
}
