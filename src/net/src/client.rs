use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use owo_colors::OwoColorize;
use serde::Deserialize;
use tracing::info;

use lodestone_proto::io::ShortBytes;
use lodestone_proto::packet::serverbound::{
    EncryptionResponse, LoginStart, PingRequest, StatusRequest,
};
use lodestone_proto::packet::{clientbound, serverbound, Clientbound, Serverbound};
use lodestone_proto::state::ProtocolState;

use crate::auth::{AuthError, CredentialSource, KvStore, Profile, Yggdrasil};
use crate::conn::Connection;
use crate::error::NetError;

/// The status endpoint's JSON document, plus the measured ping round-trip.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerStatus {
    pub description: String,
    pub players: Players,
    pub version: Version,
    #[serde(skip)]
    pub ping: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Players {
    pub online: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    pub name: String,
    pub protocol: i32,
}

impl Display for ServerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}/{} {:?} {}",
            self.version.name, self.players.online, self.players.max, self.ping, self.description
        )
    }
}

/// A [`Connection`] together with the client-side choreography of the
/// protocol: the status exchange and the login sequence. Once logged in,
/// the generic [`Connection::run`] loop takes over.
pub struct ClientConn {
    conn: Connection,
}

impl Deref for ClientConn {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for ClientConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl ClientConn {
    pub async fn connect(addr: &str) -> Result<Self, NetError> {
        Ok(Self {
            conn: Connection::dial(addr).await?,
        })
    }

    /// The whole status choreography: handshake into the status state,
    /// request the document, then measure one ping round trip. The
    /// connection is finished afterwards.
    pub async fn server_status(&mut self) -> Result<ServerStatus, NetError> {
        self.handshake(ProtocolState::Status).await?;

        self.send(Serverbound::Status(serverbound::StatusMapping::StatusRequest(
            StatusRequest {},
        )))
        .await?;

        let packet = self.recv().await?;
        let Clientbound::Status(clientbound::StatusMapping::StatusResponse(response)) = packet
        else {
            return Err(NetError::Protocol(format!(
                "expected status response, got {}",
                packet.name()
            )));
        };

        let mut status: ServerStatus = serde_json::from_str(&response.json)
            .map_err(|e| NetError::Protocol(format!("malformed status document: {}", e)))?;

        status.ping = self.ping().await?;

        Ok(status)
    }

    /// One ping round trip. The server must echo the i64 payload verbatim.
    pub async fn ping(&mut self) -> Result<Duration, NetError> {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;

        let started = Instant::now();

        self.send(Serverbound::Status(serverbound::StatusMapping::PingRequest(
            PingRequest { time },
        )))
        .await?;

        let packet = self.recv().await?;
        match packet {
            Clientbound::Status(clientbound::StatusMapping::PingResponse(pong)) => {
                if pong.time != time {
                    return Err(NetError::Protocol(format!(
                        "ping echo mismatch: sent {}, got {}",
                        time, pong.time
                    )));
                }

                Ok(started.elapsed())
            }
            packet => Err(NetError::Protocol(format!(
                "expected ping echo, got {}",
                packet.name()
            ))),
        }
    }

    /// The login sequence: handshake into the login state, settle the
    /// access token, then LoginStart and - against online-mode servers -
    /// the encryption exchange. On success the connection is in the play
    /// state and the receive loop may start.
    pub async fn login<S, C>(
        &mut self,
        auth: &mut Yggdrasil<S>,
        credentials: &mut C,
    ) -> Result<Profile, NetError>
    where
        S: KvStore,
        C: CredentialSource,
    {
        self.handshake(ProtocolState::Login).await?;

        auth.start(credentials).await?;
        let name = auth.profile().ok_or(AuthError::NoProfile)?.name.clone();

        self.send(Serverbound::Login(serverbound::LoginMapping::LoginStart(
            LoginStart { name },
        )))
        .await?;

        let mut packet = self.recv().await?;

        // Offline-mode servers skip the encryption exchange entirely.
        if let Clientbound::Login(clientbound::LoginMapping::EncryptionRequest(request)) = &packet {
            let session = auth.join_session(&request.server_id, &request.public_key).await?;

            self.send(Serverbound::Login(serverbound::LoginMapping::EncryptionResponse(
                EncryptionResponse {
                    shared_secret: ShortBytes(session.encrypt(&session.shared_secret())?),
                    verify_token: ShortBytes(session.encrypt(&request.verify_token)?),
                },
            )))
            .await?;

            self.install_crypto(session.shared_secret()).await;

            packet = self.recv().await?;
        }

        match packet {
            Clientbound::Login(clientbound::LoginMapping::LoginSuccess(success)) => {
                info!(
                    "Logged in as {} ({})",
                    success.username.green(),
                    success.uuid
                );

                self.set_state(ProtocolState::Play);

                Ok(Profile {
                    id: success.uuid,
                    name: success.username,
                })
            }
            Clientbound::Login(clientbound::LoginMapping::LoginDisconnect(disconnect)) => {
                Err(NetError::Disconnect(disconnect.reason))
            }
            packet => Err(NetError::Protocol(format!(
                "unexpected {} packet during login",
                packet.name()
            ))),
        }
    }
}
