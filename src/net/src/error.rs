use lodestone_proto::io::Error as ProtoError;
use lodestone_proto::state::ProtocolState;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),

    #[error("connection closed by peer")]
    Closed,

    #[error("stream ended inside a frame")]
    TruncatedFrame,

    #[error("codec: {0}")]
    Codec(ProtoError),

    #[error("packet id {id} invalid for {state} state")]
    InvalidPacketId { state: ProtocolState, id: i32 },

    #[error("protocol: {0}")]
    Protocol(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("crypto: {0}")]
    Crypto(String),

    #[error("server address invalid: {0}")]
    AddrInvalid(String),

    #[error("disconnected by server: {0}")]
    Disconnect(String),
}

impl NetError {
    /// Classifies a codec-layer failure surfaced while decoding an inbound
    /// frame for the given state. Unknown packet ids become protocol
    /// errors; anything else stays a per-frame codec error.
    pub(crate) fn from_decode(state: ProtocolState, err: ProtoError) -> Self {
        match err {
            ProtoError::InvalidPacketId(id) => NetError::InvalidPacketId { state, id: id.0 },
            err => NetError::Codec(err),
        }
    }
}
