use std::fmt::{Display, Formatter};

use crate::io::VarInt;

/// Connection state as defined by the protocol. A connection always starts
/// at [`Handshake`] and only ever moves forward: to [`Status`] or [`Login`]
/// depending on the handshake's `next_state` field, and from [`Login`] to
/// [`Play`] once the server confirms the login.
///
/// [`Handshake`]: ProtocolState::Handshake
/// [`Status`]: ProtocolState::Status
/// [`Login`]: ProtocolState::Login
/// [`Play`]: ProtocolState::Play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProtocolState {
    Handshake = 0,
    Status = 1,
    Login = 2,
    Play = 3,
}

impl ProtocolState {
    /// Wire value of the handshake packet's `next_state` field. Only the
    /// status and login states may be requested there.
    pub fn next_state(self) -> Option<VarInt> {
        match self {
            ProtocolState::Status => Some(VarInt(1)),
            ProtocolState::Login => Some(VarInt(2)),
            _ => None,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ProtocolState::Handshake),
            1 => Some(ProtocolState::Status),
            2 => Some(ProtocolState::Login),
            3 => Some(ProtocolState::Play),
            _ => None,
        }
    }
}

impl Display for ProtocolState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProtocolState::Handshake => "handshake",
            ProtocolState::Status => "status",
            ProtocolState::Login => "login",
            ProtocolState::Play => "play",
        };

        write!(f, "{}", name)
    }
}
