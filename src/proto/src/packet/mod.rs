use std::io::{Read, Write};

use crate::io::{Error, Readable, VarInt, Writable};
use crate::state::ProtocolState;

pub mod clientbound;
pub mod serverbound;
pub mod types;

/// Declares packet record types. Each packet is an ordered list of fields,
/// and the wire form of every field is chosen by its Rust type, so the
/// declaration doubles as the wire schema.
macro_rules! packet {
    (
        $(
            $(#[$meta:meta])*
            $name:ident {
                $($field:ident: $ty:ty),* $(,)?
            }
        )*
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone)]
            #[cfg_attr(test, derive(PartialEq))]
            pub struct $name {
                $(pub $field: $ty,)*
            }

            impl $crate::io::Readable for $name {
                #[allow(unused_variables)]
                fn read<R: std::io::Read>(buf: &mut R) -> Result<Self, $crate::io::Error> {
                    Ok(Self {
                        $($field: <$ty as $crate::io::Readable>::read(buf)?,)*
                    })
                }
            }

            impl $crate::io::Writable for $name {
                #[allow(unused_variables, unused_mut)]
                fn write<W: std::io::Write>(&self, buf: &mut W) -> Result<usize, $crate::io::Error> {
                    let mut written = 0;
                    $(written += $crate::io::Writable::write(&self.$field, buf)?;)*

                    Ok(written)
                }
            }
        )*
    };
}

/// Builds the id-indexed packet registry of one (state, direction) pair:
/// an enum with one variant per packet, reading by varint id dispatch and
/// writing the id before the body. Unknown ids on the read side fail with
/// [`Error::InvalidPacketId`].
///
/// [`Error::InvalidPacketId`]: crate::io::Error::InvalidPacketId
macro_rules! packet_mapping {
    (
        $(#[$meta:meta])*
        $mapping:ident {
            $($id:literal = $packet:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        #[cfg_attr(test, derive(PartialEq))]
        pub enum $mapping {
            $($packet($packet),)*
        }

        impl $mapping {
            pub fn id(&self) -> $crate::io::VarInt {
                match self {
                    $(Self::$packet(_) => $crate::io::VarInt($id),)*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$packet(_) => stringify!($packet),)*
                }
            }
        }

        impl $crate::io::Readable for $mapping {
            fn read<R: std::io::Read>(buf: &mut R) -> Result<Self, $crate::io::Error> {
                let id = $crate::io::VarInt::read(buf)?;

                match id.0 {
                    $($id => Ok(Self::$packet(<$packet as $crate::io::Readable>::read(buf)?)),)*
                    _ => Err($crate::io::Error::InvalidPacketId(id)),
                }
            }
        }

        impl $crate::io::Writable for $mapping {
            fn write<W: std::io::Write>(&self, buf: &mut W) -> Result<usize, $crate::io::Error> {
                let mut written = $crate::io::Writable::write(&self.id(), buf)?;
                written += match self {
                    $(Self::$packet(p) => $crate::io::Writable::write(p, buf)?,)*
                };

                Ok(written)
            }
        }

        $(
            impl From<$packet> for $mapping {
                fn from(packet: $packet) -> Self {
                    Self::$packet(packet)
                }
            }
        )*
    };
}

macro_rules! packet_serverbound {
    ($($tokens:tt)*) => {
        $crate::packet::packet_mapping!($($tokens)*);
    };
}

macro_rules! packet_clientbound {
    ($($tokens:tt)*) => {
        $crate::packet::packet_mapping!($($tokens)*);
    };
}

pub(crate) use packet;
pub(crate) use packet_clientbound;
pub(crate) use packet_mapping;
pub(crate) use packet_serverbound;

/// Any packet the client may send, tagged by the connection state that
/// owns its id space.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Serverbound {
    Handshake(serverbound::HandshakeMapping),
    Status(serverbound::StatusMapping),
    Login(serverbound::LoginMapping),
    Play(serverbound::PlayMapping),
}

impl Serverbound {
    pub fn state(&self) -> ProtocolState {
        match self {
            Serverbound::Handshake(_) => ProtocolState::Handshake,
            Serverbound::Status(_) => ProtocolState::Status,
            Serverbound::Login(_) => ProtocolState::Login,
            Serverbound::Play(_) => ProtocolState::Play,
        }
    }

    pub fn id(&self) -> VarInt {
        match self {
            Serverbound::Handshake(p) => p.id(),
            Serverbound::Status(p) => p.id(),
            Serverbound::Login(p) => p.id(),
            Serverbound::Play(p) => p.id(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Serverbound::Handshake(p) => p.name(),
            Serverbound::Status(p) => p.name(),
            Serverbound::Login(p) => p.name(),
            Serverbound::Play(p) => p.name(),
        }
    }
}

impl Writable for Serverbound {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        match self {
            Serverbound::Handshake(p) => p.write(buf),
            Serverbound::Status(p) => p.write(buf),
            Serverbound::Login(p) => p.write(buf),
            Serverbound::Play(p) => p.write(buf),
        }
    }
}

impl From<serverbound::HandshakeMapping> for Serverbound {
    fn from(mapping: serverbound::HandshakeMapping) -> Self {
        Serverbound::Handshake(mapping)
    }
}

impl From<serverbound::StatusMapping> for Serverbound {
    fn from(mapping: serverbound::StatusMapping) -> Self {
        Serverbound::Status(mapping)
    }
}

impl From<serverbound::LoginMapping> for Serverbound {
    fn from(mapping: serverbound::LoginMapping) -> Self {
        Serverbound::Login(mapping)
    }
}

impl From<serverbound::PlayMapping> for Serverbound {
    fn from(mapping: serverbound::PlayMapping) -> Self {
        Serverbound::Play(mapping)
    }
}

/// Any packet the server may send, tagged by the connection state that
/// owns its id space. No clientbound packets exist in the handshake state.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Clientbound {
    Status(clientbound::StatusMapping),
    Login(clientbound::LoginMapping),
    Play(clientbound::PlayMapping),
}

impl Clientbound {
    /// Decodes one frame body (id varint followed by fields) against the
    /// registry of the given connection state.
    pub fn read_packet<R: Read>(state: ProtocolState, buf: &mut R) -> Result<Self, Error> {
        match state {
            ProtocolState::Handshake => Err(Error::InvalidPacketId(VarInt::read(buf)?)),
            ProtocolState::Status => Ok(Clientbound::Status(clientbound::StatusMapping::read(buf)?)),
            ProtocolState::Login => Ok(Clientbound::Login(clientbound::LoginMapping::read(buf)?)),
            ProtocolState::Play => Ok(Clientbound::Play(clientbound::PlayMapping::read(buf)?)),
        }
    }

    pub fn state(&self) -> ProtocolState {
        match self {
            Clientbound::Status(_) => ProtocolState::Status,
            Clientbound::Login(_) => ProtocolState::Login,
            Clientbound::Play(_) => ProtocolState::Play,
        }
    }

    pub fn id(&self) -> VarInt {
        match self {
            Clientbound::Status(p) => p.id(),
            Clientbound::Login(p) => p.id(),
            Clientbound::Play(p) => p.id(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Clientbound::Status(p) => p.name(),
            Clientbound::Login(p) => p.name(),
            Clientbound::Play(p) => p.name(),
        }
    }
}

impl Writable for Clientbound {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        match self {
            Clientbound::Status(p) => p.write(buf),
            Clientbound::Login(p) => p.write(buf),
            Clientbound::Play(p) => p.write(buf),
        }
    }
}

impl From<clientbound::StatusMapping> for Clientbound {
    fn from(mapping: clientbound::StatusMapping) -> Self {
        Clientbound::Status(mapping)
    }
}

impl From<clientbound::LoginMapping> for Clientbound {
    fn from(mapping: clientbound::LoginMapping) -> Self {
        Clientbound::Login(mapping)
    }
}

impl From<clientbound::PlayMapping> for Clientbound {
    fn from(mapping: clientbound::PlayMapping) -> Self {
        Clientbound::Play(mapping)
    }
}
