//! Client-side implementation of the Minecraft Java Edition protocol,
//! wire version 4 (game version 1.7.2).
//!
//! The [`proto`] crate holds the wire primitives, the packet definitions
//! and the per-state packet registries; [`net`] drives a TCP session
//! through the handshake, status, login and play states, including the
//! AES-128/CFB8 session encryption and the Yggdrasil authentication flow.

pub use lodestone_net as net;
pub use lodestone_proto as proto;
pub use lodestone_util as util;
