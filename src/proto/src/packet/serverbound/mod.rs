use crate::io::*;
use crate::packet::types::Slot;
use crate::packet::{packet, packet_serverbound};

packet!(
    /// The first packet of every connection. `next_state` selects where the
    /// connection goes: 1 for status, 2 for login.
    Handshake {
        protocol_version: VarInt,
        server_address: String,
        server_port: UnsignedShort,
        next_state: VarInt
    }
);

packet_serverbound!(
    HandshakeMapping {
        0x00 = Handshake
    }
);

packet!(
    StatusRequest {}

    PingRequest {
        time: Long
    }
);

packet_serverbound!(
    StatusMapping {
        0x00 = StatusRequest,
        0x01 = PingRequest
    }
);

packet!(
    LoginStart {
        name: String
    }

    /// Carries the shared secret and the server's verify token, each
    /// RSA-PKCS#1-v1.5 encrypted under the key from the encryption request.
    EncryptionResponse {
        shared_secret: ShortBytes,
        verify_token: ShortBytes
    }
);

packet_serverbound!(
    LoginMapping {
        0x00 = LoginStart,
        0x01 = EncryptionResponse
    }
);

packet!(
    KeepAlive {
        keep_alive_id: Int
    }

    ChatMessage {
        message: String
    }

    UseEntity {
        target: Int,
        mouse: Byte
    }

    Player {
        on_ground: bool
    }

    PlayerPosition {
        x: Double,
        y: Double,
        stance: Double,
        z: Double,
        on_ground: bool
    }

    PlayerLook {
        yaw: Float,
        pitch: Float,
        on_ground: bool
    }

    PlayerPositionAndLook {
        x: Double,
        y: Double,
        stance: Double,
        z: Double,
        yaw: Float,
        pitch: Float,
        on_ground: bool
    }

    PlayerDigging {
        status: Byte,
        x: Int,
        y: UnsignedByte,
        z: Int,
        face: Byte
    }

    PlayerBlockPlacement {
        x: Int,
        y: UnsignedByte,
        z: Int,
        direction: Byte,
        held_item: Slot,
        cursor_x: Byte,
        cursor_y: Byte,
        cursor_z: Byte
    }

    HeldItemChange {
        slot: Short
    }

    Animation {
        entity_id: Int,
        animation: Byte
    }

    EntityAction {
        entity_id: Int,
        action_id: Byte,
        jump_boost: Int
    }

    SteerVehicle {
        sideways: Float,
        forward: Float,
        jump: bool,
        unmount: bool
    }

    CloseWindow {
        window_id: UnsignedByte
    }

    ClickWindow {
        window_id: Byte,
        slot: Short,
        button: Byte,
        action_number: Short,
        mode: Byte,
        clicked_item: Slot
    }

    ConfirmTransaction {
        window_id: UnsignedByte,
        action_number: Short,
        accepted: bool
    }

    CreativeInventoryAction {
        slot: Short,
        clicked_item: Slot
    }

    EnchantItem {
        window_id: Byte,
        enchantment: Byte
    }

    UpdateSign {
        x: Int,
        y: Short,
        z: Int,
        line1: String,
        line2: String,
        line3: String,
        line4: String
    }

    PlayerAbilities {
        flags: Byte,
        flying_speed: Float,
        walking_speed: Float
    }

    TabCompleteRequest {
        text: String
    }

    ClientSettings {
        locale: String,
        view_distance: Byte,
        chat_flags: Byte,
        chat_colors: bool,
        difficulty: Byte,
        show_cape: bool
    }

    ClientStatus {
        action_id: Byte
    }

    PluginMessage {
        channel: String,
        data: ShortBytes
    }
);

packet_serverbound!(
    PlayMapping {
        0x00 = KeepAlive,
        0x01 = ChatMessage,
        0x02 = UseEntity,
        0x03 = Player,
        0x04 = PlayerPosition,
        0x05 = PlayerLook,
        0x06 = PlayerPositionAndLook,
        0x07 = PlayerDigging,
        0x08 = PlayerBlockPlacement,
        0x09 = HeldItemChange,
        0x0A = Animation,
        0x0B = EntityAction,
        0x0C = SteerVehicle,
        0x0D = CloseWindow,
        0x0E = ClickWindow,
        0x0F = ConfirmTransaction,
        0x10 = CreativeInventoryAction,
        0x11 = EnchantItem,
        0x12 = UpdateSign,
        0x13 = PlayerAbilities,
        0x14 = TabCompleteRequest,
        0x15 = ClientSettings,
        0x16 = ClientStatus,
        0x17 = PluginMessage
    }
);
