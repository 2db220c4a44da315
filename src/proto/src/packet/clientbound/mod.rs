use std::io::{Read, Write};

use crate::io::*;
use crate::packet::types::{
    ChangeRecords, MapChunkBulkMeta, Metadata, ObjectData, PropertyData, Slot, StatisticsEntry,
    XYZ8,
};
use crate::packet::{packet, packet_clientbound};

packet!(
    StatusResponse {
        json: String
    }

    PingResponse {
        time: Long
    }
);

packet_clientbound!(
    StatusMapping {
        0x00 = StatusResponse,
        0x01 = PingResponse
    }
);

packet!(
    LoginDisconnect {
        reason: String
    }

    /// Starts the encryption exchange. `public_key` is the server's RSA key
    /// in PKIX/DER form; `verify_token` must come back encrypted under it.
    EncryptionRequest {
        server_id: String,
        public_key: ShortBytes,
        verify_token: ShortBytes
    }

    LoginSuccess {
        uuid: String,
        username: String
    }
);

packet_clientbound!(
    LoginMapping {
        0x00 = LoginDisconnect,
        0x01 = EncryptionRequest,
        0x02 = LoginSuccess
    }
);

packet!(
    KeepAlive {
        keep_alive_id: Int
    }

    JoinGame {
        entity_id: Int,
        gamemode: UnsignedByte,
        dimension: Byte,
        difficulty: UnsignedByte,
        max_players: UnsignedByte,
        level_type: String
    }

    ChatMessage {
        json: String
    }

    TimeUpdate {
        world_age: Long,
        time_of_day: Long
    }

    EntityEquipment {
        entity_id: Int,
        slot: Short,
        item: Slot
    }

    SpawnPosition {
        x: Int,
        y: Int,
        z: Int
    }

    UpdateHealth {
        health: Float,
        food: Short,
        food_saturation: Float
    }

    Respawn {
        dimension: Int,
        difficulty: UnsignedByte,
        gamemode: UnsignedByte,
        level_type: String
    }

    PlayerPositionAndLook {
        x: Double,
        y: Double,
        z: Double,
        yaw: Float,
        pitch: Float,
        on_ground: bool
    }

    HeldItemChange {
        slot: Byte
    }

    UseBed {
        entity_id: Int,
        x: Int,
        y: UnsignedByte,
        z: Int
    }

    Animation {
        entity_id: VarInt,
        animation: UnsignedByte
    }

    /// Positions are absolute coordinates times 32 (fixed-point with five
    /// fractional bits), as everywhere else in the spawn packets.
    SpawnPlayer {
        entity_id: VarInt,
        player_uuid: String,
        player_name: String,
        x: Int,
        y: Int,
        z: Int,
        yaw: Byte,
        pitch: Byte,
        current_item: Short,
        metadata: Metadata
    }

    CollectItem {
        collected_entity_id: Int,
        collector_entity_id: Int
    }

    SpawnObject {
        entity_id: VarInt,
        kind: Byte,
        x: Int,
        y: Int,
        z: Int,
        pitch: Byte,
        yaw: Byte,
        data: ObjectData
    }

    SpawnMob {
        entity_id: VarInt,
        kind: UnsignedByte,
        x: Int,
        y: Int,
        z: Int,
        pitch: Byte,
        head_pitch: Byte,
        yaw: Byte,
        velocity_x: Short,
        velocity_y: Short,
        velocity_z: Short,
        metadata: Metadata
    }

    SpawnPainting {
        entity_id: VarInt,
        title: String,
        x: Int,
        y: Int,
        z: Int,
        direction: Int
    }

    SpawnExperienceOrb {
        entity_id: VarInt,
        x: Int,
        y: Int,
        z: Int,
        count: Short
    }

    EntityVelocity {
        entity_id: Int,
        velocity_x: Short,
        velocity_y: Short,
        velocity_z: Short
    }

    DestroyEntities {
        entity_ids: ByteArray<UnsignedInt>
    }

    Entity {
        entity_id: Int
    }

    EntityRelativeMove {
        entity_id: Int,
        dx: Byte,
        dy: Byte,
        dz: Byte
    }

    EntityLook {
        entity_id: Int,
        yaw: Byte,
        pitch: Byte
    }

    EntityLookAndRelativeMove {
        entity_id: Int,
        dx: Byte,
        dy: Byte,
        dz: Byte,
        yaw: Byte,
        pitch: Byte
    }

    EntityTeleport {
        entity_id: Int,
        x: Int,
        y: Int,
        z: Int,
        yaw: Byte,
        pitch: Byte
    }

    EntityHeadLook {
        entity_id: Int,
        head_yaw: Byte
    }

    EntityStatus {
        entity_id: Int,
        status: Byte
    }

    AttachEntity {
        entity_id: Int,
        vehicle_id: Int,
        leash: bool
    }

    EntityMetadata {
        entity_id: Int,
        metadata: Metadata
    }

    EntityEffect {
        entity_id: Int,
        effect_id: Byte,
        amplifier: Byte,
        duration: Short
    }

    RemoveEntityEffect {
        entity_id: Int,
        effect_id: Byte
    }

    SetExperience {
        experience_bar: Float,
        level: Short,
        total_experience: Short
    }

    EntityProperties {
        entity_id: Int,
        properties: IntArray<PropertyData>
    }

    ChunkData {
        chunk_x: Int,
        chunk_z: Int,
        ground_up_continuous: bool,
        primary_bitmap: Short,
        add_bitmap: Short,
        compressed_data: IntBytes
    }

    MultiBlockChange {
        chunk_x: Int,
        chunk_z: Int,
        record_count: Short,
        records: ChangeRecords
    }

    BlockChange {
        x: Int,
        y: UnsignedByte,
        z: Int,
        block_type: VarInt,
        block_data: UnsignedByte
    }

    BlockAction {
        x: Int,
        y: Short,
        z: Int,
        byte1: UnsignedByte,
        byte2: UnsignedByte,
        block_type: VarInt
    }

    BlockBreakAnimation {
        entity_id: VarInt,
        x: Int,
        y: Int,
        z: Int,
        destroy_stage: Byte
    }

    Explosion {
        x: Float,
        y: Float,
        z: Float,
        radius: Float,
        records: IntArray<XYZ8>,
        player_motion_x: Float,
        player_motion_y: Float,
        player_motion_z: Float
    }

    Effect {
        effect_id: Int,
        x: Int,
        y: Byte,
        z: Int,
        data: Int,
        disable_relative_volume: bool
    }

    SoundEffect {
        sound_name: String,
        x: Int,
        y: Int,
        z: Int,
        volume: Float,
        pitch: UnsignedByte
    }

    Particle {
        particle_name: String,
        x: Float,
        y: Float,
        z: Float,
        offset_x: Float,
        offset_y: Float,
        offset_z: Float,
        particle_data: Float,
        particle_count: Int
    }

    ChangeGameState {
        reason: UnsignedByte,
        value: Float
    }

    SpawnGlobalEntity {
        entity_id: VarInt,
        kind: Byte,
        x: Int,
        y: Int,
        z: Int
    }

    OpenWindow {
        window_id: UnsignedByte,
        inventory_type: UnsignedByte,
        window_title: String,
        slot_count: UnsignedByte,
        use_provided_title: bool,
        entity_id: Int
    }

    CloseWindow {
        window_id: UnsignedByte
    }

    SetSlot {
        window_id: UnsignedByte,
        slot: Short,
        item: Slot
    }

    WindowItems {
        window_id: UnsignedByte,
        items: ShortArray<Slot>
    }

    WindowProperty {
        window_id: UnsignedByte,
        property: Short,
        value: Short
    }

    ConfirmTransaction {
        window_id: UnsignedByte,
        action_number: Short,
        accepted: bool
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

    Maps {
        item_damage: VarInt,
        data: ShortBytes
    }

    UpdateBlockEntity {
        x: Int,
        y: Short,
        z: Int,
        action: UnsignedByte,
        nbt_data: ShortBytes
    }

    SignEditorOpen {
        x: Int,
        y: Int,
        z: Int
    }

    Statistics {
        entries: Box<[StatisticsEntry]>
    }

    PlayerListItem {
        player_name: String,
        online: bool,
        ping: Short
    }

    PlayerAbilities {
        flags: Byte,
        flying_speed: Float,
        walking_speed: Float
    }

    TabCompleteResponse {
        matches: Box<[String]>
    }

    ScoreboardObjective {
        objective_name: String,
        objective_value: String,
        action: Byte
    }

    UpdateScore {
        item_name: String,
        action: Byte,
        score_name: String,
        value: Int
    }

    DisplayScoreboard {
        position: Byte,
        score_name: String
    }

    Teams {
        team_name: String,
        mode: Byte,
        display_name: String,
        prefix: String,
        suffix: String,
        friendly_fire: Byte,
        players: ShortArray<String>
    }

    PluginMessage {
        channel: String,
        data: ShortBytes
    }

    Disconnect {
        reason: String
    }
);

/// A batch of chunk columns: one shared compressed blob followed by one
/// meta record per column. The blob's byte length is redundant with the
/// column layout but wire-bound, so it is carried explicitly and must
/// round-trip.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct MapChunkBulk {
    pub sky_light_sent: bool,
    pub data: Box<[u8]>,
    pub meta: Vec<MapChunkBulkMeta>
}

impl Readable for MapChunkBulk {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let column_count = Short::read(buf)?;
        if column_count < 0 {
            return Err(Error::InvalidLength(column_count as i32));
        }

        let data_len = Int::read(buf)?;
        if data_len < 0 {
            return Err(Error::InvalidLength(data_len));
        }

        let sky_light_sent = bool::read(buf)?;

        let mut data = vec![0; data_len as usize];
        if buf.read_exact(&mut data).is_err() {
            return Err(Error::Eof);
        }

        let mut meta = Vec::new();
        for _ in 0..column_count {
            meta.push(MapChunkBulkMeta::read(buf)?);
        }

        Ok(MapChunkBulk {
            sky_light_sent,
            data: data.into_boxed_slice(),
            meta,
        })
    }
}

impl Writable for MapChunkBulk {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let mut written = (self.meta.len() as i16).write(buf)?;
        written += (self.data.len() as i32).write(buf)?;
        written += self.sky_light_sent.write(buf)?;

        buf.write_all(&self.data)?;
        written += self.data.len();

        for meta in &self.meta {
            written += meta.write(buf)?;
        }

        Ok(written)
    }
}

packet_clientbound!(
    PlayMapping {
        0x00 = KeepAlive,
        0x01 = JoinGame,
        0x02 = ChatMessage,
        0x03 = TimeUpdate,
        0x04 = EntityEquipment,
        0x05 = SpawnPosition,
        0x06 = UpdateHealth,
        0x07 = Respawn,
        0x08 = PlayerPositionAndLook,
        0x09 = HeldItemChange,
        0x0A = UseBed,
        0x0B = Animation,
        0x0C = SpawnPlayer,
        0x0D = CollectItem,
        0x0E = SpawnObject,
        0x0F = SpawnMob,
        0x10 = SpawnPainting,
        0x11 = SpawnExperienceOrb,
        0x12 = EntityVelocity,
        0x13 = DestroyEntities,
        0x14 = Entity,
        0x15 = EntityRelativeMove,
        0x16 = EntityLook,
        0x17 = EntityLookAndRelativeMove,
        0x18 = EntityTeleport,
        0x19 = EntityHeadLook,
        0x1A = EntityStatus,
        0x1B = AttachEntity,
        0x1C = EntityMetadata,
        0x1D = EntityEffect,
        0x1E = RemoveEntityEffect,
        0x1F = SetExperience,
        0x20 = EntityProperties,
        0x21 = ChunkData,
        0x22 = MultiBlockChange,
        0x23 = BlockChange,
        0x24 = BlockAction,
        0x25 = BlockBreakAnimation,
        0x26 = MapChunkBulk,
        0x27 = Explosion,
        0x28 = Effect,
        0x29 = SoundEffect,
        0x2A = Particle,
        0x2B = ChangeGameState,
        0x2C = SpawnGlobalEntity,
        0x2D = OpenWindow,
        0x2E = CloseWindow,
        0x2F = SetSlot,
        0x30 = WindowItems,
        0x31 = WindowProperty,
        0x32 = ConfirmTransaction,
        0x33 = UpdateSign,
        0x34 = Maps,
        0x35 = UpdateBlockEntity,
        0x36 = SignEditorOpen,
        0x37 = Statistics,
        0x38 = PlayerListItem,
        0x39 = PlayerAbilities,
        0x3A = TabCompleteResponse,
        0x3B = ScoreboardObjective,
        0x3C = UpdateScore,
        0x3D = DisplayScoreboard,
        0x3E = Teams,
        0x3F = PluginMessage,
        0x40 = Disconnect
    }
);

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use lodestone_util::hex::decode_stringed_hex;

    use crate::io::io::tests::ser_write_read_type_assert;
    use crate::io::{ByteArray, Readable, ShortArray, ShortBytes, VarInt, Writable};
    use crate::packet::clientbound::{
        DestroyEntities, EncryptionRequest, JoinGame, KeepAlive, LoginMapping, MapChunkBulk,
        PlayMapping, SetSlot, SpawnMob, StatusMapping, StatusResponse, WindowItems,
    };
    use crate::packet::types::{
        MapChunkBulkMeta, Metadata, MetadataEntry, MetadataValue, Slot, SlotItem,
    };

    #[test]
    fn status_response() {
        ser_write_read_type_assert(&StatusMapping::StatusResponse(StatusResponse {
            json: r#"{"description":"A Minecraft Server","players":{"online":0,"max":20}}"#.to_owned(),
        }));
    }

    #[test]
    fn keep_alive_wire_form() {
        let packet = PlayMapping::KeepAlive(KeepAlive {
            keep_alive_id: -0x35014542, // 0xCAFEBABE
        });

        let mut buf = Vec::new();
        packet.write(&mut buf).unwrap();

        let expected = decode_stringed_hex("00 CAFEBABE").unwrap();
        assert_eq!(expected, buf);
    }

    #[test]
    fn encryption_request_roundtrip() {
        ser_write_read_type_assert(&LoginMapping::EncryptionRequest(EncryptionRequest {
            server_id: "".to_owned(),
            public_key: ShortBytes(vec![0x30, 0x81, 0x9F, 0x30, 0x0D]),
            verify_token: ShortBytes(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        }));
    }

    #[test]
    fn join_game_roundtrip() {
        ser_write_read_type_assert(&PlayMapping::JoinGame(JoinGame {
            entity_id: 2815,
            gamemode: 0,
            dimension: -1,
            difficulty: 2,
            max_players: 20,
            level_type: "default".to_owned(),
        }));
    }

    #[test]
    fn spawn_mob_with_metadata() {
        ser_write_read_type_assert(&PlayMapping::SpawnMob(SpawnMob {
            entity_id: VarInt(97),
            kind: 50, // creeper
            x: 32 * 100,
            y: 32 * 64,
            z: -32 * 12,
            pitch: 0,
            head_pitch: 0,
            yaw: -64,
            velocity_x: 0,
            velocity_y: 0,
            velocity_z: 0,
            metadata: Metadata(vec![
                MetadataEntry { index: 0, value: MetadataValue::Byte(0) },
                MetadataEntry { index: 16, value: MetadataValue::Byte(-1) },
            ]),
        }));
    }

    #[test]
    fn destroy_entities_byte_count() {
        let packet = PlayMapping::DestroyEntities(DestroyEntities {
            entity_ids: ByteArray(vec![1, 2, 3]),
        });

        let mut buf = Vec::new();
        packet.write(&mut buf).unwrap();

        // id 0x13, i8 count, three u32 ids
        assert_eq!(1 + 1 + 12, buf.len());
        assert_eq!(0x03, buf[1]);

        ser_write_read_type_assert(&packet);
    }

    #[test]
    fn window_items_with_slots() {
        ser_write_read_type_assert(&PlayMapping::WindowItems(WindowItems {
            window_id: 0,
            items: ShortArray(vec![
                Slot { item: None },
                Slot {
                    item: Some(SlotItem {
                        id: 1,
                        count: 64,
                        damage: 0,
                        nbt: None,
                    })
                },
            ]),
        }));

        ser_write_read_type_assert(&PlayMapping::SetSlot(SetSlot {
            window_id: 2,
            slot: 13,
            item: Slot {
                item: Some(SlotItem {
                    id: 276,
                    count: 1,
                    damage: 117,
                    nbt: Some(vec![0x1F, 0x8B, 0x08].into_boxed_slice()),
                })
            },
        }));
    }

    #[test]
    fn map_chunk_bulk_keeps_data_length() {
        let packet = MapChunkBulk {
            sky_light_sent: true,
            data: vec![0x78, 0x9C, 0x01, 0x02, 0x03].into_boxed_slice(),
            meta: vec![
                MapChunkBulkMeta { chunk_x: 0, chunk_z: 0, primary_bitmap: 0x000F, add_bitmap: 0 },
                MapChunkBulkMeta { chunk_x: 0, chunk_z: 1, primary_bitmap: 0x0001, add_bitmap: 0 },
            ],
        };

        let mut buf = Vec::new();
        packet.write(&mut buf).unwrap();

        // column count i16, then the blob length i32
        assert_eq!(&[0x00, 0x02, 0x00, 0x00, 0x00, 0x05], &buf[..6]);

        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(packet, MapChunkBulk::read(&mut cursor).unwrap());
        assert_eq!(buf.len(), cursor.position() as usize);
    }

    #[test]
    fn every_play_id_resolves() {
        // Decoding an id-only buffer must never hit the unknown-id arm for
        // ids 0x00..=0x40; packets with fields fail later with Eof instead.
        use crate::io::Error;

        for id in 0x00..=0x40i32 {
            let mut buf = Vec::new();
            VarInt(id).write(&mut buf).unwrap();

            let mut cursor = Cursor::new(buf.as_slice());
            match PlayMapping::read(&mut cursor) {
                Err(Error::InvalidPacketId(bad)) => panic!("id {:#04x} unregistered", bad.0),
                _ => {}
            }
        }
    }

    const EXPLOSION_HEX: &str = r"
        27
        42C82000 42800000 C1A00000 40400000
        00000003 010100 00FF00 FF0001
        3DCCCCCD 00000000 BDCCCCCD
    ";

    #[test]
    fn explosion_fixture() {
        use crate::packet::types::XYZ8;

        let bytes = decode_stringed_hex(EXPLOSION_HEX).unwrap();
        let mut cursor = Cursor::new(bytes.as_slice());

        let PlayMapping::Explosion(explosion) = PlayMapping::read(&mut cursor).unwrap() else {
            panic!("wrong variant");
        };

        assert_eq!(100.0625, explosion.x);
        assert_eq!(3, explosion.records.len());
        assert_eq!(XYZ8 { x: 1, y: 1, z: 0 }, explosion.records[0]);

        let mut buf = Vec::new();
        PlayMapping::Explosion(explosion).write(&mut buf).unwrap();
        assert_eq!(bytes, buf);
    }
}
