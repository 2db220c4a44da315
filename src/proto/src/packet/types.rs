use std::io::{Read, Write};

use uuid::Uuid;

use crate::io::*;
use crate::packet::packet;

packet!(
    /// Three signed-byte offsets, as carried by explosion records.
    XYZ8 {
        x: Byte,
        y: Byte,
        z: Byte
    }

    /// Three full-width block coordinates, as carried by entity metadata.
    XYZInt {
        x: Int,
        y: Int,
        z: Int
    }

    Velocity {
        x: Short,
        y: Short,
        z: Short
    }

    PropertyModifier {
        uuid: Uuid,
        amount: Double,
        operation: Byte
    }

    PropertyData {
        key: String,
        value: Double,
        modifiers: ShortArray<PropertyModifier>
    }

    StatisticsEntry {
        name: String,
        value: VarInt
    }

    MapChunkBulkMeta {
        chunk_x: Int,
        chunk_z: Int,
        primary_bitmap: UnsignedShort,
        add_bitmap: UnsignedShort
    }
);

const EMPTY_SLOT: u16 = 0xFFFF;
const EMPTY_TAG: u16 = 0xFFFF;

/// An item stack. The wire encoding is self-describing: an id of `0xFFFF`
/// means the slot is empty and nothing else follows; otherwise count,
/// damage and an optional gzip-compressed NBT blob (kept opaque here)
/// trail it.
#[derive(Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Slot {
    pub item: Option<SlotItem>
}

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct SlotItem {
    pub id: UnsignedShort,
    pub count: UnsignedByte,
    pub damage: UnsignedShort,
    pub nbt: Option<Box<[u8]>>
}

impl Readable for Slot {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let id = UnsignedShort::read(buf)?;
        if id == EMPTY_SLOT {
            return Ok(Slot { item: None });
        }

        let count = UnsignedByte::read(buf)?;
        let damage = UnsignedShort::read(buf)?;

        let tag_len = UnsignedShort::read(buf)?;
        // Both 0 and 0xFFFF mean "no tag" on the wire.
        let nbt = if tag_len == 0 || tag_len == EMPTY_TAG {
            None
        } else {
            let mut bytes = vec![0; tag_len as usize];
            if buf.read_exact(&mut bytes).is_err() {
                return Err(Error::Eof);
            }

            Some(bytes.into_boxed_slice())
        };

        Ok(Slot {
            item: Some(SlotItem {
                id,
                count,
                damage,
                nbt,
            })
        })
    }
}

impl Writable for Slot {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let Some(item) = &self.item else {
            return EMPTY_SLOT.write(buf);
        };

        let mut written = item.id.write(buf)?;
        written += item.count.write(buf)?;
        written += item.damage.write(buf)?;

        match &item.nbt {
            Some(bytes) => {
                written += (bytes.len() as u16).write(buf)?;
                buf.write_all(bytes)?;
                written += bytes.len();
            }
            None => written += EMPTY_TAG.write(buf)?,
        }

        Ok(written)
    }
}

/// The trailing field of an object spawn. The velocity triplet is present
/// on the wire iff `data` is nonzero; decoding upholds that, and encoding
/// relies on it.
#[derive(Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ObjectData {
    pub data: UnsignedInt,
    pub velocity: Option<Velocity>
}

impl Readable for ObjectData {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let data = UnsignedInt::read(buf)?;
        let velocity = if data != 0 {
            Some(Velocity::read(buf)?)
        } else {
            None
        };

        Ok(ObjectData {
            data,
            velocity,
        })
    }
}

impl Writable for ObjectData {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let mut written = self.data.write(buf)?;
        if let Some(velocity) = &self.velocity {
            written += velocity.write(buf)?;
        }

        Ok(written)
    }
}

const METADATA_END: u8 = 0x7F;

/// Entity metadata: an ordered sequence of indexed values closed by a
/// literal `0x7F` byte. Each entry's header byte packs the value kind into
/// the high 3 bits and the index into the low 5. Order is preserved across
/// a decode/encode round trip.
#[derive(Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Metadata(pub Vec<MetadataEntry>);

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct MetadataEntry {
    pub index: u8,
    pub value: MetadataValue
}

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub enum MetadataValue {
    Byte(Byte),
    Short(Short),
    Int(Int),
    Float(Float),
    String(String),
    Slot(Slot),
    Position(XYZInt),
}

impl MetadataValue {
    fn kind(&self) -> u8 {
        match self {
            MetadataValue::Byte(_) => 0,
            MetadataValue::Short(_) => 1,
            MetadataValue::Int(_) => 2,
            MetadataValue::Float(_) => 3,
            MetadataValue::String(_) => 4,
            MetadataValue::Slot(_) => 5,
            MetadataValue::Position(_) => 6,
        }
    }
}

impl Readable for Metadata {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let mut entries = Vec::new();

        loop {
            let header = UnsignedByte::read(buf)?;
            if header == METADATA_END {
                return Ok(Metadata(entries));
            }

            let kind = (header & 0xE0) >> 5;
            let index = header & 0x1F;

            let value = match kind {
                0 => MetadataValue::Byte(Byte::read(buf)?),
                1 => MetadataValue::Short(Short::read(buf)?),
                2 => MetadataValue::Int(Int::read(buf)?),
                3 => MetadataValue::Float(Float::read(buf)?),
                4 => MetadataValue::String(String::read(buf)?),
                5 => MetadataValue::Slot(Slot::read(buf)?),
                6 => MetadataValue::Position(XYZInt::read(buf)?),
                kind => return Err(Error::InvalidMetadataKind(kind)),
            };

            entries.push(MetadataEntry {
                index,
                value,
            });
        }
    }
}

impl Writable for Metadata {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let mut written = 0;

        for entry in &self.0 {
            let header = (entry.value.kind() << 5) | (entry.index & 0x1F);
            written += header.write(buf)?;

            written += match &entry.value {
                MetadataValue::Byte(v) => v.write(buf)?,
                MetadataValue::Short(v) => v.write(buf)?,
                MetadataValue::Int(v) => v.write(buf)?,
                MetadataValue::Float(v) => v.write(buf)?,
                MetadataValue::String(v) => v.write(buf)?,
                MetadataValue::Slot(v) => v.write(buf)?,
                MetadataValue::Position(v) => v.write(buf)?,
            };
        }

        written += METADATA_END.write(buf)?;

        Ok(written)
    }
}

/// Block-change records of a multi block change. The wire length field
/// counts bytes rather than records, four bytes per record, and must stay
/// divisible by four.
#[derive(Debug, Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ChangeRecords(pub Vec<UnsignedInt>);

impl Readable for ChangeRecords {
    fn read<R: Read>(buf: &mut R) -> Result<Self, Error> {
        let byte_len = Int::read(buf)?;
        if byte_len < 0 || byte_len % 4 != 0 {
            return Err(Error::InvalidLength(byte_len));
        }

        let mut records = Vec::new();
        for _ in 0..byte_len / 4 {
            records.push(UnsignedInt::read(buf)?);
        }

        Ok(ChangeRecords(records))
    }
}

impl Writable for ChangeRecords {
    fn write<W: Write>(&self, buf: &mut W) -> Result<usize, Error> {
        let mut written = ((self.0.len() * 4) as i32).write(buf)?;
        for record in &self.0 {
            written += record.write(buf)?;
        }

        Ok(written)
    }
}
