//! Legacy UUID binary representation.
//!
//! Binary subtype 3 stores a UUID as its most and least significant 64-bit
//! halves, each in little-endian byte order.

use dbdoc_bson::{subtype, BsonBinary, BsonError};
use uuid::Uuid;

pub fn legacy_uuid_to_binary(uuid: &Uuid) -> BsonBinary {
    let (msb, lsb) = uuid.as_u64_pair();
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&msb.to_le_bytes());
    data.extend_from_slice(&lsb.to_le_bytes());
    BsonBinary {
        subtype: subtype::UUID_LEGACY,
        data,
    }
}

pub fn legacy_uuid_from_bytes(data: &[u8]) -> Result<Uuid, BsonError> {
    let bytes: [u8; 16] = data.try_into().map_err(|_| BsonError::SizeMismatch {
        expected: 16,
        actual: data.len(),
    })?;
    let mut msb = [0u8; 8];
    let mut lsb = [0u8; 8];
    msb.copy_from_slice(&bytes[..8]);
    lsb.copy_from_slice(&bytes[8..]);
    Ok(Uuid::from_u64_pair(
        u64::from_le_bytes(msb),
        u64::from_le_bytes(lsb),
    ))
}
