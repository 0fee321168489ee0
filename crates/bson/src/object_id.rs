//! ObjectId generation and byte/hex conversions.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::error::BsonError;
use crate::values::BsonObjectId;

const MAX_PROCESS: u64 = 0xff_ffff_ffff;
const MAX_COUNTER: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<u64> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

impl BsonObjectId {
    /// Generates a fresh id: current time in seconds, a per-process random
    /// value and a wrapping counter seeded at random.
    pub fn generate() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let process = *PROCESS_UNIQUE.get_or_init(|| rand::thread_rng().gen::<u64>() & MAX_PROCESS);
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::thread_rng().gen::<u32>()))
            .fetch_add(1, Ordering::Relaxed)
            & MAX_COUNTER;
        Self {
            timestamp,
            process,
            counter,
        }
    }

    /// Fails if `process` needs more than 5 bytes or `counter` more than 3,
    /// i.e. if the id cannot be written without losing bits.
    pub fn validate(&self) -> Result<(), BsonError> {
        if self.process > MAX_PROCESS || self.counter > MAX_COUNTER {
            return Err(BsonError::InvalidValue(format!(
                "ObjectId parts out of range: process {:#x}, counter {:#x}",
                self.process, self.counter
            )));
        }
        Ok(())
    }

    /// Big-endian 12-byte wire form. Only the low 5 bytes of `process` and 3
    /// bytes of `counter` are kept; see [`validate`](Self::validate).
    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.timestamp.to_be_bytes());
        out[4..9].copy_from_slice(&self.process.to_be_bytes()[3..8]);
        out[9..12].copy_from_slice(&self.counter.to_be_bytes()[1..4]);
        out
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        let timestamp = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let process = u64::from_be_bytes([
            0, 0, 0, bytes[4], bytes[5], bytes[6], bytes[7], bytes[8],
        ]);
        let counter = u32::from_be_bytes([0, bytes[9], bytes[10], bytes[11]]);
        Self {
            timestamp,
            process,
            counter,
        }
    }

    /// 24 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        format!(
            "{:08x}{:010x}{:06x}",
            self.timestamp,
            self.process & MAX_PROCESS,
            self.counter & MAX_COUNTER
        )
    }
}

impl fmt::Display for BsonObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for BsonObjectId {
    type Err = BsonError;

    fn from_str(hex: &str) -> Result<Self, Self::Err> {
        if hex.len() != 24 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BsonError::InvalidValue(format!("invalid ObjectId hex: {hex:?}")));
        }
        let invalid = |_| BsonError::InvalidValue(format!("invalid ObjectId hex: {hex:?}"));
        Ok(Self {
            timestamp: u32::from_str_radix(&hex[0..8], 16).map_err(invalid)?,
            process: u64::from_str_radix(&hex[8..18], 16).map_err(invalid)?,
            counter: u32::from_str_radix(&hex[18..24], 16).map_err(invalid)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_and_hex_agree() {
        let id = BsonObjectId {
            timestamp: 0x5f1d_2c3b,
            process: 0x01_0203_0405,
            counter: 0x0a0b0c,
        };
        let bytes = id.to_bytes();
        assert_eq!(
            bytes,
            [0x5f, 0x1d, 0x2c, 0x3b, 0x01, 0x02, 0x03, 0x04, 0x05, 0x0a, 0x0b, 0x0c]
        );
        assert_eq!(BsonObjectId::from_bytes(bytes), id);
        assert_eq!(id.to_hex(), "5f1d2c3b01020304050a0b0c");
        assert_eq!("5f1d2c3b01020304050a0b0c".parse::<BsonObjectId>().unwrap(), id);
    }

    #[test]
    fn validate_checks_part_widths() {
        let mut id = BsonObjectId {
            timestamp: u32::MAX,
            process: MAX_PROCESS,
            counter: MAX_COUNTER,
        };
        assert_eq!(id.validate(), Ok(()));
        id.process = MAX_PROCESS + 1;
        assert!(matches!(id.validate(), Err(BsonError::InvalidValue(_))));
        id.process = 0;
        id.counter = MAX_COUNTER + 1;
        assert!(matches!(id.validate(), Err(BsonError::InvalidValue(_))));
    }

    #[test]
    fn rejects_bad_hex() {
        assert!("xyz".parse::<BsonObjectId>().is_err());
        assert!("5f1d2c3b01020304050a0b0g".parse::<BsonObjectId>().is_err());
    }

    #[test]
    fn generated_ids_differ() {
        let a = BsonObjectId::generate();
        let b = BsonObjectId::generate();
        assert_ne!(a, b);
        assert!(a.process <= MAX_PROCESS);
        assert!(b.counter <= MAX_COUNTER);
    }
}
