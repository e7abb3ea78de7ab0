//! Torrent identifiers shared by events, the catalog, and notifications.

use std::fmt::{self, Display, Formatter, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InfoHashError;

const V1_LEN: usize = 20;
const V2_LEN: usize = 32;

/// Content hash identifying a torrent (SHA-1 for v1, SHA-256 for v2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InfoHash {
    /// BitTorrent v1 info hash.
    V1([u8; V1_LEN]),
    /// BitTorrent v2 info hash.
    V2([u8; V2_LEN]),
}

impl InfoHash {
    /// Raw hash bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V1(bytes) => bytes,
            Self::V2(bytes) => bytes,
        }
    }
}

impl Display for InfoHash {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let mut hex = String::with_capacity(self.as_bytes().len() * 2);
        for byte in self.as_bytes() {
            write!(hex, "{byte:02x}")?;
        }
        formatter.write_str(&hex)
    }
}

impl FromStr for InfoHash {
    type Err = InfoHashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.len() {
            len if len == V1_LEN * 2 => decode_hex::<V1_LEN>(value).map(Self::V1),
            len if len == V2_LEN * 2 => decode_hex::<V2_LEN>(value).map(Self::V2),
            length => Err(InfoHashError::InvalidLength { length }),
        }
    }
}

impl Serialize for InfoHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InfoHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn decode_hex<const N: usize>(value: &str) -> Result<[u8; N], InfoHashError> {
    let mut bytes = [0_u8; N];
    let raw = value.as_bytes();
    for (index, byte) in bytes.iter_mut().enumerate() {
        let high = hex_digit(raw[index * 2]).ok_or(InfoHashError::InvalidDigit {
            position: index * 2,
        })?;
        let low = hex_digit(raw[index * 2 + 1]).ok_or(InfoHashError::InvalidDigit {
            position: index * 2 + 1,
        })?;
        *byte = (high << 4) | low;
    }
    Ok(bytes)
}

const fn hex_digit(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}
