//! Bone path hashing
//!
//! Skinned meshes and animation clips never reference bones structurally.
//! They carry a CRC-32 of the bone's full slash-joined path instead, e.g.
//! `Position/Hips/Spine/Spine1/Spine2/Neck/Head`. The algorithm has to match
//! the producer bit for bit: CRC-32/ISO-HDLC (the zlib `crc32`) over the
//! UTF-8 bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-bit path hash identifying a bone across mesh and animation data.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathHash(u32);

impl PathHash {
    /// Hash a slash-joined bone path
    pub fn of(path: &str) -> Self {
        Self::from_bytes(path.as_bytes())
    }

    /// Hash raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(crc32fast::hash(data))
    }

    /// Wrap a hash value read from external data
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw hash value
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Get the hash as an 8-digit hex string
    pub fn to_hex(&self) -> String {
        format!("{:08x}", self.0)
    }
}

impl From<u32> for PathHash {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for PathHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathHash({:08x})", self.0)
    }
}

impl fmt::Display for PathHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(PathHash::of("123456789").value(), 0xCBF4_3926);
    }

    #[test]
    fn test_empty_and_single_byte() {
        assert_eq!(PathHash::of("").value(), 0);
        assert_eq!(PathHash::of("a").value(), 0xE8B7_BE43);
    }

    #[test]
    fn test_known_collision() {
        assert_eq!(PathHash::of("plumless").value(), 0x4DDB_0C25);
        assert_eq!(PathHash::of("buckeroo").value(), 0x4DDB_0C25);
    }

    #[test]
    fn test_consistent_hashing() {
        let h1 = PathHash::of("Position/Hips/Spine");
        let h2 = PathHash::of("Position/Hips/Spine");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_distinct_paths_in_fixture() {
        let paths = ["Position", "Position/Hips", "Position/Hips/Spine", "Position/Hips/Spine1"];
        for (i, a) in paths.iter().enumerate() {
            for b in paths.iter().skip(i + 1) {
                assert_ne!(PathHash::of(a), PathHash::of(b), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_utf8_bytes_are_hashed() {
        // Non-ASCII names hash their UTF-8 encoding, not UTF-16 code units
        let name = "髪";
        assert_eq!(PathHash::of(name), PathHash::from_bytes(name.as_bytes()));
        assert_ne!(PathHash::of(name), PathHash::of("?"));
    }

    #[test]
    fn test_display_and_hex() {
        let h = PathHash::from_u32(0xCBF4_3926);
        assert_eq!(h.to_string(), "3421780262");
        assert_eq!(h.to_hex(), "cbf43926");
    }

    #[test]
    fn test_serde_is_transparent() {
        let h = PathHash::from_u32(42);
        assert_eq!(serde_json::to_string(&h).unwrap(), "42");
        let back: PathHash = serde_json::from_str("42").unwrap();
        assert_eq!(back, h);
    }
}
