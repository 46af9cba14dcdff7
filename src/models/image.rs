//! Goal image payload
//!
//! Images are kept as PNG bytes and travel through JSON as a standard
//! base64 string without line wrapping.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The eight-byte signature every PNG stream starts with
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG-encoded image attached to a goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalImage(Vec<u8>);

impl GoalImage {
    /// Wrap raw image bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode from a base64 string
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        Ok(Self(STANDARD.decode(encoded.trim())?))
    }

    /// Encode as a base64 string
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether the bytes carry a PNG signature
    pub fn is_png(&self) -> bool {
        self.0.starts_with(&PNG_SIGNATURE)
    }
}

impl Serialize for GoalImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for GoalImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        GoalImage::from_base64(&encoded)
            .map_err(|e| serde::de::Error::custom(format!("invalid goal image: {}", e)))
    }
}
