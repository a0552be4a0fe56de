//! 24-hex-character identifiers, the id shape shared with the peer service.

use rand::RngCore;

/// Length in hex characters (12 bytes).
pub(crate) const HEX_ID_LEN: usize = 24;

pub(crate) fn parse(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() != HEX_ID_LEN || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(raw.to_ascii_lowercase())
}

pub(crate) fn generate() -> String {
    let mut bytes = [0u8; HEX_ID_LEN / 2];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
