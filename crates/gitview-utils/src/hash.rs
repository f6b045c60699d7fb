//! SHA-1 and MD5 digests of strings.
//!
//! Text is hashed in its ISO-8859-1 encoding so digests match those
//! stored by older installations; characters outside Latin-1 encode as `?`.

use md5::Md5;
use sha1::{Digest, Sha1};

/// Prefix marking a stored password as an MD5 digest.
pub const MD5_TYPE: &str = "MD5:";

/// Returns the lowercase hex SHA-1 of the ISO-8859-1 encoding of `text`.
pub fn get_sha1(text: &str) -> String {
    get_sha1_bytes(&latin1_bytes(text))
}

/// Returns the lowercase hex SHA-1 of `bytes`.
pub fn get_sha1_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    to_hex(&hasher.finalize())
}

/// Returns the lowercase hex MD5 of the ISO-8859-1 encoding of `text`.
pub fn get_md5(text: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(latin1_bytes(text));
    to_hex(&hasher.finalize())
}

/// Lowercase hex, two digits per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_known_value() {
        assert_eq!(get_sha1("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(get_sha1(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_md5_known_value() {
        assert_eq!(get_md5("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(get_md5(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_latin1_encoding() {
        // U+00E9 is a single byte in ISO-8859-1
        assert_eq!(latin1_bytes("\u{e9}"), vec![0xe9]);
        assert_eq!(get_sha1("\u{e9}"), get_sha1_bytes(&[0xe9]));
        // outside Latin-1 becomes '?'
        assert_eq!(latin1_bytes("\u{20ac}"), vec![b'?']);
        assert_eq!(get_md5("\u{20ac}"), get_md5("?"));
    }

    #[test]
    fn test_to_hex_pads_bytes() {
        assert_eq!(to_hex(&[0x00, 0x0f, 0xa0, 0xff]), "000fa0ff");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_digest_lengths() {
        for text in ["", "a", "gitview", "\u{e9}t\u{e9}"] {
            assert_eq!(get_sha1(text).len(), 40);
            assert_eq!(get_md5(text).len(), 32);
        }
    }
}
