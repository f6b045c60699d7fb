//! String helpers for gitview.
//!
//! Escaping for HTML and URLs, padding and trimming for display, path
//! helpers, and the SHA-1/MD5 digests used for cache keys and stored
//! passwords.

mod error;
pub mod hash;
pub mod string;

pub use error::{Result, StringError};
pub use hash::{get_md5, get_sha1, get_sha1_bytes, to_hex, MD5_TYPE};
pub use string::*;
