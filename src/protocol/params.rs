//! Name/value pair length prefixes.
//!
//! Each length is either one byte (values below 128) or four bytes with the
//! top bit of the first byte set:
//! ```text
//! short: 0LLLLLLL
//! long:  1LLLLLLL LLLLLLLL LLLLLLLL LLLLLLLL
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

/// Size of the long-form prefix for one name/value pair (two 4-byte lengths).
pub const LONG_PREFIX_SIZE: usize = 8;

/// Largest length the 1-byte form can carry.
pub const SHORT_LENGTH_MAX: usize = 127;

/// Largest length the 4-byte form can carry (31 bits).
pub const LONG_LENGTH_MAX: usize = 0x7FFF_FFFF;

const LONG_FORM_BIT: u32 = 0x8000_0000;

/// How name/value pairs are laid out inside a params record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameValueEncoding {
    /// Always the 4-byte form; the record content length counts name and
    /// value bytes only, not the prefix.
    #[default]
    Legacy,
    /// 1-byte form below 128, 4-byte form otherwise; the record content
    /// length covers the whole pair including its prefix.
    Standard,
}

impl NameValueEncoding {
    /// Content length a params record declares for one pair.
    pub fn content_length(self, name_length: usize, value_length: usize) -> usize {
        match self {
            Self::Legacy => name_length + value_length,
            Self::Standard => {
                prefix_len(name_length, self) + prefix_len(value_length, self) + name_length + value_length
            }
        }
    }

    /// Bytes the pair actually occupies on the wire.
    pub fn pair_len(self, name_length: usize, value_length: usize) -> usize {
        prefix_len(name_length, self) + prefix_len(value_length, self) + name_length + value_length
    }
}

/// Long-form length prefix for one name/value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamsLengths {
    pub name_length: u32,
    pub value_length: u32,
}

impl ParamsLengths {
    pub fn new(name_length: u32, value_length: u32) -> Self {
        Self {
            name_length,
            value_length,
        }
    }

    /// Encode both lengths in the 4-byte form.
    ///
    /// # Example
    ///
    /// ```
    /// use fcgi_client::protocol::ParamsLengths;
    ///
    /// let prefix = ParamsLengths::new(1, 1).encode();
    /// assert_eq!(prefix, [0x80, 0, 0, 1, 0x80, 0, 0, 1]);
    /// ```
    pub fn encode(&self) -> [u8; LONG_PREFIX_SIZE] {
        let mut buf = [0u8; LONG_PREFIX_SIZE];
        buf[0..4].copy_from_slice(&(self.name_length | LONG_FORM_BIT).to_be_bytes());
        buf[4..8].copy_from_slice(&(self.value_length | LONG_FORM_BIT).to_be_bytes());
        buf
    }
}

/// Prefix bytes one length needs under `encoding`.
#[inline]
pub fn prefix_len(length: usize, encoding: NameValueEncoding) -> usize {
    match encoding {
        NameValueEncoding::Legacy => 4,
        NameValueEncoding::Standard if length <= SHORT_LENGTH_MAX => 1,
        NameValueEncoding::Standard => 4,
    }
}

/// Append one length prefix to `buf`.
///
/// Lengths above 31 bits lose their high bits.
pub fn encode_length_into(length: usize, encoding: NameValueEncoding, buf: &mut BytesMut) {
    if prefix_len(length, encoding) == 1 {
        buf.put_u8(length as u8);
    } else {
        buf.put_u32((length as u32) | LONG_FORM_BIT);
    }
}

/// Decode one length prefix in either form.
///
/// Returns the length and the number of prefix bytes consumed, or `None` if
/// the buffer ends inside the prefix.
pub fn decode_length(buf: &[u8]) -> Option<(u32, usize)> {
    let first = *buf.first()?;
    if first & 0x80 == 0 {
        return Some((first as u32, 1));
    }
    let bytes: [u8; 4] = buf.get(0..4)?.try_into().ok()?;
    Some((u32::from_be_bytes(bytes) & !LONG_FORM_BIT, 4))
}
