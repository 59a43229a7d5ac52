//! Complete record assembly.
//!
//! Records are appended to a caller-owned [`BytesMut`] so one buffer can be
//! reused for every record sent on a connection.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use fcgi_client::protocol::{put_record, RecordType, HEADER_SIZE};
//!
//! let mut buf = BytesMut::new();
//! put_record(&mut buf, RecordType::Stdin, 1, b"body", false);
//! assert_eq!(buf.len(), HEADER_SIZE + 4);
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::begin_request::{BeginRequestBody, Role, BEGIN_REQUEST_BODY_SIZE};
use super::params::{encode_length_into, NameValueEncoding, ParamsLengths};
use super::wire_format::{padding_for, Header, RecordType, HEADER_SIZE, MAX_CONTENT_LENGTH};

/// Size of a complete begin-request record.
pub const BEGIN_REQUEST_RECORD_SIZE: usize = HEADER_SIZE + BEGIN_REQUEST_BODY_SIZE;

const ZERO_PADDING: [u8; 8] = [0u8; 8];

/// Layout choices applied when records are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordLayout {
    /// Name/value pair layout inside params records.
    pub params_encoding: NameValueEncoding,
    /// Pad every record's content to an 8-byte boundary.
    pub align_padding: bool,
}

/// Narrow a length to the 16-bit header field, masking off the high bits.
///
/// Truncation is not rejected; a warning is logged and the masked value is
/// what goes on the wire.
pub fn narrow_u16(value: usize, field: &'static str) -> u16 {
    if value > MAX_CONTENT_LENGTH {
        tracing::warn!(
            "{} {} exceeds 16 bits, truncated to {}",
            field,
            value,
            value & MAX_CONTENT_LENGTH
        );
    }
    (value & MAX_CONTENT_LENGTH) as u16
}

/// Encode a begin-request record (header + body).
pub fn begin_request_record(
    role: Role,
    keep_alive: bool,
    request_id: u16,
) -> [u8; BEGIN_REQUEST_RECORD_SIZE] {
    let header = Header::new(
        RecordType::BeginRequest,
        BEGIN_REQUEST_BODY_SIZE as u16,
        request_id,
    );
    let mut buf = [0u8; BEGIN_REQUEST_RECORD_SIZE];
    header.encode_into(&mut buf[..HEADER_SIZE]);
    buf[HEADER_SIZE..].copy_from_slice(&BeginRequestBody::new(role, keep_alive).encode());
    buf
}

/// Encode the empty params record that terminates the params stream.
pub fn params_end_record(request_id: u16) -> [u8; HEADER_SIZE] {
    Header::new(RecordType::Params, 0, request_id).encode()
}

/// Append a header for `content_length` bytes, returning the padding owed.
fn put_header(
    buf: &mut BytesMut,
    record_type: RecordType,
    request_id: u16,
    content_length: usize,
    align_padding: bool,
) -> u8 {
    let content_length = narrow_u16(content_length, "content_length");
    let padding = if align_padding {
        padding_for(content_length as usize)
    } else {
        0
    };
    let header = Header::new(record_type, content_length, request_id).with_padding(padding);
    buf.put_slice(&header.encode());
    padding
}

/// Append a complete record: header, `content`, and padding if requested.
pub fn put_record(
    buf: &mut BytesMut,
    record_type: RecordType,
    request_id: u16,
    content: &[u8],
    align_padding: bool,
) {
    buf.reserve(HEADER_SIZE + content.len() + ZERO_PADDING.len());
    let padding = put_header(buf, record_type, request_id, content.len(), align_padding);
    buf.put_slice(content);
    buf.put_slice(&ZERO_PADDING[..padding as usize]);
}

/// Append a params record carrying a single name/value pair.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use fcgi_client::protocol::{put_param, RecordLayout};
///
/// let mut buf = BytesMut::new();
/// put_param(&mut buf, b"A", b"B", 1, RecordLayout::default());
/// assert_eq!(
///     &buf[..],
///     &[1, 4, 0, 1, 0, 2, 0, 0, 0x80, 0, 0, 1, 0x80, 0, 0, 1, b'A', b'B']
/// );
/// ```
pub fn put_param(
    buf: &mut BytesMut,
    name: &[u8],
    value: &[u8],
    request_id: u16,
    layout: RecordLayout,
) {
    let encoding = layout.params_encoding;
    buf.reserve(HEADER_SIZE + encoding.pair_len(name.len(), value.len()) + ZERO_PADDING.len());

    let padding = put_header(
        buf,
        RecordType::Params,
        request_id,
        encoding.content_length(name.len(), value.len()),
        layout.align_padding,
    );
    match encoding {
        NameValueEncoding::Legacy => {
            buf.put_slice(&ParamsLengths::new(name.len() as u32, value.len() as u32).encode())
        }
        NameValueEncoding::Standard => {
            encode_length_into(name.len(), encoding, buf);
            encode_length_into(value.len(), encoding, buf);
        }
    }
    buf.put_slice(name);
    buf.put_slice(value);
    buf.put_slice(&ZERO_PADDING[..padding as usize]);
}
