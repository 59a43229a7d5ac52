//! Record header encoding and decoding.
//!
//! Every FastCGI record starts with the same 8-byte header:
//! ```text
//! ┌─────────┬──────┬────────────┬────────────────┬─────────┬──────────┐
//! │ Version │ Type │ Request ID │ Content Length │ Padding │ Reserved │
//! │ 1 byte  │1 byte│ uint16 BE  │ uint16 BE      │ 1 byte  │ 1 byte   │
//! └─────────┴──────┴────────────┴────────────────┴─────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.

use crate::error::{FcgiError, Result};

/// Header size in bytes (fixed, exactly 8).
pub const HEADER_SIZE: usize = 8;

/// Protocol version carried in every header.
pub const FCGI_VERSION: u8 = 1;

/// Records are padded to a multiple of this many bytes when alignment is on.
pub const RECORD_ALIGNMENT: usize = 8;

/// Largest content length a single record can declare.
pub const MAX_CONTENT_LENGTH: usize = u16::MAX as usize;

/// Record type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    BeginRequest = 1,
    AbortRequest = 2,
    EndRequest = 3,
    Params = 4,
    Stdin = 5,
    Stdout = 6,
    Stderr = 7,
    Data = 8,
    GetValues = 9,
    GetValuesResult = 10,
    UnknownType = 11,
}

impl RecordType {
    /// Wire value of this record type.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for RecordType {
    type Error = FcgiError;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            1 => Self::BeginRequest,
            2 => Self::AbortRequest,
            3 => Self::EndRequest,
            4 => Self::Params,
            5 => Self::Stdin,
            6 => Self::Stdout,
            7 => Self::Stderr,
            8 => Self::Data,
            9 => Self::GetValues,
            10 => Self::GetValuesResult,
            11 => Self::UnknownType,
            other => return Err(FcgiError::UnknownRecordType(other)),
        })
    }
}

/// Pack a 16-bit value into its two big-endian bytes `[hi, lo]`.
#[inline]
pub fn pack_u16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Combine two big-endian bytes back into `(hi << 8) | lo`.
#[inline]
pub fn unpack_u16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Number of zero bytes needed to bring `content_length` to an 8-byte boundary.
#[inline]
pub fn padding_for(content_length: usize) -> u8 {
    ((RECORD_ALIGNMENT - content_length % RECORD_ALIGNMENT) % RECORD_ALIGNMENT) as u8
}

/// Decoded record header.
///
/// Fields are kept verbatim; decoding performs no validation, so a header read
/// off the wire may carry an unknown type or a non-1 version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version (always 1 when encoded by this crate).
    pub version: u8,
    /// Raw record type byte (see [`RecordType`]).
    pub record_type: u8,
    /// Request identifier chosen by the caller.
    pub request_id: u16,
    /// Content length in bytes, not counting padding.
    pub content_length: u16,
    /// Number of padding bytes following the content.
    pub padding_length: u8,
    /// Reserved, always 0 when encoded.
    pub reserved: u8,
}

impl Header {
    /// Create a new header with no padding.
    pub fn new(record_type: RecordType, content_length: u16, request_id: u16) -> Self {
        Self {
            version: FCGI_VERSION,
            record_type: record_type.as_u8(),
            request_id,
            content_length,
            padding_length: 0,
            reserved: 0,
        }
    }

    /// Set the padding length.
    #[inline]
    pub fn with_padding(mut self, padding_length: u8) -> Self {
        self.padding_length = padding_length;
        self
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use fcgi_client::protocol::{Header, RecordType};
    ///
    /// let header = Header::new(RecordType::BeginRequest, 8, 1);
    /// assert_eq!(header.encode(), [1, 1, 0, 1, 0, 8, 0, 0]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (8 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0] = self.version;
        buf[1] = self.record_type;
        buf[2..4].copy_from_slice(&pack_u16(self.request_id));
        buf[4..6].copy_from_slice(&pack_u16(self.content_length));
        buf[6] = self.padding_length;
        buf[7] = self.reserved;
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use fcgi_client::protocol::Header;
    ///
    /// let header = Header::decode(&[1, 6, 0, 1, 0x01, 0x00, 0, 0]).unwrap();
    /// assert_eq!(header.request_id, 1);
    /// assert_eq!(header.content_length, 256);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            version: buf[0],
            record_type: buf[1],
            request_id: unpack_u16([buf[2], buf[3]]),
            content_length: unpack_u16([buf[4], buf[5]]),
            padding_length: buf[6],
            reserved: buf[7],
        })
    }

    /// Typed record type, if the byte is in the defined range.
    #[inline]
    pub fn kind(&self) -> Result<RecordType> {
        RecordType::try_from(self.record_type)
    }

    /// Bytes that follow this header on the wire (content plus padding).
    #[inline]
    pub fn body_len(&self) -> usize {
        self.content_length as usize + self.padding_length as usize
    }

    /// Check if this record terminates its stream (empty content).
    #[inline]
    pub fn is_stream_end(&self) -> bool {
        self.content_length == 0
    }
}

/// Encode a header to bytes (standalone function).
#[inline]
pub fn encode_header(header: &Header) -> [u8; HEADER_SIZE] {
    header.encode()
}

/// Decode a header from bytes (standalone function).
#[inline]
pub fn decode_header(buf: &[u8]) -> Option<Header> {
    Header::decode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_request_header_bytes() {
        let header = Header::new(RecordType::BeginRequest, 8, 1);
        assert_eq!(header.encode(), [0x01, 0x01, 0x00, 0x01, 0x00, 0x08, 0x00, 0x00]);
    }

    #[test]
    fn test_header_big_endian_byte_order() {
        let header = Header::new(RecordType::Stdin, 0x0A0B, 0x0102).with_padding(5);
        let bytes = header.encode();

        assert_eq!(bytes[0], FCGI_VERSION);
        assert_eq!(bytes[1], 5);

        // Request ID: 0x0102 in BE
        assert_eq!(bytes[2], 0x01);
        assert_eq!(bytes[3], 0x02);

        // Content length: 0x0A0B in BE
        assert_eq!(bytes[4], 0x0A);
        assert_eq!(bytes[5], 0x0B);

        assert_eq!(bytes[6], 5);
        assert_eq!(bytes[7], 0);
    }

    #[test]
    fn test_u16_split_round_trip_all_values() {
        for v in 0..=u16::MAX {
            let [hi, lo] = pack_u16(v);
            assert_eq!(((hi as u16) << 8) | lo as u16, v);
            assert_eq!(unpack_u16([hi, lo]), v);
        }
    }

    #[test]
    fn test_request_id_and_content_length_extremes() {
        for v in [0u16, 1, 0x00FF, 0x0100, 0x7FFF, 0x8000, u16::MAX] {
            let header = Header::new(RecordType::Params, v, v);
            let decoded = Header::decode(&header.encode()).unwrap();
            assert_eq!(decoded.request_id, v);
            assert_eq!(decoded.content_length, v);
        }
    }

    #[test]
    fn test_decode_too_short_buffer() {
        let buf = [0u8; 7]; // One byte short
        assert!(Header::decode(&buf).is_none());
    }

    #[test]
    fn test_decode_keeps_unknown_fields_verbatim() {
        let header = Header::decode(&[2, 42, 0, 9, 0, 3, 1, 7]).unwrap();
        assert_eq!(header.version, 2);
        assert_eq!(header.record_type, 42);
        assert_eq!(header.reserved, 7);
        assert!(matches!(header.kind(), Err(FcgiError::UnknownRecordType(42))));
        assert_eq!(header.body_len(), 4);
    }

    #[test]
    fn test_record_type_values() {
        for raw in 1u8..=11 {
            let kind = RecordType::try_from(raw).unwrap();
            assert_eq!(kind.as_u8(), raw);
        }
        assert!(RecordType::try_from(0).is_err());
        assert!(RecordType::try_from(12).is_err());
        assert_eq!(RecordType::Params.as_u8(), 4);
        assert_eq!(RecordType::UnknownType.as_u8(), 11);
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 7);
        assert_eq!(padding_for(8), 0);
        assert_eq!(padding_for(13), 3);
        assert_eq!(padding_for(MAX_CONTENT_LENGTH), 1);
    }

    #[test]
    fn test_standalone_functions() {
        let header = Header::new(RecordType::Params, 0, 3);
        let encoded = encode_header(&header);
        assert_eq!(decode_header(&encoded), Some(header));
        assert!(header.is_stream_end());
    }
}
