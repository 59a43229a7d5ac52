//! Protocol module - record header, begin-request body, params and record assembly.
//!
//! This module implements the FastCGI record codec:
//! - 8-byte header encoding/decoding
//! - 8-byte begin-request body
//! - Name/value pair length prefixes
//! - Assembly of complete records into a reusable buffer

mod begin_request;
mod params;
mod record;
mod wire_format;

pub use begin_request::{flags, BeginRequestBody, Role, BEGIN_REQUEST_BODY_SIZE};
pub use params::{
    decode_length, encode_length_into, prefix_len, NameValueEncoding, ParamsLengths,
    LONG_LENGTH_MAX, LONG_PREFIX_SIZE, SHORT_LENGTH_MAX,
};
pub use record::{
    begin_request_record, narrow_u16, params_end_record, put_param, put_record, RecordLayout,
    BEGIN_REQUEST_RECORD_SIZE,
};
pub use wire_format::{
    decode_header, encode_header, pack_u16, padding_for, unpack_u16, Header, RecordType,
    FCGI_VERSION, HEADER_SIZE, MAX_CONTENT_LENGTH, RECORD_ALIGNMENT,
};
