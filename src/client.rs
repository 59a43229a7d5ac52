//! Record builder over a transport.
//!
//! [`FcgiClient`] turns request-level calls into FastCGI records and writes
//! each record with a single transport write:
//! 1. `start_request` - begin-request record
//! 2. `send_param` (repeated) - one params record per name/value pair
//! 3. `end_params` - empty params record closing the stream
//!
//! Ordering is not enforced; callers drive the sequence.
//!
//! # Example
//!
//! ```no_run
//! use fcgi_client::protocol::{RecordType, Role};
//! use fcgi_client::FcgiClient;
//!
//! let mut client = FcgiClient::builder().connect("127.0.0.1:9000".parse()?)?;
//!
//! client.start_request(Role::Responder, false, 1)?;
//! client.send_param("SCRIPT_FILENAME", "/srv/www/index.php", 1)?;
//! client.send_param("REQUEST_METHOD", "GET", 1)?;
//! client.end_params(1)?;
//! client.send_record(RecordType::Stdin, 1, b"")?;
//!
//! let header = client.read_header()?;
//! println!("{:?} with {} bytes", header.kind(), header.content_length);
//! # Ok::<(), fcgi_client::FcgiError>(())
//! ```

use bytes::BytesMut;

use crate::config::ClientConfig;
use crate::error::{FcgiError, Result};
use crate::protocol::{
    begin_request_record, params_end_record, put_param, put_record, Header, NameValueEncoding,
    RecordLayout, RecordType, Role, HEADER_SIZE,
};
use crate::transport::{Address, SocketTransport, Transport};

/// Initial capacity of the scratch buffer records are assembled in.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 1024;

/// Builder for configuring and creating a [`FcgiClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    layout: RecordLayout,
    address: Option<Address>,
}

impl ClientBuilder {
    /// Create a new client builder with the default record layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            layout: config.layout(),
            address: Some(config.address.clone()),
        }
    }

    /// Set the name/value pair layout used by `send_param`.
    pub fn params_encoding(mut self, encoding: NameValueEncoding) -> Self {
        self.layout.params_encoding = encoding;
        self
    }

    /// Pad record content to 8-byte boundaries.
    pub fn align_padding(mut self, enabled: bool) -> Self {
        self.layout.align_padding = enabled;
        self
    }

    /// Set the address used by [`ClientBuilder::open`].
    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Wrap an existing transport.
    pub fn build<T: Transport>(self, transport: T) -> FcgiClient<T> {
        FcgiClient {
            transport,
            layout: self.layout,
            scratch: BytesMut::with_capacity(DEFAULT_SCRATCH_CAPACITY),
        }
    }

    /// Connect to `address` and wrap the resulting socket.
    pub fn connect(self, address: Address) -> Result<FcgiClient<SocketTransport>> {
        let transport = SocketTransport::open(&address)?;
        Ok(self.build(transport))
    }

    /// Connect to the configured address.
    pub fn open(mut self) -> Result<FcgiClient<SocketTransport>> {
        let address = self
            .address
            .take()
            .ok_or_else(|| FcgiError::InvalidAddress("no address configured".to_string()))?;
        self.connect(address)
    }
}

/// FastCGI record builder bound to one transport.
///
/// The client is not synchronized; share it across threads only behind
/// external locking.
#[derive(Debug)]
pub struct FcgiClient<T: Transport> {
    transport: T,
    layout: RecordLayout,
    scratch: BytesMut,
}

impl FcgiClient<SocketTransport> {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport> FcgiClient<T> {
    /// Wrap a transport with the default record layout.
    pub fn new(transport: T) -> Self {
        ClientBuilder::new().build(transport)
    }

    /// Record layout in use.
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Write a begin-request record (16 bytes).
    ///
    /// Returns bytes written by the single transport write.
    pub fn start_request(&mut self, role: Role, keep_alive: bool, request_id: u16) -> Result<usize> {
        let record = begin_request_record(role, keep_alive, request_id);
        tracing::trace!(
            "Begin request {} role={:?} keep_alive={}",
            request_id,
            role,
            keep_alive
        );
        Self::write_record(&mut self.transport, &record)
    }

    /// Write one params record carrying `name` and `value`.
    pub fn send_param(
        &mut self,
        name: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        request_id: u16,
    ) -> Result<usize> {
        let (name, value) = (name.as_ref(), value.as_ref());
        self.scratch.clear();
        put_param(&mut self.scratch, name, value, request_id, self.layout);
        tracing::trace!(
            "Param for request {}: {} ({} value bytes)",
            request_id,
            String::from_utf8_lossy(name),
            value.len()
        );
        Self::write_record(&mut self.transport, &self.scratch)
    }

    /// Write one params record per pair, returning the total bytes written.
    pub fn send_params<I, K, V>(&mut self, params: I, request_id: u16) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let mut total = 0;
        for (name, value) in params {
            total += self.send_param(name, value, request_id)?;
        }
        Ok(total)
    }

    /// Write the empty params record that terminates the params stream.
    pub fn end_params(&mut self, request_id: u16) -> Result<usize> {
        tracing::trace!("End params for request {}", request_id);
        Self::write_record(&mut self.transport, &params_end_record(request_id))
    }

    /// Write a record of any type.
    ///
    /// Empty `content` produces a stream terminator (e.g. end of stdin).
    /// Content longer than 65535 bytes is not split; its declared length is
    /// truncated to 16 bits.
    pub fn send_record(&mut self, record_type: RecordType, request_id: u16, content: &[u8]) -> Result<usize> {
        self.scratch.clear();
        put_record(
            &mut self.scratch,
            record_type,
            request_id,
            content,
            self.layout.align_padding,
        );
        tracing::trace!(
            "Record {:?} for request {} ({} content bytes)",
            record_type,
            request_id,
            content.len()
        );
        Self::write_record(&mut self.transport, &self.scratch)
    }

    /// Read one record header with a single transport read.
    ///
    /// A zero-byte read is reported as `ConnectionClosed`; a partial header
    /// as `ShortRead`. Neither is retried.
    pub fn read_header(&mut self) -> Result<Header> {
        let mut buf = [0u8; HEADER_SIZE];
        let n = self.transport.read(&mut buf)?;
        if n == 0 {
            return Err(FcgiError::ConnectionClosed);
        }
        let header = Header::decode(&buf[..n]).ok_or(FcgiError::ShortRead {
            expected: HEADER_SIZE,
            actual: n,
        })?;
        tracing::trace!(
            "Header type={} request={} content={} padding={}",
            header.record_type,
            header.request_id,
            header.content_length,
            header.padding_length
        );
        Ok(header)
    }

    /// Raw read from the transport.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.transport.read(buf)
    }

    /// Raw write to the transport.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.transport.write(buf)
    }

    /// Close the underlying transport. Idempotent.
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport (e.g. to reconnect).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Unwrap the client, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn write_record(transport: &mut T, record: &[u8]) -> Result<usize> {
        let written = transport.write(record)?;
        if written < record.len() {
            tracing::warn!("Partial record write: {} of {} bytes", written, record.len());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory transport: records every write, serves reads from a queue.
    #[derive(Debug, Default)]
    struct MockTransport {
        written: Vec<Vec<u8>>,
        reads: VecDeque<Vec<u8>>,
        write_limit: Option<usize>,
        connected: bool,
        closes: usize,
    }

    impl MockTransport {
        fn connected() -> Self {
            Self {
                connected: true,
                ..Self::default()
            }
        }
    }

    impl Transport for MockTransport {
        fn connect(&mut self) -> Result<()> {
            self.connected = true;
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            if !self.connected {
                return Err(FcgiError::NotConnected);
            }
            let Some(chunk) = self.reads.pop_front() else {
                return Ok(0);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            Ok(n)
        }

        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            if !self.connected {
                return Err(FcgiError::NotConnected);
            }
            let n = self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
            self.written.push(buf[..n].to_vec());
            Ok(n)
        }

        fn close(&mut self) {
            if self.connected {
                self.connected = false;
                self.closes += 1;
            }
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    #[test]
    fn test_start_request_writes_16_bytes_once() {
        let mut client = FcgiClient::new(MockTransport::connected());
        for role in [Role::Responder, Role::Authorizer, Role::Filter] {
            for keep_alive in [false, true] {
                assert_eq!(client.start_request(role, keep_alive, 0xBEEF).unwrap(), 16);
            }
        }
        assert_eq!(client.transport().written.len(), 6);
        assert_eq!(
            client.transport().written[1],
            vec![1, 1, 0xBE, 0xEF, 0, 8, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_send_param_single_write_legacy_layout() {
        let mut client = FcgiClient::new(MockTransport::connected());
        assert_eq!(client.send_param("A", "B", 1).unwrap(), 18);

        let written = &client.transport().written;
        assert_eq!(written.len(), 1);
        assert_eq!(
            written[0],
            vec![1, 4, 0, 1, 0, 2, 0, 0, 0x80, 0, 0, 1, 0x80, 0, 0, 1, b'A', b'B']
        );
    }

    #[test]
    fn test_send_param_standard_layout_with_padding() {
        let mut client = ClientBuilder::new()
            .params_encoding(NameValueEncoding::Standard)
            .align_padding(true)
            .build(MockTransport::connected());
        assert_eq!(client.send_param("HOST", "localhost", 9).unwrap(), 8 + 16);

        let record = &client.transport().written[0];
        let header = Header::decode(record).unwrap();
        assert_eq!(header.content_length, 15);
        assert_eq!(header.padding_length, 1);
        assert_eq!(&record[8..10], &[4, 9]);
        assert_eq!(record[record.len() - 1], 0);
    }

    #[test]
    fn test_scratch_buffer_reused_between_params() {
        let mut client = FcgiClient::new(MockTransport::connected());
        client.send_param("A_LONGER_NAME", "value", 1).unwrap();
        client.send_param("B", "", 1).unwrap();

        let written = &client.transport().written;
        assert_eq!(written[1].len(), 8 + 8 + 1);
        assert_eq!(Header::decode(&written[1]).unwrap().content_length, 1);
    }

    #[test]
    fn test_scratch_allocation_kept_across_records() {
        let mut client = FcgiClient::new(MockTransport::connected());
        let start = client.scratch.as_ptr();
        client.send_param("NAME", "value", 1).unwrap();
        client.send_record(RecordType::Stdin, 1, b"body").unwrap();
        client.send_param("OTHER", "", 1).unwrap();

        assert_eq!(client.scratch.as_ptr(), start);
        assert!(client.scratch.capacity() >= DEFAULT_SCRATCH_CAPACITY);
        assert_eq!(client.transport().written.len(), 3);
    }

    #[test]
    fn test_send_params_sums_writes() {
        let mut client = FcgiClient::new(MockTransport::connected());
        let total = client
            .send_params([("A", "B"), ("CD", "EF")], 3)
            .unwrap();
        assert_eq!(total, 18 + 20);
        assert_eq!(client.transport().written.len(), 2);
    }

    #[test]
    fn test_end_params_is_empty_params_header() {
        let mut client = FcgiClient::new(MockTransport::connected());
        assert_eq!(client.end_params(5).unwrap(), 8);

        let header = Header::decode(&client.transport().written[0]).unwrap();
        assert_eq!(header.kind().unwrap(), RecordType::Params);
        assert_eq!(header.content_length, 0);
        assert_eq!(header.request_id, 5);
    }

    #[test]
    fn test_send_record_stdin() {
        let mut client = FcgiClient::new(MockTransport::connected());
        assert_eq!(client.send_record(RecordType::Stdin, 1, b"body").unwrap(), 12);
        assert_eq!(client.send_record(RecordType::Stdin, 1, b"").unwrap(), 8);
        assert_eq!(&client.transport().written[0][8..], b"body");
    }

    #[test]
    fn test_partial_write_is_returned() {
        let mut transport = MockTransport::connected();
        transport.write_limit = Some(10);
        let mut client = FcgiClient::new(transport);
        assert_eq!(client.start_request(Role::Responder, true, 1).unwrap(), 10);
    }

    #[test]
    fn test_read_header() {
        let mut transport = MockTransport::connected();
        transport.reads.push_back(vec![1, 6, 0, 1, 0, 5, 3, 0]);
        let mut client = FcgiClient::new(transport);

        let header = client.read_header().unwrap();
        assert_eq!(header.kind().unwrap(), RecordType::Stdout);
        assert_eq!(header.content_length, 5);
        assert_eq!(header.body_len(), 8);
    }

    #[test]
    fn test_read_header_short_read_not_retried() {
        let mut transport = MockTransport::connected();
        transport.reads.push_back(vec![1, 6, 0]);
        transport.reads.push_back(vec![1, 0, 5, 0, 0]);
        let mut client = FcgiClient::new(transport);

        assert!(matches!(
            client.read_header(),
            Err(FcgiError::ShortRead { expected: 8, actual: 3 })
        ));
        assert_eq!(client.transport().reads.len(), 1);
    }

    #[test]
    fn test_read_header_eof() {
        let mut client = FcgiClient::new(MockTransport::connected());
        assert!(matches!(client.read_header(), Err(FcgiError::ConnectionClosed)));
    }

    #[test]
    fn test_errors_propagate_from_transport() {
        let mut client = FcgiClient::new(MockTransport::default());
        assert!(matches!(client.end_params(1), Err(FcgiError::NotConnected)));
        assert!(matches!(client.send_param("A", "B", 1), Err(FcgiError::NotConnected)));
        assert!(matches!(client.read_header(), Err(FcgiError::NotConnected)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut client = FcgiClient::new(MockTransport::connected());
        client.close();
        client.close();
        assert_eq!(client.transport().closes, 1);
        assert!(!client.transport().is_connected());

        client.transport_mut().connect().unwrap();
        assert_eq!(client.write(b"raw").unwrap(), 3);
        assert_eq!(client.into_transport().written[0], b"raw".to_vec());
    }

    #[test]
    fn test_builder_open_without_address() {
        assert!(matches!(
            ClientBuilder::new().open(),
            Err(FcgiError::InvalidAddress(_))
        ));
    }
}
