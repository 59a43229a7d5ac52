//! TCP/IP transport.

use std::net::{SocketAddrV4, TcpStream};

use super::address::parse_ipv4;
use super::{stream_read, stream_write, Transport};
use crate::error::Result;

/// Transport over a TCP connection to an IPv4 address.
///
/// # Example
///
/// ```no_run
/// use fcgi_client::transport::{TcpTransport, Transport};
///
/// let mut transport = TcpTransport::open("127.0.0.1", 9000)?;
/// transport.write(&[1, 4, 0, 1, 0, 0, 0, 0])?;
/// # Ok::<(), fcgi_client::FcgiError>(())
/// ```
#[derive(Debug)]
pub struct TcpTransport {
    addr: SocketAddrV4,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Create an unconnected transport.
    ///
    /// Fails with `InvalidAddress` if `addr` is not a dotted-quad IPv4 string.
    pub fn new(addr: &str, port: u16) -> Result<Self> {
        Ok(Self::from_socket_addr(SocketAddrV4::new(parse_ipv4(addr)?, port)))
    }

    /// Create an unconnected transport from an already parsed address.
    pub fn from_socket_addr(addr: SocketAddrV4) -> Self {
        Self { addr, stream: None }
    }

    /// Create a transport and connect immediately.
    pub fn open(addr: &str, port: u16) -> Result<Self> {
        let mut transport = Self::new(addr, port)?;
        transport.connect()?;
        Ok(transport)
    }

    /// Drop any existing connection, then connect to a new address.
    pub fn connect_to(&mut self, addr: &str, port: u16) -> Result<()> {
        self.close();
        self.addr = SocketAddrV4::new(parse_ipv4(addr)?, port);
        self.connect()
    }

    /// Address this transport connects to.
    pub fn addr(&self) -> SocketAddrV4 {
        self.addr
    }

    /// Get a reference to the underlying stream, if connected.
    pub fn inner(&self) -> Option<&TcpStream> {
        self.stream.as_ref()
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> Result<()> {
        self.close();
        let stream = TcpStream::connect(self.addr)?;
        tracing::debug!("Connected to tcp://{}", self.addr);
        self.stream = Some(stream);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        stream_read(self.stream.as_mut(), buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        stream_write(self.stream.as_mut(), buf)
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Closed connection to tcp://{}", self.addr);
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
