//! Transport module - blocking stream sockets.
//!
//! Provides one capability interface, [`Transport`], over:
//! - TCP/IP sockets ([`TcpTransport`])
//! - Unix Domain Sockets ([`UnixTransport`], unix only)
//!
//! [`SocketTransport`] is the closed set of both, selected from an [`Address`].
//!
//! Every read and write is a single blocking system call. Short reads and
//! partial writes are returned to the caller as-is.

mod address;
mod tcp;
#[cfg(unix)]
mod unix;

use std::io::{Read, Write};

pub use address::Address;
pub use tcp::TcpTransport;
#[cfg(unix)]
pub use unix::{UnixTransport, MAX_SOCKET_PATH_LEN, SUN_PATH_CAPACITY};

use crate::error::{FcgiError, Result};

/// Byte-level access to one connected stream socket.
///
/// A transport owns at most one socket. `connect` replaces it, `close`
/// releases it, and dropping the transport closes it.
pub trait Transport {
    /// Close any existing connection, then connect to the configured address.
    fn connect(&mut self) -> Result<()>;

    /// One blocking receive. May return fewer bytes than `buf` holds; `Ok(0)`
    /// means the peer closed the connection.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// One blocking send. May write fewer bytes than `buf` holds.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Release the socket. Safe to call repeatedly or when never connected.
    fn close(&mut self);

    /// True while a socket is held, i.e. between a successful `connect` and `close`.
    fn is_connected(&self) -> bool;
}

pub(crate) fn stream_read<S: Read>(stream: Option<&mut S>, buf: &mut [u8]) -> Result<usize> {
    let stream = stream.ok_or(FcgiError::NotConnected)?;
    Ok(stream.read(buf)?)
}

pub(crate) fn stream_write<S: Write>(stream: Option<&mut S>, buf: &[u8]) -> Result<usize> {
    let stream = stream.ok_or(FcgiError::NotConnected)?;
    Ok(stream.write(buf)?)
}

/// Either socket variant behind one type.
#[derive(Debug)]
pub enum SocketTransport {
    Tcp(TcpTransport),
    #[cfg(unix)]
    Unix(UnixTransport),
}

impl SocketTransport {
    /// Create an unconnected transport for `address`.
    pub fn new(address: &Address) -> Result<Self> {
        match address {
            Address::Tcp(addr) => Ok(Self::Tcp(TcpTransport::from_socket_addr(*addr))),
            #[cfg(unix)]
            Address::Unix(path) => Ok(Self::Unix(UnixTransport::new(path)?)),
            #[cfg(not(unix))]
            Address::Unix(path) => Err(FcgiError::InvalidAddress(format!(
                "unix sockets are not supported on this platform: {}",
                path.display()
            ))),
        }
    }

    /// Create a transport for `address` and connect immediately.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fcgi_client::transport::{Address, SocketTransport};
    ///
    /// let address: Address = "unix:/run/php/php-fpm.sock".parse()?;
    /// let transport = SocketTransport::open(&address)?;
    /// # Ok::<(), fcgi_client::FcgiError>(())
    /// ```
    pub fn open(address: &Address) -> Result<Self> {
        let mut transport = Self::new(address)?;
        transport.connect()?;
        Ok(transport)
    }

    fn as_dyn(&mut self) -> &mut dyn Transport {
        match self {
            Self::Tcp(t) => t,
            #[cfg(unix)]
            Self::Unix(t) => t,
        }
    }
}

impl Transport for SocketTransport {
    fn connect(&mut self) -> Result<()> {
        self.as_dyn().connect()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.as_dyn().read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.as_dyn().write(buf)
    }

    fn close(&mut self) {
        self.as_dyn().close()
    }

    fn is_connected(&self) -> bool {
        match self {
            Self::Tcp(t) => t.is_connected(),
            #[cfg(unix)]
            Self::Unix(t) => t.is_connected(),
        }
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
