//! Unix domain socket transport.

use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use super::{stream_read, stream_write, Transport};
use crate::error::{FcgiError, Result};

/// Size of `sockaddr_un::sun_path`, including the trailing NUL.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const SUN_PATH_CAPACITY: usize = 108;

/// Size of `sockaddr_un::sun_path`, including the trailing NUL.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub const SUN_PATH_CAPACITY: usize = 104;

/// Longest socket path accepted, in bytes.
pub const MAX_SOCKET_PATH_LEN: usize = SUN_PATH_CAPACITY - 1;

fn check_path(path: &Path) -> Result<()> {
    let len = path.as_os_str().len();
    if len == 0 {
        return Err(FcgiError::InvalidAddress("empty socket path".to_string()));
    }
    if len > MAX_SOCKET_PATH_LEN {
        return Err(FcgiError::PathTooLong {
            len,
            max: MAX_SOCKET_PATH_LEN,
        });
    }
    Ok(())
}

/// Transport over a Unix domain stream socket.
#[derive(Debug)]
pub struct UnixTransport {
    path: PathBuf,
    stream: Option<UnixStream>,
}

impl UnixTransport {
    /// Create an unconnected transport.
    ///
    /// Fails if the path is empty or longer than the platform allows.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            stream: None,
        })
    }

    /// Create a transport and connect immediately.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut transport = Self::new(path)?;
        transport.connect()?;
        Ok(transport)
    }

    /// Drop any existing connection, then connect to a new path.
    pub fn connect_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.close();
        let path = path.as_ref();
        check_path(path)?;
        self.path = path.to_path_buf();
        self.connect()
    }

    /// Socket path this transport connects to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a reference to the underlying stream, if connected.
    pub fn inner(&self) -> Option<&UnixStream> {
        self.stream.as_ref()
    }
}

impl Transport for UnixTransport {
    fn connect(&mut self) -> Result<()> {
        self.close();
        let stream = UnixStream::connect(&self.path)?;
        tracing::debug!("Connected to unix:{}", self.path.display());
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
            tracing::debug!("Closed connection to unix:{}", self.path.display());
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for UnixTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::temp_socket_path;
    use std::io::{Read, Write};
    use std::os::unix::net::UnixListener;

    #[test]
    fn test_path_limit() {
        let ok = "/".repeat(MAX_SOCKET_PATH_LEN);
        assert!(UnixTransport::new(&ok).is_ok());

        let too_long = "a".repeat(MAX_SOCKET_PATH_LEN + 1);
        match UnixTransport::new(&too_long) {
            Err(FcgiError::PathTooLong { len, max }) => {
                assert_eq!(len, MAX_SOCKET_PATH_LEN + 1);
                assert_eq!(max, MAX_SOCKET_PATH_LEN);
            }
            other => panic!("expected PathTooLong, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(UnixTransport::new(""), Err(FcgiError::InvalidAddress(_))));
    }

    #[test]
    fn test_open_unbound_path_fails() {
        let path = temp_socket_path("unbound");
        assert!(matches!(UnixTransport::open(&path), Err(FcgiError::Io(_))));
    }

    #[test]
    fn test_open_round_trip_and_reconnect() {
        let path = temp_socket_path("roundtrip");
        let listener = UnixListener::bind(&path).unwrap();

        let mut transport = UnixTransport::open(&path).unwrap();
        let (mut first, _) = listener.accept().unwrap();

        first.write_all(b"pong").unwrap();
        let mut buf = [0u8; 4];
        let n = transport.read(&mut buf).unwrap();
        assert!(n > 0);
        assert_eq!(&buf[..n], &b"pong"[..n]);

        // Reconnecting releases the first socket before opening a new one
        transport.connect().unwrap();
        let (_second, _) = listener.accept().unwrap();
        let mut rest = Vec::new();
        first.read_to_end(&mut rest).unwrap();

        drop(transport);
        let _ = std::fs::remove_file(&path);
    }
}
