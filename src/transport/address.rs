//! Connection addresses.
//!
//! Accepted string forms:
//! - `tcp://127.0.0.1:9000` or `127.0.0.1:9000`
//! - `unix:/run/php-fpm.sock`, `unix:///run/php-fpm.sock`
//! - a bare path starting with `/` or `.`

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FcgiError, Result};

/// Where a FastCGI application listens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Address {
    /// IPv4 address and port.
    Tcp(SocketAddrV4),
    /// Unix domain socket path.
    Unix(PathBuf),
}

/// Parse a dotted-quad IPv4 string.
pub(crate) fn parse_ipv4(addr: &str) -> Result<Ipv4Addr> {
    addr.parse::<Ipv4Addr>()
        .map_err(|_| FcgiError::InvalidAddress(format!("not a dotted-quad IPv4 address: {addr:?}")))
}

impl Address {
    /// TCP address from a dotted-quad string and a port.
    pub fn tcp(addr: &str, port: u16) -> Result<Self> {
        Ok(Self::Tcp(SocketAddrV4::new(parse_ipv4(addr)?, port)))
    }

    /// Unix socket address from a filesystem path.
    pub fn unix(path: impl AsRef<Path>) -> Self {
        Self::Unix(path.as_ref().to_path_buf())
    }

    /// Check if this is a Unix domain socket address.
    #[inline]
    pub fn is_unix(&self) -> bool {
        matches!(self, Self::Unix(_))
    }
}

impl FromStr for Address {
    type Err = FcgiError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(rest) = s.strip_prefix("tcp://") {
            return rest
                .parse::<SocketAddrV4>()
                .map(Self::Tcp)
                .map_err(|_| FcgiError::InvalidAddress(s.to_string()));
        }

        if let Some(rest) = s.strip_prefix("unix://").or_else(|| s.strip_prefix("unix:")) {
            if rest.is_empty() {
                return Err(FcgiError::InvalidAddress(s.to_string()));
            }
            return Ok(Self::unix(rest));
        }

        if s.starts_with('/') || s.starts_with('.') {
            return Ok(Self::unix(s));
        }

        s.parse::<SocketAddrV4>()
            .map(Self::Tcp)
            .map_err(|_| FcgiError::InvalidAddress(s.to_string()))
    }
}

impl TryFrom<String> for Address {
    type Error = FcgiError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}
