//! Begin-request body encoding.
//!
//! ```text
//! ┌───────────┬───────┬──────────┐
//! │ Role      │ Flags │ Reserved │
//! │ uint16 BE │1 byte │ 5 bytes  │
//! └───────────┴───────┴──────────┘
//! ```

use serde::{Deserialize, Serialize};

use super::wire_format::{pack_u16, unpack_u16};
use crate::error::{FcgiError, Result};

/// Begin-request body size in bytes.
pub const BEGIN_REQUEST_BODY_SIZE: usize = 8;

/// Flag constants for the begin-request body.
pub mod flags {
    /// Keep the connection open after the request completes.
    pub const KEEP_ALIVE: u8 = 0b0000_0001;
}

/// Role requested from the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum Role {
    /// Produce a complete response.
    #[default]
    Responder = 1,
    /// Decide whether the request is authorized.
    Authorizer = 2,
    /// Post-process a data stream.
    Filter = 3,
}

impl Role {
    /// Wire value of this role.
    #[inline]
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Role {
    type Error = FcgiError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            1 => Ok(Self::Responder),
            2 => Ok(Self::Authorizer),
            3 => Ok(Self::Filter),
            other => Err(FcgiError::UnknownRole(other)),
        }
    }
}

/// Body of a begin-request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeginRequestBody {
    role: u16,
    flags: u8,
}

impl BeginRequestBody {
    /// Body for `role`, with the keep-alive flag set when `keep_alive` is true.
    pub fn new(role: Role, keep_alive: bool) -> Self {
        let mut body = Self {
            role: role.as_u16(),
            flags: 0,
        };
        body.set_keep_alive(keep_alive);
        body
    }

    /// Encode the body. Reserved bytes are always zero.
    ///
    /// # Example
    ///
    /// ```
    /// use fcgi_client::protocol::{BeginRequestBody, Role};
    ///
    /// let body = BeginRequestBody::new(Role::Responder, true);
    /// assert_eq!(body.encode(), [0, 1, 1, 0, 0, 0, 0, 0]);
    /// ```
    pub fn encode(&self) -> [u8; BEGIN_REQUEST_BODY_SIZE] {
        let mut buf = [0u8; BEGIN_REQUEST_BODY_SIZE];
        buf[0..2].copy_from_slice(&pack_u16(self.role));
        buf[2] = self.flags;
        buf
    }

    /// Decode a body, keeping the raw role value.
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < BEGIN_REQUEST_BODY_SIZE {
            return None;
        }
        Some(Self {
            role: unpack_u16([buf[0], buf[1]]),
            flags: buf[2],
        })
    }

    /// Raw role value.
    #[inline]
    pub fn role(&self) -> u16 {
        self.role
    }

    /// Typed role, if the raw value is one of the defined roles.
    #[inline]
    pub fn role_kind(&self) -> Result<Role> {
        Role::try_from(self.role)
    }

    #[inline]
    pub fn keep_alive(&self) -> bool {
        self.flags & flags::KEEP_ALIVE != 0
    }

    #[inline]
    pub fn set_role(&mut self, role: Role) {
        self.role = role.as_u16();
    }

    /// Set or clear keep-alive. Other flag bits are cleared.
    #[inline]
    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.flags = if keep_alive { flags::KEEP_ALIVE } else { 0 };
    }
}
