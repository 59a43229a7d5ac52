//! Client configuration.
//!
//! # Example
//!
//! ```
//! use fcgi_client::config::ClientConfig;
//! use fcgi_client::protocol::NameValueEncoding;
//!
//! let config = ClientConfig::from_json(
//!     r#"{ "address": "unix:/run/php/php-fpm.sock", "params_encoding": "standard" }"#,
//! )?;
//! assert!(config.address.is_unix());
//! assert_eq!(config.params_encoding, NameValueEncoding::Standard);
//! assert!(!config.align_padding);
//! # Ok::<(), fcgi_client::FcgiError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::client::{ClientBuilder, FcgiClient};
use crate::error::Result;
use crate::protocol::{NameValueEncoding, RecordLayout};
use crate::transport::{Address, SocketTransport};

/// Connection target and record layout for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application address (see [`Address`] for accepted forms).
    pub address: Address,
    /// Name/value pair layout for params records.
    #[serde(default)]
    pub params_encoding: NameValueEncoding,
    /// Pad record content to 8-byte boundaries.
    #[serde(default)]
    pub align_padding: bool,
}

impl ClientConfig {
    /// Configuration with the default record layout.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            params_encoding: NameValueEncoding::default(),
            align_padding: false,
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Record layout described by this configuration.
    pub fn layout(&self) -> RecordLayout {
        RecordLayout {
            params_encoding: self.params_encoding,
            align_padding: self.align_padding,
        }
    }

    /// Connect and build a client.
    pub fn connect(&self) -> Result<FcgiClient<SocketTransport>> {
        ClientBuilder::from_config(self).open()
    }
}
