//! # fcgi-client
//!
//! Client-side codec and transport for the FastCGI wire protocol.
//!
//! This crate builds FastCGI records and writes them to an application server
//! over a blocking TCP or Unix domain socket.
//!
//! ## Architecture
//!
//! - **Protocol** ([`protocol`]): 8-byte record header, begin-request body,
//!   name/value length prefixes, record assembly
//! - **Transport** ([`transport`]): one socket behind `connect`/`read`/`write`/`close`
//! - **Client** ([`FcgiClient`]): begin-request, params, params terminator,
//!   header reads
//!
//! Response demultiplexing is left to the caller: read a header with
//! [`FcgiClient::read_header`], then read its body with [`FcgiClient::read`].
//!
//! ## Example
//!
//! ```no_run
//! use fcgi_client::protocol::{RecordType, Role};
//! use fcgi_client::transport::TcpTransport;
//! use fcgi_client::FcgiClient;
//!
//! let transport = TcpTransport::open("127.0.0.1", 9000)?;
//! let mut client = FcgiClient::new(transport);
//!
//! client.start_request(Role::Responder, false, 1)?;
//! client.send_params([("REQUEST_METHOD", "GET"), ("SCRIPT_FILENAME", "/srv/index.php")], 1)?;
//! client.end_params(1)?;
//! client.send_record(RecordType::Stdin, 1, b"")?;
//!
//! let header = client.read_header()?;
//! let mut body = vec![0u8; header.body_len()];
//! client.read(&mut body)?;
//! # Ok::<(), fcgi_client::FcgiError>(())
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

mod client;

pub use client::{ClientBuilder, FcgiClient, DEFAULT_SCRATCH_CAPACITY};
pub use config::ClientConfig;
pub use error::{FcgiError, Result};
pub use transport::{Address, SocketTransport, Transport};
