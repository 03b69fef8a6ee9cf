//! Abstraction over the link-dump transport to enable testing and mocking.
//!
//! The `LinkDumpTransport` trait allows the collector to work with both a
//! real routing netlink socket on Linux and scripted implementations for
//! testing on other platforms or in CI.

use std::io;

/// Error type for transport failures.
///
/// Every variant is warning-class: the collector logs it and returns
/// whatever totals it has accumulated so far. Nothing here is fatal to
/// the polling loop.
#[derive(Debug)]
pub enum TransportError {
    /// Socket creation failed.
    Socket(io::Error),
    /// Sending the dump request failed.
    Send(io::Error),
    /// Receiving a response datagram failed.
    Receive(io::Error),
    /// The kernel returned zero bytes mid-dump.
    EmptyRead,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Socket(e) => write!(f, "netlink socket creation failed: {}", e),
            TransportError::Send(e) => write!(f, "link dump request failed: {}", e),
            TransportError::Receive(e) => write!(f, "link dump receive failed: {}", e),
            TransportError::EmptyRead => write!(f, "link dump receive returned no data"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Abstraction for one kernel link-dump exchange.
///
/// The contract is a single request followed by one or more response
/// datagrams, the last of which carries the dump terminator. Each method
/// maps to exactly one transport operation; no retries happen at this
/// layer.
pub trait LinkDumpTransport {
    /// Sends one "dump all links" request to the kernel.
    fn request_link_dump(&mut self) -> Result<(), TransportError>;

    /// Blocks until the next response datagram arrives in `buf`.
    ///
    /// # Returns
    /// The number of bytes received (never zero).
    fn receive_next(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}
