//! Scripted transport and synthetic datagram builders for testing.
//!
//! `MockTransport` plays back a prepared sequence of datagrams and
//! injected failures, so collection logic can be exercised without a
//! Linux kernel. The builder functions construct well-formed rtnetlink
//! link messages that tests then use as-is or corrupt deliberately.

use std::collections::VecDeque;
use std::io;

use crate::collector::traits::{LinkDumpTransport, TransportError};
use crate::collector::wire::{IFINFOMSG_LEN, NLMSG_DONE, NLMSG_HDRLEN, RTA_HDRLEN};

/// Message type for a link info response (RTM_NEWLINK).
pub const RTM_NEWLINK: u16 = 16;

/// One scripted transport event.
enum Event {
    Datagram(Vec<u8>),
    ReceiveError,
}

/// Transport that replays a scripted link dump.
#[derive(Default)]
pub struct MockTransport {
    events: VecDeque<Event>,
    fail_send: bool,
    requests_sent: u32,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one response datagram.
    pub fn push_datagram(&mut self, bytes: Vec<u8>) {
        self.events.push_back(Event::Datagram(bytes));
    }

    /// Queues a receive failure at this point in the dump.
    pub fn push_receive_error(&mut self) {
        self.events.push_back(Event::ReceiveError);
    }

    /// Makes `request_link_dump` fail.
    pub fn fail_send(&mut self) {
        self.fail_send = true;
    }

    /// Number of dump requests issued so far.
    pub fn requests_sent(&self) -> u32 {
        self.requests_sent
    }
}

impl LinkDumpTransport for MockTransport {
    fn request_link_dump(&mut self) -> Result<(), TransportError> {
        if self.fail_send {
            return Err(TransportError::Send(io::Error::other(
                "scripted send failure",
            )));
        }
        self.requests_sent += 1;
        Ok(())
    }

    fn receive_next(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.events.pop_front() {
            Some(Event::Datagram(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Event::ReceiveError) => Err(TransportError::Receive(io::Error::other(
                "scripted receive failure",
            ))),
            // A real dump always ends in a terminator; running out of
            // scripted datagrams means the script was exhausted early.
            None => Err(TransportError::Receive(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "mock transport out of datagrams",
            ))),
        }
    }
}

fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// Builds one rtattr record (header + payload, padded to alignment).
pub fn attr(rta_type: u16, payload: &[u8]) -> Vec<u8> {
    let len = RTA_HDRLEN + payload.len();
    let mut out = vec![0u8; align4(len)];
    out[0..2].copy_from_slice(&(len as u16).to_ne_bytes());
    out[2..4].copy_from_slice(&rta_type.to_ne_bytes());
    out[RTA_HDRLEN..len].copy_from_slice(payload);
    out
}

/// Builds a `struct rtnl_link_stats` payload with the given byte counters.
///
/// The kernel struct is 24 u32 counters; rx_bytes and tx_bytes sit after
/// rx_packets and tx_packets. Everything else is left zero.
pub fn stats_payload(rx_bytes: u32, tx_bytes: u32) -> Vec<u8> {
    let mut out = vec![0u8; 96];
    out[8..12].copy_from_slice(&rx_bytes.to_ne_bytes());
    out[12..16].copy_from_slice(&tx_bytes.to_ne_bytes());
    out
}

/// Builds one RTM_NEWLINK message with the given ifi_flags and attributes.
pub fn link_message(flags: u32, attrs: &[Vec<u8>]) -> Vec<u8> {
    let attrs_len: usize = attrs.iter().map(|a| a.len()).sum();
    let msg_len = NLMSG_HDRLEN + IFINFOMSG_LEN + attrs_len;

    let mut out = Vec::with_capacity(align4(msg_len));
    // nlmsghdr
    out.extend_from_slice(&(msg_len as u32).to_ne_bytes());
    out.extend_from_slice(&RTM_NEWLINK.to_ne_bytes());
    out.extend_from_slice(&0u16.to_ne_bytes()); // flags
    out.extend_from_slice(&0u32.to_ne_bytes()); // seq
    out.extend_from_slice(&0u32.to_ne_bytes()); // pid
    // ifinfomsg
    out.push(0); // family
    out.push(0); // pad
    out.extend_from_slice(&0u16.to_ne_bytes()); // device type
    out.extend_from_slice(&1i32.to_ne_bytes()); // index
    out.extend_from_slice(&flags.to_ne_bytes());
    out.extend_from_slice(&0u32.to_ne_bytes()); // change mask
    for a in attrs {
        out.extend_from_slice(a);
    }
    out.resize(align4(msg_len), 0);
    out
}

/// Builds the dump terminator message (NLMSG_DONE with its status word).
pub fn done_message() -> Vec<u8> {
    let msg_len = NLMSG_HDRLEN + 4;
    let mut out = vec![0u8; msg_len];
    out[0..4].copy_from_slice(&(msg_len as u32).to_ne_bytes());
    out[4..6].copy_from_slice(&NLMSG_DONE.to_ne_bytes());
    out
}

/// Concatenates messages into one datagram.
pub fn datagram(messages: &[Vec<u8>]) -> Vec<u8> {
    messages.concat()
}
