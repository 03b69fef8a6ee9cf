//! Real routing netlink transport (Linux only).
//!
//! One raw `AF_NETLINK`/`NETLINK_ROUTE` socket per collection, released
//! on drop. Each operation maps to exactly one system call: `socket`,
//! `send`, `recv`, `close`. There is no bind (the kernel autobinds on
//! send), no retry, and no receive timeout; the socket is a local,
//! trusted kernel interface and collection is expected to finish well
//! within the poll cadence.

use std::io;
use std::os::fd::RawFd;

use crate::collector::traits::{LinkDumpTransport, TransportError};
use crate::collector::wire::NLMSG_HDRLEN;

// From linux/netlink.h and linux/rtnetlink.h.
const NETLINK_ROUTE: i32 = 0;
const RTM_GETLINK: u16 = 18;
const NLM_F_REQUEST: u16 = 0x0001;
const NLM_F_ROOT: u16 = 0x0100;
const AF_UNSPEC: u8 = 0;

// nlmsghdr + one-byte rtgenmsg, padded to the 4-byte netlink alignment.
const DUMP_REQUEST_LEN: usize = NLMSG_HDRLEN + 4;

/// Serializes the fixed "dump all links" request.
///
/// The rtgenmsg family is the AF_UNSPEC wildcard; RTM_GETLINK dumps
/// every link regardless.
fn build_link_dump_request() -> [u8; DUMP_REQUEST_LEN] {
    let mut req = [0u8; DUMP_REQUEST_LEN];
    req[0..4].copy_from_slice(&(DUMP_REQUEST_LEN as u32).to_ne_bytes());
    req[4..6].copy_from_slice(&RTM_GETLINK.to_ne_bytes());
    req[6..8].copy_from_slice(&(NLM_F_REQUEST | NLM_F_ROOT).to_ne_bytes());
    // seq and pid stay zero; the kernel fills in the rest.
    req[NLMSG_HDRLEN] = AF_UNSPEC;
    req
}

/// A routing netlink socket scoped to a single link dump.
pub struct NetlinkTransport {
    fd: RawFd,
}

impl NetlinkTransport {
    /// Opens a routing-domain datagram socket.
    pub fn open() -> Result<Self, TransportError> {
        let fd = unsafe {
            libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                NETLINK_ROUTE,
            )
        };
        if fd < 0 {
            return Err(TransportError::Socket(io::Error::last_os_error()));
        }
        Ok(Self { fd })
    }
}

impl LinkDumpTransport for NetlinkTransport {
    fn request_link_dump(&mut self) -> Result<(), TransportError> {
        let request = build_link_dump_request();
        let sent = unsafe {
            libc::send(
                self.fd,
                request.as_ptr() as *const libc::c_void,
                request.len(),
                0,
            )
        };
        if sent < 0 {
            return Err(TransportError::Send(io::Error::last_os_error()));
        }
        Ok(())
    }

    fn receive_next(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let received =
            unsafe { libc::recv(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0) };
        if received < 0 {
            return Err(TransportError::Receive(io::Error::last_os_error()));
        }
        if received == 0 {
            return Err(TransportError::EmptyRead);
        }
        Ok(received as usize)
    }
}

impl Drop for NetlinkTransport {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_request_layout() {
        let req = build_link_dump_request();

        assert_eq!(req.len() % 4, 0);
        assert_eq!(u32::from_ne_bytes(req[0..4].try_into().unwrap()), 20);
        assert_eq!(
            u16::from_ne_bytes(req[4..6].try_into().unwrap()),
            RTM_GETLINK
        );
        assert_eq!(
            u16::from_ne_bytes(req[6..8].try_into().unwrap()),
            NLM_F_REQUEST | NLM_F_ROOT
        );
        // seq, pid, and the rtgenmsg wildcard family are all zero.
        assert!(req[8..].iter().all(|&b| b == 0));
    }
}
