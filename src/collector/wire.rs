//! Bounds-checked decoding of rtnetlink link-dump responses.
//!
//! These are pure functions over borrowed byte buffers, designed to be
//! easily testable with synthetic datagrams. Kernel framing is trusted by
//! default, so malformed lengths are not errors: a bad message header ends
//! the walk for the datagram, a bad attribute header ends the walk for
//! that message, and everything accumulated up to that point is kept.
//!
//! Layouts (all native-endian, from linux/netlink.h, linux/rtnetlink.h):
//!
//! ```text
//! nlmsghdr    len:u32 type:u16 flags:u16 seq:u32 pid:u32   (16 bytes)
//! ifinfomsg   family:u8 pad:u8 type:u16 index:i32 flags:u32 change:u32
//! rtattr      len:u16 type:u16                             (4 bytes)
//! ```

use crate::collector::LinkStatsSample;

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = 16;

/// Terminator message type ending a multi-part dump.
pub const NLMSG_DONE: u16 = 3;

/// Size of the ifinfomsg header that leads a link message payload.
pub const IFINFOMSG_LEN: usize = 16;

/// Size of the rtattr record header.
pub const RTA_HDRLEN: usize = 4;

/// Attribute type carrying `struct rtnl_link_stats`.
pub const IFLA_STATS: u16 = 7;

/// Interface is operationally up.
pub const IFF_RUNNING: u32 = 0x40;

/// Interface performs no address resolution (loopback, tunnels, ...).
pub const IFF_NOARP: u32 = 0x80;

// rtnl_link_stats is an array of u32 counters; rx_bytes and tx_bytes are
// the third and fourth fields, after rx_packets and tx_packets.
const STATS_RX_BYTES_OFFSET: usize = 8;
const STATS_TX_BYTES_OFFSET: usize = 12;
const STATS_MIN_LEN: usize = 16;

/// Whether the dump continues past the datagram just walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpStatus {
    /// No terminator seen; the caller should receive another datagram.
    Continue,
    /// Terminator seen; the dump is complete.
    Done,
}

/// Round a frame length up to the 4-byte netlink alignment.
fn align4(len: usize) -> usize {
    (len + 3) & !3
}

fn read_u16(buf: &[u8], offset: usize) -> Option<u16> {
    let bytes = buf.get(offset..offset + 2)?;
    Some(u16::from_ne_bytes([bytes[0], bytes[1]]))
}

fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset + 4)?;
    Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Walks one response datagram, summing filtered per-interface counters.
///
/// Iterates top-level netlink messages until the dump terminator, buffer
/// exhaustion, or a truncated header. A kernel dump may span several
/// datagrams; the returned status tells the caller whether to keep
/// receiving. The partial totals are returned by value rather than
/// threaded through the decoders as `&mut` state.
pub fn walk_datagram(datagram: &[u8]) -> (LinkStatsSample, DumpStatus) {
    let mut totals = LinkStatsSample::default();
    let mut offset = 0usize;

    loop {
        let (Some(msg_len), Some(msg_type)) =
            (read_u32(datagram, offset), read_u16(datagram, offset + 4))
        else {
            break;
        };
        let msg_len = msg_len as usize;
        if msg_len < NLMSG_HDRLEN || msg_len > datagram.len() - offset {
            // Truncated or malformed frame; the rest of this datagram is
            // unusable but the dump itself may continue.
            break;
        }
        if msg_type == NLMSG_DONE {
            return (totals, DumpStatus::Done);
        }

        if let Some((rx, tx)) =
            extract_link_stats(&datagram[offset + NLMSG_HDRLEN..offset + msg_len])
        {
            totals.rx_bytes = totals.rx_bytes.wrapping_add(rx);
            totals.tx_bytes = totals.tx_bytes.wrapping_add(tx);
        }

        offset += align4(msg_len);
    }

    (totals, DumpStatus::Continue)
}

/// Extracts rx/tx byte counters from one link message payload.
///
/// Returns `None` for interfaces that are not running or are flagged
/// no-ARP (the traffic-capability heuristic), for payloads too short to
/// hold an ifinfomsg, and for messages without a statistics attribute.
/// Unknown attribute types are skipped for forward compatibility.
pub fn extract_link_stats(payload: &[u8]) -> Option<(u32, u32)> {
    if payload.len() < IFINFOMSG_LEN {
        return None;
    }
    let flags = read_u32(payload, 8)?;
    if flags & IFF_RUNNING == 0 || flags & IFF_NOARP != 0 {
        return None;
    }

    let mut rx_bytes = 0u32;
    let mut tx_bytes = 0u32;
    let mut seen_stats = false;
    let mut offset = IFINFOMSG_LEN;

    loop {
        let (Some(rta_len), Some(rta_type)) =
            (read_u16(payload, offset), read_u16(payload, offset + 2))
        else {
            break;
        };
        let rta_len = rta_len as usize;
        if rta_len < RTA_HDRLEN || rta_len > payload.len() - offset {
            // Malformed attribute framing: stop this walk, keep what we
            // already have.
            break;
        }
        if rta_type == IFLA_STATS && rta_len >= RTA_HDRLEN + STATS_MIN_LEN {
            let base = offset + RTA_HDRLEN;
            if let (Some(rx), Some(tx)) = (
                read_u32(payload, base + STATS_RX_BYTES_OFFSET),
                read_u32(payload, base + STATS_TX_BYTES_OFFSET),
            ) {
                rx_bytes = rx_bytes.wrapping_add(rx);
                tx_bytes = tx_bytes.wrapping_add(tx);
                seen_stats = true;
            }
        }
        offset += align4(rta_len);
    }

    seen_stats.then_some((rx_bytes, tx_bytes))
}
