//! Host-wide link statistics collector for Linux.
//!
//! This module produces one `LinkStatsSample` per poll by dumping all
//! network links over a routing netlink socket and summing the rx/tx
//! byte counters of interfaces that are running and ARP-capable.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                   collect_sample                   │
//! │   request ──► receive ──► walk_datagram ──► totals │
//! │                  │              │                  │
//! │                  │       extract_link_stats        │
//! │           ┌──────▼──────────┐                      │
//! │           │ LinkDumpTransport│ (trait)             │
//! │           └──────┬──────────┘                      │
//! └──────────────────┼─────────────────────────────────┘
//!                    │
//!        ┌───────────┴───────────┐
//! ┌──────▼─────────┐    ┌────────▼──────┐
//! │ NetlinkTransport│    │ MockTransport │
//! │ (Linux)         │    │ (testing)     │
//! └─────────────────┘    └───────────────┘
//! ```
//!
//! Collection is best-effort telemetry: transport failures are logged as
//! warnings and the partial (possibly zero) totals are returned, so a
//! transient kernel hiccup can never take down the display loop.

pub mod mock;
#[cfg(target_os = "linux")]
pub mod netlink;
pub mod traits;
pub mod wire;

use tracing::warn;

pub use mock::MockTransport;
#[cfg(target_os = "linux")]
pub use netlink::NetlinkTransport;
pub use traits::{LinkDumpTransport, TransportError};
pub use wire::DumpStatus;

/// Receive buffer capacity for one response datagram.
///
/// Matches the maximum single-read size of the kernel dump protocol as
/// this tool consumes it; a datagram never exceeds this.
pub const RECV_BUF_CAPACITY: usize = 8192;

/// Host-wide byte totals from one link dump.
///
/// Counters are 32-bit and wrap, mirroring the kernel's truncated
/// `rtnl_link_stats` fields; rates are taken from wrapping deltas, never
/// from the absolute values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatsSample {
    /// Bytes received across all counted interfaces.
    pub rx_bytes: u32,
    /// Bytes transmitted across all counted interfaces.
    pub tx_bytes: u32,
}

/// Runs one complete link dump over the given transport.
///
/// Issues the dump request, then receives and walks datagrams until the
/// terminator. Any transport error ends the dump early with a warning;
/// whatever was accumulated up to that point is returned.
pub fn collect_sample<T: LinkDumpTransport>(transport: &mut T) -> LinkStatsSample {
    let mut totals = LinkStatsSample::default();

    if let Err(e) = transport.request_link_dump() {
        warn!("{}", e);
        return totals;
    }

    let mut buf = [0u8; RECV_BUF_CAPACITY];
    loop {
        let received = match transport.receive_next(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("{}", e);
                return totals;
            }
        };

        let (partial, status) = wire::walk_datagram(&buf[..received]);
        totals.rx_bytes = totals.rx_bytes.wrapping_add(partial.rx_bytes);
        totals.tx_bytes = totals.tx_bytes.wrapping_add(partial.tx_bytes);

        if status == DumpStatus::Done {
            return totals;
        }
    }
}

/// Collects one sample from the kernel.
///
/// Opens a fresh netlink socket per call (strict open→use→close scoped
/// to this collection; the RAII drop covers every exit path). An open
/// failure yields a zero sample, like any other transport error.
#[cfg(target_os = "linux")]
pub fn collect() -> LinkStatsSample {
    match NetlinkTransport::open() {
        Ok(mut transport) => collect_sample(&mut transport),
        Err(e) => {
            warn!("{}", e);
            LinkStatsSample::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{attr, datagram, done_message, link_message, stats_payload};
    use crate::collector::wire::{IFF_RUNNING, IFLA_STATS};
    use crate::rates::{DeltaTracker, scale};

    fn scripted_dump() -> Vec<Vec<u8>> {
        vec![
            datagram(&[link_message(
                IFF_RUNNING,
                &[attr(IFLA_STATS, &stats_payload(500, 200))],
            )]),
            datagram(&[
                link_message(IFF_RUNNING, &[attr(IFLA_STATS, &stats_payload(250, 100))]),
                done_message(),
            ]),
        ]
    }

    #[test]
    fn test_dump_split_across_datagrams_is_summed() {
        let mut transport = MockTransport::new();
        for d in scripted_dump() {
            transport.push_datagram(d);
        }

        let sample = collect_sample(&mut transport);
        assert_eq!(sample.rx_bytes, 750);
        assert_eq!(sample.tx_bytes, 300);
        assert_eq!(transport.requests_sent(), 1);
    }

    #[test]
    fn test_receive_failure_yields_zero_sample() {
        let mut transport = MockTransport::new();
        transport.push_receive_error();

        let sample = collect_sample(&mut transport);
        assert_eq!(sample, LinkStatsSample::default());
    }

    #[test]
    fn test_receive_failure_mid_dump_keeps_partial_totals() {
        let mut transport = MockTransport::new();
        transport.push_datagram(datagram(&[link_message(
            IFF_RUNNING,
            &[attr(IFLA_STATS, &stats_payload(500, 200))],
        )]));
        transport.push_receive_error();

        let sample = collect_sample(&mut transport);
        assert_eq!(sample.rx_bytes, 500);
        assert_eq!(sample.tx_bytes, 200);
    }

    #[test]
    fn test_send_failure_yields_zero_sample() {
        let mut transport = MockTransport::new();
        transport.fail_send();

        let sample = collect_sample(&mut transport);
        assert_eq!(sample, LinkStatsSample::default());
    }

    #[test]
    fn test_back_to_back_collections_with_no_traffic_scale_to_zero() {
        let mut first = MockTransport::new();
        let mut second = MockTransport::new();
        for d in scripted_dump() {
            first.push_datagram(d.clone());
            second.push_datagram(d);
        }

        let mut tracker = DeltaTracker::new(collect_sample(&mut first));
        let (rx_delta, tx_delta) = tracker.advance(collect_sample(&mut second));

        assert_eq!(format!("{}", scale(rx_delta)), "0.0 B/s");
        assert_eq!(format!("{}", scale(tx_delta)), "0.0 B/s");
    }
}
