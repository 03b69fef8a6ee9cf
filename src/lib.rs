//! netspeed - live host network throughput over rtnetlink.
//!
//! This library provides the core functionality behind the `netspeed`
//! binary:
//! - `collector` - link dump over a routing netlink socket, summed into
//!   host-wide rx/tx byte totals
//! - `rates` - byte-delta scaling and previous-sample tracking

pub mod collector;
pub mod rates;
