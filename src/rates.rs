//! Byte-delta scaling and previous-sample tracking.
//!
//! This module is the single source of truth for the displayed rate
//! format. The unit thresholds are part of the observable contract:
//! both boundaries are strict `>`, so an exact power-of-two delta
//! (e.g. exactly 1024) is classified into the lower unit.

use crate::collector::LinkStatsSample;

/// KiB/s threshold divisor.
pub const KIB: u32 = 1024;

/// MiB/s threshold divisor.
pub const MIB: u32 = 1_048_576;

/// A byte delta scaled to a human-readable (value, unit) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledRate {
    pub value: f64,
    pub unit: &'static str,
}

impl std::fmt::Display for ScaledRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} {}", self.value, self.unit)
    }
}

/// Scales a one-second byte delta into a displayable rate.
///
/// `scale(1024)` is `1024.0 B/s`, not `1.0 KiB/s`: boundary values
/// stay in the lower unit.
pub fn scale(byte_delta: u32) -> ScaledRate {
    if byte_delta > MIB {
        ScaledRate {
            value: byte_delta as f64 / MIB as f64,
            unit: "MiB/s",
        }
    } else if byte_delta > KIB {
        ScaledRate {
            value: byte_delta as f64 / KIB as f64,
            unit: "KiB/s",
        }
    } else {
        ScaledRate {
            value: byte_delta as f64,
            unit: "B/s",
        }
    }
}

/// Renders one output line: `D:<down> | U:<up>`.
pub fn format_rate_line(down: ScaledRate, up: ScaledRate) -> String {
    format!("D:{} | U:{}", down, up)
}

/// Tracks the previous sample between successive collections.
///
/// Deltas use wrapping subtraction, so a counter wrap between two polls
/// still produces the correct difference.
#[derive(Debug, Clone, Copy)]
pub struct DeltaTracker {
    prev: LinkStatsSample,
}

impl DeltaTracker {
    /// Starts tracking from a baseline sample.
    pub fn new(baseline: LinkStatsSample) -> Self {
        Self { prev: baseline }
    }

    /// Returns the (rx, tx) byte deltas since the previous sample and
    /// makes `next` the new reference point.
    pub fn advance(&mut self, next: LinkStatsSample) -> (u32, u32) {
        let deltas = (
            next.rx_bytes.wrapping_sub(self.prev.rx_bytes),
            next.tx_bytes.wrapping_sub(self.prev.tx_bytes),
        );
        self.prev = next;
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_unit_thresholds() {
        assert_eq!(scale(0).unit, "B/s");
        assert_eq!(scale(512).unit, "B/s");
        assert_eq!(scale(1024).unit, "B/s");
        assert_eq!(scale(1025).unit, "KiB/s");
        assert_eq!(scale(1_048_576).unit, "KiB/s");
        assert_eq!(scale(1_048_577).unit, "MiB/s");
        assert_eq!(scale(u32::MAX).unit, "MiB/s");
    }

    #[test]
    fn test_scale_boundary_values_stay_in_lower_unit() {
        // The boundaries are exclusive, preserved exactly.
        assert_eq!(scale(1024).value, 1024.0);
        assert_eq!(scale(1_048_576).value, 1024.0);
    }

    #[test]
    fn test_scale_divides_by_unit() {
        assert_eq!(scale(512).value, 512.0);
        assert_eq!(scale(1536).value, 1.5);
        assert_eq!(scale(1536).unit, "KiB/s");
        assert_eq!(scale(2_097_152).value, 2.0);
        assert_eq!(scale(2_097_152).unit, "MiB/s");
    }

    #[test]
    fn test_scaled_rate_display_one_decimal() {
        assert_eq!(format!("{}", scale(1536)), "1.5 KiB/s");
        assert_eq!(format!("{}", scale(0)), "0.0 B/s");
        assert_eq!(format!("{}", scale(1024)), "1024.0 B/s");
    }

    #[test]
    fn test_format_rate_line() {
        assert_eq!(
            format_rate_line(scale(0), scale(0)),
            "D:0.0 B/s | U:0.0 B/s"
        );
        assert_eq!(
            format_rate_line(scale(1536), scale(200)),
            "D:1.5 KiB/s | U:200.0 B/s"
        );
    }

    #[test]
    fn test_tracker_identical_samples_give_zero_delta() {
        let sample = LinkStatsSample {
            rx_bytes: 12345,
            tx_bytes: 678,
        };
        let mut tracker = DeltaTracker::new(sample);
        assert_eq!(tracker.advance(sample), (0, 0));
    }

    #[test]
    fn test_tracker_advances_reference_point() {
        let mut tracker = DeltaTracker::new(LinkStatsSample {
            rx_bytes: 100,
            tx_bytes: 10,
        });
        assert_eq!(
            tracker.advance(LinkStatsSample {
                rx_bytes: 400,
                tx_bytes: 40,
            }),
            (300, 30)
        );
        assert_eq!(
            tracker.advance(LinkStatsSample {
                rx_bytes: 500,
                tx_bytes: 90,
            }),
            (100, 50)
        );
    }

    #[test]
    fn test_tracker_handles_counter_wraparound() {
        let mut tracker = DeltaTracker::new(LinkStatsSample {
            rx_bytes: u32::MAX - 99,
            tx_bytes: u32::MAX,
        });
        assert_eq!(
            tracker.advance(LinkStatsSample {
                rx_bytes: 100,
                tx_bytes: 0,
            }),
            (200, 1)
        );
    }
}
