//! # Bit Timing Thresholds
//!
//! Tolerance bands used to classify the interval between two line
//! transitions.
//!
//! A "0" occupies one full bit period, a "1" two half periods:
//!
//! ```text
//!          |<---- 2000 µs ---->|<-1000->|<-1000->|
//!   ───────┐                   ┌────────┐        ┌──
//!          └───────────────────┘        └────────┘
//!                   0                     1
//! ```
//!
//! The half-bit band is derived by halving the full-bit band, so with the
//! default 2000 ± 200 µs the bands are `[1800, 2200]` and `[900, 1100]`.

use crate::error::{Result, Wt440hError};

/// Nominal full bit period in microseconds
pub const DEFAULT_BIT_LENGTH_US: u32 = 2000;

/// Default tolerance around the full bit period in microseconds
pub const DEFAULT_TOLERANCE_US: u32 = 200;

/// Inclusive classification bands derived from a bit length and tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    bit_low: u32,
    bit_high: u32,
    half_low: u32,
    half_high: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            bit_low: DEFAULT_BIT_LENGTH_US - DEFAULT_TOLERANCE_US,
            bit_high: DEFAULT_BIT_LENGTH_US + DEFAULT_TOLERANCE_US,
            half_low: (DEFAULT_BIT_LENGTH_US - DEFAULT_TOLERANCE_US) / 2,
            half_high: (DEFAULT_BIT_LENGTH_US + DEFAULT_TOLERANCE_US) / 2,
        }
    }
}

impl Timing {
    /// Derive the full and half bit bands.
    ///
    /// # Arguments
    ///
    /// * `bit_length_us` - Nominal full bit period
    /// * `tolerance_us` - Allowed deviation from the full bit period
    ///
    /// # Errors
    ///
    /// Returns `InvalidTiming` if the tolerance swallows the bit period or
    /// the half-bit band would reach into the full-bit band.
    ///
    /// # Examples
    ///
    /// ```
    /// use wt440h_rx::protocol::timing::Timing;
    ///
    /// let timing = Timing::new(2000, 200)?;
    /// assert!(timing.is_full_bit(2150));
    /// assert!(timing.is_half_bit(950));
    /// # Ok::<(), wt440h_rx::error::Wt440hError>(())
    /// ```
    pub fn new(bit_length_us: u32, tolerance_us: u32) -> Result<Self> {
        if bit_length_us == 0 {
            return Err(Wt440hError::InvalidTiming(
                "bit length must be greater than 0".to_string(),
            ));
        }

        if tolerance_us >= bit_length_us {
            return Err(Wt440hError::InvalidTiming(format!(
                "tolerance {} µs must be smaller than bit length {} µs",
                tolerance_us, bit_length_us
            )));
        }

        let bit_low = bit_length_us - tolerance_us;
        let bit_high = bit_length_us.checked_add(tolerance_us).ok_or_else(|| {
            Wt440hError::InvalidTiming(format!(
                "bit length {} µs + tolerance {} µs overflows",
                bit_length_us, tolerance_us
            ))
        })?;
        let half_low = bit_low / 2;
        let half_high = bit_high / 2;

        if half_high >= bit_low {
            return Err(Wt440hError::InvalidTiming(format!(
                "half-bit band [{}, {}] overlaps full-bit band [{}, {}]",
                half_low, half_high, bit_low, bit_high
            )));
        }

        Ok(Self {
            bit_low,
            bit_high,
            half_low,
            half_high,
        })
    }

    /// Whether `length_us` lies within the full bit band.
    #[inline]
    pub fn is_full_bit(&self, length_us: u32) -> bool {
        (self.bit_low..=self.bit_high).contains(&length_us)
    }

    /// Whether `length_us` lies within the half bit band.
    #[inline]
    pub fn is_half_bit(&self, length_us: u32) -> bool {
        (self.half_low..=self.half_high).contains(&length_us)
    }

    /// Full bit band as `(low, high)`, inclusive.
    pub fn full_bit_band(&self) -> (u32, u32) {
        (self.bit_low, self.bit_high)
    }

    /// Half bit band as `(low, high)`, inclusive.
    pub fn half_bit_band(&self) -> (u32, u32) {
        (self.half_low, self.half_high)
    }
}
