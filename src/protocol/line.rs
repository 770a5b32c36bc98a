//! # Biphase-Mark Line Decoder
//!
//! Turns the timestamps of successive line transitions into logical bits.
//!
//! The decoder is meant to run in the edge interrupt handler: it keeps only
//! the current state tag and the previous edge timestamp, never allocates
//! and never blocks. Intervals that fit neither band are dropped silently;
//! the framing layer above catches whatever that costs.

use super::timing::Timing;

/// One decoded bit with the timestamp of the edge that completed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitEvent {
    /// Bit value, 0 or 1
    pub value: u8,

    /// Microsecond counter of the completing edge (wraps modulo 2^32)
    pub timestamp: u32,
}

impl BitEvent {
    /// Create a bit event
    pub fn new(value: u8, timestamp: u32) -> Self {
        Self { value, timestamp }
    }
}

/// Line decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// No edge seen yet, nothing to measure against
    #[default]
    AwaitingFirstEdge,
    /// Previous edge ended a bit (or is the first usable reference)
    AwaitingBitStart,
    /// First half of a "1" has been seen
    HalfBitSeen,
}

/// Edge-timing to bit decoder
///
/// # Examples
///
/// ```
/// use wt440h_rx::protocol::line::LineDecoder;
/// use wt440h_rx::protocol::timing::Timing;
///
/// let mut decoder = LineDecoder::new(Timing::default());
///
/// assert_eq!(decoder.on_edge(10_000), None); // reference edge
/// assert_eq!(decoder.on_edge(12_000).map(|b| b.value), Some(0));
/// assert_eq!(decoder.on_edge(13_000), None); // first half of a one
/// assert_eq!(decoder.on_edge(14_000).map(|b| b.value), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct LineDecoder {
    timing: Timing,
    state: DecoderState,
    last_edge: u32,
}

impl LineDecoder {
    /// Create a decoder waiting for its first edge
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            state: DecoderState::AwaitingFirstEdge,
            last_edge: 0,
        }
    }

    /// Handle one line transition
    ///
    /// # Arguments
    ///
    /// * `timestamp` - Microsecond counter at the transition
    ///
    /// # Returns
    ///
    /// * `Option<BitEvent>` - A bit if this edge completed one
    pub fn on_edge(&mut self, timestamp: u32) -> Option<BitEvent> {
        let bit_length = timestamp.wrapping_sub(self.last_edge);
        self.last_edge = timestamp;

        match self.state {
            DecoderState::AwaitingFirstEdge => {
                self.state = DecoderState::AwaitingBitStart;
                None
            }
            DecoderState::AwaitingBitStart => {
                if self.timing.is_full_bit(bit_length) {
                    Some(BitEvent::new(0, timestamp))
                } else {
                    if self.timing.is_half_bit(bit_length) {
                        self.state = DecoderState::HalfBitSeen;
                    }
                    None
                }
            }
            DecoderState::HalfBitSeen => {
                // A mismatching second half just resynchronizes on this edge
                self.state = DecoderState::AwaitingBitStart;
                self.timing
                    .is_half_bit(bit_length)
                    .then(|| BitEvent::new(1, timestamp))
            }
        }
    }

    /// Current state tag
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Forget the reference edge and start over
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitingFirstEdge;
        self.last_edge = 0;
    }
}
