//! # Frame Parity
//!
//! WT440H frames carry two parity bits that make the XOR of all even-indexed
//! bits and the XOR of all odd-indexed bits zero. Both lanes are folded into
//! one 2-bit accumulator: `value ^= bit << (bit_index & 1)`.
//!
//! The preamble and the parity bits themselves are folded in as well, so a
//! clean 36-bit frame always leaves the accumulator at zero.

/// Running two-lane XOR parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parity {
    value: u8,
}

impl Parity {
    /// Empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame bit into the accumulator
    #[inline]
    pub fn fold(&mut self, bit_index: u8, bit: u8) {
        self.value ^= (bit & 1) << (bit_index & 1);
    }

    /// Raw accumulator, bit 0 = even lane, bit 1 = odd lane
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Whether both lanes are balanced
    pub fn is_clear(&self) -> bool {
        self.value == 0
    }

    /// Parity bits a transmitter appends after `bits`
    ///
    /// `bits` must hold an even number of bits so the first trailer bit lands
    /// in the even lane, as it does for the 34 payload bits of a frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use wt440h_rx::protocol::parity::Parity;
    ///
    /// let payload = [1, 1, 0, 0];
    /// assert_eq!(Parity::trailer(&payload), [1, 1]);
    /// ```
    pub fn trailer(bits: &[u8]) -> [u8; 2] {
        let mut parity = Self::new();
        for (index, &bit) in bits.iter().enumerate() {
            parity.fold(index as u8, bit);
        }
        [parity.value & 1, (parity.value >> 1) & 1]
    }
}
