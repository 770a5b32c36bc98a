//! # WT440H Frame Assembler
//!
//! Collects decoded bits into 36-bit frames.
//!
//! Every bit after the first must arrive one full bit period after its
//! predecessor. The first four bits must match the preamble, the remaining
//! bits are shifted into the field the [`FrameLayout`] assigns them to, and
//! every bit is folded into the frame [`Parity`]. Any violation drops the
//! frame and the search for the next preamble starts with the following bit.

use super::layout::{Field, FrameLayout, FRAME_BITS, PREAMBLE};
use super::line::BitEvent;
use super::parity::Parity;
use super::reading::Reading;
use super::timing::Timing;

/// Why a partially received frame was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Bit arrived outside the full-bit band relative to its predecessor
    Timing { bit_index: u8, bit_length: u32 },

    /// Bit did not match the preamble pattern
    Preamble { bit_index: u8 },

    /// Parity lanes did not balance at the end of the frame
    Checksum { parity: u8 },
}

/// Result of feeding one bit to the assembler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Bit accepted, frame not complete yet
    Pending,

    /// Bit completed a valid frame
    Complete(Reading),

    /// Frame dropped, assembler is back at bit 0
    Rejected(Rejection),
}

/// Position, fields and parity of the frame in progress
///
/// Replaced as a whole on reset so the bit index can never disagree with
/// the fields collected so far.
#[derive(Debug, Clone, Copy, Default)]
struct PartialFrame {
    bit_index: u8,
    reading: Reading,
    parity: Parity,
}

impl PartialFrame {
    fn shift_in(&mut self, field: Field, bit: u8) {
        let reading = &mut self.reading;
        let target = match field {
            Field::HouseCode => &mut reading.house_code,
            Field::Channel => &mut reading.channel,
            Field::Status => &mut reading.status,
            Field::Humidity => &mut reading.humidity,
            Field::TempInteger => &mut reading.temp_integer,
            Field::TempFraction => &mut reading.temp_fraction,
            Field::Sequence => &mut reading.sequence,
            Field::BatteryLow => {
                reading.battery_low = bit == 1;
                return;
            }
            Field::Preamble | Field::Parity => return,
        };
        *target = (*target << 1) | bit;
    }
}

/// Bit stream to frame assembler
///
/// # Examples
///
/// ```
/// use wt440h_rx::protocol::assembler::{FrameAssembler, Step};
/// use wt440h_rx::protocol::encoder::{bit_events, encode_frame};
/// use wt440h_rx::protocol::layout::FrameLayout;
/// use wt440h_rx::protocol::reading::Reading;
/// use wt440h_rx::protocol::timing::Timing;
///
/// let sent = Reading { house_code: 3, humidity: 40, temp_integer: 71, ..Reading::default() };
/// let bits = encode_frame(&FrameLayout::V2, &sent);
///
/// let mut assembler = FrameAssembler::new(FrameLayout::V2, Timing::default());
/// let mut received = None;
/// for bit in bit_events(&bits, 0, 2000) {
///     if let Step::Complete(reading) = assembler.push(bit) {
///         received = Some(reading);
///     }
/// }
/// assert_eq!(received.map(|r| r.temperature()), Some(21.0));
/// ```
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    layout: FrameLayout,
    timing: Timing,
    frame: PartialFrame,
    last_bit: u32,
}

impl FrameAssembler {
    /// Create an assembler waiting for a preamble
    pub fn new(layout: FrameLayout, timing: Timing) -> Self {
        Self {
            layout,
            timing,
            frame: PartialFrame::default(),
            last_bit: 0,
        }
    }

    /// Feed one decoded bit
    ///
    /// # Arguments
    ///
    /// * `bit` - Next bit from the line decoder
    ///
    /// # Returns
    ///
    /// * `Step` - Whether the bit completed, continued or broke the frame
    pub fn push(&mut self, bit: BitEvent) -> Step {
        let bit_length = bit.timestamp.wrapping_sub(self.last_bit);
        self.last_bit = bit.timestamp;

        let bit_index = self.frame.bit_index;
        let value = bit.value & 1;

        if bit_index > 0 && !self.timing.is_full_bit(bit_length) {
            return self.reject(Rejection::Timing { bit_index, bit_length });
        }

        match self.layout.field_at(bit_index) {
            Some(Field::Preamble) => {
                if value != PREAMBLE[bit_index as usize] {
                    return self.reject(Rejection::Preamble { bit_index });
                }
            }
            Some(field) => self.frame.shift_in(field, value),
            None => {}
        }

        self.frame.parity.fold(bit_index, value);

        if bit_index == FRAME_BITS - 1 {
            if !self.frame.parity.is_clear() {
                let parity = self.frame.parity.value();
                return self.reject(Rejection::Checksum { parity });
            }

            let mut reading = self.frame.reading;
            reading.timestamp = bit.timestamp;
            self.reset();
            return Step::Complete(reading);
        }

        self.frame.bit_index += 1;
        Step::Pending
    }

    /// Drop the frame in progress
    pub fn reset(&mut self) {
        self.frame = PartialFrame::default();
    }

    /// Index of the next expected bit
    pub fn bit_index(&self) -> u8 {
        self.frame.bit_index
    }

    /// Layout in use
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    fn reject(&mut self, rejection: Rejection) -> Step {
        self.reset();
        Step::Rejected(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encoder::{bit_events, encode_frame};

    fn sample() -> Reading {
        Reading {
            house_code: 5,
            channel: 2,
            status: 1,
            battery_low: false,
            humidity: 45,
            temp_integer: 53,
            temp_fraction: 8,
            sequence: 1,
            timestamp: 0,
        }
    }

    fn to_bits(s: &str) -> Vec<u8> {
        s.bytes().map(|b| b - b'0').collect()
    }

    fn feed(assembler: &mut FrameAssembler, events: &[BitEvent]) -> Vec<Step> {
        events.iter().map(|&bit| assembler.push(bit)).collect()
    }

    fn readings(steps: &[Step]) -> Vec<Reading> {
        steps
            .iter()
            .filter_map(|step| match step {
                Step::Complete(reading) => Some(*reading),
                _ => None,
            })
            .collect()
    }

    fn rejections(steps: &[Step]) -> Vec<Rejection> {
        steps
            .iter()
            .filter_map(|step| match step {
                Step::Rejected(rejection) => Some(*rejection),
                _ => None,
            })
            .collect()
    }

    fn v2() -> FrameAssembler {
        FrameAssembler::new(FrameLayout::V2, Timing::default())
    }

    #[test]
    fn test_handcrafted_frame() {
        // house 5, channel 2, status 1, battery 0, humidity 45, 53 + 8/16, seq 1
        let bits = to_bits("110001011001001011010011010110000100");
        let mut assembler = v2();
        let steps = feed(&mut assembler, &bit_events(&bits, 0, 2000));

        let received = readings(&steps);
        assert_eq!(received.len(), 1);

        let reading = received[0];
        assert_eq!(reading.house_code, 5);
        assert_eq!(reading.channel, 2);
        assert_eq!(reading.reported_channel(), 3);
        assert_eq!(reading.status, 1);
        assert!(!reading.battery_low);
        assert_eq!(reading.humidity, 45);
        assert_eq!(reading.temp_integer, 53);
        assert_eq!(reading.temp_fraction, 8);
        assert_eq!(reading.sequence, 1);
        assert_eq!(reading.temperature(), 3.5);
        assert_eq!(reading.timestamp, 36 * 2000);
    }

    #[test]
    fn test_only_last_bit_completes() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        let mut assembler = v2();
        let steps = feed(&mut assembler, &bit_events(&bits, 0, 2000));
        assert!(steps[..35].iter().all(|s| *s == Step::Pending));
        assert!(matches!(steps[35], Step::Complete(_)));
        assert_eq!(assembler.bit_index(), 0);
    }

    #[test]
    fn test_well_formed_frames_roundtrip() {
        let cases = [
            Reading { battery_low: true, ..sample() },
            Reading { house_code: 15, channel: 3, status: 3, humidity: 99, ..sample() },
            Reading {
                house_code: 0,
                channel: 0,
                status: 0,
                humidity: 0,
                temp_integer: 0,
                temp_fraction: 0,
                sequence: 0,
                ..sample()
            },
            Reading { temp_integer: 255, temp_fraction: 15, sequence: 3, ..sample() },
        ];

        for sent in cases {
            let bits = encode_frame(&FrameLayout::V2, &sent);
            let mut assembler = v2();
            let received = readings(&feed(&mut assembler, &bit_events(&bits, 0, 2000)));
            assert_eq!(received, vec![Reading { timestamp: 72_000, ..sent }]);
        }
    }

    #[test]
    fn test_v1_layout_eight_bit_humidity() {
        let sent = Reading { humidity: 200, ..sample() };
        let bits = encode_frame(&FrameLayout::V1, &sent);
        let mut assembler = FrameAssembler::new(FrameLayout::V1, Timing::default());
        let received = readings(&feed(&mut assembler, &bit_events(&bits, 0, 2000)));
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].humidity, 200);
        assert!(!received[0].battery_low);
    }

    #[test]
    fn test_single_bit_flip_fails_checksum() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        for flip in 4..36 {
            let mut corrupted = bits;
            corrupted[flip] ^= 1;

            let mut assembler = v2();
            let steps = feed(&mut assembler, &bit_events(&corrupted, 0, 2000));
            assert!(readings(&steps).is_empty(), "flip at bit {} accepted", flip);
            assert!(matches!(
                rejections(&steps).as_slice(),
                [Rejection::Checksum { .. }]
            ));
            assert_eq!(assembler.bit_index(), 0);
        }
    }

    #[test]
    fn test_preamble_mismatch_resets() {
        let mut assembler = v2();
        let events = bit_events(&[1, 0], 0, 2000);
        assert_eq!(assembler.push(events[0]), Step::Pending);
        assert_eq!(
            assembler.push(events[1]),
            Step::Rejected(Rejection::Preamble { bit_index: 1 })
        );
        assert_eq!(assembler.bit_index(), 0);
    }

    #[test]
    fn test_preamble_flip_rejected() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        for flip in 0..4 {
            let mut corrupted = bits;
            corrupted[flip] ^= 1;
            let mut assembler = v2();
            let steps = feed(&mut assembler, &bit_events(&corrupted, 0, 2000));
            assert!(readings(&steps).is_empty());
        }
    }

    #[test]
    fn test_timing_violation_resets() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        let mut events = bit_events(&bits, 0, 2000);
        // Bit 10 arrives 700 µs late
        for event in events.iter_mut().skip(10) {
            event.timestamp += 700;
        }

        let mut assembler = v2();
        let steps = feed(&mut assembler, &events[..11]);
        assert_eq!(
            steps[10],
            Step::Rejected(Rejection::Timing { bit_index: 10, bit_length: 2700 })
        );
        assert_eq!(assembler.bit_index(), 0);
    }

    #[test]
    fn test_first_bit_timing_not_checked() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        let events = bit_events(&bits, 5_000_000, 2000);
        let mut assembler = v2();
        // last_bit starts at 0, far away from the first event
        let received = readings(&feed(&mut assembler, &events));
        assert_eq!(received.len(), 1);
    }

    #[test]
    fn test_timing_violation_does_not_corrupt_next_frame() {
        let other = Reading { house_code: 9, humidity: 80, temp_integer: 70, ..sample() };
        let first = encode_frame(&FrameLayout::V2, &sample());
        let second = encode_frame(&FrameLayout::V2, &other);

        // Half of the first frame, a glitch, then a clean second frame
        let mut events = bit_events(&first[..18], 0, 2000);
        let glitch = BitEvent::new(0, 36_000 + 400);
        events.push(glitch);
        events.extend(bit_events(&second, glitch.timestamp + 50_000, 2000));

        let mut assembler = v2();
        let steps = feed(&mut assembler, &events);

        assert!(matches!(
            rejections(&steps).as_slice(),
            [Rejection::Timing { bit_index: 18, .. }]
        ));
        let received = readings(&steps);
        assert_eq!(received.len(), 1);
        assert!(received[0].same_measurement(&other));
    }

    #[test]
    fn test_wrapping_timestamps() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        let start = u32::MAX - 30_000;
        let mut assembler = v2();
        let received = readings(&feed(&mut assembler, &bit_events(&bits, start, 2000)));
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].timestamp, start.wrapping_add(72_000));
    }

    #[test]
    fn test_back_to_back_frames() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        let mut stream = bits.to_vec();
        stream.extend_from_slice(&bits);

        let mut assembler = v2();
        let received = readings(&feed(&mut assembler, &bit_events(&stream, 0, 2000)));
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].timestamp, 144_000);
    }

    #[test]
    fn test_reset_clears_progress() {
        let bits = encode_frame(&FrameLayout::V2, &sample());
        let mut assembler = v2();
        feed(&mut assembler, &bit_events(&bits[..10], 0, 2000));
        assert_eq!(assembler.bit_index(), 10);
        assembler.reset();
        assert_eq!(assembler.bit_index(), 0);
    }
}
