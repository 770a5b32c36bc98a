//! # WT440H Frame Encoder
//!
//! Builds frames the way the transmitter does, and the biphase-mark edge
//! trains that carry them. Used to synthesize signals for loopback tests
//! and for checking a receiver setup without a sensor at hand.

use super::layout::{Field, FrameLayout, FRAME_BITS, PREAMBLE};
use super::line::BitEvent;
use super::parity::Parity;
use super::reading::Reading;

/// Number of payload bits before the parity trailer
const PAYLOAD_BITS: usize = FRAME_BITS as usize - 2;

/// Encode a reading into a complete 36-bit frame
///
/// Field values wider than their span are truncated to the span. The
/// reading's timestamp is not transmitted.
///
/// # Examples
///
/// ```
/// use wt440h_rx::protocol::encoder::encode_frame;
/// use wt440h_rx::protocol::layout::FrameLayout;
/// use wt440h_rx::protocol::reading::Reading;
///
/// let bits = encode_frame(&FrameLayout::V2, &Reading::default());
/// assert_eq!(&bits[..4], &[1, 1, 0, 0]);
/// ```
pub fn encode_frame(layout: &FrameLayout, reading: &Reading) -> [u8; FRAME_BITS as usize] {
    let mut bits = [0u8; FRAME_BITS as usize];

    for index in 0..PAYLOAD_BITS {
        let bit_index = index as u8;
        bits[index] = match layout.field_at(bit_index) {
            Some(Field::Preamble) => PREAMBLE[index],
            Some(field) => field_bit(layout, reading, field, bit_index),
            None => 0,
        };
    }

    let trailer = Parity::trailer(&bits[..PAYLOAD_BITS]);
    bits[PAYLOAD_BITS..].copy_from_slice(&trailer);

    bits
}

/// Bit of `field` transmitted at `bit_index`, MSB first
fn field_bit(layout: &FrameLayout, reading: &Reading, field: Field, bit_index: u8) -> u8 {
    let value = match field {
        Field::HouseCode => reading.house_code,
        Field::Channel => reading.channel,
        Field::Status => reading.status,
        Field::BatteryLow => reading.battery_low as u8,
        Field::Humidity => reading.humidity,
        Field::TempInteger => reading.temp_integer,
        Field::TempFraction => reading.temp_fraction,
        Field::Sequence => reading.sequence,
        Field::Preamble | Field::Parity => return 0,
    };

    match layout.span(field) {
        Some(span) => {
            let shift = span.len - 1 - (bit_index - span.start);
            (value >> shift) & 1
        }
        None => 0,
    }
}

/// Edge timestamps of a biphase-mark transmission of `bits`
///
/// The first edge is the reference edge preceding the first bit. A "0"
/// adds one edge a full bit later, a "1" adds two edges half a bit apart.
///
/// # Arguments
///
/// * `bits` - Bits to transmit
/// * `start` - Timestamp of the reference edge
/// * `bit_length_us` - Full bit period
pub fn biphase_edges(bits: &[u8], start: u32, bit_length_us: u32) -> Vec<u32> {
    let half = bit_length_us / 2;
    let mut edges = Vec::with_capacity(1 + bits.len() * 2);
    let mut now = start;
    edges.push(now);

    for &bit in bits {
        if bit & 1 == 0 {
            now = now.wrapping_add(bit_length_us);
            edges.push(now);
        } else {
            now = now.wrapping_add(half);
            edges.push(now);
            now = now.wrapping_add(bit_length_us - half);
            edges.push(now);
        }
    }

    edges
}

/// Bit events as the line decoder would emit them for `bits`
///
/// Bit `k` is stamped `start + (k + 1) * bit_length_us`.
pub fn bit_events(bits: &[u8], start: u32, bit_length_us: u32) -> Vec<BitEvent> {
    bits.iter()
        .scan(start, |now, &bit| {
            *now = now.wrapping_add(bit_length_us);
            Some(BitEvent::new(bit & 1, *now))
        })
        .collect()
}
