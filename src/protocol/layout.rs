//! # Frame Layouts
//!
//! Bit positions of every field in a 36-bit WT440H frame.
//!
//! Two revisions of the transmitter firmware are in circulation. They agree
//! on everything except the bits after the status field:
//!
//! | Bits | V1 | V2 |
//! |------|----|----|
//! | 0-3 | Preamble `1100` | Preamble `1100` |
//! | 4-7 | House code | House code |
//! | 8-9 | Channel | Channel |
//! | 10-11 | Status | Status |
//! | 12 | Humidity (MSB) | Battery low |
//! | 13-19 | Humidity | Humidity |
//! | 20-27 | Temperature integer | Temperature integer |
//! | 28-31 | Temperature fraction | Temperature fraction |
//! | 32-33 | Sequence | Sequence |
//! | 34-35 | Parity | Parity |
//!
//! Fields are transmitted MSB first.

use serde::Deserialize;

/// Number of bits in a frame
pub const FRAME_BITS: u8 = 36;

/// Preamble pattern, first bit first
pub const PREAMBLE: [u8; 4] = [1, 1, 0, 0];

/// Frame field identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Preamble,
    HouseCode,
    Channel,
    Status,
    BatteryLow,
    Humidity,
    TempInteger,
    TempFraction,
    Sequence,
    Parity,
}

/// A contiguous run of frame bits belonging to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub field: Field,
    pub start: u8,
    pub len: u8,
}

impl FieldSpan {
    const fn new(field: Field, start: u8, len: u8) -> Self {
        Self { field, start, len }
    }

    /// Whether `bit_index` falls inside this span
    pub fn contains(&self, bit_index: u8) -> bool {
        bit_index >= self.start && bit_index < self.start + self.len
    }
}

/// Field table of one layout revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    spans: &'static [FieldSpan],
}

const V1_SPANS: [FieldSpan; 9] = [
    FieldSpan::new(Field::Preamble, 0, 4),
    FieldSpan::new(Field::HouseCode, 4, 4),
    FieldSpan::new(Field::Channel, 8, 2),
    FieldSpan::new(Field::Status, 10, 2),
    FieldSpan::new(Field::Humidity, 12, 8),
    FieldSpan::new(Field::TempInteger, 20, 8),
    FieldSpan::new(Field::TempFraction, 28, 4),
    FieldSpan::new(Field::Sequence, 32, 2),
    FieldSpan::new(Field::Parity, 34, 2),
];

const V2_SPANS: [FieldSpan; 10] = [
    FieldSpan::new(Field::Preamble, 0, 4),
    FieldSpan::new(Field::HouseCode, 4, 4),
    FieldSpan::new(Field::Channel, 8, 2),
    FieldSpan::new(Field::Status, 10, 2),
    FieldSpan::new(Field::BatteryLow, 12, 1),
    FieldSpan::new(Field::Humidity, 13, 7),
    FieldSpan::new(Field::TempInteger, 20, 8),
    FieldSpan::new(Field::TempFraction, 28, 4),
    FieldSpan::new(Field::Sequence, 32, 2),
    FieldSpan::new(Field::Parity, 34, 2),
];

impl FrameLayout {
    /// No battery flag, 8-bit humidity
    pub const V1: FrameLayout = FrameLayout { spans: &V1_SPANS };

    /// Battery flag at bit 12, 7-bit humidity
    pub const V2: FrameLayout = FrameLayout { spans: &V2_SPANS };

    /// Field carried by `bit_index`, if any
    pub fn field_at(&self, bit_index: u8) -> Option<Field> {
        self.spans
            .iter()
            .find(|span| span.contains(bit_index))
            .map(|span| span.field)
    }

    /// Span of `field`, if this layout carries it
    pub fn span(&self, field: Field) -> Option<FieldSpan> {
        self.spans
            .iter()
            .copied()
            .find(|span| span.field == field)
    }

    /// Whether this layout transmits a battery-low flag
    pub fn has_battery_flag(&self) -> bool {
        self.span(Field::BatteryLow).is_some()
    }
}

/// Layout revision selected in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVersion {
    V1,
    #[default]
    V2,
}

impl LayoutVersion {
    /// Field table for this revision
    pub fn layout(self) -> FrameLayout {
        match self {
            LayoutVersion::V1 => FrameLayout::V1,
            LayoutVersion::V2 => FrameLayout::V2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers_frame(layout: &FrameLayout) {
        for bit in 0..FRAME_BITS {
            assert!(layout.field_at(bit).is_some(), "bit {} has no field", bit);
        }
        assert_eq!(layout.field_at(FRAME_BITS), None);
    }

    fn assert_no_overlap(layout: &FrameLayout) {
        for bit in 0..FRAME_BITS {
            let owners = layout.spans.iter().filter(|s| s.contains(bit)).count();
            assert_eq!(owners, 1, "bit {} owned by {} fields", bit, owners);
        }
    }

    #[test]
    fn test_layouts_cover_every_bit_once() {
        for layout in [FrameLayout::V1, FrameLayout::V2] {
            assert_covers_frame(&layout);
            assert_no_overlap(&layout);
        }
    }

    #[test]
    fn test_common_fields() {
        for layout in [FrameLayout::V1, FrameLayout::V2] {
            assert_eq!(layout.field_at(0), Some(Field::Preamble));
            assert_eq!(layout.field_at(3), Some(Field::Preamble));
            assert_eq!(layout.field_at(4), Some(Field::HouseCode));
            assert_eq!(layout.field_at(9), Some(Field::Channel));
            assert_eq!(layout.field_at(11), Some(Field::Status));
            assert_eq!(layout.field_at(20), Some(Field::TempInteger));
            assert_eq!(layout.field_at(31), Some(Field::TempFraction));
            assert_eq!(layout.field_at(33), Some(Field::Sequence));
            assert_eq!(layout.field_at(35), Some(Field::Parity));
        }
    }

    #[test]
    fn test_v1_humidity_is_eight_bits() {
        let layout = FrameLayout::V1;
        assert_eq!(layout.field_at(12), Some(Field::Humidity));
        assert_eq!(layout.span(Field::Humidity).map(|s| s.len), Some(8));
        assert!(!layout.has_battery_flag());
    }

    #[test]
    fn test_v2_battery_and_seven_bit_humidity() {
        let layout = FrameLayout::V2;
        assert_eq!(layout.field_at(12), Some(Field::BatteryLow));
        assert_eq!(layout.field_at(13), Some(Field::Humidity));
        assert_eq!(layout.span(Field::Humidity).map(|s| s.len), Some(7));
        assert!(layout.has_battery_flag());
    }

    #[test]
    fn test_version_selection() {
        assert_eq!(LayoutVersion::default(), LayoutVersion::V2);
        assert_eq!(LayoutVersion::V1.layout(), FrameLayout::V1);
        assert_eq!(LayoutVersion::V2.layout(), FrameLayout::V2);
    }
}
