//! # Sensor Reading
//!
//! A fully validated WT440H measurement.

/// Offset subtracted from the transmitted temperature integer part
pub const TEMPERATURE_OFFSET: i16 = 50;

/// Decoded sensor record
///
/// Every field holds the raw value from the frame. Use
/// [`reported_channel`](Reading::reported_channel) and
/// [`temperature`](Reading::temperature) for the values shown on the
/// sensor display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reading {
    /// House code (4 bits)
    pub house_code: u8,

    /// Raw channel index (2 bits, 0-3)
    pub channel: u8,

    /// Status bits (2 bits)
    pub status: u8,

    /// Battery low flag (always false on layouts without it)
    pub battery_low: bool,

    /// Relative humidity in percent
    pub humidity: u8,

    /// Temperature integer part, offset by +50 °C
    pub temp_integer: u8,

    /// Temperature fraction in sixteenths of a degree
    pub temp_fraction: u8,

    /// Transmission sequence number (2 bits)
    pub sequence: u8,

    /// Microsecond timestamp of the bit that completed the frame
    pub timestamp: u32,
}

impl Reading {
    /// Channel as printed on the sensor (1-4)
    ///
    /// # Examples
    ///
    /// ```
    /// use wt440h_rx::protocol::reading::Reading;
    ///
    /// let reading = Reading { channel: 2, ..Reading::default() };
    /// assert_eq!(reading.reported_channel(), 3);
    /// ```
    pub fn reported_channel(&self) -> u8 {
        self.channel + 1
    }

    /// Temperature in degrees Celsius
    ///
    /// # Examples
    ///
    /// ```
    /// use wt440h_rx::protocol::reading::Reading;
    ///
    /// let reading = Reading { temp_integer: 53, temp_fraction: 8, ..Reading::default() };
    /// assert_eq!(reading.temperature(), 3.5);
    /// ```
    pub fn temperature(&self) -> f32 {
        let integer = self.temp_integer as i16 - TEMPERATURE_OFFSET;
        integer as f32 + self.temp_fraction as f32 / 16.0
    }

    /// Whether `other` carries the same measurement
    ///
    /// Sequence number and timestamp differ between retransmissions of one
    /// measurement and are not compared.
    pub fn same_measurement(&self, other: &Reading) -> bool {
        self.house_code == other.house_code
            && self.channel == other.channel
            && self.status == other.status
            && self.battery_low == other.battery_low
            && self.humidity == other.humidity
            && self.temp_integer == other.temp_integer
            && self.temp_fraction == other.temp_fraction
    }
}
