//! # Retransmission Filter
//!
//! WT440H sensors send every measurement several times in a row. A reading
//! is suppressed when it carries the same measurement as the last emitted
//! one and arrives within the suppression window of it.

use super::reading::Reading;

/// Default suppression window in microseconds
pub const DEFAULT_DEDUP_WINDOW_US: u32 = 1_000_000;

/// Suppresses retransmissions of the last emitted reading
#[derive(Debug, Clone)]
pub struct Deduplicator {
    window_us: u32,
    last: Option<Reading>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_WINDOW_US)
    }
}

impl Deduplicator {
    /// Create a filter with an empty history
    pub fn new(window_us: u32) -> Self {
        Self {
            window_us,
            last: None,
        }
    }

    /// Pass `reading` through the filter
    ///
    /// # Returns
    ///
    /// * `Option<Reading>` - The reading if it must be emitted, `None` for a
    ///   retransmission. Only emitted readings restart the window.
    ///
    /// # Examples
    ///
    /// ```
    /// use wt440h_rx::protocol::dedup::Deduplicator;
    /// use wt440h_rx::protocol::reading::Reading;
    ///
    /// let mut dedup = Deduplicator::new(1_000_000);
    /// let reading = Reading { humidity: 50, timestamp: 0, ..Reading::default() };
    /// let repeat = Reading { sequence: 1, timestamp: 80_000, ..reading };
    ///
    /// assert!(dedup.filter(reading).is_some());
    /// assert!(dedup.filter(repeat).is_none());
    /// ```
    pub fn filter(&mut self, reading: Reading) -> Option<Reading> {
        if self.is_duplicate(&reading) {
            return None;
        }

        self.last = Some(reading);
        Some(reading)
    }

    /// Whether `reading` repeats the last emitted one within the window
    pub fn is_duplicate(&self, reading: &Reading) -> bool {
        match &self.last {
            Some(last) => {
                let elapsed = reading.timestamp.wrapping_sub(last.timestamp);
                last.same_measurement(reading) && elapsed < self.window_us
            }
            None => false,
        }
    }

    /// Last emitted reading
    pub fn last(&self) -> Option<&Reading> {
        self.last.as_ref()
    }

    /// Suppression window in microseconds
    pub fn window_us(&self) -> u32 {
        self.window_us
    }
}
