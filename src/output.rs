//! # Reading Output Module
//!
//! Formats decoded readings as plain text or JSON Lines.
//!
//! Text:
//! ```text
//! house=5 channel=3 status=1 battery=ok humidity=45% temperature=3.5C seq=1
//! ```
//!
//! JSON Lines:
//! ```text
//! {"house_code":5,"channel":3,"status":1,"battery_low":false,"humidity":45,"temperature":3.5,"sequence":1,"timestamp_us":72000,"received_at":"2024-01-01T00:00:00+00:00"}
//! ```

use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

use crate::error::{Result, Wt440hError};
use crate::protocol::reading::Reading;

/// Destination for emitted readings
#[cfg_attr(test, mockall::automock)]
pub trait ReadingSink {
    /// Emit one reading
    fn emit(&mut self, reading: &Reading) -> Result<()>;
}

/// Output line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = Wt440hError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "jsonl" => Ok(OutputFormat::JsonLines),
            other => Err(Wt440hError::Output(format!("unknown output format '{}'", other))),
        }
    }
}

/// JSON representation of a reading, with display values resolved
#[derive(Debug, Serialize)]
struct ReadingRecord {
    house_code: u8,
    channel: u8,
    status: u8,
    battery_low: bool,
    humidity: u8,
    temperature: f32,
    sequence: u8,
    timestamp_us: u32,
    received_at: String,
}

impl From<&Reading> for ReadingRecord {
    fn from(reading: &Reading) -> Self {
        Self {
            house_code: reading.house_code,
            channel: reading.reported_channel(),
            status: reading.status,
            battery_low: reading.battery_low,
            humidity: reading.humidity,
            temperature: reading.temperature(),
            sequence: reading.sequence,
            timestamp_us: reading.timestamp,
            received_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Render a reading as one text line (without newline)
pub fn format_text(reading: &Reading) -> String {
    format!(
        "house={} channel={} status={} battery={} humidity={}% temperature={:.1}C seq={}",
        reading.house_code,
        reading.reported_channel(),
        reading.status,
        if reading.battery_low { "low" } else { "ok" },
        reading.humidity,
        reading.temperature(),
        reading.sequence
    )
}

/// Render a reading as one JSON object (without newline)
pub fn format_json(reading: &Reading) -> Result<String> {
    serde_json::to_string(&ReadingRecord::from(reading))
        .map_err(|e| Wt440hError::Output(format!("Failed to serialize reading: {}", e)))
}

/// Writes one line per reading to any `Write`
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReadingSink for WriterSink<W> {
    fn emit(&mut self, reading: &Reading) -> Result<()> {
        let line = match self.format {
            OutputFormat::Text => format_text(reading),
            OutputFormat::JsonLines => format_json(reading)?,
        };
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}
