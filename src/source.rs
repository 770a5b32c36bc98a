//! # Edge Source
//!
//! Reads line transitions from a text stream and feeds them to an
//! [`EdgeHandler`]. This stands in for the GPIO interrupt: any tool that
//! can timestamp edges on the receiver's data pin (a logic analyzer export,
//! a small GPIO poller, a recorded capture) can drive the decoder.
//!
//! One edge per line, timestamp in microseconds, optionally preceded by
//! the new line level:
//!
//! ```text
//! # level timestamp_us
//! 1 1043520
//! 0 1045521
//! 1046519
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::error::{Result, Wt440hError};
use crate::pipeline::EdgeHandler;

/// Parse the timestamp of one edge line
///
/// # Returns
///
/// * `Option<u32>` - `None` for blank lines and comments. Timestamps
///   wrap modulo 2^32 like the hardware counter.
///
/// # Errors
///
/// Returns `EdgeParse` if the line is not a valid edge
fn parse_edge(line: &str, line_number: u64) -> Result<Option<u32>> {
    let invalid = || Wt440hError::EdgeParse {
        line: line_number,
        content: line.to_string(),
    };

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut fields = trimmed.split_whitespace();
    let timestamp = match (fields.next(), fields.next(), fields.next()) {
        (Some(timestamp), None, None) => timestamp,
        (Some(level), Some(timestamp), None) if level == "0" || level == "1" => timestamp,
        _ => return Err(invalid()),
    };

    let timestamp = timestamp.parse::<u64>().map_err(|_| invalid())?;
    Ok(Some(timestamp as u32))
}

/// Feed every edge in `reader` to `handler`
///
/// The reader is not bound to real time, so each bit waits for room in the
/// channel rather than being dropped.
///
/// # Arguments
///
/// * `reader` - Edge stream, one edge per line
/// * `handler` - Producer end of the bit hand-off
///
/// # Returns
///
/// * `Result<u64>` - Number of edges fed
///
/// # Errors
///
/// Returns error if reading fails or a line is not a valid edge
pub async fn feed_edges<R>(reader: R, handler: &mut EdgeHandler) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number: u64 = 0;
    let mut edges: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;

        if let Some(timestamp) = parse_edge(&line, line_number)? {
            handler.on_edge_async(timestamp).await;
            edges += 1;
        }
    }

    debug!("Edge input ended after {} edges", edges);
    Ok(edges)
}
