//! # Decoding Pipeline
//!
//! Connects the edge handler to the frame processor.
//!
//! The two halves run in different contexts:
//! - [`EdgeHandler`] sits where the GPIO edge callback fires. It runs the
//!   line decoder and hands bits off with a non-blocking `try_send`.
//! - [`FrameProcessor`] runs as a normal task, awaits bits, assembles and
//!   validates frames, filters retransmissions and passes readings to a
//!   [`ReadingSink`].
//!
//! The bounded channel between them is the only shared state. Bits keep
//! their order. On the interrupt path a full channel drops new bits and
//! counts them; replayed input has no real-time limit and waits for room
//! instead (see [`EdgeHandler::on_edge_async`]).

use std::future::Future;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::Result;
use crate::output::ReadingSink;
use crate::protocol::assembler::{FrameAssembler, Rejection, Step};
use crate::protocol::dedup::Deduplicator;
use crate::protocol::line::{BitEvent, LineDecoder};
use crate::protocol::reading::Reading;
use crate::protocol::timing::Timing;

/// Receiving half of the bit hand-off
pub type BitReceiver = mpsc::Receiver<BitEvent>;

/// Create the bit hand-off
///
/// # Arguments
///
/// * `timing` - Bands used by the line decoder
/// * `capacity` - Bits buffered between producer and consumer (must be > 0)
///
/// # Returns
///
/// * `(EdgeHandler, BitReceiver)` - Producer and consumer ends
pub fn bit_channel(timing: Timing, capacity: usize) -> (EdgeHandler, BitReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (EdgeHandler::new(LineDecoder::new(timing), tx), rx)
}

/// Producer side: edge timestamps in, bit events out
#[derive(Debug)]
pub struct EdgeHandler {
    decoder: LineDecoder,
    tx: mpsc::Sender<BitEvent>,
    overflows: u64,
}

impl EdgeHandler {
    fn new(decoder: LineDecoder, tx: mpsc::Sender<BitEvent>) -> Self {
        Self {
            decoder,
            tx,
            overflows: 0,
        }
    }

    /// Handle one line transition
    ///
    /// Never blocks. A bit that does not fit into the channel is dropped;
    /// once the consumer is gone bits are discarded silently.
    pub fn on_edge(&mut self, timestamp: u32) {
        if let Some(bit) = self.decoder.on_edge(timestamp) {
            if let Err(TrySendError::Full(_)) = self.tx.try_send(bit) {
                self.overflows += 1;
            }
        }
    }

    /// Handle one line transition, waiting for room in the channel
    ///
    /// For sources that can outpace the consumer, such as a recorded
    /// capture. Nothing is dropped; once the consumer is gone bits are
    /// discarded silently.
    pub async fn on_edge_async(&mut self, timestamp: u32) {
        if let Some(bit) = self.decoder.on_edge(timestamp) {
            let _ = self.tx.send(bit).await;
        }
    }

    /// Bits dropped because the channel was full
    pub fn overflows(&self) -> u64 {
        self.overflows
    }
}

/// Frame processing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub bits: u64,
    pub readings: u64,
    pub duplicates: u64,
    pub timing_errors: u64,
    pub preamble_errors: u64,
    pub checksum_errors: u64,
}

/// Consumer side: bit events in, deduplicated readings out
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    assembler: FrameAssembler,
    dedup: Deduplicator,
    stats: ProcessorStats,
}

impl FrameProcessor {
    /// Build a processor from configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidTiming` if the configured bands overlap
    pub fn new(config: &Config) -> Result<Self> {
        let timing = config.timing.timing()?;
        Ok(Self::with_parts(
            FrameAssembler::new(config.frame.layout.layout(), timing),
            Deduplicator::new(config.dedup.window_us),
        ))
    }

    /// Build a processor from an assembler and a filter
    pub fn with_parts(assembler: FrameAssembler, dedup: Deduplicator) -> Self {
        Self {
            assembler,
            dedup,
            stats: ProcessorStats::default(),
        }
    }

    /// Feed one bit
    ///
    /// # Returns
    ///
    /// * `Option<Reading>` - A reading to emit, if this bit completed a new one
    pub fn process(&mut self, bit: BitEvent) -> Option<Reading> {
        self.stats.bits += 1;

        match self.assembler.push(bit) {
            Step::Pending => None,
            Step::Rejected(rejection) => {
                trace!("Frame dropped: {:?}", rejection);
                match rejection {
                    Rejection::Timing { .. } => self.stats.timing_errors += 1,
                    Rejection::Preamble { .. } => self.stats.preamble_errors += 1,
                    Rejection::Checksum { .. } => self.stats.checksum_errors += 1,
                }
                None
            }
            Step::Complete(reading) => match self.dedup.filter(reading) {
                Some(reading) => {
                    self.stats.readings += 1;
                    debug!(
                        "Reading: house {} channel {} {:.1}°C {}%",
                        reading.house_code,
                        reading.reported_channel(),
                        reading.temperature(),
                        reading.humidity
                    );
                    Some(reading)
                }
                None => {
                    self.stats.duplicates += 1;
                    trace!("Suppressed retransmission (seq {})", reading.sequence);
                    None
                }
            },
        }
    }

    /// Process bits until the producer side goes away
    ///
    /// A closed channel means the input has ended; it is not an error.
    ///
    /// # Arguments
    ///
    /// * `rx` - Consumer end of [`bit_channel`]
    /// * `sink` - Destination for emitted readings
    ///
    /// # Errors
    ///
    /// Returns error if the sink fails to emit a reading
    pub async fn run<S: ReadingSink>(
        self,
        rx: BitReceiver,
        sink: &mut S,
    ) -> Result<ProcessorStats> {
        self.run_until(rx, sink, std::future::pending()).await
    }

    /// Process bits until the input ends or `shutdown` completes
    ///
    /// Either way the counters gathered so far are returned.
    ///
    /// # Errors
    ///
    /// Returns error if the sink fails to emit a reading
    pub async fn run_until<S, F>(
        mut self,
        mut rx: BitReceiver,
        sink: &mut S,
        shutdown: F,
    ) -> Result<ProcessorStats>
    where
        S: ReadingSink,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                bit = rx.recv() => match bit {
                    Some(bit) => {
                        if let Some(reading) = self.process(bit) {
                            sink.emit(&reading)?;
                        }
                    }
                    None => {
                        debug!("Bit stream closed");
                        break;
                    }
                },

                _ = &mut shutdown => {
                    debug!("Processing stopped before end of input");
                    break;
                }
            }
        }

        info!(
            "Processed {} bits: {} readings, {} duplicates",
            self.stats.bits, self.stats.readings, self.stats.duplicates
        );
        if self.stats.checksum_errors > 0 {
            warn!("{} frames failed the parity check", self.stats.checksum_errors);
        }

        Ok(self.stats)
    }

    /// Counters so far
    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }
}
