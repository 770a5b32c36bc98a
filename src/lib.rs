//! # WT440H Receiver Library
//!
//! Decode WT440H wireless temperature/humidity sensor frames from the edge
//! timings of a 433 MHz receiver's data line.
//!
//! This library provides the decoding pipeline: biphase-mark line decoding,
//! frame assembly with parity validation, and suppression of retransmitted
//! readings.

pub mod config;
pub mod error;
pub mod protocol;
pub mod pipeline;
pub mod source;
pub mod output;
