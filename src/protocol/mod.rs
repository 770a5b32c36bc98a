//! # WT440H Protocol Module
//!
//! Decoding of the WT440H wireless sensor protocol.
//!
//! This module handles:
//! - Biphase-mark line decoding from edge timestamps
//! - Frame assembly with preamble matching and bit spacing checks
//! - Two-lane XOR parity validation
//! - Versioned frame layouts
//! - Suppression of retransmitted readings

pub mod timing;
pub mod line;
pub mod layout;
pub mod parity;
pub mod reading;
pub mod assembler;
pub mod dedup;
pub mod encoder;
