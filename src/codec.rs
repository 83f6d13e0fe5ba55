//! Frame construction and checksum validation.
//!
//! Every frame on the bus is `[address, command, ...payload, checksum]`. The
//! checksum seeds a 32-bit accumulator with `0xAA`, adds every byte, then folds
//! the four bytes of the accumulator together and keeps the low 8 bits.

use crate::command::Command;
use crate::constants::CHECKSUM_SEED;
use crate::types::PanelAddress;

/// A complete frame, checksum included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Vec<u8>);

impl Frame {
    /// Bytes as written to the bus
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the bytes, checksum included
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Bytes covered by the checksum
    pub fn payload(&self) -> &[u8] {
        &self.0[..self.0.len().saturating_sub(1)]
    }

    /// Trailing checksum byte; `None` for an empty frame
    pub fn checksum(&self) -> Option<u8> {
        self.0.last().copied()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Calculate the checksum for a payload
pub fn checksum(payload: &[u8]) -> u8 {
    let acc = payload
        .iter()
        .fold(CHECKSUM_SEED, |acc, &b| acc.wrapping_add(b as u32));
    acc.to_be_bytes()
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Append the checksum to a payload
pub fn build_frame(payload: &[u8]) -> Frame {
    let mut frame = payload.to_vec();
    frame.push(checksum(payload));
    Frame(frame)
}

/// Check that the last byte is the checksum of the bytes before it
pub fn validate(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&cs, payload)) => checksum(payload) == cs,
        None => false,
    }
}

/// Build the wire frame for a command
pub fn encode(command: &Command, panel: PanelAddress) -> Frame {
    build_frame(&command.payload(panel))
}

/// Render bytes as `AA BB CC` for diagnostics
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
