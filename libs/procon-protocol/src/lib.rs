//! Switch Pro Controller protocol
//!
//! Everything the Switch sees on the wire when it talks to a factory Pro
//! Controller over USB: the standard input report and its packed stick
//! format, the subcommand set exercised during enumeration with bit-exact
//! replies, the emulated SPI flash image those replies read from, and the
//! USB descriptor data. The byte layouts follow the community
//! reverse-engineering of the real controller.
//!
//! This crate only describes and transforms bytes; it holds no device state
//! and performs no I/O, so it tests on the host.

#![no_std]

pub mod descriptors;
pub mod input;
pub mod report;
pub mod spi;
pub mod subcommand;

/// Bluetooth MAC address reported by the emulated controller.
///
/// The Switch echoes this in its pairing flow but never routes traffic to
/// it, so any stable value works.
pub const MAC_ADDRESS: [u8; 6] = [0x98, 0xB6, 0xE9, 0x46, 0x50, 0x6A];
