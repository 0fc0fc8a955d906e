//! Serial link between a host PC and the controller bridge
//!
//! The host streams controller state over a 1 Mbaud, 8N1 UART. Every frame is
//! eight payload bytes followed by a CRC-8/CCITT checksum of those eight
//! bytes. Before any frame is accepted the host must complete a three-step
//! handshake, which protects the link against power-on garbage being read as
//! input:
//!
//! | Host sends             | Bridge answers          |
//! | ---------------------- | ----------------------- |
//! | [`command::SYNC_START`] | [`response::SYNC_START`] |
//! | [`command::SYNC_1`]     | [`response::SYNC_1`]     |
//! | [`command::SYNC_2`]     | [`response::SYNC_OK`]    |
//!
//! Once synced, each frame is answered with [`response::ACK`] or
//! [`response::NACK`]. A host that lost track of the frame boundary can write
//! [`command::SYNC_START`] in the checksum slot to restart the handshake
//! without reopening the serial port.

#![no_std]

mod crc;
mod receiver;

pub use crc::{crc8_ccitt, crc8_ccitt_update};
pub use receiver::{FrameReceiver, SyncState, PAYLOAD_LEN};

/// Bytes the host sends to drive synchronization.
pub mod command {
    /// First handshake byte. Also restarts the handshake when it appears in
    /// a frame's checksum slot.
    pub const SYNC_START: u8 = 0xFF;
    /// Second handshake byte.
    pub const SYNC_1: u8 = 0x33;
    /// Third handshake byte; completes the handshake.
    pub const SYNC_2: u8 = 0xCC;
}

/// Bytes the bridge sends back to the host.
pub mod response {
    /// Answer to [`super::command::SYNC_START`].
    pub const SYNC_START: u8 = 0xFF;
    /// Answer to [`super::command::SYNC_1`].
    pub const SYNC_1: u8 = 0xCC;
    /// Answer to [`super::command::SYNC_2`]; the link is now synchronized.
    pub const SYNC_OK: u8 = 0x33;
    /// Frame accepted.
    pub const ACK: u8 = 0x91;
    /// Frame rejected: checksum mismatch.
    pub const NACK: u8 = 0x92;
}

/// A blocking, single-byte serial transmitter.
///
/// The receiver answers the host from interrupt context, so implementations
/// must not depend on the main loop making progress. Waiting on the UART
/// transmit buffer is acceptable; at 1 Mbaud the wait is bounded by one byte
/// time.
pub trait ByteTx {
    /// Send `byte`, waiting for transmit-buffer space if necessary.
    fn send_byte(&mut self, byte: u8);
}
