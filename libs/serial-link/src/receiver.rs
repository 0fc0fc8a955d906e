//! Frame synchronization and assembly
//!
//! The receiver is a four-state machine driven one byte at a time from the
//! UART receive interrupt:
//!
//! | State       | Byte                     | Next        | Reply       |
//! | ----------- | ------------------------ | ----------- | ----------- |
//! | `OutOfSync` | `SYNC_START`             | `SyncStart` | `SYNC_START` |
//! | `OutOfSync` | other                    | `OutOfSync` | —           |
//! | `SyncStart` | `SYNC_1`                 | `Sync1`     | `SYNC_1`    |
//! | `SyncStart` | other                    | `OutOfSync` | —           |
//! | `Sync1`     | `SYNC_2`                 | `Synced`    | `SYNC_OK`   |
//! | `Sync1`     | other                    | `OutOfSync` | —           |
//! | `Synced`    | payload (count < 8)      | `Synced`    | —           |
//! | `Synced`    | checksum, match          | `Synced`    | `ACK`       |
//! | `Synced`    | checksum slot = `SYNC_START` | `SyncStart` | `SYNC_START` |
//! | `Synced`    | checksum, mismatch       | `Synced`    | `NACK`      |
//!
//! The assembly buffer and running checksum reset on every frame exit, so a
//! rejected frame never bleeds into the next one.

use crate::crc::crc8_ccitt_update;
use crate::{command, response, ByteTx};

/// Payload bytes per serial frame.
pub const PAYLOAD_LEN: usize = 8;

/// Synchronization state of the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No handshake in progress; only a sync-start byte is meaningful.
    OutOfSync,
    /// First handshake byte seen.
    SyncStart,
    /// Second handshake byte seen.
    Sync1,
    /// Handshake complete; inbound bytes are frame data.
    Synced,
}

/// Assembles validated frames out of the raw byte stream.
pub struct FrameReceiver {
    state: SyncState,
    payload: [u8; PAYLOAD_LEN],
    received: usize,
    crc: u8,
}

impl FrameReceiver {
    pub const fn new() -> Self {
        FrameReceiver {
            state: SyncState::OutOfSync,
            payload: [0; PAYLOAD_LEN],
            received: 0,
            crc: 0,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }

    /// Consume one byte from the host, answering through `tx`.
    ///
    /// Returns the payload of a frame whose checksum just validated. All
    /// other bytes — handshake traffic, partial frames, rejected frames —
    /// return `None`.
    pub fn on_byte<T: ByteTx>(&mut self, byte: u8, tx: &mut T) -> Option<[u8; PAYLOAD_LEN]> {
        match self.state {
            SyncState::Synced => return self.on_frame_byte(byte, tx),
            SyncState::SyncStart => {
                if byte == command::SYNC_1 {
                    self.state = SyncState::Sync1;
                    tx.send_byte(response::SYNC_1);
                } else {
                    self.state = SyncState::OutOfSync;
                }
            }
            SyncState::Sync1 => {
                if byte == command::SYNC_2 {
                    self.state = SyncState::Synced;
                    self.reset_frame();
                    tx.send_byte(response::SYNC_OK);
                } else {
                    self.state = SyncState::OutOfSync;
                }
            }
            SyncState::OutOfSync => {
                if byte == command::SYNC_START {
                    self.state = SyncState::SyncStart;
                    tx.send_byte(response::SYNC_START);
                }
            }
        }
        None
    }

    fn on_frame_byte<T: ByteTx>(&mut self, byte: u8, tx: &mut T) -> Option<[u8; PAYLOAD_LEN]> {
        if self.received < PAYLOAD_LEN {
            self.payload[self.received] = byte;
            self.received += 1;
            self.crc = crc8_ccitt_update(self.crc, byte);
            return None;
        }

        // Ninth byte: the checksum slot.
        let frame = if byte == self.crc {
            // Acknowledge before the caller decodes, so a blocking host
            // isn't left waiting on our USB schedule.
            tx.send_byte(response::ACK);
            Some(self.payload)
        } else if byte == command::SYNC_START {
            // Not a checksum: the host is asking for a fresh handshake.
            self.state = SyncState::SyncStart;
            tx.send_byte(response::SYNC_START);
            None
        } else {
            tx.send_byte(response::NACK);
            None
        };
        self.reset_frame();
        frame
    }

    fn reset_frame(&mut self) {
        self.received = 0;
        self.crc = 0;
    }
}
