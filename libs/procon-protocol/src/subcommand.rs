//! Subcommand dispatch and reply framing
//!
//! During enumeration the Switch interrogates the controller through its
//! OUT endpoint: bare USB-class commands (leading byte 0x80) first, then
//! UART-style subcommands tunneled in rumble reports (leading byte 0x01,
//! subcommand at byte 10). Each request is answered on the IN endpoint with
//! one of two framings:
//!
//! - short: `[code][command][body…]`
//! - input-report: `[0x21][counter][state snapshot][ack][subcommand][body…]`
//!
//! Every reply is padded with zeros to the 64-byte endpoint size. The set
//! of requests and the exact reply bytes below are what a factory Pro
//! Controller produces; the Switch refuses controllers that deviate.

use crate::descriptors::EP_SIZE;
use crate::report::StandardReport;
use crate::{spi, MAC_ADDRESS};

/// Report IDs exchanged with the Switch.
pub mod report_id {
    /// Standard input report (IN).
    pub const STANDARD_INPUT: u8 = 0x30;
    /// Subcommand reply (IN).
    pub const SUBCOMMAND_REPLY: u8 = 0x21;
    /// USB-class command (OUT).
    pub const USB_COMMAND: u8 = 0x80;
    /// USB-class reply (IN).
    pub const USB_REPLY: u8 = 0x81;
    /// Rumble data plus subcommand (OUT).
    pub const RUMBLE_SUBCOMMAND: u8 = 0x01;
}

/// Added to the report counter before it stamps any outgoing 0x21 or 0x30
/// report, first report included.
pub const COUNTER_INCREMENT: u8 = 3;

/// Largest reply body: an SPI read behind its five-byte address/size prefix.
const MAX_BODY: usize = 5 + spi::MAX_READ;

/// How a queued reply appears on the IN endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Short,
    InputReport,
}

/// A reply ready to be serialized into the next IN packet.
pub struct Reply {
    framing: Framing,
    code: u8,
    command: u8,
    body: [u8; MAX_BODY],
    body_len: usize,
}

impl Reply {
    fn new(framing: Framing, code: u8, command: u8, body: &[u8]) -> Self {
        let mut reply = Reply {
            framing,
            code,
            command,
            body: [0; MAX_BODY],
            body_len: body.len(),
        };
        reply.body[..body.len()].copy_from_slice(body);
        reply
    }

    fn short(code: u8, command: u8, body: &[u8]) -> Self {
        Reply::new(Framing::Short, code, command, body)
    }

    fn input_report(ack: u8, subcommand: u8, body: &[u8]) -> Self {
        Reply::new(Framing::InputReport, ack, subcommand, body)
    }

    fn body(&self) -> &[u8] {
        &self.body[..self.body_len]
    }

    /// Serialize into a zeroed IN packet.
    ///
    /// Input-report framing advances `counter` and embeds `state`, exactly
    /// as a live 0x30 report would; short framing touches neither.
    pub fn write_into(
        &self,
        packet: &mut [u8; EP_SIZE],
        counter: &mut u8,
        state: &StandardReport,
    ) {
        *packet = [0; EP_SIZE];
        match self.framing {
            Framing::Short => {
                packet[0] = self.code;
                packet[1] = self.command;
                packet[2..2 + self.body_len].copy_from_slice(self.body());
            }
            Framing::InputReport => {
                *counter = counter.wrapping_add(COUNTER_INCREMENT);
                packet[0] = report_id::SUBCOMMAND_REPLY;
                packet[1] = *counter;
                packet[2..2 + StandardReport::LEN].copy_from_slice(state.as_bytes());
                let ack = 2 + StandardReport::LEN;
                packet[ack] = self.code;
                packet[ack + 1] = self.command;
                packet[ack + 2..ack + 2 + self.body_len].copy_from_slice(self.body());
            }
        }
    }
}

/// Serialize a standard 0x30 input report, advancing `counter`.
pub fn write_standard_report(
    packet: &mut [u8; EP_SIZE],
    counter: &mut u8,
    state: &StandardReport,
) {
    *packet = [0; EP_SIZE];
    *counter = counter.wrapping_add(COUNTER_INCREMENT);
    packet[0] = report_id::STANDARD_INPUT;
    packet[1] = *counter;
    packet[2..2 + StandardReport::LEN].copy_from_slice(state.as_bytes());
}

/// The `0x81 0x01` identification reply: controller type and MAC.
///
/// Also staged at power-on, so the Switch's first status request is
/// answered even if it beats the first OUT dispatch.
pub fn identify_reply() -> Reply {
    let mut body = [0u8; 8];
    body[1] = 0x03; // Pro Controller
    body[2..8].copy_from_slice(&MAC_ADDRESS);
    Reply::short(report_id::USB_REPLY, 0x01, &body)
}

/// Outcome of dispatching one OUT report.
pub enum Dispatch {
    /// Queue this reply for the next IN poll.
    Reply(Reply),
    /// `0x80 0x04`: the Switch wants standard input reports streaming.
    EnableReports,
    /// Nothing to answer.
    None,
}

/// Interpret one OUT report, truncated to the endpoint size by the caller.
pub fn dispatch(out: &[u8]) -> Dispatch {
    match out.first() {
        Some(&report_id::USB_COMMAND) => dispatch_usb_command(out),
        Some(&report_id::RUMBLE_SUBCOMMAND) if out.len() > 16 => dispatch_subcommand(out),
        _ => Dispatch::None,
    }
}

fn dispatch_usb_command(out: &[u8]) -> Dispatch {
    let subtype = out.get(1).copied().unwrap_or(0);
    match subtype {
        // Identify: the first thing the Switch asks over USB.
        0x01 => Dispatch::Reply(identify_reply()),
        // Baud-rate handshake and its follow-up; echoed empty.
        0x02 | 0x03 => Dispatch::Reply(Reply::short(report_id::USB_REPLY, subtype, &[])),
        0x04 => Dispatch::EnableReports,
        _ => {
            log::debug!("unknown USB command subtype 0x{:02X}", subtype);
            Dispatch::Reply(Reply::short(report_id::USB_REPLY, subtype, &[]))
        }
    }
}

fn dispatch_subcommand(out: &[u8]) -> Dispatch {
    let subcommand = out[10];
    log::trace!("subcommand 0x{:02X}", subcommand);
    let reply = match subcommand {
        // Bluetooth manual pairing; answered with a fixed "paired" byte.
        0x01 => Reply::input_report(0x81, subcommand, &[0x03]),
        // Device info: firmware 3.48, Pro Controller, MAC reversed, colors
        // stored in SPI.
        0x02 => {
            let mut body = [0u8; 12];
            body[0] = 0x03;
            body[1] = 0x48;
            body[2] = 0x03;
            body[3] = 0x02;
            for (index, &byte) in MAC_ADDRESS.iter().rev().enumerate() {
                body[4 + index] = byte;
            }
            body[10] = 0x03;
            body[11] = 0x02;
            Reply::input_report(0x82, subcommand, &body)
        }
        // Mode and feature toggles the bridge accepts without acting on:
        // input report mode, shipment state, player and HOME lights, IMU,
        // vibration.
        0x03 | 0x08 | 0x30 | 0x38 | 0x40 | 0x48 => Reply::input_report(0x80, subcommand, &[]),
        // Trigger-buttons elapsed time.
        0x04 => Reply::input_report(0x83, subcommand, &[]),
        // NFC/IR MCU state.
        0x21 => Reply::input_report(
            0xA0,
            subcommand,
            &[0x01, 0x00, 0xFF, 0x00, 0x03, 0x00, 0x05, 0x01],
        ),
        // SPI flash read: little-endian address at bytes 11-12, length at
        // byte 15. Replies echo a five-byte prefix before the data.
        0x10 => {
            let address = u16::from_le_bytes([out[11], out[12]]);
            let length = (out[15] as usize).min(spi::MAX_READ);
            let mut body = [0u8; MAX_BODY];
            body[0] = out[11];
            body[1] = out[12];
            body[4] = length as u8;
            spi::read(address, &mut body[5..5 + length]);
            Reply::input_report(0x90, subcommand, &body[..5 + length])
        }
        _ => {
            log::debug!("unknown subcommand 0x{:02X}", subcommand);
            Reply::input_report(0x80, subcommand, &[])
        }
    };
    Dispatch::Reply(reply)
}
