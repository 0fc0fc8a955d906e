//! Host payload decoding
//!
//! The host PC describes the desired controller state in eight bytes:
//!
//! ```text
//! [button_hi, button_lo, dpad, lx, ly, rx, ry, vendor]
//! ```
//!
//! Buttons are a big-endian 16-bit word, the d-pad is a compass code, and
//! stick axes are 8-bit values widened to the report's 12-bit range.

use bitflags::bitflags;

use crate::report::{Button, StandardReport};

bitflags! {
    /// Buttons in the host's 16-bit command word.
    pub struct HostButtons: u16 {
        const Y       = 0x0001;
        const B       = 0x0002;
        const A       = 0x0004;
        const X       = 0x0008;
        const L       = 0x0010;
        const R       = 0x0020;
        const ZL      = 0x0040;
        const ZR      = 0x0080;
        const MINUS   = 0x0100;
        const PLUS    = 0x0200;
        const LCLICK  = 0x0400;
        const RCLICK  = 0x0800;
        const HOME    = 0x1000;
        const CAPTURE = 0x2000;
    }
}

/// D-pad compass codes, clockwise from north; 8 releases the pad.
pub mod hat {
    pub const TOP: u8 = 0;
    pub const TOP_RIGHT: u8 = 1;
    pub const RIGHT: u8 = 2;
    pub const BOTTOM_RIGHT: u8 = 3;
    pub const BOTTOM: u8 = 4;
    pub const BOTTOM_LEFT: u8 = 5;
    pub const LEFT: u8 = 6;
    pub const TOP_LEFT: u8 = 7;
    pub const CENTER: u8 = 8;
}

/// Host-word flag to report-button pairs, in wire-bit order.
const BUTTON_MAP: [(HostButtons, Button); 14] = [
    (HostButtons::Y, Button::Y),
    (HostButtons::B, Button::B),
    (HostButtons::A, Button::A),
    (HostButtons::X, Button::X),
    (HostButtons::L, Button::L),
    (HostButtons::R, Button::R),
    (HostButtons::ZL, Button::Zl),
    (HostButtons::ZR, Button::Zr),
    (HostButtons::MINUS, Button::Minus),
    (HostButtons::PLUS, Button::Plus),
    (HostButtons::LCLICK, Button::LeftStick),
    (HostButtons::RCLICK, Button::RightStick),
    (HostButtons::HOME, Button::Home),
    (HostButtons::CAPTURE, Button::Capture),
];

/// Widen an 8-bit host axis to the report's 12-bit range.
///
/// The low nibble lands mid-range so the widened value sits at the center
/// of the 16-wide bucket the byte maps onto; midpoint 0x80 becomes 0x808.
fn expand_axis(value: u8) -> u16 {
    ((value as u16) << 4) | 0x08
}

/// Build the standard report described by a validated host payload.
pub fn report_from_payload(payload: &[u8; 8]) -> StandardReport {
    let buttons =
        HostButtons::from_bits_truncate(u16::from_be_bytes([payload[0], payload[1]]));
    let dpad = payload[2];

    let mut report = StandardReport::idle();
    for &(flag, button) in BUTTON_MAP.iter() {
        report.set_button(button, buttons.contains(flag));
    }

    report.set_button(
        Button::DpadUp,
        dpad == hat::TOP || dpad == hat::TOP_RIGHT || dpad == hat::TOP_LEFT,
    );
    report.set_button(
        Button::DpadRight,
        dpad == hat::TOP_RIGHT || dpad == hat::RIGHT || dpad == hat::BOTTOM_RIGHT,
    );
    report.set_button(
        Button::DpadDown,
        dpad == hat::BOTTOM_RIGHT || dpad == hat::BOTTOM || dpad == hat::BOTTOM_LEFT,
    );
    report.set_button(
        Button::DpadLeft,
        dpad == hat::BOTTOM_LEFT || dpad == hat::LEFT || dpad == hat::TOP_LEFT,
    );

    report.set_left_stick(expand_axis(payload[3]), expand_axis(payload[4]));
    report.set_right_stick(expand_axis(payload[5]), expand_axis(payload[6]));
    report.set_vibrator_echo(0);
    report
}
