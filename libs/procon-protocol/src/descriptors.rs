//! USB identity and descriptor data
//!
//! The values the USB stack needs to enumerate as a factory Pro Controller.
//! The Switch fingerprints the controller by these, so everything here is
//! bit-exact: vendor/product IDs, descriptor strings, the endpoint layout
//! (two 64-byte interrupt endpoints polled every 8 ms), and the full HID
//! report map.

/// Nintendo Co., Ltd.
pub const VENDOR_ID: u16 = 0x057E;
/// Pro Controller.
pub const PRODUCT_ID: u16 = 0x2009;
/// bcdDevice 2.1.0.
pub const DEVICE_RELEASE: u16 = 0x0210;

pub const MANUFACTURER: &str = "Nintendo Co., Ltd.";
pub const PRODUCT: &str = "Pro Controller";
pub const SERIAL_NUMBER: &str = "000000000001";

/// bcdHID 1.11.
pub const HID_SPEC: u16 = 0x0111;

/// Interrupt IN endpoint address.
pub const ENDPOINT_IN: u8 = 0x81;
/// Interrupt OUT endpoint address.
pub const ENDPOINT_OUT: u8 = 0x01;
/// Packet size of both interrupt endpoints.
pub const EP_SIZE: usize = 64;
/// Host poll interval for both endpoints, in milliseconds.
pub const POLL_INTERVAL_MS: u8 = 8;
/// Declared bus draw; the real controller charges over the same port.
pub const MAX_POWER_MA: u16 = 500;

/// The Pro Controller HID report map.
///
/// One application collection of joystick usage carrying the 0x30 input
/// layout (14 named buttons, four 16-bit axes, a hat), plus the
/// vendor-defined 63-byte reports: inputs 0x21 and 0x81, outputs 0x01,
/// 0x10, 0x80, and 0x82.
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: [u8; 203] = [
    0x05, 0x01,                   // Usage Page (Generic Desktop)
    0x15, 0x00,                   // Logical Minimum (0)
    0x09, 0x04,                   // Usage (Joystick)
    0xA1, 0x01,                   // Collection (Application)

    0x85, 0x30,                   //   Report ID (48)
    0x05, 0x01,                   //   Usage Page (Generic Desktop)
    0x05, 0x09,                   //   Usage Page (Button)
    0x19, 0x01,                   //   Usage Minimum (1)
    0x29, 0x0A,                   //   Usage Maximum (10)
    0x15, 0x00,                   //   Logical Minimum (0)
    0x25, 0x01,                   //   Logical Maximum (1)
    0x75, 0x01,                   //   Report Size (1)
    0x95, 0x0A,                   //   Report Count (10)
    0x55, 0x00,                   //   Unit Exponent (0)
    0x65, 0x00,                   //   Unit (None)
    0x81, 0x02,                   //   Input (Data, Variable, Absolute)
    0x05, 0x09,                   //   Usage Page (Button)
    0x19, 0x0B,                   //   Usage Minimum (11)
    0x29, 0x0E,                   //   Usage Maximum (14)
    0x15, 0x00,                   //   Logical Minimum (0)
    0x25, 0x01,                   //   Logical Maximum (1)
    0x75, 0x01,                   //   Report Size (1)
    0x95, 0x04,                   //   Report Count (4)
    0x81, 0x02,                   //   Input (Data, Variable, Absolute)
    0x75, 0x01,                   //   Report Size (1)
    0x95, 0x02,                   //   Report Count (2)
    0x81, 0x03,                   //   Input (Constant)

    0x0B, 0x01, 0x00, 0x01, 0x00, //   Usage (Generic Desktop: Pointer)
    0xA1, 0x00,                   //   Collection (Physical)
    0x0B, 0x30, 0x00, 0x01, 0x00, //     Usage (X)
    0x0B, 0x31, 0x00, 0x01, 0x00, //     Usage (Y)
    0x0B, 0x32, 0x00, 0x01, 0x00, //     Usage (Z)
    0x0B, 0x35, 0x00, 0x01, 0x00, //     Usage (Rz)
    0x15, 0x00,                   //     Logical Minimum (0)
    0x27, 0xFF, 0xFF, 0x00, 0x00, //     Logical Maximum (65535)
    0x75, 0x10,                   //     Report Size (16)
    0x95, 0x04,                   //     Report Count (4)
    0x81, 0x02,                   //     Input (Data, Variable, Absolute)
    0xC0,                         //   End Collection

    0x0B, 0x39, 0x00, 0x01, 0x00, //   Usage (Hat Switch)
    0x15, 0x00,                   //   Logical Minimum (0)
    0x25, 0x07,                   //   Logical Maximum (7)
    0x35, 0x00,                   //   Physical Minimum (0)
    0x46, 0x3B, 0x01,             //   Physical Maximum (315)
    0x65, 0x14,                   //   Unit (Degrees)
    0x75, 0x04,                   //   Report Size (4)
    0x95, 0x01,                   //   Report Count (1)
    0x81, 0x02,                   //   Input (Data, Variable, Absolute)
    0x05, 0x09,                   //   Usage Page (Button)
    0x19, 0x0F,                   //   Usage Minimum (15)
    0x29, 0x12,                   //   Usage Maximum (18)
    0x15, 0x00,                   //   Logical Minimum (0)
    0x25, 0x01,                   //   Logical Maximum (1)
    0x75, 0x01,                   //   Report Size (1)
    0x95, 0x04,                   //   Report Count (4)
    0x81, 0x02,                   //   Input (Data, Variable, Absolute)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x34,                   //   Report Count (52)
    0x81, 0x03,                   //   Input (Constant)

    0x06, 0x00, 0xFF,             //   Usage Page (Vendor Defined)

    0x85, 0x21,                   //   Report ID (33)
    0x09, 0x01,                   //   Usage (1)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x3F,                   //   Report Count (63)
    0x81, 0x03,                   //   Input (Constant)

    0x85, 0x81,                   //   Report ID (129)
    0x09, 0x02,                   //   Usage (2)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x3F,                   //   Report Count (63)
    0x81, 0x03,                   //   Input (Constant)

    0x85, 0x01,                   //   Report ID (1)
    0x09, 0x03,                   //   Usage (3)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x3F,                   //   Report Count (63)
    0x91, 0x83,                   //   Output (Constant, Variable, Volatile)

    0x85, 0x10,                   //   Report ID (16)
    0x09, 0x04,                   //   Usage (4)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x3F,                   //   Report Count (63)
    0x91, 0x83,                   //   Output (Constant, Variable, Volatile)

    0x85, 0x80,                   //   Report ID (128)
    0x09, 0x05,                   //   Usage (5)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x3F,                   //   Report Count (63)
    0x91, 0x83,                   //   Output (Constant, Variable, Volatile)

    0x85, 0x82,                   //   Report ID (130)
    0x09, 0x06,                   //   Usage (6)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x3F,                   //   Report Count (63)
    0x91, 0x83,                   //   Output (Constant, Variable, Volatile)

    0xC0,                         // End Collection
];
