//! Teensy 4 firmware for the UART-driven Pro Controller bridge
//!
//! The USB port enumerates as a Nintendo Switch Pro Controller; a host PC
//! drives the reported state over LPUART2.
//!
//! | Teensy 4 Pin | Teensy 4 Function |  Connection  |
//! | ------------ | ----------------- | ------------ |
//! |      14      |    LPUART2 TX     | Host UART RX |
//! |      15      |    LPUART2 RX     | Host UART TX |
//!
//! Two execution contexts share the [`Bridge`]: the LPUART2 receive
//! interrupt assembles host frames, and the main loop services the USB
//! endpoints. Main-loop access runs inside a critical section so a frame
//! can land between polls but never during the report snapshot.
//!
//! The board LED stands in for the reference design's four status LEDs: it
//! is lit while live input is flowing and dark in every fallback state.

#![no_std]
#![no_main]

// A panic (endpoint allocation is the only plausible source) parks the
// core, leaving the device inert until reset.
extern crate panic_halt;

use core::cell::RefCell;

use cortex_m::interrupt::{free, Mutex};
use teensy4_bsp as bsp;

use bsp::board;
use bsp::hal::lpuart;
use bsp::hal::usbd::{BusAdapter, EndpointMemory, EndpointState, Speed};
use bsp::interrupt;

use usb_device::bus::UsbBusAllocator;
use usb_device::device::{UsbDeviceBuilder, UsbDeviceState, UsbVidPid};
use usb_device::UsbError;
use usbd_hid::hid_class::HIDClass;

use bridge_core::{Bridge, LedPattern};
use procon_protocol::descriptors;
use serial_link::ByteTx;

const UART_BAUD: u32 = 1_000_000;

type Uart = board::Lpuart2;

/// State shared with the LPUART2 interrupt handler.
struct Shared {
    bridge: Bridge,
    uart: Uart,
}

static SHARED: Mutex<RefCell<Option<Shared>>> = Mutex::new(RefCell::new(None));

static EP_MEMORY: EndpointMemory<2048> = EndpointMemory::new();
static EP_STATE: EndpointState = EndpointState::max_endpoints();

/// Blocking transmit over the host UART.
///
/// Replies go out from interrupt context; waiting on transmit-buffer space
/// is bounded by one byte time at 1 Mbaud.
struct BlockingTx<'a>(&'a mut Uart);

impl<'a> ByteTx for BlockingTx<'a> {
    fn send_byte(&mut self, byte: u8) {
        use embedded_hal::serial::Write;
        nb::block!(self.0.write(byte)).ok();
    }
}

#[bsp::rt::entry]
fn main() -> ! {
    let board::Resources {
        mut gpio2,
        pins,
        lpuart2,
        usb,
        ..
    } = board::t40(board::instances());

    let led = board::led(&mut gpio2, pins.p13);

    let mut uart: Uart = board::lpuart(lpuart2, pins.p14, pins.p15, UART_BAUD);
    uart.disable(|uart| {
        uart.disable_fifo(lpuart::Direction::Rx);
        uart.set_interrupts(lpuart::Interrupts::RECEIVE_FULL);
    });

    free(|cs| {
        SHARED.borrow(cs).replace(Some(Shared {
            bridge: Bridge::new(),
            uart,
        }));
    });

    // The Pro Controller is a full-speed device; 8 ms interrupt polling
    // only exists at full speed.
    let bus = BusAdapter::with_speed(usb, &EP_MEMORY, &EP_STATE, Speed::LowFull);
    bus.set_interrupts(false);
    let bus = UsbBusAllocator::new(bus);

    let mut hid = HIDClass::new(
        &bus,
        &descriptors::REPORT_DESCRIPTOR,
        descriptors::POLL_INTERVAL_MS,
    );
    let mut device = UsbDeviceBuilder::new(
        &bus,
        UsbVidPid(descriptors::VENDOR_ID, descriptors::PRODUCT_ID),
    )
    .manufacturer(descriptors::MANUFACTURER)
    .product(descriptors::PRODUCT)
    .serial_number(descriptors::SERIAL_NUMBER)
    .device_release(descriptors::DEVICE_RELEASE)
    .max_packet_size_0(descriptors::EP_SIZE as u8)
    .max_power(descriptors::MAX_POWER_MA as usize)
    .supports_remote_wakeup(true)
    .build();

    // Safety: the handler only runs once SHARED is populated, which
    // happened above.
    unsafe { cortex_m::peripheral::NVIC::unmask(interrupt::LPUART2) };

    loop {
        device.poll(&mut [&mut hid]);
        if device.state() != UsbDeviceState::Configured {
            led.clear();
            continue;
        }

        // OUT before IN, once per pass, mirroring the Switch's own
        // ordering of requests and polls.
        let mut out = [0u8; descriptors::EP_SIZE];
        if let Ok(len) = hid.pull_raw_output(&mut out) {
            free(|cs| {
                if let Some(shared) = SHARED.borrow(cs).borrow_mut().as_mut() {
                    shared.bridge.on_out_report(&out[..len]);
                }
            });
        }

        // Policy and snapshot run under the mask; the transmit below does
        // not.
        let mut packet = [0u8; descriptors::EP_SIZE];
        let leds = free(|cs| {
            match SHARED.borrow(cs).borrow_mut().as_mut() {
                Some(shared) => shared.bridge.compose_in_packet(&mut packet),
                None => LedPattern::Off,
            }
        });
        if leds == LedPattern::AllOn {
            led.set();
        } else {
            led.clear();
        }

        // Hold this emission until the host takes it; one composed packet
        // per accepted IN transfer.
        loop {
            match hid.push_raw_input(&packet) {
                Ok(_) => break,
                Err(UsbError::WouldBlock) => {
                    device.poll(&mut [&mut hid]);
                }
                // Reset or address change mid-emission; recheck the device
                // state from the top.
                Err(_) => break,
            }
        }
    }
}

#[bsp::rt::interrupt]
fn LPUART2() {
    free(|cs| {
        if let Some(shared) = SHARED.borrow(cs).borrow_mut().as_mut() {
            let Shared { bridge, uart } = shared;
            loop {
                let data = uart.read_data();
                if data.flags().contains(lpuart::ReadFlags::RXEMPT) {
                    break;
                }
                bridge.on_serial_byte(u8::from(data), &mut BlockingTx(&mut *uart));
            }
        }
    });
}
