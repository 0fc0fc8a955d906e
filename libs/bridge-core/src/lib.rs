//! Pro Controller emulation engine
//!
//! [`Bridge`] owns everything the two execution contexts share: the live
//! and idle controller reports, the report selection, the one-slot reply
//! buffer, the report counter, and the silence timer. The contract between
//! contexts:
//!
//! - [`Bridge::on_serial_byte`] is the only method called from the UART
//!   receive interrupt.
//! - Everything else runs in the main loop **with the receive interrupt
//!   masked**, so a frame can land between polls but never during the
//!   policy-and-snapshot phase of one.
//!
//! The reply buffer and counter are main-loop-only and need no masking;
//! they are kept here because the reply framing embeds a snapshot of the
//! shared report state.

#![no_std]

mod heartbeat;

pub use heartbeat::{
    LedPattern, MILLIS_HOME_PRESSED, MILLIS_UNTIL_HOME, MILLIS_UNTIL_PAUSE,
};

use heartbeat::{Selection, POLL_INTERVAL_MS};
use procon_protocol::descriptors::EP_SIZE;
use procon_protocol::input::report_from_payload;
use procon_protocol::report::{Button, StandardReport};
use procon_protocol::subcommand::{self, Dispatch, Reply};
use serial_link::{ByteTx, FrameReceiver, SyncState};

/// One-slot buffer for the next IN packet when a request is pending.
struct ReplySlot {
    packet: [u8; EP_SIZE],
    ready: bool,
}

/// The bridge between the serial host and the Switch.
pub struct Bridge {
    receiver: FrameReceiver,
    live: StandardReport,
    idle: StandardReport,
    selection: Selection,
    reply: ReplySlot,
    counter: u8,
    millis: u16,
    leds: LedPattern,
}

impl Bridge {
    pub fn new() -> Self {
        let mut bridge = Bridge {
            receiver: FrameReceiver::new(),
            live: StandardReport::idle(),
            idle: StandardReport::idle(),
            selection: Selection::Idle,
            reply: ReplySlot {
                packet: [0; EP_SIZE],
                ready: false,
            },
            counter: 0,
            millis: 0,
            leds: LedPattern::Off,
        };
        // The Switch's first status request can beat the first OUT
        // dispatch; keep the answer staged from power-on.
        bridge.queue_reply(&subcommand::identify_reply());
        bridge
    }

    /// Feed one byte received from the host UART. Interrupt context.
    ///
    /// Handshake and acknowledgement traffic goes out through `tx`. A
    /// validated frame replaces the live report, selects it, and restarts
    /// the silence timer; anything else leaves the forwarded state alone.
    pub fn on_serial_byte<T: ByteTx>(&mut self, byte: u8, tx: &mut T) {
        if let Some(payload) = self.receiver.on_byte(byte, tx) {
            self.live = report_from_payload(&payload);
            self.selection = Selection::Live;
            self.millis = 0;
        }
    }

    /// Handle one OUT report from the Switch. Main-loop context.
    ///
    /// Replies are single-slot: requests arriving while one is pending are
    /// dropped, which the Switch tolerates by repeating the request. Data
    /// past the endpoint size is ignored.
    pub fn on_out_report(&mut self, data: &[u8]) {
        if self.reply.ready {
            return;
        }
        let len = data.len().min(EP_SIZE);
        match subcommand::dispatch(&data[..len]) {
            Dispatch::Reply(reply) => self.queue_reply(&reply),
            Dispatch::EnableReports => {
                log::debug!("standard input reports enabled");
            }
            Dispatch::None => {}
        }
    }

    /// Compose the next IN packet. Main-loop context, receive interrupt
    /// masked.
    ///
    /// Runs the staleness policy, then serializes either the pending reply
    /// or a standard 0x30 report of the selected state. The returned LED
    /// pattern is the policy's verdict on link health; the caller applies
    /// it and transmits the packet after unmasking.
    pub fn compose_in_packet(&mut self, packet: &mut [u8; EP_SIZE]) -> LedPattern {
        let decision = heartbeat::tick(self.receiver.is_synced(), self.millis);
        self.idle.set_button(Button::Home, decision.press_home);
        self.selection = decision.selection;
        if decision.advance_timer {
            self.millis += POLL_INTERVAL_MS;
        }
        if decision.leds != self.leds {
            log::debug!("link watchdog: {:?} -> {:?}", self.leds, decision.leds);
            self.leds = decision.leds;
        }

        if self.reply.ready {
            *packet = self.reply.packet;
            self.reply.ready = false;
        } else {
            let state = match self.selection {
                Selection::Live => &self.live,
                Selection::Idle => &self.idle,
            };
            subcommand::write_standard_report(packet, &mut self.counter, state);
        }
        decision.leds
    }

    /// Synchronization state of the serial link.
    pub fn sync_state(&self) -> SyncState {
        self.receiver.state()
    }

    /// True while a reply is staged for the next IN poll.
    pub fn reply_pending(&self) -> bool {
        self.reply.ready
    }

    fn queue_reply(&mut self, reply: &Reply) {
        let state = match self.selection {
            Selection::Live => &self.live,
            Selection::Idle => &self.idle,
        };
        reply.write_into(&mut self.reply.packet, &mut self.counter, state);
        self.reply.ready = true;
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Bridge::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Bridge, LedPattern};
    use procon_protocol::descriptors::EP_SIZE;
    use procon_protocol::report::StandardReport;
    use serial_link::{command, crc8_ccitt, response, ByteTx, SyncState};

    struct Recorder {
        sent: [u8; 16],
        len: usize,
    }

    impl Recorder {
        fn new() -> Self {
            Recorder {
                sent: [0; 16],
                len: 0,
            }
        }

        fn sent(&self) -> &[u8] {
            &self.sent[..self.len]
        }

        fn clear(&mut self) {
            self.len = 0;
        }
    }

    impl ByteTx for Recorder {
        fn send_byte(&mut self, byte: u8) {
            self.sent[self.len] = byte;
            self.len += 1;
        }
    }

    /// A bridge with the power-on identification reply already delivered.
    fn drained_bridge() -> Bridge {
        let mut bridge = Bridge::new();
        let mut packet = [0u8; EP_SIZE];
        assert!(bridge.reply_pending());
        bridge.compose_in_packet(&mut packet);
        assert_eq!(packet[0], 0x81);
        bridge
    }

    fn sync(bridge: &mut Bridge, tx: &mut Recorder) {
        for &byte in &[command::SYNC_START, command::SYNC_1, command::SYNC_2] {
            bridge.on_serial_byte(byte, tx);
        }
        assert_eq!(bridge.sync_state(), SyncState::Synced);
        tx.clear();
    }

    fn send_frame(bridge: &mut Bridge, tx: &mut Recorder, payload: &[u8; 8]) {
        for &byte in payload.iter() {
            bridge.on_serial_byte(byte, tx);
        }
        bridge.on_serial_byte(crc8_ccitt(payload), tx);
        assert_eq!(tx.sent().last(), Some(&response::ACK));
        tx.clear();
    }

    /// Button A held, everything else released and centered.
    const BUTTON_A_FRAME: [u8; 8] = [0x00, 0x04, 0x08, 0x80, 0x80, 0x80, 0x80, 0x00];

    #[test]
    fn power_on_packet_identifies_the_controller() {
        let mut bridge = Bridge::new();
        let mut packet = [0u8; EP_SIZE];
        bridge.compose_in_packet(&mut packet);
        assert_eq!(&packet[..4], &[0x81, 0x01, 0x00, 0x03]);
        assert!(!bridge.reply_pending());
    }

    #[test]
    fn unsynced_polls_send_idle_reports() {
        let mut bridge = drained_bridge();
        let mut packet = [0u8; EP_SIZE];
        let leds = bridge.compose_in_packet(&mut packet);
        assert_eq!(leds, LedPattern::Off);
        assert_eq!(packet[0], 0x30);
        assert_eq!(&packet[2..13], StandardReport::idle().as_bytes());
    }

    #[test]
    fn live_frame_reaches_the_next_report() {
        let mut bridge = drained_bridge();
        let mut tx = Recorder::new();
        sync(&mut bridge, &mut tx);
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);

        let mut packet = [0u8; EP_SIZE];
        let leds = bridge.compose_in_packet(&mut packet);
        assert_eq!(leds, LedPattern::AllOn);
        assert_eq!(packet[0], 0x30);
        // Status byte, then button bytes: A in the right-hand cluster,
        // charging grip in the shared cluster.
        assert_eq!(packet[2], 0x91);
        assert_eq!(packet[3], 0x08);
        assert_eq!(packet[4], 0x80);
        assert_eq!(packet[5], 0x00);
        // Centered sticks at the 12-bit midpoint bias.
        assert_eq!(&packet[6..9], &[0x08, 0x88, 0x80]);
        assert_eq!(&packet[9..12], &[0x08, 0x88, 0x80]);
    }

    #[test]
    fn counters_step_by_three() {
        let mut bridge = drained_bridge();
        let mut packet = [0u8; EP_SIZE];
        let mut previous: Option<u8> = None;
        for _ in 0..100 {
            bridge.compose_in_packet(&mut packet);
            let counter = packet[1];
            if let Some(previous) = previous {
                assert_eq!(counter, previous.wrapping_add(3));
            } else {
                assert_eq!(counter, 3);
            }
            previous = Some(counter);
        }
    }

    #[test]
    fn watchdog_escalation_schedule() {
        let mut bridge = drained_bridge();
        let mut tx = Recorder::new();
        sync(&mut bridge, &mut tx);
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);

        let mut packet = [0u8; EP_SIZE];

        // 15 live emissions (0..120 ms of silence).
        for emission in 0..15 {
            bridge.compose_in_packet(&mut packet);
            assert!(packet[3] & 0x08 != 0, "emission {}", emission);
            assert!(packet[4] & 0x10 == 0, "emission {}", emission);
        }
        // 85 idle emissions without HOME (120..800 ms).
        for emission in 0..85 {
            let leds = bridge.compose_in_packet(&mut packet);
            assert_eq!(leds, LedPattern::Led1, "emission {}", emission);
            assert_eq!(packet[3], 0x00, "emission {}", emission);
            assert!(packet[4] & 0x10 == 0, "emission {}", emission);
        }
        // 25 idle emissions with HOME held (800..1000 ms).
        for emission in 0..25 {
            let leds = bridge.compose_in_packet(&mut packet);
            assert_eq!(leds, LedPattern::Led2, "emission {}", emission);
            assert!(packet[4] & 0x10 != 0, "emission {}", emission);
        }
        // Idle without HOME from then on.
        for emission in 0..200 {
            let leds = bridge.compose_in_packet(&mut packet);
            assert_eq!(leds, LedPattern::Led1, "emission {}", emission);
            assert!(packet[4] & 0x10 == 0, "emission {}", emission);
        }
    }

    #[test]
    fn fresh_frame_rearms_the_watchdog() {
        let mut bridge = drained_bridge();
        let mut tx = Recorder::new();
        sync(&mut bridge, &mut tx);
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);

        let mut packet = [0u8; EP_SIZE];
        // Run deep into the silent tail.
        for _ in 0..300 {
            bridge.compose_in_packet(&mut packet);
        }
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);
        let leds = bridge.compose_in_packet(&mut packet);
        assert_eq!(leds, LedPattern::AllOn);
        assert!(packet[3] & 0x08 != 0);
    }

    #[test]
    fn rejected_frame_leaves_live_state_alone() {
        let mut bridge = drained_bridge();
        let mut tx = Recorder::new();
        sync(&mut bridge, &mut tx);
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);

        // Same payload, corrupted checksum.
        let bad_crc = crc8_ccitt(&BUTTON_A_FRAME) ^ 0x01;
        for &byte in BUTTON_A_FRAME.iter() {
            bridge.on_serial_byte(byte, &mut tx);
        }
        tx.clear();
        bridge.on_serial_byte(bad_crc, &mut tx);
        assert_eq!(tx.sent(), &[response::NACK]);

        let mut packet = [0u8; EP_SIZE];
        bridge.compose_in_packet(&mut packet);
        assert!(packet[3] & 0x08 != 0);
        assert_eq!(bridge.sync_state(), SyncState::Synced);
    }

    #[test]
    fn out_request_takes_the_next_in_poll() {
        let mut bridge = drained_bridge();
        let mut out = [0u8; EP_SIZE];
        out[0] = 0x80;
        out[1] = 0x02;
        bridge.on_out_report(&out);
        assert!(bridge.reply_pending());

        let mut packet = [0u8; EP_SIZE];
        bridge.compose_in_packet(&mut packet);
        assert_eq!(&packet[..2], &[0x81, 0x02]);
        // The slot is free again; polls fall back to standard reports.
        assert!(!bridge.reply_pending());
        bridge.compose_in_packet(&mut packet);
        assert_eq!(packet[0], 0x30);
    }

    #[test]
    fn device_info_snapshot_uses_selected_state() {
        let mut bridge = drained_bridge();
        let mut tx = Recorder::new();
        sync(&mut bridge, &mut tx);
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);

        let mut out = [0u8; EP_SIZE];
        out[0] = 0x01;
        out[10] = 0x02;
        bridge.on_out_report(&out);

        let mut packet = [0u8; EP_SIZE];
        bridge.compose_in_packet(&mut packet);
        assert_eq!(packet[0], 0x21);
        // The snapshot carries the live A press.
        assert_eq!(packet[2], 0x91);
        assert_eq!(packet[3], 0x08);
        assert_eq!(packet[13], 0x82);
        assert_eq!(packet[14], 0x02);
        assert_eq!(&packet[15..19], &[0x03, 0x48, 0x03, 0x02]);
    }

    #[test]
    fn pending_reply_drops_later_requests() {
        let mut bridge = drained_bridge();
        let mut out = [0u8; EP_SIZE];
        out[0] = 0x80;
        out[1] = 0x02;
        bridge.on_out_report(&out);
        out[1] = 0x03;
        bridge.on_out_report(&out);

        let mut packet = [0u8; EP_SIZE];
        bridge.compose_in_packet(&mut packet);
        // The first request won; the second was dropped, not queued.
        assert_eq!(&packet[..2], &[0x81, 0x02]);
        assert!(!bridge.reply_pending());
    }

    #[test]
    fn oversized_out_data_is_truncated() {
        let mut bridge = drained_bridge();
        let mut out = [0u8; 96];
        out[0] = 0x80;
        out[1] = 0x01;
        bridge.on_out_report(&out);
        let mut packet = [0u8; EP_SIZE];
        bridge.compose_in_packet(&mut packet);
        assert_eq!(&packet[..2], &[0x81, 0x01]);
    }

    #[test]
    fn enable_reports_queues_nothing() {
        let mut bridge = drained_bridge();
        let mut out = [0u8; EP_SIZE];
        out[0] = 0x80;
        out[1] = 0x04;
        bridge.on_out_report(&out);
        assert!(!bridge.reply_pending());
    }

    #[test]
    fn home_press_does_not_stick_to_live_state() {
        let mut bridge = drained_bridge();
        let mut tx = Recorder::new();
        sync(&mut bridge, &mut tx);
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);

        let mut packet = [0u8; EP_SIZE];
        // Ride through the whole escalation, HOME window included.
        for _ in 0..130 {
            bridge.compose_in_packet(&mut packet);
        }
        // A fresh frame brings back live input with HOME released.
        send_frame(&mut bridge, &mut tx, &BUTTON_A_FRAME);
        bridge.compose_in_packet(&mut packet);
        assert!(packet[4] & 0x10 == 0);
    }
}
