//! Link staleness policy
//!
//! The Switch drops a controller that goes quiet, and a game left running
//! with a dead link is worse than a paused one. The policy escalates with
//! the time since the last valid serial frame:
//!
//! ```text
//! 0 ms         120 ms            800 ms       1000 ms
//! |  live input  |  idle (pause)  |  HOME held  |  idle forever
//! ```
//!
//! The HOME window is 200 ms because the Switch ignores shorter presses.
//! The timer advances once per IN emission — the USB poll interval is the
//! only clock this policy needs — and parks at the end of the HOME window
//! so the idle tail cannot overflow it.

/// Serial silence before live input stops being forwarded.
pub const MILLIS_UNTIL_PAUSE: u16 = 120;
/// Serial silence before the automatic HOME press.
pub const MILLIS_UNTIL_HOME: u16 = 800;
/// How long the automatic HOME press is held.
pub const MILLIS_HOME_PRESSED: u16 = 200;

/// Milliseconds between IN emissions; one timer step.
pub(crate) const POLL_INTERVAL_MS: u16 = 8;

/// What the board LEDs should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    /// Link down: handshake not complete.
    Off,
    /// Live input flowing.
    AllOn,
    /// Host silent; forwarding idle input. Also the terminal state.
    Led1,
    /// HOME press window.
    Led2,
}

/// Which report the scheduler forwards this poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    Live,
    Idle,
}

/// One policy decision.
pub(crate) struct Tick {
    pub selection: Selection,
    pub press_home: bool,
    pub leds: LedPattern,
    pub advance_timer: bool,
}

/// Decide what to forward given the link state and the silence timer.
pub(crate) fn tick(synced: bool, millis: u16) -> Tick {
    if !synced {
        return Tick {
            selection: Selection::Idle,
            press_home: false,
            leds: LedPattern::Off,
            advance_timer: false,
        };
    }
    if millis < MILLIS_UNTIL_PAUSE {
        Tick {
            selection: Selection::Live,
            press_home: false,
            leds: LedPattern::AllOn,
            advance_timer: true,
        }
    } else if millis < MILLIS_UNTIL_HOME {
        Tick {
            selection: Selection::Idle,
            press_home: false,
            leds: LedPattern::Led1,
            advance_timer: true,
        }
    } else if millis < MILLIS_UNTIL_HOME + MILLIS_HOME_PRESSED {
        Tick {
            selection: Selection::Idle,
            press_home: true,
            leds: LedPattern::Led2,
            advance_timer: true,
        }
    } else {
        // Timer stops here; the silent tail is unbounded.
        Tick {
            selection: Selection::Idle,
            press_home: false,
            leds: LedPattern::Led1,
            advance_timer: false,
        }
    }
}
