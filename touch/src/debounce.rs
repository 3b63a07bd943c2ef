//! Tap and hold-repeat detection for a single channel.
//!
//! The debouncer counts consecutive pressed ticks. A press must last
//! `press` ticks before anything happens; the tick after that reports a tap.
//! Past `hold` ticks a hold event is reported every `repeat` ticks for as
//! long as the press lasts. Any released tick starts over.

use crate::{TouchConfig, MAX_PRESS_TICKS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEvent {
    Tap,
    Hold,
}

#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    ticks: u8,
    press: u8,
    hold: u8,
    repeat: u8,
}

impl Debouncer {
    pub const fn new(config: &TouchConfig) -> Self {
        Self::with_ticks(config.press_ticks(), config.hold_ticks(), config.repeat_ticks())
    }

    /// `repeat` must be at least 1, and `press` below `hold` for taps to be seen.
    pub const fn with_ticks(press: u8, hold: u8, repeat: u8) -> Self {
        Self {
            ticks: 0,
            press,
            hold,
            repeat: if repeat == 0 { 1 } else { repeat },
        }
    }

    pub fn ticks(&self) -> u8 {
        self.ticks
    }

    #[cfg(test)]
    pub fn reset(&mut self) {
        self.ticks = 0;
    }

    /// Advance one tick with the current classification
    pub fn push(&mut self, pressed: bool) -> Option<TouchEvent> {
        if !pressed {
            self.ticks = 0;
            return None;
        }

        if self.ticks < MAX_PRESS_TICKS {
            self.ticks += 1;
        }

        if self.ticks > self.hold {
            let over = self.ticks - self.hold;
            // First tick past hold, then every `repeat` ticks
            let event = if (over - 1) % self.repeat == 0 {
                Some(TouchEvent::Hold)
            } else {
                None
            };
            // Fold the counter back so it stays clear of saturation
            if self.ticks as u16 >= self.hold as u16 + self.repeat as u16 {
                self.ticks -= self.repeat;
            }
            event
        } else if self.ticks == self.press.saturating_add(1) {
            Some(TouchEvent::Tap)
        } else {
            None
        }
    }
}
