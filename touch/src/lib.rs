#![cfg_attr(not(test), no_std)]

pub mod calibrate;
pub mod classify;
pub mod counter;
pub mod debounce;
pub mod panel;
pub mod present;
pub mod sampler;
pub mod scheduler;

#[cfg(feature = "stm32f0x1")]
pub mod gpio_adc;

pub use classify::Classifier;
pub use counter::{Button, Counter};
pub use debounce::{Debouncer, TouchEvent};
pub use panel::{Frame, Mode, Panel};
pub use present::{DisplaySink, Presenter};
pub use sampler::{ChannelConfig, PinRole, Polarity, TouchBus};
pub use scheduler::{Clock, Ticker};

/// Number of readings taken by the calibrator; the baseline is their median.
pub const MEDIAN_SAMPLES: usize = 5;
/// Normal polarity: pressed once a reading exceeds this multiple of the baseline
pub const TOLERANCE_FACTOR: u32 = 5;
/// Inverted polarity: the full scale value with its low bits cleared is the threshold
pub const INVERTED_MASK: u16 = !0x7;
/// Press tick counters saturate here
pub const MAX_PRESS_TICKS: u8 = u8::MAX;

/// Configuration structure for all touch inputs
#[derive(Clone, Copy, Debug)]
pub struct TouchConfig {
    /// Scheduler period, in milliseconds
    pub tick_ms: u16,
    /// Sustained press required before a tap is reported
    pub press_ms: u16,
    /// Sustained press before hold-repeat begins
    pub hold_ms: u16,
    /// Interval between hold-repeat events
    pub repeat_ms: u16,
    /// Number of charge/read cycles averaged into one reading
    pub samples_per_reading: u16,
    pub counter_min: u16,
    pub counter_max: u16,
    /// Largest value the ADC can return
    pub full_scale: u16,
}

impl TouchConfig {
    pub const fn default() -> Self {
        Self {
            tick_ms: 25,
            press_ms: 50,
            hold_ms: 500,
            repeat_ms: 100,
            samples_per_reading: 100,
            counter_min: 0,
            counter_max: 9999,
            full_scale: 4095,
        }
    }

    pub const fn press_ticks(&self) -> u8 {
        ticks_for(self.press_ms, self.tick_ms)
    }

    pub const fn hold_ticks(&self) -> u8 {
        ticks_for(self.hold_ms, self.tick_ms)
    }

    pub const fn repeat_ticks(&self) -> u8 {
        ticks_for(self.repeat_ms, self.tick_ms)
    }

    /// Threshold used by inverted-polarity channels
    pub const fn inverted_threshold(&self) -> u16 {
        self.full_scale & INVERTED_MASK
    }
}

/// Convert a duration to a whole number of ticks, rounding up.
///
/// The result is at least one tick and saturates at `MAX_PRESS_TICKS`.
pub const fn ticks_for(ms: u16, tick_ms: u16) -> u8 {
    if tick_ms == 0 {
        return 1;
    }
    let ticks = (ms as u32 + tick_ms as u32 - 1) / tick_ms as u32;
    if ticks == 0 {
        1
    } else if ticks > MAX_PRESS_TICKS as u32 {
        MAX_PRESS_TICKS
    } else {
        ticks as u8
    }
}

pub const DEFAULT_TOUCH_CONFIG: TouchConfig = TouchConfig::default();

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_default_ticks() {
        let config = DEFAULT_TOUCH_CONFIG;
        assert_eq!(config.press_ticks(), 2);
        assert_eq!(config.hold_ticks(), 20);
        assert_eq!(config.repeat_ticks(), 4);
        assert_eq!(config.inverted_threshold(), 4088);
    }

    #[test]
    fn test_ticks_round_up() {
        assert_eq!(ticks_for(60, 25), 3);
        assert_eq!(ticks_for(0, 25), 1);
        assert_eq!(ticks_for(10, 25), 1);
        assert_eq!(ticks_for(u16::MAX, 1), MAX_PRESS_TICKS);
        assert_eq!(ticks_for(100, 0), 1);
    }
}
