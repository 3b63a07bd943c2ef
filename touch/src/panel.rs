//! The control loop state: every channel's classifier and debouncer plus
//! whatever the panel displays.

use crate::classify::Classifier;
use crate::counter::{Button, Counter};
use crate::debounce::{Debouncer, TouchEvent};
use crate::sampler::{sample, ChannelConfig, TouchBus};
use crate::TouchConfig;

/// What the panel shows
#[derive(Clone, Copy, Debug)]
pub enum Mode<const N: usize> {
    /// Show the raw reading of a single channel. Only valid for `Panel<1>`.
    Raw,
    /// Buttons step a bounded counter; `buttons[i]` is the role of channel `i`
    Counter { counter: Counter, buttons: [Button; N] },
}

/// Result of one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Counter value, or raw reading in `Mode::Raw`
    pub value: u16,
    /// Bit `i` set when channel `i` was classified pressed
    pub pressed: u32,
    /// Number of tap/hold events applied to the counter
    pub events: u8,
}

impl Frame {
    pub fn is_pressed(&self, channel: usize) -> bool {
        self.pressed & (1 << channel) != 0
    }
}

pub struct Panel<const N: usize> {
    channels: [ChannelConfig; N],
    classifiers: [Classifier; N],
    debouncers: [Debouncer; N],
    mode: Mode<N>,
    samples_per_reading: u16,
}

impl<const N: usize> Panel<N> {
    /// Calibrate every channel, in order, and build the panel.
    ///
    /// Must run with all electrodes untouched. `yield_now` is called between
    /// readings.
    pub fn calibrate<B, Y>(
        config: &TouchConfig,
        channels: [ChannelConfig; N],
        mode: Mode<N>,
        bus: &mut B,
        mut yield_now: Y,
    ) -> Self
    where
        B: TouchBus,
        Y: FnMut(),
    {
        let mut classifiers = [Classifier::ceiling(config); N];
        for (classifier, channel) in classifiers.iter_mut().zip(channels.iter()) {
            *classifier = Classifier::for_channel(bus, channel, config, &mut yield_now);
        }
        Self::with_classifiers(config, channels, classifiers, mode)
    }

    /// Build a panel from classifiers that are already set up
    pub fn with_classifiers(
        config: &TouchConfig,
        channels: [ChannelConfig; N],
        classifiers: [Classifier; N],
        mode: Mode<N>,
    ) -> Self {
        assert!(N >= 1 && N <= 32);
        if let Mode::Raw = mode {
            assert!(N == 1, "raw mode drives exactly one channel");
        }
        Self {
            channels,
            classifiers,
            debouncers: [Debouncer::new(config); N],
            mode,
            samples_per_reading: config.samples_per_reading,
        }
    }

    pub fn classifier(&self, channel: usize) -> &Classifier {
        &self.classifiers[channel]
    }

    pub fn debouncer(&self, channel: usize) -> &Debouncer {
        &self.debouncers[channel]
    }

    /// Current value for the display
    pub fn counter_value(&self) -> Option<u16> {
        match &self.mode {
            Mode::Raw => None,
            Mode::Counter { counter, .. } => Some(counter.value()),
        }
    }

    /// Run one scheduler tick across all channels, in index order.
    pub fn tick<B, Y>(&mut self, bus: &mut B, mut yield_now: Y) -> Frame
    where
        B: TouchBus,
        Y: FnMut(),
    {
        match &mut self.mode {
            Mode::Raw => {
                let reading = sample(bus, &self.channels[0], self.samples_per_reading);
                let pressed = self.classifiers[0].is_pressed(reading);
                Frame {
                    value: reading,
                    pressed: pressed as u32,
                    events: 0,
                }
            }
            Mode::Counter { counter, buttons } => {
                let mut pressed = 0u32;
                let mut events = 0u8;

                for i in 0..N {
                    let reading = sample(bus, &self.channels[i], self.samples_per_reading);
                    let is_pressed = self.classifiers[i].is_pressed(reading);
                    if is_pressed {
                        pressed |= 1 << i;
                    }

                    if let Some(event) = self.debouncers[i].push(is_pressed) {
                        counter.apply(buttons[i], event == TouchEvent::Hold);
                        events = events.saturating_add(1);
                    }
                    yield_now();
                }

                Frame {
                    value: counter.value(),
                    pressed,
                    events,
                }
            }
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::present::test::{RecordingSink, SinkCall};
    use crate::present::Presenter;
    use crate::sampler::{PinRole, Polarity};
    use crate::scheduler::test::FakeClock;
    use crate::scheduler::Ticker;
    use crate::DEFAULT_TOUCH_CONFIG;

    /// Each sense pin returns a settable level
    struct LevelBus {
        levels: [u16; 8],
        reads: Vec<u8>,
    }

    impl LevelBus {
        fn new(level: u16) -> Self {
            Self { levels: [level; 8], reads: Vec::new() }
        }
    }

    impl TouchBus for LevelBus {
        fn set_role(&mut self, _pin: u8, _role: PinRole) {}

        fn read(&mut self, pin: u8) -> u16 {
            self.reads.push(pin);
            self.levels[pin as usize]
        }
    }

    const IDLE: u16 = 100;
    const TOUCHED: u16 = 600;

    fn config() -> TouchConfig {
        let mut config = DEFAULT_TOUCH_CONFIG;
        config.samples_per_reading = 2;
        config
    }

    fn channels() -> [ChannelConfig; 4] {
        [1, 2, 3, 4].map(|pin| ChannelConfig::new(pin, 0, Polarity::Normal))
    }

    fn counter_panel(bus: &mut LevelBus) -> Panel<4> {
        let config = config();
        let mode = Mode::Counter {
            counter: Counter::new(&config),
            buttons: Button::ALL,
        };
        Panel::calibrate(&config, channels(), mode, bus, || {})
    }

    #[test]
    fn test_calibrates_in_order() {
        let mut bus = LevelBus::new(IDLE);
        let mut yields = 0;
        let config = config();
        let mode = Mode::Counter { counter: Counter::new(&config), buttons: Button::ALL };
        let panel = Panel::calibrate(&config, channels(), mode, &mut bus, || yields += 1);

        assert_eq!(yields, 20);
        for i in 0..4 {
            assert_eq!(*panel.classifier(i), Classifier::Multiplier { baseline: IDLE });
        }
        let sense: Vec<u8> = bus.reads.iter().copied().filter(|p| *p != 0).collect();
        assert!(sense.windows(2).all(|w| w[0] <= w[1]), "channels calibrated out of order");
    }

    #[test]
    fn test_tap_and_hold() {
        let mut bus = LevelBus::new(IDLE);
        let mut panel = counter_panel(&mut bus);

        bus.levels[3] = TOUCHED; // INC5
        let values: Vec<u16> = (0..25).map(|_| panel.tick(&mut bus, || {}).value).collect();
        assert_eq!(values[1], 0);
        assert_eq!(values[2], 5);
        assert_eq!(values[19], 5);
        assert_eq!(values[20], 55);
        assert_eq!(values[24], 105);

        bus.levels[3] = IDLE;
        let frame = panel.tick(&mut bus, || {});
        assert_eq!(frame, Frame { value: 105, pressed: 0, events: 0 });
        assert_eq!(panel.debouncer(2).ticks(), 0);
    }

    #[test]
    fn test_channels_independent() {
        let mut bus = LevelBus::new(IDLE);
        let mut panel = counter_panel(&mut bus);

        bus.levels[1] = TOUCHED; // INC
        bus.levels[4] = TOUCHED; // DEC5
        let mut frame = panel.tick(&mut bus, || {});
        assert!(frame.is_pressed(0) && frame.is_pressed(3));
        assert!(!frame.is_pressed(1));
        for _ in 0..2 {
            frame = panel.tick(&mut bus, || {});
        }
        // +1 then -5, clamped at zero
        assert_eq!(frame.events, 2);
        assert_eq!(frame.value, 0);
    }

    #[test]
    fn test_bounce_is_ignored() {
        let mut bus = LevelBus::new(IDLE);
        let mut panel = counter_panel(&mut bus);

        for _ in 0..10 {
            bus.levels[1] = TOUCHED;
            panel.tick(&mut bus, || {});
            panel.tick(&mut bus, || {});
            bus.levels[1] = IDLE;
            panel.tick(&mut bus, || {});
        }
        assert_eq!(panel.counter_value(), Some(0));
    }

    #[test]
    fn test_raw_mode() {
        let config = config();
        let mut bus = LevelBus::new(IDLE);
        let ch = [ChannelConfig::new(1, 0, Polarity::Normal)];
        let mut panel: Panel<1> = Panel::calibrate(&config, ch, Mode::Raw, &mut bus, || {});

        assert_eq!(panel.tick(&mut bus, || {}), Frame { value: IDLE, pressed: 0, events: 0 });
        bus.levels[1] = 501;
        assert_eq!(panel.tick(&mut bus, || {}), Frame { value: 501, pressed: 1, events: 0 });
        assert_eq!(panel.counter_value(), None);
    }

    #[test]
    #[should_panic(expected = "raw mode drives exactly one channel")]
    fn test_raw_mode_single_channel() {
        let config = config();
        let classifiers = [Classifier::multiplier(IDLE); 4];
        let _panel = Panel::with_classifiers(&config, channels(), classifiers, Mode::Raw);
    }

    #[test]
    fn test_inverted_counter() {
        let config = config();
        let mut bus = LevelBus::new(4095);
        let channels = [1, 2, 3, 4].map(|pin| ChannelConfig::new(pin, 0, Polarity::Inverted));
        let mode = Mode::Counter { counter: Counter::new(&config), buttons: Button::ALL };
        let mut panel = Panel::calibrate(&config, channels, mode, &mut bus, || {});
        assert!(bus.reads.is_empty());

        bus.levels[1] = 3000;
        for _ in 0..3 {
            panel.tick(&mut bus, || {});
        }
        assert_eq!(panel.counter_value(), Some(1));
    }

    #[test]
    fn test_scheduled_loop() {
        let clock = FakeClock::default();
        let mut ticker = Ticker::new(config().tick_ms as u32);
        let mut bus = LevelBus::new(IDLE);
        let mut panel = counter_panel(&mut bus);
        let mut sink = RecordingSink::default();
        let mut diag = String::new();
        let presenter = Presenter::new();

        bus.levels[1] = TOUCHED;
        // 100 ms of wall time polled every 5 ms: ticks at 0, 25, 50, 75, 100
        for _ in 0..=20 {
            if ticker.poll(&clock) {
                let frame = panel.tick(&mut bus, || {});
                presenter.present(&mut sink, &mut diag, frame.value);
            }
            clock.advance(5);
        }

        assert_eq!(ticker.ticks(), 5);
        assert_eq!(
            sink.calls,
            [
                SinkCall::Show(0),
                SinkCall::Show(0),
                SinkCall::Show(1),
                SinkCall::Show(1),
                SinkCall::Show(1),
            ]
        );
        assert!(diag.ends_with("1   \r"));
    }
}
