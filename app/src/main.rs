#![no_main]
#![no_std]

use core::fmt::Write;
use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m;
use cortex_m_rt::{entry, exception};
use panic_halt as _;

use stm32f0xx_hal as hal;

use touch::gpio_adc::{adc_clock_hz, GpioAdcBus, ADC_MAX_CLOCK_HZ};
use touch::{
    Button, ChannelConfig, Clock, Counter, DisplaySink, Mode, Panel, Polarity, Presenter, Ticker,
    TouchConfig,
};

use crate::hal::gpio::{gpioa, Output, PushPull};
use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::prelude::*;
use crate::hal::watchdog::Watchdog;

mod display;
mod serial;

use display::Tm1637;

#[derive(Clone, Copy, Debug)]
enum PanelMode {
    /// One button; the display shows its raw reading and the LED its state
    Raw,
    /// Four buttons stepping a counter
    Counter,
}

static PANEL_MODE: PanelMode = PanelMode::Counter;
static POLARITY: Polarity = Polarity::Normal;

static TOUCH_CONFIG: TouchConfig = TouchConfig {
    tick_ms: 25,
    press_ms: 50,
    hold_ms: 500,
    repeat_ms: 100,
    samples_per_reading: 100,
    counter_min: 0,
    counter_max: 9999,
    full_scale: 4095,
};

/// Shared by all channels, PA0
const REFERENCE_PIN: u8 = 0;
/// INC, DEC, INC5, DEC5 on PA1-PA4
const COUNTER_PINS: [u8; 4] = [1, 2, 3, 4];
const RAW_PIN: u8 = 1;

const DISPLAY_BRIGHTNESS: u8 = 4;
const LED_ACTIVE_LOW: bool = true;

/// PCLK is left undivided, so it runs at this rate too
const SYSCLK_HZ: u32 = 48_000_000;
const _: () = assert!(adc_clock_hz(SYSCLK_HZ) <= ADC_MAX_CLOCK_HZ);

static TIME: AtomicU32 = AtomicU32::new(0);

/// Milliseconds since boot, counted by SysTick
struct SysTickClock;

impl Clock for SysTickClock {
    fn now_ms(&self) -> u32 {
        TIME.load(Ordering::Relaxed)
    }
}

/// Everything the control loop drives besides the touch bus
struct Board {
    display: Tm1637,
    led: gpioa::PA8<Output<PushPull>>,
    watchdog: Watchdog,
}

impl Board {
    fn set_led(&mut self, on: bool) {
        if on != LED_ACTIVE_LOW {
            self.led.set_high().ok();
        } else {
            self.led.set_low().ok();
        }
    }
}

fn run<const N: usize>(mut panel: Panel<N>, mut bus: GpioAdcBus, mut board: Board, raw: bool) -> ! {
    let clock = SysTickClock;
    let mut ticker = Ticker::new(TOUCH_CONFIG.tick_ms as u32);
    let presenter = Presenter::new();
    let mut diag = serial::uart1::writer();

    loop {
        if ticker.poll(&clock) {
            let watchdog = &mut board.watchdog;
            let frame = panel.tick(&mut bus, || watchdog.feed());

            presenter.present(&mut board.display, &mut diag, frame.value);
            if raw {
                board.set_led(frame.is_pressed(0));
            }
        }

        board.watchdog.feed();
    }
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(SYSCLK_HZ.hz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);

    let mut watchdog = Watchdog::new(dp.IWDG);
    watchdog.start(1.hz());

    let (clk, dio, led, tx_pin, rx_pin) = cortex_m::interrupt::free(|cs| {
        (
            gpioa.pa6.into_open_drain_output(cs),
            gpioa.pa7.into_open_drain_output(cs),
            gpioa.pa8.into_push_pull_output(cs),
            gpiob.pb6.into_alternate_af0(cs),
            gpiob.pb7.into_alternate_af0(cs),
        )
    });

    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);

    let mut syst = hal::timers::Timer::syst(cp.SYST, 1000.hz(), &mut rcc);
    syst.listen(&hal::timers::Event::TimeOut);

    let mut display = Tm1637::new(clk, dio, DISPLAY_BRIGHTNESS);
    display.clear();

    let mut board = Board { display, led, watchdog };
    board.set_led(false);

    // The touch pins PA0-PA4 are driven through the bus registers, not the HAL
    let mut bus = GpioAdcBus::new(None);
    let mut diag = serial::uart1::writer();
    write!(diag, "calibrating {:?} {:?}\r\n", PANEL_MODE, POLARITY).ok();

    let watchdog = &mut board.watchdog;
    match PANEL_MODE {
        PanelMode::Raw => {
            let channels = [ChannelConfig::new(RAW_PIN, REFERENCE_PIN, POLARITY)];
            let panel = Panel::calibrate(&TOUCH_CONFIG, channels, Mode::Raw, &mut bus, || watchdog.feed());
            report_thresholds(&panel, &mut diag);
            run(panel, bus, board, true)
        }
        PanelMode::Counter => {
            let channels = COUNTER_PINS.map(|pin| ChannelConfig::new(pin, REFERENCE_PIN, POLARITY));
            let mode = Mode::Counter {
                counter: Counter::new(&TOUCH_CONFIG),
                buttons: Button::ALL,
            };
            let panel = Panel::calibrate(&TOUCH_CONFIG, channels, mode, &mut bus, || watchdog.feed());
            report_thresholds(&panel, &mut diag);
            run(panel, bus, board, false)
        }
    }
}

fn report_thresholds<const N: usize, W: Write>(panel: &Panel<N>, diag: &mut W) {
    for i in 0..N {
        write!(diag, "ch{} threshold {}\r\n", i, panel.classifier(i).threshold()).ok();
    }
}

#[exception]
fn SysTick() {
    let time = TIME.load(Ordering::Relaxed);
    TIME.store(time.wrapping_add(1), Ordering::Relaxed);
}
