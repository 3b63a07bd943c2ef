//! Charge-transfer bus for the STM32F0 using GPIOA and the ADC.
//!
//! Touch and reference pins are PA0 through PA7, which map one-to-one onto
//! ADC channels 0 through 7, so a pin number doubles as its ADC channel.
//!
//! Like the rest of this crate, the bus accesses the GPIOA, ADC and RCC
//! registers directly rather than taking ownership of HAL peripherals: pins
//! have to change mode thousands of times a second, which doesn't fit the
//! HAL's type-state pins, and the PAC version used by the HAL may differ
//! from ours. Don't touch PA0-PA7 or the ADC elsewhere in the application.

use stm32f0::stm32f0x1 as pac;

use crate::sampler::{PinRole, TouchBus};

/// Number of pins (and ADC channels) the bus can drive
pub const PIN_COUNT: u8 = 8;

const MODER_INPUT: u32 = 0b00;
const MODER_ANALOG: u32 = 0b11;
const PUPDR_PULL_UP: u32 = 0b01;
const PUPDR_PULL_DOWN: u32 = 0b10;

const ADC_CR_ADEN: u32 = 1 << 0;
const ADC_CR_ADSTART: u32 = 1 << 2;
const ADC_CR_ADCAL: u32 = 1 << 31;
const ADC_ISR_ADRDY: u32 = 1 << 0;
const ADC_ISR_EOC: u32 = 1 << 2;
/// Synchronous clock, PCLK / 4
const ADC_CFGR2_CKMODE_PCLK_DIV4: u32 = 0b10 << 30;

/// PCLK is divided by this to clock the ADC
pub const ADC_CLOCK_DIVIDER: u32 = 4;
/// Highest ADC clock the STM32F0 is rated for
pub const ADC_MAX_CLOCK_HZ: u32 = 14_000_000;

/// Register reads between the end of calibration and setting ADEN. ADEN
/// must not be set within 2 ADC clocks of ADCAL clearing; each read takes
/// at least one bus cycle and PCLK runs 4x the ADC clock.
const ADEN_DELAY_READS: u32 = 16;

/// ADC clock produced from a given PCLK
pub const fn adc_clock_hz(pclk_hz: u32) -> u32 {
    pclk_hz / ADC_CLOCK_DIVIDER
}

#[derive(Clone, Copy, Debug)]
pub enum SampleTime {
    Cycles1_5 = 0b000,
    Cycles7_5 = 0b001,
    Cycles13_5 = 0b010,
    Cycles28_5 = 0b011,
    Cycles41_5 = 0b100,
    Cycles55_5 = 0b101,
    Cycles71_5 = 0b110,
    Cycles239_5 = 0b111,
}

/// Default ADC sample time if not provided
const DEFAULT_SAMPLE_TIME: SampleTime = SampleTime::Cycles7_5;

pub struct GpioAdcBus {
    gpioa: &'static pac::gpioa::RegisterBlock,
    adc: &'static pac::adc::RegisterBlock,
}

impl GpioAdcBus {
    pub fn new(sample_time: Option<SampleTime>) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.ahbenr.modify(|_, w| w.iopaen().set_bit());
        rcc.apb2enr.modify(|_, w| w.adcen().set_bit());

        let gpioa = unsafe { &*pac::GPIOA::ptr() };
        let adc = unsafe { &*pac::ADC::ptr() };

        adc.cfgr2.write(|w| unsafe { w.bits(ADC_CFGR2_CKMODE_PCLK_DIV4) });
        adc.smpr.write(|w| unsafe {
            w.bits(sample_time.unwrap_or(DEFAULT_SAMPLE_TIME) as u32)
        });

        // Calibrate with the ADC disabled, then power it up
        adc.cr.modify(|r, w| unsafe { w.bits(r.bits() | ADC_CR_ADCAL) });
        while adc.cr.read().bits() & ADC_CR_ADCAL != 0 {}
        for _ in 0..ADEN_DELAY_READS {
            adc.cr.read();
        }

        adc.cr.modify(|r, w| unsafe { w.bits(r.bits() | ADC_CR_ADEN) });
        while adc.isr.read().bits() & ADC_ISR_ADRDY == 0 {}

        Self { gpioa, adc }
    }

    fn set_mode(&mut self, pin: u8, mode: u32) {
        let shift = pin as u32 * 2;
        self.gpioa.moder.modify(|r, w| unsafe {
            w.bits((r.bits() & !(0b11 << shift)) | (mode << shift))
        });
    }

    fn set_pull(&mut self, pin: u8, pull: u32) {
        let shift = pin as u32 * 2;
        self.gpioa.pupdr.modify(|r, w| unsafe {
            w.bits((r.bits() & !(0b11 << shift)) | (pull << shift))
        });
    }

    /// Run a single conversion on `channel` and block until it completes
    fn convert(&mut self, channel: u8) -> u16 {
        self.adc.chselr.write(|w| unsafe { w.bits(1 << channel) });
        self.adc.cr.modify(|r, w| unsafe { w.bits(r.bits() | ADC_CR_ADSTART) });
        while self.adc.isr.read().bits() & ADC_ISR_EOC == 0 {}
        // Reading DR clears EOC
        self.adc.dr.read().bits() as u16
    }
}

impl TouchBus for GpioAdcBus {
    fn set_role(&mut self, pin: u8, role: PinRole) {
        assert!(pin < PIN_COUNT);
        let pull = match role {
            PinRole::PullDown => PUPDR_PULL_DOWN,
            PinRole::PullUp => PUPDR_PULL_UP,
        };
        self.set_pull(pin, pull);
        self.set_mode(pin, MODER_INPUT);
    }

    fn read(&mut self, pin: u8) -> u16 {
        assert!(pin < PIN_COUNT);
        self.set_mode(pin, MODER_ANALOG);
        self.convert(pin)
    }
}
