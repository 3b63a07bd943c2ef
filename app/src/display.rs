//! Bit-banged driver for a TM1637 four digit LED module
//!
use crate::hal::gpio::{gpioa, OpenDrain, Output};
use crate::hal::prelude::*;
use touch::DisplaySink;

type ClkPin = gpioa::PA6<Output<OpenDrain>>;
type DioPin = gpioa::PA7<Output<OpenDrain>>;

/// Half bit period, about 5us at 48MHz
const BIT_DELAY_CYCLES: u32 = 240;

const DIGITS: usize = 4;

/// Segment patterns for 0-9
const SEGMENTS: [u8; 10] = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];

const CMD_DATA_AUTO_INCREMENT: u8 = 0x40;
const CMD_ADDRESS: u8 = 0xc0;
const CMD_DISPLAY_ON: u8 = 0x88;

pub struct Tm1637 {
    clk: ClkPin,
    dio: DioPin,
    brightness: u8,
}

impl Tm1637 {
    /// brightness: 0 (dimmest) to 7
    pub fn new(clk: ClkPin, dio: DioPin, brightness: u8) -> Self {
        let mut obj = Self { clk, dio, brightness: brightness & 0x7 };
        obj.clk.set_high().ok();
        obj.dio.set_high().ok();
        obj
    }

    fn delay(&self) {
        cortex_m::asm::delay(BIT_DELAY_CYCLES);
    }

    fn start(&mut self) {
        self.dio.set_low().ok();
        self.delay();
        self.clk.set_low().ok();
        self.delay();
    }

    fn stop(&mut self) {
        self.dio.set_low().ok();
        self.delay();
        self.clk.set_high().ok();
        self.delay();
        self.dio.set_high().ok();
        self.delay();
    }

    fn write_byte(&mut self, mut b: u8) {
        for _ in 0..8 {
            self.clk.set_low().ok();
            if b & 1 != 0 {
                self.dio.set_high().ok();
            } else {
                self.dio.set_low().ok();
            }
            self.delay();
            self.clk.set_high().ok();
            self.delay();
            b >>= 1;
        }

        // Ninth clock for the ACK. DIO is released and the ACK itself is not checked.
        self.clk.set_low().ok();
        self.dio.set_high().ok();
        self.delay();
        self.clk.set_high().ok();
        self.delay();
        self.clk.set_low().ok();
        self.delay();
    }

    fn command(&mut self, cmd: u8) {
        self.start();
        self.write_byte(cmd);
        self.stop();
    }

    /// Write raw segment data for all digits, left to right
    pub fn write_segments(&mut self, segments: [u8; DIGITS]) {
        self.command(CMD_DATA_AUTO_INCREMENT);

        self.start();
        self.write_byte(CMD_ADDRESS);
        for s in segments {
            self.write_byte(s);
        }
        self.stop();

        self.command(CMD_DISPLAY_ON | self.brightness);
    }
}

/// Right aligned decimal, leading zeros blanked. Values above 9999 show
/// their last four digits.
pub fn number_segments(value: u16) -> [u8; DIGITS] {
    let mut segments = [0u8; DIGITS];
    let mut v = value;
    for i in (0..DIGITS).rev() {
        segments[i] = SEGMENTS[(v % 10) as usize];
        v /= 10;
        if v == 0 {
            break;
        }
    }
    segments
}

impl DisplaySink for Tm1637 {
    fn show(&mut self, value: u16) {
        self.write_segments(number_segments(value));
    }

    fn clear(&mut self) {
        self.write_segments([0; DIGITS]);
    }
}
