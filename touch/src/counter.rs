use crate::TouchConfig;

/// Role of each touch button in counter mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Inc,
    Dec,
    Inc5,
    Dec5,
}

impl Button {
    /// Button roles in channel order
    pub const ALL: [Button; 4] = [Button::Inc, Button::Dec, Button::Inc5, Button::Dec5];

    /// Signed change applied for a tap, or for each hold repeat
    pub const fn step(&self, hold: bool) -> i32 {
        let step = match self {
            Self::Inc | Self::Dec => 1,
            Self::Inc5 | Self::Dec5 => 5,
        };
        let step = if hold { step * 10 } else { step };
        match self {
            Self::Inc | Self::Inc5 => step,
            Self::Dec | Self::Dec5 => -step,
        }
    }
}

/// A value kept inside `[min, max]`
#[derive(Clone, Copy, Debug)]
pub struct Counter {
    value: u16,
    min: u16,
    max: u16,
}

impl Counter {
    pub const fn new(config: &TouchConfig) -> Self {
        Self::with_bounds(config.counter_min, config.counter_max)
    }

    /// Starts at `min`
    pub const fn with_bounds(min: u16, max: u16) -> Self {
        Self { value: min, min, max }
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    /// Set the value directly, clamped to the bounds
    #[cfg(test)]
    pub fn set(&mut self, value: u16) -> u16 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    /// Step the value for a button event, stopping at the bounds
    pub fn apply(&mut self, button: Button, hold: bool) -> u16 {
        let next = self.value as i32 + button.step(hold);
        self.value = next.clamp(self.min as i32, self.max as i32) as u16;
        self.value
    }
}
