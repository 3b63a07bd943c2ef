use crate::calibrate::calibrate;
use crate::sampler::{ChannelConfig, Polarity, TouchBus};
use crate::{TouchConfig, TOLERANCE_FACTOR};

/// Pressed/released decision for one channel.
///
/// Which variant a channel gets depends on its polarity. Neither holds any
/// state beyond the fixed threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classifier {
    /// Pressed when a reading exceeds `TOLERANCE_FACTOR` times the baseline
    Multiplier { baseline: u16 },
    /// Pressed when a reading drops below a fixed ceiling
    Ceiling { threshold: u16 },
}

impl Classifier {
    pub const fn multiplier(baseline: u16) -> Self {
        Self::Multiplier { baseline }
    }

    pub const fn ceiling(config: &TouchConfig) -> Self {
        Self::Ceiling { threshold: config.inverted_threshold() }
    }

    /// Build the classifier for a channel.
    ///
    /// Normal polarity channels are calibrated here, so this must run while
    /// nothing touches the electrode. Inverted channels sit near full scale
    /// where a baseline means nothing, and are not sampled at all.
    pub fn for_channel<B, Y>(bus: &mut B, channel: &ChannelConfig, config: &TouchConfig, yield_now: Y) -> Self
    where
        B: TouchBus,
        Y: FnMut(),
    {
        match channel.polarity {
            Polarity::Normal => {
                Self::multiplier(calibrate(bus, channel, config.samples_per_reading, yield_now))
            }
            Polarity::Inverted => Self::ceiling(config),
        }
    }

    pub fn is_pressed(&self, reading: u16) -> bool {
        match *self {
            Self::Multiplier { .. } => reading as u32 > self.threshold(),
            Self::Ceiling { threshold } => reading < threshold,
        }
    }

    pub fn threshold(&self) -> u32 {
        match *self {
            Self::Multiplier { baseline } => baseline as u32 * TOLERANCE_FACTOR,
            Self::Ceiling { threshold } => threshold as u32,
        }
    }
}
