//! Charge-transfer sampling of a single touch channel.
//!
//! A channel is a pair of pins: the sense pin wired to the electrode and a
//! reference pin next to it. Each cycle pulls the two pins to opposite rails,
//! reads the reference pin twice to bleed off what is left on the ADC sample
//! cap, then reads the sense pin. A finger on the electrode adds capacitance
//! and moves the sense reading.

/// Pull configuration applied to a pin before it is measured
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinRole {
    PullDown,
    PullUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Sense pin pulled down, a touch raises the reading
    Normal,
    /// Sense pin pulled up, a touch drops the reading below full scale
    Inverted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    pub sense: u8,
    pub reference: u8,
    pub polarity: Polarity,
}

impl ChannelConfig {
    pub const fn new(sense: u8, reference: u8, polarity: Polarity) -> Self {
        Self { sense, reference, polarity }
    }

    /// Roles for the (sense, reference) pins
    pub const fn roles(&self) -> (PinRole, PinRole) {
        match self.polarity {
            Polarity::Normal => (PinRole::PullDown, PinRole::PullUp),
            Polarity::Inverted => (PinRole::PullUp, PinRole::PullDown),
        }
    }
}

/// Pin and ADC access needed by the sampler.
///
/// Both operations are synchronous and assumed to always succeed.
pub trait TouchBus {
    fn set_role(&mut self, pin: u8, role: PinRole);
    fn read(&mut self, pin: u8) -> u16;
}

/// Take `measures` charge/read cycles on `channel` and return their mean,
/// truncated toward zero.
pub fn sample<B: TouchBus>(bus: &mut B, channel: &ChannelConfig, measures: u16) -> u16 {
    if measures == 0 {
        return 0;
    }

    let (sense_role, reference_role) = channel.roles();
    let mut sum: u32 = 0;

    for _ in 0..measures {
        bus.set_role(channel.reference, reference_role);
        bus.set_role(channel.sense, sense_role);
        bus.read(channel.reference);
        bus.read(channel.reference);
        sum += bus.read(channel.sense) as u32;
    }

    (sum / measures as u32) as u16
}
