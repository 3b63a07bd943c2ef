use core::fmt::Write;

/// Numeric display the control loop writes to, e.g. a 4-digit LED module
pub trait DisplaySink {
    fn show(&mut self, value: u16);
    fn clear(&mut self);
}

/// Forwards the value for each tick to the display and the diagnostic stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct Presenter;

impl Presenter {
    pub const fn new() -> Self {
        Self
    }

    /// The diagnostic write is best-effort and its errors are dropped.
    pub fn present<S, W>(&self, sink: &mut S, diag: &mut W, value: u16)
    where
        S: DisplaySink,
        W: Write,
    {
        sink.show(value);
        write!(diag, "{}   \r", value).ok();
    }
}
