//! Monotonic microsecond time source.

/// Monotonic microsecond clock.
///
/// The counter may wrap; elapsed time is taken with wrapping subtraction, so
/// any interval shorter than `u32::MAX` microseconds is measured correctly.
pub trait Clock {
    /// Current time in microseconds.
    fn now_us(&mut self) -> u32;
}

/// Clock backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_us(&mut self) -> u32 {
        // Truncation wraps the counter.
        self.origin.elapsed().as_micros() as u32
    }
}
