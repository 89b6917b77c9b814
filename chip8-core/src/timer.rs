//! Delay and sound timers.
//!
//! Both counters tick down at 60 Hz no matter how fast instructions are
//! executed. They are atomic cells, so a host clock may call [`Timers::tick`]
//! from its own thread while the machine reads and stores them.

use core::sync::atomic::{AtomicU8, Ordering};
use core::time::Duration;

/// Rate at which timers are decremented
pub const TIMER_HZ: u32 = 60;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    On,
    Off,
    Finished,
}

#[derive(Debug)]
pub struct Timer(AtomicU8);

impl Timer {
    pub fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    #[inline]
    pub fn store(&self, value: u8) {
        self.0.store(value, Ordering::Release);
    }

    #[inline]
    pub fn load(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub fn decrement(&self) -> TimerState {
        let previous = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
                Some(value.saturating_sub(1))
            })
            .unwrap_or_else(|value| value);
        match previous {
            0 => TimerState::Off,
            1 => TimerState::Finished,
            _ => TimerState::On,
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Delay and sound timers shared between the machine and the host clock
#[derive(Debug, Default)]
pub struct Timers {
    delay: Timer,
    sound: Timer,
}

impl Timers {
    pub fn new() -> Self {
        Self {
            delay: Timer::new(),
            sound: Timer::new(),
        }
    }

    /// Decrement both timers once
    ///
    /// Returned state is the one of the sound timer, so that caller can turn
    /// the buzzer on and off.
    pub fn tick(&self) -> TimerState {
        self.delay.decrement();
        self.sound.decrement()
    }

    pub fn delay(&self) -> u8 {
        self.delay.load()
    }

    pub fn set_delay(&self, value: u8) {
        self.delay.store(value);
    }

    pub fn sound(&self) -> u8 {
        self.sound.load()
    }

    pub fn set_sound(&self, value: u8) {
        self.sound.store(value);
    }

    /// Whether a tone should be playing right now
    pub fn is_sound_on(&self) -> bool {
        self.sound() > 0
    }

    pub fn reset(&self) {
        self.delay.store(0);
        self.sound.store(0);
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Converts elapsed wall clock time into a number of timer ticks
///
/// Elapsed time is accounted in units of `1 / (hz * 10^9)` s, so no rounding
/// error builds up and a clock of any resolution yields exactly `hz` ticks
/// per second.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cadence {
    hz: u32,
    pending: u128,
}

impl Cadence {
    pub fn from_hz(hz: u32) -> Self {
        Self {
            hz: hz.max(1),
            pending: 0,
        }
    }

    /// Nominal time between ticks, truncated to whole nanoseconds
    ///
    /// Useful for sleeping between polls, `advance` doesn't depend on it.
    pub fn period(&self) -> Duration {
        Duration::from_nanos((NANOS_PER_SEC / u128::from(self.hz)) as u64)
    }

    /// Account `elapsed` time, returns how many ticks became due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.pending += elapsed.as_nanos() * u128::from(self.hz);
        let due = (self.pending / NANOS_PER_SEC).min(u128::from(u32::MAX));
        self.pending -= due * NANOS_PER_SEC;
        due as u32
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::from_hz(TIMER_HZ)
    }
}
