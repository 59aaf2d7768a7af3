//! Shake: the "you can't go that way" wobble of the highlight.
//!
//! Time is measured in ticks of 10 ms.  Displacement after `t` ticks is
//! `round(a · e^(−c·t) · sin(w·t))` along the axis of the failed move; after
//! [`SHAKE_DURATION_TICKS`] the shake is over.

use std::time::Duration;

use rand_core::RngCore;

/// Length of one animation tick.
pub const SHAKE_TICK: Duration = Duration::from_millis(10);
/// Shake length in ticks.
pub const SHAKE_DURATION_TICKS: f32 = 15.0;
/// Angular frequency, radians per tick.
pub const SHAKE_FREQUENCY: f32 = 0.8;
/// Damping per tick.
pub const SHAKE_DAMPING: f32 = 0.35;
/// Smallest random amplitude (logical units).
pub const SHAKE_MIN_AMPLITUDE: u32 = 10;
/// Number of distinct amplitudes; the largest is `MIN + SPAN - 1`.
pub const SHAKE_AMPLITUDE_SPAN: u32 = 15;

/// Cardinal direction of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusDirection {
    Up,
    Down,
    Left,
    Right,
}

impl FocusDirection {
    /// Unit vector in screen coordinates (y grows downward).
    pub fn unit(self) -> (f32, f32) {
        match self {
            FocusDirection::Up => (0.0, -1.0),
            FocusDirection::Down => (0.0, 1.0),
            FocusDirection::Left => (-1.0, 0.0),
            FocusDirection::Right => (1.0, 0.0),
        }
    }
}

/// Damped envelope `a · e^(−c·t)`.
pub fn shake_envelope(ticks: f32, amplitude: f32) -> f32 {
    amplitude * (-SHAKE_DAMPING * ticks).exp()
}

/// Signed displacement after `ticks`, rounded to whole units.
pub fn shake_displacement(ticks: f32, amplitude: f32) -> f32 {
    (shake_envelope(ticks, amplitude) * (SHAKE_FREQUENCY * ticks).sin()).round()
}

/// A running shake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeAnimation {
    started_at: Duration,
    direction: FocusDirection,
    amplitude: u32,
}

impl ShakeAnimation {
    /// Starts a shake with an amplitude drawn from `rng`.
    pub fn new(direction: FocusDirection, now: Duration, rng: &mut dyn RngCore) -> Self {
        let amplitude = rng.next_u32() % SHAKE_AMPLITUDE_SPAN + SHAKE_MIN_AMPLITUDE;
        Self::with_amplitude(direction, now, amplitude)
    }

    pub fn with_amplitude(direction: FocusDirection, now: Duration, amplitude: u32) -> Self {
        Self { started_at: now, direction, amplitude }
    }

    pub fn direction(&self) -> FocusDirection {
        self.direction
    }

    pub fn amplitude(&self) -> u32 {
        self.amplitude
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Ticks since the start, capped at the shake length.
    pub fn elapsed_ticks(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_micros() as f32 / SHAKE_TICK.as_micros() as f32).min(SHAKE_DURATION_TICKS)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.elapsed_ticks(now) >= SHAKE_DURATION_TICKS
    }

    /// `(dx, dy)` to add to the highlight rectangle at `now`.
    pub fn offset(&self, now: Duration) -> (f32, f32) {
        if self.is_finished(now) {
            return (0.0, 0.0);
        }
        let d = shake_displacement(self.elapsed_ticks(now), self.amplitude as f32);
        let (ux, uy) = self.direction.unit();
        (ux * d, uy * d)
    }
}
