//! Highlight alpha animation.
//!
//! The value is never stored: it is computed from the time elapsed since the
//! last retarget, the value the animation started from and its target.

use std::time::Duration;

/// Default time for the highlight to fade in or out.
pub const DEFAULT_HIGHLIGHT_DURATION: Duration = Duration::from_millis(100);

/// Ease-out quadratic curve on `t` in `[0, 1]`.
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Animation of a view's highlight alpha toward 0.0 or 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightAnimation {
    from: f32,
    target: f32,
    started_at: Duration,
    duration: Duration,
}

impl Default for HighlightAnimation {
    fn default() -> Self {
        Self {
            from: 0.0,
            target: 0.0,
            started_at: Duration::ZERO,
            duration: DEFAULT_HIGHLIGHT_DURATION,
        }
    }
}

impl HighlightAnimation {
    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Starts animating toward `target` from wherever the previous animation
    /// is at `now`.
    pub fn retarget(&mut self, target: f32, now: Duration, duration: Duration) {
        self.from = self.value_at(now);
        self.target = target;
        self.started_at = now;
        self.duration = duration;
    }

    /// Progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value_at(&self, now: Duration) -> f32 {
        self.from + (self.target - self.from) * ease_out_quad(self.progress(now))
    }

    pub fn is_running(&self, now: Duration) -> bool {
        self.progress(now) < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_ease_out_quad_endpoints_and_shape() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert!(ease_out_quad(0.5) > 0.5, "ease-out runs ahead of linear");
        assert_eq!(ease_out_quad(4.0), 1.0);
    }

    #[test]
    fn test_fade_in_reaches_target_after_duration() {
        // Arrange
        let mut anim = HighlightAnimation::default();

        // Act
        anim.retarget(1.0, ms(1000), DEFAULT_HIGHLIGHT_DURATION);

        // Assert
        assert_eq!(anim.value_at(ms(1000)), 0.0);
        assert!((anim.value_at(ms(1050)) - 0.75).abs() < 1e-5);
        assert_eq!(anim.value_at(ms(1100)), 1.0);
        assert_eq!(anim.value_at(ms(5000)), 1.0);
        assert!(!anim.is_running(ms(1100)));
    }

    #[test]
    fn test_retarget_midway_starts_from_current_value() {
        let mut anim = HighlightAnimation::default();
        anim.retarget(1.0, ms(0), ms(100));
        let midway = anim.value_at(ms(50));

        anim.retarget(0.0, ms(50), ms(100));

        assert_eq!(anim.target(), 0.0);
        assert!((anim.value_at(ms(50)) - midway).abs() < 1e-6);
        assert_eq!(anim.value_at(ms(150)), 0.0);
    }

    #[test]
    fn test_zero_duration_jumps_to_target() {
        let mut anim = HighlightAnimation::default();
        anim.retarget(1.0, ms(10), Duration::ZERO);
        assert_eq!(anim.value_at(ms(10)), 1.0);
    }

    #[test]
    fn test_time_before_start_is_treated_as_start() {
        let mut anim = HighlightAnimation::default();
        anim.retarget(1.0, ms(100), ms(100));
        assert_eq!(anim.value_at(ms(20)), 0.0);
    }
}
