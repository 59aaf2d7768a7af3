//! Tap: press and release inside the view without moving too far.

use crate::domain::geometry::{Point, Rect};
use crate::domain::input::TouchPhase;

use super::{GestureRecognizer, GestureState, PointerEvent, Recognition};

/// Movement (logical units) after which a press no longer counts as a tap.
pub const DEFAULT_TAP_SLOP: f32 = 10.0;

/// Delivered to the tap callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub position: Point,
}

/// Recognizes a tap and claims the sequence on release.
pub struct TapGestureRecognizer {
    on_tap: Box<dyn FnMut(TapEvent) + Send>,
    slop: f32,
    origin: Point,
}

impl TapGestureRecognizer {
    pub fn new(on_tap: impl FnMut(TapEvent) + Send + 'static) -> Self {
        Self { on_tap: Box::new(on_tap), slop: DEFAULT_TAP_SLOP, origin: Point::ZERO }
    }

    pub fn with_slop(mut self, slop: f32) -> Self {
        self.slop = slop;
        self
    }

    fn still_a_tap(&self, position: Point, bounds: Rect) -> bool {
        bounds.contains(position) && self.origin.distance_to(position) <= self.slop
    }
}

impl GestureRecognizer for TapGestureRecognizer {
    fn recognize(&mut self, event: &PointerEvent, bounds: Rect, state: GestureState) -> Recognition {
        if state != GestureState::Unsure {
            return Recognition::silent(state);
        }
        match event.phase {
            TouchPhase::Start => {
                self.origin = event.position;
                Recognition::silent(GestureState::Unsure)
            }
            TouchPhase::Stay if self.still_a_tap(event.position, bounds) => {
                Recognition::silent(GestureState::Unsure)
            }
            TouchPhase::End if self.still_a_tap(event.position, bounds) => {
                (self.on_tap)(TapEvent { position: event.position });
                Recognition::with_sound(GestureState::Start)
            }
            TouchPhase::None => Recognition::silent(GestureState::Unsure),
            _ => Recognition::silent(GestureState::Failed),
        }
    }

    fn reset(&mut self) {
        self.origin = Point::ZERO;
    }

    fn name(&self) -> &'static str {
        "tap"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::gesture::PointerSource;

    const BOUNDS: Rect = Rect { x: 0.0, y: 0.0, width: 100.0, height: 100.0 };

    fn event(phase: TouchPhase, x: f32, y: f32) -> PointerEvent {
        PointerEvent {
            source: PointerSource::Touch { finger_id: 0 },
            phase,
            position: Point::new(x, y),
            time: Duration::ZERO,
        }
    }

    fn counting_tap() -> (TapGestureRecognizer, Arc<AtomicUsize>) {
        let taps = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&taps);
        let tap = TapGestureRecognizer::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        (tap, taps)
    }

    #[test]
    fn test_press_and_release_in_place_is_a_tap() {
        // Arrange
        let (mut tap, taps) = counting_tap();
        let unsure = GestureState::Unsure;

        // Act
        let down = tap.recognize(&event(TouchPhase::Start, 50.0, 50.0), BOUNDS, unsure);
        let hold = tap.recognize(&event(TouchPhase::Stay, 52.0, 51.0), BOUNDS, down.state);
        let up = tap.recognize(&event(TouchPhase::End, 52.0, 51.0), BOUNDS, hold.state);

        // Assert
        assert_eq!(down.state, GestureState::Unsure);
        assert_eq!(hold.state, GestureState::Unsure);
        assert_eq!(up, Recognition::with_sound(GestureState::Start));
        assert_eq!(taps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_moving_beyond_slop_fails() {
        let (mut tap, taps) = counting_tap();

        tap.recognize(&event(TouchPhase::Start, 10.0, 10.0), BOUNDS, GestureState::Unsure);
        let moved = tap.recognize(&event(TouchPhase::Stay, 40.0, 10.0), BOUNDS, GestureState::Unsure);

        assert_eq!(moved.state, GestureState::Failed);
        assert_eq!(taps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_outside_view_fails() {
        let (tap, taps) = counting_tap();
        let mut tap = tap.with_slop(1000.0);
        tap.recognize(&event(TouchPhase::Start, 95.0, 50.0), BOUNDS, GestureState::Unsure);

        let up = tap.recognize(&event(TouchPhase::End, 105.0, 50.0), BOUNDS, GestureState::Unsure);

        assert_eq!(up.state, GestureState::Failed);
        assert_eq!(taps.load(Ordering::SeqCst), 0);
    }
}
