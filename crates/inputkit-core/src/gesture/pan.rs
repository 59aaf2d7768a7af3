//! Pan (drag): claims the sequence once the pointer moved far enough, then
//! reports every movement until release.

use crate::domain::geometry::{Point, Rect};
use crate::domain::input::TouchPhase;

use super::{GestureRecognizer, GestureState, PointerEvent, Recognition};

/// Movement (logical units) needed before a pan claims the sequence.
pub const DEFAULT_PAN_THRESHOLD: f32 = 10.0;

/// Directions a pan reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanAxis {
    Horizontal,
    Vertical,
    Any,
}

/// Delivered to the pan callback on `Start`, `Stay` and `End`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanEvent {
    pub state: GestureState,
    pub start_position: Point,
    pub position: Point,
    /// Movement since the previous pan event.
    pub delta: Point,
}

impl PanEvent {
    /// Total movement since the press.
    pub fn translation(&self) -> Point {
        self.position.offset_from(self.start_position)
    }
}

pub struct PanGestureRecognizer {
    on_pan: Box<dyn FnMut(&PanEvent) + Send>,
    axis: PanAxis,
    threshold: f32,
    start: Point,
    last: Point,
}

impl PanGestureRecognizer {
    pub fn new(axis: PanAxis, on_pan: impl FnMut(&PanEvent) + Send + 'static) -> Self {
        Self {
            on_pan: Box::new(on_pan),
            axis,
            threshold: DEFAULT_PAN_THRESHOLD,
            start: Point::ZERO,
            last: Point::ZERO,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Movement along the allowed axis and across it.
    fn split(&self, position: Point) -> (f32, f32) {
        let d = position.offset_from(self.start);
        match self.axis {
            PanAxis::Horizontal => (d.x.abs(), d.y.abs()),
            PanAxis::Vertical => (d.y.abs(), d.x.abs()),
            PanAxis::Any => ((d.x * d.x + d.y * d.y).sqrt(), 0.0),
        }
    }

    fn emit(&mut self, state: GestureState, position: Point) {
        let event = PanEvent {
            state,
            start_position: self.start,
            position,
            delta: position.offset_from(self.last),
        };
        self.last = position;
        (self.on_pan)(&event);
    }
}

impl GestureRecognizer for PanGestureRecognizer {
    fn recognize(&mut self, event: &PointerEvent, _bounds: Rect, state: GestureState) -> Recognition {
        let next = match (state, event.phase) {
            (GestureState::Unsure, TouchPhase::Start) => {
                self.start = event.position;
                self.last = event.position;
                GestureState::Unsure
            }
            (GestureState::Unsure, TouchPhase::Stay) => {
                let (along, across) = self.split(event.position);
                if along >= self.threshold && along >= across {
                    self.emit(GestureState::Start, event.position);
                    GestureState::Start
                } else if across >= self.threshold {
                    // Moved the wrong way first: axis-locked out.
                    GestureState::Failed
                } else {
                    GestureState::Unsure
                }
            }
            (GestureState::Unsure, TouchPhase::End) => GestureState::Failed,
            (GestureState::Start | GestureState::Stay, TouchPhase::Stay) => {
                self.emit(GestureState::Stay, event.position);
                GestureState::Stay
            }
            (GestureState::Start | GestureState::Stay, TouchPhase::End) => {
                self.emit(GestureState::End, event.position);
                GestureState::End
            }
            (current, _) => current,
        };
        Recognition::silent(next)
    }

    fn reset(&mut self) {
        self.start = Point::ZERO;
        self.last = Point::ZERO;
    }

    fn name(&self) -> &'static str {
        "pan"
    }
}
