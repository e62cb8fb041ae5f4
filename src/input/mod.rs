use egui::{Context, Event, PointerButton, Rect, TouchPhase};

mod normalizer;

pub use normalizer::{PointerSample, RawPointer, normalize, normalize_pressure};

/// Pointer events in canvas pixel space, as consumed by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed or finger touched down on the canvas
    PointerDown(PointerSample),
    /// Pointer moved over the canvas, pressed or not
    PointerMove(PointerSample),
    /// Primary button released or finger lifted
    PointerUp,
    /// The platform aborted the gesture
    PointerCancel,
    /// A pressed pointer left the canvas
    PointerLeave,
}

impl InputEvent {
    /// True for the events that end a stroke
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PointerUp | Self::PointerCancel | Self::PointerLeave)
    }
}

/// Handles converting raw egui input into our domain-specific InputEvents
#[derive(Debug, Default)]
pub struct InputHandler {
    /// A press started on the canvas and has not ended yet
    tracking: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Process one frame of egui input against the canvas's current rect
    pub fn process_input(
        &mut self,
        ctx: &Context,
        canvas_rect: Rect,
        backing_size: [u32; 2],
    ) -> Vec<InputEvent> {
        ctx.input(|input| self.process_events(&input.events, canvas_rect, backing_size))
    }

    /// Convert a batch of egui events. Split out from `process_input` so it can
    /// be driven without a live context.
    pub fn process_events(
        &mut self,
        events: &[Event],
        canvas_rect: Rect,
        backing_size: [u32; 2],
    ) -> Vec<InputEvent> {
        // Touch force arrives alongside the emulated pointer events of the same frame
        let force = events.iter().rev().find_map(|event| match event {
            Event::Touch { force, .. } => *force,
            _ => None,
        });
        let sample = |pos| {
            let raw = RawPointer { client: pos, force };
            normalize(raw, canvas_rect, backing_size)
        };

        let mut out = Vec::new();
        for event in events {
            match event {
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: true,
                    ..
                } if canvas_rect.contains(*pos) => {
                    self.tracking = true;
                    out.push(InputEvent::PointerDown(sample(*pos)));
                }
                Event::PointerButton {
                    button: PointerButton::Primary,
                    pressed: false,
                    ..
                } if self.tracking => {
                    self.tracking = false;
                    out.push(InputEvent::PointerUp);
                }
                Event::PointerMoved(pos) => {
                    if canvas_rect.contains(*pos) {
                        out.push(InputEvent::PointerMove(sample(*pos)));
                    } else if self.tracking {
                        self.tracking = false;
                        out.push(InputEvent::PointerLeave);
                    }
                }
                Event::PointerGone if self.tracking => {
                    self.tracking = false;
                    out.push(InputEvent::PointerLeave);
                }
                Event::Touch {
                    phase: TouchPhase::Cancel,
                    ..
                } if self.tracking => {
                    self.tracking = false;
                    out.push(InputEvent::PointerCancel);
                }
                _ => {}
            }
        }
        out
    }
}
