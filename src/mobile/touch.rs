//! Touch Input Normalization
//!
//! Reduces raw touch/pointer events to the single-pointer stream the
//! pull-to-refresh controller understands:
//! - Only the first finger down drives the gesture
//! - Secondary fingers are ignored until the primary one lifts
//! - Non-finite coordinates are dropped

/// Touch identifier used for mouse / single-pointer platforms.
pub const MOUSE_POINTER_ID: u64 = 0;

/// Pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Finger / button down. `scroll_top` is the scroll offset of the
    /// container at that instant.
    Down { id: u64, y: f32, scroll_top: f32 },
    Move { id: u64, y: f32 },
    Up { id: u64 },
    Cancel { id: u64 },
}

impl PointerEvent {
    pub fn id(&self) -> u64 {
        match *self {
            PointerEvent::Down { id, .. }
            | PointerEvent::Move { id, .. }
            | PointerEvent::Up { id }
            | PointerEvent::Cancel { id } => id,
        }
    }

    fn is_well_formed(&self) -> bool {
        match *self {
            PointerEvent::Down { y, scroll_top, .. } => y.is_finite() && scroll_top.is_finite(),
            PointerEvent::Move { y, .. } => y.is_finite(),
            PointerEvent::Up { .. } | PointerEvent::Cancel { .. } => true,
        }
    }
}

/// Primary-touch filter.
///
/// Multi-touch surfaces report every finger; a pull is a one-finger gesture,
/// so everything but the first active touch is dropped.
#[derive(Debug, Default)]
pub struct TouchTracker {
    /// Touch that owns the current gesture
    primary: Option<u64>,
    /// Last accepted vertical position of the primary touch
    last_y: Option<f32>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<u64> {
        self.primary
    }

    pub fn last_y(&self) -> Option<f32> {
        self.last_y
    }

    /// Returns the event if it belongs to the primary touch, else `None`.
    pub fn filter(&mut self, event: PointerEvent) -> Option<PointerEvent> {
        if !event.is_well_formed() {
            return None;
        }

        match event {
            PointerEvent::Down { id, y, .. } => {
                if self.primary.is_some() {
                    return None;
                }
                self.primary = Some(id);
                self.last_y = Some(y);
                Some(event)
            }
            PointerEvent::Move { id, y } => {
                if self.primary != Some(id) {
                    return None;
                }
                // Duplicate moves are common on touch hardware
                if self.last_y == Some(y) {
                    return None;
                }
                self.last_y = Some(y);
                Some(event)
            }
            PointerEvent::Up { id } | PointerEvent::Cancel { id } => {
                if self.primary != Some(id) {
                    return None;
                }
                self.primary = None;
                self.last_y = None;
                Some(event)
            }
        }
    }

    /// Forget the active touch (surface torn down). Returns the cancel event
    /// to forward, if a touch was active.
    pub fn reset(&mut self) -> Option<PointerEvent> {
        self.last_y = None;
        self.primary.take().map(|id| PointerEvent::Cancel { id })
    }
}
