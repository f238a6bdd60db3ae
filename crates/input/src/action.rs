/// A camera gesture, independent of the windowing backend.
///
/// Drag distances are in physical pixels; dolly is in wheel steps (one
/// notch = 1.0, positive = towards the target).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Orbit around the target.
    Rotate { dx: f32, dy: f32 },
    /// Move camera and target together in the view plane.
    Truck { dx: f32, dy: f32 },
    /// Move towards or away from the target.
    Dolly(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pixels of middle-button drag per dolly step.
const DOLLY_PIXELS_PER_STEP: f32 = 25.0;

/// Tracks buttons and cursor position and turns motion into actions.
///
/// Primary drag rotates, secondary drag trucks, middle drag and the wheel
/// dolly.
#[derive(Debug, Default, Clone)]
pub struct PointerState {
    primary: bool,
    secondary: bool,
    middle: bool,
    last_position: Option<(f64, f64)>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Primary => self.primary = pressed,
            PointerButton::Secondary => self.secondary = pressed,
            PointerButton::Middle => self.middle = pressed,
        }
    }

    /// Any button held.
    pub fn is_dragging(&self) -> bool {
        self.primary || self.secondary || self.middle
    }

    /// Cursor moved to `(x, y)`. Yields an action if a drag is in progress.
    pub fn moved(&mut self, x: f64, y: f64) -> Option<PointerAction> {
        let last = self.last_position.replace((x, y))?;
        let dx = (x - last.0) as f32;
        let dy = (y - last.1) as f32;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        if self.primary {
            Some(PointerAction::Rotate { dx, dy })
        } else if self.secondary {
            Some(PointerAction::Truck { dx, dy })
        } else if self.middle {
            Some(PointerAction::Dolly(-dy / DOLLY_PIXELS_PER_STEP))
        } else {
            None
        }
    }

    /// The cursor left the window; the next move starts a fresh delta.
    pub fn left(&mut self) {
        self.last_position = None;
    }

    pub fn wheel(&mut self, steps: f32) -> Option<PointerAction> {
        (steps != 0.0).then_some(PointerAction::Dolly(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_action_without_button() {
        let mut p = PointerState::new();
        assert_eq!(p.moved(10.0, 10.0), None);
        assert_eq!(p.moved(20.0, 10.0), None);
        assert!(!p.is_dragging());
    }

    #[test]
    fn first_move_only_records_position() {
        let mut p = PointerState::new();
        p.button(PointerButton::Primary, true);
        assert_eq!(p.moved(5.0, 5.0), None);
        assert_eq!(p.moved(8.0, 1.0), Some(PointerAction::Rotate { dx: 3.0, dy: -4.0 }));
    }

    #[test]
    fn buttons_map_to_gestures() {
        let mut p = PointerState::new();
        p.moved(0.0, 0.0);

        p.button(PointerButton::Secondary, true);
        assert_eq!(p.moved(2.0, 0.0), Some(PointerAction::Truck { dx: 2.0, dy: 0.0 }));
        p.button(PointerButton::Secondary, false);

        p.button(PointerButton::Middle, true);
        assert_eq!(p.moved(2.0, -25.0), Some(PointerAction::Dolly(1.0)));
        assert!(p.is_dragging());
        p.button(PointerButton::Middle, false);
        assert!(!p.is_dragging());
    }

    #[test]
    fn primary_wins_over_other_buttons() {
        let mut p = PointerState::new();
        p.moved(0.0, 0.0);
        p.button(PointerButton::Secondary, true);
        p.button(PointerButton::Primary, true);
        assert!(matches!(p.moved(1.0, 1.0), Some(PointerAction::Rotate { .. })));
    }

    #[test]
    fn leaving_resets_delta_origin() {
        let mut p = PointerState::new();
        p.button(PointerButton::Primary, true);
        p.moved(0.0, 0.0);
        p.left();
        assert_eq!(p.moved(500.0, 500.0), None);
    }

    #[test]
    fn wheel_zero_is_ignored() {
        let mut p = PointerState::new();
        assert_eq!(p.wheel(0.0), None);
        assert_eq!(p.wheel(-2.0), Some(PointerAction::Dolly(-2.0)));
    }
}
