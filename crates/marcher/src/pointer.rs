use marcher_engine::input::{InputCell, InputEvent, MouseButton, MouseButtonState, TouchPhase};

/// Pointer state shared with the render hook.
///
/// `position` is in surface pixels, origin top-left. `info` is `[1, 0]` while
/// any tracked mouse button is held, `[1, 1]` during a touch and `[0, 0]`
/// otherwise.
#[derive(Debug, Clone, Default)]
pub struct PointerCells {
    pub position: InputCell<[f32; 2]>,
    pub info: InputCell<[f32; 2]>,
}

/// Folds pointer and touch events into [`PointerCells`].
#[derive(Debug, Default)]
pub struct PointerTracker {
    cells: PointerCells,
    /// Left, middle, right.
    buttons_down: [bool; 3],
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles readable by a render hook.
    pub fn cells(&self) -> PointerCells {
        self.cells.clone()
    }

    pub fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => self.cells.position.set([*x, *y]),

            InputEvent::PointerButton(ev) => {
                let Some(index) = button_index(ev.button) else {
                    return;
                };
                self.buttons_down[index] = ev.state == MouseButtonState::Pressed;
                self.cells.position.set([ev.x, ev.y]);

                let any_down = self.buttons_down.iter().any(|down| *down);
                self.cells.info.set([if any_down { 1.0 } else { 0.0 }, 0.0]);
            }

            InputEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started => {
                    self.cells.position.set([touch.x, touch.y]);
                    self.cells.info.set([1.0, 1.0]);
                }
                TouchPhase::Moved => self.cells.position.set([touch.x, touch.y]),
                TouchPhase::Ended | TouchPhase::Cancelled => self.cells.info.set([0.0, 0.0]),
            },

            _ => {}
        }
    }
}

fn button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Middle => Some(1),
        MouseButton::Right => Some(2),
        _ => None,
    }
}
