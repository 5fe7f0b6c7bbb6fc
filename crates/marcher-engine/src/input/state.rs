use std::collections::{HashMap, HashSet};

use super::types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
    TouchEvent, TouchPhase,
};

/// Current input state for the window.
///
/// Tracks what is held down and where the pointer and touches are.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Pointer position in surface pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,

    /// Active touch contacts by id.
    pub touches: HashMap<u64, (f32, f32)>,
}

impl InputState {
    /// Folds `ev` into the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                    self.touches.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => {
                        self.keys_down.insert(*key);
                    }
                    KeyState::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button, state, x, y,
            }) => {
                self.pointer_pos = Some((*x, *y));
                match state {
                    MouseButtonState::Pressed => {
                        self.buttons_down.insert(*button);
                    }
                    MouseButtonState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
            }

            InputEvent::Touch(TouchEvent { id, phase, x, y }) => match phase {
                TouchPhase::Started | TouchPhase::Moved => {
                    self.touches.insert(*id, (*x, *y));
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    self.touches.remove(id);
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    /// True while any mouse button is held.
    pub fn any_button_down(&self) -> bool {
        !self.buttons_down.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(button: MouseButton, state: MouseButtonState) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state,
            x: 10.0,
            y: 20.0,
        })
    }

    #[test]
    fn buttons_are_tracked_independently() {
        let mut input = InputState::default();
        input.apply_event(&button(MouseButton::Left, MouseButtonState::Pressed));
        input.apply_event(&button(MouseButton::Right, MouseButtonState::Pressed));
        input.apply_event(&button(MouseButton::Left, MouseButtonState::Released));

        assert!(input.any_button_down());
        assert!(input.button_down(MouseButton::Right));
        assert_eq!(input.pointer_pos, Some((10.0, 20.0)));

        input.apply_event(&button(MouseButton::Right, MouseButtonState::Released));
        assert!(!input.any_button_down());
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = InputState::default();
        input.apply_event(&button(MouseButton::Left, MouseButtonState::Pressed));
        input.apply_event(&InputEvent::Key {
            key: Key::Character('p'),
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        });
        input.apply_event(&InputEvent::Focused(false));

        assert!(!input.any_button_down());
        assert!(!input.key_down(Key::Character('p')));
    }

    #[test]
    fn touches_follow_their_phase() {
        let mut input = InputState::default();
        let touch = |phase| {
            InputEvent::Touch(TouchEvent {
                id: 3,
                phase,
                x: 1.0,
                y: 2.0,
            })
        };

        input.apply_event(&touch(TouchPhase::Started));
        assert_eq!(input.touches.get(&3), Some(&(1.0, 2.0)));
        input.apply_event(&touch(TouchPhase::Ended));
        assert!(input.touches.is_empty());
    }
}
