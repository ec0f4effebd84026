use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard state sampled once per frame by the game controller.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the edge-triggered set. Call after the frame's update.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Applies a window event. `consumed` is true when the overlay already
    /// handled it.
    pub fn handle_event(&mut self, event: &WindowEvent, consumed: bool) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state, consumed);
                }
            }
            // keys held while the window loses focus never see a release
            WindowEvent::Focused(false) => self.keys_down.clear(),
            _ => {}
        }
    }

    /// Consumed presses are dropped. Releases always apply, otherwise a key
    /// let go over an overlay widget would stay held.
    fn handle_key(&mut self, key: KeyCode, state: ElementState, consumed: bool) {
        match state {
            ElementState::Pressed if consumed => {}
            ElementState::Pressed => self.press(key),
            ElementState::Released => self.release(key),
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn shift(&self) -> bool {
        self.key_down(KeyCode::ShiftLeft) || self.key_down(KeyCode::ShiftRight)
    }

    pub fn ctrl(&self) -> bool {
        self.key_down(KeyCode::ControlLeft) || self.key_down(KeyCode::ControlRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_edge_triggered() {
        let mut input = Input::new();
        input.press(KeyCode::KeyS);
        assert!(input.key_pressed(KeyCode::KeyS));
        input.begin_frame();
        // auto-repeat delivers another press while held
        input.press(KeyCode::KeyS);
        assert!(input.key_down(KeyCode::KeyS));
        assert!(!input.key_pressed(KeyCode::KeyS));
    }

    #[test]
    fn release_clears_held_state() {
        let mut input = Input::new();
        input.press(KeyCode::F11);
        input.begin_frame();
        input.release(KeyCode::F11);
        assert!(!input.key_down(KeyCode::F11));
        input.press(KeyCode::F11);
        assert!(input.key_pressed(KeyCode::F11));
    }

    #[test]
    fn overlay_keeps_presses_but_not_releases() {
        let mut input = Input::new();
        input.handle_key(KeyCode::KeyS, ElementState::Pressed, true);
        assert!(!input.key_down(KeyCode::KeyS));

        input.handle_key(KeyCode::ArrowUp, ElementState::Pressed, false);
        assert!(input.key_down(KeyCode::ArrowUp));
        input.handle_key(KeyCode::ArrowUp, ElementState::Released, true);
        assert!(!input.key_down(KeyCode::ArrowUp));
    }

    #[test]
    fn modifiers_accept_either_side() {
        let mut input = Input::new();
        assert!(!input.shift() && !input.ctrl());
        input.press(KeyCode::ShiftRight);
        input.press(KeyCode::ControlLeft);
        assert!(input.shift() && input.ctrl());
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = Input::new();
        input.press(KeyCode::ArrowUp);
        input.press(KeyCode::ControlLeft);
        input.handle_event(&WindowEvent::Focused(false), true);
        assert!(!input.key_down(KeyCode::ArrowUp));
        assert!(!input.ctrl());
    }
}
