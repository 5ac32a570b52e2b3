/// Platform-agnostic input handling system
use glam::Vec2;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown { key: String, repeat: bool },
    KeyUp(String),

    // Pointer events
    PointerMove { x: f32, y: f32, width: f32, height: f32 },
    MouseMove { dx: f32, dy: f32 },
    MouseButton { button: MouseButton, is_down: bool },
    Wheel { delta_y: f32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// What a bound key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    ToggleMode,
}

/// Movement flags, set on key-down and cleared on key-up.
/// Orbit mode reads `forward` as its single "moving" flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveFlags {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl DriveFlags {
    fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::Forward => self.forward = pressed,
            Action::Backward => self.backward = pressed,
            Action::TurnLeft => self.turn_left = pressed,
            Action::TurnRight => self.turn_right = pressed,
            Action::ToggleMode => {}
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.turn_left || self.turn_right
    }
}

/// Unified input state shared between event handlers and the frame loop
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub drive: DriveFlags,
    /// Pointer in normalized device coordinates, x right and y up in [-1, 1]
    pub pointer_ndc: Vec2,
    pub look_delta: (f32, f32),
    pub zoom_delta: f32,
    pub dragging: bool,
    mode_toggle_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent, bindings: &KeyBindings) {
        match event {
            InputEvent::KeyDown { key, repeat } => match bindings.action_for(key) {
                Some(Action::ToggleMode) => {
                    if !repeat {
                        self.mode_toggle_requested = true;
                    }
                }
                Some(action) => self.drive.set(action, true),
                None => {}
            },
            InputEvent::KeyUp(key) => {
                if let Some(action) = bindings.action_for(key) {
                    self.drive.set(action, false);
                }
            }
            InputEvent::PointerMove { x, y, width, height } => {
                if let Some(ndc) = pointer_to_ndc(*x, *y, *width, *height) {
                    self.pointer_ndc = ndc;
                }
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.dragging {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseButton { button, is_down } => {
                if *button == MouseButton::Left {
                    self.dragging = *is_down;
                }
            }
            InputEvent::Wheel { delta_y } => {
                self.zoom_delta += delta_y;
            }
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear();
            }
        }
    }

    /// Drop held keys and any drag in progress
    pub fn clear(&mut self) {
        self.drive = DriveFlags::default();
        self.dragging = false;
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    pub fn consume_zoom(&mut self) -> f32 {
        std::mem::take(&mut self.zoom_delta)
    }

    pub fn take_mode_toggle(&mut self) -> bool {
        std::mem::take(&mut self.mode_toggle_requested)
    }
}

/// Window-relative pixel position to normalized device coordinates.
/// Returns `None` for a zero-sized window.
pub fn pointer_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Option<Vec2> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(Vec2::new((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0))
}

/// Key mapping configuration. Letter keys match case-insensitively.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub turn_left: Vec<String>,
    pub turn_right: Vec<String>,
    pub toggle_mode: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |names: &[&str]| names.iter().map(|k| k.to_string()).collect();
        Self {
            forward: keys(&["ArrowUp", "w"]),
            backward: keys(&["ArrowDown", "s"]),
            turn_left: keys(&["ArrowLeft", "a"]),
            turn_right: keys(&["ArrowRight", "d"]),
            toggle_mode: keys(&["m"]),
        }
    }
}

impl KeyBindings {
    pub fn action_for(&self, key: &str) -> Option<Action> {
        let matches = |bound: &[String]| bound.iter().any(|b| b.eq_ignore_ascii_case(key));
        if matches(&self.forward) {
            Some(Action::Forward)
        } else if matches(&self.backward) {
            Some(Action::Backward)
        } else if matches(&self.turn_left) {
            Some(Action::TurnLeft)
        } else if matches(&self.turn_right) {
            Some(Action::TurnRight)
        } else if matches(&self.toggle_mode) {
            Some(Action::ToggleMode)
        } else {
            None
        }
    }

    /// Whether the browser default for this key should be suppressed
    pub fn is_bound(&self, key: &str) -> bool {
        self.action_for(key).is_some()
    }
}

pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent, WheelEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown { key, repeat: e.repeat() }
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn pointer_move_to_input(e: &MouseEvent, width: f32, height: f32) -> InputEvent {
        InputEvent::PointerMove {
            x: e.client_x() as f32,
            y: e.client_y() as f32,
            width,
            height,
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }

    pub fn mouse_button_to_input(e: &MouseEvent, is_down: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::from_web_button(e.button()),
            is_down,
        }
    }

    pub fn wheel_to_input(e: &WheelEvent) -> InputEvent {
        InputEvent::Wheel { delta_y: e.delta_y() as f32 }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::event::{ElementState, KeyEvent};
    use winit::keyboard::{Key, NamedKey};

    /// Browser-style key name for a winit key, so both platforms share bindings
    pub fn key_name(key: &Key) -> Option<String> {
        match key {
            Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
            Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
            Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
            Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
            Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
            Key::Named(NamedKey::Space) => Some(" ".to_string()),
            Key::Character(s) => Some(s.to_string()),
            _ => None,
        }
    }

    pub fn key_event_to_input(event: &KeyEvent) -> Option<InputEvent> {
        let key = key_name(&event.logical_key)?;
        Some(match event.state {
            ElementState::Pressed => InputEvent::KeyDown { key, repeat: event.repeat },
            ElementState::Released => InputEvent::KeyUp(key),
        })
    }

    pub fn mouse_button_to_input(button: winit::event::MouseButton, state: ElementState) -> Option<InputEvent> {
        let button = match button {
            winit::event::MouseButton::Left => MouseButton::Left,
            winit::event::MouseButton::Right => MouseButton::Right,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            _ => return None,
        };
        Some(InputEvent::MouseButton {
            button,
            is_down: state == ElementState::Pressed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key: &str) -> InputEvent {
        InputEvent::KeyDown { key: key.to_string(), repeat: false }
    }

    #[test]
    fn test_arrow_and_letter_keys_set_flags() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();

        input.process_event(&down("ArrowUp"), &bindings);
        input.process_event(&down("A"), &bindings);
        assert!(input.drive.forward);
        assert!(input.drive.turn_left);
        assert!(!input.drive.backward);

        input.process_event(&InputEvent::KeyUp("ArrowUp".into()), &bindings);
        assert!(!input.drive.forward);
        assert!(input.drive.turn_left);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_event(&down("F13"), &bindings);
        input.process_event(&InputEvent::KeyUp("Dead".into()), &bindings);
        assert!(!input.drive.any());
        assert!(!input.take_mode_toggle());
    }

    #[test]
    fn test_mode_toggle_ignores_key_repeat() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown { key: "m".into(), repeat: true }, &bindings);
        assert!(!input.take_mode_toggle());

        input.process_event(&down("M"), &bindings);
        assert!(input.take_mode_toggle());
        assert!(!input.take_mode_toggle(), "toggle is consumed once");
    }

    #[test]
    fn test_focus_loss_clears_held_keys() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_event(&down("w"), &bindings);
        input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: true }, &bindings);
        input.process_event(&InputEvent::FocusLost, &bindings);
        assert!(!input.drive.any());
        assert!(!input.dragging);
    }

    #[test]
    fn test_pointer_to_ndc_corners() {
        assert_eq!(pointer_to_ndc(0.0, 0.0, 800.0, 600.0), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(pointer_to_ndc(800.0, 600.0, 800.0, 600.0), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(pointer_to_ndc(400.0, 300.0, 800.0, 600.0), Some(Vec2::ZERO));
        assert_eq!(pointer_to_ndc(10.0, 10.0, 0.0, 600.0), None);
    }

    #[test]
    fn test_drag_accumulates_look_only_while_pressed() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 }, &bindings);
        assert_eq!(input.consume_look(), (0.0, 0.0));

        input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: true }, &bindings);
        input.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 1.0 }, &bindings);
        input.process_event(&InputEvent::MouseMove { dx: 2.0, dy: -3.0 }, &bindings);
        assert_eq!(input.consume_look(), (7.0, -2.0));
        assert_eq!(input.consume_look(), (0.0, 0.0));
    }
}
