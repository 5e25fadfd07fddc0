use std::collections::HashSet;

use glam::Vec2;

/// Keys and controller buttons the renderer binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Escape,
    GamepadBack,
    KeyR,
    KeyV,
    KeyT,
    KeyB,
    Shift,
    Equal,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Controller - handles button input states
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    fn is_pointer_down(&self, button: PointerButton) -> bool;

    /// Freeze the current device state for one tick
    fn snapshot(&self) -> DeviceSnapshot;
}

/// Immutable device state for a single tick.
///
/// `scroll` is the cumulative wheel position, so consecutive snapshots can be diffed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub keys: HashSet<Button>,
    pub pointer_buttons: HashSet<PointerButton>,
    pub pointer_position: Vec2,
    pub scroll: f32,
}

impl DeviceSnapshot {
    pub fn is_down(&self, button: Button) -> bool {
        self.keys.contains(&button)
    }

    pub fn is_pointer_down(&self, button: PointerButton) -> bool {
        self.pointer_buttons.contains(&button)
    }

    pub fn with_key(mut self, button: Button) -> Self {
        self.keys.insert(button);
        self
    }

    pub fn with_pointer(mut self, button: PointerButton, position: Vec2) -> Self {
        self.pointer_buttons.insert(button);
        self.pointer_position = position;
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.pointer_position = position;
        self
    }

    pub fn scrolled(mut self, scroll: f32) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Controller for DeviceSnapshot {
    fn is_down(&self, button: Button) -> bool {
        DeviceSnapshot::is_down(self, button)
    }

    fn is_pointer_down(&self, button: PointerButton) -> bool {
        DeviceSnapshot::is_pointer_down(self, button)
    }

    fn snapshot(&self) -> DeviceSnapshot {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_hash() {
        let mut set = HashSet::new();
        set.insert(Button::KeyV);
        set.insert(Button::KeyT);
        set.insert(Button::KeyV);

        assert!(set.contains(&Button::KeyV));
        assert!(!set.contains(&Button::KeyR));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_snapshot_builder() {
        let snap = DeviceSnapshot::default()
            .with_key(Button::Shift)
            .with_pointer(PointerButton::Right, Vec2::new(10.0, 20.0))
            .scrolled(3.0);

        assert!(snap.is_down(Button::Shift));
        assert!(!snap.is_down(Button::KeyB));
        assert!(snap.is_pointer_down(PointerButton::Right));
        assert!(!snap.is_pointer_down(PointerButton::Middle));
        assert_eq!(snap.pointer_position, Vec2::new(10.0, 20.0));
        assert_eq!(snap.scroll, 3.0);
    }

    #[test]
    fn test_snapshot_is_a_controller() {
        let snap = DeviceSnapshot::default().with_key(Button::Escape);
        let controller: &dyn Controller = &snap;
        assert!(controller.is_down(Button::Escape));
        assert_eq!(controller.snapshot(), snap);
    }
}
