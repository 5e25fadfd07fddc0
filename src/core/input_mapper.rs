use glam::Vec2;

use super::controller::{Button, DeviceSnapshot, PointerButton};
use super::controls::{DragControl, KeyPair, PairMode, ScrollControl, Toggle, ToggleControl};

/// Double-buffered input polling.
///
/// `begin_tick` stores the new snapshot as current; `end_tick` promotes it to previous.
/// Every poll in between compares the same pair, so a tick never sees a half-updated state.
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    previous: DeviceSnapshot,
    current: DeviceSnapshot,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_tick(&mut self, snapshot: DeviceSnapshot) {
        self.current = snapshot;
    }

    pub fn end_tick(&mut self) {
        self.previous = self.current.clone();
    }

    pub fn previous(&self) -> &DeviceSnapshot {
        &self.previous
    }

    pub fn current(&self) -> &DeviceSnapshot {
        &self.current
    }

    pub fn key_held(&self, button: Button) -> bool {
        self.previous.is_down(button) && self.current.is_down(button)
    }

    pub fn pointer_held(&self, button: PointerButton) -> bool {
        self.previous.is_pointer_down(button) && self.current.is_pointer_down(button)
    }

    /// Down last tick, up this tick
    pub fn key_released(&self, button: Button) -> bool {
        self.previous.is_down(button) && !self.current.is_down(button)
    }

    /// Escape or controller back, checked against the current snapshot
    pub fn exit_requested(&self) -> bool {
        self.current.is_down(Button::Escape) || self.current.is_down(Button::GamepadBack)
    }

    /// Integrates pointer motion into `control` when its button is held across both snapshots.
    /// Returns the new value on active ticks.
    pub fn poll_drag(&self, control: &mut DragControl) -> Option<Vec2> {
        if !self.pointer_held(control.button) {
            return None;
        }
        control.integrate(self.current.pointer_position - self.previous.pointer_position);
        Some(control.value())
    }

    /// Integrates the wheel movement between snapshots
    pub fn poll_scroll(&self, control: &mut ScrollControl) -> Option<f32> {
        let delta = self.current.scroll - self.previous.scroll;
        if delta == 0.0 {
            return None;
        }
        control.integrate(delta);
        Some(control.value())
    }

    /// Flips `target` on a falling edge of the control's key
    pub fn poll_toggle<T: Toggle>(&self, control: &ToggleControl, target: &mut T) -> bool {
        if self.key_released(control.key) {
            target.toggle();
            true
        } else {
            false
        }
    }

    /// Steps `pair` for held keys. Returns the new value when it moved.
    pub fn poll_key_pair(&self, pair: &mut KeyPair) -> Option<f32> {
        let before = pair.value();
        let increase = self.key_held(pair.increase);
        let decrease = self.key_held(pair.decrease);

        match pair.mode {
            PairMode::Combo => {
                if increase && decrease {
                    pair.decrement();
                } else if increase {
                    pair.increment();
                }
            }
            PairMode::Separate => {
                if increase {
                    pair.increment();
                }
                if decrease {
                    pair.decrement();
                }
            }
        }

        (pair.value() != before).then(|| pair.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(mapper: &mut InputMapper, snapshot: DeviceSnapshot) {
        mapper.end_tick();
        mapper.begin_tick(snapshot);
    }

    #[test]
    fn first_press_is_not_a_drag() {
        let mut mapper = InputMapper::new();
        let mut drag = DragControl::new(PointerButton::Right, Vec2::ONE);
        mapper.begin_tick(DeviceSnapshot::default().with_pointer(PointerButton::Right, Vec2::new(5.0, 5.0)));
        assert_eq!(mapper.poll_drag(&mut drag), None);
        assert_eq!(drag.value(), Vec2::ZERO);
    }

    #[test]
    fn released_key_fires_once() {
        let mut mapper = InputMapper::new();
        let mut flag = false;
        let toggle = ToggleControl::new(Button::KeyV);

        mapper.begin_tick(DeviceSnapshot::default().with_key(Button::KeyV));
        assert!(!mapper.poll_toggle(&toggle, &mut flag));
        tick(&mut mapper, DeviceSnapshot::default());
        assert!(mapper.poll_toggle(&toggle, &mut flag));
        tick(&mut mapper, DeviceSnapshot::default());
        assert!(!mapper.poll_toggle(&toggle, &mut flag));
        assert!(flag);
    }

    #[test]
    fn combo_prefers_decrement() {
        let mut mapper = InputMapper::new();
        let mut pair = KeyPair::combo(Button::KeyB, Button::Shift, 1.0, 3.0);
        let both = DeviceSnapshot::default().with_key(Button::KeyB).with_key(Button::Shift);

        mapper.begin_tick(both.clone());
        tick(&mut mapper, both);
        assert_eq!(mapper.poll_key_pair(&mut pair), Some(2.0));
    }

    #[test]
    fn modifier_alone_does_nothing_in_combo() {
        let mut mapper = InputMapper::new();
        let mut pair = KeyPair::combo(Button::KeyB, Button::Shift, 1.0, 3.0);
        let shift = DeviceSnapshot::default().with_key(Button::Shift);

        mapper.begin_tick(shift.clone());
        tick(&mut mapper, shift);
        assert_eq!(mapper.poll_key_pair(&mut pair), None);
        assert_eq!(pair.value(), 3.0);
    }

    #[test]
    fn scroll_integrates_only_on_change() {
        let mut mapper = InputMapper::new();
        let mut zoom = ScrollControl::new(0.5, -5.0);

        mapper.begin_tick(DeviceSnapshot::default().scrolled(2.0));
        assert_eq!(mapper.poll_scroll(&mut zoom), Some(-4.0));
        tick(&mut mapper, DeviceSnapshot::default().scrolled(2.0));
        assert_eq!(mapper.poll_scroll(&mut zoom), None);
    }

    #[test]
    fn exit_on_escape_or_back() {
        let mut mapper = InputMapper::new();
        mapper.begin_tick(DeviceSnapshot::default().with_key(Button::GamepadBack));
        assert!(mapper.exit_requested());
        mapper.begin_tick(DeviceSnapshot::default());
        assert!(!mapper.exit_requested());
    }
}
