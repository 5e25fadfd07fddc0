use glam::Vec2;

use super::controller::{Button, PointerButton};
use crate::settings::{AccumulationMode, ViewMode};

/// Running integral of pointer motion while a button is held.
/// The value is an absolute state and never decays on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct DragControl {
    pub button: PointerButton,
    pub sensitivity: Vec2,
    value: Vec2,
    initial: Vec2,
}

impl DragControl {
    pub fn new(button: PointerButton, sensitivity: Vec2) -> Self {
        Self {
            button,
            sensitivity,
            value: Vec2::ZERO,
            initial: Vec2::ZERO,
        }
    }

    pub fn with_initial(mut self, initial: Vec2) -> Self {
        self.initial = initial;
        self.value = initial;
        self
    }

    pub fn value(&self) -> Vec2 {
        self.value
    }

    pub fn integrate(&mut self, delta: Vec2) {
        self.value += delta * self.sensitivity;
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }
}

/// Wheel-driven scalar, optionally clamped
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollControl {
    pub sensitivity: f32,
    bounds: Option<(f32, f32)>,
    value: f32,
    initial: f32,
}

impl ScrollControl {
    pub fn new(sensitivity: f32, initial: f32) -> Self {
        Self {
            sensitivity,
            bounds: None,
            value: initial,
            initial,
        }
    }

    pub fn clamped(mut self, min: f32, max: f32) -> Self {
        self.bounds = Some((min, max));
        self.value = self.value.clamp(min, max);
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn integrate(&mut self, delta: f32) {
        let value = self.value + delta * self.sensitivity;
        self.value = match self.bounds {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        };
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }
}

/// State that can be flipped by an edge-triggered key
pub trait Toggle {
    fn toggle(&mut self);
}

impl Toggle for bool {
    fn toggle(&mut self) {
        *self = !*self;
    }
}

impl Toggle for ViewMode {
    fn toggle(&mut self) {
        *self = self.flipped();
    }
}

impl Toggle for AccumulationMode {
    fn toggle(&mut self) {
        *self = self.next();
    }
}

/// Fires once when its key is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleControl {
    pub key: Button,
}

impl ToggleControl {
    pub const fn new(key: Button) -> Self {
        Self { key }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairMode {
    /// `increase` and `decrease` act independently
    Separate,
    /// `increase` alone steps up; `increase` together with `decrease` steps down
    Combo,
}

/// Bounded scalar stepped while its keys are held
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    pub increase: Button,
    pub decrease: Button,
    pub mode: PairMode,
    pub step: f32,
    bounds: Option<(f32, f32)>,
    value: f32,
    initial: f32,
}

impl KeyPair {
    pub fn new(increase: Button, decrease: Button, step: f32, initial: f32) -> Self {
        Self {
            increase,
            decrease,
            mode: PairMode::Separate,
            step,
            bounds: None,
            value: initial,
            initial,
        }
    }

    /// `key` steps up, `modifier + key` steps down
    pub fn combo(key: Button, modifier: Button, step: f32, initial: f32) -> Self {
        Self {
            mode: PairMode::Combo,
            ..Self::new(key, modifier, step, initial)
        }
    }

    pub fn clamped(mut self, min: f32, max: f32) -> Self {
        self.bounds = Some((min, max));
        self.value = self.value.clamp(min, max);
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set(&mut self, value: f32) {
        self.value = match self.bounds {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        };
    }

    pub fn increment(&mut self) {
        self.set(self.value + self.step);
    }

    pub fn decrement(&mut self) {
        self.set(self.value - self.step);
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_scales_by_sensitivity() {
        let mut drag = DragControl::new(PointerButton::Right, Vec2::new(0.5, 0.7));
        drag.integrate(Vec2::new(10.0, 10.0));
        assert_eq!(drag.value(), Vec2::new(5.0, 7.0));
    }

    #[test]
    fn drag_reset_returns_to_initial() {
        let mut drag = DragControl::new(PointerButton::Middle, Vec2::ONE).with_initial(Vec2::X);
        drag.integrate(Vec2::new(3.0, 4.0));
        drag.reset();
        assert_eq!(drag.value(), Vec2::X);
    }

    #[test]
    fn scroll_clamps() {
        let mut scroll = ScrollControl::new(0.5, -5.0).clamped(-60.0, -1.0);
        scroll.integrate(100.0);
        assert_eq!(scroll.value(), -1.0);
        scroll.integrate(-1000.0);
        assert_eq!(scroll.value(), -60.0);
        scroll.reset();
        assert_eq!(scroll.value(), -5.0);
    }

    #[test]
    fn toggles_flip_their_targets() {
        let mut flag = false;
        flag.toggle();
        assert!(flag);

        let mut view = ViewMode::PathTrace;
        view.toggle();
        assert_eq!(view, ViewMode::Raster);

        let mut mode = AccumulationMode::Weighted;
        mode.toggle();
        assert_eq!(mode, AccumulationMode::Off);
    }

    #[test]
    fn key_pair_respects_bounds() {
        let mut pair = KeyPair::new(Button::Equal, Button::Minus, 1.0, 1.0).clamped(1.0, 3.0);
        pair.decrement();
        assert_eq!(pair.value(), 1.0);
        pair.increment();
        pair.increment();
        pair.increment();
        assert_eq!(pair.value(), 3.0);
        pair.set(-4.0);
        assert_eq!(pair.value(), 1.0);
    }
}
