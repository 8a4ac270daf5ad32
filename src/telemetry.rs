//! Optional fire-and-forget observers of a running animation.

use crate::item::Value;

/// Callbacks for on-screen or audible telemetry. Each is independently
/// optional and an unset hook costs nothing.
#[derive(Default)]
pub struct Telemetry {
    /// Called with the algorithm name before a run starts.
    pub algorithm_name: Option<Box<dyn FnMut(&str)>>,
    /// Called with the value of every paced access and both compared values.
    pub access_sound: Option<Box<dyn FnMut(Value)>>,
    /// Called after every pacing step.
    pub delay_step: Option<Box<dyn FnMut()>>,
    /// Called with the comparison counter after every comparison.
    pub comparison_count: Option<Box<dyn FnMut(usize)>>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_algorithm_name(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.algorithm_name = Some(Box::new(f));
        self
    }

    pub fn on_access_sound(mut self, f: impl FnMut(Value) + 'static) -> Self {
        self.access_sound = Some(Box::new(f));
        self
    }

    pub fn on_delay_step(mut self, f: impl FnMut() + 'static) -> Self {
        self.delay_step = Some(Box::new(f));
        self
    }

    pub fn on_comparison_count(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.comparison_count = Some(Box::new(f));
        self
    }

    pub(crate) fn announce(&mut self, name: &str) {
        if let Some(f) = self.algorithm_name.as_mut() {
            f(name);
        }
    }

    pub(crate) fn sound(&mut self, value: Value) {
        if let Some(f) = self.access_sound.as_mut() {
            f(value);
        }
    }

    pub(crate) fn step(&mut self) {
        if let Some(f) = self.delay_step.as_mut() {
            f();
        }
    }

    pub(crate) fn count(&mut self, n: usize) {
        if let Some(f) = self.comparison_count.as_mut() {
            f(n);
        }
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("algorithm_name", &self.algorithm_name.is_some())
            .field("access_sound", &self.access_sound.is_some())
            .field("delay_step", &self.delay_step.is_some())
            .field("comparison_count", &self.comparison_count.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unset_hooks_are_noops() {
        let mut t = Telemetry::new();
        t.announce("x");
        t.sound(1);
        t.step();
        t.count(3);
    }

    #[test]
    fn set_hooks_fire() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let mut t = Telemetry::new().on_comparison_count(move |n| s.borrow_mut().push(n));
        t.count(1);
        t.count(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert!(format!("{:?}", t).contains("comparison_count: true"));
    }
}
