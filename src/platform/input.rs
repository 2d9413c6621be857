//! Keyboard bridge
//!
//! Front ends send key-down and key-up events, plus a periodic snapshot of
//! every held key. The bridge keeps the held state and debounces fire so a
//! held or mashed space bar registers at most once per cooldown window.

use crate::sim::Controls;

/// Keys the games care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Thrust,
    Fire,
}

impl Key {
    /// Map a DOM-style key name. Unknown keys are ignored by the caller.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "left" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "right" | "d" | "D" => Some(Key::Right),
            "ArrowUp" | "up" | "w" | "W" => Some(Key::Thrust),
            " " | "space" | "Space" => Some(Key::Fire),
            _ => None,
        }
    }
}

/// One event from the front end, timestamped in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
    /// Periodic snapshot of every held key
    State {
        left: bool,
        right: bool,
        up: bool,
        space: bool,
    },
}

#[derive(Debug, Clone)]
pub struct InputBridge {
    left: bool,
    right: bool,
    thrust: bool,
    fire_held: bool,
    /// A registered fire press not yet handed to a tick
    fire_pending: bool,
    last_fire_ms: Option<u64>,
    cooldown_ms: u64,
}

impl Default for InputBridge {
    fn default() -> Self {
        Self::new(300)
    }
}

impl InputBridge {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            left: false,
            right: false,
            thrust: false,
            fire_held: false,
            fire_pending: false,
            last_fire_ms: None,
            cooldown_ms,
        }
    }

    pub fn handle(&mut self, event: KeyEvent, at_ms: u64) {
        match event {
            KeyEvent::Down(key) => self.set(key, true, at_ms),
            KeyEvent::Up(key) => self.set(key, false, at_ms),
            KeyEvent::State {
                left,
                right,
                up,
                space,
            } => {
                self.left = left;
                self.right = right;
                self.thrust = up;
                // Snapshots never fire on their own; only a key-down does
                self.fire_held = space;
            }
        }
    }

    /// Controls for the next tick. A registered fire press is consumed.
    pub fn controls(&mut self) -> Controls {
        let fire = std::mem::take(&mut self.fire_pending);
        Controls {
            left: self.left,
            right: self.right,
            thrust: self.thrust,
            fire,
        }
    }

    fn set(&mut self, key: Key, down: bool, at_ms: u64) {
        match key {
            Key::Left => self.left = down,
            Key::Right => self.right = down,
            Key::Thrust => self.thrust = down,
            Key::Fire => {
                if down && self.cooldown_elapsed(at_ms) {
                    self.fire_pending = true;
                    self.last_fire_ms = Some(at_ms);
                }
                self.fire_held = down;
            }
        }
    }

    fn cooldown_elapsed(&self, at_ms: u64) -> bool {
        self.last_fire_ms
            .is_none_or(|last| at_ms.saturating_sub(last) > self.cooldown_ms)
    }

    pub fn fire_held(&self) -> bool {
        self.fire_held
    }
}
