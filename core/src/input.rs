use heapless::Vec;

use crate::selection::Event;

/// Most keys a keyboard scan reports at once.
pub const MAX_KEYS: usize = 8;

pub type KeySet = Vec<Key, MAX_KEYS>;

/// Logical keys, already decoded from scan codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// `/` on the device keyboard.
    Forward,
    /// `,` on the device keyboard.
    Backward,
    Go,
    Enter,
    Char(char),
    Other,
}

pub trait Keyboard {
    /// Keys held down right now.
    fn held_keys(&mut self) -> KeySet;
}

#[derive(Clone, Debug, Default)]
pub struct KeyState {
    current: KeySet,
    previous: KeySet,
}

impl KeyState {
    pub fn update(&mut self, current: KeySet) {
        self.previous = core::mem::replace(&mut self.current, current);
    }

    /// Keys down now that were not down on the previous scan.
    pub fn pressed(&self) -> impl Iterator<Item = Key> + '_ {
        self.current
            .iter()
            .copied()
            .filter(|key| !self.previous.contains(key))
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.current.contains(&key) && !self.previous.contains(&key)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.current.contains(&key) && self.previous.contains(&key)
    }

    /// Events for this scan, in the order they apply: at most one move,
    /// then either an activation or prefix jumps.
    pub fn events(&self) -> Vec<Event, MAX_KEYS> {
        let mut events = Vec::new();
        if self.is_pressed(Key::Forward) {
            let _ = events.push(Event::MoveNext);
        } else if self.is_pressed(Key::Backward) {
            let _ = events.push(Event::MovePrevious);
        }

        if self.is_pressed(Key::Go) || self.is_pressed(Key::Enter) {
            let _ = events.push(Event::Activate);
        } else {
            for key in self.pressed() {
                if let Key::Char(c) = key
                    && c.is_ascii_alphanumeric()
                {
                    let _ = events.push(Event::JumpToPrefix(c.to_ascii_lowercase()));
                }
            }
        }
        events
    }
}
