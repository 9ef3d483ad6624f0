//! Selection state machine: which menu entry is current and what an input
//! event does to it.

extern crate alloc;

use alloc::string::String;
use log::debug;

use crate::catalog::{Action, Catalog, MenuItem, SETTINGS_PATH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    MoveNext,
    MovePrevious,
    JumpToPrefix(char),
    Activate,
    Reload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Transitioning,
}

/// What the caller has to do after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed.
    Ignored,
    /// The index moved one step; animate in `Direction`.
    Moved(Direction),
    /// A prefix matched. `None` when it matched the current entry.
    Jumped(Option<Direction>),
    ToggleSound,
    Reload,
    /// Hand the device to the program at this path.
    Launch(String),
}

#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    current_index: usize,
    previous_index: usize,
    pending_direction: Option<Direction>,
    phase: Phase,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn previous_index(&self) -> usize {
        self.previous_index
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn handle(&mut self, event: Event, catalog: &Catalog) -> Outcome {
        let len = catalog.len();
        let outcome = match event {
            Event::MoveNext => {
                self.current_index += 1;
                self.begin(Direction::Forward);
                Outcome::Moved(Direction::Forward)
            }
            Event::MovePrevious => {
                self.current_index = (self.current_index + len - 1) % len;
                self.begin(Direction::Backward);
                Outcome::Moved(Direction::Backward)
            }
            Event::JumpToPrefix(prefix) => match catalog.find_prefix(prefix) {
                Some(target) => {
                    let direction = match target.cmp(&self.current_index) {
                        core::cmp::Ordering::Greater => Some(Direction::Forward),
                        core::cmp::Ordering::Less => Some(Direction::Backward),
                        core::cmp::Ordering::Equal => None,
                    };
                    self.current_index = target;
                    if let Some(direction) = direction {
                        self.begin(direction);
                    }
                    Outcome::Jumped(direction)
                }
                None => Outcome::Ignored,
            },
            Event::Activate => self.activate(catalog),
            Event::Reload => Outcome::Reload,
        };
        self.current_index %= len;
        debug!("{:?} -> index {} ({:?})", event, self.current_index, outcome);
        outcome
    }

    fn activate(&self, catalog: &Catalog) -> Outcome {
        match catalog.item(self.current_index) {
            Some(MenuItem::App(entry)) => Outcome::Launch(entry.path.clone()),
            Some(MenuItem::Action(Action::OpenSettings)) => Outcome::Launch(String::from(SETTINGS_PATH)),
            Some(MenuItem::Action(Action::ToggleSound)) => Outcome::ToggleSound,
            Some(MenuItem::Action(Action::Reload)) => Outcome::Reload,
            None => Outcome::Ignored,
        }
    }

    fn begin(&mut self, direction: Direction) {
        self.pending_direction = Some(direction);
        self.phase = Phase::Transitioning;
    }

    /// Called once the animation has settled.
    pub fn settle(&mut self) {
        self.pending_direction = None;
        self.phase = Phase::Idle;
    }

    /// Back to the first entry after the catalog was rebuilt.
    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    /// Records the index the last rendered frame showed.
    pub fn end_frame(&mut self) {
        self.previous_index = self.current_index;
    }

    /// True when the index changed since the last rendered frame.
    pub fn index_changed(&self) -> bool {
        self.current_index != self.previous_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::scan;
    use crate::fs::mock::MemFs;

    fn catalog(files: &[&str]) -> Catalog {
        scan(&mut MemFs::flash(files), &mut MemFs::no_card())
    }

    #[test]
    fn test_move_next_wraps_to_zero() {
        let catalog = catalog(&["Chess.py", "Clock.py"]);
        let mut state = SelectionState::new();
        for _ in 0..catalog.len() - 1 {
            state.handle(Event::MoveNext, &catalog);
        }
        assert_eq!(state.current_index(), catalog.len() - 1);
        assert_eq!(state.handle(Event::MoveNext, &catalog), Outcome::Moved(Direction::Forward));
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.phase(), Phase::Transitioning);
    }

    #[test]
    fn test_move_previous_wraps_to_last() {
        let catalog = catalog(&[]);
        let mut state = SelectionState::new();
        state.handle(Event::MovePrevious, &catalog);
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.pending_direction(), Some(Direction::Backward));
    }

    #[test]
    fn test_index_stays_in_range() {
        let catalog = catalog(&["A.py"]);
        let mut state = SelectionState::new();
        let pattern = [Event::MoveNext, Event::MoveNext, Event::MovePrevious, Event::MoveNext];
        for event in pattern.iter().cycle().take(57) {
            state.handle(*event, &catalog);
            assert!(state.current_index() < catalog.len());
        }
    }

    #[test]
    fn test_jump_direction_follows_index_delta() {
        let catalog = catalog(&["Alpha.py", "Beta.py", "Gamma.py"]);
        let mut state = SelectionState::new();
        assert_eq!(
            state.handle(Event::JumpToPrefix('g'), &catalog),
            Outcome::Jumped(Some(Direction::Forward))
        );
        assert_eq!(state.current_index(), 2);
        assert_eq!(
            state.handle(Event::JumpToPrefix('a'), &catalog),
            Outcome::Jumped(Some(Direction::Backward))
        );
        assert_eq!(state.handle(Event::JumpToPrefix('a'), &catalog), Outcome::Jumped(None));
        assert_eq!(state.handle(Event::JumpToPrefix('q'), &catalog), Outcome::Ignored);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_activate_dispatch() {
        let catalog = catalog(&["Chess.py"]);
        let mut state = SelectionState::new();
        assert_eq!(
            state.handle(Event::Activate, &catalog),
            Outcome::Launch("/apps/Chess.py".into())
        );
        state.handle(Event::MoveNext, &catalog);
        assert_eq!(state.handle(Event::Activate, &catalog), Outcome::Reload);
        state.handle(Event::MoveNext, &catalog);
        assert_eq!(state.handle(Event::Activate, &catalog), Outcome::ToggleSound);
        state.handle(Event::MoveNext, &catalog);
        assert_eq!(
            state.handle(Event::Activate, &catalog),
            Outcome::Launch(SETTINGS_PATH.into())
        );
    }

    #[test]
    fn test_settle_and_frame_tracking() {
        let catalog = catalog(&[]);
        let mut state = SelectionState::new();
        state.handle(Event::MoveNext, &catalog);
        assert!(state.index_changed());
        state.end_frame();
        assert!(!state.index_changed());
        state.settle();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.pending_direction(), None);
    }
}
