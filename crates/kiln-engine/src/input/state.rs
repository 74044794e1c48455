use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::types::{Key, KeyState};

/// Last reported state per key.
///
/// Written by the input translator, read by script bindings. Last state wins;
/// there is no de-duplication beyond overwrite.
#[derive(Debug, Default)]
pub struct KeyStates {
    states: HashMap<Key, KeyState>,
}

impl KeyStates {
    pub fn store(&mut self, key: Key, state: KeyState) {
        self.states.insert(key, state);
    }

    pub fn get(&self, key: Key) -> Option<KeyState> {
        self.states.get(&key).copied()
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.get(key).is_some_and(KeyState::is_pressed)
    }

    /// Marks every held key as released; returns how many were held.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for state in self.states.values_mut() {
            if state.is_pressed() {
                *state = KeyState::Released;
                released += 1;
            }
        }
        released
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Shared handle to a [`KeyStates`] table.
///
/// Everything runs on one thread, so `Rc<RefCell<_>>` is enough; borrows are
/// never held across a call into the script environment.
#[derive(Debug, Clone, Default)]
pub struct SharedKeyStates(Rc<RefCell<KeyStates>>);

impl SharedKeyStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, key: Key, state: KeyState) {
        self.0.borrow_mut().store(key, state);
    }

    pub fn get(&self, key: Key) -> Option<KeyState> {
        self.0.borrow().get(key)
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.0.borrow().is_down(key)
    }

    pub fn release_all(&self) -> usize {
        self.0.borrow_mut().release_all()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
