use super::state::SharedKeyStates;
use super::types::{InputEvent, Key, KeyState};

/// Source of platform-agnostic input events.
pub trait EventSource {
    /// Appends every event that arrived since the last poll. Never blocks.
    fn poll_events(&mut self, out: &mut Vec<InputEvent>);
}

/// Outcome of translating one event, or of draining a whole batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Translation {
    Continue,
    Terminate,
    KeyEvent { key: Key, state: KeyState },
}

/// Maps native input into loop termination or key-state updates.
pub struct InputTranslator {
    keys: SharedKeyStates,
    escape: Key,
    batch: Vec<InputEvent>,
}

impl InputTranslator {
    pub fn new(keys: SharedKeyStates) -> Self {
        Self {
            keys,
            escape: Key::Escape,
            batch: Vec::new(),
        }
    }

    /// Replaces the key whose initial press ends the run.
    pub fn with_escape_key(mut self, key: Key) -> Self {
        self.escape = key;
        self
    }

    pub fn keys(&self) -> &SharedKeyStates {
        &self.keys
    }

    /// Classifies a single event without side effects.
    pub fn translate(&self, event: &InputEvent) -> Translation {
        match *event {
            InputEvent::Quit => Translation::Terminate,
            InputEvent::Key { key, state: KeyState::Pressed, repeat: false, .. }
                if key == self.escape =>
            {
                Translation::Terminate
            }
            InputEvent::Key { key, state, .. } => Translation::KeyEvent { key, state },
            InputEvent::Focused(_) => Translation::Continue,
        }
    }

    /// Drains every pending event from `source`.
    ///
    /// Key transitions are written to the shared table in arrival order. The
    /// whole batch is consumed even when an early event asks to terminate, so
    /// key state stays in step with the platform. Returns `Terminate` if any
    /// event asked for it, `Continue` otherwise.
    pub fn drain<S>(&mut self, source: &mut S) -> Translation
    where
        S: EventSource + ?Sized,
    {
        self.batch.clear();
        source.poll_events(&mut self.batch);

        let mut outcome = Translation::Continue;
        for event in &self.batch {
            // Releases are never delivered for keys held while unfocused.
            if let InputEvent::Focused(false) = event {
                let released = self.keys.release_all();
                if released > 0 {
                    log::debug!("focus lost, released {released} held keys");
                }
                continue;
            }

            match self.translate(event) {
                Translation::Terminate => {
                    log::debug!("termination requested by {:?}", event);
                    outcome = Translation::Terminate;
                }
                Translation::KeyEvent { key, state } => self.keys.store(key, state),
                Translation::Continue => {}
            }
        }
        outcome
    }
}
