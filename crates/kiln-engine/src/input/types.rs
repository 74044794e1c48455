use std::fmt;

macro_rules! keys {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Keyboard key identifier.
        ///
        /// The windowing layer maps physical key codes into these variants.
        /// Keys without a variant are carried as `Key::Unknown(code)`.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub enum Key {
            $($variant,)*
            /// Platform key not represented here.
            Unknown(u32),
        }

        impl Key {
            /// Every named key, in declaration order.
            pub const NAMED: &'static [Key] = &[$(Key::$variant,)*];

            /// Script-facing name, e.g. `"left"`, `"a"`, `"f1"`.
            pub fn name(&self) -> Option<&'static str> {
                match self {
                    $(Key::$variant => Some($name),)*
                    Key::Unknown(_) => None,
                }
            }
        }
    };
}

keys! {
    Escape => "escape",
    Enter => "return",
    Tab => "tab",
    Backspace => "backspace",
    Space => "space",

    Insert => "insert",
    Delete => "delete",
    Home => "home",
    End => "end",
    PageUp => "pageup",
    PageDown => "pagedown",

    ArrowUp => "up",
    ArrowDown => "down",
    ArrowLeft => "left",
    ArrowRight => "right",

    Shift => "shift",
    Control => "ctrl",
    Alt => "alt",
    Meta => "meta",

    A => "a", B => "b", C => "c", D => "d", E => "e", F => "f", G => "g",
    H => "h", I => "i", J => "j", K => "k", L => "l", M => "m", N => "n",
    O => "o", P => "p", Q => "q", R => "r", S => "s", T => "t", U => "u",
    V => "v", W => "w", X => "x", Y => "y", Z => "z",

    Digit0 => "0", Digit1 => "1", Digit2 => "2", Digit3 => "3", Digit4 => "4",
    Digit5 => "5", Digit6 => "6", Digit7 => "7", Digit8 => "8", Digit9 => "9",

    F1 => "f1", F2 => "f2", F3 => "f3", F4 => "f4", F5 => "f5", F6 => "f6",
    F7 => "f7", F8 => "f8", F9 => "f9", F10 => "f10", F11 => "f11", F12 => "f12",
}

impl Key {
    /// Case-insensitive lookup by script-facing name. `"enter"` is accepted
    /// as an alias of `"return"`.
    pub fn from_name(name: &str) -> Option<Key> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("enter") {
            return Some(Key::Enter);
        }
        Key::NAMED
            .iter()
            .copied()
            .find(|k| k.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:?}", self),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    pub fn is_pressed(self) -> bool {
        self == KeyState::Pressed
    }
}

/// Platform-agnostic events produced by the windowing layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputEvent {
    /// The window was asked to close or the event loop is shutting down.
    Quit,

    Key {
        key: Key,
        state: KeyState,
        /// Stable platform code when available.
        code: u32,
        /// True when the platform reports an auto-repeat.
        repeat: bool,
    },

    /// Window focus change.
    Focused(bool),
}
