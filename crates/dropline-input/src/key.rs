#![forbid(unsafe_code)]

//! Minimal key model for keyboard drags.
//!
//! Hosts translate their native key events into [`KeyEvent`]; only the keys
//! the keyboard controller cares about get dedicated codes.

use bitflags::bitflags;

/// A key press delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Key press without modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyCode {
    /// A character key. Letters are compared case-insensitively by chords.
    Char(char),
    Enter,
    Space,
    Escape,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A key plus the exact modifier set that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyChord {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether `event` triggers this chord.
    ///
    /// Modifiers must match exactly; `Shift` is ignored for character keys
    /// so `Alt+M` and `Alt+Shift+M` both match.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                a.eq_ignore_ascii_case(&b)
                    && self.modifiers.difference(Modifiers::SHIFT)
                        == event.modifiers.difference(Modifiers::SHIFT)
            }
            (a, b) => a == b && self.modifiers == event.modifiers,
        }
    }

    /// Whether this chord collides with the keys that activate controls.
    #[must_use]
    pub fn is_activation_key(&self) -> bool {
        match self.code {
            KeyCode::Enter | KeyCode::Space => self.modifiers.is_empty(),
            // Character chords ignore Shift, so Shift+' ' still fires on a bare space.
            KeyCode::Char(' ') => self.modifiers.difference(Modifiers::SHIFT).is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_matches_exact_modifiers() {
        let chord = KeyChord::new(KeyCode::Char('m'), Modifiers::ALT);
        assert!(chord.matches(&KeyEvent::new(KeyCode::Char('m')).with_modifiers(Modifiers::ALT)));
        assert!(chord.matches(
            &KeyEvent::new(KeyCode::Char('M')).with_modifiers(Modifiers::ALT | Modifiers::SHIFT)
        ));
        assert!(!chord.matches(&KeyEvent::new(KeyCode::Char('m'))));
        assert!(!chord.matches(
            &KeyEvent::new(KeyCode::Char('m')).with_modifiers(Modifiers::ALT | Modifiers::CTRL)
        ));
    }

    #[test]
    fn named_keys_compare_modifiers_strictly() {
        let chord = KeyChord::new(KeyCode::Enter, Modifiers::NONE);
        assert!(chord.matches(&KeyCode::Enter.into()));
        assert!(!chord.matches(&KeyEvent::new(KeyCode::Enter).with_modifiers(Modifiers::SHIFT)));
        assert!(chord.is_activation_key());
        assert!(!KeyChord::new(KeyCode::Char('m'), Modifiers::ALT).is_activation_key());
    }

    #[test]
    fn space_as_character_is_an_activation_key() {
        assert!(KeyChord::new(KeyCode::Char(' '), Modifiers::NONE).is_activation_key());
        assert!(KeyChord::new(KeyCode::Char(' '), Modifiers::SHIFT).is_activation_key());
        assert!(!KeyChord::new(KeyCode::Char(' '), Modifiers::ALT).is_activation_key());
        assert!(!KeyChord::new(KeyCode::Space, Modifiers::SHIFT).is_activation_key());
    }
}
