// Key classification tables, expressed over crossterm key codes.
use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyModifiers, MediaKeyCode, ModifierKeyCode};

const ARROWS: [KeyCode; 4] = [KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right];

const CONTROL_PAD: [KeyCode; 6] = [
    KeyCode::Delete,
    KeyCode::End,
    KeyCode::Home,
    KeyCode::Insert,
    KeyCode::PageDown,
    KeyCode::PageUp,
];

const MEDIA_KEYS: [MediaKeyCode; 13] = [
    MediaKeyCode::Play,
    MediaKeyCode::Pause,
    MediaKeyCode::PlayPause,
    MediaKeyCode::Reverse,
    MediaKeyCode::Stop,
    MediaKeyCode::FastForward,
    MediaKeyCode::Rewind,
    MediaKeyCode::TrackNext,
    MediaKeyCode::TrackPrevious,
    MediaKeyCode::Record,
    MediaKeyCode::LowerVolume,
    MediaKeyCode::RaiseVolume,
    MediaKeyCode::MuteVolume,
];

const MODIFIER_KEYS: [ModifierKeyCode; 14] = [
    ModifierKeyCode::LeftShift,
    ModifierKeyCode::LeftControl,
    ModifierKeyCode::LeftAlt,
    ModifierKeyCode::LeftSuper,
    ModifierKeyCode::LeftHyper,
    ModifierKeyCode::LeftMeta,
    ModifierKeyCode::RightShift,
    ModifierKeyCode::RightControl,
    ModifierKeyCode::RightAlt,
    ModifierKeyCode::RightSuper,
    ModifierKeyCode::RightHyper,
    ModifierKeyCode::RightMeta,
    ModifierKeyCode::IsoLevel3Shift,
    ModifierKeyCode::IsoLevel5Shift,
];

/// Immutable key tables handed to the input surface at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySets {
    /// Keys whose default editing action is cancelled.
    pub invalid: HashSet<KeyCode>,
    /// Keys that abandon the attempt instead of scoring.
    pub forbidden: HashSet<KeyCode>,
    /// Keys that never count as a stroke.
    pub zero_stroke: HashSet<KeyCode>,
    /// Keys that always ask for a reset.
    pub reset: HashSet<KeyCode>,
    /// Keys that clear a failed attempt once it is unlockable.
    pub unlock: HashSet<KeyCode>,
    /// Keys that confirm an in-progress composition.
    pub submit: HashSet<KeyCode>,
}

impl KeySets {
    pub fn is_invalid(&self, code: &KeyCode) -> bool {
        self.invalid.contains(code)
    }

    pub fn is_forbidden(&self, code: &KeyCode) -> bool {
        self.forbidden.contains(code)
    }

    pub fn is_zero_stroke(&self, code: &KeyCode) -> bool {
        self.zero_stroke.contains(code)
    }

    pub fn is_reset(&self, code: &KeyCode) -> bool {
        self.reset.contains(code)
    }

    pub fn is_unlock(&self, code: &KeyCode) -> bool {
        self.unlock.contains(code)
    }

    pub fn is_submit(&self, code: &KeyCode) -> bool {
        self.submit.contains(code)
    }
}

impl Default for KeySets {
    fn default() -> Self {
        let invalid = [KeyCode::Backspace]
            .into_iter()
            .chain(CONTROL_PAD)
            .chain(ARROWS)
            .collect();

        let forbidden = [KeyCode::Backspace, KeyCode::Delete].into_iter().collect();

        let zero_stroke = [
            KeyCode::Backspace,
            KeyCode::CapsLock,
            KeyCode::Menu,
            KeyCode::Enter,
            KeyCode::Tab,
            KeyCode::BackTab,
            KeyCode::NumLock,
            KeyCode::Esc,
            KeyCode::Pause,
            KeyCode::PrintScreen,
            KeyCode::ScrollLock,
            KeyCode::KeypadBegin,
            KeyCode::Null,
        ]
        .into_iter()
        .chain(CONTROL_PAD)
        .chain(ARROWS)
        .chain((1..=24).map(KeyCode::F))
        .chain(MEDIA_KEYS.into_iter().map(KeyCode::Media))
        .chain(MODIFIER_KEYS.into_iter().map(KeyCode::Modifier))
        .collect();

        let reset = [KeyCode::Esc].into_iter().collect();

        let unlock = [KeyCode::Enter, KeyCode::Char(' '), KeyCode::Esc]
            .into_iter()
            .collect();

        let submit = [KeyCode::Enter].into_iter().collect();

        Self {
            invalid,
            forbidden,
            zero_stroke,
            reset,
            unlock,
            submit,
        }
    }
}

/// Ctrl/Super/Meta chords never type text.
pub fn is_chord(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META)
}
