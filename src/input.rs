use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::keys::{is_chord, KeySets};
use crate::tokenizer::Separators;

/// A raw key press, as reported by the host terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyStroke {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    /// Auto-repeat from a held key.
    pub repeat: bool,
    /// An input method is mid-composition.
    pub composing: bool,
}

impl KeyStroke {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
            repeat: false,
            composing: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn composing(mut self) -> Self {
        self.composing = true;
        self
    }
}

impl From<KeyEvent> for KeyStroke {
    fn from(key: KeyEvent) -> Self {
        Self {
            code: key.code,
            modifiers: key.modifiers,
            repeat: key.kind == KeyEventKind::Repeat,
            composing: false,
        }
    }
}

/// Normalized events the board consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The visible text changed.
    Input { value: String },
    /// A scored keystroke.
    KeyDown {
        code: KeyCode,
        value: String,
        is_first_stroke: bool,
    },
    /// A forbidden key (backspace and friends) was pressed.
    Forbidden { value: String },
    /// The user asked to clear the attempt.
    Reset { value: String },
}

/// What the host should do with a key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDisposition {
    /// Skip the key's normal editing effect on the text.
    pub prevent_default: bool,
    pub event: Option<SurfaceEvent>,
}

/// Turns raw key and text events into [`SurfaceEvent`]s.
///
/// Holds no validation logic. The only state is whether the current text has
/// been stroked yet and the last value the host reported, both updated before
/// an event leaves.
#[derive(Debug, Clone)]
pub struct InputSurface {
    keys: KeySets,
    separators: Separators,
    enabled: bool,
    failed: bool,
    has_been_stroked: bool,
    last_value: String,
}

impl InputSurface {
    pub fn new(keys: KeySets, separators: Separators) -> Self {
        Self {
            keys,
            separators,
            enabled: true,
            failed: false,
            has_been_stroked: false,
            last_value: String::new(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_failed(&mut self, failed: bool) {
        self.failed = failed;
    }

    pub fn has_been_stroked(&self) -> bool {
        self.has_been_stroked
    }

    /// Mirror the text the host currently shows.
    pub fn sync_value(&mut self, value: &str) {
        if value.is_empty() {
            self.has_been_stroked = false;
        }
        if self.last_value != value {
            self.last_value = value.to_string();
        }
    }

    pub fn on_text(&mut self, text: &str) -> Option<SurfaceEvent> {
        if !self.enabled || self.separators.is_lone_separator(text) || is_line_break(text) {
            return None;
        }
        self.last_value = text.to_string();
        Some(SurfaceEvent::Input {
            value: self.last_value.clone(),
        })
    }

    pub fn on_key_down(&mut self, stroke: KeyStroke) -> KeyDisposition {
        if !self.enabled {
            // Forwarded so a locked board can extend its grace period.
            return KeyDisposition {
                prevent_default: true,
                event: Some(SurfaceEvent::KeyDown {
                    code: stroke.code,
                    value: self.last_value.clone(),
                    is_first_stroke: false,
                }),
            };
        }

        let chord = is_chord(stroke.modifiers);
        let prevent_default = chord || self.keys.is_invalid(&stroke.code);

        if self.keys.is_forbidden(&stroke.code) {
            self.has_been_stroked = false;
            return KeyDisposition {
                prevent_default,
                event: Some(SurfaceEvent::Forbidden {
                    value: self.last_value.clone(),
                }),
            };
        }

        let composing_submit = stroke.composing && self.keys.is_submit(&stroke.code);
        let scored =
            !stroke.repeat && !chord && !composing_submit && !self.keys.is_zero_stroke(&stroke.code);

        let event = scored.then(|| {
            let is_first_stroke = !self.has_been_stroked;
            self.has_been_stroked = true;
            SurfaceEvent::KeyDown {
                code: stroke.code,
                value: self.last_value.clone(),
                is_first_stroke,
            }
        });

        KeyDisposition {
            prevent_default,
            event,
        }
    }

    pub fn on_key_up(&mut self, stroke: KeyStroke) -> Option<SurfaceEvent> {
        if self.failed && self.keys.is_unlock(&stroke.code) {
            self.has_been_stroked = false;
            Some(self.reset_event())
        } else if self.keys.is_reset(&stroke.code) {
            Some(self.reset_event())
        } else {
            None
        }
    }

    /// The retry control next to the text.
    pub fn retry(&mut self) -> SurfaceEvent {
        self.has_been_stroked = false;
        self.reset_event()
    }

    fn reset_event(&self) -> SurfaceEvent {
        SurfaceEvent::Reset {
            value: self.last_value.clone(),
        }
    }
}

impl Default for InputSurface {
    fn default() -> Self {
        Self::new(KeySets::default(), Separators::default())
    }
}

fn is_line_break(text: &str) -> bool {
    matches!(text, "\n" | "\r\n" | "\r")
}
