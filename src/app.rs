use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

use crate::board::{Board, BoardSettings, TypingResult};
use crate::clock::{Clock, SystemClock};
use crate::corpus::Corpus;
use crate::error::Result;
use crate::input::{InputSurface, KeyStroke, SurfaceEvent};
use crate::keys::{is_chord, KeySets};
use crate::runtime::TypingEvent;
use crate::session::{Session, SessionAction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Quit,
}

/// A practice session: the corpus, the board typing against the current
/// sentence, the input surface in front of it and the statistics behind it.
///
/// The terminal only ever reports key presses, so every press runs the whole
/// browser-style sequence in one turn: key down, the resulting text change,
/// then key up. Afterwards the surface is told what the board now shows.
pub struct App<C: Clock + Clone = SystemClock> {
    pub state: AppState,
    corpus: Corpus,
    session: Session,
    board: Board<C>,
    surface: InputSurface,
}

impl<C: Clock + Clone> App<C> {
    pub fn new(corpus: Corpus, settings: BoardSettings, keys: KeySets, clock: C) -> Result<Self> {
        let session = Session::new(settings.separators.clone());
        let surface = InputSurface::new(keys, settings.separators.clone());
        let board = Board::new(corpus.current(), settings, clock)?;

        info!(sentences = corpus.len(), "session started");
        Ok(Self {
            state: AppState::Typing,
            corpus,
            session,
            board,
            surface,
        })
    }

    pub fn board(&self) -> &Board<C> {
        &self.board
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// 1-based position of the current sentence in the corpus.
    pub fn sentence_number(&self) -> usize {
        self.corpus.index() + 1
    }

    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quit
    }

    /// Returns true when the screen needs redrawing.
    pub fn handle_event(&mut self, event: TypingEvent) -> bool {
        match event {
            TypingEvent::Key(key) => {
                self.on_key(key);
                true
            }
            TypingEvent::Paste(text) => {
                // Pasted text never reaches the board; only typed keys count.
                debug!(chars = text.chars().count(), "paste ignored");
                false
            }
            TypingEvent::Resize => true,
            TypingEvent::Tick => self.on_tick(),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            info!(completed = self.session.completed(), "quit requested");
            self.state = AppState::Quit;
            return;
        }
        if key.code == KeyCode::Tab && key.modifiers.is_empty() {
            self.skip();
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.retry();
            return;
        }

        let stroke = KeyStroke::from(key);
        let disposition = self.surface.on_key_down(stroke);
        if let Some(event) = disposition.event {
            self.dispatch(event);
        }

        if !disposition.prevent_default && !is_chord(stroke.modifiers) {
            if let KeyCode::Char(c) = stroke.code {
                let mut text = self.board.text().to_string();
                text.push(c);
                if let Some(event) = self.surface.on_text(&text) {
                    self.dispatch(event);
                }
            }
        }

        if let Some(event) = self.surface.on_key_up(stroke) {
            self.dispatch(event);
        }
        self.sync_surface();
    }

    /// The retry control (Ctrl+R): clears the attempt, or a failure once it
    /// is unlockable.
    pub fn retry(&mut self) {
        let event = self.surface.retry();
        self.dispatch(event);
        self.sync_surface();
    }

    /// Returns true when something visible changed. The grace countdown
    /// counts, so every tick inside it redraws.
    pub fn on_tick(&mut self) -> bool {
        let was_unlockable = self.board.is_unlockable();
        let counting_down = self.board.lock_remaining().is_some();
        let result = self.board.tick();
        let changed =
            result.is_some() || counting_down || was_unlockable != self.board.is_unlockable();
        if let Some(result) = result {
            self.record(&result);
        }
        self.sync_surface();
        changed
    }

    /// Move on to the next sentence without finishing this one.
    pub fn skip(&mut self) {
        self.session.skip();
        self.next_sentence();
        self.sync_surface();
    }

    fn dispatch(&mut self, event: SurfaceEvent) {
        for result in self.board.handle(event) {
            self.record(&result);
        }
    }

    fn record(&mut self, result: &TypingResult) {
        if self.session.apply(result) == SessionAction::Advance {
            self.next_sentence();
        }
    }

    fn next_sentence(&mut self) {
        let entry = self.corpus.advance();
        debug!(index = self.corpus.index(), reference = %entry.reference, "next sentence");
        self.board.set_sentence(entry);
    }

    fn sync_surface(&mut self) {
        self.surface.sync_value(self.board.text());
        self.surface.set_enabled(self.board.is_typable());
        self.surface.set_failed(self.board.is_locked());
    }
}
