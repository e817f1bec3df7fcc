use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::clock::Clock;
use crate::corpus::SentenceEntry;
use crate::error::{Error, Result};
use crate::input::SurfaceEvent;
use crate::lock::{DebouncableLock, LockState, UnlockOutcome};
use crate::tokenizer::{count_words, tokenize, Separators, Token};

pub const DEFAULT_LOCK_TIME_MS: u64 = 500;
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 200;

/// Validated board settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSettings {
    pub lock_time: Duration,
    pub refresh_interval: Duration,
    pub separators: Separators,
}

impl BoardSettings {
    pub fn validate(&self) -> Result<()> {
        if self.lock_time.is_zero() {
            return Err(Error::invalid_config("lock time must be positive"));
        }
        if self.refresh_interval.is_zero() {
            return Err(Error::invalid_config("refresh interval must be positive"));
        }
        Ok(())
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            lock_time: Duration::from_millis(DEFAULT_LOCK_TIME_MS),
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            separators: Separators::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResultState {
    Succeed,
    Fail,
    Reset,
    Type,
    Interval,
}

/// Everything the board tells the session loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingResult {
    pub state: ResultState,
    pub user_text: String,
    pub stroke_count: u32,
    pub duration: Duration,
    /// Set when this reset closes out a failed attempt.
    pub is_failure_counted: bool,
}

impl TypingResult {
    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    pub fn word_count(&self, separators: &Separators) -> usize {
        count_words(&self.user_text, separators)
    }
}

/// How a token of the user's text should be highlighted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    /// Completed and equal to the goal.
    Passed,
    /// Completed or typed past the goal and wrong.
    Failed,
    /// The word being typed; still a prefix of its goal word.
    Typing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedToken {
    pub token: Token,
    pub highlight: Highlight,
}

#[derive(Clone, Debug, Default)]
struct UserProgress {
    text: String,
    tokens: Vec<Token>,
    stroke_count: u32,
    started_at: Option<Instant>,
}

impl UserProgress {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug)]
struct IntervalTimer {
    period: Duration,
    next_due: Instant,
}

impl IntervalTimer {
    fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    /// Ticks that arrive late coalesce into one firing.
    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }
}

/// The typing validator for one goal sentence at a time.
///
/// A round starts with the first scored stroke on empty text. Each time a
/// separator is typed, the text up to and including that separator is
/// compared against the goal tokens at the same positions. A mismatch locks
/// the board; typing the whole goal followed by a separator succeeds.
/// Words in progress are never judged.
///
/// Timers are plain deadlines owned by the board, checked on every event and
/// on [`Board::tick`]. Dropping the board drops them.
#[derive(Debug)]
pub struct Board<C: Clock + Clone> {
    clock: C,
    settings: BoardSettings,
    entry: SentenceEntry,
    goal: Vec<Token>,
    progress: UserProgress,
    lock: DebouncableLock<C>,
    interval: IntervalTimer,
}

impl<C: Clock + Clone> Board<C> {
    pub fn new(entry: SentenceEntry, settings: BoardSettings, clock: C) -> Result<Self> {
        settings.validate()?;
        let lock = DebouncableLock::new(settings.lock_time, clock.clone())?;
        let interval = IntervalTimer::new(settings.refresh_interval, clock.now());
        let goal = tokenize(&entry.sentence, &settings.separators);

        Ok(Self {
            clock,
            settings,
            entry,
            goal,
            progress: UserProgress::default(),
            lock,
            interval,
        })
    }

    /// Start over on a new goal sentence, dropping any attempt and lock.
    pub fn set_sentence(&mut self, entry: SentenceEntry) {
        self.goal = tokenize(&entry.sentence, &self.settings.separators);
        self.entry = entry;
        self.progress.clear();
        self.lock.reset();
        debug!(goal_tokens = self.goal.len(), "sentence loaded");
    }

    /// Replace the interval timer with one of the new period.
    pub fn set_refresh_interval(&mut self, period: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(Error::invalid_config("refresh interval must be positive"));
        }
        if period != self.settings.refresh_interval {
            self.settings.refresh_interval = period;
            self.interval = IntervalTimer::new(period, self.clock.now());
        }
        Ok(())
    }

    pub fn handle(&mut self, event: SurfaceEvent) -> Vec<TypingResult> {
        self.lock.poll();
        match event {
            SurfaceEvent::Input { value } => self.on_input(value),
            SurfaceEvent::KeyDown {
                is_first_stroke, ..
            } => {
                self.on_key_down(is_first_stroke);
                Vec::new()
            }
            SurfaceEvent::Forbidden { value } => {
                self.progress.stroke_count = 0;
                self.on_reset(value).into_iter().collect()
            }
            SurfaceEvent::Reset { value } => self.on_reset(value).into_iter().collect(),
        }
    }

    /// Advance timers. Emits an interval result while a round is live.
    pub fn tick(&mut self) -> Option<TypingResult> {
        self.lock.poll();
        let due = self.interval.fire(self.clock.now());
        if due && self.is_typable() && !self.progress.text.is_empty() {
            Some(self.result(ResultState::Interval, self.progress.text.clone()))
        } else {
            None
        }
    }

    fn on_key_down(&mut self, is_first_stroke: bool) {
        match self.lock.state() {
            LockState::Locked => {
                // Typing into a lock keeps it closed for another grace period.
                self.lock.unlock(|| {});
                return;
            }
            LockState::Unlockable => return,
            LockState::Unlocked => {}
        }

        let progress = &mut self.progress;
        if progress.text.is_empty() && (is_first_stroke || progress.started_at.is_none()) {
            progress.started_at = Some(self.clock.now());
            progress.stroke_count = 1;
            debug!("round started");
        } else {
            progress.stroke_count += 1;
        }
        trace!(strokes = progress.stroke_count, "stroke");
    }

    fn on_input(&mut self, value: String) -> Vec<TypingResult> {
        if !self.is_typable() {
            trace!("input ignored while not typable");
            return Vec::new();
        }

        self.progress.tokens = tokenize(&value, &self.settings.separators);
        self.progress.text = value;

        let mut results = vec![self.result(ResultState::Type, self.progress.text.clone())];

        match self.judge() {
            Judgement::Pending | Judgement::WordPassed => {}
            Judgement::Failed => {
                let result = self.result(ResultState::Fail, self.progress.text.clone());
                self.lock.lock();
                self.progress.started_at = None;
                info!(
                    text = %result.user_text,
                    strokes = result.stroke_count,
                    "word mismatch, board locked"
                );
                results.push(result);
            }
            Judgement::Succeeded => {
                let result = self.result(ResultState::Succeed, self.progress.text.clone());
                self.progress.clear();
                info!(
                    strokes = result.stroke_count,
                    duration_ms = result.duration_ms(),
                    "sentence completed"
                );
                results.push(result);
            }
        }

        results
    }

    fn on_reset(&mut self, value: String) -> Option<TypingResult> {
        match self.lock.state() {
            LockState::Unlocked => {
                let result = self.result(ResultState::Reset, value);
                self.progress.clear();
                debug!("attempt reset");
                Some(result)
            }
            LockState::Locked => {
                self.lock.unlock(|| {});
                None
            }
            LockState::Unlockable => {
                let mut result = self.result(ResultState::Reset, value);
                result.is_failure_counted = true;
                let progress = &mut self.progress;
                match self.lock.unlock(|| progress.clear()) {
                    UnlockOutcome::Released => Some(result),
                    UnlockOutcome::Extended | UnlockOutcome::Ignored => None,
                }
            }
        }
    }

    fn judge(&self) -> Judgement {
        let tokens = &self.progress.tokens;
        let n = tokens.len();
        if n < 2 || !tokens[n - 1].is_separator() {
            return Judgement::Pending;
        }

        // Words sit at even indices, so `word` is the word closed by the
        // separator that was just typed.
        let word = n - 2;
        let prefix_matches = self.goal.len() > word && self.goal[..=word] == tokens[..=word];
        let separator_matches = self
            .goal
            .get(word + 1)
            .map_or(true, |expected| *expected == tokens[word + 1]);

        if !(prefix_matches && separator_matches) {
            Judgement::Failed
        } else if word + 1 == self.goal.len() {
            Judgement::Succeeded
        } else {
            Judgement::WordPassed
        }
    }

    fn result(&self, state: ResultState, user_text: String) -> TypingResult {
        TypingResult {
            state,
            user_text,
            stroke_count: self.progress.stroke_count,
            duration: self.duration(),
            is_failure_counted: false,
        }
    }

    /// Elapsed round time, zero before the first stroke or after a failure.
    pub fn duration(&self) -> Duration {
        self.progress
            .started_at
            .map_or(Duration::ZERO, |start| {
                self.clock.now().saturating_duration_since(start)
            })
    }

    pub fn is_typable(&self) -> bool {
        !self.lock.is_locked()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn is_unlockable(&self) -> bool {
        self.lock.is_unlockable()
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    /// Grace time left before a failed attempt can be cleared.
    pub fn lock_remaining(&self) -> Option<Duration> {
        self.lock.remaining()
    }

    pub fn text(&self) -> &str {
        &self.progress.text
    }

    pub fn stroke_count(&self) -> u32 {
        self.progress.stroke_count
    }

    pub fn entry(&self) -> &SentenceEntry {
        &self.entry
    }

    pub fn goal(&self) -> &[Token] {
        &self.goal
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    /// Share of the goal sentence covered by the user's text, in `[0, 1]`.
    pub fn completion_ratio(&self) -> f64 {
        let goal_len = self.entry.sentence.chars().count();
        if goal_len == 0 {
            return 0.0;
        }
        let typed = self.progress.text.chars().count();
        (typed as f64 / goal_len as f64).clamp(0.0, 1.0)
    }

    /// The user's tokens with their pass/fail classification.
    pub fn marked_tokens(&self) -> Vec<MarkedToken> {
        let tokens = &self.progress.tokens;
        tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| {
                let expected = self.goal.get(idx);
                let in_progress = idx + 1 == tokens.len() && token.is_word();
                let highlight = match expected {
                    Some(goal) if in_progress && goal.content.starts_with(&token.content) => {
                        Highlight::Typing
                    }
                    Some(goal) if !in_progress && goal == token => Highlight::Passed,
                    _ => Highlight::Failed,
                };
                MarkedToken {
                    token: token.clone(),
                    highlight,
                }
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Judgement {
    Pending,
    WordPassed,
    Failed,
    Succeeded,
}
