use std::rc::Rc;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::board::{ResultState, TypingResult};
use crate::stats::{RecordPatch, StatisticsRecord};
use crate::tokenizer::Separators;

/// What the caller should do after a result was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// Nothing beyond redrawing.
    Stay,
    /// Load the next goal sentence.
    Advance,
}

/// Statistics for a whole practice session.
///
/// Holds three records: the last completed sentence, the sentence being typed,
/// and running totals. Records are shared `Rc`s replaced on change, so a
/// renderer can compare pointers to see whether a row moved.
#[derive(Debug, Clone)]
pub struct Session {
    pub started_at: DateTime<Local>,
    separators: Separators,
    previous: Rc<StatisticsRecord>,
    current: Rc<StatisticsRecord>,
    cumulative: Rc<StatisticsRecord>,
    completed: u32,
}

impl Session {
    pub fn new(separators: Separators) -> Self {
        Self {
            started_at: Local::now(),
            separators,
            previous: StatisticsRecord::new("Previous"),
            current: StatisticsRecord::new("Current"),
            cumulative: StatisticsRecord::new("Total"),
            completed: 0,
        }
    }

    pub fn previous(&self) -> &Rc<StatisticsRecord> {
        &self.previous
    }

    pub fn current(&self) -> &Rc<StatisticsRecord> {
        &self.current
    }

    pub fn cumulative(&self) -> &Rc<StatisticsRecord> {
        &self.cumulative
    }

    /// Rows in table order.
    pub fn records(&self) -> [&Rc<StatisticsRecord>; 3] {
        [&self.previous, &self.current, &self.cumulative]
    }

    /// Number of sentences finished so far.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn apply(&mut self, result: &TypingResult) -> SessionAction {
        match result.state {
            ResultState::Succeed => {
                self.on_succeed(result);
                SessionAction::Advance
            }
            ResultState::Fail => {
                self.count_failure();
                SessionAction::Stay
            }
            ResultState::Reset => {
                if result.is_failure_counted {
                    self.count_failure();
                }
                SessionAction::Stay
            }
            ResultState::Type | ResultState::Interval => {
                self.current = StatisticsRecord::patch(&self.current, self.measure(result));
                SessionAction::Stay
            }
        }
    }

    /// Drop the sentence in progress without recording it.
    pub fn skip(&mut self) {
        self.current = StatisticsRecord::patch(&self.current, RecordPatch::cleared());
        debug!("sentence skipped");
    }

    fn on_succeed(&mut self, result: &TypingResult) {
        let measured = self.measure(result);

        self.previous = StatisticsRecord::patch(
            &self.previous,
            RecordPatch {
                failure_count: Some(self.current.failure_count),
                ..measured
            },
        );

        let totals = &self.cumulative;
        self.cumulative = StatisticsRecord::patch(
            totals,
            RecordPatch {
                stroke_count: measured.stroke_count.map(|n| totals.stroke_count + n),
                word_count: measured.word_count.map(|n| totals.word_count + n),
                duration_ms: measured.duration_ms.map(|ms| totals.duration_ms + ms),
                failure_count: None,
            },
        );

        self.current = StatisticsRecord::patch(&self.current, RecordPatch::cleared());
        self.completed += 1;

        info!(
            completed = self.completed,
            spm = self.previous.spm,
            wpm = self.previous.wpm,
            "sentence recorded"
        );
    }

    fn count_failure(&mut self) {
        self.current = StatisticsRecord::patch(
            &self.current,
            RecordPatch {
                failure_count: Some(self.current.failure_count + 1),
                ..RecordPatch::default()
            },
        );
        self.cumulative = StatisticsRecord::patch(
            &self.cumulative,
            RecordPatch {
                failure_count: Some(self.cumulative.failure_count + 1),
                ..RecordPatch::default()
            },
        );
        debug!(
            current = self.current.failure_count,
            total = self.cumulative.failure_count,
            "failure counted"
        );
    }

    fn measure(&self, result: &TypingResult) -> RecordPatch {
        RecordPatch {
            stroke_count: Some(result.stroke_count),
            word_count: Some(result.word_count(&self.separators) as u32),
            duration_ms: Some(result.duration_ms()),
            failure_count: None,
        }
    }
}
