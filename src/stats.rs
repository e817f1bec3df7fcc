use std::rc::Rc;

const MS_PER_MINUTE: f64 = 60_000.0;

/// `count` per minute over `duration_ms`, NaN when nothing was measured.
pub fn rate_per_minute(count: f64, duration_ms: f64) -> f64 {
    if duration_ms > 0.0 {
        count / (duration_ms / MS_PER_MINUTE)
    } else {
        f64::NAN
    }
}

/// One row of the statistics table.
///
/// `spm` and `wpm` are derived; only [`StatisticsRecord::patch`] writes them.
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsRecord {
    pub label: String,
    pub failure_count: u32,
    pub stroke_count: u32,
    pub word_count: u32,
    pub duration_ms: u64,
    pub spm: f64,
    pub wpm: f64,
}

/// A partial update; `None` leaves the field alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub failure_count: Option<u32>,
    pub stroke_count: Option<u32>,
    pub word_count: Option<u32>,
    pub duration_ms: Option<u64>,
}

impl RecordPatch {
    /// Zero every counter.
    pub fn cleared() -> Self {
        Self {
            failure_count: Some(0),
            stroke_count: Some(0),
            word_count: Some(0),
            duration_ms: Some(0),
        }
    }
}

impl StatisticsRecord {
    pub fn new(label: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            label: label.into(),
            failure_count: 0,
            stroke_count: 0,
            word_count: 0,
            duration_ms: 0,
            spm: f64::NAN,
            wpm: f64::NAN,
        })
    }

    /// Apply `patch`, sharing `record` untouched when nothing changed.
    ///
    /// Rates are recomputed only when their numerator or the duration moved,
    /// so callers can use `Rc::ptr_eq` to skip redraws.
    pub fn patch(record: &Rc<Self>, patch: RecordPatch) -> Rc<Self> {
        let mut next = (**record).clone();
        let mut changed = false;

        changed |= apply(&mut next.failure_count, patch.failure_count);
        let strokes_changed = apply(&mut next.stroke_count, patch.stroke_count);
        let words_changed = apply(&mut next.word_count, patch.word_count);
        let duration_changed = apply(&mut next.duration_ms, patch.duration_ms);
        changed |= strokes_changed || words_changed || duration_changed;

        if !changed {
            return Rc::clone(record);
        }

        if strokes_changed || duration_changed {
            next.spm = rate_per_minute(next.stroke_count as f64, next.duration_ms as f64);
        }
        if words_changed || duration_changed {
            next.wpm = rate_per_minute(next.word_count as f64, next.duration_ms as f64);
        }

        Rc::new(next)
    }

    pub fn value(&self, field: StatField) -> f64 {
        match field {
            StatField::FailureCount => self.failure_count as f64,
            StatField::Spm => self.spm,
            StatField::Wpm => self.wpm,
            StatField::StrokeCount => self.stroke_count as f64,
            StatField::WordCount => self.word_count as f64,
            StatField::Duration => self.duration_ms as f64,
        }
    }
}

fn apply<T: PartialEq + Copy>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) if *slot != v => {
            *slot = v;
            true
        }
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum StatField {
    FailureCount,
    Spm,
    Wpm,
    StrokeCount,
    WordCount,
    Duration,
}

/// How one table column renders a record field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatColumn {
    pub field: StatField,
    pub label: &'static str,
    pub fraction_digits: usize,
    pub factor: f64,
}

pub const COLUMNS: [StatColumn; 6] = [
    StatColumn {
        field: StatField::FailureCount,
        label: "Failures",
        fraction_digits: 0,
        factor: 1.0,
    },
    StatColumn {
        field: StatField::Spm,
        label: "SPM",
        fraction_digits: 1,
        factor: 1.0,
    },
    StatColumn {
        field: StatField::Wpm,
        label: "WPM",
        fraction_digits: 1,
        factor: 1.0,
    },
    StatColumn {
        field: StatField::StrokeCount,
        label: "Strokes",
        fraction_digits: 0,
        factor: 1.0,
    },
    StatColumn {
        field: StatField::WordCount,
        label: "Words",
        fraction_digits: 0,
        factor: 1.0,
    },
    StatColumn {
        field: StatField::Duration,
        label: "Time (s)",
        fraction_digits: 3,
        factor: 0.001,
    },
];

impl StatColumn {
    /// Negative or unmeasured values show as `-`.
    pub fn format(&self, record: &StatisticsRecord) -> String {
        let value = record.value(self.field) * self.factor;
        if value.is_nan() || value < 0.0 {
            "-".to_string()
        } else {
            format!("{:.*}", self.fraction_digits, value)
        }
    }
}
