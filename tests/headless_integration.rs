use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hardtype::app::App;
use hardtype::board::BoardSettings;
use hardtype::clock::ManualClock;
use hardtype::corpus::{Corpus, SentenceEntry};
use hardtype::keys::KeySets;
use hardtype::lock::LockState;
use hardtype::runtime::{FixedTicker, Runner, TestEventSource, TypingEvent};

fn key(c: char) -> TypingEvent {
    TypingEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn app_for(sentences: &[&str]) -> (App<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let corpus = Corpus::from_entries(
        sentences
            .iter()
            .map(|s| SentenceEntry::new(*s, "headless"))
            .collect(),
    );
    let app = App::new(
        corpus,
        BoardSettings::default(),
        KeySets::default(),
        clock.clone(),
    )
    .unwrap();
    (app, clock)
}

// Headless integration using the runtime + App without a TTY.
// Keystrokes go through the same channel-backed runner the binary uses.
#[test]
fn headless_typing_flow_completes() {
    let (mut app, clock) = app_for(&["run fast", "go home"]);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for c in "run fast ".chars() {
        tx.send(key(c)).unwrap();
    }

    for _ in 0..100u32 {
        let event = runner.step();
        if let TypingEvent::Key(_) = event {
            clock.advance_ms(100);
        }
        app.handle_event(event);
        if app.session().completed() == 1 {
            break;
        }
    }

    assert_eq!(app.session().completed(), 1, "sentence should complete");
    assert_eq!(app.board().entry().sentence, "go home");
    let previous = app.session().previous();
    assert_eq!(previous.stroke_count, 9);
    assert_eq!(previous.word_count, 2);
    assert!(previous.wpm > 0.0);
}

#[test]
fn headless_failure_locks_then_unlocks() {
    let (mut app, clock) = app_for(&["run fast"]);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for c in "rin ".chars() {
        tx.send(key(c)).unwrap();
    }
    for _ in 0..4u32 {
        app.handle_event(runner.step());
    }
    assert_eq!(app.board().lock_state(), LockState::Locked);
    assert_eq!(app.board().text(), "rin ");

    // Idle ticks past the grace period make the failure clearable.
    clock.advance_ms(500);
    assert!(matches!(runner.step(), TypingEvent::Tick));
    assert!(app.handle_event(TypingEvent::Tick));
    assert_eq!(app.board().lock_state(), LockState::Unlockable);

    tx.send(TypingEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();
    app.handle_event(runner.step());

    assert_eq!(app.board().lock_state(), LockState::Unlocked);
    assert_eq!(app.board().text(), "");
    assert_eq!(app.session().cumulative().failure_count, 2);
}

#[test]
fn headless_ticks_refresh_live_statistics() {
    let (mut app, clock) = app_for(&["run fast"]);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key('r')).unwrap();
    tx.send(key('u')).unwrap();
    app.handle_event(runner.step());
    clock.advance_ms(150);
    app.handle_event(runner.step());

    clock.advance_ms(250);
    let mut refreshed = false;
    for _ in 0..10u32 {
        if let TypingEvent::Tick = runner.step() {
            refreshed |= app.handle_event(TypingEvent::Tick);
        }
    }

    assert!(refreshed, "interval should fire while typing");
    let current = app.session().current();
    assert_eq!(current.stroke_count, 2);
    assert_eq!(current.duration_ms, 400);
    assert_eq!(current.spm, 300.0);
}

#[test]
fn headless_paste_is_dropped() {
    let (mut app, clock) = app_for(&["run fast", "go home"]);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(TypingEvent::Paste("run fast ".to_string())).unwrap();
    tx.send(TypingEvent::Paste("run fast\n".to_string())).unwrap();
    for _ in 0..10u32 {
        app.handle_event(runner.step());
    }
    assert_eq!(app.board().text(), "");
    assert_eq!(app.board().stroke_count(), 0);
    assert_eq!(app.sentence_number(), 1);

    clock.advance_ms(250);
    app.handle_event(TypingEvent::Tick);
    assert_eq!(app.session().current().duration_ms, 0);

    tx.send(TypingEvent::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )))
    .unwrap();
    for _ in 0..10u32 {
        app.handle_event(runner.step());
        if app.should_quit() {
            break;
        }
    }

    assert!(app.should_quit());
    assert_eq!(app.session().completed(), 0);
    assert_eq!(app.session().cumulative().stroke_count, 0);
}
