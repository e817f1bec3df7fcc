use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::Clock;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum LockState {
    Unlocked,
    Locked,
    Unlockable,
}

/// What a call to [`DebouncableLock::unlock`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The lock was unlockable and is now released.
    Released,
    /// Still inside the grace period; the timer was restarted.
    Extended,
    /// Nothing to unlock.
    Ignored,
}

/// Failure lock with a grace period.
///
/// `lock()` enters `Locked` and arms a single deadline `lock_time` ahead.
/// Once the deadline passes, the next `poll()` moves to `Unlockable`. Only an
/// explicit `unlock()` from `Unlockable` returns to `Unlocked`; unlocking while
/// still `Locked` pushes the deadline out again, so mashing keys never gets
/// through the grace period.
#[derive(Debug)]
pub struct DebouncableLock<C: Clock> {
    clock: C,
    lock_time: Duration,
    state: LockState,
    deadline: Option<Instant>,
}

impl<C: Clock> DebouncableLock<C> {
    pub fn new(lock_time: Duration, clock: C) -> Result<Self> {
        if lock_time.is_zero() {
            return Err(Error::invalid_config("lock time must be positive"));
        }
        Ok(Self {
            clock,
            lock_time,
            state: LockState::Unlocked,
            deadline: None,
        })
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// True for both `Locked` and `Unlockable`.
    pub fn is_locked(&self) -> bool {
        self.state != LockState::Unlocked
    }

    pub fn is_unlockable(&self) -> bool {
        self.state == LockState::Unlockable
    }

    pub fn lock(&mut self) {
        self.poll();
        if self.state == LockState::Unlocked {
            debug!(lock_time_ms = self.lock_time.as_millis() as u64, "lock engaged");
        }
        self.state = LockState::Locked;
        self.rearm();
    }

    /// Release the lock when unlockable, running `on_unlocked` exactly once.
    pub fn unlock(&mut self, on_unlocked: impl FnOnce()) -> UnlockOutcome {
        self.poll();
        match self.state {
            LockState::Unlockable => {
                self.state = LockState::Unlocked;
                self.deadline = None;
                debug!("lock released");
                on_unlocked();
                UnlockOutcome::Released
            }
            LockState::Locked => {
                self.rearm();
                debug!("unlock attempted inside grace period, timer extended");
                UnlockOutcome::Extended
            }
            LockState::Unlocked => UnlockOutcome::Ignored,
        }
    }

    /// Fire the pending deadline if it has passed.
    ///
    /// Returns true when this call moved the lock to `Unlockable`.
    pub fn poll(&mut self) -> bool {
        match (self.state, self.deadline) {
            (LockState::Locked, Some(deadline)) if self.clock.now() >= deadline => {
                self.state = LockState::Unlockable;
                self.deadline = None;
                debug!("grace period elapsed, lock is unlockable");
                true
            }
            _ => false,
        }
    }

    /// Drop the lock outright, without running any unlock side effect.
    pub fn reset(&mut self) {
        if self.state != LockState::Unlocked {
            debug!("lock cleared");
        }
        self.state = LockState::Unlocked;
        self.deadline = None;
    }

    /// Time left until the lock becomes unlockable.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    fn rearm(&mut self) {
        self.deadline = Some(self.clock.now() + self.lock_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::Cell;

    fn lock_with_clock(ms: u64) -> (DebouncableLock<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let lock = DebouncableLock::new(Duration::from_millis(ms), clock.clone()).unwrap();
        (lock, clock)
    }

    #[test]
    fn test_rejects_zero_lock_time() {
        let result = DebouncableLock::new(Duration::ZERO, ManualClock::new());
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_starts_unlocked() {
        let (lock, _) = lock_with_clock(500);
        assert_eq!(lock.state(), LockState::Unlocked);
        assert!(!lock.is_locked());
        assert!(!lock.is_unlockable());
        assert_eq!(lock.remaining(), None);
    }

    #[test]
    fn test_unlock_before_grace_stays_locked() {
        let (mut lock, clock) = lock_with_clock(500);
        let fired = Cell::new(0);

        lock.lock();
        clock.advance_ms(100);
        let outcome = lock.unlock(|| fired.set(fired.get() + 1));

        assert_eq!(outcome, UnlockOutcome::Extended);
        assert_eq!(lock.state(), LockState::Locked);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_becomes_unlockable_after_grace() {
        let (mut lock, clock) = lock_with_clock(500);

        lock.lock();
        clock.advance_ms(499);
        assert!(!lock.poll());
        assert_eq!(lock.state(), LockState::Locked);

        clock.advance_ms(1);
        assert!(lock.poll());
        assert_eq!(lock.state(), LockState::Unlockable);
        assert!(lock.is_locked());
        assert!(lock.is_unlockable());
    }

    #[test]
    fn test_unlock_fires_callback_once() {
        let (mut lock, clock) = lock_with_clock(500);
        let fired = Cell::new(0);

        lock.lock();
        clock.advance_ms(500);

        assert_eq!(
            lock.unlock(|| fired.set(fired.get() + 1)),
            UnlockOutcome::Released
        );
        assert_eq!(
            lock.unlock(|| fired.set(fired.get() + 1)),
            UnlockOutcome::Ignored
        );
        assert_eq!(lock.state(), LockState::Unlocked);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_unlock_attempt_extends_grace() {
        let (mut lock, clock) = lock_with_clock(500);

        lock.lock();
        clock.advance_ms(400);
        lock.unlock(|| {});
        clock.advance_ms(400);

        // 800ms since lock, but only 400ms since the last attempt
        assert!(!lock.poll());
        assert_eq!(lock.state(), LockState::Locked);

        clock.advance_ms(100);
        assert!(lock.poll());
    }

    #[test]
    fn test_repeated_lock_replaces_deadline() {
        let (mut lock, clock) = lock_with_clock(500);

        lock.lock();
        clock.advance_ms(300);
        lock.lock();
        assert_eq!(lock.remaining(), Some(Duration::from_millis(500)));

        clock.advance_ms(300);
        assert!(!lock.poll());

        clock.advance_ms(200);
        assert!(lock.poll());
        assert!(!lock.poll());
    }

    #[test]
    fn test_reset_clears_without_callback() {
        let (mut lock, clock) = lock_with_clock(500);

        lock.lock();
        lock.reset();
        assert_eq!(lock.state(), LockState::Unlocked);
        assert_eq!(lock.remaining(), None);

        clock.advance_ms(600);
        assert!(!lock.poll());
        assert_eq!(lock.unlock(|| panic!("nothing to unlock")), UnlockOutcome::Ignored);
    }

    #[test]
    fn test_relock_from_unlockable_restarts_grace() {
        let (mut lock, clock) = lock_with_clock(500);

        lock.lock();
        clock.advance_ms(600);
        lock.poll();
        assert!(lock.is_unlockable());

        lock.lock();
        assert_eq!(lock.state(), LockState::Locked);
    }
}
