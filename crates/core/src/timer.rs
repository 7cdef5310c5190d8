//! Timer module - virtual-clock scheduler
//!
//! Gravity, lock delay, the line-clear window and the session clock are all
//! timers on one monotonic millisecond clock owned by the game state. The host
//! advances the clock by calling `GameState::tick`; the clock only moves while
//! a game is running, so pausing freezes every timer with its remaining time
//! intact.
//!
//! Handles are never reused. Cancelling a handle that already fired or was
//! cancelled is a no-op, which keeps stale callbacks harmless.

/// Opaque id of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerToken {
    /// Periodic gravity step.
    Fall,
    /// One-shot lock after a failed downward move.
    LockDelay,
    /// One-shot end of the line-clear animation window.
    LineClear,
    /// Periodic session clock for timed modes.
    SessionClock,
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    token: TimerToken,
    due_ms: u64,
    interval_ms: Option<u64>,
}

/// Deterministic timer queue.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    fn push(&mut self, delay_ms: u64, token: TimerToken, interval_ms: Option<u64>) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.entries.push(Entry {
            handle,
            token,
            due_ms: self.now_ms + delay_ms,
            interval_ms,
        });
        handle
    }

    /// Fire `token` once after `delay_ms`.
    pub fn schedule_once(&mut self, delay_ms: u32, token: TimerToken) -> TimerHandle {
        self.push(delay_ms as u64, token, None)
    }

    /// Fire `token` every `interval_ms` (at least 1ms), first after one interval.
    pub fn schedule_repeating(&mut self, interval_ms: u32, token: TimerToken) -> TimerHandle {
        let interval = interval_ms.max(1) as u64;
        self.push(interval, token, Some(interval))
    }

    /// Cancel a timer. Returns false if it was not pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Milliseconds until the timer next fires.
    pub fn remaining_ms(&self, handle: TimerHandle) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.due_ms.saturating_sub(self.now_ms))
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Pop the earliest timer due at or before `until_ms`.
    ///
    /// The clock moves to the timer's due time. One-shot timers are removed;
    /// repeating timers are rescheduled one interval later under the same
    /// handle. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerToken)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.handle))
            .map(|(i, _)| i)?;

        let due = self.entries[idx].due_ms;
        self.now_ms = self.now_ms.max(due);

        let fired = (self.entries[idx].handle, self.entries[idx].token);
        match self.entries[idx].interval_ms {
            Some(interval) => self.entries[idx].due_ms = due + interval,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(fired)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler, until: u64) -> Vec<(u64, TimerToken)> {
        let mut fired = Vec::new();
        while let Some((_, token)) = s.pop_due(until) {
            fired.push((s.now(), token));
        }
        s.advance_to(until);
        fired
    }

    #[test]
    fn test_once_fires_once() {
        let mut s = Scheduler::new();
        let h = s.schedule_once(400, TimerToken::LockDelay);
        assert_eq!(s.remaining_ms(h), Some(400));

        assert!(drain(&mut s, 399).is_empty());
        assert_eq!(drain(&mut s, 400), vec![(400, TimerToken::LockDelay)]);
        assert!(!s.is_pending(h));
        assert!(drain(&mut s, 2_000).is_empty());
    }

    #[test]
    fn test_repeating_keeps_phase() {
        let mut s = Scheduler::new();
        s.schedule_repeating(100, TimerToken::Fall);

        let fired = drain(&mut s, 350);
        assert_eq!(
            fired,
            vec![
                (100, TimerToken::Fall),
                (200, TimerToken::Fall),
                (300, TimerToken::Fall)
            ]
        );
        assert_eq!(s.now(), 350);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let h = s.schedule_repeating(10, TimerToken::SessionClock);
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(drain(&mut s, 100).is_empty());
    }

    #[test]
    fn test_due_order_across_tokens() {
        let mut s = Scheduler::new();
        s.schedule_repeating(300, TimerToken::Fall);
        s.schedule_once(100, TimerToken::LineClear);
        s.schedule_once(300, TimerToken::LockDelay);

        let tokens: Vec<_> = drain(&mut s, 300).into_iter().map(|(_, t)| t).collect();
        // Equal due times fire in scheduling order.
        assert_eq!(
            tokens,
            vec![TimerToken::LineClear, TimerToken::Fall, TimerToken::LockDelay]
        );
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut s = Scheduler::new();
        let h = s.schedule_repeating(0, TimerToken::Fall);
        assert_eq!(s.remaining_ms(h), Some(1));
    }
}
