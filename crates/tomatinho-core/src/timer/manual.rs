//! Deterministic scheduler driven by a virtual clock.
//!
//! Nothing fires until [`ManualScheduler::advance`] moves the clock. Entries
//! due at the same instant fire in registration order.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use super::scheduler::{OnceCallback, RepeatCallback, Scheduler, TimerHandle};
use crate::error::SchedulerError;

enum Callback {
    Once(OnceCallback),
    Repeat(RepeatCallback),
}

struct Entry {
    due: Instant,
    period: Option<Duration>,
    /// `None` while the callback is being dispatched.
    callback: Option<Callback>,
}

pub struct ManualScheduler {
    origin: Instant,
    now: Cell<Instant>,
    next_id: Cell<u64>,
    entries: RefCell<BTreeMap<u64, Entry>>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            now: Cell::new(origin),
            next_id: Cell::new(1),
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.now.get() - self.origin
    }

    /// Number of armed entries.
    pub fn pending(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Move the clock forward by `by`, firing everything that comes due.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(id) = self.next_due(target) {
            self.dispatch(id);
        }
        self.now.set(target);
    }

    /// Advance to the last pending one-shot entry and fire everything up to it.
    ///
    /// Periodic entries alone never make the scheduler idle, so only one-shot
    /// deadlines are considered.
    pub fn run_until_idle(&self) {
        loop {
            let last_once = self
                .entries
                .borrow()
                .values()
                .filter(|e| e.period.is_none())
                .map(|e| e.due)
                .max();
            match last_once {
                Some(due) => {
                    let by = due.saturating_duration_since(self.now.get());
                    self.advance(by);
                }
                None => break,
            }
        }
    }

    fn next_due(&self, target: Instant) -> Option<u64> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, e)| e.due <= target && e.callback.is_some())
            .min_by_key(|(id, e)| (e.due, **id))
            .map(|(id, _)| *id)
    }

    fn dispatch(&self, id: u64) {
        let (due, callback) = {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(&id) else {
                return;
            };
            let due = entry.due;
            let callback = entry.callback.take();
            if entry.period.is_none() {
                entries.remove(&id);
            }
            (due, callback)
        };
        if due > self.now.get() {
            self.now.set(due);
        }

        match callback {
            Some(Callback::Once(cb)) => cb(),
            Some(Callback::Repeat(mut cb)) => {
                let flow = cb();
                let mut entries = self.entries.borrow_mut();
                // The callback may have cancelled its own entry.
                if flow.is_break() {
                    entries.remove(&id);
                } else if let Some(entry) = entries.get_mut(&id) {
                    let period = entry.period.unwrap_or_default();
                    entry.due = due + period;
                    entry.callback = Some(Callback::Repeat(cb));
                }
            }
            None => {}
        }
    }

    fn insert(&self, due: Instant, period: Option<Duration>, callback: Callback) -> TimerHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().insert(
            id,
            Entry {
                due,
                period,
                callback: Some(callback),
            },
        );
        TimerHandle::new(id)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn after(&self, delay: Duration, callback: OnceCallback) -> Result<TimerHandle, SchedulerError> {
        Ok(self.insert(self.now.get() + delay, None, Callback::Once(callback)))
    }

    fn every(
        &self,
        period: Duration,
        callback: RepeatCallback,
    ) -> Result<TimerHandle, SchedulerError> {
        if period.is_zero() {
            return Err(SchedulerError::Unavailable(
                "periodic callbacks need a non-zero period".into(),
            ));
        }
        Ok(self.insert(
            self.now.get() + period,
            Some(period),
            Callback::Repeat(callback),
        ))
    }

    fn cancel(&self, handle: TimerHandle) {
        self.entries.borrow_mut().remove(&handle.id());
    }
}
