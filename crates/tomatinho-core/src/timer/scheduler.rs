//! The scheduling capability the interval timer is built on.
//!
//! Two primitives are kept apart on purpose: [`Scheduler::after`] runs a
//! callback once, [`Scheduler::every`] runs one repeatedly until it returns
//! [`ControlFlow::Break`] or is cancelled. Everything runs on the thread that
//! drives the scheduler, so callbacks are neither `Send` nor `Sync`.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crate::error::SchedulerError;

/// Opaque handle to one scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

pub type OnceCallback = Box<dyn FnOnce()>;
pub type RepeatCallback = Box<dyn FnMut() -> ControlFlow<()>>;

pub trait Scheduler {
    /// The scheduler's clock. Remaining time is always measured against it.
    fn now(&self) -> Instant;

    /// Run `callback` once, `delay` from now.
    fn after(&self, delay: Duration, callback: OnceCallback) -> Result<TimerHandle, SchedulerError>;

    /// Run `callback` every `period` until it breaks or the handle is cancelled.
    fn every(
        &self,
        period: Duration,
        callback: RepeatCallback,
    ) -> Result<TimerHandle, SchedulerError>;

    /// Cancel an entry. Unknown, fired and already cancelled handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}
