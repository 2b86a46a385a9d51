//! Scheduler backed by a tokio `LocalSet`.
//!
//! Each entry is a local task; cancelling aborts it. The set is owned by
//! the scheduler and only makes progress while [`LocalScheduler::run_until`]
//! is driving it, which gives the single cooperative event loop the session
//! controller expects.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tokio::task::{AbortHandle, LocalSet};
use tokio::time::{self, MissedTickBehavior};

use super::scheduler::{OnceCallback, RepeatCallback, Scheduler, TimerHandle};
use crate::error::SchedulerError;

type Registry = Rc<RefCell<HashMap<u64, AbortHandle>>>;

pub struct LocalScheduler {
    set: LocalSet,
    next_id: Cell<u64>,
    tasks: Registry,
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self {
            set: LocalSet::new(),
            next_id: Cell::new(1),
            tasks: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Drive the event loop until `future` completes.
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        self.set.run_until(future).await
    }

    /// Number of armed entries.
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    fn ensure_runtime() -> Result<(), SchedulerError> {
        tokio::runtime::Handle::try_current()
            .map(|_| ())
            .map_err(|e| SchedulerError::Unavailable(e.to_string()))
    }

    fn allocate(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl Scheduler for LocalScheduler {
    fn now(&self) -> Instant {
        time::Instant::now().into_std()
    }

    fn after(&self, delay: Duration, callback: OnceCallback) -> Result<TimerHandle, SchedulerError> {
        Self::ensure_runtime()?;
        let id = self.allocate();
        let deadline = time::Instant::now() + delay;
        let tasks = Rc::clone(&self.tasks);
        let handle = self.set.spawn_local(async move {
            time::sleep_until(deadline).await;
            // Deregister first: once the callback runs the handle is spent.
            if tasks.borrow_mut().remove(&id).is_some() {
                callback();
            }
        });
        self.tasks.borrow_mut().insert(id, handle.abort_handle());
        Ok(TimerHandle::new(id))
    }

    fn every(
        &self,
        period: Duration,
        mut callback: RepeatCallback,
    ) -> Result<TimerHandle, SchedulerError> {
        Self::ensure_runtime()?;
        if period.is_zero() {
            return Err(SchedulerError::Unavailable(
                "periodic callbacks need a non-zero period".into(),
            ));
        }
        let id = self.allocate();
        let tasks = Rc::clone(&self.tasks);
        let start = time::Instant::now() + period;
        let handle = self.set.spawn_local(async move {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !tasks.borrow().contains_key(&id) {
                    return;
                }
                if callback().is_break() {
                    break;
                }
            }
            tasks.borrow_mut().remove(&id);
        });
        self.tasks.borrow_mut().insert(id, handle.abort_handle());
        Ok(TimerHandle::new(id))
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = self.tasks.borrow_mut().remove(&handle.id()) {
            task.abort();
        }
    }
}
