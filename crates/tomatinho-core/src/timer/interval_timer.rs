//! Single-shot countdown with an optional progress tick.
//!
//! At most one completion and one tick are armed at a time. Every arming
//! bumps a generation counter and both callbacks compare their generation
//! with the armed one before doing anything, so an entry the scheduler had
//! already queued when `stop()` or a restart happened is a no-op.
//!
//! ```text
//! Idle --start--> Armed --expiry--> Idle (on_complete runs)
//!                 Armed --start---> Armed (previous interval abandoned)
//!                 Armed --stop----> Idle
//! ```

use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use tracing::debug;

use super::scheduler::{Scheduler, TimerHandle};
use crate::error::TimerError;

pub type TickHandler = Rc<dyn Fn(Duration)>;

struct Armed {
    completion: TimerHandle,
    tick: Option<TimerHandle>,
    ends_at: Instant,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    armed: Option<Armed>,
}

struct Tick {
    period: Duration,
    handler: TickHandler,
}

pub struct IntervalTimer {
    scheduler: Rc<dyn Scheduler>,
    slot: Rc<RefCell<Slot>>,
    tick: RefCell<Option<Tick>>,
}

impl IntervalTimer {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            slot: Rc::new(RefCell::new(Slot::default())),
            tick: RefCell::new(None),
        }
    }

    /// Register the display callback invoked every `period` while armed.
    ///
    /// Takes effect on the next `start`.
    pub fn set_tick_handler(&self, period: Duration, handler: impl Fn(Duration) + 'static) {
        *self.tick.borrow_mut() = if period.is_zero() {
            None
        } else {
            Some(Tick {
                period,
                handler: Rc::new(handler),
            })
        };
    }

    pub fn is_running(&self) -> bool {
        self.slot.borrow().armed.is_some()
    }

    /// Time left until completion, `None` while idle.
    pub fn remaining(&self) -> Option<Duration> {
        let ends_at = self.slot.borrow().armed.as_ref()?.ends_at;
        Some(ends_at.saturating_duration_since(self.scheduler.now()))
    }

    /// Remaining time as `MM:SS`, `None` while idle.
    pub fn remaining_label(&self) -> Option<String> {
        self.remaining().map(format_remaining)
    }

    /// Arm the timer. A running interval is abandoned without completing.
    pub fn start(
        &self,
        duration_secs: u64,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration {
                secs: duration_secs,
            });
        }
        self.stop();

        let duration = Duration::from_secs(duration_secs);
        let generation = {
            let mut slot = self.slot.borrow_mut();
            slot.generation += 1;
            slot.generation
        };
        let ends_at = self.scheduler.now() + duration;

        let completion = self.scheduler.after(
            duration,
            Box::new(completion_callback(
                Rc::downgrade(&self.slot),
                Rc::downgrade(&self.scheduler),
                generation,
                on_complete,
            )),
        )?;

        let tick = match self.tick.borrow().as_ref() {
            Some(tick) => {
                let registered = self.scheduler.every(
                    tick.period,
                    Box::new(tick_callback(
                        Rc::downgrade(&self.slot),
                        Rc::downgrade(&self.scheduler),
                        generation,
                        Rc::clone(&tick.handler),
                    )),
                );
                match registered {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        self.scheduler.cancel(completion);
                        return Err(err.into());
                    }
                }
            }
            None => None,
        };

        self.slot.borrow_mut().armed = Some(Armed {
            completion,
            tick,
            ends_at,
        });
        debug!(duration_secs, generation, "interval timer armed");
        Ok(())
    }

    /// Disarm the timer. Safe to call when nothing is armed.
    pub fn stop(&self) {
        let armed = {
            let mut slot = self.slot.borrow_mut();
            // Anything still queued under the old generation becomes stale.
            slot.generation += 1;
            slot.armed.take()
        };
        if let Some(armed) = armed {
            self.scheduler.cancel(armed.completion);
            if let Some(tick) = armed.tick {
                self.scheduler.cancel(tick);
            }
            debug!("interval timer stopped");
        }
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn completion_callback(
    slot: Weak<RefCell<Slot>>,
    scheduler: Weak<dyn Scheduler>,
    generation: u64,
    on_complete: impl FnOnce() + 'static,
) -> impl FnOnce() + 'static {
    move || {
        let Some(slot) = slot.upgrade() else {
            return;
        };
        let armed = {
            let mut slot = slot.borrow_mut();
            if slot.generation != generation {
                return;
            }
            slot.armed.take()
        };
        // Fire only if this arming was still live; `take` makes it single-use.
        let Some(armed) = armed else {
            return;
        };
        if let (Some(tick), Some(scheduler)) = (armed.tick, scheduler.upgrade()) {
            scheduler.cancel(tick);
        }
        on_complete();
    }
}

fn tick_callback(
    slot: Weak<RefCell<Slot>>,
    scheduler: Weak<dyn Scheduler>,
    generation: u64,
    handler: TickHandler,
) -> impl FnMut() -> ControlFlow<()> + 'static {
    move || {
        let (Some(slot), Some(scheduler)) = (slot.upgrade(), scheduler.upgrade()) else {
            return ControlFlow::Break(());
        };
        let ends_at = {
            let slot = slot.borrow();
            match (&slot.armed, slot.generation == generation) {
                (Some(armed), true) => armed.ends_at,
                _ => return ControlFlow::Break(()),
            }
        };
        handler(ends_at.saturating_duration_since(scheduler.now()));
        ControlFlow::Continue(())
    }
}

/// Format as `MM:SS`, rounding partial seconds up.
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
